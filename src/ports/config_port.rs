//! Configuration access port.

/// Typed getters return the default only for a missing key; a value that
/// does not parse is an `Err` describing it.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, String>;
}
