//! Core domain types and the dividend-yield transformation pipeline.

pub mod analysis;
pub mod axis;
pub mod chart;
pub mod date_range;
pub mod dividend;
pub mod error;
pub mod price_bar;
pub mod settings;
pub mod ticker;
pub mod yield_series;
