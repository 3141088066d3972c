//! divyield: stock price and trailing dividend yield analysis.
//!
//! Hexagonal architecture: the pure yield pipeline lives in [`domain`], the
//! traits it talks to in [`ports`], and concrete providers, exporters and
//! the web dashboard in [`adapters`]. [`cli`] is the command-line front-end.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
