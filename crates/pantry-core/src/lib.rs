#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
