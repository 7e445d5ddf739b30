pub mod config;
pub mod countries;

pub use config::*;
pub use countries::*;
