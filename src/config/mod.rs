//! Configuration: environment-driven settings plus the constants shared by
//! the store clients and handlers.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
