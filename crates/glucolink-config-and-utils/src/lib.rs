//! Configuration, paths, errors and logging setup shared by glucolink crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_URL_TEMPLATE, DEFAULT_LOG_LEVEL, DEFAULT_REGION, GLOBAL_REGION,
    REGION_PLACEHOLDER,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_for_service, parse_level};
pub use paths::Paths;
