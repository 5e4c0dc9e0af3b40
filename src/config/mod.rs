mod initialize;
pub use initialize::{Initializer, Outcome};

mod config;
pub use config::{Config, RetryConfig, StoreConfig};

pub mod env {
    pub const LOG_DIRECTIVE: &str = "KVSEED_LOG";
}
