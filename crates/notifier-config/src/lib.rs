//! KDL configuration parsing for the notifier.
//!
//! A single `notifier.kdl` file configures the database connection, the
//! scheduling pass and the delivery worker.

pub mod error;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use system::{
    DatabaseConfig, NotifierConfig, SchedulerConfig, WorkerConfig, load_config, parse_config,
};
