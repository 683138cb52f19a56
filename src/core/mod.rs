pub mod config;
mod responses;
mod telemetry;
pub mod teardown;

pub use self::config::AppConfig;
pub use responses::*;
pub use telemetry::*;
pub use teardown::StorageTeardown;
