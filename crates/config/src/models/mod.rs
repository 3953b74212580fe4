pub mod app_config;
pub mod database;
pub mod dispatcher_worker;
pub mod observability;

pub use app_config::*;
pub use database::*;
pub use dispatcher_worker::*;
pub use observability::*;
