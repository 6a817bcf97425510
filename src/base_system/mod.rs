pub mod config;
pub mod context;
pub mod json_store;
pub mod logging;
