pub mod api;
pub mod api_doc;
pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use server::{build_aggregator, run_server};
