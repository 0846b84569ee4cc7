pub mod app_config;
pub mod cli;
pub mod file;
pub mod model;

pub use app_config::load_config;
pub use cli::Cli;
pub use model::{CheckConfig, OutputUnit, Thresholds};
