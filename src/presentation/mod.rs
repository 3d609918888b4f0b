pub mod cli;
pub mod commands;
pub mod config;
pub mod report;

pub use cli::{Cli, Command};
pub use commands::execute;
pub use config::{Environment, Settings};
