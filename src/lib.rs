pub mod cli;
pub mod client;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod orchestrate;
pub mod publication;

pub use cli::{run, Cli, Commands};
