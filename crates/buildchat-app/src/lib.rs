// buildchat - streaming chat proxy and terminal client for the AI app builder
pub mod app;
pub mod cli;
pub mod config;
pub mod web;

pub use cli::{ChatArgs, Cli, Commands, ServeArgs};
pub use config::ServerConfig;
pub use web::{build_app, create_router, AppError, AppState, WebServer, WebServerConfig};
