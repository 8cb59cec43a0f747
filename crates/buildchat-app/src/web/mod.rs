// Web module - streaming chat proxy over HTTP
pub mod error;
pub mod routes;
pub mod server;

pub use error::AppError;
pub use routes::{create_router, parse_messages, AppState};
pub use server::{build_app, WebServer, WebServerConfig};
