// Models module - data structures shared by the proxy, the upstream client and the chat front end
pub mod types;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use types::{Role, Message, WireMessage, ExtractedFile};
pub use requests::{ChatRequest, ProxyRequest};
pub use responses::{StreamChunk, StreamChoice, Delta, ErrorBody};
