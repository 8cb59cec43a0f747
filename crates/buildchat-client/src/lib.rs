//! Client side of the builder chat: consume the proxy's text stream,
//! keep the conversation, and pull generated files out of the replies.

pub mod decoder;
pub mod extract;
pub mod proxy_client;
pub mod session;
pub mod turn;

pub use decoder::Utf8ChunkDecoder;
pub use extract::{extract_files, extract_html_document, default_file_for_language};
pub use proxy_client::{ChatProxyClient, ClientError, CHAT_PATH};
pub use session::{ProjectFile, ProjectFiles, Session, TurnSummary, BUILDER_SYSTEM_PROMPT};
pub use turn::{AssistantTurn, TurnState};
