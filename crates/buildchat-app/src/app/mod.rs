// Application entry points - one per subcommand
pub mod repl;
pub mod web_server;

pub use repl::run_chat_repl;
pub use web_server::run_web_server;
