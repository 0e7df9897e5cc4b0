//! OpsBridge MCP Server — business actions behind a uniform handler contract.

pub mod actions;
pub mod config;
pub mod prompts;
pub mod protocol;
pub mod schema;
pub mod session;
pub mod transport;
pub mod types;

pub use actions::ActionRegistry;
pub use protocol::ProtocolHandler;
pub use session::{Session, SessionContext};
pub use transport::{HttpTransport, StdioTransport};
