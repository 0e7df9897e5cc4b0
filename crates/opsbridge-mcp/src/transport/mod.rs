//! Transport layer — how callers reach the protocol handler.

pub mod framing;
pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;
