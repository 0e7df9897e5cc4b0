//! Configuration resolution: flag > environment > default.

/// Default listen address for the HTTP transport.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3200";

/// Resolve the HTTP listen address.
pub fn resolve_listen_addr(explicit: Option<&str>) -> String {
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Ok(env_addr) = std::env::var("OPSBRIDGE_ADDR") {
        return env_addr;
    }

    DEFAULT_ADDR.to_string()
}

/// Resolve the optional bearer token for the HTTP transport.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| std::env::var("OPSBRIDGE_TOKEN").ok())
}
