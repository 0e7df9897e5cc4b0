//! OpsBridge — connector boundary for upstream SaaS services.
//!
//! Defines the [`Connector`] trait the action server depends on, the upstream
//! error taxonomy, credential handling, and in-memory mock connectors for the
//! helpdesk, billing, and scheduling services.

pub mod connector;
pub mod credentials;
pub mod error;
pub mod mock;

pub use connector::{Connector, Connectors};
pub use credentials::Credentials;
pub use error::ConnectorError;
pub use mock::{MockBilling, MockHelpdesk, MockScheduling};
