//! In-memory mock connectors.
//!
//! Each mock implements [`crate::Connector`] over a small fixture set. The
//! mocks also reserve a few sentinel credential/id values that simulate
//! upstream failure modes, so the error taxonomy is exercisable end to end
//! without a live service.

pub mod billing;
pub mod helpdesk;
pub mod scheduling;

pub use billing::MockBilling;
pub use helpdesk::MockHelpdesk;
pub use scheduling::MockScheduling;
