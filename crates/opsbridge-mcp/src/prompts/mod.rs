//! Prompt template implementations.

pub mod refund_review;
pub mod registry;
pub mod triage;

pub use registry::PromptRegistry;
