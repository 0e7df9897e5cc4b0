//! Action registration and lookup.

use std::sync::Arc;

use opsbridge::Connectors;

use crate::types::ActionDefinition;

use super::{
    invoice_fetch::InvoiceFetch, meetings_lookup::MeetingsLookup, refund_create::RefundCreate,
    report_export::ReportExport, ticket_create::TicketCreate, ticket_status::TicketStatus,
    ActionHandler,
};

/// Session-scoped mapping from action name to handler.
///
/// A fresh instance is built per session from a connector bundle, so no
/// registry state is ever shared across concurrent requests. Registration is
/// idempotent: re-registering a name replaces the previous handler.
pub struct ActionRegistry {
    handlers: Vec<Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Names of the default action set, in registration order. Cheap to
    /// consult when only the advertised surface matters, not the handlers.
    pub const DEFAULT_NAMES: &'static [&'static str] = &[
        super::ticket_create::NAME,
        super::ticket_status::NAME,
        super::invoice_fetch::NAME,
        super::refund_create::NAME,
        super::meetings_lookup::NAME,
        super::report_export::NAME,
    ];

    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// The full default action set over the given connectors.
    pub fn with_default_actions(connectors: Connectors) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TicketCreate::new(connectors.helpdesk.clone())));
        registry.register(Arc::new(TicketStatus::new(connectors.helpdesk)));
        registry.register(Arc::new(InvoiceFetch::new(connectors.billing.clone())));
        registry.register(Arc::new(RefundCreate::new(connectors.billing.clone())));
        registry.register(Arc::new(MeetingsLookup::new(connectors.scheduling)));
        registry.register(Arc::new(ReportExport::new(connectors.billing)));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        let name = handler.definition().name;
        self.handlers.retain(|h| h.definition().name != name);
        self.handlers.push(handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ActionHandler>> {
        self.handlers.iter().find(|h| h.definition().name == name)
    }

    /// Exactly the currently registered set, in registration order. Used for
    /// capability advertisement.
    pub fn list(&self) -> Vec<ActionDefinition> {
        self.handlers.iter().map(|h| h.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
