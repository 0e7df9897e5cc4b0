//! Main request dispatcher — routes JSON-RPC messages to the session's
//! actions and prompts.

use serde_json::Value;
use tokio::sync::Mutex;

use crate::actions::dispatch;
use crate::prompts::PromptRegistry;
use crate::session::Session;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// Dispatches the JSON-RPC traffic of one session.
///
/// The handler owns the session for the duration of the request; the terminal
/// response is delivered through the session's event channel so it can never
/// overtake a notification.
pub struct ProtocolHandler {
    session: Session,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle one inbound message and complete the session. Requests produce
    /// exactly one terminal response frame; inbound notifications produce a
    /// null completion so the channel still ends.
    pub async fn process(&self, msg: JsonRpcMessage) {
        self.session.dispatching();
        match self.handle_message(msg).await {
            Some(response) => self.session.complete(response),
            None => self.session.complete(Value::Null),
        }
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        let result = self.dispatch_request(&request).await;

        match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default(),
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "shutdown" => self.handle_shutdown().await,

            "tools/list" => self.handle_actions_list(),
            "tools/call" => self.handle_actions_call(request.params.clone()).await,

            "prompts/list" => self.handle_prompts_list(),
            "prompts/get" => self.handle_prompts_get(request.params.clone()).await,

            "ping" => Ok(Value::Object(serde_json::Map::new())),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" => {
                let mut caps = self.capabilities.lock().await;
                if let Err(e) = caps.mark_initialized() {
                    tracing::error!("Failed to mark initialized: {e}");
                }
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                match notification
                    .params
                    .map(serde_json::from_value::<CancelRequestParams>)
                    .transpose()
                {
                    Ok(Some(params)) => {
                        tracing::info!(
                            request_id = %params.request_id,
                            reason = params.reason.as_deref().unwrap_or("none given"),
                            "Received cancellation notification"
                        );
                    }
                    Ok(None) => tracing::info!("Received cancellation notification"),
                    Err(e) => tracing::debug!("Malformed cancellation params: {e}"),
                }
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))?;

        self.session.connect();

        let mut caps = self.capabilities.lock().await;
        let result = caps.negotiate(init_params)?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_shutdown(&self) -> McpResult<Value> {
        tracing::info!("Shutdown requested");
        Ok(Value::Object(serde_json::Map::new()))
    }

    fn handle_actions_list(&self) -> McpResult<Value> {
        let result = ActionListResult {
            tools: self.session.registry().list(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_actions_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ActionCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let handler = self
            .session
            .registry()
            .get(&call_params.name)
            .ok_or_else(|| McpError::ActionNotFound(call_params.name.clone()))?
            .clone();

        let arguments = call_params.arguments.unwrap_or(Value::Null);
        let auth = call_params.auth.unwrap_or(Value::Null);
        let cx = self.session.context();

        let action_result = dispatch::handle(handler.as_ref(), &arguments, &auth, &cx).await;

        serde_json::to_value(ToolCallResult::json(&action_result))
            .map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_prompts_list(&self) -> McpResult<Value> {
        let result = PromptListResult {
            prompts: PromptRegistry::list_prompts(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_prompts_get(&self, params: Option<Value>) -> McpResult<Value> {
        let get_params: PromptGetParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Prompt get params required".to_string()))?;

        let result = PromptRegistry::get(&get_params.name, get_params.arguments).await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}
