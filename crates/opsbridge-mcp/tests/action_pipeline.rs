//! Integration tests for the action pipeline, protocol dispatch, and session
//! lifecycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use opsbridge::{Connector, ConnectorError, Connectors, Credentials, MockHelpdesk};
use opsbridge_mcp::actions::ActionRegistry;
use opsbridge_mcp::protocol::ProtocolHandler;
use opsbridge_mcp::session::{Session, SessionEvent, SessionState};
use opsbridge_mcp::types::JsonRpcMessage;

// ─────────────────────── helpers ───────────────────────

/// Connector wrapper that counts calls before delegating.
struct CountingConnector {
    inner: Arc<dyn Connector>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for CountingConnector {
    fn service(&self) -> &str {
        self.inner.service()
    }

    async fn call(
        &self,
        operation: &str,
        params: Value,
        creds: &Credentials,
    ) -> Result<Value, ConnectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.call(operation, params, creds).await
    }
}

/// Mock connectors with a call counter wired onto the helpdesk.
fn counted_connectors() -> (Connectors, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut connectors = Connectors::mock();
    connectors.helpdesk = Arc::new(CountingConnector {
        inner: Arc::new(MockHelpdesk::new()),
        calls: calls.clone(),
    });
    (connectors, calls)
}

fn new_handler(connectors: Connectors) -> (Arc<ProtocolHandler>, tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) {
    let registry = ActionRegistry::with_default_actions(connectors);
    let (session, rx) = Session::new(registry);
    session.connect();
    (Arc::new(ProtocolHandler::new(session)), rx)
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

fn helpdesk_auth() -> Value {
    json!({
        "subdomain": "acme",
        "email": "agent@acme.test",
        "api_token": "tok_abc123"
    })
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Unwrap the ActionResult envelope out of a tools/call response.
fn action_result(resp: &Value) -> Value {
    let text = resp["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("expected tool content, got: {resp}"));
    serde_json::from_str(text).unwrap()
}

fn call_action(id: i64, name: &str, arguments: Value, auth: Value) -> Value {
    mcp_request(
        id,
        "tools/call",
        json!({ "name": name, "arguments": arguments, "auth": auth }),
    )
}

// ─────────────────── validation gates ───────────────────

#[tokio::test]
async fn malformed_args_never_reach_the_connector() {
    let (connectors, calls) = counted_connectors();
    let (handler, _rx) = new_handler(connectors);
    send_unwrap(&handler, init_request()).await;

    // Missing description, blank subject, bogus priority.
    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "ticket_create",
            json!({ "subject": "  ", "priority": "asap" }),
            helpdesk_auth(),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["message"], "Invalid arguments.");
    assert!(envelope["data"].is_null());
    let errors = envelope["errors"].as_object().unwrap();
    assert!(!errors.is_empty());
    assert!(errors.contains_key("subject"));
    assert!(errors.contains_key("description"));
    assert!(errors.contains_key("priority"));

    assert_eq!(calls.load(Ordering::SeqCst), 0, "connector must not be called");
}

#[tokio::test]
async fn malformed_auth_never_reaches_the_connector() {
    let (connectors, calls) = counted_connectors();
    let (handler, _rx) = new_handler(connectors);
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "ticket_status",
            json!({ "ticket_id": 35435 }),
            json!({ "subdomain": "acme", "email": "not-an-email" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["message"], "Invalid auth information.");
    let errors = envelope["errors"].as_object().unwrap();
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("api_token"));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ─────────────── per-action outcome policies ───────────────

#[tokio::test]
async fn refund_without_amount_refunds_the_full_charge() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "refund_create",
            json!({ "charge_id": "ch_123" }),
            json!({ "api_key": "sk_test_abc" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["message"], "Refund succeeded.");
    assert_eq!(envelope["data"]["id"], "re_1");
    assert_eq!(envelope["data"]["chargeId"], "ch_123");
    assert_eq!(envelope["data"]["amount"], 500);
    assert_eq!(envelope["data"]["status"], "succeeded");
}

#[tokio::test]
async fn unknown_ticket_is_a_failure_envelope() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(1, "ticket_status", json!({ "ticket_id": 99999 }), helpdesk_auth()),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"].as_str().unwrap().contains("Ticket not found"));
    assert!(envelope["data"].is_null());
}

#[tokio::test]
async fn unknown_invoice_is_success_with_null_data() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "invoice_fetch",
            json!({ "invoice_id": "in_9999" }),
            json!({ "api_key": "sk_test_abc" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], true);
    assert!(envelope["data"]["invoice"].is_null());
}

#[tokio::test]
async fn zero_meetings_is_success_with_empty_list() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "meetings_lookup",
            json!({ "email": "nobody@example.com" }),
            json!({ "api_token": "cal_tok" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["email"], "nobody@example.com");
    assert_eq!(envelope["data"]["upcomingMeetings"], json!([]));
}

#[tokio::test]
async fn known_invitee_gets_their_meetings() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "meetings_lookup",
            json!({ "email": "alice@example.com" }),
            json!({ "api_token": "cal_tok" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], true);
    let meetings = envelope["data"]["upcomingMeetings"].as_array().unwrap();
    assert_eq!(meetings.len(), 2);
    assert!(meetings[0]["startTime"].is_string());
}

// ─────────────── upstream failure classification ───────────────

#[tokio::test]
async fn upstream_error_payload_is_classified() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    // Expired token: the mock answers 401.
    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "ticket_status",
            json!({ "ticket_id": 35435 }),
            json!({
                "subdomain": "acme",
                "email": "agent@acme.test",
                "api_token": "expired"
            }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    let message = envelope["message"].as_str().unwrap();
    assert!(message.contains("upstream service error (401)"), "{message}");
}

#[tokio::test]
async fn no_response_is_classified_distinctly() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "invoice_fetch",
            json!({ "invoice_id": "in_1001" }),
            json!({ "api_key": "sk_unreachable" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"].as_str().unwrap().contains("no response"));
}

#[tokio::test]
async fn unexpected_shape_is_classified_distinctly() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(
            1,
            "invoice_fetch",
            json!({ "invoice_id": "in_malformed" }),
            json!({ "api_key": "sk_test_abc" }),
        ),
    )
    .await;

    let envelope = action_result(&resp);
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"]
        .as_str()
        .unwrap()
        .contains("unexpected upstream response shape"));
}

// ─────────────── protocol-level behavior ───────────────

#[tokio::test]
async fn unknown_action_is_a_protocol_error_not_an_envelope() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(
        &handler,
        call_action(1, "issue_refund", json!({}), json!({})),
    )
    .await;

    assert!(resp.get("result").is_none());
    assert_eq!(resp["error"]["code"], -32803);
    assert!(resp["error"]["message"].as_str().unwrap().contains("issue_refund"));
}

#[tokio::test]
async fn cancellation_notification_produces_no_response() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send(
        &handler,
        json!({
            "jsonrpc": "2.0",
            "method": "notifications/cancelled",
            "params": { "requestId": 1, "reason": "caller gave up" }
        }),
    )
    .await;
    assert!(resp.is_none());

    // The session keeps dispatching after a cancellation notice.
    let ping = send_unwrap(&handler, mcp_request(2, "ping", json!({}))).await;
    assert!(ping["result"].is_object());
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let (handler, _rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let resp = send_unwrap(&handler, mcp_request(1, "foo/bar/baz", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32601);
}

#[tokio::test]
async fn capability_listing_reflects_registered_actions_and_prompts() {
    let (handler, _rx) = new_handler(Connectors::mock());

    let init = send_unwrap(&handler, init_request()).await;
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], "opsbridge-mcp");

    let tools = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    let listed = tools["result"]["tools"].as_array().unwrap();
    assert_eq!(listed.len(), 6);
    assert!(listed.iter().any(|t| t["name"] == "refund_create"));
    assert!(listed[0]["inputSchema"]["type"] == "object");

    let prompts = send_unwrap(&handler, mcp_request(2, "prompts/list", json!({}))).await;
    let listed = prompts["result"]["prompts"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn future_protocol_version_is_negotiated_down() {
    let (handler, _rx) = new_handler(Connectors::mock());

    let resp = send_unwrap(
        &handler,
        mcp_request(
            0,
            "initialize",
            json!({
                "protocolVersion": "2099-01-01",
                "capabilities": {},
                "clientInfo": { "name": "future-client", "version": "99.0" }
            }),
        ),
    )
    .await;

    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
}

// ─────────────── notification ordering & disconnect ───────────────

#[tokio::test]
async fn notifications_arrive_in_order_before_the_terminal_result() {
    let (handler, mut rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let msg: JsonRpcMessage = serde_json::from_value(call_action(
        1,
        "report_export",
        json!({ "steps": 3, "interval_ms": 50 }),
        json!({ "api_key": "sk_test_abc" }),
    ))
    .unwrap();

    let task = tokio::spawn({
        let handler = handler.clone();
        async move { handler.process(msg).await }
    });

    let mut sequences = Vec::new();
    let mut terminal = None;
    while let Some(event) = rx.recv().await {
        match event {
            SessionEvent::Notification(n) => {
                let params = n.params.unwrap();
                assert_eq!(n.method, "notifications/message");
                assert_eq!(params["level"], "info");
                assert!(params["timestamp"].is_string());
                sequences.push(params["sequence"].as_u64().unwrap());
            }
            SessionEvent::Response(v) => {
                terminal = Some(v);
                break;
            }
        }
    }
    task.await.unwrap();

    assert_eq!(sequences, vec![1, 2, 3]);
    let terminal = terminal.expect("exactly one terminal result");
    let envelope = action_result(&terminal);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["message"], "Report export complete.");
    assert_eq!(envelope["data"]["notificationsEmitted"], 3);
    assert!(envelope["data"]["reportId"].as_str().unwrap().starts_with("rpt_"));
    assert_eq!(handler.session().state(), SessionState::Completed);
}

#[tokio::test]
async fn disconnect_mid_stream_suppresses_events_and_result() {
    let (handler, mut rx) = new_handler(Connectors::mock());
    send_unwrap(&handler, init_request()).await;

    let msg: JsonRpcMessage = serde_json::from_value(call_action(
        1,
        "report_export",
        json!({ "steps": 10, "interval_ms": 50 }),
        json!({ "api_key": "sk_test_abc" }),
    ))
    .unwrap();

    let task = tokio::spawn({
        let handler = handler.clone();
        async move { handler.process(msg).await }
    });

    // Observe two events, then hang up.
    let mut seen = 0;
    while seen < 2 {
        match rx.recv().await.expect("stream should be live") {
            SessionEvent::Notification(_) => seen += 1,
            SessionEvent::Response(v) => panic!("premature terminal result: {v}"),
        }
    }
    drop(rx);

    // The handler finishes without delivering a result and the session
    // reports released resources.
    task.await.unwrap();
    assert_eq!(handler.session().state(), SessionState::Closed);
    assert!(handler.session().is_finished());
}
