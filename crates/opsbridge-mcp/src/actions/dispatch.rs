//! The uniform action pipeline: validate args, validate auth, execute,
//! normalize.

use serde_json::Value;

use opsbridge::Credentials;

use crate::session::SessionContext;
use crate::types::ActionResult;

use super::ActionHandler;

/// Run one action invocation through the hard gates, in order.
///
/// 1. Arguments are validated first; failure returns the field errors without
///    building credentials or contacting any connector.
/// 2. Credentials are validated second, with the same fail-fast behavior.
/// 3. Only then does the handler execute its upstream call.
/// 4. Upstream faults are normalized into the failure envelope; a raw
///    connector error never escapes this function.
pub async fn handle(
    handler: &dyn ActionHandler,
    arguments: &Value,
    auth: &Value,
    cx: &SessionContext,
) -> ActionResult {
    let name = handler.definition().name;

    let args = match handler.argument_schema().validate(arguments) {
        Ok(v) => v,
        Err(errors) => {
            tracing::debug!(action = %name, ?errors, "argument validation failed");
            return ActionResult::invalid_arguments(errors);
        }
    };

    let creds = match handler.credential_schema().validate(auth) {
        Ok(v) => Credentials::from_object(&v.into_value()),
        Err(errors) => {
            tracing::debug!(action = %name, fields = errors.len(), "auth validation failed");
            return ActionResult::invalid_auth(errors);
        }
    };

    match handler.run(&args, &creds, cx).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(action = %name, error = %e, "upstream call failed");
            ActionResult::upstream_failure(&e)
        }
    }
}
