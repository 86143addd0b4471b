//! JSON action requests
//!
//! The web front-end talks to the two-factor backend with a single JSON
//! envelope: `{"action": ..., "userId": ..., "token": ..., "secret": ...}`.
//! This module maps those envelopes onto `TotpService` calls and renders
//! the responses (with an HTTP-style status) the front-end expects.

use crate::clock::Clock;
use crate::error::{RequestError, ShopAuthError};
use crate::identity::IdentityLookup;
use crate::service::TotpService;
use crate::store::EnrollmentStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

/// Incoming action envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// Rendered reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    pub status: u16,
    pub body: Value,
}

impl ActionResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "success": false, "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

impl From<ShopAuthError> for ActionResponse {
    fn from(err: ShopAuthError) -> Self {
        match err {
            ShopAuthError::Request(e) => ActionResponse::failure(400, e.to_string()),
            ShopAuthError::Store(e) => {
                error!("Enrollment store error: {}", e);
                ActionResponse::failure(500, e.to_string())
            }
            other => {
                error!("TOTP error: {}", other);
                ActionResponse::failure(500, other.to_string())
            }
        }
    }
}

/// Handle a parsed request
pub fn handle<S, I, C>(service: &TotpService<S, I, C>, request: &ActionRequest) -> ActionResponse
where
    S: EnrollmentStore,
    I: IdentityLookup,
    C: Clock,
{
    let action = request.action.as_deref().unwrap_or_default();
    let user_id = request.user_id.as_deref().unwrap_or_default();
    info!(action = action, user_id = user_id, "TOTP action");

    let result = match action {
        "generate" => service.generate(user_id).map(|p| {
            json!({
                "success": true,
                "secret": p.secret.expose(),
                "otpAuthUrl": p.otpauth_uri,
            })
        }),
        "verify" => service
            .verify(request.secret.as_deref(), request.token.as_deref())
            .map(|valid| json!({ "success": true, "valid": valid })),
        "setup" => service
            .setup(user_id, request.secret.as_deref().unwrap_or_default())
            .map(|()| json!({ "success": true, "message": "TOTP enabled successfully" })),
        "check" => service.check(user_id).map(|status| {
            json!({
                "success": true,
                "hasTotp": status.has_totp(),
                "secret": status.secret.as_ref().map(|s| s.expose()),
            })
        }),
        "disable" => service
            .disable(user_id)
            .map(|existed| json!({ "success": true, "disabled": existed })),
        _ => Err(RequestError::UnknownAction.into()),
    };

    match result {
        Ok(body) => ActionResponse::ok(body),
        Err(e) => e.into(),
    }
}

/// Parse and handle a raw JSON request
pub fn handle_json<S, I, C>(service: &TotpService<S, I, C>, raw: &str) -> ActionResponse
where
    S: EnrollmentStore,
    I: IdentityLookup,
    C: Clock,
{
    match serde_json::from_str::<ActionRequest>(raw) {
        Ok(request) => handle(service, &request),
        Err(e) => ShopAuthError::from(RequestError::Malformed {
            message: e.to_string(),
        })
        .into(),
    }
}
