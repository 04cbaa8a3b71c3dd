//! # API Error Taxonomy
//!
//! Enumerated result codes returned in response bodies. Every failure a
//! client can observe is one of these codes; domain errors from
//! `lumen-backend` map onto them 1:1 at the handler boundary.
//!
//! Unlike a conventional REST surface, domain errors are **not** signaled
//! through HTTP status: success and error responses both use 200 and the
//! distinction is carried entirely in the body
//! (`{"state": "success", ...}` vs
//! `{"state": "error", "errorcode": ..., "errormessage": ...}`). Clients of
//! the original light-grid protocol dispatch on the body alone.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lumen_backend::BridgeError;

/// Unformatted error code: an identifier plus a message template with zero
/// or more named `{placeholder}`s.
///
/// Formatting via [`ErrorCode::format`] substitutes placeholders and yields
/// an [`ApiError`]; the unformatted code and the formatted error are
/// distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Request body is not valid UTF-8.
    NotUnicode,
    /// Request body is not valid JSON.
    InvalidJson,
    /// Request body does not match the endpoint's schema.
    InvalidFormat,
    /// The bridge is already registered.
    BridgeAlreadyAdded,
    /// No bridge answered at the given address.
    BridgeNotFound,
    /// No registered bridge carries the given identifier.
    NoSuchMac,
    /// A discovery run is already in progress.
    CurrentlySearching,
    /// Credential creation requires the bridge's link button.
    NoLinkButton,
    /// The requested credential name was rejected.
    InvalidName,
    /// Persisting to the configuration store failed.
    SaveFailed,
}

impl ErrorCode {
    /// Machine-readable code string, as it appears on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotUnicode => "NOT_UNICODE",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::BridgeAlreadyAdded => "BRIDGE_ALREADY_ADDED",
            Self::BridgeNotFound => "BRIDGE_NOT_FOUND",
            Self::NoSuchMac => "NO_SUCH_MAC",
            Self::CurrentlySearching => "CURRENTLY_SEARCHING",
            Self::NoLinkButton => "NO_LINKBUTTON",
            Self::InvalidName => "INVALID_NAME",
            Self::SaveFailed => "SAVE_FAILED",
        }
    }

    /// Message template with named placeholders.
    pub fn template(self) -> &'static str {
        match self {
            Self::NotUnicode => "request body is not valid UTF-8",
            Self::InvalidJson => "request body is not valid JSON",
            Self::InvalidFormat => "request has an invalid format",
            Self::BridgeAlreadyAdded => "bridge is already added",
            Self::BridgeNotFound => "no bridge found at {ip}",
            Self::NoSuchMac => "no bridge with mac {mac}",
            Self::CurrentlySearching => "a bridge search is already in progress",
            Self::NoLinkButton => "link button not pressed",
            Self::InvalidName => "invalid username",
            Self::SaveFailed => "could not persist configuration",
        }
    }

    /// Substitute named placeholders into the template.
    pub fn format(self, args: &[(&str, &str)]) -> ApiError {
        let mut message = self.template().to_string();
        for (name, value) in args {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        ApiError {
            errorcode: self.code().to_string(),
            errormessage: message,
        }
    }
}

/// Formatted error, ready for the wire.
///
/// Serializes with the fixed `"state": "error"` discriminator alongside the
/// code and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub errorcode: String,
    pub errormessage: String,
}

impl ApiError {
    /// The full wire body, including the `state` discriminator.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "state": "error",
            "errorcode": self.errorcode,
            "errormessage": self.errormessage,
        })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.errorcode, self.errormessage)
    }
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        code.format(&[])
    }
}

/// Map domain failures to the taxonomy 1:1.
impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match &err {
            BridgeError::AlreadyAdded { .. } => ErrorCode::BridgeAlreadyAdded.format(&[]),
            BridgeError::NotFound { ip } => ErrorCode::BridgeNotFound.format(&[("ip", ip)]),
            BridgeError::UnknownMac { mac } => ErrorCode::NoSuchMac.format(&[("mac", mac)]),
            BridgeError::NoLinkButton { .. } => ErrorCode::NoLinkButton.format(&[]),
            BridgeError::InvalidName { .. } | BridgeError::DiscoveryFailed { .. } => {
                ErrorCode::InvalidName.format(&[])
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Domain errors ride a 200; the body carries the distinction.
        (StatusCode::OK, Json(self.body())).into_response()
    }
}
