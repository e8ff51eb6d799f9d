// Error types for the Nextable client
// Validation errors are raised before any network call, remote errors wrap a non-2xx response.

use crate::transport::ApiResponse;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

// Response header carrying the vendor transaction id
pub const TRANSACTION_ID_HEADER: &str = "NexTableTrxId";

// Message the vendor sends back when cancelling twice
pub const ALREADY_CANCELLED_MESSAGE: &str = "Reservation already cancelled";

pub type Result<T> = std::result::Result<T, NextableError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Bad granularity: {0} minutes (must be a positive multiple of 15)")]
    InvalidGranularity(i64),

    #[error("Unknown ISO 3166-1 alpha-3 country code: {0}")]
    UnknownCountryCode(String),

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid date/time value: {0}")]
    InvalidDateTime(String),

    #[error("Invalid party size: {0}")]
    InvalidPartySize(i64),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Error, Debug)]
pub enum NextableError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Remote(Box<RemoteError>),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NextableError {
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            NextableError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for NextableError {
    fn from(err: RemoteError) -> Self {
        NextableError::Remote(Box::new(err))
    }
}

/// A non-2xx answer from the Nextable API.
///
/// Carries everything needed to diagnose the failure without replaying the call:
/// the status line, the vendor transaction id, the error payload and the body we sent.
#[derive(Debug, Clone)]
pub struct RemoteError {
    status: StatusCode,
    transaction_id: Option<String>,
    response: Map<String, Value>,
    request: Option<Value>,
}

impl RemoteError {
    pub fn new(
        status: StatusCode,
        transaction_id: Option<String>,
        response: Map<String, Value>,
        request: Option<Value>,
    ) -> Self {
        Self {
            status,
            transaction_id,
            response,
            request,
        }
    }

    // JSON payloads are kept as-is, anything else is wrapped under "error"
    pub fn from_response(response: &ApiResponse, request: Option<Value>) -> Self {
        let payload = if response.is_json() {
            serde_json::from_str::<Map<String, Value>>(&response.body).ok()
        } else {
            None
        };
        let payload = payload.unwrap_or_else(|| {
            let mut wrapped = Map::new();
            wrapped.insert("error".to_string(), Value::String(response.body.clone()));
            wrapped
        });

        Self::new(
            response.status,
            response.header(TRANSACTION_ID_HEADER).map(str::to_string),
            payload,
            request,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Standard reason phrase of the status code. reqwest does not expose the
    /// phrase sent on the status line, so a custom one is never reported.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    pub fn request(&self) -> Option<&Value> {
        self.request.as_ref()
    }

    // Vendor error text, when the payload has one
    pub fn message(&self) -> Option<&str> {
        self.response.get("message").and_then(Value::as_str)
    }

    // Fragile: relies on the vendor's unversioned error text.
    pub fn is_already_cancelled(&self) -> bool {
        self.status.is_client_error() && self.message() == Some(ALREADY_CANCELLED_MESSAGE)
    }

    fn payload_string(&self, key: &str) -> String {
        match self.response.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Nextable request error. {} {}. {}: {}",
            self.status.as_u16(),
            self.reason(),
            TRANSACTION_ID_HEADER,
            self.transaction_id.as_deref().unwrap_or("none"),
        )?;

        if self.status.is_server_error() && self.response.contains_key("exceptionMessage") {
            write!(
                f,
                "{}: {}\n{}",
                self.payload_string("exceptionType"),
                self.payload_string("exceptionMessage"),
                self.payload_string("stackTrace"),
            )?;
        } else {
            write!(f, "{}", Value::Object(self.response.clone()))?;
        }

        if let Some(request) = &self.request {
            write!(f, "\nRequest:\n{}", request)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}
