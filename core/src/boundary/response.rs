//! Mapping of operation results to status codes and JSON bodies

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::domain::value_objects::{AuthOutcome, FailureKind};
use crate::errors::DomainResult;

/// Body sent for every unexpected fault
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Operations exposed at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ResetPassword,
    RefreshAccessToken,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ResetPassword => "reset_password",
            Operation::RefreshAccessToken => "refresh_access_token",
        }
    }

    /// Status code for an expected failure of this operation
    pub fn failure_status(&self, kind: &FailureKind) -> u16 {
        match (self, kind) {
            (_, FailureKind::Validation(_)) | (_, FailureKind::Policy(_)) => 400,
            (Operation::ResetPassword, FailureKind::Authentication(_)) => 400,
            (Operation::RefreshAccessToken, FailureKind::Authentication(_)) => 401,
            (_, FailureKind::InvalidCredentials) => 401,
        }
    }
}

/// What the transport layer writes back
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryResponse {
    pub status: u16,
    pub body: Value,
}

impl BoundaryResponse {
    pub fn internal_error() -> Self {
        Self {
            status: 500,
            body: json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Converts an operation result into a response, hiding fault details
pub fn into_response<T: Serialize>(
    operation: Operation,
    result: DomainResult<AuthOutcome<T>>,
) -> BoundaryResponse {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(operation = operation.as_str(), error = %e, "Unexpected fault");
            return BoundaryResponse::internal_error();
        }
    };

    let status = match &outcome {
        AuthOutcome::Success(_) => 200,
        AuthOutcome::Failure(failure) => operation.failure_status(&failure.kind),
    };

    match serde_json::to_value(&outcome) {
        Ok(body) => BoundaryResponse { status, body },
        Err(e) => {
            error!(operation = operation.as_str(), error = %e, "Failed to serialize response");
            BoundaryResponse::internal_error()
        }
    }
}
