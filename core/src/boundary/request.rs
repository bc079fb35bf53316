//! Request bodies accepted at the boundary

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ValidationError;

/// A JSON request body whose required fields are checked before use
pub trait BoundaryRequest: DeserializeOwned + Validate {
    /// `(struct field, wire name)` pairs in the order they are reported
    const FIELDS: &'static [(&'static str, &'static str)];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(required, length(min = 1))]
    pub token: Option<String>,

    #[validate(required, length(min = 1))]
    pub new_password: Option<String>,
}

impl BoundaryRequest for ResetPasswordRequest {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("token", "token"), ("new_password", "newPassword")];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(required, length(min = 1))]
    pub refresh_token: Option<String>,
}

impl BoundaryRequest for RefreshTokenRequest {
    const FIELDS: &'static [(&'static str, &'static str)] = &[("refresh_token", "refreshToken")];
}

/// Parses a JSON body and checks that every required field is present
///
/// A missing field is reported under its wire name; when several are
/// missing the first in declaration order wins.
pub fn parse_request<R: BoundaryRequest>(body: &[u8]) -> Result<R, ValidationError> {
    let request: R = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;

    if let Err(errors) = request.validate() {
        let failed = errors.field_errors();
        let field = R::FIELDS
            .iter()
            .find(|(name, _)| failed.contains_key(name))
            .map(|(_, wire)| *wire)
            .unwrap_or("request");
        return Err(ValidationError::required(field));
    }

    Ok(request)
}
