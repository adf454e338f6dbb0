//! Backend response envelope.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Envelope every REST endpoint wraps its payload in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: String,
    pub status_code: u16,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Unwrap the payload, rejecting non-2xx envelopes.
    pub fn into_data(self) -> DomainResult<T> {
        if self.status_code == 404 {
            return Err(DomainError::not_found());
        }
        if !self.is_success() {
            tracing::warn!(
                status_code = self.status_code,
                status = %self.status,
                "backend reported failure"
            );
            return Err(DomainError::validation(format!(
                "backend responded {} ({})",
                self.status_code, self.status
            )));
        }
        Ok(self.data)
    }
}
