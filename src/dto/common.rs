//! Response envelope shared by every JSON endpoint.

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope wrapping every successful mutation/read response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true`; failures are reported through the error body instead.
    pub success: bool,
    /// The payload, typically the freshly updated row.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload in the success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
