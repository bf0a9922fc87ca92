use serde::{Deserialize, Serialize};

/// JSON envelope used by every endpoint.
///
/// Success: `{"data": ..., "message"?: ...}`.
/// Failure: `{"error": ..., "message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

/// Body of the like toggle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Option<String>,
}

/// Query of the like status lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggled {
    pub liked: bool,
    pub likes_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
}
