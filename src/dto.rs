use serde::Serialize;

/// Plain `{ "message": ... }` envelope for endpoints with nothing else
/// to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
