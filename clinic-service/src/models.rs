use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::ChatMessage;

/// Uploaded media as sent by the client; `data` is base64
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUpload {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConsultRequest {
    pub session_id: Option<String>,
    pub text: Option<String>,
    pub audio: Option<MediaUpload>,
    pub image: Option<MediaUpload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsultResponse {
    pub session_id: String,
    pub reply: String,
    pub report_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Kept untyped so a non-string value is reported as bad input.
    pub text: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}
