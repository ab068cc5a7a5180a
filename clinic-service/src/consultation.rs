use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    model::{ModelClient, ModelError, ModelPart},
    models::{ConsultRequest, MediaUpload},
    prompt::{IMAGE_LABEL, VOICE_LABEL},
    session::{ChatMessage, Session},
};

#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A validated submission, ready for the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub parts: Vec<ModelPart>,
    /// What the chat log shows for the user's turn
    pub display_text: String,
}

impl Submission {
    /// Orders the parts audio, image, text. At least one must be present.
    pub fn from_request(request: &ConsultRequest) -> Result<Self, ConsultationError> {
        let mut parts = Vec::new();
        let mut display_text = String::new();

        if let Some(audio) = &request.audio {
            parts.push(decode_audio(audio)?);
            display_text.push_str(VOICE_LABEL);
        }
        if let Some(image) = &request.image {
            parts.push(decode_image(image)?);
            display_text.push_str(IMAGE_LABEL);
        }
        if let Some(text) = request.text.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(ModelPart::Text(text.to_string()));
            display_text.push_str(text);
        }

        if parts.is_empty() {
            return Err(ConsultationError::InvalidSubmission(
                "text, audio or image is required".to_string(),
            ));
        }

        Ok(Self {
            parts,
            display_text,
        })
    }
}

fn decode_base64(upload: &MediaUpload, kind: &str) -> Result<Vec<u8>, ConsultationError> {
    let data = STANDARD.decode(upload.data.trim()).map_err(|e| {
        ConsultationError::InvalidSubmission(format!("{} is not valid base64: {}", kind, e))
    })?;
    if data.is_empty() {
        return Err(ConsultationError::InvalidSubmission(format!("{} is empty", kind)));
    }
    Ok(data)
}

fn decode_audio(upload: &MediaUpload) -> Result<ModelPart, ConsultationError> {
    if !upload.mime_type.starts_with("audio/") {
        return Err(ConsultationError::InvalidSubmission(format!(
            "unsupported audio type: {}",
            upload.mime_type
        )));
    }
    Ok(ModelPart::InlineData {
        mime_type: upload.mime_type.clone(),
        data: decode_base64(upload, "audio")?,
    })
}

/// Accepts PNG and JPEG only; the MIME type sent on is the sniffed one.
fn decode_image(upload: &MediaUpload) -> Result<ModelPart, ConsultationError> {
    let data = decode_base64(upload, "image")?;
    let format = image::guess_format(&data)
        .map_err(|_| ConsultationError::InvalidSubmission("unrecognised image data".to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg => Ok(ModelPart::InlineData {
            mime_type: format.to_mime_type().to_string(),
            data,
        }),
        other => Err(ConsultationError::InvalidSubmission(format!(
            "unsupported image format: {:?}",
            other
        ))),
    }
}

/// Runs one consultation turn against `session`.
///
/// The user's turn is logged before the model is called, so a failed call
/// still leaves it in the history. The reply is logged only on success.
pub async fn consult(
    model: &dyn ModelClient,
    session: &mut Session,
    submission: Submission,
) -> Result<String, ConsultationError> {
    info!(
        session_id = %session.id,
        parts = submission.parts.len(),
        "Running consultation"
    );

    session.log.push(ChatMessage::user(submission.display_text));

    match model.generate(&submission.parts).await {
        Ok(reply) => {
            session.log.push(ChatMessage::assistant(reply.clone()));
            Ok(reply)
        }
        Err(e) => {
            error!(session_id = %session.id, error = %e, "Consultation failed");
            Err(e.into())
        }
    }
}
