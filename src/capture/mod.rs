//! Signature capture: turns a drawn image, typed text or uploaded file into
//! the single signature payload attached to a document.

use crate::document::{Signature, SignatureKind};
use crate::error::DocsignError;
use crate::time_utils::now_rfc3339;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

lazy_static::lazy_static! {
    static ref DATA_URL: Regex =
        Regex::new(r"^data:(?P<mime>[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,(?P<data>[A-Za-z0-9+/]*={0,2})$")
            .unwrap_or_else(|e| panic!("data url pattern: {}", e));
}

/// Largest uploaded signature file accepted, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A signature as the signer supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCapture {
    /// Raster image data URL from a drawing surface.
    Draw { data_url: String },
    /// The typed text itself.
    Type { text: String },
    /// Data URL of an uploaded image or PDF.
    Upload { data_url: String },
}

impl SignatureCapture {
    pub fn kind(&self) -> SignatureKind {
        match self {
            SignatureCapture::Draw { .. } => SignatureKind::Draw,
            SignatureCapture::Type { .. } => SignatureKind::Type,
            SignatureCapture::Upload { .. } => SignatureKind::Upload,
        }
    }

    fn into_data(self) -> String {
        match self {
            SignatureCapture::Draw { data_url } | SignatureCapture::Upload { data_url } => data_url,
            SignatureCapture::Type { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Parses a `data:<mime>;base64,<payload>` URL and decodes the payload.
pub fn parse_data_url(input: &str) -> Result<DataUrl, DocsignError> {
    let caps = DATA_URL.captures(input.trim()).ok_or_else(|| {
        DocsignError::ValidationError(
            "signature payload must be a base64 data URL (data:<type>;base64,...)".to_string(),
        )
    })?;
    let mime = caps["mime"].to_ascii_lowercase();
    let bytes = STANDARD.decode(&caps["data"]).map_err(|e| {
        DocsignError::ValidationError(format!("signature payload is not valid base64: {}", e))
    })?;
    if bytes.is_empty() {
        return Err(DocsignError::ValidationError(
            "signature payload is empty".to_string(),
        ));
    }
    Ok(DataUrl { mime, bytes })
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

fn is_accepted_upload_mime(mime: &str) -> bool {
    mime.starts_with("image/") || mime == "application/pdf"
}

/// Validates the capture and stamps it, producing the complete signature
/// handed to the store in one piece.
pub fn capture_signature(
    signer_name: &str,
    capture: SignatureCapture,
) -> Result<Signature, DocsignError> {
    let name = signer_name.trim();
    if name.is_empty() {
        return Err(DocsignError::ValidationError(
            "signer full name is required".to_string(),
        ));
    }

    match &capture {
        SignatureCapture::Draw { data_url } => {
            let parsed = parse_data_url(data_url)?;
            if !parsed.mime.starts_with("image/") {
                return Err(DocsignError::ValidationError(format!(
                    "drawn signature must be an image, got {}",
                    parsed.mime
                )));
            }
        }
        SignatureCapture::Type { text } => {
            if text.trim().is_empty() {
                return Err(DocsignError::ValidationError(
                    "typed signature text is required".to_string(),
                ));
            }
        }
        SignatureCapture::Upload { data_url } => {
            let parsed = parse_data_url(data_url)?;
            if !is_accepted_upload_mime(&parsed.mime) {
                return Err(DocsignError::ValidationError(format!(
                    "uploaded signature must be an image or PDF, got {}",
                    parsed.mime
                )));
            }
        }
    }

    let kind = capture.kind();
    Ok(Signature {
        data: capture.into_data(),
        kind,
        name: name.to_string(),
        timestamp: now_rfc3339(),
    })
}

/// Reads a signature file into an upload capture. The MIME type comes from
/// the file extension. Cancelling `cancel` abandons the read.
pub async fn read_upload(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<SignatureCapture, DocsignError> {
    let mime = mime_guess::from_path(path)
        .first_raw()
        .filter(|m| is_accepted_upload_mime(m))
        .ok_or_else(|| {
            DocsignError::ValidationError(format!(
                "'{}' is not an image or PDF file",
                path.display()
            ))
        })?;

    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(DocsignError::Cancelled {
                operation: "signature upload".to_string(),
            });
        }
        read = tokio::fs::read(path) => read?,
    };

    if bytes.is_empty() {
        return Err(DocsignError::ValidationError(format!(
            "'{}' is empty",
            path.display()
        )));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(DocsignError::ValidationError(format!(
            "'{}' is larger than {} bytes",
            path.display(),
            MAX_UPLOAD_BYTES
        )));
    }
    debug!("read {} byte signature file {}", bytes.len(), path.display());
    Ok(SignatureCapture::Upload {
        data_url: encode_data_url(mime, &bytes),
    })
}
