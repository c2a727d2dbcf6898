//! Requirement-artifact attachments and the input bundle.
//!
//! An [`Attachment`] is created in the `Processing` state when selected and
//! moves exactly once to `Ready` (payload or frames populated) or `Error`.
//! After that transition it is read-only. Video frame extraction happens in
//! an upstream collaborator; this module only carries the resulting encoded
//! keyframes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::join_all;

/// Media kind of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Processing lifecycle of an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentStatus {
    /// Selected but not yet encoded/sampled.
    Processing,
    /// Payload (image) or frame sequence (video) populated.
    Ready,
    /// Preprocessing failed; the message is user-facing.
    Error(String),
}

/// A single uploaded artifact.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Temporary identity assigned at selection time.
    pub id: String,
    pub name: String,
    pub byte_size: u64,
    pub kind: MediaKind,

    /// Encoded image payload, possibly with a `data:*;base64,` prefix.
    /// Populated for ready images only.
    pub data_url: Option<String>,

    /// Ordered base64 JPEG keyframes, evenly sampled across the video
    /// duration by the upstream sampler. Populated for ready videos only.
    pub frames: Vec<String>,

    pub status: AttachmentStatus,
}

impl Attachment {
    /// Create a new attachment in the `Processing` state.
    pub fn pending(
        id: impl Into<String>,
        name: impl Into<String>,
        byte_size: u64,
        kind: MediaKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            byte_size,
            kind,
            data_url: None,
            frames: Vec::new(),
            status: AttachmentStatus::Processing,
        }
    }

    /// Transition to `Ready` with an encoded image payload.
    /// No-op if the attachment already left `Processing`.
    pub fn mark_ready_image(&mut self, data_url: impl Into<String>) {
        if self.status == AttachmentStatus::Processing {
            self.data_url = Some(data_url.into());
            self.status = AttachmentStatus::Ready;
        }
    }

    /// Transition to `Ready` with a keyframe sequence.
    /// No-op if the attachment already left `Processing`.
    pub fn mark_ready_frames(&mut self, frames: Vec<String>) {
        if self.status == AttachmentStatus::Processing {
            self.frames = frames;
            self.status = AttachmentStatus::Ready;
        }
    }

    /// Transition to `Error`. No-op if the attachment already left `Processing`.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        if self.status == AttachmentStatus::Processing {
            self.status = AttachmentStatus::Error(message.into());
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == AttachmentStatus::Ready
    }
}

/// Split a possibly-prefixed data URL into `(mime_type, base64_payload)`.
///
/// `data:image/png;base64,AAAA` yields `(Some("image/png"), "AAAA")`.
/// A bare payload passes through with no mime type.
pub fn split_data_url(data_url: &str) -> (Option<&str>, &str) {
    if let Some(rest) = data_url.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            let mime = if mime.is_empty() { None } else { Some(mime) };
            return (mime, payload);
        }
    }
    (None, data_url)
}

/// Encode raw image bytes as a `data:` URL.
pub fn encode_image(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Encode pending image attachments concurrently.
///
/// Each `(attachment, raw bytes, mime type)` triple is encoded independently;
/// an attachment's own status is the only state touched, so no lock is
/// needed. Video attachments pass through untouched since their frames come
/// from the upstream sampler.
pub async fn preprocess_all(items: Vec<(Attachment, Vec<u8>, String)>) -> Vec<Attachment> {
    let futs = items.into_iter().map(|(mut att, bytes, mime)| async move {
        if att.kind == MediaKind::Image {
            if bytes.is_empty() {
                att.mark_error(format!("empty file: {}", att.name));
            } else {
                let url = encode_image(&bytes, &mime);
                att.mark_ready_image(url);
            }
        }
        att
    });
    join_all(futs).await
}

/// Heterogeneous inputs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct InputBundle {
    /// Free-form requirement text.
    pub text: Option<String>,

    /// External design reference (e.g. a Figma URL).
    pub design_url: Option<String>,

    /// Attachments in selection order.
    pub attachments: Vec<Attachment>,
}

impl InputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_design_url(mut self, url: impl Into<String>) -> Self {
        self.design_url = Some(url.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// At least one of text, design reference, or a ready attachment must be
    /// present for the pipeline to proceed.
    pub fn has_content(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
            || self
                .design_url
                .as_deref()
                .is_some_and(|u| !u.trim().is_empty())
            || self.attachments.iter().any(|a| a.is_ready())
    }
}
