//! Prompt assembly: turn an [`InputBundle`] into ordered multimodal parts.
//!
//! This is a pure transform. It never touches the network and signals
//! [`PipelineError::NoContent`] when the resulting part sequence would be
//! empty, so empty input short-circuits before any call is made.

use crate::attachment::{split_data_url, InputBundle, MediaKind};
use crate::error::{PipelineError, Result};
use crate::types::Finding;

/// Keyframes are always re-encoded as JPEG by the upstream sampler,
/// regardless of the source video codec.
pub const FRAME_MIME_TYPE: &str = "image/jpeg";

/// One element of a multimodal request.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// A plain text segment.
    Text(String),

    /// An inline binary segment: mime type plus base64 payload with any
    /// data-URI prefix already stripped.
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(content: impl Into<String>) -> Self {
        Part::Text(content.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Assemble the ordered part sequence for a bundle.
///
/// Order: free text; design reference; per attachment (input order) a
/// descriptive text part followed by its inline payload(s); then the
/// optional trailing instructions.
pub fn assemble_parts(bundle: &InputBundle, extra_instructions: Option<&str>) -> Result<Vec<Part>> {
    let mut parts = Vec::new();

    if let Some(text) = bundle.text.as_deref() {
        if !text.trim().is_empty() {
            parts.push(Part::text(format!("Requirement text:\n{}", text)));
        }
    }

    if let Some(url) = bundle.design_url.as_deref() {
        if !url.trim().is_empty() {
            parts.push(Part::text(format!("External design reference: {}", url)));
        }
    }

    for att in &bundle.attachments {
        if !att.is_ready() {
            continue;
        }
        match att.kind {
            MediaKind::Image => {
                if let Some(ref data_url) = att.data_url {
                    let (mime, payload) = split_data_url(data_url);
                    parts.push(Part::text(format!("Attached screenshot: {}", att.name)));
                    parts.push(Part::inline(mime.unwrap_or("image/png"), payload));
                }
            }
            MediaKind::Video => {
                if !att.frames.is_empty() {
                    parts.push(Part::text(format!(
                        "Keyframes sampled from video {} ({} frames, in order):",
                        att.name,
                        att.frames.len()
                    )));
                    for frame in &att.frames {
                        let (_, payload) = split_data_url(frame);
                        parts.push(Part::inline(FRAME_MIME_TYPE, payload));
                    }
                }
            }
        }
    }

    if let Some(extra) = extra_instructions {
        if !extra.trim().is_empty() {
            parts.push(Part::text(extra.to_string()));
        }
    }

    if parts.is_empty() {
        return Err(PipelineError::NoContent);
    }

    Ok(parts)
}

/// Render findings as instruction context, one line per finding:
/// `category (story-id-or-N/A): description`.
pub fn findings_context(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(Finding::context_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text in a labeled section for structured prompts.
pub fn section(label: &str, content: &str) -> String {
    format!("## {}\n{}", label, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Attachment;

    fn ready_image(name: &str, data_url: &str) -> Attachment {
        let mut att = Attachment::pending(name, name, 1, MediaKind::Image);
        att.mark_ready_image(data_url);
        att
    }

    fn ready_video(name: &str, frames: Vec<String>) -> Attachment {
        let mut att = Attachment::pending(name, name, 1, MediaKind::Video);
        att.mark_ready_frames(frames);
        att
    }

    #[test]
    fn test_empty_bundle_is_no_content() {
        let result = assemble_parts(&InputBundle::new(), None);
        assert!(matches!(result, Err(PipelineError::NoContent)));
    }

    #[test]
    fn test_text_part_comes_first() {
        let bundle = InputBundle::new()
            .with_text("Users can log in")
            .with_design_url("https://example.com/d");
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], Part::Text(t) if t.contains("Users can log in")));
        assert!(matches!(&parts[1], Part::Text(t) if t.contains("https://example.com/d")));
    }

    #[test]
    fn test_image_emits_description_then_inline_with_prefix_stripped() {
        let bundle = InputBundle::new()
            .with_attachment(ready_image("login.png", "data:image/png;base64,AAAA"));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], Part::Text(t) if t.contains("login.png")));
        assert_eq!(parts[1], Part::inline("image/png", "AAAA"));
    }

    #[test]
    fn test_video_emits_one_inline_part_per_frame_as_jpeg() {
        let bundle = InputBundle::new().with_attachment(ready_video(
            "flow.mp4",
            vec!["AAAA".into(), "BBBB".into(), "CCCC".into()],
        ));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts.len(), 4);
        for (i, frame) in ["AAAA", "BBBB", "CCCC"].iter().enumerate() {
            assert_eq!(parts[i + 1], Part::inline(FRAME_MIME_TYPE, *frame));
        }
    }

    #[test]
    fn test_video_with_no_frames_contributes_nothing() {
        let bundle = InputBundle::new()
            .with_text("x")
            .with_attachment(ready_video("flow.mp4", vec![]));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_processing_attachment_is_skipped() {
        let bundle = InputBundle::new()
            .with_text("x")
            .with_attachment(Attachment::pending("1", "a.png", 1, MediaKind::Image));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_extra_instructions_are_last() {
        let bundle = InputBundle::new()
            .with_text("x")
            .with_attachment(ready_image("a.png", "AAAA"));
        let parts = assemble_parts(&bundle, Some("Focus on error states")).unwrap();
        assert!(matches!(
            parts.last().unwrap(),
            Part::Text(t) if t == "Focus on error states"
        ));
    }

    #[test]
    fn test_bare_payload_defaults_to_png() {
        let bundle = InputBundle::new().with_attachment(ready_image("a.png", "AAAA"));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert_eq!(parts[1], Part::inline("image/png", "AAAA"));
    }

    #[test]
    fn test_attachment_order_is_preserved() {
        let bundle = InputBundle::new()
            .with_attachment(ready_image("first.png", "AAAA"))
            .with_attachment(ready_image("second.png", "BBBB"));
        let parts = assemble_parts(&bundle, None).unwrap();
        assert!(matches!(&parts[0], Part::Text(t) if t.contains("first.png")));
        assert!(matches!(&parts[2], Part::Text(t) if t.contains("second.png")));
    }

    #[test]
    fn test_findings_context_lines() {
        let findings = vec![
            Finding {
                category: "Ambiguity".into(),
                description: "Timeout unspecified".into(),
                story_id: Some("US-7".into()),
            },
            Finding {
                category: "Gap".into(),
                description: "No error state".into(),
                story_id: None,
            },
        ];
        assert_eq!(
            findings_context(&findings),
            "Ambiguity (US-7): Timeout unspecified\nGap (N/A): No error state"
        );
    }

    #[test]
    fn test_section() {
        assert_eq!(section("Findings", "none"), "## Findings\nnone");
    }
}
