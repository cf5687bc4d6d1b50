//! Binary attachment handling
//!
//! Storage hands back `Option<Vec<u8>>`; this is the single point where a
//! stored large object becomes an HTTP byte stream with a content type and
//! a download name.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Bundled fallback served when a user has no profile image
pub const DEFAULT_PROFILE_IMAGE: &[u8] = include_bytes!("../../assets/default_profile.png");

/// An in-memory binary payload ready to stream back to the client
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl Attachment {
    pub fn pdf(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: "application/pdf",
            filename: filename.into(),
        }
    }

    pub fn png(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: "image/png",
            filename: filename.into(),
        }
    }

    /// The default profile picture
    pub fn default_profile_image() -> Self {
        Self::png(DEFAULT_PROFILE_IMAGE.to_vec(), "default_profile.png")
    }
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        // Quotes and control characters would corrupt the header value
        let safe_name: String = self
            .filename
            .chars()
            .map(|c| if c == '"' || c.is_control() { '_' } else { c })
            .collect();

        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", safe_name),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_attachment_metadata() {
        let att = Attachment::pdf(vec![1, 2, 3], "book_7.pdf");
        assert_eq!(att.content_type, "application/pdf");
        assert_eq!(att.filename, "book_7.pdf");
    }

    #[test]
    fn default_image_is_png() {
        let att = Attachment::default_profile_image();
        assert_eq!(att.content_type, "image/png");
        // PNG signature
        assert_eq!(&att.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
