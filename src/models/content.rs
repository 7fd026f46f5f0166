use serde::{Deserialize, Serialize};

/// A file attachment carried alongside message text. `data` holds either a
/// url or base64-encoded bytes depending on `is_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub mime_type: String,
    pub data: String,
    pub is_url: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FilePart {
    pub fn url<M: Into<String>, U: Into<String>>(mime_type: M, url: U) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: url.into(),
            is_url: true,
            filename: None,
        }
    }

    pub fn inline<M: Into<String>, D: Into<String>>(mime_type: M, data: D) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            is_url: false,
            filename: None,
        }
    }

    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Content passed inside a finalized message when it carries more than plain
/// text. The text part, if any, always comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentPart {
    Text { text: String },
    Image(FilePart),
    File(FilePart),
}

impl ContentPart {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Classify a file part by mime type: `image/*` becomes an image part,
    /// everything else a generic file part.
    pub fn from_file(part: FilePart) -> Self {
        if part.is_image() {
            ContentPart::Image(part)
        } else {
            ContentPart::File(part)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FilePart> {
        match self {
            ContentPart::Image(part) | ContentPart::File(part) => Some(part),
            ContentPart::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_part_classification() {
        let image = FilePart::inline("image/png", "aGVsbG8=");
        assert!(matches!(
            ContentPart::from_file(image),
            ContentPart::Image(_)
        ));

        let pdf = FilePart::url("application/pdf", "https://example.com/doc.pdf");
        assert!(matches!(ContentPart::from_file(pdf), ContentPart::File(_)));
    }

    #[test]
    fn test_serialization_shape() {
        let part = ContentPart::from_file(
            FilePart::inline("application/pdf", "QUJD").with_filename("doc.pdf"),
        );
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["mimeType"], "application/pdf");
        assert_eq!(value["isUrl"], false);
        assert_eq!(value["filename"], "doc.pdf");
    }
}
