//! Data URI parsing for image attachments.

use mutsumi_types::error::ValidationError;
use mutsumi_types::persona::Part;

/// The pieces of a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl From<InlineData> for Part {
    fn from(inline: InlineData) -> Self {
        Part::InlineImage {
            mime_type: inline.mime_type,
            data: inline.data,
        }
    }
}

/// Split a base64 data URI into MIME type and payload.
///
/// The payload is not decoded; both pieces must be non-empty.
pub fn parse_data_uri(uri: &str) -> Result<InlineData, ValidationError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or(ValidationError::MalformedDataUri)?;
    let (mime_type, data) = rest
        .split_once(";base64,")
        .ok_or(ValidationError::MalformedDataUri)?;
    if mime_type.is_empty() || data.is_empty() {
        return Err(ValidationError::MalformedDataUri);
    }
    Ok(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let parsed = parse_data_uri("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "image/png;base64,abc",
            "data:image/png,abc",
            "data:;base64,abc",
            "data:image/png;base64,",
        ] {
            assert_eq!(parse_data_uri(bad), Err(ValidationError::MalformedDataUri), "{bad}");
        }
    }
}
