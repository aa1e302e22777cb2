//! Decoding of string uploads.

use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::super::error::PlatformFailure;

// Padding is optional for uploaded strings
const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const BASE64: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// How the string passed to `upload_string` is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// Uploaded as its UTF-8 bytes.
    #[default]
    Raw,
    /// Standard base64 alphabet.
    Base64,
    /// URL-safe base64 alphabet.
    Base64Url,
    /// `data:[<mediatype>][;base64],<data>`; the media type becomes the
    /// object's content type.
    DataUrl,
}

impl StringFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::DataUrl => "data_url",
        }
    }

    /// Decode `data` into the bytes to upload plus, for data URLs, the
    /// declared content type.
    ///
    /// # Errors
    ///
    /// Returns `PlatformFailure::InvalidInput` if `data` is not valid in
    /// this format.
    pub fn decode(self, data: &str) -> Result<(Vec<u8>, Option<String>), PlatformFailure> {
        match self {
            Self::Raw => Ok((data.as_bytes().to_vec(), None)),
            Self::Base64 => decode_base64(&BASE64, data, self).map(|bytes| (bytes, None)),
            Self::Base64Url => decode_base64(&BASE64_URL, data, self).map(|bytes| (bytes, None)),
            Self::DataUrl => decode_data_url(data),
        }
    }
}

impl std::fmt::Display for StringFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StringFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "data_url" => Ok(Self::DataUrl),
            other => Err(format!("unknown string format: {other}")),
        }
    }
}

fn decode_base64(
    engine: &GeneralPurpose,
    data: &str,
    format: StringFormat,
) -> Result<Vec<u8>, PlatformFailure> {
    engine
        .decode(data.trim())
        .map_err(|e| PlatformFailure::InvalidInput(format!("string is not valid {format}: {e}")))
}

fn decode_data_url(data: &str) -> Result<(Vec<u8>, Option<String>), PlatformFailure> {
    let invalid = || PlatformFailure::InvalidInput("string is not a valid data URL".to_string());

    let rest = data.strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;

    let (media_type, is_base64) = meta
        .strip_suffix(";base64")
        .map_or((meta, false), |media_type| (media_type, true));
    let content_type = Some(media_type.to_string()).filter(|t| !t.is_empty());

    let bytes = if is_base64 {
        decode_base64(&BASE64, payload, StringFormat::DataUrl)?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok((bytes, content_type))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_is_utf8() {
        let (bytes, content_type) = StringFormat::Raw.decode("Tempest ✓").unwrap();
        assert_eq!(bytes, "Tempest ✓".as_bytes());
        assert_eq!(content_type, None);
    }

    #[test]
    fn test_base64_with_and_without_padding() {
        assert_eq!(StringFormat::Base64.decode("U2xpbWU=").unwrap().0, b"Slime");
        assert_eq!(StringFormat::Base64.decode("U2xpbWU").unwrap().0, b"Slime");
    }

    #[test]
    fn test_base64url_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet
        assert_eq!(StringFormat::Base64Url.decode("-_8").unwrap().0, [0xfb, 0xff]);
        assert!(StringFormat::Base64.decode("-_8").is_err());
    }

    #[test]
    fn test_invalid_base64() {
        let err = StringFormat::Base64.decode("not base64!").unwrap_err();
        assert!(matches!(err, PlatformFailure::InvalidInput(_)));
    }

    #[test]
    fn test_data_url_base64() {
        let (bytes, content_type) = StringFormat::DataUrl
            .decode("data:image/png;base64,iVBORw==")
            .unwrap();
        assert_eq!(bytes, [0x89, b'P', b'N', b'G']);
        assert_eq!(content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_data_url_percent_encoded() {
        let (bytes, content_type) = StringFormat::DataUrl
            .decode("data:text/plain;charset=utf-8,Hello%2C%20Rimuru")
            .unwrap();
        assert_eq!(bytes, b"Hello, Rimuru");
        assert_eq!(content_type.as_deref(), Some("text/plain;charset=utf-8"));
    }

    #[test]
    fn test_data_url_without_media_type() {
        let (bytes, content_type) = StringFormat::DataUrl.decode("data:,hi").unwrap();
        assert_eq!(bytes, b"hi");
        assert_eq!(content_type, None);
    }

    #[test]
    fn test_data_url_rejects_garbage() {
        assert!(StringFormat::DataUrl.decode("image/png;base64,AAAA").is_err());
        assert!(StringFormat::DataUrl.decode("data:image/png").is_err());
    }

    #[test]
    fn test_format_names() {
        for format in [
            StringFormat::Raw,
            StringFormat::Base64,
            StringFormat::Base64Url,
            StringFormat::DataUrl,
        ] {
            assert_eq!(format.as_str().parse::<StringFormat>().unwrap(), format);
        }
    }
}
