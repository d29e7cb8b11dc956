use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::domain::error::EncodingError;

pub const SEGMENT_SEPARATOR: char = '$';

/// Longest scheme tag echoed back in error messages.
const MAX_ECHOED_TAG_LEN: usize = 32;

/// Identifies the algorithm and parameter layout that produced an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemeTag {
    /// Salted, iterated block-cipher hash (bcrypt / Eksblowfish)
    #[serde(rename = "v1-iterated")]
    Iterated,
    /// Memory-hard key derivation (Argon2id)
    #[serde(rename = "v1-memhard")]
    MemoryHard,
}

impl SchemeTag {
    pub const ALL: [SchemeTag; 2] = [SchemeTag::Iterated, SchemeTag::MemoryHard];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeTag::Iterated => "v1-iterated",
            SchemeTag::MemoryHard => "v1-memhard",
        }
    }
}

impl fmt::Display for SchemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeTag {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| EncodingError::UnknownScheme(echo_tag(s)))
    }
}

/// Only short tags shaped like `v<digits>-<alphanumerics>` are repeated in
/// errors; anything else may be a mis-stored secret.
fn echo_tag(tag: &str) -> String {
    let tag_shaped = tag.len() <= MAX_ECHOED_TAG_LEN
        && tag
            .strip_prefix('v')
            .and_then(|rest| rest.split_once('-'))
            .is_some_and(|(version, name)| {
                !version.is_empty()
                    && version.bytes().all(|b| b.is_ascii_digit())
                    && !name.is_empty()
                    && name.bytes().all(|b| b.is_ascii_alphanumeric())
            });
    if tag_shaped {
        tag.to_string()
    } else {
        "<unrecognized>".to_string()
    }
}

/// Value object holding a self-describing credential encoding
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedCredential(String);

impl EncodedCredential {
    /// Wrap a stored encoding without validating it
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Reads the leading scheme tag without validating the remaining segments.
    pub fn scheme(&self) -> Result<SchemeTag, EncodingError> {
        match self.0.split_once(SEGMENT_SEPARATOR) {
            Some((tag, _)) => tag.parse(),
            None => Err(EncodingError::MalformedEncoding(
                "missing scheme tag separator".to_string(),
            )),
        }
    }
}

impl fmt::Debug for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = self.scheme().map(|tag| tag.as_str()).unwrap_or("unrecognized");
        f.debug_struct("EncodedCredential")
            .field("scheme", &scheme)
            .finish_non_exhaustive()
    }
}

/// Decoded view of `<scheme-tag>$<param>...$<salt-base64>$<digest-base64>`.
pub struct EncodedParts<'a> {
    pub scheme: SchemeTag,
    params: Vec<&'a str>,
    pub salt: Vec<u8>,
    pub digest: Vec<u8>,
}

impl<'a> EncodedParts<'a> {
    /// Splits and decodes an encoding that must carry `expected` and exactly
    /// `param_count` numeric parameters.
    pub fn parse(
        encoded: &'a EncodedCredential,
        expected: SchemeTag,
        param_count: usize,
    ) -> Result<Self, EncodingError> {
        let scheme = encoded.scheme().map_err(|e| match e {
            EncodingError::UnknownScheme(tag) => {
                EncodingError::MalformedEncoding(format!("foreign scheme tag {tag}"))
            }
            other => other,
        })?;
        if scheme != expected {
            return Err(EncodingError::MalformedEncoding(format!(
                "expected scheme {expected}, found {scheme}"
            )));
        }

        let segments: Vec<&str> = encoded.as_str().split(SEGMENT_SEPARATOR).collect();
        let segment_count = param_count + 3;
        if segments.len() != segment_count {
            return Err(EncodingError::MalformedEncoding(format!(
                "{scheme} expects {segment_count} segments, found {}",
                segments.len()
            )));
        }

        let salt = decode_segment(segments[segment_count - 2], "salt")?;
        let digest = decode_segment(segments[segment_count - 1], "digest")?;

        Ok(Self {
            scheme,
            params: segments[1..=param_count].to_vec(),
            salt,
            digest,
        })
    }

    /// Numeric parameter at `index`, in canonical decimal form.
    pub fn param(&self, index: usize, name: &str) -> Result<u32, EncodingError> {
        let raw = self.params.get(index).ok_or_else(|| {
            EncodingError::MalformedEncoding(format!("missing parameter {name}"))
        })?;
        parse_decimal(raw, name)
    }

    /// Renders the canonical encoding for the given pieces.
    pub fn format(
        scheme: SchemeTag,
        params: &[u32],
        salt: &[u8],
        digest: &[u8],
    ) -> EncodedCredential {
        let mut encoded = String::from(scheme.as_str());
        for param in params {
            encoded.push(SEGMENT_SEPARATOR);
            encoded.push_str(&param.to_string());
        }
        encoded.push(SEGMENT_SEPARATOR);
        encoded.push_str(&STANDARD_NO_PAD.encode(salt));
        encoded.push(SEGMENT_SEPARATOR);
        encoded.push_str(&STANDARD_NO_PAD.encode(digest));
        EncodedCredential(encoded)
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, EncodingError> {
    if segment.is_empty() {
        return Err(EncodingError::MalformedEncoding(format!("empty {name}")));
    }
    STANDARD_NO_PAD
        .decode(segment)
        .map_err(|_| EncodingError::MalformedEncoding(format!("{name} is not valid base64")))
}

fn parse_decimal(raw: &str, name: &str) -> Result<u32, EncodingError> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));
    if !canonical {
        return Err(EncodingError::MalformedEncoding(format!(
            "{name} is not a decimal number"
        )));
    }
    raw.parse()
        .map_err(|_| EncodingError::MalformedEncoding(format!("{name} is out of range")))
}
