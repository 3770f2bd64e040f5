//! JWE compact serialization.
//!
//! `BASE64URL(header) . BASE64URL(encrypted key) . BASE64URL(iv) .
//! BASE64URL(ciphertext) . BASE64URL(tag)`

use super::content::Sealed;
use super::header::ProtectedHeader;
use crate::error::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

const SEGMENTS: usize = 5;

/// A compact token split into its decoded parts.
#[derive(Debug)]
pub(crate) struct CompactParts<'a> {
    /// Raw header segment, used verbatim as additional data
    pub header_segment: &'a str,
    pub header: ProtectedHeader,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl<'a> CompactParts<'a> {
    /// Split and decode a compact token.
    ///
    /// The encrypted-key segment must be empty: `dir` carries no wrapped key.
    pub(crate) fn parse(token: &'a str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != SEGMENTS {
            return Err(TokenError::malformed(format!(
                "expected {} segments, found {}",
                SEGMENTS,
                segments.len()
            )));
        }

        let header = ProtectedHeader::from_segment(segments[0])?;
        if !segments[1].is_empty() {
            return Err(TokenError::malformed("unexpected encrypted key segment"));
        }

        Ok(Self {
            header_segment: segments[0],
            header,
            iv: decode_segment(segments[2], "initialization vector")?,
            ciphertext: decode_segment(segments[3], "ciphertext")?,
            tag: decode_segment(segments[4], "authentication tag")?,
        })
    }
}

/// Join an already-encoded header segment with sealed content.
pub(crate) fn serialize(header_segment: &str, sealed: &Sealed) -> String {
    format!(
        "{}..{}.{}.{}",
        header_segment,
        URL_SAFE_NO_PAD.encode(&sealed.iv),
        URL_SAFE_NO_PAD.encode(&sealed.ciphertext),
        URL_SAFE_NO_PAD.encode(&sealed.tag)
    )
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, TokenError> {
    if segment.is_empty() {
        return Err(TokenError::malformed(format!("{} segment is empty", name)));
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::malformed(format!("{} segment is not base64url", name)))
}
