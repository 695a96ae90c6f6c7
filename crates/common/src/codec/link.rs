//! Share links: the requestor's exported public key as a URL parameter
//!
//! The token is plain standard base64 of the exported key bytes. The link is
//! the configured base URL with the token in its `key` query parameter; the
//! presence of that parameter is what puts a page (or `hush open`) in sender
//! mode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;

/// Query parameter carrying the public key token
pub const KEY_PARAM: &str = "key";

/// Errors produced while reading a share link
///
/// These are link problems, never decryption problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("link token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("link has no `{}` parameter", KEY_PARAM)]
    MissingKey,
    #[error("link is empty")]
    Empty,
}

/// Encode exported key bytes as a link token
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a link token back into exported key bytes
///
/// ASCII whitespace is ignored so that tokens wrapped across lines by a chat
/// client still decode.
pub fn decode(token: &str) -> Result<Vec<u8>, LinkError> {
    let compact: String = token.split_ascii_whitespace().collect();
    if compact.is_empty() {
        return Err(LinkError::Empty);
    }
    Ok(STANDARD.decode(compact)?)
}

/// Build the share link for an exported public key
///
/// Any existing `key` parameter on `base` is replaced; other parameters are kept.
pub fn share_url(base: &Url, exported: &[u8]) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| name != KEY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (name, value) in &kept {
            query.append_pair(name, value);
        }
        query.append_pair(KEY_PARAM, &encode(exported));
    }
    url
}

/// Extract the `key` token from a link, if present
pub fn key_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == KEY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Accept either a full share link or a bare token and return the token
///
/// Input that parses as an absolute URL must carry a `key` parameter; anything
/// else is treated as the token itself.
pub fn token_from_input(input: &str) -> Result<String, LinkError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LinkError::Empty);
    }
    match Url::parse(input) {
        Ok(url) => key_param(&url).ok_or(LinkError::MissingKey),
        Err(_) => Ok(input.to_string()),
    }
}
