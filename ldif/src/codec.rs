//! Attribute value encoding: `attr: value`, `attr:: base64` and `attr:< url`.

use std::io;

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, warn};
use url::Url;

use crate::config::CaseInsensitiveSet;
use crate::dn::needs_base64;
use crate::error::{LdifError, Result};

/// Source of the bytes behind an `attr:< url` value.
pub trait Fetch {
    fn fetch(&mut self, url: &Url) -> io::Result<Vec<u8>>;
}

impl<F> Fetch for F
where
    F: FnMut(&Url) -> io::Result<Vec<u8>>,
{
    fn fetch(&mut self, url: &Url) -> io::Result<Vec<u8>> {
        self(url)
    }
}

/// Resolves `file://` URLs against the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&mut self, url: &Url) -> io::Result<Vec<u8>> {
        if url.scheme() != "file" {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported URL scheme {:?}", url.scheme()),
            ));
        }
        let path = url.to_file_path().map_err(|()| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("not a local path: {}", url))
        })?;
        std::fs::read(path)
    }
}

/// Why a line was dropped without failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No colon separating attribute type and value.
    Malformed,
    /// `attr:< url` whose scheme is not configured for processing.
    UrlSchemeNotAllowed,
    /// The URL could not be dereferenced.
    FetchFailed,
}

/// Classification of one unfolded, non-comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdifLine {
    Pair { attr: String, value: Vec<u8> },
    /// A line consisting of `-` only.
    Separator,
    Blank,
    Skipped(SkipReason),
}

fn trim_ascii(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|c| !c.is_ascii_whitespace()).unwrap_or(data.len());
    let end = data.iter().rposition(|c| !c.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &data[start..end]
}

/// Split `text` into attribute type and decoded value.
///
/// `line` is only used for error messages.  URL values are dereferenced
/// through `fetcher` when their scheme is listed in `url_schemes`.
pub fn decode_line(
    text: &[u8],
    line: usize,
    url_schemes: &CaseInsensitiveSet,
    fetcher: &mut dyn Fetch,
) -> Result<LdifLine> {
    if text.is_empty() {
        return Ok(LdifLine::Blank);
    }
    if text == b"-" {
        return Ok(LdifLine::Separator);
    }
    let colon = match text.iter().position(|&c| c == b':') {
        Some(i) => i,
        None => return Ok(LdifLine::Skipped(SkipReason::Malformed)),
    };
    let attr = String::from_utf8_lossy(&text[..colon]).into_owned();
    let rest = &text[colon + 1..];

    let value = match rest.first() {
        Some(b':') => STANDARD
            .decode(trim_ascii(&rest[1..]))
            .map_err(|source| LdifError::Base64 { line, source })?,
        Some(b'<') => {
            let url = String::from_utf8_lossy(trim_ascii(&rest[1..])).into_owned();
            match fetch_url(&url, url_schemes, fetcher) {
                Ok(data) => data,
                Err(reason) => {
                    debug!(line, attr = %attr, url = %url, ?reason, "URL value dropped");
                    return Ok(LdifLine::Skipped(reason));
                }
            }
        }
        _ => {
            let start = rest.iter().position(|&c| c != b' ').unwrap_or(rest.len());
            rest[start..].to_vec()
        }
    };
    Ok(LdifLine::Pair { attr, value })
}

fn fetch_url(
    url: &str,
    url_schemes: &CaseInsensitiveSet,
    fetcher: &mut dyn Fetch,
) -> std::result::Result<Vec<u8>, SkipReason> {
    if url_schemes.is_empty() {
        return Err(SkipReason::UrlSchemeNotAllowed);
    }
    let parsed = Url::parse(url).map_err(|_| SkipReason::UrlSchemeNotAllowed)?;
    if !url_schemes.contains(parsed.scheme()) {
        return Err(SkipReason::UrlSchemeNotAllowed);
    }
    fetcher.fetch(&parsed).map_err(|e| {
        warn!(url = %parsed, error = %e, "fetching attribute value failed");
        SkipReason::FetchFailed
    })
}

/// Render one logical (unfolded) attribute line.
///
/// Values that are not SAFE-STRINGs, and values of types listed in
/// `base64_attrs`, are written as `attr:: base64`.
pub fn encode_attr_value(attr: &str, value: &[u8], base64_attrs: &CaseInsensitiveSet) -> String {
    if base64_attrs.contains(attr) || needs_base64(value) {
        format!("{}:: {}", attr, STANDARD.encode(value))
    } else {
        format!("{}: {}", attr, String::from_utf8_lossy(value))
    }
}
