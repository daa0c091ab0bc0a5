use url::{Host, Url};

use crate::error::{Error, Result};

/// A parsed URL reduced to the two strings that are hashed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    url: String,
    domain: String,
}

impl CanonicalUrl {
    /// The normalized serialization. This is what the store persists.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The registrable domain: the last two labels of a DNS host, or the
    /// whole host for IP addresses and single or two-label names.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

/// Parses and normalizes `input`.
///
/// Scheme and host are lower-cased, default ports and dot segments are
/// removed and percent-encoding is normalized, so equivalent spellings of
/// one URL share an identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if `input` does not parse or has no host.
///
/// # Example
///
/// ```
/// use muid::store::canonicalize;
///
/// let url = canonicalize("HTTP://Www.Music.Example.COM:80/a/../band").unwrap();
/// assert_eq!(url.as_str(), "http://www.music.example.com/band");
/// assert_eq!(url.domain(), "example.com");
/// ```
pub fn canonicalize(input: &str) -> Result<CanonicalUrl> {
    let parsed = Url::parse(input).map_err(|e| invalid(input, e.to_string()))?;
    let domain = match parsed.host() {
        Some(Host::Domain(host)) => registrable_domain(host).to_owned(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(invalid(input, "missing host")),
    };
    Ok(CanonicalUrl {
        url: parsed.into(),
        domain,
    })
}

fn invalid(input: &str, reason: impl Into<String>) -> Error {
    Error::InvalidUrl {
        url: input.to_owned(),
        reason: reason.into(),
    }
}

fn registrable_domain(host: &str) -> &str {
    let host = host.strip_suffix('.').unwrap_or(host);
    match host.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &host[idx + 1..],
        None => host,
    }
}
