//! API version type used by the negotiation bootstrap.

use std::fmt;
use std::str::FromStr;

/// Protocol API version, rendered as "MAJOR.MINOR" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The version both sides agree to use, given the peer's maximum:
    /// the lower of the two maxima.
    pub fn agree(self, peer_max: ApiVersion) -> ApiVersion {
        self.min(peer_max)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed API version {0:?}")]
pub struct ParseVersionError(String);

impl FromStr for ApiVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseVersionError(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
