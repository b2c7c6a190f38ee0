//! In-memory feed store.
//!
//! Holds the candidate implementations and signing-key metadata the
//! worker selects from. Seedable for tests; the binary starts from
//! [`FeedStore::sample`].

use std::collections::BTreeMap;

/// One installable implementation of an interface.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub version: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// A signing key attached to a feed, with the hints shown when the
/// driver is asked to confirm it. Hints are `(vote, message)` pairs.
#[derive(Debug, Clone)]
pub struct KeyInfo {
    pub key_id: String,
    pub trusted: bool,
    pub hints: Vec<(String, String)>,
}

impl KeyInfo {
    pub fn trusted(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            trusted: true,
            hints: Vec::new(),
        }
    }

    pub fn untrusted(key_id: impl Into<String>, hints: Vec<(String, String)>) -> Self {
        Self {
            key_id: key_id.into(),
            trusted: false,
            hints,
        }
    }
}

/// A feed: the candidates for one interface URL, best first.
#[derive(Debug, Clone)]
pub struct Feed {
    pub url: String,
    pub candidates: Vec<Candidate>,
    pub keys: Vec<KeyInfo>,
}

#[derive(Debug, Default)]
pub struct FeedStore {
    feeds: BTreeMap<String, Feed>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feed: Feed) {
        self.feeds.insert(feed.url.clone(), feed);
    }

    pub fn get(&self, url: &str) -> Option<&Feed> {
        self.feeds.get(url)
    }

    /// Record that the driver confirmed trust in one of a feed's keys.
    pub fn mark_trusted(&mut self, url: &str, key_id: &str) {
        if let Some(feed) = self.feeds.get_mut(url) {
            for key in &mut feed.keys {
                if key.key_id == key_id {
                    key.trusted = true;
                }
            }
        }
    }

    /// Canned feeds for the standalone binary and demos.
    pub fn sample() -> Self {
        let mut store = Self::new();
        store.insert(Feed {
            url: "http://example.com/hello".to_string(),
            candidates: vec![
                Candidate::new("sha1=hello-1.2", "1.2"),
                Candidate::new("sha1=hello-1.0", "1.0"),
            ],
            keys: vec![KeyInfo::trusted("DE937DD411906ACF7C263B396FCF121BE2390E0B")],
        });
        store.insert(Feed {
            url: "http://example.com/fresh".to_string(),
            candidates: vec![Candidate::new("sha1=fresh-0.9", "0.9")],
            keys: vec![KeyInfo::untrusted(
                "92429807C9853C0744A68B9AAE07828059A53CC1",
                vec![(
                    "vote_good".to_string(),
                    "Key is new to this machine".to_string(),
                )],
            )],
        });
        store
    }
}
