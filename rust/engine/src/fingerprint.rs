//! Hand tags: stable digests of a deal's canonical encoding.
//!
//! With the `crypto-tag` feature (on by default) tags are lowercase SHA-256
//! hex. Without it the non-cryptographic XXH3-128 digest is used and rendered
//! as `xxh3:<32 hex>`, so the two kinds never compare equal.

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const XXH3_PREFIX: &str = "xxh3:";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagAlgorithm {
    Sha256,
    Xxh3_128,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagConfidence {
    /// Collision resistant
    Cryptographic,
    /// Deterministic, but only for bookkeeping
    NonCryptographic,
}

impl TagAlgorithm {
    /// The best algorithm compiled into this build.
    pub fn preferred() -> Self {
        if cfg!(feature = "crypto-tag") {
            TagAlgorithm::Sha256
        } else {
            TagAlgorithm::Xxh3_128
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            TagAlgorithm::Sha256 => cfg!(feature = "crypto-tag"),
            TagAlgorithm::Xxh3_128 => true,
        }
    }

    pub fn confidence(self) -> TagConfidence {
        match self {
            TagAlgorithm::Sha256 => TagConfidence::Cryptographic,
            TagAlgorithm::Xxh3_128 => TagConfidence::NonCryptographic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TagAlgorithm::Sha256 => "sha256",
            TagAlgorithm::Xxh3_128 => "xxh3-128",
        }
    }
}

/// Identifier of a dealt layout.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandTag {
    value: String,
    algorithm: TagAlgorithm,
}

impl HandTag {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn algorithm(&self) -> TagAlgorithm {
        self.algorithm
    }

    pub fn confidence(&self) -> TagConfidence {
        self.algorithm.confidence()
    }

    /// Reads a tag back from its text form, inferring the algorithm.
    pub fn parse(text: &str) -> Option<HandTag> {
        let t = text.trim();
        let (algorithm, digits, len) = match t.strip_prefix(XXH3_PREFIX) {
            Some(rest) => (TagAlgorithm::Xxh3_128, rest, 32),
            None => (TagAlgorithm::Sha256, t, 64),
        };
        let well_formed = digits.len() == len
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        well_formed.then(|| HandTag {
            value: t.to_string(),
            algorithm,
        })
    }
}

impl fmt::Display for HandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Digest `bytes` with the preferred algorithm.
///
/// ```
/// use klondike_engine::fingerprint::fingerprint;
///
/// let a = fingerprint(b"layout");
/// assert_eq!(a, fingerprint(b"layout"));
/// assert_ne!(a, fingerprint(b"other layout"));
/// ```
pub fn fingerprint(bytes: &[u8]) -> HandTag {
    fingerprint_with(bytes, TagAlgorithm::preferred())
}

/// Digest `bytes` with `algorithm`, falling back to XXH3-128 when it is not
/// compiled in.
pub fn fingerprint_with(bytes: &[u8], algorithm: TagAlgorithm) -> HandTag {
    let algorithm = if algorithm.is_available() {
        algorithm
    } else {
        TagAlgorithm::Xxh3_128
    };
    let value = match algorithm {
        #[cfg(feature = "crypto-tag")]
        TagAlgorithm::Sha256 => sha256_hex(bytes),
        // Xxh3_128, and Sha256 in builds without `crypto-tag`
        _ => format!("{}{:032x}", XXH3_PREFIX, xxhash_rust::xxh3::xxh3_128(bytes)),
    };
    match algorithm.confidence() {
        TagConfidence::Cryptographic => {
            info!(algorithm = algorithm.name(), tag = %value, "hand tag computed");
        }
        TagConfidence::NonCryptographic => {
            warn!(
                algorithm = algorithm.name(),
                tag = %value,
                "cryptographic hash unavailable, hand tag uses fallback digest"
            );
        }
    }
    HandTag { value, algorithm }
}

#[cfg(feature = "crypto-tag")]
fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}

/// Resolution state of a hand tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TagStatus {
    Pending,
    Resolved(HandTag),
}

impl TagStatus {
    pub fn tag(&self) -> Option<&HandTag> {
        match self {
            TagStatus::Pending => None,
            TagStatus::Resolved(t) => Some(t),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TagStatus::Pending)
    }
}

/// A hand tag being computed on a worker thread.
#[derive(Debug)]
pub struct PendingTag {
    rx: Option<Receiver<HandTag>>,
    input: Vec<u8>,
    resolved: Option<HandTag>,
}

impl PendingTag {
    pub fn spawn(bytes: Vec<u8>) -> Self {
        let (tx, rx) = mpsc::channel();
        let payload = bytes.clone();
        let spawned = thread::Builder::new()
            .name("hand-tag".into())
            .spawn(move || {
                let _ = tx.send(fingerprint(&payload));
            });
        match spawned {
            Ok(_) => Self {
                rx: Some(rx),
                input: bytes,
                resolved: None,
            },
            Err(e) => {
                warn!(error = %e, "could not start hand tag worker, hashing inline");
                let tag = fingerprint(&bytes);
                Self {
                    rx: None,
                    input: bytes,
                    resolved: Some(tag),
                }
            }
        }
    }

    /// Non-blocking. Returns `Resolved` once the worker has delivered.
    pub fn poll(&mut self) -> TagStatus {
        if self.resolved.is_none() {
            if let Some(rx) = &self.rx {
                match rx.try_recv() {
                    Ok(tag) => self.resolved = Some(tag),
                    Err(TryRecvError::Empty) => return TagStatus::Pending,
                    Err(TryRecvError::Disconnected) => {
                        self.resolved = Some(fingerprint(&self.input));
                    }
                }
            }
        }
        self.current()
    }

    /// Blocks until the tag is available.
    pub fn wait(&mut self) -> HandTag {
        if let Some(tag) = &self.resolved {
            return tag.clone();
        }
        let tag = self
            .rx
            .as_ref()
            .and_then(|rx| rx.recv().ok())
            .unwrap_or_else(|| fingerprint(&self.input));
        self.resolved = Some(tag.clone());
        tag
    }

    fn current(&self) -> TagStatus {
        match &self.resolved {
            Some(t) => TagStatus::Resolved(t.clone()),
            None => TagStatus::Pending,
        }
    }
}
