//! Observed facts about a scan target.
//!
//! All scanners produce a `FactBundle`. The engine consumes facts.
//! This decouples how a datum was observed (live probe, recorded
//! bundle, cloud API) from how it is judged.

use serde::{Deserialize, Serialize};

/// A single observed datum about a target, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    /// A TCP port found open, with the service name reported for it.
    OpenPort { port: u16, service: String },
    /// Raw banner text captured from an open service.
    ServiceBanner { port: u16, banner: String },
    /// An HTTP response header that was expected but absent.
    HttpHeaderMissing { header: String },
    /// An HTTP response header that was present, with its value.
    HttpHeader { header: String, value: String },
    /// Access posture of a storage bucket.
    BucketAcl { bucket: String, public: bool },
}

/// Discriminant for `Fact`, used to key the engine's rule index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    OpenPort,
    ServiceBanner,
    HttpHeaderMissing,
    HttpHeader,
    BucketAcl,
}

impl Fact {
    pub fn kind(&self) -> FactKind {
        match self {
            Self::OpenPort { .. } => FactKind::OpenPort,
            Self::ServiceBanner { .. } => FactKind::ServiceBanner,
            Self::HttpHeaderMissing { .. } => FactKind::HttpHeaderMissing,
            Self::HttpHeader { .. } => FactKind::HttpHeader,
            Self::BucketAcl { .. } => FactKind::BucketAcl,
        }
    }
}

impl std::fmt::Display for FactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenPort => write!(f, "open_port"),
            Self::ServiceBanner => write!(f, "service_banner"),
            Self::HttpHeaderMissing => write!(f, "http_header_missing"),
            Self::HttpHeader => write!(f, "http_header"),
            Self::BucketAcl => write!(f, "bucket_acl"),
        }
    }
}

impl FactKind {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open_port" | "port" => Some(Self::OpenPort),
            "service_banner" | "banner" => Some(Self::ServiceBanner),
            "http_header_missing" => Some(Self::HttpHeaderMissing),
            "http_header" => Some(Self::HttpHeader),
            "bucket_acl" | "bucket" => Some(Self::BucketAcl),
            _ => None,
        }
    }
}

/// A finite ordered sequence of facts, all about one target.
///
/// The target identifier is an IP, a URL, or a cloud profile name,
/// depending on which scanner produced the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactBundle {
    pub target: String,
    pub facts: Vec<Fact>,
}

impl FactBundle {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            facts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
