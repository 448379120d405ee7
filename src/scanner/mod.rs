//! Scanner collaborators.
//!
//! Probing is external to the findings engine: a scanner produces a
//! `FactBundle`, the engine judges it. The capability set (network,
//! cloud, web) is polymorphic over one `produce_facts` contract, so a
//! new check module is a new `Scanner` implementor, not a new branch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fact::FactBundle;

/// What a scanner knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Network,
    Cloud,
    Web,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Cloud => write!(f, "cloud"),
            Self::Web => write!(f, "web"),
        }
    }
}

/// Failures on the scanner side of the contract. The engine never sees
/// these; the caller surfaces them and feeds no facts downstream.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Target '{0}' is unreachable")]
    UnreachableTarget(String),

    #[error("Scan of '{target}' timed out after {seconds}s")]
    Timeout { target: String, seconds: u64 },

    #[error("No scanner registered for capability '{0}'")]
    NoScanner(Capability),

    #[error("Recorded bundle at {path}: {message}")]
    Recorded { path: PathBuf, message: String },
}

/// A scanner probes one target and reports what it observed.
pub trait Scanner: Send + Sync {
    /// The capability this scanner provides.
    fn capability(&self) -> Capability;

    /// Probe the target and produce its fact bundle.
    fn produce_facts(&self, target: &str) -> Result<FactBundle, ScanError>;
}

impl<'a> std::fmt::Debug for dyn Scanner + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("capability", &self.capability())
            .finish()
    }
}

/// Pick the scanner serving a capability. First registered wins.
pub fn scanner_for<'a>(
    scanners: &'a [Box<dyn Scanner>],
    capability: Capability,
) -> Result<&'a dyn Scanner, ScanError> {
    scanners
        .iter()
        .find(|s| s.capability() == capability)
        .map(|s| s.as_ref())
        .ok_or(ScanError::NoScanner(capability))
}

/// Read a fact bundle from a JSON file on disk.
pub fn load_bundle(path: &Path) -> Result<FactBundle, ScanError> {
    let recorded = |message: String| ScanError::Recorded {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| recorded(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| recorded(e.to_string()))
}

/// A scanner backed by a recorded fact bundle on disk, in the shape a
/// live scanner would emit. It can only "reach" the target its
/// recording is about; any other target is unreachable.
pub struct RecordedScanner {
    capability: Capability,
    path: PathBuf,
}

impl RecordedScanner {
    pub fn new(capability: Capability, path: impl Into<PathBuf>) -> Self {
        Self {
            capability,
            path: path.into(),
        }
    }
}

impl Scanner for RecordedScanner {
    fn capability(&self) -> Capability {
        self.capability
    }

    fn produce_facts(&self, target: &str) -> Result<FactBundle, ScanError> {
        let bundle = load_bundle(&self.path)?;
        if bundle.target != target {
            tracing::debug!(
                requested = target,
                recorded = %bundle.target,
                "recorded bundle is for a different target"
            );
            return Err(ScanError::UnreachableTarget(target.to_string()));
        }
        Ok(bundle)
    }
}
