//! File existence probing
//!
//! Every resolution step asks the oracle again; nothing is cached, since a
//! library may lose files at any time.

use crate::types::TrackRef;
use async_trait::async_trait;

/// Answers "does this file still exist"
///
/// `Ok(false)` is a clean nonexistence. `Err(_)` is a probe failure: the
/// resolver prunes the entry either way but counts failures against its
/// retry bound.
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    async fn exists(&self, track: &TrackRef) -> std::io::Result<bool>;
}

/// Filesystem-backed oracle
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOracle;

impl FsOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExistenceOracle for FsOracle {
    async fn exists(&self, track: &TrackRef) -> std::io::Result<bool> {
        if track.is_blank() {
            return Ok(false);
        }
        tokio::fs::try_exists(track).await
    }
}
