//! The only writer of ownership records.

use tracing::debug;

use crate::manifest::{Manifest, OwnedFiles, Thread};

/// Applies ownership changes to a manifest.
pub struct Ledger<'m> {
    manifest: &'m mut Manifest,
}

impl<'m> Ledger<'m> {
    pub fn new(manifest: &'m mut Manifest) -> Self {
        Self { manifest }
    }

    /// Read access for conflict checks between updates.
    pub fn manifest(&self) -> &Manifest {
        self.manifest
    }

    /// Take `file_name` under `dir` away from `loser` after another thread
    /// wrote it.
    pub fn revoke(&mut self, loser: &str, dir: &str, file_name: &str) {
        let revoked = self
            .manifest
            .thread_mut(loser)
            .map(|t| t.files.remove(dir, file_name))
            .unwrap_or(false);
        if revoked {
            debug!(thread = %loser, dir = %dir, file = %file_name, "ownership revoked");
        }
    }

    /// Set `thread`'s files to exactly `written`.
    pub fn commit_thread(&mut self, thread: &str, written: OwnedFiles) {
        debug!(thread = %thread, files = written.len(), "recording thread files");
        self.manifest.replace_thread_files(thread, written);
    }

    /// Record an added thread: update in place or append.
    pub fn upsert(&mut self, thread: &str, source: &str, written: OwnedFiles) {
        debug!(thread = %thread, source = %source, files = written.len(), "recording added thread");
        self.manifest.upsert_thread(thread, source, written);
    }

    pub fn remove_thread(&mut self, thread: &str) -> Option<Thread> {
        self.manifest.remove_thread(thread)
    }

    /// Drop every thread record.
    pub fn clear(&mut self) -> Vec<Thread> {
        std::mem::take(&mut self.manifest.threads)
    }
}
