use std::collections::VecDeque;

use crate::project::Project;

/// Maximum number of snapshots retained.
pub const HISTORY_LIMIT: usize = 50;

/// Snapshot-based undo history.
///
/// Every entry is a full serialized [`Project`]. Entry 0 is the state the
/// session started from; undo always leaves at least that entry in place.
#[derive(Debug)]
pub struct SnapshotHistory {
    entries: VecDeque<String>,
    limit: usize,
    restoring: bool,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
            restoring: false,
        }
    }

    /// Drop all history and make `project` the base entry.
    pub fn reset(&mut self, project: &Project) -> Result<(), serde_json::Error> {
        self.entries.clear();
        self.entries.push_back(serde_json::to_string(project)?);
        Ok(())
    }

    /// Record the current state. Ignored while restoring and when identical to
    /// the newest entry. Returns true when a snapshot was added.
    pub fn push(&mut self, project: &Project) -> Result<bool, serde_json::Error> {
        if self.restoring {
            return Ok(false);
        }
        let payload = serde_json::to_string(project)?;
        if self.entries.back() == Some(&payload) {
            return Ok(false);
        }
        self.entries.push_back(payload);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        Ok(true)
    }

    /// Discard the newest entry and return the state before it.
    pub fn undo(&mut self) -> Option<Result<Project, serde_json::Error>> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop_back();
        self.entries.back().map(|payload| Project::from_json(payload))
    }

    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new()
    }
}
