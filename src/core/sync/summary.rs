//! Sync outcome tally and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use crate::domain::Username;
use std::fmt;
use std::time::Duration;

/// Terminal status of one user's synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// An error stopped the user's sync part way
    Failed,
    /// Salesforce already matched; nothing was written
    InSync,
    /// At least one record was created or updated
    Synchronized,
}

impl SyncStatus {
    /// All statuses in tally order
    pub const ALL: [SyncStatus; 3] = [
        SyncStatus::Failed,
        SyncStatus::InSync,
        SyncStatus::Synchronized,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SyncStatus::Failed => "FAILED",
            SyncStatus::InSync => "In Sync",
            SyncStatus::Synchronized => "SYNCHRONIZED",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A per-user failure kept for the end-of-run log
#[derive(Debug, Clone)]
pub struct UserFailure {
    pub username: Username,
    pub message: String,
}

/// Summary of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Users handed to the orchestrator
    pub total_users: usize,

    pub failed: usize,
    pub in_sync: usize,
    pub synchronized: usize,

    /// Users whose converted Contact no longer exists
    pub skipped: usize,

    /// Set when a shutdown signal stopped the run early
    pub interrupted: bool,

    pub duration: Duration,

    pub failures: Vec<UserFailure>,
}

impl SyncSummary {
    pub fn new(total_users: usize) -> Self {
        Self {
            total_users,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn record(&mut self, status: SyncStatus) {
        match status {
            SyncStatus::Failed => self.failed += 1,
            SyncStatus::InSync => self.in_sync += 1,
            SyncStatus::Synchronized => self.synchronized += 1,
        }
    }

    pub fn record_failure(&mut self, username: &Username, message: impl Into<String>) {
        self.record(SyncStatus::Failed);
        self.failures.push(UserFailure {
            username: username.clone(),
            message: message.into(),
        });
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn count(&self, status: SyncStatus) -> usize {
        match status {
            SyncStatus::Failed => self.failed,
            SyncStatus::InSync => self.in_sync,
            SyncStatus::Synchronized => self.synchronized,
        }
    }

    /// Users that reached a terminal status or were skipped
    pub fn processed(&self) -> usize {
        self.failed + self.in_sync + self.synchronized + self.skipped
    }

    /// Check if the run had no per-user failures
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// `"<count> <status>"` lines in tally order
    pub fn tally_lines(&self) -> Vec<String> {
        SyncStatus::ALL
            .iter()
            .map(|status| format!("{} {}", self.count(*status), status))
            .collect()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_users = self.total_users,
            failed = self.failed,
            in_sync = self.in_sync,
            synchronized = self.synchronized,
            skipped = self.skipped,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Sync completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(failure_count = self.failures.len(), "Sync completed with failures");
            for failure in &self.failures {
                tracing::warn!(
                    username = %failure.username,
                    message = %failure.message,
                    "Sync failure"
                );
            }
        }
    }
}
