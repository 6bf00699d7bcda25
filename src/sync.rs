//! Pulls all remote projects and upserts them into the local store.

use crate::api::GitlabClient;
use crate::db::{ProjectStore, Upserted};
use crate::error::GlsyncError;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Outcome of a full sync run. Per-record failures are collected here and
/// never abort the run; transport/auth failures do.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncReport {
    pub created: u64,
    pub updated: u64,
    pub failed: Vec<i64>,
}

impl SyncReport {
    pub fn processed(&self) -> u64 {
        self.created + self.updated
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} failed",
            self.created,
            self.updated,
            self.failed.len()
        )?;
        if !self.failed.is_empty() {
            write!(f, " (ids: {:?})", self.failed)?;
        }
        Ok(())
    }
}

/// Walks every page of the remote project list, upserting record by record.
/// Records arriving later win conflicts (last write wins, arrival order).
pub async fn sync_all(
    client: &GitlabClient,
    store: &ProjectStore,
) -> Result<SyncReport, GlsyncError> {
    let mut report = SyncReport::default();
    let mut page = 1u32;

    loop {
        let fetched = client.fetch_projects(page).await?;

        for rec in &fetched.malformed {
            match rec.id {
                Some(id) => report.failed.push(id),
                None => warn!(reason = %rec.reason, "malformed record carries no id; dropped"),
            }
        }

        for project in fetched.records {
            match store.upsert(&project).await {
                Ok(Upserted::Created) => report.created += 1,
                Ok(Upserted::Updated) => report.updated += 1,
                Err(e) => {
                    warn!(id = project.id, error = %e, "failed to store project; continuing");
                    report.failed.push(project.id);
                }
            }
        }

        match fetched.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    info!(
        created = report.created,
        updated = report.updated,
        failed = report.failed.len(),
        "sync finished"
    );
    Ok(report)
}
