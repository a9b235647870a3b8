//! Report repository.
//!
//! Reports live as one JSON array in the reports slot, newest first. Every
//! append rewrites the whole array; lookups scan it linearly.

use std::rc::Rc;

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::report::{Report, ReportFields};
use crate::storage::SlotStore;

/// Append-only report collection.
pub trait ReportRepository: std::fmt::Debug {
    /// Stamp, prepend and persist a report.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write. Nothing is
    /// stored in that case.
    fn append(&self, id: &str, fields: ReportFields) -> Result<Report>;

    /// All reports, newest first. An absent or unreadable list is empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn list_all(&self) -> Result<Vec<Report>>;

    /// First report with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn find_by_id(&self, id: &str) -> Result<Option<Report>> {
        Ok(self.list_all()?.into_iter().find(|report| report.id == id))
    }

    /// Number of stored reports.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn count(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }

    /// The `limit` newest reports.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn recent(&self, limit: usize) -> Result<Vec<Report>> {
        let mut reports = self.list_all()?;
        reports.truncate(limit);
        Ok(reports)
    }

    /// Reports created in the same calendar month and year as `now`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn count_in_month(&self, now: DateTime<Utc>) -> Result<usize> {
        Ok(self
            .list_all()?
            .iter()
            .filter(|r| r.created_at.year() == now.year() && r.created_at.month() == now.month())
            .count())
    }
}

/// [`ReportRepository`] kept in a single slot.
#[derive(Debug)]
pub struct SlotReportRepository {
    store: Rc<dyn SlotStore>,
    slot: String,
}

impl SlotReportRepository {
    /// Create a repository over `slot` in `store`.
    #[must_use]
    pub fn new(store: Rc<dyn SlotStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    /// Name of the slot holding the list.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl ReportRepository for SlotReportRepository {
    fn append(&self, id: &str, fields: ReportFields) -> Result<Report> {
        let report = Report::new(id, fields, Utc::now());

        let mut reports = self.list_all()?;
        if reports.iter().any(|existing| existing.id == report.id) {
            warn!("Report id {} already present, lookups will return the newest", report.id);
        }
        reports.insert(0, report.clone());

        let blob = serde_json::to_string(&reports)?;
        self.store.write(&self.slot, &blob)?;

        info!("Stored report {} ({} total)", report.id, reports.len());
        Ok(report)
    }

    fn list_all(&self) -> Result<Vec<Report>> {
        let Some(blob) = self.store.read(&self.slot)? else {
            debug!("Reports slot {} is empty", self.slot);
            return Ok(Vec::new());
        };

        match serde_json::from_str(&blob) {
            Ok(reports) => Ok(reports),
            Err(e) => {
                warn!("Reports slot {} is unreadable, treating as empty: {}", self.slot, e);
                Ok(Vec::new())
            }
        }
    }
}
