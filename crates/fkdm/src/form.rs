//! Report form controller.
//!
//! Collects field values, refuses to submit while a required field is empty,
//! and hands complete reports to the repository under a fresh identifier.

use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::report::{Report, ReportField, ReportFields};
use crate::repository::ReportRepository;
use crate::session::User;

/// Generate a report identifier.
///
/// UUID v7: ordered by creation time like a timestamp, but with enough
/// random bits that two reports created in the same millisecond differ.
#[must_use]
pub fn new_report_id() -> String {
    Uuid::now_v7().to_string()
}

/// Working state of the report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    fields: ReportFields,
}

impl ReportForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with the reporter fields taken from `user`.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        let mut form = Self::new();
        form.set(ReportField::FkdmId, user.fkdm_id.clone());
        form.set(ReportField::FullName, user.full_name.clone());
        form
    }

    /// Set one field.
    pub fn set(&mut self, field: ReportField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Set a field addressed by name (`jenisKegiatan` or `jenis-kegiatan`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the name matches no field.
    pub fn set_named(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field: ReportField = name.parse()?;
        self.set(field, value);
        Ok(())
    }

    /// Read one field.
    #[must_use]
    pub fn get(&self, field: ReportField) -> Option<&str> {
        self.fields.get(field)
    }

    /// Record an attached photo. Only the file name is kept.
    pub fn attach_photo(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.fields.set(ReportField::Foto, name);
    }

    /// The values entered so far.
    #[must_use]
    pub fn fields(&self) -> &ReportFields {
        &self.fields
    }

    /// Required fields that are still empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<ReportField> {
        self.fields.missing_required()
    }

    /// Submit the form.
    ///
    /// On success returns the stored report; the caller shows its detail
    /// view. The form keeps its values whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFields`] without touching the repository if a
    /// required field is empty, or the repository's error if the write is
    /// rejected.
    pub fn submit(&self, repo: &dyn ReportRepository) -> Result<Report> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            debug!("Form submission refused, {} required fields empty", missing.len());
            return Err(Error::MissingFields {
                fields: missing.into_iter().map(ReportField::wire_name).collect(),
            });
        }

        let id = new_report_id();
        repo.append(&id, self.fields.clone()).map_err(|e| {
            warn!("Failed to save report {}: {}", id, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::repository::SlotReportRepository;
    use crate::storage::{MemoryStore, SlotStore};

    fn user() -> User {
        User {
            id: "1".to_string(),
            username: "admin".to_string(),
            full_name: "Administrator FKDM".to_string(),
            fkdm_id: "FKDM001".to_string(),
            kelurahan: "Kelurahan Contoh".to_string(),
        }
    }

    fn filled_form() -> ReportForm {
        let mut form = ReportForm::for_user(&user());
        form.set(ReportField::Bidang, "Keamanan");
        form.set(ReportField::Instansi, "Polsek");
        form.set(ReportField::Hari, "Senin");
        form.set(ReportField::Tanggal, "2024-03-04");
        form.set(ReportField::Jam, "09:30");
        form.set(ReportField::Lokasi, "Jl. Merdeka");
        form.set(ReportField::JenisKegiatan, "Patroli");
        form.set(ReportField::DataInfo, "Patroli malam");
        form.set(ReportField::Deskripsi, "Situasi kondusif");
        form.set(ReportField::SaranTl, "Tingkatkan ronda");
        form
    }

    fn repo(store: Rc<dyn SlotStore>) -> SlotReportRepository {
        SlotReportRepository::new(store, "fkdm_reports")
    }

    #[test]
    fn test_for_user_prepopulates_reporter() {
        let form = ReportForm::for_user(&user());
        assert_eq!(form.get(ReportField::FkdmId), Some("FKDM001"));
        assert_eq!(form.get(ReportField::FullName), Some("Administrator FKDM"));
        assert_eq!(form.get(ReportField::Bidang), Some(""));
    }

    #[test]
    fn test_submit_stores_report() {
        let repo = repo(Rc::new(MemoryStore::new()));
        let before = repo.count().unwrap();

        let report = filled_form().submit(&repo).unwrap();

        assert_eq!(repo.count().unwrap(), before + 1);
        let found = repo.find_by_id(&report.id).unwrap().unwrap();
        assert_eq!(found.fields, *filled_form().fields());
        assert_eq!(found.fields.bidang, "Keamanan");
        assert_eq!(found.fields.lokasi, "Jl. Merdeka");
        assert_eq!(found.fields.jenis_kegiatan, "Patroli");
        assert!(!found.created_at.to_rfc3339().is_empty());
    }

    #[test]
    fn test_submit_refuses_missing_fields() {
        let repo = repo(Rc::new(MemoryStore::new()));
        let mut form = filled_form();
        form.set(ReportField::Lokasi, "");
        form.set(ReportField::SaranTl, "  ");

        let err = form.submit(&repo).unwrap_err();
        match err {
            Error::MissingFields { fields } => assert_eq!(fields, vec!["lokasi", "saranTL"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_submit_without_category_or_organization() {
        let repo = repo(Rc::new(MemoryStore::new()));
        let mut form = filled_form();
        form.set(ReportField::Bidang, "");
        form.set(ReportField::Instansi, "");

        let report = form.submit(&repo).unwrap();
        assert_eq!(report.fields.bidang, "");
        assert_eq!(report.fields.instansi, "");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_submit_failure_keeps_values() {
        let repo = repo(Rc::new(MemoryStore::with_quota(64)));
        let form = filled_form();
        let snapshot = form.clone();

        let err = form.submit(&repo).unwrap_err();
        assert!(err.is_persistence_failure());
        assert_eq!(form, snapshot);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_attach_photo_keeps_file_name_only() {
        let mut form = filled_form();
        form.attach_photo(Path::new("/home/user/Pictures/patroli.jpg"));
        assert_eq!(form.get(ReportField::Foto), Some("patroli.jpg"));
    }

    #[test]
    fn test_set_named() {
        let mut form = ReportForm::new();
        form.set_named("data-info", "abc").unwrap();
        assert_eq!(form.get(ReportField::DataInfo), Some("abc"));
        assert!(form.set_named("bogus", "x").is_err());
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = new_report_id();
        let b = new_report_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_two_submits_two_reports() {
        let repo = repo(Rc::new(MemoryStore::new()));
        let form = filled_form();
        let first = form.submit(&repo).unwrap();
        let second = form.submit(&repo).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.list_all().unwrap()[0].id, second.id);
    }
}
