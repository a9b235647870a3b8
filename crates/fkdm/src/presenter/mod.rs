//! Report presentation.
//!
//! Turns stored reports into what a viewer sees: the detail listing, the
//! shareable transcript and the dashboard summary.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use fkdm::presenter::{share_link, transcript, ShareTarget};
//! use fkdm::config::ShareConfig;
//! use fkdm::report::{Report, ReportFields};
//!
//! let report = Report::new("r1", ReportFields::default(), Utc::now());
//! let text = transcript(&report, Some("Menteng"));
//! let link = share_link(ShareTarget::WhatsApp, &ShareConfig::default(), &text);
//! assert!(link.starts_with("https://wa.me/?text="));
//! ```

mod share;
mod transcript;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::navigation::Route;
use crate::report::{Report, ReportField};
use crate::repository::ReportRepository;
use crate::session::User;

pub use share::{
    encode_component, share_link, Opener, PrintOpener, RecordingOpener, ShareTarget,
    SystemOpener,
};
pub use transcript::{format_date, transcript};

/// A report ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    /// The stored report.
    pub report: Report,
    /// Its transcript for the current viewer.
    pub transcript: String,
}

impl ReportView {
    /// Prepare `report` for a viewer whose locality is `locality`.
    #[must_use]
    pub fn new(report: Report, locality: Option<&str>) -> Self {
        let transcript = transcript(&report, locality);
        Self { report, transcript }
    }

    /// Labelled field values in display order. The date is shown as
    /// `dd/mm/yyyy`; the photo row only appears when a photo is attached.
    #[must_use]
    pub fn detail_lines(&self) -> Vec<(&'static str, String)> {
        ReportField::ALL
            .into_iter()
            .filter_map(|field| {
                let value = self.report.fields.get(field)?;
                let shown = match field {
                    ReportField::Foto if value.trim().is_empty() => return None,
                    ReportField::Tanggal => format_date(value),
                    ReportField::Foto => format!("File: {value}"),
                    _ => value.to_string(),
                };
                Some((field.label(), shown))
            })
            .collect()
    }

    /// The detail listing as text.
    #[must_use]
    pub fn render_detail(&self) -> String {
        let mut out = format!("Detail Laporan Kegiatan [{}]\n", self.report.fields.bidang);
        out.push_str(&format!("ID: {}\n", self.report.id));
        for (label, value) in self.detail_lines() {
            if value.contains('\n') {
                out.push_str(&format!("{label}:\n{value}\n"));
            } else {
                out.push_str(&format!("{label}: {value}\n"));
            }
        }
        out.push_str(&format!("Dibuat: {}\n", self.report.created_at.to_rfc3339()));
        out
    }
}

/// Result of opening a report's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// The report exists.
    Found(Box<ReportView>),
    /// No report has that identifier.
    NotFound {
        /// Where the viewer can go back to.
        back: Route,
    },
}

/// Look up `id` and prepare it for the current viewer.
///
/// # Errors
///
/// Returns an error only if the repository's backing store fails.
pub fn present(
    repo: &dyn ReportRepository,
    id: &str,
    viewer: Option<&User>,
) -> Result<Presentation> {
    let locality = viewer.map(|user| user.kelurahan.as_str());
    Ok(match repo.find_by_id(id)? {
        Some(report) => Presentation::Found(Box::new(ReportView::new(report, locality))),
        None => Presentation::NotFound {
            back: Route::Dashboard,
        },
    })
}

/// One-line summary of a report, as listed on the dashboard.
#[must_use]
pub fn summary_line(report: &Report) -> String {
    let f = &report.fields;
    format!(
        "{}  [{}] {}  {} {}  {}",
        report.id, f.bidang, f.jenis_kegiatan, f.tanggal, f.jam, f.lokasi
    )
}

/// What the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Name in the welcome line.
    pub full_name: String,
    /// Number of stored reports.
    pub total: usize,
    /// Reports created this calendar month.
    pub this_month: usize,
    /// Newest reports.
    pub recent: Vec<Report>,
}

impl Dashboard {
    /// Gather the dashboard figures as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the repository's backing store fails.
    pub fn build(
        repo: &dyn ReportRepository,
        user: &User,
        now: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            full_name: user.full_name.clone(),
            total: repo.count()?,
            this_month: repo.count_in_month(now)?,
            recent: repo.recent(recent_limit)?,
        })
    }

    /// The dashboard as text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("Selamat Datang, {}\n\n", self.full_name);
        out.push_str(&format!("Total laporan:      {}\n", self.total));
        out.push_str(&format!("Laporan bulan ini:  {}\n\n", self.this_month));
        if self.recent.is_empty() {
            out.push_str("Belum ada laporan. Buat laporan pertama dengan `fkdm report new`.\n");
        } else {
            out.push_str("Laporan Terbaru\n");
            for report in &self.recent {
                out.push_str(&summary_line(report));
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::report::ReportFields;
    use crate::repository::SlotReportRepository;
    use crate::storage::MemoryStore;

    fn viewer() -> User {
        User {
            id: "1".to_string(),
            username: "admin".to_string(),
            full_name: "Administrator FKDM".to_string(),
            fkdm_id: "FKDM001".to_string(),
            kelurahan: "Menteng".to_string(),
        }
    }

    fn fields() -> ReportFields {
        ReportFields {
            fkdm_id: "FKDM001".to_string(),
            full_name: "Administrator FKDM".to_string(),
            bidang: "Keamanan".to_string(),
            instansi: "Polsek".to_string(),
            hari: "Senin".to_string(),
            tanggal: "2024-03-04".to_string(),
            jam: "09:30".to_string(),
            lokasi: "Jl. Merdeka".to_string(),
            jenis_kegiatan: "Patroli".to_string(),
            data_info: "info".to_string(),
            deskripsi: "baris satu\nbaris dua".to_string(),
            saran_tl: "saran".to_string(),
            foto: None,
        }
    }

    fn repo() -> SlotReportRepository {
        SlotReportRepository::new(Rc::new(MemoryStore::new()), "fkdm_reports")
    }

    #[test]
    fn test_present_found_uses_viewer_locality() {
        let repo = repo();
        let stored = repo.append("r1", fields()).unwrap();

        let Presentation::Found(view) = present(&repo, "r1", Some(&viewer())).unwrap() else {
            panic!("expected report");
        };
        assert_eq!(view.report, stored);
        assert!(view.transcript.contains("FKDM\nMENTENG\n"));
    }

    #[test]
    fn test_present_not_found() {
        let repo = repo();
        assert_eq!(
            present(&repo, "missing", None).unwrap(),
            Presentation::NotFound {
                back: Route::Dashboard
            }
        );
    }

    #[test]
    fn test_detail_lines() {
        let mut f = fields();
        let view = ReportView::new(Report::new("r1", f.clone(), Utc::now()), None);
        let lines = view.detail_lines();
        assert_eq!(lines.len(), 12);
        assert!(lines.contains(&("Tanggal", "04/03/2024".to_string())));
        assert!(!lines.iter().any(|(label, _)| *label == "Foto Kegiatan"));

        f.foto = Some("p.jpg".to_string());
        let view = ReportView::new(Report::new("r1", f, Utc::now()), None);
        assert!(view
            .detail_lines()
            .contains(&("Foto Kegiatan", "File: p.jpg".to_string())));
    }

    #[test]
    fn test_detail_lines_skip_blank_photo() {
        let json = serde_json::to_string(&Report::new("r1", fields(), Utc::now()))
            .unwrap()
            .replacen('{', r#"{"foto":"","#, 1);
        let report: Report = serde_json::from_str(&json).unwrap();
        let view = ReportView::new(report, None);
        assert!(!view
            .detail_lines()
            .iter()
            .any(|(label, _)| *label == "Foto Kegiatan"));

        let mut f = fields();
        f.foto = Some("  ".to_string());
        let view = ReportView::new(Report::new("r1", f, Utc::now()), None);
        assert_eq!(view.detail_lines().len(), 12);
        assert!(!view.render_detail().contains("File:"));
    }

    #[test]
    fn test_render_detail() {
        let view = ReportView::new(Report::new("r1", fields(), Utc::now()), None);
        let text = view.render_detail();
        assert!(text.starts_with("Detail Laporan Kegiatan [Keamanan]"));
        assert!(text.contains("ID: r1\n"));
        assert!(text.contains("Lokasi: Jl. Merdeka\n"));
        assert!(text.contains("Deskripsi Kegiatan:\nbaris satu\nbaris dua\n"));
    }

    #[test]
    fn test_dashboard() {
        let repo = repo();
        for i in 0..6 {
            repo.append(&format!("r{i}"), fields()).unwrap();
        }

        let dashboard = Dashboard::build(&repo, &viewer(), Utc::now(), 5).unwrap();
        assert_eq!(dashboard.total, 6);
        assert_eq!(dashboard.this_month, 6);
        assert_eq!(dashboard.recent.len(), 5);
        assert_eq!(dashboard.recent[0].id, "r5");

        let text = dashboard.render();
        assert!(text.starts_with("Selamat Datang, Administrator FKDM"));
        assert!(text.contains("Laporan Terbaru"));
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = Dashboard::build(&repo(), &viewer(), Utc::now(), 5).unwrap();
        assert_eq!(dashboard.total, 0);
        assert!(dashboard.render().contains("Belum ada laporan"));
    }
}
