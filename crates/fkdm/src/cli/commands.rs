//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::ReportForm;
use crate::presenter::ShareTarget;
use crate::report::ReportField;
use crate::session::ProfileUpdate;

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Login name
    #[arg(short, long)]
    pub username: String,

    /// Password
    #[arg(short, long)]
    pub password: String,
}

/// Arguments for commands that can print JSON.
#[derive(Debug, Args)]
pub struct JsonFlag {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// File a new report
    New(NewReportArgs),

    /// List all reports, newest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one report
    Show {
        /// Report identifier
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the shareable transcript of a report
    Transcript {
        /// Report identifier
        id: String,
    },

    /// Share a report's transcript to a messaging app
    Share {
        /// Report identifier
        id: String,

        /// Destination app
        #[arg(short, long, value_enum)]
        to: ShareTargetArg,

        /// Print the link instead of opening it
        #[arg(long)]
        print: bool,
    },

    /// List the suggested categories and organizations
    Options,
}

/// Field values for a new report.
///
/// Every field is optional on the command line so that empty required
/// fields are reported together instead of one at a time.
#[derive(Debug, Default, Args)]
pub struct NewReportArgs {
    /// Reporter's FKDM id (defaults to the logged-in user's)
    #[arg(long)]
    pub fkdm_id: Option<String>,

    /// Reporter's full name (defaults to the logged-in user's)
    #[arg(long)]
    pub full_name: Option<String>,

    /// Category, e.g. Keamanan
    #[arg(long)]
    pub bidang: Option<String>,

    /// Target organization, e.g. Polsek
    #[arg(long)]
    pub instansi: Option<String>,

    /// Day of the week
    #[arg(long)]
    pub hari: Option<String>,

    /// Date, yyyy-mm-dd
    #[arg(long)]
    pub tanggal: Option<String>,

    /// Time, hh:mm
    #[arg(long)]
    pub jam: Option<String>,

    /// Location
    #[arg(long)]
    pub lokasi: Option<String>,

    /// Activity type
    #[arg(long)]
    pub jenis_kegiatan: Option<String>,

    /// Data/information
    #[arg(long)]
    pub data_info: Option<String>,

    /// Description
    #[arg(long)]
    pub deskripsi: Option<String>,

    /// Suggested follow-up
    #[arg(long)]
    pub saran_tl: Option<String>,

    /// Photo to attach (only the file name is recorded)
    #[arg(long, value_name = "FILE")]
    pub foto: Option<PathBuf>,
}

impl NewReportArgs {
    /// The given values paired with their fields, photo excluded.
    #[must_use]
    pub fn values(&self) -> Vec<(ReportField, &str)> {
        [
            (ReportField::FkdmId, &self.fkdm_id),
            (ReportField::FullName, &self.full_name),
            (ReportField::Bidang, &self.bidang),
            (ReportField::Instansi, &self.instansi),
            (ReportField::Hari, &self.hari),
            (ReportField::Tanggal, &self.tanggal),
            (ReportField::Jam, &self.jam),
            (ReportField::Lokasi, &self.lokasi),
            (ReportField::JenisKegiatan, &self.jenis_kegiatan),
            (ReportField::DataInfo, &self.data_info),
            (ReportField::Deskripsi, &self.deskripsi),
            (ReportField::SaranTl, &self.saran_tl),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the logged-in user's profile
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change profile fields
    Update {
        /// New login name
        #[arg(long)]
        username: Option<String>,

        /// New full name
        #[arg(long)]
        full_name: Option<String>,

        /// New FKDM id
        #[arg(long)]
        fkdm_id: Option<String>,

        /// New locality (kelurahan)
        #[arg(long)]
        kelurahan: Option<String>,
    },
}

impl ProfileCommand {
    /// The profile edit described by an `update` command.
    #[must_use]
    pub fn to_update(&self) -> Option<ProfileUpdate> {
        match self {
            Self::Show { .. } => None,
            Self::Update {
                username,
                full_name,
                fkdm_id,
                kelurahan,
            } => Some(ProfileUpdate {
                username: username.clone(),
                full_name: full_name.clone(),
                fkdm_id: fkdm_id.clone(),
                kelurahan: kelurahan.clone(),
            }),
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Share destination argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShareTargetArg {
    /// WhatsApp
    Whatsapp,
    /// Telegram
    Telegram,
}

impl From<ShareTargetArg> for ShareTarget {
    fn from(arg: ShareTargetArg) -> Self {
        match arg {
            ShareTargetArg::Whatsapp => Self::WhatsApp,
            ShareTargetArg::Telegram => Self::Telegram,
        }
    }
}

/// Fill a form from command-line values, leaving unset ones alone.
pub fn fill_form(form: &mut ReportForm, args: &NewReportArgs) {
    for (field, value) in args.values() {
        form.set(field, value);
    }
    if let Some(path) = &args.foto {
        form.attach_photo(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_target_arg_conversion() {
        assert_eq!(ShareTarget::from(ShareTargetArg::Whatsapp), ShareTarget::WhatsApp);
        assert_eq!(ShareTarget::from(ShareTargetArg::Telegram), ShareTarget::Telegram);
    }

    #[test]
    fn test_new_report_values_skip_unset() {
        let args = NewReportArgs {
            lokasi: Some("Jl. Merdeka".to_string()),
            bidang: Some("Keamanan".to_string()),
            ..NewReportArgs::default()
        };
        assert_eq!(
            args.values(),
            vec![
                (ReportField::Bidang, "Keamanan"),
                (ReportField::Lokasi, "Jl. Merdeka")
            ]
        );
    }

    #[test]
    fn test_fill_form_keeps_prefilled() {
        let mut form = ReportForm::new();
        form.set(ReportField::FkdmId, "FKDM001");
        let args = NewReportArgs {
            jam: Some("10:00".to_string()),
            foto: Some(PathBuf::from("/tmp/ronda.png")),
            ..NewReportArgs::default()
        };

        fill_form(&mut form, &args);
        assert_eq!(form.get(ReportField::FkdmId), Some("FKDM001"));
        assert_eq!(form.get(ReportField::Jam), Some("10:00"));
        assert_eq!(form.get(ReportField::Foto), Some("ronda.png"));
    }

    #[test]
    fn test_profile_update_from_command() {
        let cmd = ProfileCommand::Update {
            username: None,
            full_name: None,
            fkdm_id: Some("FKDM777".to_string()),
            kelurahan: None,
        };
        let update = cmd.to_update().unwrap();
        assert_eq!(update.fkdm_id.as_deref(), Some("FKDM777"));
        assert!(update.username.is_none());

        assert!(ProfileCommand::Show { json: false }.to_update().is_none());
    }
}
