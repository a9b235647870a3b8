//! Report records.
//!
//! This module defines the activity report as stored in the reports slot,
//! the editable field set behind it, and the option lists offered when
//! filling one in.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Suggested categories ("bidang").
pub const BIDANG_OPTIONS: &[&str] = &[
    "Keamanan",
    "Ketertiban",
    "Kebersihan",
    "Kesehatan",
    "Sosial",
    "Ekonomi",
    "Pendidikan",
    "Lingkungan",
];

/// Suggested target organizations ("instansi").
pub const INSTANSI_OPTIONS: &[&str] = &[
    "Polsek",
    "Koramil",
    "Puskesmas",
    "Dinas Sosial",
    "Dinas Lingkungan",
    "Kelurahan",
    "Kecamatan",
    "Satpol PP",
];

/// The user-entered part of a report.
///
/// Everything here is free text. `foto` holds a file name only; no image
/// content is ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFields {
    /// Reporter's organizational identifier.
    pub fkdm_id: String,
    /// Reporter's display name.
    pub full_name: String,
    /// Category.
    pub bidang: String,
    /// Target organization.
    pub instansi: String,
    /// Day of the week, as typed.
    pub hari: String,
    /// Calendar date, normally `yyyy-mm-dd`.
    pub tanggal: String,
    /// Time of day, normally `hh:mm`.
    pub jam: String,
    /// Location.
    pub lokasi: String,
    /// Activity type.
    pub jenis_kegiatan: String,
    /// Data/information narrative.
    pub data_info: String,
    /// Description narrative.
    pub deskripsi: String,
    /// Suggested follow-up action.
    #[serde(rename = "saranTL")]
    pub saran_tl: String,
    /// Attached photo file name. A blank name reads as no photo.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub foto: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|name| !name.trim().is_empty()))
}

/// A submitted report.
///
/// Reports are append-only: nothing mutates or deletes one after it has
/// been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Identifier, unique within the repository.
    pub id: String,
    /// The submitted field values.
    #[serde(flatten)]
    pub fields: ReportFields,
    /// When the repository accepted the report.
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Assemble a stored report.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: ReportFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            fields,
            created_at,
        }
    }
}

/// One addressable field of [`ReportFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    /// `fkdmId`
    FkdmId,
    /// `fullName`
    FullName,
    /// `bidang`
    Bidang,
    /// `instansi`
    Instansi,
    /// `hari`
    Hari,
    /// `tanggal`
    Tanggal,
    /// `jam`
    Jam,
    /// `lokasi`
    Lokasi,
    /// `jenisKegiatan`
    JenisKegiatan,
    /// `dataInfo`
    DataInfo,
    /// `deskripsi`
    Deskripsi,
    /// `saranTL`
    SaranTl,
    /// `foto`
    Foto,
}

impl ReportField {
    /// Every field, in form order.
    pub const ALL: [Self; 13] = [
        Self::FkdmId,
        Self::FullName,
        Self::Bidang,
        Self::Instansi,
        Self::Hari,
        Self::Tanggal,
        Self::Jam,
        Self::Lokasi,
        Self::JenisKegiatan,
        Self::DataInfo,
        Self::Deskripsi,
        Self::SaranTl,
        Self::Foto,
    ];

    /// Name used in the persisted JSON.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::FkdmId => "fkdmId",
            Self::FullName => "fullName",
            Self::Bidang => "bidang",
            Self::Instansi => "instansi",
            Self::Hari => "hari",
            Self::Tanggal => "tanggal",
            Self::Jam => "jam",
            Self::Lokasi => "lokasi",
            Self::JenisKegiatan => "jenisKegiatan",
            Self::DataInfo => "dataInfo",
            Self::Deskripsi => "deskripsi",
            Self::SaranTl => "saranTL",
            Self::Foto => "foto",
        }
    }

    /// Human label shown next to the value.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FkdmId => "ID FKDM",
            Self::FullName => "Nama Lengkap",
            Self::Bidang => "Bidang",
            Self::Instansi => "Instansi",
            Self::Hari => "Hari",
            Self::Tanggal => "Tanggal",
            Self::Jam => "Jam",
            Self::Lokasi => "Lokasi",
            Self::JenisKegiatan => "Jenis Kegiatan",
            Self::DataInfo => "Data Info",
            Self::Deskripsi => "Deskripsi Kegiatan",
            Self::SaranTl => "Saran TL",
            Self::Foto => "Foto Kegiatan",
        }
    }

    /// Whether the form refuses to submit while this field is empty.
    /// The category and organization pickers may be left unset.
    #[must_use]
    pub fn is_required(self) -> bool {
        !matches!(self, Self::Bidang | Self::Instansi | Self::Foto)
    }
}

impl std::fmt::Display for ReportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ReportField {
    type Err = Error;

    /// Accepts the wire name (`jenisKegiatan`) or its kebab-case form
    /// (`jenis-kegiatan`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().to_lowercase() == wanted)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl ReportFields {
    /// Current value of a field. An unset photo reads as `None`.
    #[must_use]
    pub fn get(&self, field: ReportField) -> Option<&str> {
        let value = match field {
            ReportField::FkdmId => &self.fkdm_id,
            ReportField::FullName => &self.full_name,
            ReportField::Bidang => &self.bidang,
            ReportField::Instansi => &self.instansi,
            ReportField::Hari => &self.hari,
            ReportField::Tanggal => &self.tanggal,
            ReportField::Jam => &self.jam,
            ReportField::Lokasi => &self.lokasi,
            ReportField::JenisKegiatan => &self.jenis_kegiatan,
            ReportField::DataInfo => &self.data_info,
            ReportField::Deskripsi => &self.deskripsi,
            ReportField::SaranTl => &self.saran_tl,
            ReportField::Foto => return self.foto.as_deref(),
        };
        Some(value)
    }

    /// Replace a field's value. A blank photo name clears the photo.
    pub fn set(&mut self, field: ReportField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            ReportField::FkdmId => &mut self.fkdm_id,
            ReportField::FullName => &mut self.full_name,
            ReportField::Bidang => &mut self.bidang,
            ReportField::Instansi => &mut self.instansi,
            ReportField::Hari => &mut self.hari,
            ReportField::Tanggal => &mut self.tanggal,
            ReportField::Jam => &mut self.jam,
            ReportField::Lokasi => &mut self.lokasi,
            ReportField::JenisKegiatan => &mut self.jenis_kegiatan,
            ReportField::DataInfo => &mut self.data_info,
            ReportField::Deskripsi => &mut self.deskripsi,
            ReportField::SaranTl => &mut self.saran_tl,
            ReportField::Foto => {
                self.foto = (!value.trim().is_empty()).then_some(value);
                return;
            }
        };
        *slot = value;
    }

    /// Required fields that are empty or whitespace-only, in form order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<ReportField> {
        ReportField::ALL
            .into_iter()
            .filter(|field| field.is_required())
            .filter(|field| self.get(*field).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }
}
