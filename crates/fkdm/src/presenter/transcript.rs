//! Plain-text transcript of a report, the text that gets shared.

use chrono::{DateTime, NaiveDate};

use crate::report::Report;

/// Locality line used when the viewer has no locality.
const FALLBACK_LOCALITY: &str = "KELURAHAN";

/// Render an ISO date (`2024-03-04`, or a full RFC 3339 timestamp) as
/// `dd/mm/yyyy`. Anything else comes back unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        });
    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Build the shareable transcript of `report`.
///
/// `locality` is the viewing user's locality, not the reporter's. The output
/// depends only on the two arguments.
#[must_use]
pub fn transcript(report: &Report, locality: Option<&str>) -> String {
    let f = &report.fields;
    let locality = locality
        .filter(|l| !l.is_empty())
        .map_or_else(|| FALLBACK_LOCALITY.to_string(), str::to_uppercase);

    format!(
        "{name}

{bidang}

{instansi}

Salam sobat FKDM
Izin Melaporkan:

Hari    : {hari}
Tanggal : {tanggal}
Jam     : {jam}
Lokasi  : {lokasi}

Jenis kegiatan : {jenis}

Data info : {data_info}

Deskripsi : {deskripsi}

Saran TL : {saran}

FKDM
{locality}

Nama/Id
{name}
{fkdm_id}",
        name = f.full_name,
        bidang = f.bidang.to_uppercase(),
        instansi = f.instansi.to_uppercase(),
        hari = f.hari,
        tanggal = format_date(&f.tanggal),
        jam = f.jam,
        lokasi = f.lokasi,
        jenis = f.jenis_kegiatan.to_uppercase(),
        data_info = f.data_info,
        deskripsi = f.deskripsi,
        saran = f.saran_tl,
        fkdm_id = f.fkdm_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::report::ReportFields;

    fn report() -> Report {
        Report::new(
            "r1",
            ReportFields {
                fkdm_id: "FKDM001".to_string(),
                full_name: "Administrator FKDM".to_string(),
                bidang: "Keamanan".to_string(),
                instansi: "Satpol PP".to_string(),
                hari: "Senin".to_string(),
                tanggal: "2024-03-04".to_string(),
                jam: "09:30".to_string(),
                lokasi: "Jl. Merdeka".to_string(),
                jenis_kegiatan: "Patroli".to_string(),
                data_info: "Patroli malam".to_string(),
                deskripsi: "Situasi kondusif".to_string(),
                saran_tl: "Tingkatkan ronda".to_string(),
                foto: Some("p.jpg".to_string()),
            },
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_transcript_layout() {
        let expected = "Administrator FKDM

KEAMANAN

SATPOL PP

Salam sobat FKDM
Izin Melaporkan:

Hari    : Senin
Tanggal : 04/03/2024
Jam     : 09:30
Lokasi  : Jl. Merdeka

Jenis kegiatan : PATROLI

Data info : Patroli malam

Deskripsi : Situasi kondusif

Saran TL : Tingkatkan ronda

FKDM
KELURAHAN CONTOH

Nama/Id
Administrator FKDM
FKDM001";
        assert_eq!(transcript(&report(), Some("Kelurahan Contoh")), expected);
    }

    #[test]
    fn test_transcript_without_locality() {
        let text = transcript(&report(), None);
        assert!(text.contains("FKDM\nKELURAHAN\n\nNama/Id"));

        let text = transcript(&report(), Some(""));
        assert!(text.contains("FKDM\nKELURAHAN\n\nNama/Id"));
    }

    #[test]
    fn test_transcript_is_deterministic() {
        let r = report();
        assert_eq!(transcript(&r, Some("Menteng")), transcript(&r, Some("Menteng")));
    }

    #[test]
    fn test_narratives_are_verbatim() {
        let mut r = report();
        r.fields.deskripsi = "baris satu\nbaris dua".to_string();
        assert!(transcript(&r, None).contains("Deskripsi : baris satu\nbaris dua"));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-04"), "04/03/2024");
        assert_eq!(format_date("2024-12-31T23:00:00Z"), "31/12/2024");
        assert_eq!(format_date("kemarin"), "kemarin");
        assert_eq!(format_date(""), "");
    }
}
