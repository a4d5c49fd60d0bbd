use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `jenis_surat` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterType {
    pub kode: String,
    pub nama_jenis: String,
}

/// Row of the `surat_keluar` table, with its letter type embedded as `jenis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letter {
    pub id: i64,
    pub nomor_urut: u32,
    #[serde(default)]
    pub suffix: String,
    pub jenis_surat: String,
    pub kode_bulan: String,
    pub tahun: String,
    pub tanggal_surat: NaiveDate,
    pub perihal: String,
    pub tujuan: String,
    #[serde(default)]
    pub keterangan: Option<String>,
    #[serde(default)]
    pub nomor_lengkap: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenis: Option<LetterType>,
}

impl Letter {
    pub fn type_name(&self) -> &str {
        self.jenis
            .as_ref()
            .map(|jenis| jenis.nama_jenis.as_str())
            .unwrap_or("")
    }
}

/// Values entered on the letter form, before month code and year are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterDraft {
    pub nomor_urut: String,
    pub suffix: String,
    pub jenis_surat: String,
    pub tanggal_surat: String,
    pub perihal: String,
    pub tujuan: String,
    pub keterangan: String,
}

/// Payload written to `surat_keluar` on insert and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterRecord {
    pub nomor_urut: u32,
    pub suffix: String,
    pub jenis_surat: String,
    pub kode_bulan: String,
    pub tahun: String,
    pub tanggal_surat: NaiveDate,
    pub perihal: String,
    pub tujuan: String,
    pub keterangan: Option<String>,
}

/// Narrow projection used by the dashboard charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSummary {
    pub jenis_surat: String,
    pub tanggal_surat: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFilter {
    pub tahun: Option<String>,
    pub kode_bulan: Option<String>,
    pub jenis: Option<String>,
    pub search: Option<String>,
    pub tanggal_mulai: Option<NaiveDate>,
    pub tanggal_selesai: Option<NaiveDate>,
}

impl LetterFilter {
    pub fn for_year(tahun: impl Into<String>) -> Self {
        Self {
            tahun: Some(tahun.into()),
            ..Self::default()
        }
    }

    pub fn with_month(mut self, kode_bulan: impl Into<String>) -> Self {
        self.kode_bulan = Some(kode_bulan.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

/// An entry from the recipient search or recent-recipient RPCs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientSuggestion {
    pub tujuan: String,
    #[serde(default)]
    pub frequency: Option<u64>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub kode: String,
    pub nama: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_surat: u64,
    pub surat_bulan_ini: u64,
    pub gap_count: usize,
    pub surat_per_jenis: Vec<TypeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Local part of the email with its first letter capitalised.
    pub fn display_name(&self) -> String {
        let local = self.email.split('@').next().unwrap_or_default();
        let mut chars = local.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}
