use crate::domain::model::{
    Letter, LetterFilter, LetterRecord, LetterSummary, LetterType, PageRequest,
    RecipientSuggestion,
};
use crate::domain::numbering;
use crate::domain::ports::LetterStore;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

/// In-memory stand-in for the remote letter store.
pub(crate) struct MemoryStore {
    letters: Mutex<Vec<Letter>>,
    types: Vec<LetterType>,
    recipients: Vec<RecipientSuggestion>,
    fail_gaps: bool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            letters: Mutex::new(Vec::new()),
            types: vec![
                letter_type("002", "Surat Tugas"),
                letter_type("001", "Undangan"),
                letter_type("003", "Pemberitahuan"),
            ],
            recipients: Vec::new(),
            fail_gaps: false,
        }
    }

    pub(crate) fn with_recipients(mut self, recipients: Vec<RecipientSuggestion>) -> Self {
        self.recipients = recipients;
        self
    }

    pub(crate) fn failing_gaps(mut self) -> Self {
        self.fail_gaps = true;
        self
    }

    pub(crate) async fn seed(&self, nomor_urut: u32, suffix: &str, jenis: &str, tanggal: &str) {
        let tanggal_surat = NaiveDate::parse_from_str(tanggal, "%Y-%m-%d").unwrap();
        let record = LetterRecord {
            nomor_urut,
            suffix: suffix.to_string(),
            jenis_surat: jenis.to_string(),
            kode_bulan: numbering::month_to_roman(chrono::Datelike::month(&tanggal_surat))
                .unwrap()
                .to_string(),
            tahun: chrono::Datelike::year(&tanggal_surat).to_string(),
            tanggal_surat,
            perihal: format!("Perihal {}", nomor_urut),
            tujuan: format!("Tujuan {}", nomor_urut),
            keterangan: None,
        };
        self.insert_letter(&record).await.unwrap();
    }

    pub(crate) async fn len(&self) -> usize {
        self.letters.lock().await.len()
    }

    fn to_letter(&self, id: i64, record: &LetterRecord) -> Letter {
        Letter {
            id,
            nomor_urut: record.nomor_urut,
            suffix: record.suffix.clone(),
            jenis_surat: record.jenis_surat.clone(),
            kode_bulan: record.kode_bulan.clone(),
            tahun: record.tahun.clone(),
            tanggal_surat: record.tanggal_surat,
            perihal: record.perihal.clone(),
            tujuan: record.tujuan.clone(),
            keterangan: record.keterangan.clone(),
            nomor_lengkap: None,
            created_at: None,
            jenis: self
                .types
                .iter()
                .find(|t| t.kode == record.jenis_surat)
                .cloned(),
        }
    }
}

fn letter_type(kode: &str, nama: &str) -> LetterType {
    LetterType {
        kode: kode.to_string(),
        nama_jenis: nama.to_string(),
    }
}

fn matches(filter: &LetterFilter, letter: &Letter) -> bool {
    let eq = |wanted: &Option<String>, actual: &str| {
        wanted.as_deref().map_or(true, |w| w.is_empty() || w == actual)
    };
    let search = filter.search.as_deref().map(str::to_lowercase);

    eq(&filter.tahun, &letter.tahun)
        && eq(&filter.kode_bulan, &letter.kode_bulan)
        && eq(&filter.jenis, &letter.jenis_surat)
        && filter.tanggal_mulai.map_or(true, |d| letter.tanggal_surat >= d)
        && filter.tanggal_selesai.map_or(true, |d| letter.tanggal_surat <= d)
        && search.map_or(true, |s| {
            letter.perihal.to_lowercase().contains(&s) || letter.tujuan.to_lowercase().contains(&s)
        })
}

#[async_trait]
impl LetterStore for MemoryStore {
    async fn list_types(&self) -> Result<Vec<LetterType>> {
        let mut types = self.types.clone();
        types.sort_by(|a, b| a.nama_jenis.cmp(&b.nama_jenis));
        Ok(types)
    }

    async fn list_letters(
        &self,
        filter: &LetterFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Letter>, u64)> {
        let all = self.export_letters(filter).await?;
        let count = all.len() as u64;
        let offset = page.page.saturating_sub(1) as usize * page.limit as usize;
        let items = all.into_iter().skip(offset).take(page.limit as usize).collect();
        Ok((items, count))
    }

    async fn get_letter(&self, id: i64) -> Result<Letter> {
        let letters = self.letters.lock().await;
        letters
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                entity: "Letter".to_string(),
                id: id.to_string(),
            })
    }

    async fn insert_letter(&self, record: &LetterRecord) -> Result<Letter> {
        let mut letters = self.letters.lock().await;
        let id = letters.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        let letter = self.to_letter(id, record);
        letters.push(letter.clone());
        Ok(letter)
    }

    async fn update_letter(&self, id: i64, record: &LetterRecord) -> Result<Letter> {
        let updated = self.to_letter(id, record);
        let mut letters = self.letters.lock().await;
        let slot = letters
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "Letter".to_string(),
                id: id.to_string(),
            })?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_letter(&self, id: i64) -> Result<()> {
        self.letters.lock().await.retain(|l| l.id != id);
        Ok(())
    }

    async fn number_exists(
        &self,
        nomor_urut: u32,
        suffix: &str,
        tahun: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let letters = self.letters.lock().await;
        let occupied = letters
            .iter()
            .filter(|l| l.tahun == tahun && Some(l.id) != exclude_id)
            .map(|l| (l.nomor_urut, l.suffix.as_str()));
        Ok(numbering::is_occupied(nomor_urut, suffix, occupied))
    }

    async fn count_letters(&self, filter: &LetterFilter) -> Result<u64> {
        let letters = self.letters.lock().await;
        Ok(letters.iter().filter(|l| matches(filter, l)).count() as u64)
    }

    async fn letter_summaries(&self, filter: &LetterFilter) -> Result<Vec<LetterSummary>> {
        let letters = self.letters.lock().await;
        Ok(letters
            .iter()
            .filter(|l| matches(filter, l))
            .map(|l| LetterSummary {
                jenis_surat: l.jenis_surat.clone(),
                tanggal_surat: l.tanggal_surat,
            })
            .collect())
    }

    async fn export_letters(&self, filter: &LetterFilter) -> Result<Vec<Letter>> {
        let letters = self.letters.lock().await;
        let mut matching: Vec<Letter> = letters
            .iter()
            .filter(|l| matches(filter, l))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.tanggal_surat.cmp(&a.tanggal_surat));
        Ok(matching)
    }

    async fn next_sequence(&self, tahun: &str) -> Result<u32> {
        Ok(numbering::next_sequence(&self.used_numbers(tahun).await)?)
    }

    async fn sequence_gaps(&self, tahun: &str) -> Result<Vec<u32>> {
        if self.fail_gaps {
            return Err(AppError::BackendError {
                status: 500,
                message: "function get_gap_nomor failed".to_string(),
            });
        }
        Ok(numbering::find_gaps(&self.used_numbers(tahun).await))
    }

    async fn search_recipients(&self, term: &str, limit: u32) -> Result<Vec<RecipientSuggestion>> {
        let term = term.to_lowercase();
        Ok(self
            .recipients
            .iter()
            .filter(|r| r.tujuan.to_lowercase().contains(&term))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn recent_recipients(&self, limit: u32) -> Result<Vec<RecipientSuggestion>> {
        Ok(self.recipients.iter().take(limit as usize).cloned().collect())
    }
}

impl MemoryStore {
    async fn used_numbers(&self, tahun: &str) -> Vec<u32> {
        let letters = self.letters.lock().await;
        letters
            .iter()
            .filter(|l| l.tahun == tahun)
            .map(|l| l.nomor_urut)
            .collect()
    }
}
