use crate::core::pagination;
use crate::domain::model::{
    Letter, LetterDraft, LetterFilter, LetterRecord, LetterType, Page, PageRequest,
};
use crate::domain::numbering::{self, LetterNumber};
use crate::domain::ports::{ConfigProvider, LetterStore};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::require_field;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Gaps listed in a suggestion before it is cut off with `...`.
pub const MAX_GAPS_SHOWN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSuggestion {
    pub tahun: String,
    pub next: u32,
    pub gaps: Vec<u32>,
}

impl fmt::Display for NumberSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Saran nomor berikutnya: {}", self.next)?;
        if !self.gaps.is_empty() {
            let shown: Vec<String> = self
                .gaps
                .iter()
                .take(MAX_GAPS_SHOWN)
                .map(u32::to_string)
                .collect();
            let more = if self.gaps.len() > MAX_GAPS_SHOWN { "..." } else { "" };
            write!(f, " | Gap: {}{}", shown.join(", "), more)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub nomor_lengkap: String,
    pub bulan: &'static str,
    pub tahun: i32,
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.nomor_lengkap)?;
        write!(f, "Bulan: {}, Tahun: {}", self.bulan, self.tahun)
    }
}

pub struct LetterService<S: LetterStore> {
    store: S,
    institution_code: String,
    items_per_page: u32,
}

impl<S: LetterStore> LetterService<S> {
    pub fn new(store: S, institution_code: impl Into<String>, items_per_page: u32) -> Self {
        Self {
            store,
            institution_code: institution_code.into(),
            items_per_page,
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self::new(store, config.institution_code(), config.items_per_page())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn institution_code(&self) -> &str {
        &self.institution_code
    }

    pub async fn list_types(&self) -> Result<Vec<LetterType>> {
        self.store.list_types().await
    }

    pub async fn list(&self, filter: &LetterFilter, page: u32) -> Result<Page<Letter>> {
        let page = page.max(1);
        let request = PageRequest {
            page,
            limit: self.items_per_page,
        };
        let (items, count) = self.store.list_letters(filter, &request).await?;

        Ok(Page {
            items,
            count,
            total_pages: pagination::total_pages(count, self.items_per_page),
            current_page: page,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Letter> {
        self.store.get_letter(id).await
    }

    pub async fn create(&self, draft: &LetterDraft) -> Result<Letter> {
        let record = prepare_record(draft)?;
        self.ensure_available(&record, None).await?;

        let letter = self.store.insert_letter(&record).await?;
        tracing::info!("✅ Letter {} created", self.full_number(&letter)?);
        Ok(letter)
    }

    pub async fn update(&self, id: i64, draft: &LetterDraft) -> Result<Letter> {
        let record = prepare_record(draft)?;
        self.ensure_available(&record, Some(id)).await?;

        let letter = self.store.update_letter(id, &record).await?;
        tracing::info!("✅ Letter {} updated", self.full_number(&letter)?);
        Ok(letter)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_letter(id).await?;
        tracing::info!("🗑️ Letter {} deleted", id);
        Ok(())
    }

    /// True when `(nomor_urut, suffix)` is already taken in the year of `tanggal`.
    pub async fn check_duplicate(
        &self,
        nomor_urut: &str,
        suffix: &str,
        tanggal: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let sequence = numbering::parse_sequence(nomor_urut)?;
        let tahun = numbering::parse_iso_date(tanggal)?.year().to_string();
        self.store
            .number_exists(sequence, suffix.trim(), &tahun, exclude_id)
            .await
    }

    /// Next free number from the backend, plus known gaps when the gap lookup works.
    pub async fn suggest_number(&self, tahun: &str) -> Result<NumberSuggestion> {
        let next = self.store.next_sequence(tahun).await?;
        let gaps = match self.store.sequence_gaps(tahun).await {
            Ok(gaps) => gaps,
            Err(e) => {
                tracing::warn!("Gap lookup for {} failed: {}", tahun, e);
                Vec::new()
            }
        };

        Ok(NumberSuggestion {
            tahun: tahun.to_string(),
            next,
            gaps,
        })
    }

    pub fn preview(&self, draft: &LetterDraft) -> Result<Preview> {
        preview(draft, &self.institution_code)
    }

    /// The stored full number, or one formatted locally when the row lacks it.
    pub fn full_number(&self, letter: &Letter) -> Result<String> {
        full_number(letter, &self.institution_code)
    }

    async fn ensure_available(&self, record: &LetterRecord, exclude_id: Option<i64>) -> Result<()> {
        let taken = self
            .store
            .number_exists(record.nomor_urut, &record.suffix, &record.tahun, exclude_id)
            .await?;

        if taken {
            let number = format!(
                "{}{}",
                numbering::pad_sequence(u64::from(record.nomor_urut)),
                record.suffix
            );
            tracing::warn!("Number {} already used in {}", number, record.tahun);
            return Err(AppError::DuplicateNumber {
                number,
                year: record.tahun.clone(),
            });
        }
        Ok(())
    }
}

/// Validates a form draft and derives `kode_bulan` and `tahun` from its date.
pub fn prepare_record(draft: &LetterDraft) -> Result<LetterRecord> {
    let nomor_urut = numbering::parse_sequence(&draft.nomor_urut)?;
    let tanggal_surat = numbering::parse_iso_date(&draft.tanggal_surat)?;
    let jenis_surat = require_field("jenis_surat", &draft.jenis_surat)?;
    let perihal = require_field("perihal", &draft.perihal)?;
    let tujuan = require_field("tujuan", &draft.tujuan)?;
    let keterangan = draft.keterangan.trim();

    Ok(LetterRecord {
        nomor_urut,
        suffix: draft.suffix.trim().to_string(),
        jenis_surat: jenis_surat.to_string(),
        kode_bulan: numbering::month_to_roman(tanggal_surat.month())?.to_string(),
        tahun: tanggal_surat.year().to_string(),
        tanggal_surat,
        perihal: perihal.to_string(),
        tujuan: tujuan.to_string(),
        keterangan: (!keterangan.is_empty()).then(|| keterangan.to_string()),
    })
}

pub fn preview(draft: &LetterDraft, institution_code: &str) -> Result<Preview> {
    let sequence = numbering::parse_sequence(&draft.nomor_urut)?;
    let date = numbering::parse_iso_date(&draft.tanggal_surat)?;
    let jenis = require_field("jenis_surat", &draft.jenis_surat)?;
    let number = LetterNumber::from_date(sequence as i64, draft.suffix.trim(), jenis, date)?;

    Ok(Preview {
        nomor_lengkap: number.format(institution_code)?,
        bulan: numbering::month_name(number.month)?,
        tahun: number.year,
    })
}

pub fn full_number(letter: &Letter, institution_code: &str) -> Result<String> {
    if let Some(nomor) = letter.nomor_lengkap.as_deref().filter(|n| !n.is_empty()) {
        return Ok(nomor.to_string());
    }

    let number = LetterNumber::from_date(
        letter.nomor_urut as i64,
        &letter.suffix,
        &letter.jenis_surat,
        letter.tanggal_surat,
    )?;
    Ok(number.format(institution_code)?)
}

/// Form values of a stored letter, for editing.
pub fn draft_from_letter(letter: &Letter) -> LetterDraft {
    LetterDraft {
        nomor_urut: letter.nomor_urut.to_string(),
        suffix: letter.suffix.clone(),
        jenis_surat: letter.jenis_surat.clone(),
        tanggal_surat: letter.tanggal_surat.to_string(),
        perihal: letter.perihal.clone(),
        tujuan: letter.tujuan.clone(),
        keterangan: letter.keterangan.clone().unwrap_or_default(),
    }
}

/// Text placed on the clipboard when a letter number is copied.
pub fn copy_text(nomor_lengkap: &str, tanggal: NaiveDate) -> String {
    format!(
        "{}\nTanggal: {}",
        nomor_lengkap,
        numbering::format_display_date(tanggal)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MemoryStore;
    use crate::domain::numbering::NumberingError;

    fn draft(nomor: &str, suffix: &str, tanggal: &str) -> LetterDraft {
        LetterDraft {
            nomor_urut: nomor.to_string(),
            suffix: suffix.to_string(),
            jenis_surat: "001".to_string(),
            tanggal_surat: tanggal.to_string(),
            perihal: "Undangan rapat koordinasi".to_string(),
            tujuan: "Dekan FKIP".to_string(),
            keterangan: String::new(),
        }
    }

    fn service(store: MemoryStore) -> LetterService<MemoryStore> {
        LetterService::new(store, "071073/LPM", 20)
    }

    #[test]
    fn test_prepare_record_derives_month_and_year() {
        let record = prepare_record(&draft(" 7 ", " B ", "2025-12-01")).unwrap();

        assert_eq!(record.nomor_urut, 7);
        assert_eq!(record.suffix, "B");
        assert_eq!(record.kode_bulan, "XII");
        assert_eq!(record.tahun, "2025");
        assert!(record.keterangan.is_none());
    }

    #[test]
    fn test_prepare_record_rejects_bad_input() {
        assert!(matches!(
            prepare_record(&draft("0", "", "2025-01-01")),
            Err(AppError::NumberingError(NumberingError::InvalidSequence { .. }))
        ));
        assert!(matches!(
            prepare_record(&draft("3", "", "kemarin")),
            Err(AppError::NumberingError(NumberingError::InvalidDate { .. }))
        ));

        let mut missing_recipient = draft("3", "", "2025-01-01");
        missing_recipient.tujuan = "  ".to_string();
        assert!(matches!(
            prepare_record(&missing_recipient),
            Err(AppError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_preview() {
        let preview = preview(&draft("7", "", "2025-03-15"), "071073/LPM").unwrap();
        assert_eq!(preview.nomor_lengkap, "007/071073/LPM/001/III/2025");
        assert_eq!(preview.bulan, "Maret");
        assert_eq!(
            preview.to_string(),
            "007/071073/LPM/001/III/2025\nBulan: Maret, Tahun: 2025"
        );
    }

    #[tokio::test]
    async fn test_create_refuses_duplicate_number() {
        let store = MemoryStore::new();
        store.seed(7, "", "001", "2025-02-01").await;
        let service = service(store);

        let err = service
            .create(&draft("7", "", "2025-03-15"))
            .await
            .unwrap_err();
        match err {
            AppError::DuplicateNumber { number, year } => {
                assert_eq!(number, "007");
                assert_eq!(year, "2025");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_same_number_allowed_with_suffix_or_other_year() {
        let store = MemoryStore::new();
        store.seed(7, "", "001", "2025-02-01").await;
        let service = service(store);

        let with_suffix = service.create(&draft("7", "A", "2025-03-15")).await.unwrap();
        assert_eq!(
            service.full_number(&with_suffix).unwrap(),
            "007A/071073/LPM/001/III/2025"
        );

        service.create(&draft("7", "", "2026-01-05")).await.unwrap();
        assert_eq!(service.store().len().await, 3);
    }

    #[tokio::test]
    async fn test_update_ignores_its_own_number() {
        let store = MemoryStore::new();
        store.seed(7, "", "001", "2025-02-01").await;
        store.seed(8, "", "001", "2025-02-02").await;
        let service = service(store);

        let mut edited = draft("7", "", "2025-02-01");
        edited.perihal = "Revisi".to_string();
        let letter = service.update(1, &edited).await.unwrap();
        assert_eq!(letter.perihal, "Revisi");

        let clash = service.update(1, &draft("8", "", "2025-02-01")).await;
        assert!(matches!(clash, Err(AppError::DuplicateNumber { .. })));
    }

    #[tokio::test]
    async fn test_check_duplicate() {
        let store = MemoryStore::new();
        store.seed(3, "", "001", "2025-02-01").await;
        let service = service(store);

        assert!(service.check_duplicate("3", "", "2025-06-01", None).await.unwrap());
        assert!(!service.check_duplicate("3", "", "2025-06-01", Some(1)).await.unwrap());
        assert!(!service.check_duplicate("4", "", "2025-06-01", None).await.unwrap());
        assert!(service.check_duplicate("x", "", "2025-06-01", None).await.is_err());
    }

    #[tokio::test]
    async fn test_suggest_number_with_gaps() {
        let store = MemoryStore::new();
        for n in [1, 2, 4, 6, 8, 10, 12] {
            store.seed(n, "", "001", "2025-01-10").await;
        }
        let service = service(store);

        let suggestion = service.suggest_number("2025").await.unwrap();
        assert_eq!(suggestion.next, 13);
        assert_eq!(suggestion.gaps, vec![3, 5, 7, 9, 11]);
        assert_eq!(
            suggestion.to_string(),
            "Saran nomor berikutnya: 13 | Gap: 3, 5, 7, 9, 11"
        );

        let more = NumberSuggestion {
            tahun: "2025".to_string(),
            next: 20,
            gaps: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(
            more.to_string(),
            "Saran nomor berikutnya: 20 | Gap: 1, 2, 3, 4, 5..."
        );
    }

    #[tokio::test]
    async fn test_suggest_number_survives_gap_failure() {
        let store = MemoryStore::new().failing_gaps();
        store.seed(1, "", "001", "2025-01-10").await;
        let service = service(store);

        let suggestion = service.suggest_number("2025").await.unwrap();
        assert_eq!(suggestion.next, 2);
        assert!(suggestion.gaps.is_empty());
        assert_eq!(suggestion.to_string(), "Saran nomor berikutnya: 2");
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let store = MemoryStore::new();
        for n in 1..=45 {
            store.seed(n, "", "001", "2025-01-10").await;
        }
        let service = service(store);

        let page = service.list(&LetterFilter::for_year("2025"), 3).await.unwrap();
        assert_eq!(page.count, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.items.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_and_get() {
        let store = MemoryStore::new();
        store.seed(1, "", "001", "2025-01-10").await;
        let service = service(store);

        let letter = service.get(1).await.unwrap();
        assert_eq!(draft_from_letter(&letter).nomor_urut, "1");

        service.delete(1).await.unwrap();
        assert!(matches!(
            service.get(1).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn test_copy_text() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(
            copy_text("007/071073/LPM/001/III/2025", date),
            "007/071073/LPM/001/III/2025\nTanggal: 15/03/2025"
        );
    }
}
