use crate::domain::model::{DashboardStats, LetterFilter, LetterType, TypeCount};
use crate::domain::numbering;
use crate::domain::ports::LetterStore;
use crate::utils::error::Result;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Share of one letter type in the overall register.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeShare {
    pub kode: String,
    pub count: u64,
    pub percent: f64,
}

pub struct DashboardService<S: LetterStore> {
    store: S,
}

impl<S: LetterStore> DashboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Counters for `tahun`; "this month" is the month of `today`.
    pub async fn stats(&self, tahun: i32, today: NaiveDate) -> Result<DashboardStats> {
        let tahun = tahun.to_string();
        let year_filter = LetterFilter::for_year(tahun.as_str());
        let month_filter =
            year_filter.clone().with_month(numbering::month_to_roman(today.month())?);

        let (total, this_month, gaps, summaries, types) = tokio::join!(
            self.store.count_letters(&year_filter),
            self.store.count_letters(&month_filter),
            self.store.sequence_gaps(&tahun),
            self.store.letter_summaries(&year_filter),
            self.store.list_types(),
        );

        let gap_count = match gaps {
            Ok(gaps) => gaps.len(),
            Err(e) => {
                tracing::warn!("Gap lookup for {} failed: {}", tahun, e);
                0
            }
        };

        let codes = summaries?.into_iter().map(|s| s.jenis_surat);
        Ok(DashboardStats {
            total_surat: total?,
            surat_bulan_ini: this_month?,
            gap_count,
            surat_per_jenis: count_by_type(codes, &types?),
        })
    }

    /// Letters per calendar month of `tahun`, January first.
    pub async fn monthly_counts(&self, tahun: i32) -> Result<[u64; 12]> {
        let filter = LetterFilter {
            tanggal_mulai: NaiveDate::from_ymd_opt(tahun, 1, 1),
            tanggal_selesai: NaiveDate::from_ymd_opt(tahun, 12, 31),
            ..LetterFilter::default()
        };

        let mut counts = [0u64; 12];
        for summary in self.store.letter_summaries(&filter).await? {
            counts[summary.tanggal_surat.month0() as usize] += 1;
        }
        Ok(counts)
    }

    /// Per-type counts over every letter, largest first.
    pub async fn type_distribution(&self) -> Result<Vec<TypeShare>> {
        let summaries = self
            .store
            .letter_summaries(&LetterFilter::default())
            .await?;
        Ok(type_shares(summaries.into_iter().map(|s| s.jenis_surat)))
    }
}

/// Counts letter type codes and names them from `types`; unknown codes keep the code as name.
pub fn count_by_type(codes: impl IntoIterator<Item = String>, types: &[LetterType]) -> Vec<TypeCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for code in codes {
        *counts.entry(code).or_default() += 1;
    }

    let mut result: Vec<TypeCount> = counts
        .into_iter()
        .map(|(kode, count)| {
            let nama = types
                .iter()
                .find(|t| t.kode == kode)
                .map(|t| t.nama_jenis.clone())
                .unwrap_or_else(|| kode.clone());
            TypeCount { kode, nama, count }
        })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kode.cmp(&b.kode)));
    result
}

pub fn type_shares(codes: impl IntoIterator<Item = String>) -> Vec<TypeShare> {
    let counts = count_by_type(codes, &[]);
    let total: u64 = counts.iter().map(|c| c.count).sum();

    counts
        .into_iter()
        .map(|c| TypeShare {
            percent: if total == 0 {
                0.0
            } else {
                (c.count as f64 / total as f64 * 1000.0).round() / 10.0
            },
            kode: c.kode,
            count: c.count,
        })
        .collect()
}

/// Horizontal bar scaled so that `max` fills `width` cells.
pub fn bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(cells.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MemoryStore;

    #[tokio::test]
    async fn test_stats_for_year() {
        let store = MemoryStore::new();
        store.seed(1, "", "001", "2025-01-05").await;
        store.seed(2, "", "002", "2025-03-01").await;
        store.seed(4, "", "001", "2025-03-20").await;
        store.seed(1, "", "003", "2024-03-20").await;
        let dashboard = DashboardService::new(store);

        let today = NaiveDate::from_ymd_opt(2025, 3, 25).unwrap();
        let stats = dashboard.stats(2025, today).await.unwrap();

        assert_eq!(stats.total_surat, 3);
        assert_eq!(stats.surat_bulan_ini, 2);
        assert_eq!(stats.gap_count, 1);
        assert_eq!(stats.surat_per_jenis[0].kode, "001");
        assert_eq!(stats.surat_per_jenis[0].nama, "Undangan");
        assert_eq!(stats.surat_per_jenis[0].count, 2);
        assert_eq!(stats.surat_per_jenis[1].nama, "Surat Tugas");
    }

    #[tokio::test]
    async fn test_stats_gap_failure_counts_zero() {
        let store = MemoryStore::new().failing_gaps();
        store.seed(3, "", "001", "2025-01-05").await;
        let dashboard = DashboardService::new(store);

        let today = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let stats = dashboard.stats(2025, today).await.unwrap();
        assert_eq!(stats.total_surat, 1);
        assert_eq!(stats.gap_count, 0);
    }

    #[tokio::test]
    async fn test_monthly_counts() {
        let store = MemoryStore::new();
        store.seed(1, "", "001", "2025-01-05").await;
        store.seed(2, "", "001", "2025-01-31").await;
        store.seed(3, "", "001", "2025-12-31").await;
        store.seed(1, "", "001", "2024-12-31").await;
        let dashboard = DashboardService::new(store);

        let counts = dashboard.monthly_counts(2025).await.unwrap();
        assert_eq!(counts[0], 2);
        assert_eq!(counts[11], 1);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[tokio::test]
    async fn test_type_distribution() {
        let store = MemoryStore::new();
        store.seed(1, "", "001", "2025-01-05").await;
        store.seed(2, "", "001", "2025-01-06").await;
        store.seed(3, "", "002", "2025-01-07").await;
        let dashboard = DashboardService::new(store);

        let shares = dashboard.type_distribution().await.unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].kode, "001");
        assert_eq!(shares[0].percent, 66.7);
        assert_eq!(shares[1].percent, 33.3);
    }

    #[test]
    fn test_unknown_type_keeps_code_as_name() {
        let counts = count_by_type(vec!["099".to_string()], &[]);
        assert_eq!(counts[0].nama, "099");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(5, 10, 20).chars().count(), 10);
        assert_eq!(bar(10, 10, 20).chars().count(), 20);
        assert_eq!(bar(0, 10, 20), "");
        assert_eq!(bar(3, 0, 20), "");
    }
}
