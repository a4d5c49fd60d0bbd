use crate::domain::model::{
    Letter, LetterFilter, LetterRecord, LetterSummary, LetterType, PageRequest,
    RecipientSuggestion, Session, User,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn anon_key(&self) -> &str;
    fn request_timeout(&self) -> std::time::Duration;
    fn institution_code(&self) -> &str;
    fn items_per_page(&self) -> u32;
    fn min_search_chars(&self) -> usize;
    fn recent_recipient_limit(&self) -> u32;
    fn search_recipient_limit(&self) -> u32;
}

/// The remote letter store: table access on `surat_keluar`/`jenis_surat` plus
/// the numbering and recipient RPCs.
#[async_trait]
pub trait LetterStore: Send + Sync {
    async fn list_types(&self) -> Result<Vec<LetterType>>;

    /// Returns one page of letters and the exact number of matching rows.
    async fn list_letters(
        &self,
        filter: &LetterFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Letter>, u64)>;

    async fn get_letter(&self, id: i64) -> Result<Letter>;
    async fn insert_letter(&self, record: &LetterRecord) -> Result<Letter>;
    async fn update_letter(&self, id: i64, record: &LetterRecord) -> Result<Letter>;
    async fn delete_letter(&self, id: i64) -> Result<()>;

    async fn number_exists(
        &self,
        nomor_urut: u32,
        suffix: &str,
        tahun: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool>;

    async fn count_letters(&self, filter: &LetterFilter) -> Result<u64>;
    async fn letter_summaries(&self, filter: &LetterFilter) -> Result<Vec<LetterSummary>>;

    /// All letters matching `filter`, newest `tanggal_surat` first.
    async fn export_letters(&self, filter: &LetterFilter) -> Result<Vec<Letter>>;

    async fn next_sequence(&self, tahun: &str) -> Result<u32>;
    async fn sequence_gaps(&self, tahun: &str) -> Result<Vec<u32>>;
    async fn search_recipients(&self, term: &str, limit: u32) -> Result<Vec<RecipientSuggestion>>;
    async fn recent_recipients(&self, limit: u32) -> Result<Vec<RecipientSuggestion>>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_out(&self, access_token: &str) -> Result<()>;
    async fn current_user(&self, access_token: &str) -> Result<User>;
    async fn touch_last_login(&self, access_token: &str, email: &str) -> Result<()>;
}
