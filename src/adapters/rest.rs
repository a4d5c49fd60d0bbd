use crate::domain::model::{
    Letter, LetterFilter, LetterRecord, LetterSummary, LetterType, PageRequest,
    RecipientSuggestion, Session, User,
};
use crate::domain::ports::{AuthProvider, ConfigProvider, LetterStore};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const LETTERS_TABLE: &str = "surat_keluar";
const TYPES_TABLE: &str = "jenis_surat";
const ADMIN_TABLE: &str = "admin";

/// Letter columns plus the letter type embedded under `jenis`.
const LETTER_SELECT: &str = "*,jenis:jenis_surat(kode,nama_jenis)";

/// HTTP client for the hosted backend (PostgREST tables and RPCs under
/// `/rest/v1`, auth under `/auth/v1`).
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: i64,
}

#[derive(Deserialize)]
struct GapRow {
    nomor_urut: u32,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            ..Self::new(config.backend_url(), config.anon_key())
        })
    }

    /// Sends the user's token instead of the anon key on every request.
    pub fn with_session(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn rpc<T: DeserializeOwned>(&self, function: &str, args: serde_json::Value) -> Result<T> {
        let builder = self
            .request(Method::POST, &self.rpc_url(function))
            .json(&args);
        self.fetch(builder).await
    }

    async fn write_letter(&self, builder: RequestBuilder, id: Option<i64>) -> Result<Letter> {
        let rows: Vec<Letter> = self
            .fetch(
                builder
                    .query(&[("select", LETTER_SELECT)])
                    .header("Prefer", "return=representation"),
            )
            .await?;

        rows.into_iter().next().ok_or_else(|| AppError::NotFound {
            entity: "Letter".to_string(),
            id: id.map(|id| id.to_string()).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl LetterStore for RestBackend {
    async fn list_types(&self) -> Result<Vec<LetterType>> {
        let builder = self
            .request(Method::GET, &self.rest_url(TYPES_TABLE))
            .query(&[("select", "*"), ("order", "nama_jenis")]);
        self.fetch(builder).await
    }

    async fn list_letters(
        &self,
        filter: &LetterFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Letter>, u64)> {
        let offset = page.page.saturating_sub(1) as u64 * page.limit as u64;
        let builder = self
            .request(Method::GET, &self.rest_url(LETTERS_TABLE))
            .query(&[("select", LETTER_SELECT)])
            .query(&filter_params(filter))
            .query(&[
                ("order", "tanggal_surat.desc".to_string()),
                ("offset", offset.to_string()),
                ("limit", page.limit.to_string()),
            ])
            .header("Prefer", "count=exact");

        let response = check_status(builder.send().await?).await?;
        let total = content_range_total(&response);
        let letters: Vec<Letter> = response.json().await?;
        let count = total.unwrap_or(letters.len() as u64);

        tracing::debug!("Fetched {} of {} letters", letters.len(), count);
        Ok((letters, count))
    }

    async fn get_letter(&self, id: i64) -> Result<Letter> {
        let builder = self
            .request(Method::GET, &self.rest_url(LETTERS_TABLE))
            .query(&[("select", LETTER_SELECT.to_string()), ("id", format!("eq.{}", id))]);
        let rows: Vec<Letter> = self.fetch(builder).await?;

        rows.into_iter().next().ok_or_else(|| AppError::NotFound {
            entity: "Letter".to_string(),
            id: id.to_string(),
        })
    }

    async fn insert_letter(&self, record: &LetterRecord) -> Result<Letter> {
        let builder = self
            .request(Method::POST, &self.rest_url(LETTERS_TABLE))
            .json(record);
        self.write_letter(builder, None).await
    }

    async fn update_letter(&self, id: i64, record: &LetterRecord) -> Result<Letter> {
        let builder = self
            .request(Method::PATCH, &self.rest_url(LETTERS_TABLE))
            .query(&[("id", format!("eq.{}", id))])
            .json(record);
        self.write_letter(builder, Some(id)).await
    }

    async fn delete_letter(&self, id: i64) -> Result<()> {
        let builder = self
            .request(Method::DELETE, &self.rest_url(LETTERS_TABLE))
            .query(&[("id", format!("eq.{}", id))]);
        check_status(builder.send().await?).await?;
        Ok(())
    }

    async fn number_exists(
        &self,
        nomor_urut: u32,
        suffix: &str,
        tahun: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut params = vec![
            ("select", "id".to_string()),
            ("nomor_urut", format!("eq.{}", nomor_urut)),
            ("suffix", format!("eq.{}", suffix)),
            ("tahun", format!("eq.{}", tahun)),
        ];
        if let Some(id) = exclude_id {
            params.push(("id", format!("neq.{}", id)));
        }

        let builder = self
            .request(Method::GET, &self.rest_url(LETTERS_TABLE))
            .query(&params);
        let rows: Vec<IdRow> = self.fetch(builder).await?;
        Ok(!rows.is_empty())
    }

    async fn count_letters(&self, filter: &LetterFilter) -> Result<u64> {
        let builder = self
            .request(Method::HEAD, &self.rest_url(LETTERS_TABLE))
            .query(&[("select", "id")])
            .query(&filter_params(filter))
            .header("Prefer", "count=exact");

        let response = check_status(builder.send().await?).await?;
        content_range_total(&response).ok_or_else(|| AppError::BackendError {
            status: response.status().as_u16(),
            message: "response carried no Content-Range total".to_string(),
        })
    }

    async fn letter_summaries(&self, filter: &LetterFilter) -> Result<Vec<LetterSummary>> {
        let builder = self
            .request(Method::GET, &self.rest_url(LETTERS_TABLE))
            .query(&[("select", "jenis_surat,tanggal_surat")])
            .query(&filter_params(filter));
        self.fetch(builder).await
    }

    async fn export_letters(&self, filter: &LetterFilter) -> Result<Vec<Letter>> {
        let builder = self
            .request(Method::GET, &self.rest_url(LETTERS_TABLE))
            .query(&[("select", LETTER_SELECT)])
            .query(&filter_params(filter))
            .query(&[("order", "tanggal_surat.desc")]);
        self.fetch(builder).await
    }

    async fn next_sequence(&self, tahun: &str) -> Result<u32> {
        self.rpc("get_next_nomor_urut", json!({ "p_tahun": tahun }))
            .await
    }

    async fn sequence_gaps(&self, tahun: &str) -> Result<Vec<u32>> {
        let rows: Vec<GapRow> = self
            .rpc("get_gap_nomor", json!({ "p_tahun": tahun }))
            .await?;
        Ok(rows.into_iter().map(|row| row.nomor_urut).collect())
    }

    async fn search_recipients(&self, term: &str, limit: u32) -> Result<Vec<RecipientSuggestion>> {
        self.rpc(
            "search_tujuan_surat",
            json!({ "search_term": term, "limit_count": limit }),
        )
        .await
    }

    async fn recent_recipients(&self, limit: u32) -> Result<Vec<RecipientSuggestion>> {
        self.rpc("get_recent_tujuan", json!({ "limit_count": limit }))
            .await
    }
}

#[async_trait]
impl AuthProvider for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let builder = self
            .client
            .post(self.auth_url("token"))
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        self.fetch(builder).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let builder = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);
        check_status(builder.send().await?).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<User> {
        let builder = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);
        self.fetch(builder).await
    }

    async fn touch_last_login(&self, access_token: &str, email: &str) -> Result<()> {
        let builder = self
            .client
            .patch(self.rest_url(ADMIN_TABLE))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .query(&[("email", format!("eq.{}", email))])
            .json(&json!({ "last_login": chrono::Utc::now().to_rfc3339() }));
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// PostgREST query parameters for a letter filter.
pub fn filter_params(filter: &LetterFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(tahun) = non_blank(&filter.tahun) {
        params.push(("tahun", format!("eq.{}", tahun)));
    }
    if let Some(bulan) = non_blank(&filter.kode_bulan) {
        params.push(("kode_bulan", format!("eq.{}", bulan)));
    }
    if let Some(jenis) = non_blank(&filter.jenis) {
        params.push(("jenis_surat", format!("eq.{}", jenis)));
    }
    if let Some(from) = filter.tanggal_mulai {
        params.push(("tanggal_surat", format!("gte.{}", from)));
    }
    if let Some(to) = filter.tanggal_selesai {
        params.push(("tanggal_surat", format!("lte.{}", to)));
    }
    if let Some(search) = non_blank(&filter.search) {
        let pattern = like_pattern(search);
        params.push((
            "or",
            format!("(perihal.ilike.{0},tujuan.ilike.{0})", pattern),
        ));
    }

    params
}

/// Quoted `*term*` so commas and parentheses in the term stay literal.
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", escaped)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Total from a `Content-Range: 0-19/57` (or `*/57`) header.
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("content-range")
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.clone()
        }
    });

    tracing::warn!("Backend request failed with {}: {}", status, message);
    Err(AppError::BackendError {
        status: status.as_u16(),
        message,
    })
}

/// Pulls the human readable message out of a PostgREST or auth error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
