use crate::core::dashboard::MONTH_LABELS;
use crate::domain::model::RecipientSuggestion;
use crate::domain::ports::{ConfigProvider, LetterStore};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use regex::RegexBuilder;

#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Blank input: most recently used recipients.
    Recent(Vec<RecipientSuggestion>),
    /// Search results for the typed term.
    Results {
        term: String,
        items: Vec<RecipientSuggestion>,
    },
    /// Input shorter than the minimum; nothing is looked up.
    TooShort,
    NoResults(&'static str),
}

pub struct RecipientLookup<S: LetterStore> {
    store: S,
    min_chars: usize,
    recent_limit: u32,
    search_limit: u32,
}

impl<S: LetterStore> RecipientLookup<S> {
    pub fn new(store: S, min_chars: usize, recent_limit: u32, search_limit: u32) -> Self {
        Self {
            store,
            min_chars,
            recent_limit,
            search_limit,
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self::new(
            store,
            config.min_search_chars(),
            config.recent_recipient_limit(),
            config.search_recipient_limit(),
        )
    }

    pub async fn suggest(&self, input: &str) -> Result<Suggestions> {
        let term = input.trim();

        if term.is_empty() {
            let recent = self.store.recent_recipients(self.recent_limit).await?;
            return Ok(if recent.is_empty() {
                Suggestions::NoResults("Belum ada riwayat tujuan surat")
            } else {
                Suggestions::Recent(recent)
            });
        }

        if term.chars().count() < self.min_chars {
            return Ok(Suggestions::TooShort);
        }

        tracing::debug!("Searching recipients for '{}'", term);
        let items = self.store.search_recipients(term, self.search_limit).await?;
        Ok(if items.is_empty() {
            Suggestions::NoResults("Tidak ada hasil ditemukan")
        } else {
            Suggestions::Results {
                term: term.to_string(),
                items,
            }
        })
    }
}

/// Wraps every case-insensitive occurrence of `term` in `open`/`close`.
pub fn highlight(text: &str, term: &str, open: &str, close: &str) -> String {
    if term.is_empty() {
        return text.to_string();
    }

    match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re
            .replace_all(text, |caps: &regex::Captures| {
                format!("{}{}{}", open, &caps[0], close)
            })
            .into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Indonesian relative time ("5 menit lalu"), falling back to a short date after 30 days.
pub fn format_time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };

    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Baru saja".to_string()
    } else if minutes < 60 {
        format!("{} menit lalu", minutes)
    } else if hours < 24 {
        format!("{} jam lalu", hours)
    } else if days < 7 {
        format!("{} hari lalu", days)
    } else if days < 30 {
        format!("{} minggu lalu", days / 7)
    } else {
        short_date(timestamp)
    }
}

fn short_date(timestamp: DateTime<Utc>) -> String {
    use chrono::Datelike;
    format!(
        "{} {} {}",
        timestamp.day(),
        MONTH_LABELS[timestamp.month0() as usize],
        timestamp.year()
    )
}
