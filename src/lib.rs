pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::RestBackend;
pub use config::{cli::LocalStorage, toml_config::AppConfig};
pub use core::{
    auth::AuthService, autocomplete::RecipientLookup, dashboard::DashboardService,
    export::CsvExporter, letters::LetterService,
};
pub use domain::numbering::{format_identifier, LetterNumber};
pub use utils::error::{AppError, Result};
