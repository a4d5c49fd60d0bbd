pub mod autocomplete;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod letters;
pub mod pagination;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::ports::{AuthProvider, ConfigProvider, LetterStore, Storage};
pub use crate::utils::error::Result;
