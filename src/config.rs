//! Server settings that Leptos' own configuration does not cover.
use std::env;

pub const DB_PATH_VAR: &str = "CODEREVIEW_DB_PATH";
pub const DEFAULT_DB_PATH: &str = "codereview.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = lookup(DB_PATH_VAR)
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        AppConfig { database_path }
    }
}
