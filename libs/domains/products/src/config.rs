use core_config::{env_parse, ConfigError, FromEnv};

/// Upper bound applied to every listing page unless disabled.
pub const DEFAULT_PAGE_CAP: u64 = 12;

/// Catalog behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// `None` means pages are as large as the requested `limit`
    pub page_cap: Option<u64>,
}

impl CatalogConfig {
    /// `0` disables the cap.
    pub fn with_page_cap(cap: u64) -> Self {
        Self {
            page_cap: (cap > 0).then_some(cap),
        }
    }

    pub fn uncapped() -> Self {
        Self { page_cap: None }
    }

    /// Number of records actually fetched for a requested `limit`.
    pub fn page_size(&self, limit: u64) -> u64 {
        match self.page_cap {
            Some(cap) => limit.min(cap),
            None => limit,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::with_page_cap(DEFAULT_PAGE_CAP)
    }
}

impl FromEnv for CatalogConfig {
    /// `CATALOG_PAGE_CAP` defaults to 12; `0` disables it.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_page_cap(env_parse(
            "CATALOG_PAGE_CAP",
            DEFAULT_PAGE_CAP,
        )?))
    }
}
