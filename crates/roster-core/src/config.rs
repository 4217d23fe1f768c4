#![forbid(unsafe_code)]

//! Tunables for the list controller and the synthetic record generator.
//!
//! Defaults reproduce the reference behavior: 30-row pages, a 250ms search
//! debounce, a 500ms simulated page fetch and a 5-row prefetch margin.
//! [`ListConfig::from_env`] lets a host override them without recompiling.

use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

/// Rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 30;
/// Search debounce quiet period (ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
/// Simulated page-fetch round trip (ms).
pub const DEFAULT_FETCH_LATENCY_MS: u64 = 500;
/// Rows from the end of the buffer at which the next page is requested.
pub const DEFAULT_PREFETCH_MARGIN: usize = 5;
/// Rows in the reference dataset.
pub const DEFAULT_RECORD_COUNT: usize = 1_000_000;

pub const ENV_PAGE_SIZE: &str = "ROSTER_PAGE_SIZE";
pub const ENV_DEBOUNCE_MS: &str = "ROSTER_DEBOUNCE_MS";
pub const ENV_FETCH_LATENCY_MS: &str = "ROSTER_FETCH_LATENCY_MS";
pub const ENV_PREFETCH_MARGIN: &str = "ROSTER_PREFETCH_MARGIN";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Pages must hold at least one row.
    ZeroPageSize,
    /// Rows must be at least one pixel tall.
    ZeroRowHeight,
    /// An environment override was present but not a non-negative integer.
    InvalidEnv { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPageSize => write!(f, "page size must be at least 1"),
            Self::ZeroRowHeight => write!(f, "row height must be at least 1"),
            Self::InvalidEnv { name, value } => {
                write!(f, "invalid value for {name}: {value:?} (expected an integer)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// List controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Rows appended per page load.
    pub page_size: usize,
    /// Quiet period before a search edit re-derives the view.
    pub debounce: Duration,
    /// Delay between requesting a page and its arrival.
    pub fetch_latency: Duration,
    /// Prefetch when the last visible row is within this many rows of the end.
    pub prefetch_margin: usize,
    /// Fixed row height in pixels.
    pub row_height: u16,
    /// Height of the scrollable area in pixels.
    pub viewport_height: u16,
    /// Extra rows materialized above and below the visible window.
    pub overscan: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            fetch_latency: Duration::from_millis(DEFAULT_FETCH_LATENCY_MS),
            prefetch_margin: DEFAULT_PREFETCH_MARGIN,
            row_height: 65,
            viewport_height: 600,
            overscan: 2,
        }
    }
}

impl ListConfig {
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = latency;
        self
    }

    #[must_use]
    pub fn with_prefetch_margin(mut self, margin: usize) -> Self {
        self.prefetch_margin = margin;
        self
    }

    /// Set row and viewport heights in pixels.
    #[must_use]
    pub fn with_geometry(mut self, row_height: u16, viewport_height: u16) -> Self {
        self.row_height = row_height;
        self.viewport_height = viewport_height;
        self
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Rows that fit in the viewport.
    #[must_use]
    pub fn visible_rows(&self) -> usize {
        if self.row_height == 0 {
            return 0;
        }
        usize::from(self.viewport_height / self.row_height)
    }

    /// Check the configuration for values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.row_height == 0 {
            return Err(ConfigError::ZeroRowHeight);
        }
        Ok(())
    }

    /// Defaults overridden by `ROSTER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `ROSTER_*` name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = env_u64(&lookup, ENV_PAGE_SIZE)? {
            config.page_size = v as usize;
        }
        if let Some(v) = env_u64(&lookup, ENV_DEBOUNCE_MS)? {
            config.debounce = Duration::from_millis(v);
        }
        if let Some(v) = env_u64(&lookup, ENV_FETCH_LATENCY_MS)? {
            config.fetch_latency = Duration::from_millis(v);
        }
        if let Some(v) = env_u64(&lookup, ENV_PREFETCH_MARGIN)? {
            config.prefetch_margin = v as usize;
        }
        config.validate()?;
        Ok(config)
    }
}

fn env_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

/// Synthetic record generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of records to generate.
    pub count: usize,
    /// PRNG seed; equal seeds give equal datasets.
    pub seed: u64,
    /// `last_message_at` falls within the year before this instant.
    pub reference_time: OffsetDateTime,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_RECORD_COUNT,
            seed: 0x5EED_CAFE,
            reference_time: OffsetDateTime::now_utc(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_reference_time(mut self, reference_time: OffsetDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }
}
