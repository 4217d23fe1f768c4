#![forbid(unsafe_code)]

//! Roster public facade crate.
//!
//! Re-exports the record model, view derivation and runtime pieces, and
//! offers [`open`] to start a customer list over a record source.

use std::fmt;
use std::time::Instant;

// --- Core re-exports -------------------------------------------------------

pub use roster_core::{
    AvatarProvider, AvatarRef, ConfigError, Generator, GeneratorConfig, InitialsAvatars,
    ListConfig, Record, RecordId, RecordSource, generate_source,
};

// --- Widget re-exports -----------------------------------------------------

pub use roster_widgets::{
    Column, DerivedView, FILTER_LABELS, FetchError, Generation, PageOutcome, PageRequest,
    PageSource, PageState, PaginationController, RowContent, SortDirection, SortKey, SortState,
    ViewPages, ViewportBridge, derive,
};

// --- Runtime re-exports ----------------------------------------------------

pub use roster_runtime::{
    Cmd, CmdRecord, CustomerList, DEBOUNCE_TIMER, Debouncer, FETCH_TIMER, ListMsg, Model, Program,
    TimerKey,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid list configuration.
    Config(ConfigError),
    /// A page could not be fetched.
    Fetch(FetchError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Fetch(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Fetch(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

/// Standard result type for roster APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate `config` and start a customer list over `source` at `now`.
///
/// The returned program has already run its startup commands, so the first
/// page fetch is scheduled.
pub fn open(
    source: &RecordSource,
    config: ListConfig,
    now: Instant,
) -> Result<Program<CustomerList<'_>>> {
    config.validate()?;
    let mut program = Program::new(CustomerList::new(source, config), now);
    program.init();
    Ok(program)
}

/// List configuration from the defaults overridden by `ROSTER_*` variables.
pub fn config_from_env() -> Result<ListConfig> {
    Ok(ListConfig::from_env()?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cmd, CustomerList, Error, GeneratorConfig, ListConfig, ListMsg, Model, Program, Record,
        RecordSource, Result, RowContent, SortKey, SortState, generate_source, open,
    };

    pub use crate::{core, runtime, widgets};
}

pub use roster_core as core;
pub use roster_runtime as runtime;
pub use roster_widgets as widgets;
