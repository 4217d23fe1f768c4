#![forbid(unsafe_code)]

//! Core: customer records, the read-only record source, and configuration.

pub mod avatar;
pub mod config;
pub mod generate;
pub mod logging;
pub mod record;
pub mod source;

pub use avatar::{AvatarProvider, AvatarRef, InitialsAvatars};
pub use config::{ConfigError, GeneratorConfig, ListConfig};
pub use generate::{Generator, generate_source};
pub use record::{Record, RecordId};
pub use source::{RecordSource, SearchKeys};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
