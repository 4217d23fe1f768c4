#![forbid(unsafe_code)]

//! Deterministic runtime for the customer list: timers, debouncing, the
//! update loop and the list model itself.

pub mod debounce;
pub mod list;
pub mod program;
pub mod timer;

pub use debounce::{DebounceTicket, Debouncer};
pub use list::{CustomerList, DEBOUNCE_TIMER, FETCH_TIMER, ListMsg};
pub use program::{Cmd, CmdRecord, Model, Program, TimerKey};
pub use timer::{FiredTimer, TimerId, TimerQueue};
