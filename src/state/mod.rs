//! State management module for Note Drafter
//!
//! - `session_state`: Publisher login session

mod session_state;

pub use session_state::*;
