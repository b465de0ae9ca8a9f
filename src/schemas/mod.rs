//! Schema types for shiftswap
//!
//! Records persisted in the store snapshot and the views built from them.

mod config;
mod shift;
mod substitution;
mod user;

pub use config::Config;
pub use shift::{PersonalSummary, Shift, ShiftPatch, ShiftView};
pub use substitution::{
    sort_newest_first, ShiftSummary, SubstitutionRequest, SubstitutionStatus, SubstitutionView,
};
pub use user::{Role, User};
