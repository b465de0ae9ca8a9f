//! Time and shift math
//!
//! Pure functions over wall-clock times and store-local dates.

mod clock;
mod dates;

pub use clock::{duration_hours, parse_clock_time, validate_shift_window, ClockTime};
pub use dates::{
    classify, iso_week, parse_shift_date, store_offset, sunday_week, weekly_hours, Clock,
    DateRange, FixedClock, ShiftStatus, StoreClock,
};
