//! Simulated time.
//!
//! The clock counts whole seconds.  Everything configured or reported is in
//! hours, converted once at the boundary:
//!
//!   ticks = round(hours * TICKS_PER_HOUR)
//!
//! Rounding (rather than truncating) keeps sums of configured durations
//! exact: 0.2 h after 0.1 h lands on 1080, the tick of 0.3 h.

use std::fmt;

use crate::error::{DnError, DnResult};

pub const TICKS_PER_HOUR: u64 = 3_600;

/// Seconds since the run started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// Ticks from `earlier` to `self`; `earlier` must not be later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }

    pub fn from_hours(hours: f64) -> DnResult<Tick> {
        ticks_for_hours(hours).map(Tick)
    }

    #[inline]
    pub fn as_hours(self) -> f64 {
        hours(self.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;

    /// Saturates at the end of representable time.
    fn add(self, ticks: u64) -> Tick {
        Tick(self.0.saturating_add(ticks))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}h", self.as_hours())
    }
}

/// Duration in hours → ticks.  Negative, NaN and infinite durations are a
/// [`DnError::NegativeDuration`].
pub fn ticks_for_hours(hours: f64) -> DnResult<u64> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(DnError::NegativeDuration(hours));
    }
    Ok((hours * TICKS_PER_HOUR as f64).round() as u64)
}

/// Ticks → hours.
#[inline]
pub fn hours(ticks: u64) -> f64 {
    ticks as f64 / TICKS_PER_HOUR as f64
}
