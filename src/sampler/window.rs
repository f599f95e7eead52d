use chrono::{DateTime, Duration, Utc};

use super::error::SamplerError;

pub const DEFAULT_CADENCE: Duration = Duration::seconds(1);

/// Closed interval `[start, end]` sampled every `cadence`.
///
/// Tick `k` is `start + k * cadence`, computed in whole nanoseconds so long
/// windows do not accumulate rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub cadence: Duration,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, cadence: Duration) -> Self {
        Self {
            start,
            end,
            cadence,
        }
    }

    pub fn with_default_cadence(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start, end, DEFAULT_CADENCE)
    }

    /// `floor((end - start) / cadence) + 1`, or `InvalidWindow`.
    pub fn tick_count(&self) -> Result<usize, SamplerError> {
        if self.end < self.start {
            return Err(SamplerError::InvalidWindow(format!(
                "end {} is before start {}",
                self.end, self.start
            )));
        }
        let cadence_ns = self.cadence_nanos()?;
        let span_ns = (self.end - self.start).num_nanoseconds().ok_or_else(|| {
            SamplerError::InvalidWindow("window span does not fit in nanoseconds".into())
        })?;
        usize::try_from(span_ns / cadence_ns + 1)
            .map_err(|_| SamplerError::InvalidWindow("too many ticks".into()))
    }

    /// Instant of tick `k`; `k` is not checked against the window.
    pub fn tick(&self, k: usize) -> DateTime<Utc> {
        let cadence_ns = self.cadence.num_nanoseconds().unwrap_or(0);
        self.start + Duration::nanoseconds(cadence_ns.saturating_mul(k as i64))
    }

    pub fn ticks(&self) -> Result<impl Iterator<Item = DateTime<Utc>> + '_, SamplerError> {
        let count = self.tick_count()?;
        Ok((0..count).map(move |k| self.tick(k)))
    }

    fn cadence_nanos(&self) -> Result<i64, SamplerError> {
        match self.cadence.num_nanoseconds() {
            Some(ns) if ns > 0 => Ok(ns),
            _ => Err(SamplerError::InvalidWindow(format!(
                "cadence {} must be positive",
                self.cadence
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::utc;

    #[test]
    fn scenario_window_has_876_ticks() {
        let window = TimeWindow::with_default_cadence(utc(3, 39, 25), utc(3, 54, 0));
        assert_eq!(window.tick_count().unwrap(), 876);
        let ticks: Vec<_> = window.ticks().unwrap().collect();
        assert_eq!(ticks.first(), Some(&utc(3, 39, 25)));
        assert_eq!(ticks.last(), Some(&utc(3, 54, 0)));
    }

    #[test]
    fn end_not_on_grid_is_excluded() {
        let window = TimeWindow::new(utc(0, 0, 0), utc(0, 0, 10), Duration::seconds(3));
        let ticks: Vec<_> = window.ticks().unwrap().collect();
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[3], utc(0, 0, 9));
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn single_instant_window() {
        let window = TimeWindow::with_default_cadence(utc(1, 0, 0), utc(1, 0, 0));
        assert_eq!(window.tick_count().unwrap(), 1);
    }

    #[test]
    fn sub_second_cadence_stays_on_grid() {
        let window = TimeWindow::new(utc(0, 0, 0), utc(1, 0, 0), Duration::milliseconds(100));
        assert_eq!(window.tick_count().unwrap(), 36_001);
        assert_eq!(window.tick(36_000), utc(1, 0, 0));
        assert_eq!(window.tick(7), utc(0, 0, 0) + Duration::milliseconds(700));
    }

    #[test]
    fn rejects_reversed_window_and_bad_cadence() {
        let reversed = TimeWindow::with_default_cadence(utc(2, 0, 0), utc(1, 0, 0));
        assert!(matches!(reversed.tick_count(), Err(SamplerError::InvalidWindow(_))));
        for cadence in [Duration::zero(), Duration::seconds(-1)] {
            let window = TimeWindow::new(utc(1, 0, 0), utc(2, 0, 0), cadence);
            assert!(matches!(window.tick_count(), Err(SamplerError::InvalidWindow(_))));
        }
    }
}
