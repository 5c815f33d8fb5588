use chrono::{Local, NaiveDateTime, TimeDelta};

/// Where "now" comes from.
///
/// Production uses the local wall clock; tests pin a fixed instant so
/// hour-dependent output is reproducible.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use grid_market_sim::market::clock::Clock;
///
/// let noon = NaiveDate::from_ymd_opt(2024, 7, 1)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
/// assert_eq!(Clock::Fixed(noon).now(), noon);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Local wall-clock time.
    #[default]
    System,
    /// A pinned instant.
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::System => Local::now().naive_local(),
            Self::Fixed(at) => *at,
        }
    }
}

/// An hourly sequence of timestamps anchored at one instant.
///
/// Iterates oldest first in both directions, so timestamps are strictly
/// increasing at one-hour spacing.
pub struct HourlySeries {
    /// First timestamp of the series.
    start: NaiveDateTime,
    /// Next index to yield.
    current: usize,
    /// Number of points.
    total: usize,
}

impl HourlySeries {
    /// `len` points ending at `anchor` (the last point is `anchor`).
    pub fn trailing(anchor: NaiveDateTime, len: usize) -> Self {
        let back = len.saturating_sub(1) as i64;
        Self {
            start: anchor - TimeDelta::hours(back),
            current: 0,
            total: len,
        }
    }

    /// `len` points starting at `anchor` (the first point is `anchor`).
    pub fn forward(anchor: NaiveDateTime, len: usize) -> Self {
        Self {
            start: anchor,
            current: 0,
            total: len,
        }
    }
}

impl Iterator for HourlySeries {
    /// `(index, timestamp)`.
    type Item = (usize, NaiveDateTime);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.total {
            let i = self.current;
            self.current += 1;
            Some((i, self.start + TimeDelta::hours(i as i64)))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.current;
        (left, Some(left))
    }
}

impl ExactSizeIterator for HourlySeries {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn trailing_ends_at_anchor() {
        let points: Vec<_> = HourlySeries::trailing(at(10, 30), 24).collect();
        assert_eq!(points.len(), 24);
        assert_eq!(points[23].1, at(10, 30));
        assert_eq!(points[0].1, at(10, 30) - TimeDelta::hours(23));
    }

    #[test]
    fn forward_starts_at_anchor() {
        let points: Vec<_> = HourlySeries::forward(at(22, 0), 3).collect();
        assert_eq!(points[0].1, at(22, 0));
        assert_eq!(points[2].1, at(22, 0) + TimeDelta::hours(2));
    }

    #[test]
    fn spacing_is_exactly_one_hour() {
        let points: Vec<_> = HourlySeries::trailing(at(0, 5), 24).collect();
        for pair in points.windows(2) {
            assert_eq!(pair[1].1 - pair[0].1, TimeDelta::hours(1));
        }
    }

    #[test]
    fn empty_series() {
        assert_eq!(HourlySeries::trailing(at(1, 0), 0).count(), 0);
        assert_eq!(HourlySeries::forward(at(1, 0), 0).len(), 0);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = Clock::Fixed(at(8, 0));
        assert_eq!(clock.now(), clock.now());
    }
}
