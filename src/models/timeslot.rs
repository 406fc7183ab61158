use serde::{Deserialize, Serialize};

/// Timeslot model: one continuous interval during which a task was timed.
///
/// Timestamps are milliseconds since the Unix epoch. A timeslot without
/// `end` is open (currently running). A timeslot without `task_id` is
/// unassigned and excluded from duration aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeslot {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    pub begin: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl Timeslot {
    pub fn new(id: i64, task_id: Option<i64>, begin: i64) -> Self {
        Self {
            id,
            task_id,
            begin,
            end: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// End used for display and duration: `end`, or `now` while open
    pub fn effective_end(&self, now: i64) -> i64 {
        self.end.unwrap_or(now)
    }

    /// Duration in whole seconds, rounded half up. Saturates on extreme timestamps.
    pub fn duration_secs(&self, now: i64) -> i64 {
        round_millis_to_secs(self.effective_end(now).saturating_sub(self.begin))
    }
}

/// Round a millisecond span to seconds the way a browser's `Math.round` does
/// (halves go towards positive infinity).
pub fn round_millis_to_secs(millis: i64) -> i64 {
    millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) >= 500)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_timeslot() {
        let ts = Timeslot::new(2, Some(1), 1_000);
        assert!(ts.is_open());
        assert_eq!(ts.effective_end(66_000), 66_000);
        assert_eq!(ts.duration_secs(66_000), 65);
    }

    #[test]
    fn test_closed_timeslot_ignores_now() {
        let mut ts = Timeslot::new(2, Some(1), 0);
        ts.end = Some(40_000);
        assert!(!ts.is_open());
        assert_eq!(ts.duration_secs(999_999), 40);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_millis_to_secs(1_499), 1);
        assert_eq!(round_millis_to_secs(1_500), 2);
        assert_eq!(round_millis_to_secs(0), 0);
        assert_eq!(round_millis_to_secs(-1_500), -1);
        assert_eq!(round_millis_to_secs(-1_501), -2);
    }

    #[test]
    fn test_negative_duration_when_end_before_begin() {
        let mut ts = Timeslot::new(2, Some(1), 10_000);
        ts.end = Some(4_000);
        assert_eq!(ts.duration_secs(0), -6);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let ts = Timeslot::new(2, Some(1), i64::MIN);
        assert_eq!(ts.duration_secs(1_700_000_000_000), 9_223_372_036_854_776);

        let mut ts = Timeslot::new(2, Some(1), i64::MAX);
        ts.end = Some(i64::MIN);
        assert_eq!(ts.duration_secs(0), -9_223_372_036_854_776);
    }
}
