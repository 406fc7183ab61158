// Duration display formatting

/// Which units a duration string may contain.
///
/// Hidden units fold into the next smaller shown unit, so hiding days turns
/// `1d2h` into `26h`. All units are shown by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub show_days: bool,
    pub show_hours: bool,
    pub show_minutes: bool,
    pub show_seconds: bool,
}

impl Default for DurationParts {
    fn default() -> Self {
        Self {
            show_days: true,
            show_hours: true,
            show_minutes: true,
            show_seconds: true,
        }
    }
}

/// Options for [`format_duration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationFormat {
    pub parts: DurationParts,
    /// When false, a duration that renders as zero (`0s`, `-0m`, ...) yields `None`
    pub show_zero: bool,
}

impl Default for DurationFormat {
    fn default() -> Self {
        Self {
            parts: DurationParts::default(),
            show_zero: true,
        }
    }
}

impl DurationFormat {
    pub fn hide_zero(mut self) -> Self {
        self.show_zero = false;
        self
    }
}

/// Convert seconds to a compact display string, e.g. 100950 -> `1d4h2m30s`.
///
/// Zero-valued units are skipped, except that the smallest shown unit is
/// always printed when nothing else was. Negative input gets a leading `-`.
pub fn seconds_to_display_duration(total_secs: i64, parts: &DurationParts) -> String {
    let units = [
        ("d", 86_400u64, parts.show_days),
        ("h", 3_600, parts.show_hours),
        ("m", 60, parts.show_minutes),
        ("s", 1, parts.show_seconds),
    ];
    let shown: Vec<(&str, u64)> = units
        .iter()
        .filter(|(_, _, show)| *show)
        .map(|(label, secs, _)| (*label, *secs))
        .collect();

    let mut remaining = total_secs.unsigned_abs();
    let mut output = String::new();
    for (index, (label, secs)) in shown.iter().enumerate() {
        let value = remaining / secs;
        remaining %= secs;

        let is_last = index + 1 == shown.len();
        if value > 0 || (output.is_empty() && is_last) {
            output.push_str(&format!("{}{}", value, label));
        }
    }

    if total_secs < 0 {
        format!("-{}", output)
    } else {
        output
    }
}

/// Format a duration in seconds for display
pub fn format_duration(secs: i64, format: &DurationFormat) -> Option<String> {
    let formatted = seconds_to_display_duration(secs, &format.parts);
    if !format.show_zero && is_zero_display(&formatted) {
        None
    } else {
        Some(formatted)
    }
}

fn is_zero_display(formatted: &str) -> bool {
    let digits = formatted.strip_prefix('-').unwrap_or(formatted);
    matches!(digits, "0d" | "0h" | "0m" | "0s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_display_duration() {
        let all = DurationParts::default();
        assert_eq!(seconds_to_display_duration(100_950, &all), "1d4h2m30s");
        assert_eq!(seconds_to_display_duration(65, &all), "1m5s");
        assert_eq!(seconds_to_display_duration(3_600, &all), "1h");
        assert_eq!(seconds_to_display_duration(3_605, &all), "1h5s");
        assert_eq!(seconds_to_display_duration(0, &all), "0s");
        assert_eq!(seconds_to_display_duration(-65, &all), "-1m5s");
    }

    #[test]
    fn test_extreme_values() {
        let all = DurationParts::default();
        assert_eq!(
            seconds_to_display_duration(i64::MIN, &all),
            "-106751991167300d15h30m8s"
        );
        assert_eq!(
            seconds_to_display_duration(i64::MAX, &all),
            "106751991167300d15h30m7s"
        );
    }

    #[test]
    fn test_hidden_units_fold_down() {
        let no_days = DurationParts {
            show_days: false,
            ..DurationParts::default()
        };
        assert_eq!(seconds_to_display_duration(93_600, &no_days), "26h");

        let no_seconds = DurationParts {
            show_seconds: false,
            ..DurationParts::default()
        };
        assert_eq!(seconds_to_display_duration(65, &no_seconds), "1m");
        assert_eq!(seconds_to_display_duration(30, &no_seconds), "0m");
    }

    #[test]
    fn test_format_duration_hides_zero() {
        let format = DurationFormat::default();
        assert_eq!(format_duration(0, &format).as_deref(), Some("0s"));
        assert_eq!(format_duration(0, &format.hide_zero()), None);
        assert_eq!(format_duration(70, &format.hide_zero()).as_deref(), Some("1m10s"));

        let minutes_only = DurationFormat {
            parts: DurationParts {
                show_seconds: false,
                ..DurationParts::default()
            },
            show_zero: false,
        };
        assert_eq!(format_duration(-30, &minutes_only), None);
    }
}
