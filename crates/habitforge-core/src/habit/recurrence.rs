//! Recurrence rules and the due-day predicate.
//!
//! A habit's schedule is an open-ended calendar rule: daily, weekly (with a
//! weekday set), monthly, or yearly, each with an "every N periods"
//! interval. [`Recurrence::is_due`] answers whether a rule fires on a given
//! date. It is a pure, total function: it never errors and performs no I/O.
//!
//! Stored rule fields are loosely typed (dates and weekday sets as text,
//! intervals as "string or int or missing"). All coercion happens in the
//! normalization functions here, once, at the boundary; the predicate only
//! ever sees validated values.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a habit repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Unrecognized stored text. Kept inert: such a rule is never due.
    Unknown,
}

impl RepeatKind {
    /// Parse a stored kind. A missing or empty value defaults to daily;
    /// unrecognized text maps to [`RepeatKind::Unknown`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => RepeatKind::Daily,
            Some("daily") => RepeatKind::Daily,
            Some("weekly") => RepeatKind::Weekly,
            Some("monthly") => RepeatKind::Monthly,
            Some("yearly") => RepeatKind::Yearly,
            Some(_) => RepeatKind::Unknown,
        }
    }

    /// Storage representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatKind::Daily => "daily",
            RepeatKind::Weekly => "weekly",
            RepeatKind::Monthly => "monthly",
            RepeatKind::Yearly => "yearly",
            RepeatKind::Unknown => "unknown",
        }
    }
}

/// Coerce a loose interval value into a usable "every N periods" count.
///
/// Missing, non-numeric, zero and negative inputs all become 1, so the
/// modulo arithmetic downstream can never divide by zero.
pub fn normalize_interval(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(normalize_interval_num)
        .unwrap_or(1)
}

fn normalize_interval_num(n: i64) -> Option<u32> {
    if n >= 1 {
        u32::try_from(n).ok()
    } else {
        None
    }
}

/// Coerce an integer-typed interval the same way [`normalize_interval`]
/// coerces text.
pub fn normalize_interval_int(raw: Option<i64>) -> u32 {
    raw.and_then(normalize_interval_num).unwrap_or(1)
}

/// Parse a comma-separated weekday set ("0,2,4", Monday = 0).
///
/// Entries outside 0-6 and unparseable entries are dropped; an empty or
/// missing result defaults to all seven days.
pub fn normalize_weekdays(raw: Option<&str>) -> BTreeSet<u8> {
    let mut days: BTreeSet<u8> = BTreeSet::new();
    if let Some(raw) = raw {
        for part in raw.split(',') {
            if let Ok(day) = part.trim().parse::<u8>() {
                if day <= 6 {
                    days.insert(day);
                }
            }
        }
    }
    if days.is_empty() {
        (0..7).collect()
    } else {
        days
    }
}

/// Parse a stored `YYYY-MM-DD` start date. Missing or malformed input maps
/// to `None`, which resolves to the reference date at evaluation time.
pub fn parse_start_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// A normalized recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// First possible due day. `None` resolves to the reference date at
    /// evaluation time, making the habit due from that moment onward.
    pub start: Option<NaiveDate>,
    pub kind: RepeatKind,
    /// "Every N periods" multiplier, always >= 1.
    pub every: u32,
    /// Weekday set for weekly rules (Monday = 0). Ignored by other kinds.
    pub weekdays: BTreeSet<u8>,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::daily()
    }
}

impl Recurrence {
    /// A plain every-day rule starting immediately.
    pub fn daily() -> Self {
        Self {
            start: None,
            kind: RepeatKind::Daily,
            every: 1,
            weekdays: (0..7).collect(),
        }
    }

    /// Normalize loose stored fields into a rule. This is the single entry
    /// point for text input (CLI arguments, raw rows); nothing downstream
    /// re-parses.
    pub fn from_raw(
        start_date: Option<&str>,
        repeat_type: Option<&str>,
        repeat_every: Option<&str>,
        repeat_days: Option<&str>,
    ) -> Self {
        Self {
            start: parse_start_date(start_date),
            kind: RepeatKind::parse(repeat_type),
            every: normalize_interval(repeat_every),
            weekdays: normalize_weekdays(repeat_days),
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_every(mut self, every: u32) -> Self {
        self.every = every.max(1);
        self
    }

    /// Whether this rule fires on `on`.
    ///
    /// A missing start date resolves to `on` itself, and any date before
    /// the start is never due, regardless of kind.
    pub fn is_due(&self, on: NaiveDate) -> bool {
        let start = self.start.unwrap_or(on);
        if on < start {
            return false;
        }
        let every = i64::from(self.every.max(1));

        match self.kind {
            RepeatKind::Daily => {
                let days = (on - start).num_days();
                days % every == 0
            }
            RepeatKind::Weekly => {
                let weekday = on.weekday().num_days_from_monday() as u8;
                if !self.weekdays.contains(&weekday) {
                    return false;
                }
                // Weeks are counted as elapsed days over seven, not by
                // calendar-week boundaries: two due days inside the same
                // seven-day window share a week number even when a Monday
                // falls between them.
                let weeks = (on - start).num_days() / 7;
                weeks % every == 0
            }
            RepeatKind::Monthly => {
                match effective_day_in_month(on.year(), on.month(), start.day()) {
                    Some(effective) if on == effective => {}
                    _ => return false,
                }
                let months = i64::from(on.year() - start.year()) * 12
                    + (i64::from(on.month()) - i64::from(start.month()));
                months >= 0 && months % every == 0
            }
            RepeatKind::Yearly => {
                if start.month() == 2 && start.day() == 29 {
                    // A leap-day anniversary lands on Feb 28 in common
                    // years and Feb 29 in leap years.
                    let matches = match (on.month(), on.day()) {
                        (2, 29) => true,
                        (2, 28) => !is_leap_year(on.year()),
                        _ => false,
                    };
                    if !matches {
                        return false;
                    }
                } else if on.month() != start.month() || on.day() != start.day() {
                    return false;
                }
                let years = i64::from(on.year() - start.year());
                years >= 0 && years % every == 0
            }
            RepeatKind::Unknown => false,
        }
    }
}

/// The day a monthly rule fires in a given month: the start day if the
/// month has it, otherwise the month's last day (a habit started on the
/// 31st is due on the 28th/29th/30th of shorter months).
fn effective_day_in_month(year: i32, month: u32, target_day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, target_day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn never_due_before_start() {
        let rule = Recurrence::daily().with_start(date(2024, 3, 10));
        assert!(!rule.is_due(date(2024, 3, 9)));
        assert!(!rule.is_due(date(2023, 12, 31)));
        assert!(rule.is_due(date(2024, 3, 10)));
    }

    #[test]
    fn daily_every_day() {
        let rule = Recurrence::daily().with_start(date(2024, 1, 1));
        for offset in 0..40 {
            let d = date(2024, 1, 1) + chrono::Duration::days(offset);
            assert!(rule.is_due(d), "{d} should be due");
        }
    }

    #[test]
    fn daily_every_third_day() {
        let rule = Recurrence::daily()
            .with_start(date(2024, 1, 1))
            .with_every(3);
        assert!(rule.is_due(date(2024, 1, 1)));
        assert!(!rule.is_due(date(2024, 1, 2)));
        assert!(!rule.is_due(date(2024, 1, 3)));
        assert!(rule.is_due(date(2024, 1, 4)));
        assert!(rule.is_due(date(2024, 1, 7)));
    }

    #[test]
    fn weekly_on_mon_wed_fri() {
        // 2024-01-01 is a Monday.
        let rule = Recurrence::from_raw(Some("2024-01-01"), Some("weekly"), Some("1"), Some("0,2,4"));
        assert!(rule.is_due(date(2024, 1, 1))); // Mon
        assert!(!rule.is_due(date(2024, 1, 2))); // Tue
        assert!(rule.is_due(date(2024, 1, 3))); // Wed
        assert!(!rule.is_due(date(2024, 1, 4))); // Thu
        assert!(rule.is_due(date(2024, 1, 5))); // Fri
        assert!(!rule.is_due(date(2024, 1, 6))); // Sat
        assert!(!rule.is_due(date(2024, 1, 7))); // Sun
        assert!(rule.is_due(date(2024, 1, 8))); // next Mon
        assert!(rule.is_due(date(2024, 3, 13))); // a Wednesday months later
    }

    #[test]
    fn weekly_interval_counts_elapsed_days_not_calendar_weeks() {
        // Start on a Wednesday with a two-week interval. The following
        // Monday is only five days in, so it still sits in week zero even
        // though a calendar week boundary has passed.
        let rule = Recurrence::from_raw(
            Some("2024-01-03"), // Wednesday
            Some("weekly"),
            Some("2"),
            None, // all weekdays
        );
        assert!(rule.is_due(date(2024, 1, 3)));
        assert!(rule.is_due(date(2024, 1, 8))); // Monday, day 5, week 0
        assert!(!rule.is_due(date(2024, 1, 10))); // day 7, week 1
        assert!(rule.is_due(date(2024, 1, 17))); // day 14, week 2
    }

    #[test]
    fn weekly_empty_day_set_means_all_days() {
        let rule = Recurrence::from_raw(Some("2024-01-01"), Some("weekly"), None, Some(""));
        for offset in 0..7 {
            assert!(rule.is_due(date(2024, 1, 1) + chrono::Duration::days(offset)));
        }
    }

    #[test]
    fn weekly_garbage_days_are_dropped() {
        let rule = Recurrence::from_raw(
            Some("2024-01-01"),
            Some("weekly"),
            Some("1"),
            Some("0, x, 9, 4"),
        );
        assert_eq!(rule.weekdays, BTreeSet::from([0, 4]));
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        let rule = Recurrence::from_raw(Some("2024-01-31"), Some("monthly"), Some("1"), None);
        assert!(rule.is_due(date(2024, 2, 29))); // leap February
        assert!(!rule.is_due(date(2024, 2, 28)));
        assert!(rule.is_due(date(2024, 3, 31)));
        assert!(rule.is_due(date(2024, 4, 30)));
        assert!(!rule.is_due(date(2024, 4, 29)));
    }

    #[test]
    fn monthly_clamps_in_common_february() {
        let rule = Recurrence::from_raw(Some("2023-01-31"), Some("monthly"), Some("1"), None);
        assert!(rule.is_due(date(2023, 2, 28)));
        assert!(!rule.is_due(date(2023, 2, 27)));
    }

    #[test]
    fn monthly_respects_interval() {
        let rule = Recurrence::from_raw(Some("2024-01-15"), Some("monthly"), Some("3"), None);
        assert!(rule.is_due(date(2024, 1, 15)));
        assert!(!rule.is_due(date(2024, 2, 15)));
        assert!(rule.is_due(date(2024, 4, 15)));
        assert!(rule.is_due(date(2024, 7, 15)));
    }

    #[test]
    fn yearly_plain_anniversary() {
        let rule = Recurrence::from_raw(Some("2020-06-15"), Some("yearly"), Some("1"), None);
        assert!(rule.is_due(date(2020, 6, 15)));
        assert!(rule.is_due(date(2023, 6, 15)));
        assert!(!rule.is_due(date(2023, 6, 14)));
        assert!(!rule.is_due(date(2023, 7, 15)));
    }

    #[test]
    fn yearly_leap_day_start() {
        let rule = Recurrence::from_raw(Some("2020-02-29"), Some("yearly"), Some("1"), None);
        assert!(rule.is_due(date(2020, 2, 29)));
        assert!(rule.is_due(date(2021, 2, 28))); // common year
        assert!(rule.is_due(date(2024, 2, 29))); // leap year
        assert!(!rule.is_due(date(2024, 2, 28))); // leap year has the real day
        assert!(!rule.is_due(date(2021, 3, 1)));
    }

    #[test]
    fn yearly_respects_interval() {
        let rule = Recurrence::from_raw(Some("2020-06-15"), Some("yearly"), Some("2"), None);
        assert!(rule.is_due(date(2020, 6, 15)));
        assert!(!rule.is_due(date(2021, 6, 15)));
        assert!(rule.is_due(date(2022, 6, 15)));
    }

    #[test]
    fn unknown_kind_is_never_due() {
        let rule = Recurrence::from_raw(Some("2024-01-01"), Some("fortnightly"), Some("1"), None);
        assert_eq!(rule.kind, RepeatKind::Unknown);
        for offset in 0..30 {
            assert!(!rule.is_due(date(2024, 1, 1) + chrono::Duration::days(offset)));
        }
    }

    #[test]
    fn missing_kind_defaults_to_daily() {
        assert_eq!(RepeatKind::parse(None), RepeatKind::Daily);
        assert_eq!(RepeatKind::parse(Some("")), RepeatKind::Daily);
        assert_eq!(RepeatKind::parse(Some("biweekly")), RepeatKind::Unknown);
    }

    #[test]
    fn missing_start_resolves_to_reference_date() {
        let rule = Recurrence::from_raw(None, Some("daily"), Some("5"), None);
        // Start collapses onto whichever date is asked about, so the
        // elapsed count is zero and the rule fires.
        assert!(rule.is_due(date(2024, 5, 20)));
        assert!(rule.is_due(date(1999, 1, 1)));
    }

    #[test]
    fn malformed_start_resolves_to_reference_date() {
        let rule = Recurrence::from_raw(Some("not-a-date"), Some("daily"), Some("2"), None);
        assert_eq!(rule.start, None);
        assert!(rule.is_due(date(2024, 5, 20)));
    }

    #[test]
    fn interval_coercion() {
        assert_eq!(normalize_interval(None), 1);
        assert_eq!(normalize_interval(Some("")), 1);
        assert_eq!(normalize_interval(Some("abc")), 1);
        assert_eq!(normalize_interval(Some("0")), 1);
        assert_eq!(normalize_interval(Some("-4")), 1);
        assert_eq!(normalize_interval(Some("3")), 3);
        assert_eq!(normalize_interval_int(Some(0)), 1);
        assert_eq!(normalize_interval_int(Some(-7)), 1);
        assert_eq!(normalize_interval_int(Some(6)), 6);
        assert_eq!(normalize_interval_int(None), 1);
    }

    proptest! {
        #[test]
        fn prop_never_due_before_start(
            start_offset in 0i64..20_000,
            probe_offset in 0i64..20_000,
            every in 0u32..40,
            kind in prop_oneof![
                Just(RepeatKind::Daily),
                Just(RepeatKind::Weekly),
                Just(RepeatKind::Monthly),
                Just(RepeatKind::Yearly),
            ],
        ) {
            let epoch = date(2000, 1, 1);
            let start = epoch + chrono::Duration::days(start_offset);
            let rule = Recurrence {
                start: Some(start),
                kind,
                every: every.max(1),
                weekdays: (0..7).collect(),
            };
            let probe = epoch + chrono::Duration::days(probe_offset);
            if probe < start {
                prop_assert!(!rule.is_due(probe));
            }
        }

        #[test]
        fn prop_daily_every_one_always_due(offset in 0i64..20_000) {
            let start = date(2000, 1, 1);
            let rule = Recurrence::daily().with_start(start);
            prop_assert!(rule.is_due(start + chrono::Duration::days(offset)));
        }
    }
}
