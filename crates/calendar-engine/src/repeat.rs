//! Repeat rules: day-level recurrence predicates over [`DateParts`].
//!
//! A rule fires on a day when the day lies within `[from, until]`, the
//! interval since `from` is a multiple of `every`, and every `on`
//! condition matches. With no conditions, weekly rules repeat on the
//! anchor's weekday, monthly rules on its day of month and yearly rules on
//! its month and day.
//!
//! Rules can also be written as RFC 5545 RRULE strings; the `rrule` crate
//! parses them and the supported parts map onto the same conditions.

use chrono::{NaiveDate, Weekday};
use rrule::{Frequency, NWeekday, RRule, Unvalidated};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::locale::{DateParts, Locale};

/// Unit of a repeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatUnit {
    #[serde(alias = "day")]
    Days,
    #[serde(alias = "week")]
    Weeks,
    #[serde(alias = "month")]
    Months,
    #[serde(alias = "year")]
    Years,
}

/// `"weeks"` or `[2, "weeks"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatEvery {
    Unit(RepeatUnit),
    Interval(u32, RepeatUnit),
}

impl RepeatEvery {
    fn parts(self) -> (u32, RepeatUnit) {
        match self {
            RepeatEvery::Unit(unit) => (1, unit),
            RepeatEvery::Interval(n, unit) => (n, unit),
        }
    }
}

/// Serializable repeat configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatConfig {
    pub every: Option<RepeatEvery>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    /// Days of month; negative values count from the end (-1 = last day).
    pub days: Vec<i32>,
    pub weekdays: Vec<Weekday>,
    /// `(n, weekday)`: the n-th weekday of the month, negative from the end.
    pub ordinal_weekdays: Vec<(i32, Weekday)>,
    /// Grid rows of the month; negative values count from the end.
    pub weeks: Vec<i32>,
    pub months: Vec<u32>,
    pub years: Vec<i32>,
    /// RFC 5545 rule, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO`.
    pub rrule: Option<String>,
}

/// One `on` condition. A condition matches when any of its values does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatCondition {
    Days(Vec<i32>),
    Weekdays(Vec<Weekday>),
    OrdinalWeekdays(Vec<(i32, Weekday)>),
    Weeks(Vec<i32>),
    Months(Vec<u32>),
    Years(Vec<i32>),
}

fn matches_from_either_end(values: &[i32], value: u32, from_end: u32) -> bool {
    values.iter().any(|&v| {
        (v > 0 && v as u32 == value) || (v < 0 && v.unsigned_abs() == from_end)
    })
}

impl RepeatCondition {
    pub fn passes(&self, day: &DateParts) -> bool {
        match self {
            RepeatCondition::Days(days) => matches_from_either_end(days, day.day, day.day_from_end),
            RepeatCondition::Weekdays(weekdays) => weekdays.contains(&day.weekday),
            RepeatCondition::OrdinalWeekdays(ordinals) => ordinals.iter().any(|&(n, weekday)| {
                weekday == day.weekday
                    && matches_from_either_end(
                        &[n],
                        day.weekday_ordinal,
                        day.weekday_ordinal_from_end,
                    )
            }),
            RepeatCondition::Weeks(weeks) => matches_from_either_end(weeks, day.week, day.week_from_end),
            RepeatCondition::Months(months) => months.contains(&day.month),
            RepeatCondition::Years(years) => years.contains(&day.year),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatRule {
    interval: u32,
    unit: RepeatUnit,
    from: Option<DateParts>,
    until: Option<i64>,
    on: Vec<RepeatCondition>,
}

impl RepeatRule {
    /// Build a rule. `anchor` is the owning range's start and serves as
    /// `from` unless the configuration sets one.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidRepeat` when the interval is zero, the
    /// RRULE is malformed or uses unsupported parts, or the rule needs an
    /// anchor date and has none.
    pub fn from_config(
        config: &RepeatConfig,
        anchor: Option<&DateParts>,
        locale: &Locale,
    ) -> Result<Self> {
        let mut config = config.clone();
        if let Some(text) = config.rrule.take() {
            merge_rrule(&mut config, &text)?;
        }

        let (interval, unit) = config
            .every
            .map(RepeatEvery::parts)
            .unwrap_or((1, RepeatUnit::Days));
        if interval == 0 {
            return Err(CalendarError::InvalidRepeat("interval must be at least 1".to_string()));
        }

        let from = match config.from {
            Some(date) => Some(locale.day_parts(date)),
            None => anchor.cloned(),
        };
        let until = config.until.map(|date| locale.day_parts(date).day_index);

        let mut on = Vec::new();
        if !config.days.is_empty() {
            on.push(RepeatCondition::Days(config.days));
        }
        if !config.weekdays.is_empty() {
            on.push(RepeatCondition::Weekdays(config.weekdays));
        }
        if !config.ordinal_weekdays.is_empty() {
            on.push(RepeatCondition::OrdinalWeekdays(config.ordinal_weekdays));
        }
        if !config.weeks.is_empty() {
            on.push(RepeatCondition::Weeks(config.weeks));
        }
        if !config.months.is_empty() {
            on.push(RepeatCondition::Months(config.months));
        }
        if !config.years.is_empty() {
            on.push(RepeatCondition::Years(config.years));
        }

        let needs_anchor = interval > 1 || (on.is_empty() && unit != RepeatUnit::Days);
        if needs_anchor && from.is_none() {
            return Err(CalendarError::InvalidRepeat(format!(
                "repeating every {} {:?} needs a start date",
                interval, unit
            )));
        }

        Ok(RepeatRule {
            interval,
            unit,
            from,
            until,
            on,
        })
    }

    /// Parse an RRULE string into a rule anchored at `anchor`.
    ///
    /// # Errors
    /// See [`RepeatRule::from_config`].
    pub fn from_rrule(text: &str, anchor: Option<&DateParts>, locale: &Locale) -> Result<Self> {
        let config = RepeatConfig {
            rrule: Some(text.to_string()),
            ..RepeatConfig::default()
        };
        Self::from_config(&config, anchor, locale)
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn unit(&self) -> RepeatUnit {
        self.unit
    }

    pub fn from(&self) -> Option<&DateParts> {
        self.from.as_ref()
    }

    pub fn conditions(&self) -> &[RepeatCondition] {
        &self.on
    }

    /// Whether the rule fires on `day`.
    pub fn passes(&self, day: &DateParts) -> bool {
        if let Some(from) = &self.from {
            if day.day_index < from.day_index {
                return false;
            }
        }
        if let Some(until) = self.until {
            if day.day_index > until {
                return false;
            }
        }
        if self.interval > 1 {
            let Some(from) = &self.from else {
                return false;
            };
            if self.units_between(from, day).rem_euclid(i64::from(self.interval)) != 0 {
                return false;
            }
        }
        if self.on.is_empty() {
            return self.passes_implied(day);
        }
        self.on.iter().all(|condition| condition.passes(day))
    }

    fn units_between(&self, from: &DateParts, day: &DateParts) -> i64 {
        match self.unit {
            RepeatUnit::Days => day.day_index - from.day_index,
            RepeatUnit::Weeks => {
                let week_start = |p: &DateParts| p.day_index - i64::from(p.weekday_position - 1);
                (week_start(day) - week_start(from)).div_euclid(7)
            }
            RepeatUnit::Months => {
                i64::from(day.year - from.year) * 12 + i64::from(day.month) - i64::from(from.month)
            }
            RepeatUnit::Years => i64::from(day.year - from.year),
        }
    }

    fn passes_implied(&self, day: &DateParts) -> bool {
        let Some(from) = &self.from else {
            return self.unit == RepeatUnit::Days;
        };
        match self.unit {
            RepeatUnit::Days => true,
            RepeatUnit::Weeks => day.weekday == from.weekday,
            RepeatUnit::Months => day.day == from.day,
            RepeatUnit::Years => day.month == from.month && day.day == from.day,
        }
    }
}

/// Fold the supported parts of an RRULE into `config`.
fn merge_rrule(config: &mut RepeatConfig, text: &str) -> Result<()> {
    let rule: RRule<Unvalidated> = text
        .trim()
        .parse()
        .map_err(|e| CalendarError::InvalidRepeat(format!("{}", e)))?;

    let unit = match rule.get_freq() {
        Frequency::Daily => RepeatUnit::Days,
        Frequency::Weekly => RepeatUnit::Weeks,
        Frequency::Monthly => RepeatUnit::Months,
        Frequency::Yearly => RepeatUnit::Years,
        other => {
            return Err(CalendarError::InvalidRepeat(format!(
                "unsupported frequency {:?}",
                other
            )))
        }
    };
    if rule.get_count().is_some() {
        return Err(CalendarError::InvalidRepeat("COUNT is not supported".to_string()));
    }
    if !rule.get_by_set_pos().is_empty()
        || !rule.get_by_year_day().is_empty()
        || !rule.get_by_week_no().is_empty()
    {
        return Err(CalendarError::InvalidRepeat(format!(
            "unsupported RRULE parts in '{}'",
            text
        )));
    }

    config.every = Some(RepeatEvery::Interval(u32::from(rule.get_interval()), unit));
    if let Some(until) = rule.get_until() {
        config.until = Some(until.date_naive());
    }
    for weekday in rule.get_by_weekday() {
        match weekday {
            NWeekday::Every(weekday) => config.weekdays.push(*weekday),
            NWeekday::Nth(n, weekday) => config.ordinal_weekdays.push((i32::from(*n), *weekday)),
        }
    }
    config
        .days
        .extend(rule.get_by_month_day().iter().map(|&d| i32::from(d)));
    config
        .months
        .extend(rule.get_by_month().iter().map(|&m| u32::from(m)));
    Ok(())
}
