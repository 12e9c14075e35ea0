//! Date ranges over decomposed dates.
//!
//! A [`DateRange`] is a start/end pair where either side may be open, plus
//! an optional [`RepeatRule`]. `intersects_day_range` and
//! `intersects_range` are the only primitives the rest of the engine uses
//! for range logic; nothing downstream looks at raw dates once a range
//! exists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locale::{shift_days, DateParts, DateSource, Locale};
use crate::repeat::{RepeatConfig, RepeatRule};

/// Object form of a range source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRangeConfig {
    pub start: Option<DateSource>,
    pub end: Option<DateSource>,
    /// Length in days counted from `start`, used when `end` is absent.
    pub span: Option<u32>,
    pub repeat: Option<RepeatConfig>,
    pub order: Option<i32>,
}

/// Anything that normalizes into a [`DateRange`].
///
/// Deserializes untagged: `null` is an unbounded range, a scalar is a
/// single date, `[start, end]` is a pair, an object is a [`DateRangeConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRangeSource {
    Open,
    Single(DateSource),
    Pair(Option<DateSource>, Option<DateSource>),
    Config(DateRangeConfig),
}

impl From<DateSource> for DateRangeSource {
    fn from(value: DateSource) -> Self {
        DateRangeSource::Single(value)
    }
}

impl From<NaiveDate> for DateRangeSource {
    fn from(value: NaiveDate) -> Self {
        DateRangeSource::Single(DateSource::Day(value))
    }
}

impl From<&str> for DateRangeSource {
    fn from(value: &str) -> Self {
        DateRangeSource::Single(DateSource::from(value))
    }
}

impl From<(NaiveDate, NaiveDate)> for DateRangeSource {
    fn from((start, end): (NaiveDate, NaiveDate)) -> Self {
        DateRangeSource::Pair(Some(DateSource::Day(start)), Some(DateSource::Day(end)))
    }
}

impl From<DateRangeConfig> for DateRangeSource {
    fn from(value: DateRangeConfig) -> Self {
        DateRangeSource::Config(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: Option<DateParts>,
    pub end: Option<DateParts>,
    pub repeat: Option<RepeatRule>,
    pub order: i32,
}

impl DateRange {
    /// A range between two optional bounds.
    pub fn new(start: Option<DateParts>, end: Option<DateParts>) -> Self {
        DateRange {
            start,
            end,
            repeat: None,
            order: 0,
        }
    }

    /// Normalize a source into a range.
    ///
    /// Plain dates cover whole days. When only `start` and `span` are given,
    /// `end` is `start + span - 1` days.
    ///
    /// # Errors
    /// Returns the locale's error for unresolvable dates and
    /// `CalendarError::InvalidRepeat` for a malformed repeat rule.
    pub fn from_source(source: &DateRangeSource, locale: &Locale) -> Result<Self> {
        match source {
            DateRangeSource::Open => Ok(DateRange::new(None, None)),
            DateRangeSource::Single(date) => Ok(DateRange::new(
                Some(locale.bound_parts(date, false)?),
                Some(locale.bound_parts(date, true)?),
            )),
            DateRangeSource::Pair(start, end) => Ok(DateRange::new(
                start.as_ref().map(|s| locale.bound_parts(s, false)).transpose()?,
                end.as_ref().map(|e| locale.bound_parts(e, true)).transpose()?,
            )),
            DateRangeSource::Config(config) => Self::from_config(config, locale),
        }
    }

    fn from_config(config: &DateRangeConfig, locale: &Locale) -> Result<Self> {
        let start = config
            .start
            .as_ref()
            .map(|s| locale.bound_parts(s, false))
            .transpose()?;
        let end = match (&config.end, &start, config.span) {
            (Some(end), _, _) => Some(locale.bound_parts(end, true)?),
            (None, Some(start), Some(span)) if span > 0 => {
                let last = shift_days(start.naive_date(), i64::from(span) - 1);
                Some(locale.get_date_parts(&locale.end_of_day(last)))
            }
            _ => None,
        };
        let repeat = config
            .repeat
            .as_ref()
            .map(|repeat| RepeatRule::from_config(repeat, start.as_ref(), locale))
            .transpose()?;

        Ok(DateRange {
            start,
            end,
            repeat,
            order: config.order.unwrap_or(0),
        })
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatRule) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn has_repeat(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn is_single_day(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => start.day_index == end.day_index,
            _ => false,
        }
    }

    pub fn is_multi_day(&self) -> bool {
        !self.is_single_day()
    }

    /// `end - start` in days. `None` stands for an infinite span (an open
    /// bound without repeat); an open repeating range spans 1.
    pub fn day_span(&self) -> Option<i64> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(end.day_index - start.day_index),
            _ if self.has_repeat() => Some(1),
            _ => None,
        }
    }

    /// Days covered by one occurrence of a repeating range.
    pub fn occurrence_days(&self) -> i64 {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => (end.day_index - start.day_index).max(0) + 1,
            _ => 1,
        }
    }

    /// Whether an occurrence of the range starts on `day`.
    pub fn starts_on_day(&self, day: &DateParts) -> bool {
        self.start
            .as_ref()
            .map_or(false, |start| start.day_index == day.day_index)
            || self.repeat.as_ref().map_or(false, |repeat| repeat.passes(day))
    }

    pub fn intersects_day(&self, day_index: i64) -> bool {
        self.intersects_day_range(day_index, day_index)
    }

    /// False only when the range lies entirely before `lo` or entirely after
    /// `hi`; open bounds never exclude. Use `i64::MIN`/`i64::MAX` for
    /// unbounded windows.
    pub fn intersects_day_range(&self, lo: i64, hi: i64) -> bool {
        if let Some(start) = &self.start {
            if start.day_index > hi {
                return false;
            }
        }
        if let Some(end) = &self.end {
            if end.day_index < lo {
                return false;
            }
        }
        true
    }

    pub fn intersects_range(&self, other: &DateRange) -> bool {
        self.intersects_day_range(
            other.start.as_ref().map_or(i64::MIN, |s| s.day_index),
            other.end.as_ref().map_or(i64::MAX, |e| e.day_index),
        )
    }

    /// Whether the range covers `day`, evaluating repeats by looking back
    /// over one occurrence length.
    pub fn includes_day(&self, day: &DateParts, locale: &Locale) -> bool {
        if !self.has_repeat() {
            return self.intersects_day(day.day_index);
        }
        if self.occurrence_days() == 1 {
            return self.starts_on_day(day);
        }
        (0..self.occurrence_days()).any(|back| {
            locale
                .day_parts_for_index(day.day_index - back)
                .map_or(false, |candidate| self.starts_on_day(&candidate))
        })
    }
}
