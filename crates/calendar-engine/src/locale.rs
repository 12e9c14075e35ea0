//! Locale service: timezone, first day of week, names and masks.
//!
//! Every piece of calendar math the rest of the engine relies on lives here:
//! decomposing instants into [`DateParts`], describing months as
//! [`MonthParts`], local and ISO week numbering, and resolving raw
//! [`DateSource`] values into zoned instants.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{CalendarError, Result};
use crate::format;
use crate::range::{DateRange, DateRangeConfig, DateRangeSource};

/// Milliseconds in a calendar day.
pub const MS_PER_DAY: i64 = 86_400_000;
/// Columns in a day grid.
pub const DAYS_IN_WEEK: u32 = 7;
/// Rows in a day grid; the longest month spans six weeks.
pub const WEEKS_IN_MONTH: u32 = 6;

const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Sunday first, matching [`Weekday::num_days_from_sunday`].
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Continuous day ordinal, 0 at 1970-01-01.
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`day_index`].
pub fn date_from_day_index(index: i64) -> Option<NaiveDate> {
    let days = i32::try_from(index + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// Shift a date by whole days, saturating at chrono's representable range.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Earliest year a page or month computation can address.
pub const MIN_YEAR: i32 = -9999;
/// Latest year a page or month computation can address.
pub const MAX_YEAR: i32 = 9999;

/// `(year, month)` with `month` rolled into 1..=12 and the result clamped to
/// `MIN_YEAR..=MAX_YEAR`.
fn normalize_month(year: i32, month: i64) -> (i32, u32) {
    let total = (i64::from(year) * 12 + month - 1)
        .clamp(i64::from(MIN_YEAR) * 12, i64::from(MAX_YEAR) * 12 + 11);
    (total.div_euclid(12) as i32, (total.rem_euclid(12) + 1) as u32)
}

/// First day of a month. `month` may lie outside 1..=12 and rolls the year;
/// years beyond `MIN_YEAR..=MAX_YEAR` saturate at the nearest bound.
pub fn first_of_month(year: i32, month: i32) -> NaiveDate {
    let (year, month) = normalize_month(year, i64::from(month));
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (year, month) = normalize_month(year, i64::from(month));
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Date sources
// ---------------------------------------------------------------------------

/// Anything the locale can turn into a zoned instant.
///
/// Deserializes untagged: numbers are millisecond timestamps, strings are
/// tried as a plain date, a local date-time, an RFC 3339 instant, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateSource {
    Timestamp(i64),
    Day(NaiveDate),
    Local(NaiveDateTime),
    Instant(DateTime<Utc>),
    Text(String),
}

impl DateSource {
    /// The calendar day this source names, when it carries no time of day.
    pub fn as_day(&self) -> Option<NaiveDate> {
        match self {
            DateSource::Day(date) => Some(*date),
            DateSource::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}

impl From<NaiveDate> for DateSource {
    fn from(date: NaiveDate) -> Self {
        DateSource::Day(date)
    }
}

impl From<NaiveDateTime> for DateSource {
    fn from(value: NaiveDateTime) -> Self {
        DateSource::Local(value)
    }
}

impl From<DateTime<Utc>> for DateSource {
    fn from(value: DateTime<Utc>) -> Self {
        DateSource::Instant(value)
    }
}

impl From<DateTime<Tz>> for DateSource {
    fn from(value: DateTime<Tz>) -> Self {
        DateSource::Instant(value.with_timezone(&Utc))
    }
}

impl From<&str> for DateSource {
    fn from(value: &str) -> Self {
        DateSource::Text(value.to_string())
    }
}

impl From<String> for DateSource {
    fn from(value: String) -> Self {
        DateSource::Text(value)
    }
}

/// Explicit date components, resolved in the locale's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParams {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub second: u32,
    #[serde(default)]
    pub millisecond: u32,
}

impl DateParams {
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        DateParams {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Decomposed dates
// ---------------------------------------------------------------------------

/// Immutable decomposition of an instant in a locale.
///
/// `day_index` orders days without touching calendar math again; the
/// positional fields (`week`, ordinals, `*_from_end`) are relative to the
/// month the day belongs to and feed repeat rules.
#[derive(Debug, Clone, PartialEq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    pub day_index: i64,
    /// Milliseconds since local midnight.
    pub time: i64,
    pub date: DateTime<Tz>,
    pub weekday: Weekday,
    /// 1-based column of the weekday, relative to the first day of week.
    pub weekday_position: u32,
    pub weekday_position_from_end: u32,
    /// Which occurrence of this weekday in the month (1-based).
    pub weekday_ordinal: u32,
    pub weekday_ordinal_from_end: u32,
    /// 1-based row of the day in its month grid.
    pub week: u32,
    pub week_from_end: u32,
    pub weeknumber: u32,
    pub iso_weeknumber: u32,
    pub days_in_month: u32,
    pub day_from_end: u32,
}

impl DateParts {
    pub fn naive_date(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Shape of one month in a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParts {
    pub year: i32,
    pub month: u32,
    pub first_day_of_month: NaiveDate,
    pub last_day_of_month: NaiveDate,
    pub num_days: u32,
    pub first_weekday: Weekday,
    pub first_weekday_position: u32,
    /// Grid rows actually touched by the month (4 to 6).
    pub num_weeks: u32,
    /// Local week number of each of the six grid rows.
    pub weeknumbers: Vec<u32>,
    /// ISO week number of each of the six grid rows.
    pub iso_weeknumbers: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Formatting masks used for titles and labels.
///
/// Every mask is scanned for tokens (see [`crate::format`]); literal text,
/// even a single letter such as `a` or `D`, must be bracketed: `"[Week of] MMM D"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Masks {
    pub title: String,
    pub weekdays: String,
    /// Month labels of a page header.
    pub nav_months: String,
    pub day_title: String,
}

impl Default for Masks {
    fn default() -> Self {
        Masks {
            title: "MMMM YYYY".to_string(),
            weekdays: "W".to_string(),
            nav_months: "MMM".to_string(),
            day_title: "WWWW, MMMM D, YYYY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub id: String,
    pub first_day_of_week: Weekday,
    /// IANA timezone name.
    pub timezone: String,
    /// Day of January that week 1 of the local numbering must contain (1..=7).
    pub first_week_contains_date: u32,
    pub masks: Masks,
    /// Twelve month names, January first.
    pub month_names: Option<Vec<String>>,
    /// Seven weekday names, Sunday first.
    pub weekday_names: Option<Vec<String>>,
    pub dst_policy: DstPolicy,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        LocaleConfig {
            id: "en-US".to_string(),
            first_day_of_week: Weekday::Sun,
            timezone: "UTC".to_string(),
            first_week_contains_date: 1,
            masks: Masks::default(),
            month_names: None,
            weekday_names: None,
            dst_policy: DstPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// The locale service. Authoritative for days-in-month, week numbering,
/// first day of week and timezone handling.
#[derive(Debug, Clone, PartialEq)]
pub struct Locale {
    id: String,
    first_day_of_week: Weekday,
    timezone: Tz,
    first_week_contains_date: u32,
    masks: Masks,
    month_names: Vec<String>,
    weekday_names: Vec<String>,
    dst_policy: DstPolicy,
}

impl Default for Locale {
    fn default() -> Self {
        let config = LocaleConfig::default();
        Locale {
            id: config.id,
            first_day_of_week: config.first_day_of_week,
            timezone: Tz::UTC,
            first_week_contains_date: config.first_week_contains_date,
            masks: config.masks,
            month_names: MONTH_NAMES.iter().map(|s| s.to_string()).collect(),
            weekday_names: WEEKDAY_NAMES.iter().map(|s| s.to_string()).collect(),
            dst_policy: config.dst_policy,
        }
    }
}

impl Locale {
    /// Build a locale from configuration.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidTimezone` for an unknown IANA name and
    /// `CalendarError::InvalidLocale` for malformed name tables or a
    /// `first_week_contains_date` outside 1..=7.
    pub fn new(config: LocaleConfig) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| CalendarError::InvalidTimezone(config.timezone.clone()))?;

        if !(1..=7).contains(&config.first_week_contains_date) {
            return Err(CalendarError::InvalidLocale(format!(
                "first_week_contains_date must be within 1..=7, got {}",
                config.first_week_contains_date
            )));
        }

        let month_names = match config.month_names {
            Some(names) if names.len() == 12 => names,
            Some(names) => {
                return Err(CalendarError::InvalidLocale(format!(
                    "expected 12 month names, got {}",
                    names.len()
                )))
            }
            None => MONTH_NAMES.iter().map(|s| s.to_string()).collect(),
        };
        let weekday_names = match config.weekday_names {
            Some(names) if names.len() == 7 => names,
            Some(names) => {
                return Err(CalendarError::InvalidLocale(format!(
                    "expected 7 weekday names, got {}",
                    names.len()
                )))
            }
            None => WEEKDAY_NAMES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Locale {
            id: config.id,
            first_day_of_week: config.first_day_of_week,
            timezone,
            first_week_contains_date: config.first_week_contains_date,
            masks: config.masks,
            month_names,
            weekday_names,
            dst_policy: config.dst_policy,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn masks(&self) -> &Masks {
        &self.masks
    }

    /// Today's date in the locale's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    // -- Instants -----------------------------------------------------------

    /// Resolve a raw source into an instant in the locale's timezone.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` for unparseable text or an
    /// out-of-range timestamp.
    pub fn to_date(&self, source: &DateSource) -> Result<DateTime<Tz>> {
        match source {
            DateSource::Timestamp(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|dt| dt.with_timezone(&self.timezone))
                .ok_or_else(|| CalendarError::InvalidDate(format!("timestamp {}", ms))),
            DateSource::Day(date) => Ok(self.start_of_day(*date)),
            DateSource::Local(local) => Ok(self.resolve_local(*local)),
            DateSource::Instant(instant) => Ok(instant.with_timezone(&self.timezone)),
            DateSource::Text(text) => self.parse_text(text),
        }
    }

    fn parse_text(&self, text: &str) -> Result<DateTime<Tz>> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&self.timezone));
        }
        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(local) = NaiveDateTime::parse_from_str(text, pattern) {
                return Ok(self.resolve_local(local));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| self.start_of_day(date))
            .map_err(|_| CalendarError::InvalidDate(text.to_string()))
    }

    fn resolve_local(&self, local: NaiveDateTime) -> DateTime<Tz> {
        self.dst_policy.resolve(&self.timezone, local)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` when the components do not name a
    /// real date or time.
    pub fn get_date_from_params(&self, params: &DateParams) -> Result<DateTime<Tz>> {
        let local = NaiveDate::from_ymd_opt(params.year, params.month, params.day)
            .and_then(|date| {
                date.and_hms_milli_opt(
                    params.hour,
                    params.minute,
                    params.second,
                    params.millisecond,
                )
            })
            .ok_or_else(|| CalendarError::InvalidDate(format!("{:?}", params)))?;
        Ok(self.resolve_local(local))
    }

    /// 00:00:00.000 of `date` in the locale's timezone.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        self.resolve_local(date.and_time(NaiveTime::default()))
    }

    /// 12:00:00.000 of `date` in the locale's timezone.
    pub fn noon(&self, date: NaiveDate) -> DateTime<Tz> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        self.resolve_local(date.and_time(noon))
    }

    /// 23:59:59.999 of `date` in the locale's timezone.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        self.resolve_local(date.and_time(end_of_day_time()))
    }

    // -- Decomposition ------------------------------------------------------

    pub fn get_date_parts(&self, date: &DateTime<Tz>) -> DateParts {
        let zoned = date.with_timezone(&self.timezone);
        let local = zoned.naive_local();
        let mut parts = self.day_parts(local.date());
        let millisecond = (local.nanosecond() / 1_000_000).min(999);
        parts.hour = local.hour();
        parts.minute = local.minute();
        parts.second = local.second();
        parts.millisecond = millisecond;
        parts.time = i64::from(local.num_seconds_from_midnight()) * 1000 + i64::from(millisecond);
        parts.date = zoned;
        parts
    }

    /// Decompose the start of a calendar day.
    pub fn day_parts(&self, date: NaiveDate) -> DateParts {
        let first = first_of_month(date.year(), date.month() as i32);
        let num_days = days_in_month(date.year(), date.month());
        let first_position = self.weekday_position(first.weekday());
        let num_weeks = (num_days + first_position - 2) / DAYS_IN_WEEK + 1;

        let day = date.day();
        let weekday = date.weekday();
        let weekday_position = self.weekday_position(weekday);
        let day_from_end = num_days - day + 1;
        let week = (day + first_position - 2) / DAYS_IN_WEEK + 1;

        DateParts {
            year: date.year(),
            month: date.month(),
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            day_index: day_index(date),
            time: 0,
            date: self.start_of_day(date),
            weekday,
            weekday_position,
            weekday_position_from_end: DAYS_IN_WEEK - weekday_position + 1,
            weekday_ordinal: (day - 1) / DAYS_IN_WEEK + 1,
            weekday_ordinal_from_end: (day_from_end - 1) / DAYS_IN_WEEK + 1,
            week,
            week_from_end: num_weeks - week + 1,
            weeknumber: self.week_number(date),
            iso_weeknumber: date.iso_week().week(),
            days_in_month: num_days,
            day_from_end,
        }
    }

    pub fn day_parts_for_index(&self, index: i64) -> Option<DateParts> {
        date_from_day_index(index).map(|date| self.day_parts(date))
    }

    /// Parts for one end of a range. Plain dates cover the whole day: the
    /// start edge resolves to 00:00:00.000, the end edge to 23:59:59.999.
    pub(crate) fn bound_parts(&self, source: &DateSource, is_end: bool) -> Result<DateParts> {
        let instant = match source.as_day() {
            Some(date) if is_end => self.end_of_day(date),
            Some(date) => self.start_of_day(date),
            None => self.to_date(source)?,
        };
        Ok(self.get_date_parts(&instant))
    }

    // -- Months -------------------------------------------------------------

    /// Describe a month. `month` outside 1..=12 rolls into adjacent years.
    pub fn get_month_parts(&self, month: u32, year: i32) -> MonthParts {
        let first = first_of_month(year, month as i32);
        let (year, month) = (first.year(), first.month());
        let num_days = days_in_month(year, month);
        let first_weekday = first.weekday();
        let first_weekday_position = self.weekday_position(first_weekday);
        let num_weeks = (num_days + first_weekday_position - 2) / DAYS_IN_WEEK + 1;

        let grid_start = shift_days(first, -i64::from(first_weekday_position - 1));
        let monday_offset = i64::from(self.weekday_position(Weekday::Mon) - 1);
        let mut weeknumbers = Vec::with_capacity(WEEKS_IN_MONTH as usize);
        let mut iso_weeknumbers = Vec::with_capacity(WEEKS_IN_MONTH as usize);
        for row in 0..i64::from(WEEKS_IN_MONTH) {
            let row_start = shift_days(grid_start, row * 7);
            weeknumbers.push(self.week_number(row_start));
            iso_weeknumbers.push(shift_days(row_start, monday_offset).iso_week().week());
        }

        MonthParts {
            year,
            month,
            first_day_of_month: first,
            last_day_of_month: shift_days(first, i64::from(num_days) - 1),
            num_days,
            first_weekday,
            first_weekday_position,
            num_weeks,
            weeknumbers,
            iso_weeknumbers,
        }
    }

    pub fn get_prev_month_parts(&self, month: u32, year: i32) -> MonthParts {
        let first = first_of_month(year, month as i32 - 1);
        self.get_month_parts(first.month(), first.year())
    }

    pub fn get_next_month_parts(&self, month: u32, year: i32) -> MonthParts {
        let first = first_of_month(year, month as i32 + 1);
        self.get_month_parts(first.month(), first.year())
    }

    // -- Weeks --------------------------------------------------------------

    /// 1-based column of `weekday` when weeks start on the locale's first day.
    pub fn weekday_position(&self, weekday: Weekday) -> u32 {
        let offset = weekday.num_days_from_sunday() + 7 - self.first_day_of_week.num_days_from_sunday();
        offset % 7 + 1
    }

    /// Inverse of [`Locale::weekday_position`].
    pub fn weekday_at_position(&self, position: u32) -> Weekday {
        (1..position).fold(self.first_day_of_week, |weekday, _| weekday.succ())
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        shift_days(date, -i64::from(self.weekday_position(date.weekday()) - 1))
    }

    /// Local week number: weeks start on the first day of week, and week 1
    /// is the week containing January `first_week_contains_date`.
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        let week_year_start = |year: i32| {
            let anchor = NaiveDate::from_ymd_opt(year, 1, self.first_week_contains_date)
                .unwrap_or_default();
            self.start_of_week(anchor)
        };
        let year = date.year();
        let next = week_year_start(year + 1);
        let this = week_year_start(year);
        let start = if date >= next {
            next
        } else if date >= this {
            this
        } else {
            week_year_start(year - 1)
        };
        ((self.start_of_week(date) - start).num_days() / 7 + 1) as u32
    }

    pub fn iso_week_number(&self, date: NaiveDate) -> u32 {
        date.iso_week().week()
    }

    // -- Names and formatting -----------------------------------------------

    /// Full month name; `month` is 1-based.
    pub fn month_name(&self, month: u32) -> &str {
        let index = (month.clamp(1, 12) - 1) as usize;
        &self.month_names[index]
    }

    pub fn short_month_name(&self, month: u32) -> String {
        self.month_name(month).chars().take(3).collect()
    }

    pub fn weekday_name(&self, weekday: Weekday) -> &str {
        &self.weekday_names[weekday.num_days_from_sunday() as usize]
    }

    /// First `len` characters of the weekday name.
    pub fn weekday_label(&self, weekday: Weekday, len: usize) -> String {
        self.weekday_name(weekday).chars().take(len).collect()
    }

    pub fn format_date(&self, date: &DateTime<Tz>, mask: &str) -> String {
        let local = date.with_timezone(&self.timezone).naive_local();
        format::format_date(self, &local, mask)
    }

    pub fn format_day(&self, date: NaiveDate, mask: &str) -> String {
        format::format_date(self, &date.and_time(NaiveTime::default()), mask)
    }

    /// Stable identifier of a calendar day (`YYYY-MM-DD`).
    pub fn day_id(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    // -- Ranges -------------------------------------------------------------

    /// Build one range per source. A range without an explicit `order` is
    /// ordered by its position.
    ///
    /// # Errors
    /// Propagates the first source that fails to resolve.
    pub fn ranges(&self, sources: &[DateRangeSource]) -> Result<Vec<DateRange>> {
        sources
            .iter()
            .enumerate()
            .map(|(position, source)| {
                let range = DateRange::from_source(source, self)?;
                Ok(match source {
                    DateRangeSource::Config(DateRangeConfig { order: Some(_), .. }) => range,
                    _ => range.with_order(position as i32),
                })
            })
            .collect()
    }
}
