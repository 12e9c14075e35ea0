//! Day-grid generation.
//!
//! A month always materializes as a fixed 6×7 grid: spillover from the
//! previous month, the month itself, spillover into the next month. Grids
//! are month-scoped and cached per `(year, month)` in a [`PageCache`]; a
//! [`Page`] is a cached grid plus the view and layout metadata of one slot
//! in the multi-page display.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::locale::{day_index, shift_days, Locale, MonthParts, DAYS_IN_WEEK, WEEKS_IN_MONTH};
use crate::page::{PageAddress, PageView};

/// One cell of a day grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    /// `YYYY-MM-DD`
    pub id: String,
    pub date: NaiveDate,
    pub day_index: i64,
    pub day: u32,
    pub day_from_end: u32,
    pub month: u32,
    pub year: i32,
    /// 1-based grid row.
    pub week: u32,
    /// Rows between this one and the month's last row; zero or negative for
    /// trailing rows past the month.
    pub week_from_end: i32,
    pub weekday: Weekday,
    pub weekday_position: u32,
    pub weekday_position_from_end: u32,
    pub weekday_ordinal: u32,
    pub weekday_ordinal_from_end: u32,
    pub weeknumber: u32,
    pub iso_weeknumber: u32,
    pub in_month: bool,
    pub in_prev_month: bool,
    pub in_next_month: bool,
    pub is_today: bool,
    pub is_first_day: bool,
    pub is_last_day: bool,
    pub is_disabled: bool,
    pub is_focusable: bool,
    pub is_focused: bool,
    pub start_date: DateTime<Tz>,
    pub noon_date: DateTime<Tz>,
    pub end_date: DateTime<Tz>,
}

/// One row of a day grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeek {
    pub id: String,
    /// 1-based grid row.
    pub week: u32,
    pub weeknumber: u32,
    pub iso_weeknumber: u32,
    pub title: String,
    /// Indices into the owning grid's `days`.
    pub days: Range<usize>,
}

/// Weekday header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeekday {
    pub weekday: Weekday,
    pub weekday_position: u32,
    /// Formatted with the locale's `weekdays` mask.
    pub label: String,
    pub short_label: String,
    pub long_label: String,
}

/// Month-scoped grid shared by every page showing the month.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    /// `YYYY-MM`
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub month_title: String,
    pub month_label: String,
    pub short_month_label: String,
    pub year_label: String,
    pub short_year_label: String,
    pub month_parts: MonthParts,
    pub prev_month_parts: MonthParts,
    pub next_month_parts: MonthParts,
    pub days: Vec<CalendarDay>,
    pub weeks: Vec<CalendarWeek>,
    pub weekdays: Vec<CalendarWeekday>,
}

/// Build the cached grid for a month.
pub fn get_cached_page(year: i32, month: u32, locale: &Locale, today: NaiveDate) -> CachedPage {
    let month_parts = locale.get_month_parts(month, year);
    let prev_month_parts = locale.get_prev_month_parts(month, year);
    let next_month_parts = locale.get_next_month_parts(month, year);
    let days = get_days(
        &month_parts,
        &prev_month_parts,
        &next_month_parts,
        day_index(today),
        locale,
    );
    let weeks = get_weeks(&days, &month_parts, locale);
    let weekdays = get_weekdays(locale);
    let first = month_parts.first_day_of_month;

    CachedPage {
        id: format!("{:04}-{:02}", month_parts.year, month_parts.month),
        year: month_parts.year,
        month: month_parts.month,
        month_title: locale.format_day(first, &locale.masks().title),
        month_label: locale.format_day(first, "MMMM"),
        short_month_label: locale.format_day(first, &locale.masks().nav_months),
        year_label: locale.format_day(first, "YYYY"),
        short_year_label: locale.format_day(first, "YY"),
        month_parts,
        prev_month_parts,
        next_month_parts,
        days,
        weeks,
        weekdays,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Region {
    Prev,
    Current,
    Next,
}

/// Walk the 6×7 grid with running counters.
///
/// The grid opens in the previous month and switches to the current month
/// when the column reaches the month's first weekday; it switches to the
/// next month after the last day. Every cell's `day_index` comes from its
/// own `(year, month, day)`, so ordering stays correct across regions.
pub fn get_days(
    month: &MonthParts,
    prev: &MonthParts,
    next: &MonthParts,
    today_index: i64,
    locale: &Locale,
) -> Vec<CalendarDay> {
    let mut days = Vec::with_capacity((DAYS_IN_WEEK * WEEKS_IN_MONTH) as usize);
    let first_position = month.first_weekday_position;
    let spill = first_position - 1;

    let mut region = if spill == 0 { Region::Current } else { Region::Prev };
    let (mut day, mut day_from_end) = match region {
        Region::Prev => (prev.num_days - spill + 1, spill),
        _ => (1, month.num_days),
    };

    for week in 1..=WEEKS_IN_MONTH {
        for weekday_position in 1..=DAYS_IN_WEEK {
            if region == Region::Prev && week == 1 && weekday_position == first_position {
                region = Region::Current;
                day = 1;
                day_from_end = month.num_days;
            }

            let parts = match region {
                Region::Prev => prev,
                Region::Current => month,
                Region::Next => next,
            };
            let date = NaiveDate::from_ymd_opt(parts.year, parts.month, day).unwrap_or_default();
            let in_month = region == Region::Current;
            let row = (week - 1) as usize;

            days.push(CalendarDay {
                id: locale.day_id(date),
                date,
                day_index: day_index(date),
                day,
                day_from_end,
                month: parts.month,
                year: parts.year,
                week,
                week_from_end: month.num_weeks as i32 - week as i32 + 1,
                weekday: locale.weekday_at_position(weekday_position),
                weekday_position,
                weekday_position_from_end: DAYS_IN_WEEK - weekday_position + 1,
                weekday_ordinal: (day - 1) / DAYS_IN_WEEK + 1,
                weekday_ordinal_from_end: (day_from_end - 1) / DAYS_IN_WEEK + 1,
                weeknumber: month.weeknumbers[row],
                iso_weeknumber: month.iso_weeknumbers[row],
                in_month,
                in_prev_month: region == Region::Prev,
                in_next_month: region == Region::Next,
                is_today: day_index(date) == today_index,
                is_first_day: in_month && day == 1,
                is_last_day: in_month && day == month.num_days,
                is_disabled: false,
                is_focusable: false,
                is_focused: false,
                start_date: locale.start_of_day(date),
                noon_date: locale.noon(date),
                end_date: locale.end_of_day(date),
            });

            day += 1;
            day_from_end = day_from_end.saturating_sub(1);
            if region == Region::Current && day > month.num_days {
                region = Region::Next;
                day = 1;
                day_from_end = next.num_days;
            }
        }
    }

    days
}

/// Group a flat grid into rows of seven and title each row.
pub fn get_weeks(days: &[CalendarDay], month: &MonthParts, locale: &Locale) -> Vec<CalendarWeek> {
    days.chunks(DAYS_IN_WEEK as usize)
        .enumerate()
        .map(|(row, chunk)| {
            let start = row * DAYS_IN_WEEK as usize;
            let week = row as u32 + 1;
            CalendarWeek {
                id: format!("{:04}-{:02}-w{}", month.year, month.month, week),
                week,
                weeknumber: month.weeknumbers[row],
                iso_weeknumber: month.iso_weeknumbers[row],
                title: week_title(&chunk[0], &chunk[chunk.len() - 1], locale),
                days: start..start + chunk.len(),
            }
        })
        .collect()
}

/// `January 2026`, `Jan - Feb 2026` or `Dec 2025 - Jan 2026`.
fn week_title(first: &CalendarDay, last: &CalendarDay, locale: &Locale) -> String {
    if first.year != last.year {
        format!(
            "{} - {}",
            locale.format_day(first.date, "MMM YYYY"),
            locale.format_day(last.date, "MMM YYYY")
        )
    } else if first.month != last.month {
        format!(
            "{} - {}",
            locale.format_day(first.date, "MMM"),
            locale.format_day(last.date, "MMM YYYY")
        )
    } else {
        locale.format_day(first.date, "MMMM YYYY")
    }
}

pub fn get_weekdays(locale: &Locale) -> Vec<CalendarWeekday> {
    (1..=DAYS_IN_WEEK)
        .map(|position| {
            let weekday = locale.weekday_at_position(position);
            CalendarWeekday {
                weekday,
                weekday_position: position,
                label: format_weekday(locale, weekday, &locale.masks().weekdays),
                short_label: locale.weekday_label(weekday, 3),
                long_label: locale.weekday_name(weekday).to_string(),
            }
        })
        .collect()
}

fn format_weekday(locale: &Locale, weekday: Weekday, mask: &str) -> String {
    // 2023-01-01 was a Sunday.
    let sunday = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let date = shift_days(sunday, i64::from(weekday.num_days_from_sunday()));
    locale.format_day(date, mask)
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Month grids keyed by `(year, month)`. Owned by one calendar, which clears
/// it in `set_locale` and `set_today`.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<(i32, u32), Rc<CachedPage>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        year: i32,
        month: u32,
        locale: &Locale,
        today: NaiveDate,
    ) -> Rc<CachedPage> {
        if let Some(page) = self.pages.get(&(year, month)) {
            trace!(year, month, "page cache hit");
            return Rc::clone(page);
        }
        trace!(year, month, "page cache miss");
        let page = Rc::new(get_cached_page(year, month, locale, today));
        self.pages.insert((year, month), Rc::clone(&page));
        page
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Where week numbers render relative to a page's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeeknumberPlacement {
    Left,
    LeftOutside,
    Right,
    RightOutside,
}

impl WeeknumberPlacement {
    /// Outside placements only apply on the outer column of a multi-page
    /// grid; inner pages fall back to the inside placement.
    pub fn for_column(self, column: u32, column_from_end: u32) -> Self {
        match self {
            WeeknumberPlacement::Right | WeeknumberPlacement::RightOutside if column_from_end > 1 => {
                WeeknumberPlacement::Right
            }
            WeeknumberPlacement::Left | WeeknumberPlacement::LeftOutside if column > 1 => {
                WeeknumberPlacement::Left
            }
            other => other,
        }
    }
}

/// Slot of a page within the `rows × columns` display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLayout {
    /// 1-based position, row-major.
    pub position: u32,
    pub row: u32,
    pub row_from_end: u32,
    pub column: u32,
    pub column_from_end: u32,
}

impl PageLayout {
    pub fn for_position(position: u32, rows: u32, columns: u32) -> Self {
        let row = (position + columns - 1) / columns;
        let column = match position % columns {
            0 => columns,
            c => c,
        };
        PageLayout {
            position,
            row,
            row_from_end: rows - row + 1,
            column,
            column_from_end: columns - column + 1,
        }
    }
}

/// Everything [`get_page`] needs besides the cached grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub address: PageAddress,
    pub view: PageView,
    pub layout: PageLayout,
    pub title_position: TitlePosition,
    pub trim_weeks: bool,
    pub show_weeknumbers: Option<WeeknumberPlacement>,
    pub show_iso_weeknumbers: Option<WeeknumberPlacement>,
}

/// A materialized page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub address: PageAddress,
    pub view: PageView,
    pub title: String,
    pub month_title: String,
    pub month_label: String,
    pub short_month_label: String,
    pub year_label: String,
    pub short_year_label: String,
    pub layout: PageLayout,
    pub title_position: TitlePosition,
    pub trim_weeks: bool,
    pub show_weeknumbers: Option<WeeknumberPlacement>,
    pub show_iso_weeknumbers: Option<WeeknumberPlacement>,
    /// Placement for this page's slot, when any week numbers show.
    pub weeknumber_position: Option<WeeknumberPlacement>,
    pub month_parts: MonthParts,
    pub prev_month_parts: MonthParts,
    pub next_month_parts: MonthParts,
    pub days: Vec<CalendarDay>,
    pub weeks: Vec<CalendarWeek>,
    pub weekdays: Vec<CalendarWeekday>,
    view_days: Range<usize>,
    view_weeks: Range<usize>,
}

impl Page {
    /// Days the page's view displays.
    pub fn view_days(&self) -> &[CalendarDay] {
        &self.days[self.view_days.clone()]
    }

    pub fn view_days_mut(&mut self) -> &mut [CalendarDay] {
        &mut self.days[self.view_days.clone()]
    }

    pub fn view_weeks(&self) -> &[CalendarWeek] {
        &self.weeks[self.view_weeks.clone()]
    }

    pub fn week_days(&self, week: &CalendarWeek) -> &[CalendarDay] {
        &self.days[week.days.clone()]
    }

    /// The displayed cell for a day index; monthly pages only match days of
    /// their own month.
    pub fn view_day(&self, day_index: i64) -> Option<&CalendarDay> {
        self.view_days()
            .iter()
            .find(|day| day.day_index == day_index && (self.view != PageView::Monthly || day.in_month))
    }
}

/// Apply a view and layout to a cached grid.
///
/// Monthly pages show the whole grid, trimmed to the month's own rows when
/// `trim_weeks` is set. Weekly pages show one row (default row 1). Daily
/// pages show one cell: the explicit day, else the first in-month day of
/// the addressed row, else the first of the month.
pub fn get_page(config: &PageConfig, cached: &CachedPage, locale: &Locale) -> Page {
    let address = config.address;
    let month_parts = &cached.month_parts;
    let num_weeks = month_parts.num_weeks as usize;
    let first_cell = (month_parts.first_weekday_position - 1) as usize;
    let last_cell = first_cell + month_parts.num_days as usize - 1;

    let (id, title, view_days, view_weeks) = match config.view {
        PageView::Monthly => {
            let rows = if config.trim_weeks {
                num_weeks
            } else {
                WEEKS_IN_MONTH as usize
            };
            (
                cached.id.clone(),
                cached.month_title.clone(),
                0..rows * DAYS_IN_WEEK as usize,
                0..rows,
            )
        }
        PageView::Weekly => {
            let row = address.week.unwrap_or(1).clamp(1, month_parts.num_weeks) as usize - 1;
            let week = &cached.weeks[row];
            (
                week.id.clone(),
                week.title.clone(),
                week.days.clone(),
                row..row + 1,
            )
        }
        PageView::Daily => {
            let cell = match (address.day, address.week) {
                (Some(day), _) => first_cell + day.clamp(1, month_parts.num_days) as usize - 1,
                (None, Some(week)) => {
                    let row = week.clamp(1, month_parts.num_weeks) as usize - 1;
                    (row * DAYS_IN_WEEK as usize).max(first_cell)
                }
                (None, None) => first_cell,
            }
            .min(last_cell);
            let day = &cached.days[cell];
            let row = cell / DAYS_IN_WEEK as usize;
            (
                day.id.clone(),
                locale.format_day(day.date, &locale.masks().day_title),
                cell..cell + 1,
                row..row + 1,
            )
        }
    };

    let weeknumber_position = config
        .show_weeknumbers
        .or(config.show_iso_weeknumbers)
        .map(|placement| placement.for_column(config.layout.column, config.layout.column_from_end));

    Page {
        id,
        address,
        view: config.view,
        title,
        month_title: cached.month_title.clone(),
        month_label: cached.month_label.clone(),
        short_month_label: cached.short_month_label.clone(),
        year_label: cached.year_label.clone(),
        short_year_label: cached.short_year_label.clone(),
        layout: config.layout,
        title_position: config.title_position,
        trim_weeks: config.trim_weeks,
        show_weeknumbers: config.show_weeknumbers,
        show_iso_weeknumbers: config.show_iso_weeknumbers,
        weeknumber_position,
        month_parts: cached.month_parts.clone(),
        prev_month_parts: cached.prev_month_parts.clone(),
        next_month_parts: cached.next_month_parts.clone(),
        days: cached.days.clone(),
        weeks: cached.weeks.clone(),
        weekdays: cached.weekdays.clone(),
        view_days,
        view_weeks,
    }
}
