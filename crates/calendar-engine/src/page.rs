//! Page addresses and the arithmetic over them.
//!
//! A [`PageAddress`] names a page (`year`, `month`, and for weekly/daily
//! views a `week` row or a `day`) without materializing its day grid, so
//! navigation can add, compare and clamp pages cheaply.
//!
//! Ordering predicates compare `(year, month, week, day)` lexicographically,
//! skipping any field that only one side defines. Invalid addresses never
//! compare: every predicate returns `false` for them.

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::locale::{
    day_index, days_in_month, first_of_month, shift_days, Locale, DAYS_IN_WEEK, MAX_YEAR,
    MIN_YEAR, WEEKS_IN_MONTH,
};

/// Which slice of a month grid a page displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageView {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl PageView {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageView::Daily => "daily",
            PageView::Weekly => "weekly",
            PageView::Monthly => "monthly",
        }
    }
}

/// Identity of a displayed page.
///
/// Derived `==` is structural; [`page_is_equal_to_page`] implements the
/// looser "every field both sides define matches" equality used by
/// navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageAddress {
    #[serde(deserialize_with = "bounded_year")]
    pub year: i32,
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl PageAddress {
    pub fn month(year: i32, month: u32) -> Self {
        PageAddress {
            year,
            month,
            week: None,
            day: None,
        }
    }

    pub fn week(year: i32, month: u32, week: u32) -> Self {
        PageAddress {
            week: Some(week),
            ..PageAddress::month(year, month)
        }
    }

    pub fn day(year: i32, month: u32, day: u32) -> Self {
        PageAddress {
            day: Some(day),
            ..PageAddress::month(year, month)
        }
    }

    pub fn is_valid(&self) -> bool {
        page_is_valid(self)
    }

    pub fn is_before(&self, other: &PageAddress) -> bool {
        page_is_before_page(self, other)
    }

    pub fn is_after(&self, other: &PageAddress) -> bool {
        page_is_after_page(self, other)
    }

    /// Date the address points at: the explicit day, else the first in-month
    /// day of the week row, else the first of the month.
    pub fn anchor_date(&self, locale: &Locale) -> NaiveDate {
        let first = first_of_month(self.year, self.month as i32);
        if let Some(day) = self.day {
            let day = day.clamp(1, days_in_month(first.year(), first.month()));
            return shift_days(first, i64::from(day) - 1);
        }
        match self.week {
            Some(week) => week_anchor(first, week, locale),
            None => first,
        }
    }
}

/// First in-month day of grid row `week` of the month starting at `first`.
fn week_anchor(first: NaiveDate, week: u32, locale: &Locale) -> NaiveDate {
    let first_position = locale.weekday_position(first.weekday());
    let num_days = days_in_month(first.year(), first.month());
    let num_weeks = (num_days + first_position - 2) / DAYS_IN_WEEK + 1;
    let week = week.clamp(1, num_weeks);
    if week == 1 {
        return first;
    }
    let row_start = i64::from((week - 1) * DAYS_IN_WEEK) - i64::from(first_position - 1);
    shift_days(first, row_start)
}

/// Address of the page showing `date` in `view`.
pub fn page_address_for_date(date: NaiveDate, view: PageView, locale: &Locale) -> PageAddress {
    match view {
        PageView::Monthly => PageAddress::month(date.year(), date.month()),
        PageView::Weekly => {
            let first = first_of_month(date.year(), date.month() as i32);
            let first_position = locale.weekday_position(first.weekday());
            let week = (date.day() + first_position - 2) / DAYS_IN_WEEK + 1;
            PageAddress::week(date.year(), date.month(), week)
        }
        PageView::Daily => PageAddress::day(date.year(), date.month(), date.day()),
    }
}

/// Shift an address by `count` pages of `view`.
///
/// Daily pages move by calendar days, weekly pages by whole weeks measured
/// from the first in-month day of the address's row, monthly pages by
/// months. Results are re-addressed in the month the shifted date falls in.
pub fn add_pages(address: &PageAddress, count: i32, view: PageView, locale: &Locale) -> PageAddress {
    match view {
        PageView::Daily => {
            let date = shift_days(address.anchor_date(locale), i64::from(count));
            page_address_for_date(date, view, locale)
        }
        PageView::Weekly => {
            let date = shift_days(
                address.anchor_date(locale),
                i64::from(count) * i64::from(DAYS_IN_WEEK),
            );
            page_address_for_date(date, view, locale)
        }
        PageView::Monthly => {
            let first = first_of_month(address.year, address.month as i32 + count);
            PageAddress::month(first.year(), first.month())
        }
    }
}

fn bounded_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let year = i32::deserialize(deserializer)?;
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(de::Error::custom(format!(
            "year {year} outside {MIN_YEAR}..={MAX_YEAR}"
        )))
    }
}

/// An address is valid when its year is within `MIN_YEAR..=MAX_YEAR`, its
/// month is 1..=12 and any week/day it carries lies within the grid.
pub fn page_is_valid(page: &PageAddress) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&page.year)
        && (1..=12).contains(&page.month)
        && page.week.map_or(true, |w| (1..=WEEKS_IN_MONTH).contains(&w))
        && page.day.map_or(true, |d| (1..=31).contains(&d))
}

pub fn page_is_before_page(page: &PageAddress, compare: &PageAddress) -> bool {
    compare_pages(page, compare) == Some(std::cmp::Ordering::Less)
}

pub fn page_is_after_page(page: &PageAddress, compare: &PageAddress) -> bool {
    compare_pages(page, compare) == Some(std::cmp::Ordering::Greater)
}

pub fn page_is_equal_to_page(page: &PageAddress, compare: &PageAddress) -> bool {
    compare_pages(page, compare) == Some(std::cmp::Ordering::Equal)
}

/// Whether `page` lies within `[from, to]`; a missing bound is unbounded.
pub fn page_is_between_pages(
    page: &PageAddress,
    from: Option<&PageAddress>,
    to: Option<&PageAddress>,
) -> bool {
    if !page_is_valid(page) {
        return false;
    }
    let after_from = from.map_or(true, |from| !page_is_before_page(page, from));
    let before_to = to.map_or(true, |to| !page_is_after_page(page, to));
    after_from && before_to
}

/// Lexicographic comparison over the fields both addresses define.
/// `None` when either address is invalid.
fn compare_pages(a: &PageAddress, b: &PageAddress) -> Option<std::cmp::Ordering> {
    if !page_is_valid(a) || !page_is_valid(b) {
        return None;
    }
    let optional = |x: Option<u32>, y: Option<u32>| match (x, y) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => std::cmp::Ordering::Equal,
    };
    Some(
        a.year
            .cmp(&b.year)
            .then(a.month.cmp(&b.month))
            .then_with(|| optional(a.week, b.week))
            .then_with(|| optional(a.day, b.day)),
    )
}

/// Every page from `from` up to and including `to`.
///
/// Returns `[from]` when the two are equal and an empty list when `to`
/// precedes `from` or either address is invalid.
pub fn page_range_to_array(
    from: &PageAddress,
    to: &PageAddress,
    view: PageView,
    locale: &Locale,
) -> Vec<PageAddress> {
    let mut pages = Vec::new();
    if !page_is_valid(from) || !page_is_valid(to) {
        return pages;
    }
    let mut current = *from;
    while !page_is_after_page(&current, to) {
        pages.push(current);
        let next = add_pages(&current, 1, view, locale);
        if page_day_index(&next, locale) <= page_day_index(&current, locale) {
            break;
        }
        current = next;
    }
    pages
}

/// Day index of the date an address points at.
pub fn page_day_index(page: &PageAddress, locale: &Locale) -> i64 {
    day_index(page.anchor_date(locale))
}
