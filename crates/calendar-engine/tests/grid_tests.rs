//! Tests for day-grid generation, the page cache and view reduction.

use calendar_engine::grid::{
    get_cached_page, get_page, PageCache, PageConfig, PageLayout, TitlePosition,
    WeeknumberPlacement,
};
use calendar_engine::locale::{day_index, Locale, LocaleConfig};
use calendar_engine::page::{PageAddress, PageView};
use chrono::{NaiveDate, Weekday};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 2, 14)
}

fn config(address: PageAddress, view: PageView) -> PageConfig {
    PageConfig {
        address,
        view,
        layout: PageLayout::for_position(1, 1, 1),
        title_position: TitlePosition::Center,
        trim_weeks: false,
        show_weeknumbers: None,
        show_iso_weeknumbers: None,
    }
}

// ── Day grid ────────────────────────────────────────────────────────────────

#[test]
fn grid_has_42_cells_and_regions() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    assert_eq!(cached.days.len(), 42);
    assert_eq!(cached.weeks.len(), 6);
    assert_eq!(cached.weekdays.len(), 7);

    // February 2024 starts on a Thursday: four spillover days from January.
    let prev: Vec<u32> = cached.days.iter().take_while(|d| d.in_prev_month).map(|d| d.day).collect();
    assert_eq!(prev, vec![28, 29, 30, 31]);
    assert_eq!(cached.days.iter().filter(|d| d.in_month).count(), 29);
    assert_eq!(cached.days.iter().filter(|d| d.in_next_month).count(), 42 - 4 - 29);

    for day in &cached.days {
        let flags = [day.in_month, day.in_prev_month, day.in_next_month];
        assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{}", day.id);
    }
}

#[test]
fn grid_day_indices_are_consecutive() {
    let locale = Locale::default();
    let cached = get_cached_page(2023, 12, &locale, today());
    for pair in cached.days.windows(2) {
        assert_eq!(pair[1].day_index, pair[0].day_index + 1);
    }
    assert_eq!(cached.days[0].day_index, day_index(cached.days[0].date));
}

#[test]
fn grid_counters_and_flags() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let first = cached.days.iter().find(|d| d.in_month && d.day == 1).unwrap();
    assert!(first.is_first_day);
    assert_eq!(first.weekday, Weekday::Thu);
    assert_eq!(first.weekday_position, 5);
    assert_eq!(first.weekday_position_from_end, 3);
    assert_eq!(first.week, 1);
    assert_eq!(first.day_from_end, 29);

    let last = cached.days.iter().find(|d| d.in_month && d.day == 29).unwrap();
    assert!(last.is_last_day);
    assert_eq!(last.day_from_end, 1);
    assert_eq!(last.week, 5);
    assert_eq!(last.week_from_end, 1);
    assert_eq!(last.weekday_ordinal, 5);

    let valentines = cached.days.iter().find(|d| d.id == "2024-02-14").unwrap();
    assert!(valentines.is_today);
    assert_eq!(cached.days.iter().filter(|d| d.is_today).count(), 1);
}

#[test]
fn grid_day_bounds() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let day = &cached.days[10];
    assert_eq!(day.start_date.date_naive(), day.date);
    assert_eq!((day.end_date - day.start_date).num_milliseconds(), 86_399_999);
    assert_eq!((day.noon_date - day.start_date).num_hours(), 12);
}

#[test]
fn grid_follows_first_day_of_week() {
    let locale = Locale::new(LocaleConfig {
        first_day_of_week: Weekday::Mon,
        ..LocaleConfig::default()
    })
    .unwrap();
    let cached = get_cached_page(2024, 2, &locale, today());
    assert_eq!(cached.weekdays[0].weekday, Weekday::Mon);
    assert_eq!(cached.weekdays[0].label, "M");
    assert_eq!(cached.weekdays[0].short_label, "Mon");
    assert_eq!(cached.weekdays[6].long_label, "Sunday");
    assert_eq!(cached.days[0].date, date(2024, 1, 29));
    assert_eq!(cached.days[0].weekday, Weekday::Mon);
}

#[test]
fn grid_full_month_without_spillover() {
    let locale = Locale::default();
    // February 2015 opens on a Sunday: no previous-month cells.
    let cached = get_cached_page(2015, 2, &locale, today());
    assert!(cached.days[0].in_month);
    assert_eq!(cached.month_parts.num_weeks, 4);
    assert_eq!(cached.days.iter().filter(|d| d.in_next_month).count(), 14);
}

#[test]
fn grid_week_titles_and_numbers() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 1, &locale, today());
    assert_eq!(cached.weeks[0].title, "Dec 2023 - Jan 2024");
    assert_eq!(cached.weeks[1].title, "January 2024");
    assert_eq!(cached.weeks[4].title, "Jan - Feb 2024");
    assert_eq!(cached.weeks[0].id, "2024-01-w1");
    assert_eq!(cached.weeks[0].weeknumber, 1);
    assert_eq!(cached.weeks[1].weeknumber, 2);
    // The Monday of row 1 is Jan 1, ISO week 1.
    assert_eq!(cached.weeks[0].iso_weeknumber, 1);
    assert_eq!(cached.days[7].weeknumber, 2);
}

#[test]
fn grid_page_labels() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 9, &locale, today());
    assert_eq!(cached.id, "2024-09");
    assert_eq!(cached.month_title, "September 2024");
    assert_eq!(cached.month_label, "September");
    assert_eq!(cached.short_month_label, "Sep");
    assert_eq!(cached.year_label, "2024");
    assert_eq!(cached.short_year_label, "24");
}

// ── Cache ───────────────────────────────────────────────────────────────────

#[test]
fn cache_reuses_month_grids() {
    let locale = Locale::default();
    let mut cache = PageCache::new();
    assert!(cache.is_empty());
    let a = cache.get_or_build(2024, 2, &locale, today());
    let b = cache.get_or_build(2024, 2, &locale, today());
    assert!(std::rc::Rc::ptr_eq(&a, &b));
    cache.get_or_build(2024, 3, &locale, today());
    assert_eq!(cache.len(), 2);
    cache.clear();
    assert!(cache.is_empty());
}

// ── View reduction ──────────────────────────────────────────────────────────

#[test]
fn monthly_page_full_and_trimmed() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let page = get_page(&config(PageAddress::month(2024, 2), PageView::Monthly), &cached, &locale);
    assert_eq!(page.view_days().len(), 42);
    assert_eq!(page.view_weeks().len(), 6);
    assert_eq!(page.title, "February 2024");
    assert_eq!(page.id, "2024-02");

    let trimmed = get_page(
        &PageConfig {
            trim_weeks: true,
            ..config(PageAddress::month(2024, 2), PageView::Monthly)
        },
        &cached,
        &locale,
    );
    assert_eq!(trimmed.view_days().len(), 35);
    assert_eq!(trimmed.view_weeks().len(), 5);
}

#[test]
fn weekly_page_selects_row() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let page = get_page(&config(PageAddress::week(2024, 2, 3), PageView::Weekly), &cached, &locale);
    let days: Vec<u32> = page.view_days().iter().map(|d| d.day).collect();
    assert_eq!(days, vec![11, 12, 13, 14, 15, 16, 17]);
    assert_eq!(page.id, "2024-02-w3");
    assert_eq!(page.title, "February 2024");
    assert_eq!(page.view_weeks().len(), 1);

    let default_row = get_page(&config(PageAddress::month(2024, 2), PageView::Weekly), &cached, &locale);
    assert_eq!(default_row.view_days()[0].date, date(2024, 1, 28));
}

#[test]
fn daily_page_selects_cell() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let page = get_page(&config(PageAddress::day(2024, 2, 14), PageView::Daily), &cached, &locale);
    assert_eq!(page.view_days().len(), 1);
    assert_eq!(page.view_days()[0].date, date(2024, 2, 14));
    assert_eq!(page.title, "Wednesday, February 14, 2024");
    assert_eq!(page.view_weeks()[0].week, 3);

    // Without a day: first in-month day of the addressed row.
    let by_week = get_page(&config(PageAddress::week(2024, 2, 1), PageView::Daily), &cached, &locale);
    assert_eq!(by_week.view_days()[0].date, date(2024, 2, 1));
    let by_month = get_page(&config(PageAddress::month(2024, 2), PageView::Daily), &cached, &locale);
    assert_eq!(by_month.view_days()[0].date, date(2024, 2, 1));
}

#[test]
fn view_day_respects_month_ownership() {
    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let monthly = get_page(&config(PageAddress::month(2024, 2), PageView::Monthly), &cached, &locale);
    assert!(monthly.view_day(day_index(date(2024, 1, 31))).is_none());
    assert!(monthly.view_day(day_index(date(2024, 2, 1))).is_some());

    let weekly = get_page(&config(PageAddress::week(2024, 2, 1), PageView::Weekly), &cached, &locale);
    assert!(weekly.view_day(day_index(date(2024, 1, 31))).is_some());
}

// ── Layout ──────────────────────────────────────────────────────────────────

#[test]
fn layout_positions() {
    let layout = PageLayout::for_position(5, 2, 3);
    assert_eq!((layout.row, layout.column), (2, 2));
    assert_eq!((layout.row_from_end, layout.column_from_end), (1, 2));
    let last = PageLayout::for_position(6, 2, 3);
    assert_eq!((last.row, last.column, last.column_from_end), (2, 3, 1));
}

#[test]
fn weeknumber_placement_collapses_inside() {
    assert_eq!(WeeknumberPlacement::LeftOutside.for_column(1, 3), WeeknumberPlacement::LeftOutside);
    assert_eq!(WeeknumberPlacement::LeftOutside.for_column(2, 2), WeeknumberPlacement::Left);
    assert_eq!(WeeknumberPlacement::RightOutside.for_column(3, 1), WeeknumberPlacement::RightOutside);
    assert_eq!(WeeknumberPlacement::RightOutside.for_column(1, 3), WeeknumberPlacement::Right);

    let locale = Locale::default();
    let cached = get_cached_page(2024, 2, &locale, today());
    let page = get_page(
        &PageConfig {
            layout: PageLayout::for_position(2, 1, 2),
            show_weeknumbers: Some(WeeknumberPlacement::LeftOutside),
            ..config(PageAddress::month(2024, 2), PageView::Monthly)
        },
        &cached,
        &locale,
    );
    assert_eq!(page.weeknumber_position, Some(WeeknumberPlacement::Left));
}
