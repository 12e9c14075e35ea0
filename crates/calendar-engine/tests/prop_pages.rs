//! Property-based tests for page arithmetic, grid shape and range
//! intersection using proptest.

use calendar_engine::grid::get_cached_page;
use calendar_engine::locale::{days_in_month, Locale, LocaleConfig};
use calendar_engine::page::{
    add_pages, page_address_for_date, page_is_after_page, page_is_before_page,
    page_is_equal_to_page, page_range_to_array, PageAddress, PageView,
};
use calendar_engine::range::DateRange;
use chrono::{NaiveDate, Weekday};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_month() -> impl Strategy<Value = (i32, u32)> {
    (1900i32..=2200, 1u32..=12)
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..=2200, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A date on a grid row that is neither the month's first nor its last.
fn arb_interior_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..=2200, 1u32..=12, 8u32..=21)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_locale() -> impl Strategy<Value = Locale> {
    prop_oneof![Just(Weekday::Sun), Just(Weekday::Mon), Just(Weekday::Sat)].prop_map(|first| {
        Locale::new(LocaleConfig {
            first_day_of_week: first,
            ..LocaleConfig::default()
        })
        .unwrap()
    })
}

fn arb_view() -> impl Strategy<Value = PageView> {
    prop_oneof![
        Just(PageView::Daily),
        Just(PageView::Weekly),
        Just(PageView::Monthly),
    ]
}

// ---------------------------------------------------------------------------
// Page arithmetic
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn adding_zero_pages_is_identity(date in arb_date(), view in arb_view(), locale in arb_locale()) {
        let page = page_address_for_date(date, view, &locale);
        prop_assert_eq!(add_pages(&page, 0, view, &locale), page);
    }

    #[test]
    fn monthly_round_trip((y, m) in arb_month(), n in -600i32..=600, locale in arb_locale()) {
        let page = PageAddress::month(y, m);
        let moved = add_pages(&page, n, PageView::Monthly, &locale);
        prop_assert_eq!(add_pages(&moved, -n, PageView::Monthly, &locale), page);
    }

    #[test]
    fn daily_round_trip(date in arb_date(), n in -1000i32..=1000, locale in arb_locale()) {
        let page = page_address_for_date(date, PageView::Daily, &locale);
        let moved = add_pages(&page, n, PageView::Daily, &locale);
        prop_assert_eq!(add_pages(&moved, -n, PageView::Daily, &locale), page);
    }

    #[test]
    fn weekly_round_trip_on_interior_rows(date in arb_interior_date(), n in -200i32..=200, locale in arb_locale()) {
        let page = page_address_for_date(date, PageView::Weekly, &locale);
        let moved = add_pages(&page, n, PageView::Weekly, &locale);
        prop_assert_eq!(add_pages(&moved, -n, PageView::Weekly, &locale), page);
    }

    #[test]
    fn ordering_is_consistent((y1, m1) in arb_month(), (y2, m2) in arb_month()) {
        let a = PageAddress::month(y1, m1);
        let b = PageAddress::month(y2, m2);
        prop_assert_eq!(page_is_before_page(&a, &b), page_is_after_page(&b, &a));
        let relations = [
            page_is_before_page(&a, &b),
            page_is_after_page(&a, &b),
            page_is_equal_to_page(&a, &b),
        ];
        prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);
        prop_assert!(page_is_equal_to_page(&a, &a));
    }

    #[test]
    fn monthly_range_length((y, m) in arb_month(), span in 0i32..=48) {
        let locale = Locale::default();
        let from = PageAddress::month(y, m);
        let to = add_pages(&from, span, PageView::Monthly, &locale);
        let pages = page_range_to_array(&from, &to, PageView::Monthly, &locale);
        prop_assert_eq!(pages.len(), span as usize + 1);
        prop_assert_eq!(pages.first(), Some(&from));
        prop_assert_eq!(pages.last(), Some(&to));
    }
}

// ---------------------------------------------------------------------------
// Grid shape
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn grid_always_has_42_cells((y, m) in arb_month(), locale in arb_locale()) {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cached = get_cached_page(y, m, &locale, today);
        prop_assert_eq!(cached.days.len(), 42);
        prop_assert_eq!(
            cached.days.iter().filter(|d| d.in_month).count() as u32,
            days_in_month(y, m)
        );
        prop_assert_eq!(cached.days[0].weekday, locale.weekday_at_position(1));
        for pair in cached.days.windows(2) {
            prop_assert_eq!(pair[1].day_index, pair[0].day_index + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Range intersection
// ---------------------------------------------------------------------------

fn day_range(a: NaiveDate, b: NaiveDate) -> DateRange {
    DateRange::from_source(&(a.min(b), a.max(b)).into(), &Locale::default()).unwrap()
}

proptest! {
    #[test]
    fn intersection_is_symmetric(a in arb_date(), b in arb_date(), c in arb_date(), d in arb_date()) {
        let first = day_range(a, b);
        let second = day_range(c, d);
        prop_assert_eq!(first.intersects_range(&second), second.intersects_range(&first));
    }

    #[test]
    fn ranges_intersect_themselves(a in arb_date(), b in arb_date()) {
        let range = day_range(a, b);
        prop_assert!(range.intersects_range(&range));
        prop_assert!(DateRange::new(None, None).intersects_range(&range));
    }
}
