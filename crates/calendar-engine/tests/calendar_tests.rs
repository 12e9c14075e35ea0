//! Integration tests for the navigation state machine and the picker built
//! on top of it.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use calendar_engine::attribute::{Attribute, AttributeConfig, VisualProfile, DISABLED_KEY};
use calendar_engine::calendar::{Calendar, MoveOptions, MoveTarget, RefreshOptions};
use calendar_engine::config::CalendarConfig;
use calendar_engine::error::{CalendarError, Result};
use calendar_engine::events::CalendarEvent;
use calendar_engine::keyboard::{Key, KeyInput};
use calendar_engine::locale::{Locale, LocaleConfig};
use calendar_engine::page::{PageAddress, PageView};
use calendar_engine::picker::{DatePicker, PickerMode, PickerValue, DRAG_KEY, SELECT_KEY};
use calendar_engine::touch::TouchPoint;
use calendar_engine::transition::{Transition, TransitionHandle, TransitionStatus, TransitionStyle};
use chrono::{NaiveDate, Weekday};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday, January 15 2024.
fn today() -> NaiveDate {
    date(2024, 1, 15)
}

fn build(config: CalendarConfig) -> Calendar {
    Calendar::builder(config)
        .locale(Locale::default())
        .today(today())
        .id("cal")
        .build()
        .unwrap()
}

fn build_json(json: &str) -> Calendar {
    build(CalendarConfig::from_json(json).unwrap())
}

fn firsts(calendar: &Calendar) -> Vec<PageAddress> {
    calendar.page_addresses()
}

fn record_events(calendar: &mut Calendar) -> Rc<RefCell<Vec<CalendarEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    calendar.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn cell_keys(calendar: &Calendar, d: NaiveDate) -> Vec<String> {
    calendar
        .day_cells(d)
        .iter()
        .map(|cell| cell.data.key.clone())
        .collect()
}

fn noop_waker() -> Waker {
    fn clone(_: *const ()) -> RawWaker {
        RawWaker::new(std::ptr::null(), &VTABLE)
    }
    fn noop(_: *const ()) {}
    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
    unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) }
}

fn poll(handle: &mut TransitionHandle) -> Poll<Result<()>> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    Pin::new(handle).poll(&mut cx)
}

// ── Construction ────────────────────────────────────────────────────────────

#[test]
fn build_requires_locale() {
    let err = Calendar::builder(CalendarConfig::default()).build().unwrap_err();
    assert!(matches!(err, CalendarError::MissingDependency("locale")));
}

#[test]
fn initial_page_defaults_to_today() {
    let cal = build(CalendarConfig::default());
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);
    assert_eq!(cal.transition(), Transition::None);
    assert!(!cal.in_transition());
    assert!(cal.pending_transition().is_none());
    assert_eq!(cal.focusable_date(), Some(today()));
    assert!(cal.visible_day(today()).unwrap().is_focusable);
    assert_eq!(cal.days().filter(|d| d.is_focusable).count(), 1);
}

#[test]
fn initial_page_position_places_page() {
    let cal = build_json(r#"{"columns": 3, "initial_page": {"year": 2024, "month": 5}, "initial_page_position": 3}"#);
    assert_eq!(
        firsts(&cal),
        vec![PageAddress::month(2024, 3), PageAddress::month(2024, 4), PageAddress::month(2024, 5)]
    );

    let from_end = build_json(r#"{"columns": 3, "initial_page": {"year": 2024, "month": 5}, "initial_page_position": -1}"#);
    assert_eq!(from_end.last_page().unwrap().address, PageAddress::month(2024, 5));
}

#[test]
fn pinned_attribute_chooses_initial_page() {
    let cal = build_json(r#"{"attributes": [{"key": "trip", "dates": ["2024-05-10"], "pin_page": true}]}"#);
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 5)]);
}

#[test]
fn invalid_configuration_is_an_error() {
    assert!(matches!(
        CalendarConfig::from_json(r#"{"rows": "two"}"#),
        Err(CalendarError::Config(_))
    ));
    let config = CalendarConfig::from_json(r#"{"min_date": "soon"}"#).unwrap();
    let err = Calendar::builder(config).locale(Locale::default()).build().unwrap_err();
    assert!(matches!(err, CalendarError::InvalidDate(_)));
}

// ── Navigation ──────────────────────────────────────────────────────────────

#[test]
fn min_page_blocks_prev() {
    let mut cal = build_json(
        r#"{"initial_page": {"year": 2023, "month": 1}, "min_page": {"year": 2023, "month": 1}}"#,
    );
    assert!(!cal.can_move_prev());
    assert!(!cal.move_prev());
    assert_eq!(firsts(&cal), vec![PageAddress::month(2023, 1)]);
    assert!(cal.can_move_next());
}

#[test]
fn forward_move_slides_left() {
    let mut cal = build_json(r#"{"initial_page": {"year": 2023, "month": 12}}"#);
    assert!(cal.move_next());
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);
    assert_eq!(cal.transition(), Transition::SlideLeft);
    assert!(cal.in_transition());

    assert!(cal.move_prev());
    assert_eq!(cal.transition(), Transition::SlideRight);
}

#[test]
fn vertical_and_fade_styles() {
    let mut cal = build_json(r#"{"transition": "slide-v"}"#);
    cal.move_next();
    assert_eq!(cal.transition(), Transition::SlideUp);
    cal.move_prev();
    assert_eq!(cal.transition(), Transition::SlideDown);

    let mut fade = build_json(r#"{"transition": "fade"}"#);
    fade.move_next();
    assert_eq!(fade.transition(), Transition::Fade);
}

#[test]
fn can_move_does_not_change_state() {
    let cal = build_json(r#"{"columns": 2, "max_page": {"year": 2024, "month": 3}}"#);
    let before = firsts(&cal);
    let target = MoveTarget::Page(PageAddress::month(2024, 3));
    let first = cal.can_move(&target, &MoveOptions::default());
    let second = cal.can_move(&target, &MoveOptions::default());
    assert!(first && second);
    assert_eq!(firsts(&cal), before);
}

#[test]
fn moves_clamp_to_bounds() {
    let mut cal = build_json(
        r#"{"columns": 2, "initial_page": {"year": 2024, "month": 1}, "max_page": {"year": 2024, "month": 3}}"#,
    );
    assert!(cal.move_to(MoveTarget::Page(PageAddress::month(2024, 3)), MoveOptions::default()));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 2), PageAddress::month(2024, 3)]);
    assert!(!cal.can_move_next());

    assert!(!cal.move_to(MoveTarget::Page(PageAddress::month(2024, 5)), MoveOptions::default()));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 2), PageAddress::month(2024, 3)]);

    let forced = MoveOptions {
        force: true,
        ..MoveOptions::default()
    };
    assert!(cal.move_to(MoveTarget::Page(PageAddress::month(2024, 5)), forced));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 5), PageAddress::month(2024, 6)]);
}

#[test]
fn move_to_date_and_step() {
    let mut cal = build_json(r#"{"columns": 2, "step": 1}"#);
    assert!(cal.move_to(MoveTarget::Date(date(2025, 7, 4)), MoveOptions::default()));
    assert_eq!(cal.first_page().unwrap().address, PageAddress::month(2025, 7));
    assert!(cal.move_next());
    assert_eq!(cal.first_page().unwrap().address, PageAddress::month(2025, 8));
    assert!(cal.move_by(-12, MoveOptions::default()));
    assert_eq!(cal.first_page().unwrap().address, PageAddress::month(2024, 8));
}

#[test]
fn min_date_disables_earlier_days() {
    let cal = build_json(r#"{"min_date": "2024-01-10"}"#);
    assert!(cal.disabled_attribute().is_some());
    assert_eq!(cal.min_page(), Some(PageAddress::month(2024, 1)));
    assert!(!cal.can_move_prev());
    assert!(cal.visible_day(date(2024, 1, 9)).unwrap().is_disabled);
    assert!(!cal.visible_day(date(2024, 1, 10)).unwrap().is_disabled);
    assert!(cal.is_date_disabled(date(2023, 6, 1)));
    assert!(!cal.is_date_disabled(date(2024, 6, 1)));
    assert_eq!(cell_keys(&cal, date(2024, 1, 9)), vec![DISABLED_KEY.to_string()]);
}

#[test]
fn available_dates_disable_everything_else() {
    let cal = build_json(r#"{"available_dates": [["2024-01-10", "2024-01-20"]]}"#);
    assert!(cal.visible_day(date(2024, 1, 9)).unwrap().is_disabled);
    assert!(!cal.visible_day(date(2024, 1, 15)).unwrap().is_disabled);
    assert!(cal.visible_day(date(2024, 1, 21)).unwrap().is_disabled);
    assert!(cal.is_date_disabled(date(2024, 3, 1)));
}

#[test]
fn repeat_occurrences_reach_into_window() {
    // Three days from every Friday; the daily page shows Sunday Jan 7.
    let cal = build_json(
        r#"{
            "view": "daily",
            "initial_page": {"year": 2024, "month": 1, "day": 7},
            "disabled_dates": [{"start": "2024-01-05", "span": 3, "repeat": {"every": "weeks"}}]
        }"#,
    );
    assert_eq!(cal.days().count(), 1);
    assert!(cal.visible_day(date(2024, 1, 7)).unwrap().is_disabled);
}

// ── Views ───────────────────────────────────────────────────────────────────

#[test]
fn set_view_keeps_focused_day() {
    let mut cal = build(CalendarConfig::default());
    assert!(cal.try_focus_date(date(2024, 1, 15)));
    cal.set_view(PageView::Weekly);
    assert_eq!(cal.view(), PageView::Weekly);
    assert_eq!(firsts(&cal), vec![PageAddress::week(2024, 1, 3)]);
    assert_eq!(cal.transition(), Transition::Fade);
    let days: Vec<u32> = cal.days().map(|d| d.day).collect();
    assert_eq!(days, vec![14, 15, 16, 17, 18, 19, 20]);
}

#[test]
fn view_change_during_move_refreshes_once() {
    let mut cal = build(CalendarConfig::default());
    let events = record_events(&mut cal);
    let options = MoveOptions {
        view: Some(PageView::Daily),
        ..MoveOptions::default()
    };
    assert!(cal.move_to(MoveTarget::Date(date(2024, 1, 20)), options));
    assert_eq!(cal.view(), PageView::Daily);
    assert_eq!(firsts(&cal), vec![PageAddress::day(2024, 1, 20)]);

    let events = events.borrow();
    let updates = events
        .iter()
        .filter(|e| matches!(e, CalendarEvent::UpdatePages(_)))
        .count();
    assert_eq!(updates, 1);
    assert_eq!(
        events.last(),
        Some(&CalendarEvent::DidMove(vec![PageAddress::day(2024, 1, 20)]))
    );
}

#[test]
fn set_locale_rebuilds_grid() {
    let mut cal = build(CalendarConfig::default());
    let monday_first = Locale::new(LocaleConfig {
        first_day_of_week: Weekday::Mon,
        ..LocaleConfig::default()
    })
    .unwrap();
    cal.set_locale(monday_first).unwrap();
    assert_eq!(cal.transition(), Transition::None);
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);
    let first = &cal.first_page().unwrap().view_days()[0];
    assert_eq!(first.weekday, Weekday::Mon);
    assert_eq!(first.date, date(2024, 1, 1));
}

#[test]
fn set_layout_changes_page_count() {
    let mut cal = build(CalendarConfig::default());
    cal.set_layout(2, 3);
    assert_eq!(cal.count(), 6);
    assert_eq!(cal.pages().len(), 6);
    let fifth = &cal.pages()[4].layout;
    assert_eq!((fifth.row, fifth.column), (2, 2));
    assert_eq!(cal.last_page().unwrap().address, PageAddress::month(2024, 6));
}

// ── Transitions ─────────────────────────────────────────────────────────────

#[test]
fn transition_handle_completes_on_end() {
    let mut cal = build(CalendarConfig::default());
    let events = record_events(&mut cal);
    cal.move_next();
    let mut handle = cal.pending_transition().cloned().unwrap();
    assert!(handle.is_pending());
    assert!(poll(&mut handle).is_pending());

    cal.on_transition_start();
    cal.on_transition_end();
    assert!(!cal.in_transition());
    assert_eq!(handle.status(), TransitionStatus::Completed);
    assert!(matches!(poll(&mut handle), Poll::Ready(Ok(()))));
    assert!(cal.pending_transition().is_none());

    let events = events.borrow();
    assert!(events.contains(&CalendarEvent::TransitionStart(Transition::SlideLeft)));
    assert_eq!(events.last(), Some(&CalendarEvent::TransitionEnd));
}

#[test]
fn newer_navigation_supersedes_pending_handle() {
    let mut cal = build(CalendarConfig::default());
    cal.move_next();
    let mut first = cal.pending_transition().cloned().unwrap();
    cal.move_next();
    assert_eq!(first.status(), TransitionStatus::Superseded);
    assert!(matches!(
        poll(&mut first),
        Poll::Ready(Err(CalendarError::TransitionSuperseded))
    ));
    assert!(cal.pending_transition().unwrap().is_pending());

    // Settled handles ignore later signals.
    cal.on_transition_end();
    assert_eq!(first.status(), TransitionStatus::Superseded);
}

#[test]
fn refresh_without_transition_resolves_immediately() {
    let mut cal = build(CalendarConfig::default());
    let mut handle = cal.refresh_pages(RefreshOptions {
        page: Some(PageAddress::month(2024, 4)),
        transition: Some(TransitionStyle::None),
        ..RefreshOptions::default()
    });
    assert_eq!(handle.status(), TransitionStatus::Completed);
    assert!(matches!(poll(&mut handle), Poll::Ready(Ok(()))));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 4)]);
}

// ── Input ───────────────────────────────────────────────────────────────────

#[test]
fn keyboard_moves_focus() {
    let mut cal = build(CalendarConfig::default());
    assert!(cal.focus_date(today(), MoveOptions::default()));

    assert!(cal.on_day_keydown(today(), KeyInput::new(Key::ArrowRight)));
    assert_eq!(cal.focused_date(), Some(date(2024, 1, 16)));
    assert!(cal.visible_day(date(2024, 1, 16)).unwrap().is_focused);

    cal.on_day_keydown(date(2024, 1, 17), KeyInput::new(Key::Home));
    assert_eq!(cal.focused_date(), Some(date(2024, 1, 14)));
    cal.on_day_keydown(date(2024, 1, 14), KeyInput::new(Key::End));
    assert_eq!(cal.focused_date(), Some(date(2024, 1, 20)));

    // Leaving the page moves the display with the focus.
    cal.on_day_keydown(date(2024, 1, 31), KeyInput::new(Key::ArrowDown));
    assert_eq!(cal.focused_date(), Some(date(2024, 2, 7)));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 2)]);

    cal.on_day_keydown(date(2024, 2, 7), KeyInput::with_alt(Key::PageUp));
    assert_eq!(cal.focused_date(), Some(date(2023, 2, 7)));
    assert_eq!(cal.focusable_date(), Some(date(2023, 2, 7)));
}

#[test]
fn keyboard_ignores_hidden_days_and_selects() {
    let mut cal = build(CalendarConfig::default());
    let events = record_events(&mut cal);
    assert!(!cal.on_day_keydown(date(2024, 3, 1), KeyInput::new(Key::ArrowLeft)));
    assert!(cal.on_day_keydown(today(), KeyInput::new(Key::Enter)));
    assert_eq!(
        *events.borrow(),
        vec![
            CalendarEvent::DayKeydown {
                date: today(),
                key: Key::Enter
            },
            CalendarEvent::DayClick(today()),
        ]
    );
}

#[test]
fn swipe_moves_pages() {
    let mut cal = build(CalendarConfig::default());
    cal.on_touch_start(TouchPoint::new(200.0, 100.0, 0));
    assert!(cal.on_touch_end(TouchPoint::new(100.0, 110.0, 120)));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 2)]);

    cal.on_touch_start(TouchPoint::new(100.0, 100.0, 0));
    assert!(cal.on_touch_end(TouchPoint::new(200.0, 100.0, 120)));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);

    // Too slow, then too vertical.
    cal.on_touch_start(TouchPoint::new(200.0, 100.0, 0));
    assert!(!cal.on_touch_end(TouchPoint::new(100.0, 100.0, 400)));
    cal.on_touch_start(TouchPoint::new(200.0, 100.0, 0));
    assert!(!cal.on_touch_end(TouchPoint::new(100.0, 200.0, 100)));
    // No start recorded.
    assert!(!cal.on_touch_end(TouchPoint::new(100.0, 100.0, 100)));
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);
}

#[test]
fn popovers_follow_day_events() {
    let mut cal = build_json(
        r#"{"attributes": [
            {"key": "holiday", "dates": ["2024-01-15"], "popover": {"label": "Holiday"}},
            {"key": "review", "dates": ["2024-01-20"], "popover": {"visibility": "click"}},
            {"key": "note", "dates": ["2024-01-22"], "popover": {"visibility": "focus"}},
            {"key": "menu", "dates": ["2024-01-25"], "popover": {"is_interactive": true}}
        ]}"#,
    );
    assert_eq!(cal.popovers().len(), 4);
    let holiday = cal.popover_id("holiday").unwrap().to_string();
    let review = cal.popover_id("review").unwrap().to_string();
    let note = cal.popover_id("note").unwrap().to_string();
    let menu = cal.popover_id("menu").unwrap().to_string();
    assert_eq!(holiday, "cal-popover-1");

    cal.on_day_mouseenter(date(2024, 1, 15));
    assert!(cal.popovers().is_visible(&holiday));
    assert_eq!(
        cal.popovers().get(&holiday).unwrap().target.as_deref(),
        Some("cal-2024-01-15")
    );
    cal.on_day_mouseleave(date(2024, 1, 15));
    assert!(!cal.popovers().is_visible(&holiday));

    cal.on_day_mouseenter(date(2024, 1, 25));
    cal.on_day_mouseleave(date(2024, 1, 25));
    assert!(cal.popovers().is_visible(&menu));

    cal.on_day_click(date(2024, 1, 20));
    assert!(cal.popovers().is_visible(&review));
    cal.on_day_click(date(2024, 1, 20));
    assert!(!cal.popovers().is_visible(&review));

    cal.on_day_focusin(date(2024, 1, 22));
    assert!(cal.popovers().is_visible(&note));
    assert_eq!(cal.focused_date(), Some(date(2024, 1, 22)));
    cal.on_day_focusout(date(2024, 1, 22));
    assert!(!cal.popovers().is_visible(&note));
    assert_eq!(cal.focused_date(), None);

    assert!(cal.remove_attribute("review"));
    assert!(cal.popover_id("review").is_none());
    assert_eq!(cal.popovers().len(), 3);
}

#[test]
fn weeknumber_click_reports_row() {
    let mut cal = build_json(r#"{"show_weeknumbers": "left"}"#);
    let events = record_events(&mut cal);
    assert!(cal.on_weeknumber_click(0, 2, false));
    assert!(cal.on_weeknumber_click(0, 2, true));
    assert!(!cal.on_weeknumber_click(3, 1, false));
    assert!(!cal.on_weeknumber_click(0, 9, false));

    let week: Vec<NaiveDate> = (7..=13).map(|d| date(2024, 1, d)).collect();
    assert_eq!(
        *events.borrow(),
        vec![
            CalendarEvent::WeeknumberClick {
                weeknumber: 2,
                iso: false,
                days: week.clone()
            },
            CalendarEvent::WeeknumberClick {
                weeknumber: 2,
                iso: true,
                days: week
            },
        ]
    );
}

#[test]
fn observers_can_unsubscribe() {
    let mut cal = build(CalendarConfig::default());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let id = cal.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    cal.move_next();
    assert_eq!(
        *events.borrow(),
        vec![
            CalendarEvent::UpdatePages(vec![PageAddress::month(2024, 2)]),
            CalendarEvent::DidMove(vec![PageAddress::month(2024, 2)]),
        ]
    );

    assert!(cal.unsubscribe(id));
    assert!(!cal.unsubscribe(id));
    cal.move_next();
    assert_eq!(events.borrow().len(), 2);
}

// ── Attributes ──────────────────────────────────────────────────────────────

#[test]
fn attributes_can_be_replaced() {
    let mut cal = build_json(r#"{"attributes": [{"key": "holiday", "dates": ["2024-01-15"]}]}"#);
    assert_eq!(cell_keys(&cal, date(2024, 1, 15)), vec!["holiday".to_string()]);

    cal.set_attributes(vec![AttributeConfig {
        key: Some("deadline".to_string()),
        dates: vec![date(2024, 1, 19).into()],
        ..AttributeConfig::default()
    }])
    .unwrap();
    assert_eq!(cal.attributes().len(), 1);
    assert!(cell_keys(&cal, date(2024, 1, 15)).is_empty());
    assert_eq!(cell_keys(&cal, date(2024, 1, 19)), vec!["deadline".to_string()]);

    let bad = AttributeConfig {
        dates: vec!["not a date".into()],
        ..AttributeConfig::default()
    };
    assert!(cal.set_attributes(vec![bad]).is_err());
    assert_eq!(cal.attributes()[0].key, "deadline");

    let ranges = cal.locale().ranges(&[date(2024, 1, 19).into()]).unwrap();
    cal.upsert_attribute(Attribute::new("early", ranges.clone(), -1, VisualProfile::default()));
    assert_eq!(
        cell_keys(&cal, date(2024, 1, 19)),
        vec!["early".to_string(), "deadline".to_string()]
    );
    cal.upsert_attribute(Attribute::new("early", ranges, 5, VisualProfile::default()));
    assert_eq!(cal.attributes().len(), 2);
    assert_eq!(
        cell_keys(&cal, date(2024, 1, 19)),
        vec!["deadline".to_string(), "early".to_string()]
    );
    assert!(cal.remove_attribute("early"));
    assert!(!cal.remove_attribute("early"));
}

#[test]
fn host_attribute_keyed_disabled_stays_separate() {
    let cal = build_json(r#"{"attributes": [{"key": "disabled", "dates": ["2024-01-10"]}]}"#);
    assert!(cal.disabled_attribute().is_none());
    assert!(!cal.visible_day(date(2024, 1, 10)).unwrap().is_disabled);
    assert_eq!(cell_keys(&cal, date(2024, 1, 10)), vec![DISABLED_KEY.to_string()]);

    let cal = build_json(
        r#"{"min_date": "2024-01-05", "attributes": [{"key": "disabled", "dates": ["2024-01-10"]}]}"#,
    );
    assert!(!cal.visible_day(date(2024, 1, 10)).unwrap().is_disabled);
    assert!(cal.visible_day(date(2024, 1, 4)).unwrap().is_disabled);
    assert_eq!(cell_keys(&cal, date(2024, 1, 4)).len(), 1);
    assert_eq!(cal.day_cells(date(2024, 1, 4))[0].order, 100);
    assert_eq!(cal.day_cells(date(2024, 1, 10))[0].order, 0);
}

#[test]
fn duplicate_attribute_keys_are_rejected() {
    let config = CalendarConfig::from_json(
        r#"{"attributes": [
            {"key": "a", "order": 1, "dates": ["2024-01-10"]},
            {"key": "a", "order": 5, "dates": ["2024-01-12"]}
        ]}"#,
    )
    .unwrap();
    let err = Calendar::builder(config.clone())
        .locale(Locale::default())
        .today(today())
        .build()
        .unwrap_err();
    assert!(matches!(err, CalendarError::DuplicateAttribute(key) if key == "a"));

    let mut cal = build_json(r#"{"attributes": [{"key": "b", "dates": ["2024-01-15"]}]}"#);
    assert!(matches!(
        cal.set_attributes(config.attributes),
        Err(CalendarError::DuplicateAttribute(_))
    ));
    assert_eq!(cell_keys(&cal, date(2024, 1, 15)), vec!["b".to_string()]);
}

#[test]
fn set_today_rebuilds_cached_grids() {
    let mut cal = build(CalendarConfig::default());
    assert!(cal.visible_day(today()).unwrap().is_today);
    cal.set_today(date(2024, 1, 20));
    assert_eq!(cal.today(), date(2024, 1, 20));
    assert!(!cal.visible_day(today()).unwrap().is_today);
    assert!(cal.visible_day(date(2024, 1, 20)).unwrap().is_today);
    assert_eq!(firsts(&cal), vec![PageAddress::month(2024, 1)]);
}

// ── Picker ──────────────────────────────────────────────────────────────────

#[test]
fn single_picker_selects_enabled_days() {
    let cal = build_json(r#"{"min_date": "2024-01-10"}"#);
    let mut picker = DatePicker::new(cal, PickerMode::Single);
    assert!(!picker.on_day_click(date(2024, 1, 5)));
    assert_eq!(picker.value(), None);

    assert!(picker.on_day_click(date(2024, 1, 20)));
    assert_eq!(picker.value(), Some(PickerValue::Single(date(2024, 1, 20))));
    assert!(cell_keys(picker.calendar(), date(2024, 1, 20)).contains(&SELECT_KEY.to_string()));

    assert!(!picker.set_value(Some(PickerValue::range(date(2024, 1, 11), date(2024, 1, 12)))));
    assert!(picker.set_value(None));
    assert!(!cell_keys(picker.calendar(), date(2024, 1, 20)).contains(&SELECT_KEY.to_string()));
}

#[test]
fn range_picker_previews_and_completes() {
    let cal = build_json(r#"{"min_date": "2024-01-10"}"#);
    let mut picker = DatePicker::new(cal, PickerMode::Range);
    assert_eq!(picker.mode(), PickerMode::Range);

    assert!(picker.on_day_click(date(2024, 1, 18)));
    assert!(picker.is_dragging());
    picker.on_day_mouseenter(date(2024, 1, 12));
    assert_eq!(picker.drag_value(), Some(PickerValue::range(date(2024, 1, 12), date(2024, 1, 18))));
    assert!(cell_keys(picker.calendar(), date(2024, 1, 15)).contains(&DRAG_KEY.to_string()));

    assert!(picker.on_day_click(date(2024, 1, 12)));
    assert!(!picker.is_dragging());
    assert_eq!(
        picker.value(),
        Some(PickerValue::Range {
            start: date(2024, 1, 12),
            end: date(2024, 1, 18)
        })
    );
    let keys = cell_keys(picker.calendar(), date(2024, 1, 15));
    assert!(keys.contains(&SELECT_KEY.to_string()));
    assert!(!keys.contains(&DRAG_KEY.to_string()));

    picker.on_day_click(date(2024, 1, 20));
    picker.cancel_drag();
    assert!(!picker.is_dragging());
    assert_eq!(picker.drag_value(), None);

    assert!(!picker.set_value(Some(PickerValue::range(date(2024, 1, 5), date(2024, 1, 12)))));
}

#[test]
fn picker_moves_to_value() {
    let cal = build(CalendarConfig::default());
    let mut picker = DatePicker::new(cal, PickerMode::Range);
    assert!(!picker.move_to_value(MoveOptions::default()));
    assert!(picker.set_value(Some(PickerValue::range(date(2024, 3, 5), date(2024, 3, 3)))));
    assert_eq!(picker.value().unwrap().start(), date(2024, 3, 3));
    assert!(picker.move_to_value(MoveOptions::default()));
    assert_eq!(picker.calendar().first_page().unwrap().address, PageAddress::month(2024, 3));
    assert!(cell_keys(picker.calendar(), date(2024, 3, 4)).contains(&SELECT_KEY.to_string()));
}
