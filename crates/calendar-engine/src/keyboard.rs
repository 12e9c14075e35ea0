//! Keyboard navigation between day cells.

use crate::grid::CalendarDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
}

impl Key {
    /// Parse a DOM-style key name (`"ArrowLeft"`, `" "`, ...).
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "ArrowLeft" | "Left" => Some(Key::ArrowLeft),
            "ArrowRight" | "Right" => Some(Key::ArrowRight),
            "ArrowUp" | "Up" => Some(Key::ArrowUp),
            "ArrowDown" | "Down" => Some(Key::ArrowDown),
            "Home" => Some(Key::Home),
            "End" => Some(Key::End),
            "PageUp" => Some(Key::PageUp),
            "PageDown" => Some(Key::PageDown),
            "Enter" => Some(Key::Enter),
            " " | "Space" | "Spacebar" => Some(Key::Space),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// The modifier that turns month steps into year steps.
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        KeyInput { key, alt: false }
    }

    pub fn with_alt(key: Key) -> Self {
        KeyInput { key, alt: true }
    }
}

/// A relative move of the focused date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMove {
    Days(i64),
    Months(i32),
    Years(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(DayMove),
    /// Activate the focused day, as a click would.
    Select,
}

/// Map a key press on `day` to an action. Home and End go to the first and
/// last weekday position of the day's row.
pub fn key_action(input: KeyInput, day: &CalendarDay) -> KeyAction {
    let step = |alt: bool, n: i32| {
        if alt {
            DayMove::Years(n)
        } else {
            DayMove::Months(n)
        }
    };
    match input.key {
        Key::ArrowLeft => KeyAction::Move(DayMove::Days(-1)),
        Key::ArrowRight => KeyAction::Move(DayMove::Days(1)),
        Key::ArrowUp => KeyAction::Move(DayMove::Days(-7)),
        Key::ArrowDown => KeyAction::Move(DayMove::Days(7)),
        Key::Home => KeyAction::Move(DayMove::Days(1 - i64::from(day.weekday_position))),
        Key::End => KeyAction::Move(DayMove::Days(i64::from(day.weekday_position_from_end) - 1)),
        Key::PageUp => KeyAction::Move(step(input.alt, -1)),
        Key::PageDown => KeyAction::Move(step(input.alt, 1)),
        Key::Enter | Key::Space => KeyAction::Select,
    }
}
