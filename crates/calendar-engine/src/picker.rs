//! Date picker model: single or range selection on top of a [`Calendar`].
//!
//! The picker keeps the selected value, previews a range while the second
//! end is being chosen, and mirrors both into a `select` attribute so the
//! calendar renders them like any other attribute.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribute::{Attribute, FillMode, Highlight, VisualProfile};
use crate::calendar::{Calendar, MoveOptions, MoveTarget};
use crate::range::DateRange;

pub const SELECT_KEY: &str = "select";
pub const DRAG_KEY: &str = "select-drag";

/// Paint order of the selection, below the disabled attribute.
const SELECT_ORDER: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerMode {
    #[default]
    Single,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickerValue {
    Single(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

impl PickerValue {
    /// A range value with its ends in order.
    pub fn range(a: NaiveDate, b: NaiveDate) -> Self {
        PickerValue::Range {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> NaiveDate {
        match self {
            PickerValue::Single(date) => *date,
            PickerValue::Range { start, .. } => *start,
        }
    }

    pub fn end(&self) -> NaiveDate {
        match self {
            PickerValue::Single(date) => *date,
            PickerValue::Range { end, .. } => *end,
        }
    }
}

#[derive(Debug)]
pub struct DatePicker {
    calendar: Calendar,
    mode: PickerMode,
    value: Option<PickerValue>,
    drag_start: Option<NaiveDate>,
    drag_value: Option<PickerValue>,
}

impl DatePicker {
    pub fn new(calendar: Calendar, mode: PickerMode) -> Self {
        DatePicker {
            calendar,
            mode,
            value: None,
            drag_start: None,
            drag_value: None,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut Calendar {
        &mut self.calendar
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn value(&self) -> Option<PickerValue> {
        self.value
    }

    /// The range being previewed while its second end is chosen.
    pub fn drag_value(&self) -> Option<PickerValue> {
        self.drag_value
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Replace the value. Values touching a disabled date, or not matching
    /// the picker's mode, are rejected.
    pub fn set_value(&mut self, value: Option<PickerValue>) -> bool {
        if let Some(value) = value {
            let mode_matches = matches!(
                (self.mode, value),
                (PickerMode::Single, PickerValue::Single(_)) | (PickerMode::Range, PickerValue::Range { .. })
            );
            if !mode_matches || self.touches_disabled(&value) {
                return false;
            }
        }
        self.value = value;
        self.drag_start = None;
        self.drag_value = None;
        self.sync_attributes();
        true
    }

    fn touches_disabled(&self, value: &PickerValue) -> bool {
        self.calendar.is_date_disabled(value.start()) || self.calendar.is_date_disabled(value.end())
    }

    /// Pick `date`. In range mode the first click starts a drag and the
    /// second completes the range. Returns whether the selection changed.
    pub fn on_day_click(&mut self, date: NaiveDate) -> bool {
        self.calendar.on_day_click(date);
        if self.calendar.is_date_disabled(date) {
            debug!(%date, "disabled date rejected");
            return false;
        }
        match (self.mode, self.drag_start) {
            (PickerMode::Single, _) => {
                self.value = Some(PickerValue::Single(date));
            }
            (PickerMode::Range, None) => {
                self.drag_start = Some(date);
                self.drag_value = Some(PickerValue::range(date, date));
            }
            (PickerMode::Range, Some(start)) => {
                self.value = Some(PickerValue::range(start, date));
                self.drag_start = None;
                self.drag_value = None;
            }
        }
        self.sync_attributes();
        true
    }

    /// Extend the drag preview to `date`.
    pub fn on_day_mouseenter(&mut self, date: NaiveDate) {
        self.calendar.on_day_mouseenter(date);
        if let Some(start) = self.drag_start {
            self.drag_value = Some(PickerValue::range(start, date));
            self.sync_attributes();
        }
    }

    pub fn cancel_drag(&mut self) {
        if self.drag_start.take().is_some() {
            self.drag_value = None;
            self.sync_attributes();
        }
    }

    /// Bring the value's start into view.
    pub fn move_to_value(&mut self, options: MoveOptions) -> bool {
        match self.value {
            Some(value) => self.calendar.move_to(MoveTarget::Date(value.start()), options),
            None => false,
        }
    }

    fn value_attribute(&self, key: &str, value: &PickerValue, fill_mode: FillMode) -> Attribute {
        let locale = self.calendar.locale();
        let start = locale.get_date_parts(&locale.start_of_day(value.start()));
        let end = locale.get_date_parts(&locale.end_of_day(value.end()));
        let profile = VisualProfile {
            highlight: Some(Highlight {
                fill_mode,
                ..Highlight::default()
            }),
            ..VisualProfile::default()
        };
        Attribute::new(key, vec![DateRange::new(Some(start), Some(end))], SELECT_ORDER, profile)
    }

    fn sync_attributes(&mut self) {
        match self.value.map(|value| self.value_attribute(SELECT_KEY, &value, FillMode::Solid)) {
            Some(attribute) => self.calendar.upsert_attribute(attribute),
            None => {
                self.calendar.remove_attribute(SELECT_KEY);
            }
        }
        match self
            .drag_value
            .map(|value| self.value_attribute(DRAG_KEY, &value, FillMode::Outline))
        {
            Some(attribute) => self.calendar.upsert_attribute(attribute),
            None => {
                self.calendar.remove_attribute(DRAG_KEY);
            }
        }
    }
}
