//! Per-render range flattening and per-day cell lookup.
//!
//! A [`DateRangeContext`] is built once per visible window: every range of
//! every attribute is flattened into day-indexed [`DataRange`] intervals
//! (repeats expanded only across the window), then each visible day asks
//! for the cells covering it. The context is thrown away on the next
//! render.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::Duration;

use crate::grid::CalendarDay;
use crate::locale::{DateParts, MS_PER_DAY};
use crate::range::DateRange;

/// Data rendered through a context: anything with a stable key and a paint
/// order.
pub trait RangeData {
    fn key(&self) -> &str;
    fn order(&self) -> i32;
}

/// A flattened interval. Day bounds use `i64::MIN`/`i64::MAX` for open
/// ends; times are milliseconds since local midnight, `end_time` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRange {
    pub start_day: i64,
    pub start_time: i64,
    pub end_day: i64,
    pub end_time: i64,
}

impl DataRange {
    pub fn contains_day(&self, day_index: i64) -> bool {
        self.start_day <= day_index && self.end_day >= day_index
    }
}

/// How a cell sits within its interval, for renderers drawing connected
/// highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSegment {
    /// The interval starts and ends on this day.
    Single,
    Start,
    End,
    /// A day strictly inside the interval.
    Base,
}

/// One interval as seen from one day.
pub struct DateRangeCell<T> {
    pub data: Rc<T>,
    pub range: DataRange,
    pub on_start: bool,
    pub on_end: bool,
    /// Clipped to the day: 0 unless the interval starts on this day.
    pub start_time: i64,
    /// Clipped to the day: `MS_PER_DAY` unless the interval ends on this day.
    pub end_time: i64,
    pub start_date: chrono::DateTime<chrono_tz::Tz>,
    pub end_date: chrono::DateTime<chrono_tz::Tz>,
    pub all_day: bool,
    pub order: i32,
}

impl<T> DateRangeCell<T> {
    pub fn segment(&self) -> CellSegment {
        match (self.on_start, self.on_end) {
            (true, true) => CellSegment::Single,
            (true, false) => CellSegment::Start,
            (false, true) => CellSegment::End,
            (false, false) => CellSegment::Base,
        }
    }
}

impl<T> Clone for DateRangeCell<T> {
    fn clone(&self) -> Self {
        DateRangeCell {
            data: Rc::clone(&self.data),
            range: self.range,
            on_start: self.on_start,
            on_end: self.on_end,
            start_time: self.start_time,
            end_time: self.end_time,
            start_date: self.start_date,
            end_date: self.end_date,
            all_day: self.all_day,
            order: self.order,
        }
    }
}

impl<T: RangeData> fmt::Debug for DateRangeCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeCell")
            .field("key", &self.data.key())
            .field("range", &self.range)
            .field("on_start", &self.on_start)
            .field("on_end", &self.on_end)
            .field("all_day", &self.all_day)
            .field("order", &self.order)
            .finish()
    }
}

struct RangeRecord<T> {
    data: Rc<T>,
    ranges: Vec<DataRange>,
}

pub struct DateRangeContext<T> {
    records: Vec<RangeRecord<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for DateRangeContext<T> {
    fn default() -> Self {
        DateRangeContext {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: RangeData> fmt::Debug for DateRangeContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.records
                    .iter()
                    .map(|record| (record.data.key(), &record.ranges)),
            )
            .finish()
    }
}

impl<T: RangeData> DateRangeContext<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `range` against the window `days` and record the result under
    /// `data`'s key. Returns the last interval recorded, if any.
    ///
    /// Non-repeating ranges record one unclipped interval when they touch
    /// the window. Repeating ranges record one interval per window day on
    /// which an occurrence starts.
    pub fn render(&mut self, data: &Rc<T>, range: &DateRange, days: &[DateParts]) -> Option<DataRange> {
        let (first, last) = match (days.first(), days.last()) {
            (Some(first), Some(last)) => (first.day_index, last.day_index),
            _ => return None,
        };
        let start_time = range.start.as_ref().map_or(0, |s| s.time);
        let end_time = range.end.as_ref().map_or(MS_PER_DAY, |e| (e.time + 1).min(MS_PER_DAY));

        if range.has_repeat() {
            let span = range.occurrence_days();
            let mut result = None;
            for day in days.iter().filter(|day| range.starts_on_day(day)) {
                let interval = DataRange {
                    start_day: day.day_index,
                    start_time,
                    end_day: day.day_index + span - 1,
                    end_time,
                };
                self.ranges_for(data).push(interval);
                result = Some(interval);
            }
            return result;
        }

        if !range.intersects_day_range(first, last) {
            return None;
        }
        let interval = DataRange {
            start_day: range.start.as_ref().map_or(i64::MIN, |s| s.day_index),
            start_time,
            end_day: range.end.as_ref().map_or(i64::MAX, |e| e.day_index),
            end_time,
        };
        self.ranges_for(data).push(interval);
        Some(interval)
    }

    fn ranges_for(&mut self, data: &Rc<T>) -> &mut Vec<DataRange> {
        let slot = match self.index.get(data.key()) {
            Some(&slot) => slot,
            None => {
                self.records.push(RangeRecord {
                    data: Rc::clone(data),
                    ranges: Vec::new(),
                });
                let slot = self.records.len() - 1;
                self.index.insert(data.key().to_string(), slot);
                slot
            }
        };
        &mut self.records[slot].ranges
    }

    /// Every interval covering `day`, sorted by paint order.
    pub fn get_cells(&self, day: &CalendarDay) -> Vec<DateRangeCell<T>> {
        let mut cells = Vec::new();
        for record in &self.records {
            for range in record.ranges.iter().filter(|r| r.contains_day(day.day_index)) {
                cells.push(Self::cell(record, range, day));
            }
        }
        cells.sort_by_key(|cell| cell.order);
        cells
    }

    fn cell(record: &RangeRecord<T>, range: &DataRange, day: &CalendarDay) -> DateRangeCell<T> {
        let on_start = day.day_index == range.start_day;
        let on_end = day.day_index == range.end_day;
        let start_time = if on_start { range.start_time.max(0) } else { 0 };
        let end_time = if on_end {
            range.end_time.min(MS_PER_DAY)
        } else {
            MS_PER_DAY
        };
        let start_date = if start_time == 0 {
            day.start_date
        } else {
            day.start_date + Duration::milliseconds(start_time)
        };
        let end_date = if end_time == MS_PER_DAY {
            day.end_date
        } else {
            day.start_date + Duration::milliseconds((end_time - 1).max(0))
        };
        DateRangeCell {
            data: Rc::clone(&record.data),
            range: *range,
            on_start,
            on_end,
            start_time,
            end_time,
            start_date,
            end_date,
            all_day: start_time == 0 && end_time == MS_PER_DAY,
            order: record.data.order(),
        }
    }

    /// The first cell for `key` covering `day`.
    pub fn get_cell(&self, key: &str, day: &CalendarDay) -> Option<DateRangeCell<T>> {
        let record = &self.records[*self.index.get(key)?];
        record
            .ranges
            .iter()
            .find(|r| r.contains_day(day.day_index))
            .map(|range| Self::cell(record, range, day))
    }

    /// Presence check without building cells.
    pub fn cell_exists(&self, key: &str, day_index: i64) -> bool {
        self.index.get(key).map_or(false, |&slot| {
            self.records[slot]
                .ranges
                .iter()
                .any(|r| r.contains_day(day_index))
        })
    }

    /// Number of intervals recorded across all keys.
    pub fn interval_count(&self) -> usize {
        self.records.iter().map(|record| record.ranges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
