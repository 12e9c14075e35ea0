//! # calendar-engine
//!
//! Paging, navigation and attribute rendering for calendar and date picker
//! widgets.
//!
//! The engine generates month grids for any locale and first day of week,
//! answers range and repeat-rule queries against the visible window, and
//! drives a multi-page navigation state machine with bounds, transitions
//! and keyboard/swipe input. Painting is left to the host.
//!
//! ## Modules
//!
//! - [`locale`] - date decomposition, month parts, week numbers, formatting
//! - [`page`] - page addresses and their arithmetic
//! - [`grid`] - cached 6×7 day grids and view-reduced pages
//! - [`range`] / [`repeat`] - date ranges and recurrence predicates
//! - [`attribute`] / [`context`] - visual attributes and per-day cell lookup
//! - [`calendar`] - the navigation state machine
//! - [`picker`] - single and range date selection
//! - [`error`] - error types

pub mod attribute;
pub mod calendar;
pub mod config;
pub mod context;
pub mod dst;
pub mod error;
pub mod events;
pub mod format;
pub mod grid;
pub mod keyboard;
pub mod locale;
pub mod page;
pub mod picker;
pub mod popover;
pub mod range;
pub mod repeat;
pub mod touch;
pub mod transition;

pub use attribute::{Attribute, AttributeConfig, VisualProfile};
pub use calendar::{Calendar, CalendarBuilder, MoveOptions, MoveTarget, RefreshOptions};
pub use config::CalendarConfig;
pub use context::{DateRangeCell, DateRangeContext};
pub use error::{CalendarError, Result};
pub use grid::{CalendarDay, Page};
pub use locale::{DateParts, DateSource, Locale, LocaleConfig};
pub use page::{add_pages, PageAddress, PageView};
pub use picker::{DatePicker, PickerMode, PickerValue};
pub use range::{DateRange, DateRangeSource};
pub use transition::{Transition, TransitionHandle, TransitionStyle};
