//! Host configuration of a calendar session.
//!
//! Every field has a default, so `{}` is a valid configuration: one monthly
//! page, horizontal slide transitions, no bounds.

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeConfig;
use crate::error::Result;
use crate::grid::{TitlePosition, WeeknumberPlacement};
use crate::locale::{DateSource, LocaleConfig};
use crate::page::{PageAddress, PageView};
use crate::range::DateRangeSource;
use crate::touch::SwipeConfig;
use crate::transition::TransitionStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub rows: u32,
    pub columns: u32,
    /// Pages moved by prev/next; defaults to the number of displayed pages.
    pub step: Option<u32>,
    pub view: PageView,
    pub trim_weeks: bool,
    pub show_weeknumbers: Option<WeeknumberPlacement>,
    pub show_iso_weeknumbers: Option<WeeknumberPlacement>,
    pub transition: TransitionStyle,
    pub title_position: TitlePosition,
    pub initial_page: Option<PageAddress>,
    /// 1-based slot the initial page lands in.
    pub initial_page_position: i32,
    pub min_date: Option<DateSource>,
    pub max_date: Option<DateSource>,
    pub min_page: Option<PageAddress>,
    pub max_page: Option<PageAddress>,
    pub disabled_dates: Vec<DateRangeSource>,
    /// When non-empty, only days inside these ranges can be picked.
    pub available_dates: Vec<DateRangeSource>,
    pub attributes: Vec<AttributeConfig>,
    pub swipe: SwipeConfig,
    /// Locale settings for hosts that keep them in the same file.
    pub locale: Option<LocaleConfig>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            rows: 1,
            columns: 1,
            step: None,
            view: PageView::Monthly,
            trim_weeks: false,
            show_weeknumbers: None,
            show_iso_weeknumbers: None,
            transition: TransitionStyle::SlideH,
            title_position: TitlePosition::Center,
            initial_page: None,
            initial_page_position: 1,
            min_date: None,
            max_date: None,
            min_page: None,
            max_page: None,
            disabled_dates: Vec::new(),
            available_dates: Vec::new(),
            attributes: Vec::new(),
            swipe: SwipeConfig::default(),
            locale: None,
        }
    }
}

impl CalendarConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// Returns `CalendarError::Config` for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of pages displayed at once.
    pub fn count(&self) -> u32 {
        self.rows.max(1) * self.columns.max(1)
    }

    pub fn step(&self) -> u32 {
        self.step.filter(|&step| step > 0).unwrap_or_else(|| self.count())
    }
}
