//! Attributes: named, ordered visual annotations over date ranges.
//!
//! An attribute owns its normalized ranges and a [`VisualProfile`] the
//! rendering layer reads. The engine never paints anything; it only
//! decides which attributes cover which days.

use serde::{Deserialize, Serialize};

use crate::context::RangeData;
use crate::error::Result;
use crate::locale::{shift_days, DateParts, DateSource, Locale};
use crate::range::{DateRange, DateRangeSource};

/// Paint order of the synthesized disabled attribute; above everything a
/// host configures by default.
pub const DISABLED_ORDER: i32 = 100;

pub const DISABLED_KEY: &str = "disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    Solid,
    Light,
    Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Highlight {
    pub color: Option<String>,
    pub fill_mode: FillMode,
    pub class: Option<String>,
}

/// Dot and bar markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    pub color: Option<String>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStyle {
    pub color: Option<String>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopoverVisibility {
    #[default]
    Hover,
    Focus,
    Click,
    HoverFocus,
}

impl PopoverVisibility {
    pub fn on_hover(self) -> bool {
        matches!(self, PopoverVisibility::Hover | PopoverVisibility::HoverFocus)
    }

    pub fn on_focus(self) -> bool {
        matches!(self, PopoverVisibility::Focus | PopoverVisibility::HoverFocus)
    }

    pub fn on_click(self) -> bool {
        self == PopoverVisibility::Click
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    pub label: Option<String>,
    pub visibility: PopoverVisibility,
    pub is_interactive: bool,
}

/// Everything an attribute tells the renderer. `None` parts are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualProfile {
    pub highlight: Option<Highlight>,
    pub dot: Option<Marker>,
    pub bar: Option<Marker>,
    pub content: Option<ContentStyle>,
    pub popover: Option<PopoverConfig>,
}

/// Serializable attribute definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub key: Option<String>,
    pub dates: Vec<DateRangeSource>,
    pub order: i32,
    pub pin_page: bool,
    #[serde(flatten)]
    pub profile: VisualProfile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub order: i32,
    pub pin_page: bool,
    pub profile: VisualProfile,
    ranges: Vec<DateRange>,
    has_ranges: bool,
    max_repeat_span: i64,
}

impl Attribute {
    pub fn new(key: impl Into<String>, ranges: Vec<DateRange>, order: i32, profile: VisualProfile) -> Self {
        let has_ranges = !ranges.is_empty();
        let max_repeat_span = ranges
            .iter()
            .filter(|range| range.has_repeat())
            .map(DateRange::occurrence_days)
            .max()
            .unwrap_or(0);
        Attribute {
            key: key.into(),
            order,
            pin_page: false,
            profile,
            ranges,
            has_ranges,
            max_repeat_span,
        }
    }

    /// Build from configuration. Attributes without a key are keyed by their
    /// position in the host's list.
    ///
    /// # Errors
    /// Propagates range normalization errors.
    pub fn from_config(config: &AttributeConfig, position: usize, locale: &Locale) -> Result<Self> {
        let key = config
            .key
            .clone()
            .unwrap_or_else(|| format!("attribute-{position}"));
        let mut attribute = Attribute::new(
            key,
            locale.ranges(&config.dates)?,
            config.order,
            config.profile.clone(),
        );
        attribute.pin_page = config.pin_page;
        Ok(attribute)
    }

    /// The attribute marking days the user cannot pick: everything before
    /// `min_date`, everything after `max_date`, plus explicit ranges.
    ///
    /// # Errors
    /// Propagates date resolution errors.
    pub fn disabled(
        min_date: Option<&DateSource>,
        max_date: Option<&DateSource>,
        dates: &[DateRangeSource],
        locale: &Locale,
    ) -> Result<Self> {
        let mut ranges = Vec::with_capacity(dates.len() + 2);
        if let Some(min) = min_date {
            let before = shift_days(locale.to_date(min)?.date_naive(), -1);
            let end = locale.get_date_parts(&locale.end_of_day(before));
            ranges.push(DateRange::new(None, Some(end)));
        }
        if let Some(max) = max_date {
            let after = shift_days(locale.to_date(max)?.date_naive(), 1);
            ranges.push(DateRange::new(Some(locale.day_parts(after)), None));
        }
        ranges.extend(locale.ranges(dates)?);
        let profile = VisualProfile {
            content: Some(ContentStyle {
                color: Some("gray".to_string()),
                class: Some("is-disabled".to_string()),
            }),
            ..VisualProfile::default()
        };
        Ok(Attribute::new(DISABLED_KEY, ranges, DISABLED_ORDER, profile))
    }

    pub fn ranges(&self) -> &[DateRange] {
        &self.ranges
    }

    pub fn has_ranges(&self) -> bool {
        self.has_ranges
    }

    /// Longest occurrence among repeating ranges, in days; 0 without any.
    pub fn max_repeat_span(&self) -> i64 {
        self.max_repeat_span
    }

    /// The first range with a start date, for pinning the initial page.
    pub fn first_bounded_start(&self) -> Option<&DateParts> {
        self.ranges.iter().find_map(|range| range.start.as_ref())
    }

    pub fn covers_day(&self, day: &DateParts, locale: &Locale) -> bool {
        self.ranges.iter().any(|range| range.includes_day(day, locale))
    }
}

impl RangeData for Attribute {
    fn key(&self) -> &str {
        &self.key
    }

    fn order(&self) -> i32 {
        self.order
    }
}
