//! Mask-based date formatting.
//!
//! Masks are token strings such as `"MMMM YYYY"` or `"WWW, MMM D"`. Text in
//! square brackets is copied verbatim (`"[Week of] MMM D"`). Names come from
//! the [`Locale`], so a locale with translated name tables formats in its
//! own language.
//!
//! | Token | Output |
//! |-------|--------|
//! | `YYYY` / `YY` | 2026 / 26 |
//! | `MMMM` / `MMM` / `MM` / `M` | January / Jan / 01 / 1 |
//! | `DD` / `D` | 05 / 5 |
//! | `WWWW` / `WWW` / `WW` / `W` | Monday / Mon / Mo / M |
//! | `HH` / `H` / `hh` / `h` | 24-hour and 12-hour clock |
//! | `mm` / `m`, `ss` / `s`, `SSS` | minutes, seconds, milliseconds |
//! | `A` / `a` | AM / am |

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::locale::Locale;

/// Longest tokens first so `MMMM` wins over `MMM`.
const TOKENS: &[&str] = &[
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "DD", "D", "WWWW", "WWW", "WW", "W", "HH", "H", "hh",
    "h", "mm", "m", "ss", "s", "SSS", "A", "a",
];

/// Format a local date-time with a mask.
pub fn format_date(locale: &Locale, value: &NaiveDateTime, mask: &str) -> String {
    let mut out = String::with_capacity(mask.len() + 8);
    let mut rest = mask;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(close) = rest.find(']') {
                out.push_str(&rest[1..close]);
                rest = &rest[close + 1..];
                continue;
            }
        }
        if let Some(token) = TOKENS.iter().find(|token| rest.starts_with(**token)) {
            out.push_str(&render_token(locale, value, token));
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn render_token(locale: &Locale, value: &NaiveDateTime, token: &str) -> String {
    let hour12 = match value.hour() % 12 {
        0 => 12,
        h => h,
    };
    match token {
        "YYYY" => format!("{:04}", value.year()),
        "YY" => format!("{:02}", value.year().rem_euclid(100)),
        "MMMM" => locale.month_name(value.month()).to_string(),
        "MMM" => locale.short_month_name(value.month()),
        "MM" => format!("{:02}", value.month()),
        "M" => value.month().to_string(),
        "DD" => format!("{:02}", value.day()),
        "D" => value.day().to_string(),
        "WWWW" => locale.weekday_name(value.weekday()).to_string(),
        "WWW" => locale.weekday_label(value.weekday(), 3),
        "WW" => locale.weekday_label(value.weekday(), 2),
        "W" => locale.weekday_label(value.weekday(), 1),
        "HH" => format!("{:02}", value.hour()),
        "H" => value.hour().to_string(),
        "hh" => format!("{:02}", hour12),
        "h" => hour12.to_string(),
        "mm" => format!("{:02}", value.minute()),
        "m" => value.minute().to_string(),
        "ss" => format!("{:02}", value.second()),
        "s" => value.second().to_string(),
        "SSS" => format!("{:03}", (value.nanosecond() / 1_000_000).min(999)),
        "A" => (if value.hour() < 12 { "AM" } else { "PM" }).to_string(),
        "a" => (if value.hour() < 12 { "am" } else { "pm" }).to_string(),
        _ => token.to_string(),
    }
}
