//! DST resolution policies for local wall times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest gap a spring-forward transition can open, in minutes.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Policy for turning a local wall time into an instant when the wall time
/// is ambiguous (fall back) or does not exist (spring forward).
///
/// Wall times inside a gap always move forward to the first valid instant
/// after the gap; the policy only picks a side for ambiguous times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DstPolicy {
    /// Ambiguous wall times resolve to the earlier instant
    #[default]
    Earliest,
    /// Ambiguous wall times resolve to the later instant
    Latest,
}

impl DstPolicy {
    /// Resolve `local` in `tz` according to this policy.
    pub fn resolve(self, tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(early, late) => match self {
                DstPolicy::Earliest => early,
                DstPolicy::Latest => late,
            },
            LocalResult::None => {
                let mut candidate = local;
                for _ in 0..MAX_GAP_MINUTES {
                    candidate += Duration::minutes(1);
                    if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                        return dt;
                    }
                }
                tz.from_utc_datetime(&local)
            }
        }
    }
}
