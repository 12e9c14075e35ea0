//! Swipe classification for touch navigation.

use serde::{Deserialize, Serialize};

/// Thresholds a touch sequence must meet to count as a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub max_swipe_time_ms: i64,
    pub min_horizontal_swipe_distance: f64,
    pub max_vertical_swipe_distance: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        SwipeConfig {
            max_swipe_time_ms: 300,
            min_horizontal_swipe_distance: 60.0,
            max_vertical_swipe_distance: 80.0,
        }
    }
}

/// A touch position with the host's timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub time_ms: i64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64, time_ms: i64) -> Self {
        TouchPoint { x, y, time_ms }
    }
}

/// Direction the finger travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: show later pages.
    Left,
    /// Finger moved right: show earlier pages.
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct SwipeDetector {
    config: SwipeConfig,
    start: Option<TouchPoint>,
}

impl SwipeDetector {
    pub fn new(config: SwipeConfig) -> Self {
        SwipeDetector {
            config,
            start: None,
        }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn touch_start(&mut self, point: TouchPoint) {
        self.start = Some(point);
    }

    /// Classify the sequence started by the last `touch_start`. Returns
    /// `None` for anything that is not a quick, mostly horizontal swipe.
    pub fn touch_end(&mut self, point: TouchPoint) -> Option<SwipeDirection> {
        let start = self.start.take()?;
        let elapsed = point.time_ms - start.time_ms;
        if elapsed < 0 || elapsed >= self.config.max_swipe_time_ms {
            return None;
        }
        let dx = point.x - start.x;
        let dy = point.y - start.y;
        if dx.abs() < self.config.min_horizontal_swipe_distance
            || dy.abs() >= self.config.max_vertical_swipe_distance
        {
            return None;
        }
        Some(if dx < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        })
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
