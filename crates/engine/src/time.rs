use serde::{Deserialize, Serialize};

/// Converts a timeline time in seconds into a horizontal pixel offset.
///
/// # Example
/// ```
/// use timeline_engine::time::time_to_pixel;
///
/// assert_eq!(time_to_pixel(2.5, 40.0), 100.0);
/// ```
pub fn time_to_pixel(t: f64, scale: f64) -> f64 {
    t * scale
}

/// Converts a horizontal pixel offset into timeline seconds.
///
/// Offsets left of the origin map to zero.
///
/// # Example
/// ```
/// use timeline_engine::time::pixel_to_time;
///
/// assert_eq!(pixel_to_time(100.0, 40.0), 2.5);
/// assert_eq!(pixel_to_time(-30.0, 40.0), 0.0);
/// ```
pub fn pixel_to_time(p: f64, scale: f64) -> f64 {
    (p / scale).max(0.0)
}

/// Clamps a timeline time to `>= 0`. Non-finite values collapse to zero.
pub fn clamp_time(t: f64) -> f64 {
    if t.is_finite() { t.max(0.0) } else { 0.0 }
}

/// Allowed zoom range in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl ZoomRange {
    /// Clamps `scale` into the range.
    ///
    /// Returns `None` for non-finite input so callers can keep their current
    /// scale instead of storing garbage.
    pub fn clamp(&self, scale: f64) -> Option<f64> {
        if !scale.is_finite() {
            return None;
        }
        Some(scale.clamp(self.min_scale, self.max_scale))
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min_scale..=self.max_scale).contains(&scale)
    }
}

/// Ruler tick spacing in seconds for a zoom scale in pixels per second.
///
/// Labels every second above 60 px/s and every 5 s above 30 px/s.
pub fn ruler_interval(scale: f64) -> f64 {
    if scale > 60.0 {
        1.0
    } else if scale > 30.0 {
        5.0
    } else {
        10.0
    }
}

/// Formats seconds as `m:ss`, truncating fractions.
///
/// # Example
/// ```
/// use timeline_engine::time::format_timecode;
///
/// assert_eq!(format_timecode(125.9), "2:05");
/// ```
pub fn format_timecode(seconds: f64) -> String {
    let total = clamp_time(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
