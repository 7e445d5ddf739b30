use foundation::time::Time;

/// Largest step a single frame may advance.
///
/// Browsers pause `requestAnimationFrame` in background tabs; without a cap
/// the first frame after returning would jump every tween to its end.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Frame metadata for the viewer loop.
///
/// Time only advances through [`Frame::advance`], so a recorded sequence of
/// deltas replays identically.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time of this frame (seconds).
    pub dt_s: f64,
    /// Accumulated viewer time at the end of this frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time(0.0),
        }
    }

    /// Next frame after `dt_s` seconds. Negative or NaN deltas count as zero.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_nan() {
            0.0
        } else {
            dt_s.clamp(0.0, MAX_FRAME_DT_S)
        };
        Self {
            index: self.index.wrapping_add(1),
            dt_s,
            time: Time(self.time.0 + dt_s),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::first()
    }
}
