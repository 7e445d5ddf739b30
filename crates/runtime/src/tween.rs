//! Time-based property tweens.
//!
//! A [`Tween`] is a pure function of elapsed time; [`TweenClock`] and
//! [`PairTween`] carry the elapsed time for callers that tick every frame.

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized progress in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease-out, the default for drag rotation.
    #[default]
    Power1Out,
    /// Cubic ease-out.
    Power2Out,
    /// Quadratic ease-in-out.
    Power1InOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// How many extra cycles run after the first one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Repeat {
    Count(u32),
    Infinite,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub duration_s: f64,
    pub delay_s: f64,
    pub ease: Ease,
    pub repeat: Repeat,
    /// Alternate direction on every repeat.
    pub yoyo: bool,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_s: f64) -> Self {
        Self {
            from,
            to,
            duration_s: duration_s.max(0.0),
            delay_s: 0.0,
            ease: Ease::default(),
            repeat: Repeat::Count(0),
            yoyo: false,
        }
    }

    pub fn with_delay(mut self, delay_s: f64) -> Self {
        self.delay_s = delay_s.max(0.0);
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat, yoyo: bool) -> Self {
        self.repeat = repeat;
        self.yoyo = yoyo;
        self
    }

    /// Value the tween settles on once every cycle has played.
    ///
    /// Infinite tweens never settle; this returns `to` for them.
    pub fn end_value(&self) -> f64 {
        match self.repeat {
            Repeat::Count(n) if self.yoyo && n % 2 == 1 => self.from,
            _ => self.to,
        }
    }

    pub fn total_duration_s(&self) -> Option<f64> {
        match self.repeat {
            Repeat::Count(n) => Some(self.delay_s + self.duration_s * (f64::from(n) + 1.0)),
            Repeat::Infinite => None,
        }
    }

    pub fn is_finished(&self, elapsed_s: f64) -> bool {
        self.total_duration_s()
            .is_some_and(|total| elapsed_s >= total)
    }

    pub fn value_at(&self, elapsed_s: f64) -> f64 {
        let t = elapsed_s - self.delay_s;
        if t.is_nan() || t < 0.0 {
            return self.from;
        }
        if self.is_finished(elapsed_s) || self.duration_s <= 0.0 {
            return self.end_value();
        }

        let cycle = (t / self.duration_s).floor();
        let local = (t - cycle * self.duration_s) / self.duration_s;
        let reversed = self.yoyo && (cycle as u64) % 2 == 1;
        let progress = if reversed { 1.0 - local } else { local };

        self.from + (self.to - self.from) * self.ease.apply(progress)
    }
}

/// A tween together with the time it has been running.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TweenClock {
    tween: Tween,
    elapsed_s: f64,
}

impl TweenClock {
    pub fn new(tween: Tween) -> Self {
        Self {
            tween,
            elapsed_s: 0.0,
        }
    }

    pub fn tick(&mut self, dt_s: f64) -> f64 {
        if dt_s.is_finite() && dt_s > 0.0 {
            self.elapsed_s += dt_s;
        }
        self.value()
    }

    pub fn value(&self) -> f64 {
        self.tween.value_at(self.elapsed_s)
    }

    pub fn is_finished(&self) -> bool {
        self.tween.is_finished(self.elapsed_s)
    }

    pub fn tween(&self) -> &Tween {
        &self.tween
    }
}

/// Two properties animated together toward a target, e.g. rotation `(x, y)`.
///
/// Re-targeting replaces the running tween; the new one starts wherever the
/// old one currently is, so the latest target always wins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PairTween {
    x: TweenClock,
    y: TweenClock,
}

impl PairTween {
    pub fn to(current: [f64; 2], target: [f64; 2], duration_s: f64, ease: Ease) -> Self {
        Self {
            x: TweenClock::new(Tween::new(current[0], target[0], duration_s).with_ease(ease)),
            y: TweenClock::new(Tween::new(current[1], target[1], duration_s).with_ease(ease)),
        }
    }

    pub fn tick(&mut self, dt_s: f64) -> [f64; 2] {
        [self.x.tick(dt_s), self.y.tick(dt_s)]
    }

    pub fn value(&self) -> [f64; 2] {
        [self.x.value(), self.y.value()]
    }

    pub fn target(&self) -> [f64; 2] {
        [self.x.tween().to, self.y.tween().to]
    }

    pub fn is_finished(&self) -> bool {
        self.x.is_finished() && self.y.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::{Ease, PairTween, Repeat, Tween, TweenClock};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn eases_hit_their_endpoints() {
        for ease in [Ease::Linear, Ease::Power1Out, Ease::Power2Out, Ease::Power1InOut] {
            assert_close(ease.apply(0.0), 0.0, 1e-12);
            assert_close(ease.apply(1.0), 1.0, 1e-12);
        }
        assert_close(Ease::Power1Out.apply(0.5), 0.75, 1e-12);
        assert_close(Ease::Power1InOut.apply(0.25), 0.125, 1e-12);
    }

    #[test]
    fn single_shot_tween_eases_and_holds() {
        let tween = Tween::new(0.0, 2.0, 2.0);
        assert_close(tween.value_at(0.0), 0.0, 1e-12);
        assert_close(tween.value_at(1.0), 1.5, 1e-12);
        assert_close(tween.value_at(5.0), 2.0, 1e-12);
        assert!(tween.is_finished(2.0));
        assert!(!tween.is_finished(1.99));
    }

    #[test]
    fn delay_holds_the_start_value() {
        let tween = Tween::new(1.0, 1.4, 2.0)
            .with_ease(Ease::Linear)
            .with_delay(0.5);
        assert_eq!(tween.value_at(0.4), 1.0);
        assert_close(tween.value_at(1.5), 1.2, 1e-12);
    }

    #[test]
    fn infinite_yoyo_pulses_back_and_forth() {
        let tween = Tween::new(1.0, 1.4, 2.0)
            .with_ease(Ease::Linear)
            .with_repeat(Repeat::Infinite, true);
        assert_close(tween.value_at(1.0), 1.2, 1e-12);
        assert_close(tween.value_at(2.0), 1.4, 1e-12);
        assert_close(tween.value_at(3.0), 1.2, 1e-12);
        assert_close(tween.value_at(4.0), 1.0, 1e-12);
        assert_close(tween.value_at(1001.0), 1.2, 1e-9);
        assert!(!tween.is_finished(1.0e9));
    }

    #[test]
    fn odd_yoyo_repeats_settle_on_the_start() {
        let tween = Tween::new(0.0, 1.0, 1.0)
            .with_ease(Ease::Linear)
            .with_repeat(Repeat::Count(1), true);
        assert_close(tween.value_at(1.5), 0.5, 1e-12);
        assert_eq!(tween.value_at(10.0), 0.0);
    }

    #[test]
    fn zero_duration_jumps_to_end() {
        let tween = Tween::new(3.0, 7.0, 0.0);
        assert_eq!(tween.value_at(0.0), 7.0);
    }

    #[test]
    fn clock_accumulates_ticks() {
        let mut clock = TweenClock::new(Tween::new(0.0, 1.0, 1.0).with_ease(Ease::Linear));
        clock.tick(0.25);
        assert_close(clock.tick(0.25), 0.5, 1e-12);
        clock.tick(-4.0);
        assert_close(clock.value(), 0.5, 1e-12);
        clock.tick(1.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn pair_tween_moves_both_axes() {
        let mut pair = PairTween::to([0.0, 0.0], [0.1, -0.2], 2.0, Ease::Power1Out);
        let mid = pair.tick(1.0);
        assert_close(mid[0], 0.075, 1e-12);
        assert_close(mid[1], -0.15, 1e-12);
        pair.tick(1.0);
        assert!(pair.is_finished());
        assert_eq!(pair.value(), pair.target());
    }
}
