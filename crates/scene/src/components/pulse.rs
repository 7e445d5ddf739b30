use runtime::tween::{Tween, TweenClock};

/// Animates the local `scale.z` of an entity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScalePulse {
    clock: TweenClock,
}

impl ScalePulse {
    pub fn new(tween: Tween) -> Self {
        Self {
            clock: TweenClock::new(tween),
        }
    }

    pub fn tick(&mut self, dt_s: f64) -> f64 {
        self.clock.tick(dt_s)
    }

    pub fn value(&self) -> f64 {
        self.clock.value()
    }

    pub fn delay_s(&self) -> f64 {
        self.clock.tween().delay_s
    }
}
