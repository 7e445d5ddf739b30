//! Pointer and touch interaction: pointer NDC, drag-to-rotate, idle spin.

use foundation::math::Vec2;
use formats::InteractionConfig;
use runtime::tween::PairTween;

/// Page geometry in CSS pixels, supplied by the host on load and resize.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub window_width: f64,
    pub window_height: f64,
    /// Top of the canvas container relative to the viewport.
    pub canvas_top: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 720.0,
            canvas_top: 0.0,
            canvas_width: 640.0,
            canvas_height: 720.0,
        }
    }
}

impl Viewport {
    pub fn is_desktop(&self, breakpoint_px: f64) -> bool {
        self.window_width >= breakpoint_px
    }
}

/// Desktop layout: the canvas fills the right half of the window.
pub fn desktop_pointer_to_ndc(client: Vec2, viewport: &Viewport) -> Vec2 {
    let half_w = viewport.window_width / 2.0;
    Vec2::new(
        ((client.x - half_w) / half_w) * 2.0 - 1.0,
        -(client.y / viewport.window_height) * 2.0 + 1.0,
    )
}

/// Narrow layout: the canvas spans the window width below `canvas_top`.
pub fn narrow_pointer_to_ndc(client: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        (client.x / viewport.window_width) * 2.0 - 1.0,
        -((client.y - viewport.canvas_top) / viewport.window_height) * 2.0 + 1.0,
    )
}

pub fn pointer_to_ndc(client: Vec2, viewport: &Viewport, breakpoint_px: f64) -> Vec2 {
    if viewport.is_desktop(breakpoint_px) {
        desktop_pointer_to_ndc(client, viewport)
    } else {
        narrow_pointer_to_ndc(client, viewport)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerState {
    /// Last pointer position in NDC. `None` until the pointer first moves.
    pub ndc: Option<Vec2>,
    /// Client position the tooltip follows.
    pub client: Option<Vec2>,
    pub down: bool,
    pub prev: Option<Vec2>,
}

#[derive(Debug, Clone)]
pub struct Controller {
    settings: InteractionConfig,
    pointer: PointerState,
    /// Accumulated drag target `(x, y)` in radians.
    offset: [f64; 2],
    /// Current group rotation `(x, y)` in radians.
    rotation: [f64; 2],
    tween: Option<PairTween>,
}

impl Controller {
    pub fn new(settings: InteractionConfig) -> Self {
        Self {
            settings,
            pointer: PointerState::default(),
            offset: [0.0, 0.0],
            rotation: [0.0, 0.0],
            tween: None,
        }
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn offset(&self) -> [f64; 2] {
        self.offset
    }

    pub fn rotation(&self) -> [f64; 2] {
        self.rotation
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn mouse_down(&mut self, client: Vec2) {
        self.pointer.down = true;
        self.pointer.prev = Some(client);
    }

    /// Returns `true` when the host should suppress the browser default.
    pub fn mouse_move(&mut self, client: Vec2, viewport: &Viewport) -> bool {
        if !client.is_finite() {
            return false;
        }
        self.pointer.ndc = Some(pointer_to_ndc(
            client,
            viewport,
            self.settings.desktop_breakpoint_px,
        ));
        self.pointer.client = Some(client);

        if !self.pointer.down {
            return false;
        }
        self.drag_to(client);
        true
    }

    pub fn mouse_up(&mut self) {
        self.pointer.down = false;
    }

    /// `sphere_hit` tells whether the ray through the touch point hits the
    /// globe; a hit starts the drag.
    pub fn touch_move(&mut self, client: Vec2, viewport: &Viewport, sphere_hit: bool) -> bool {
        if !client.is_finite() {
            return false;
        }
        if sphere_hit {
            self.pointer.down = true;
        }
        if !self.pointer.down {
            return false;
        }

        self.pointer.ndc = Some(narrow_pointer_to_ndc(client, viewport));
        self.pointer.client = Some(client);
        self.drag_to(client);
        true
    }

    pub fn touch_end(&mut self) {
        self.pointer.down = false;
        self.pointer.prev = None;
    }

    /// Advances the rotation tween and applies the idle spin.
    pub fn tick(&mut self, dt_s: f64) -> [f64; 2] {
        if let Some(tween) = &mut self.tween {
            self.rotation = tween.tick(dt_s);
            if tween.is_finished() {
                self.tween = None;
            }
        }
        self.rotation[1] += self.settings.idle_spin_rad;
        self.rotation
    }

    fn drag_to(&mut self, client: Vec2) {
        let Some(prev) = self.pointer.prev.replace(client) else {
            return;
        };
        let delta = client - prev;
        let s = self.settings.drag_sensitivity;
        self.offset[1] += delta.x * s;
        self.offset[0] += delta.y * s;

        self.tween = Some(PairTween::to(
            self.rotation,
            self.offset,
            self.settings.rotation_tween_s,
            self.settings.rotation_ease,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::{Controller, Viewport, desktop_pointer_to_ndc, narrow_pointer_to_ndc, pointer_to_ndc};
    use foundation::math::Vec2;
    use formats::InteractionConfig;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn still() -> InteractionConfig {
        InteractionConfig {
            idle_spin_rad: 0.0,
            ..InteractionConfig::default()
        }
    }

    fn desktop() -> Viewport {
        Viewport {
            window_width: 1600.0,
            window_height: 900.0,
            canvas_top: 0.0,
            canvas_width: 800.0,
            canvas_height: 900.0,
        }
    }

    fn phone() -> Viewport {
        Viewport {
            window_width: 400.0,
            window_height: 800.0,
            canvas_top: 300.0,
            canvas_width: 400.0,
            canvas_height: 500.0,
        }
    }

    #[test]
    fn desktop_mapping_uses_the_right_half() {
        let vp = desktop();
        let ndc = desktop_pointer_to_ndc(Vec2::new(1200.0, 450.0), &vp);
        assert_close(ndc.x, 0.0);
        assert_close(ndc.y, 0.0);
        let right_edge = desktop_pointer_to_ndc(Vec2::new(1600.0, 0.0), &vp);
        assert_close(right_edge.x, 1.0);
        assert_close(right_edge.y, 1.0);
    }

    #[test]
    fn narrow_mapping_subtracts_canvas_top() {
        let vp = phone();
        let ndc = narrow_pointer_to_ndc(Vec2::new(200.0, 700.0), &vp);
        assert_close(ndc.x, 0.0);
        assert_close(ndc.y, 0.0);
    }

    #[test]
    fn breakpoint_selects_layout() {
        let mut vp = phone();
        vp.window_width = 1280.0;
        let at_breakpoint = pointer_to_ndc(Vec2::new(640.0, 0.0), &vp, 1280.0);
        assert_close(at_breakpoint.x, -1.0);
        vp.window_width = 1279.0;
        let below = pointer_to_ndc(Vec2::new(639.5, 0.0), &vp, 1280.0);
        assert_close(below.x, 0.0);
    }

    #[test]
    fn mouse_drag_accumulates_offset_and_tweens_toward_it() {
        let mut c = Controller::new(still());
        let vp = desktop();

        assert!(!c.mouse_move(Vec2::new(1000.0, 400.0), &vp));
        assert_eq!(c.offset(), [0.0, 0.0]);

        c.mouse_down(Vec2::new(1000.0, 400.0));
        assert!(c.mouse_move(Vec2::new(1100.0, 380.0), &vp));
        assert_close(c.offset()[1], 0.5);
        assert_close(c.offset()[0], -0.1);
        assert!(c.is_animating());

        let half = c.tick(1.0);
        assert!(half[1] > 0.0 && half[1] < 0.5);
        let done = c.tick(1.0);
        assert_close(done[1], 0.5);
        assert_close(done[0], -0.1);
        assert!(!c.is_animating());

        c.mouse_up();
        assert!(!c.mouse_move(Vec2::new(1200.0, 380.0), &vp));
        assert_close(c.offset()[1], 0.5);
    }

    #[test]
    fn retarget_starts_from_the_current_rotation() {
        let mut c = Controller::new(still());
        let vp = desktop();
        c.mouse_down(Vec2::new(0.0, 0.0));
        c.mouse_move(Vec2::new(100.0, 0.0), &vp);
        let mid = c.tick(1.0);
        c.mouse_move(Vec2::new(200.0, 0.0), &vp);
        // No time passed: the new tween starts where the old one was.
        let now = c.tick(0.0);
        assert_close(now[1], mid[1]);
        c.tick(2.0);
        assert_close(c.rotation()[1], 1.0);
    }

    #[test]
    fn idle_spin_adds_every_frame() {
        let mut c = Controller::new(InteractionConfig::default());
        c.tick(0.016);
        c.tick(0.016);
        assert_close(c.rotation()[1], 0.0004);
        assert_close(c.rotation()[0], 0.0);
    }

    #[test]
    fn running_tween_overwrites_idle_spin() {
        let mut c = Controller::new(InteractionConfig::default());
        let vp = desktop();
        c.mouse_down(Vec2::new(0.0, 0.0));
        c.mouse_move(Vec2::new(100.0, 0.0), &vp);
        c.mouse_up();

        // Power1Out over 2 s toward 0.5: t=0.5 -> 0.75, t=0.75 -> 0.9375.
        assert_close(c.tick(1.0)[1], 0.375 + 0.0002);
        assert_close(c.tick(0.5)[1], 0.46875 + 0.0002);
        assert_close(c.tick(0.5)[1], 0.5 + 0.0002);
        assert!(!c.is_animating());

        // Spin accumulates again once the tween is gone.
        c.tick(0.016);
        assert_close(c.tick(0.016)[1], 0.5 + 0.0006);

        // The next drag heads for the offset, which never includes the spin.
        c.mouse_down(Vec2::new(100.0, 0.0));
        c.mouse_move(Vec2::new(120.0, 0.0), &vp);
        assert_close(c.offset()[1], 0.6);
        assert_close(c.tick(2.0)[1], 0.6 + 0.0002);
        assert_close(c.rotation()[0], 0.0);
    }

    #[test]
    fn touch_drags_only_after_hitting_the_sphere() {
        let mut c = Controller::new(still());
        let vp = phone();

        assert!(!c.touch_move(Vec2::new(100.0, 400.0), &vp, false));
        assert!(c.pointer().ndc.is_none());

        // First move of a gesture records the anchor only.
        assert!(c.touch_move(Vec2::new(100.0, 400.0), &vp, true));
        assert_eq!(c.offset(), [0.0, 0.0]);
        assert!(!c.is_animating());

        // Still dragging after sliding off the globe.
        assert!(c.touch_move(Vec2::new(140.0, 420.0), &vp, false));
        assert_close(c.offset()[1], 0.2);
        assert_close(c.offset()[0], 0.1);
        let ndc = c.pointer().ndc.expect("ndc");
        assert_close(ndc.x, 140.0 / 400.0 * 2.0 - 1.0);

        c.touch_end();
        assert!(!c.pointer().down);
        assert!(c.pointer().prev.is_none());
        assert!(!c.touch_move(Vec2::new(300.0, 420.0), &vp, false));
    }

    #[test]
    fn non_finite_positions_are_ignored() {
        let mut c = Controller::new(still());
        c.mouse_down(Vec2::new(0.0, 0.0));
        assert!(!c.mouse_move(Vec2::new(f64::NAN, 0.0), &desktop()));
        assert!(c.pointer().ndc.is_none());
        assert_eq!(c.offset(), [0.0, 0.0]);
    }
}
