use foundation::math::Vec2;
use formats::ViewerConfig;
use gpu::{PerspectiveCamera, RenderFrame, Renderer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{EventBus, EventKind, Frame};
use scene::World;
use scene::picking::ray_hits_sphere;
use scene::prefabs::{GlobeScene, MarkerSpec, set_group_rotation, spawn_globe_scene, spawn_marker};
use tracing::{debug, info};

use crate::controller::{Controller, Viewport, narrow_pointer_to_ndc};
use crate::hover::{HoverState, HoverStyle, hover_pass};

/// Everything the globe needs between frames, independent of the browser.
#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    world: World,
    scene: GlobeScene,
    camera: PerspectiveCamera,
    controller: Controller,
    viewport: Viewport,
    frame: Frame,
    last_timestamp_ms: Option<f64>,
    events: EventBus,
    hover: HoverState,
    rng: StdRng,
    marker_count: usize,
}

impl Viewer {
    /// Builds the scene. `seed` drives the starfield and pulse delays.
    pub fn new(config: ViewerConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = World::new();
        let scene = spawn_globe_scene(
            &mut world,
            &config.globe_params(),
            &config.starfield_params(),
            &mut rng,
        );

        let viewport = Viewport::default();
        let camera = PerspectiveCamera::new(
            config.camera.fov_y_deg,
            viewport.canvas_width,
            viewport.canvas_height,
            config.camera.near,
            config.camera.far,
            config.camera.distance,
        );
        let controller = Controller::new(config.interaction.clone());

        Self {
            config,
            world,
            scene,
            camera,
            controller,
            viewport,
            frame: Frame::first(),
            last_timestamp_ms: None,
            events: EventBus::new(),
            hover: HoverState::default(),
            rng,
            marker_count: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scene(&self) -> &GlobeScene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    pub fn add_markers(&mut self, specs: &[MarkerSpec]) -> usize {
        let style = self.config.marker_style();
        let radius = self.config.globe.radius;
        for spec in specs {
            spawn_marker(
                &mut self.world,
                self.scene.group,
                radius,
                spec,
                &style,
                &mut self.rng,
            );
        }
        self.marker_count += specs.len();
        info!(added = specs.len(), total = self.marker_count, "markers placed");
        self.events.emit(
            self.frame,
            EventKind::Markers,
            format!("{} markers", self.marker_count),
        );
        specs.len()
    }

    /// Places the dataset markers, then the configured extra markers after
    /// them. Pass an empty slice when the dataset is unavailable.
    pub fn place_dataset(&mut self, dataset: &[MarkerSpec]) -> usize {
        let extras: Vec<MarkerSpec> = self
            .config
            .extra_markers
            .iter()
            .map(|m| m.marker_spec())
            .collect();
        self.add_markers(dataset) + self.add_markers(&extras)
    }

    /// Stores new page geometry and rebuilds the camera for the canvas size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let cam = &self.config.camera;
        self.camera = PerspectiveCamera::new(
            cam.fov_y_deg,
            viewport.canvas_width,
            viewport.canvas_height,
            cam.near,
            cam.far,
            cam.distance,
        );
        debug!(
            width = viewport.canvas_width,
            height = viewport.canvas_height,
            "camera rebuilt"
        );
        self.events.emit(
            self.frame,
            EventKind::Resize,
            format!("{}x{}", viewport.canvas_width, viewport.canvas_height),
        );
    }

    pub fn mouse_down(&mut self, client: Vec2) {
        self.controller.mouse_down(client);
        self.events.emit(self.frame, EventKind::Drag, "start");
    }

    pub fn mouse_move(&mut self, client: Vec2) -> bool {
        self.controller.mouse_move(client, &self.viewport)
    }

    pub fn mouse_up(&mut self) {
        if self.controller.pointer().down {
            self.events.emit(self.frame, EventKind::Drag, "end");
        }
        self.controller.mouse_up();
    }

    pub fn touch_move(&mut self, client: Vec2) -> bool {
        let sphere_hit = self
            .camera
            .ray_from_ndc(narrow_pointer_to_ndc(client, &self.viewport))
            .and_then(|ray| ray_hits_sphere(&self.world, self.scene.sphere, ray))
            .is_some();
        self.controller.touch_move(client, &self.viewport, sphere_hit)
    }

    pub fn touch_end(&mut self) {
        self.controller.touch_end();
    }

    /// Advances one animation frame at `timestamp_ms` (a
    /// `requestAnimationFrame` timestamp) and returns what to draw.
    pub fn frame(&mut self, timestamp_ms: f64) -> RenderFrame {
        let dt_s = match self.last_timestamp_ms {
            Some(last) if timestamp_ms.is_finite() => (timestamp_ms - last) / 1000.0,
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_timestamp_ms = Some(timestamp_ms);
        }
        self.frame = self.frame.advance(dt_s);
        let dt_s = self.frame.dt_s;

        self.world.tick_pulses(dt_s);
        let [x, y] = self.controller.tick(dt_s);
        set_group_rotation(&mut self.world, self.scene.group, x, y);

        let pointer = *self.controller.pointer();
        let ray = pointer.ndc.and_then(|ndc| self.camera.ray_from_ndc(ndc));
        let style = HoverStyle {
            base_opacity: self.config.markers.base_opacity,
            hover_opacity: self.config.markers.hover_opacity,
        };
        let hover = hover_pass(&mut self.world, self.scene.group, ray, pointer.client, style);
        if hover.visible && (!self.hover.visible || hover.country != self.hover.country) {
            self.events
                .emit(self.frame, EventKind::Hover, hover.country.clone());
        }
        self.hover = hover;

        Renderer::collect(&self.world, &self.camera)
    }
}
