use foundation::math::{Vec3, lat_lon_to_cartesian, look_at_rotation};
use rand::Rng;
use runtime::tween::{Ease, Repeat, Tween};

use crate::World;
use crate::components::{Color, Drawable3D, Marker, Material, ScalePulse, Transform};
use crate::entity::EntityId;

/// One marker to place on the globe.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub country: String,
    /// Head count driving the marker height. `None` gives the minimum height.
    pub population: Option<u64>,
    /// Tooltip text for the population.
    pub population_label: String,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: Color,
    pub base_opacity: f32,
    /// Box footprint (x and y).
    pub width: f64,
    pub min_depth: f64,
    /// Height per billion inhabitants.
    pub height_per_billion: f64,
    pub pulse_scale: f64,
    pub pulse_duration_s: f64,
    /// Pulse start delays are drawn uniformly from `[0, max_pulse_delay_s)`.
    pub max_pulse_delay_s: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(59.0 / 255.0, 247.0 / 255.0, 1.0),
            base_opacity: 0.4,
            width: 0.11,
            min_depth: 0.4,
            height_per_billion: 0.8,
            pulse_scale: 1.4,
            pulse_duration_s: 2.0,
            max_pulse_delay_s: 1.0,
        }
    }
}

impl MarkerStyle {
    /// Extrusion height before the minimum-depth clamp.
    pub fn extrusion(&self, population: Option<u64>) -> f64 {
        population.map_or(0.0, |p| self.height_per_billion * (p as f64 / 1.0e9))
    }

    /// Box size and local center for a population.
    ///
    /// The box is shifted half the extrusion along local -Z. Markers look
    /// at the globe center down +Z, so the shift pushes the box outward.
    pub fn box_geometry(&self, population: Option<u64>) -> (Vec3, Vec3) {
        let z_scale = self.extrusion(population);
        let size = Vec3::new(self.width, self.width, z_scale.max(self.min_depth));
        let center = Vec3::new(0.0, 0.0, -z_scale / 2.0);
        (size, center)
    }
}

/// Places a marker on the sphere surface as a child of `group`.
pub fn spawn_marker<R: Rng + ?Sized>(
    world: &mut World,
    group: EntityId,
    radius: f64,
    spec: &MarkerSpec,
    style: &MarkerStyle,
    rng: &mut R,
) -> EntityId {
    let position = lat_lon_to_cartesian(spec.lat_deg, spec.lon_deg, radius);
    let rotation = look_at_rotation(position, Vec3::ZERO, Vec3::Y);
    let (size, center) = style.box_geometry(spec.population);

    let entity = world.spawn();
    world.set_parent(entity, group);
    world.set_transform(entity, Transform::translate(position).with_rotation(rotation));
    world.set_drawable_3d(entity, Drawable3D::cuboid(size, center));
    world.set_material(entity, Material::translucent(style.color, style.base_opacity));
    world.set_marker(
        entity,
        Marker::new(spec.country.clone(), spec.population_label.clone()),
    );

    let delay = rng.r#gen::<f64>() * style.max_pulse_delay_s;
    world.set_pulse(
        entity,
        ScalePulse::new(
            Tween::new(1.0, style.pulse_scale, style.pulse_duration_s)
                .with_delay(delay)
                .with_ease(Ease::Linear)
                .with_repeat(Repeat::Infinite, true),
        ),
    );

    entity
}
