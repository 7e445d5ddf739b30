use foundation::math::{Quat, Vec3};
use rand::Rng;
use tracing::debug;

use crate::World;
use crate::components::{Color, Drawable3D, Material, Transform};
use crate::entity::EntityId;
use crate::starfield::{StarfieldParams, generate_star_positions};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeParams {
    pub radius: f64,
    pub segments: u32,
    /// Local yaw of the textured sphere inside the rotating group. Aligns the
    /// texture's prime meridian with the marker projection.
    pub texture_yaw_rad: f64,
    pub atmosphere_scale: f64,
}

impl Default for GlobeParams {
    fn default() -> Self {
        Self {
            radius: 5.0,
            segments: 50,
            texture_yaw_rad: -std::f64::consts::FRAC_PI_2,
            atmosphere_scale: 1.1,
        }
    }
}

/// Entities making up the globe scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlobeScene {
    /// Rotating parent of the sphere and every marker.
    pub group: EntityId,
    pub sphere: EntityId,
    /// Glow shell. Not parented to the group, so it never rotates.
    pub atmosphere: EntityId,
    pub stars: EntityId,
}

pub fn spawn_globe_scene<R: Rng + ?Sized>(
    world: &mut World,
    globe: &GlobeParams,
    starfield: &StarfieldParams,
    rng: &mut R,
) -> GlobeScene {
    let atmosphere = world.spawn();
    world.set_transform(
        atmosphere,
        Transform::identity().with_scale(Vec3::splat(globe.atmosphere_scale)),
    );
    world.set_drawable_3d(
        atmosphere,
        Drawable3D::sphere(globe.radius, globe.segments, globe.segments),
    );
    world.set_material(atmosphere, Material::glow());

    let group = world.spawn();
    world.set_transform(group, Transform::identity());

    let sphere = world.spawn();
    world.set_parent(sphere, group);
    world.set_transform(
        sphere,
        Transform::identity().with_rotation(Quat::from_euler_xyz(0.0, globe.texture_yaw_rad, 0.0)),
    );
    world.set_drawable_3d(
        sphere,
        Drawable3D::sphere(globe.radius, globe.segments, globe.segments),
    );
    world.set_material(sphere, Material::default());

    let positions = generate_star_positions(starfield, rng);
    let star_count = positions.len();
    let cloud = world.add_point_cloud(positions);
    let stars = world.spawn();
    world.set_transform(stars, Transform::identity());
    world.set_drawable_3d(stars, Drawable3D::points(cloud));
    world.set_material(stars, Material::basic(Color::WHITE));

    debug!(star_count, radius = globe.radius, "spawned globe scene");

    GlobeScene {
        group,
        sphere,
        atmosphere,
        stars,
    }
}

/// Sets the group's Euler rotation (XYZ order, z fixed at 0).
pub fn set_group_rotation(world: &mut World, group: EntityId, x_rad: f64, y_rad: f64) {
    if let Some(t) = world.transform_mut(group) {
        t.rotation = Quat::from_euler_xyz(x_rad, y_rad, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeParams, spawn_globe_scene};
    use crate::World;
    use crate::components::{Blending, Shape3D, Side};
    use crate::starfield::StarfieldParams;
    use foundation::math::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_sky() -> StarfieldParams {
        StarfieldParams {
            count: 16,
            ..StarfieldParams::default()
        }
    }

    #[test]
    fn builds_sphere_atmosphere_and_stars() {
        let mut world = World::new();
        let scene = spawn_globe_scene(
            &mut world,
            &GlobeParams::default(),
            &small_sky(),
            &mut StdRng::seed_from_u64(1),
        );

        assert_eq!(world.parent(scene.sphere), Some(scene.group));
        assert_eq!(world.parent(scene.atmosphere), None);

        let glow = world.material(scene.atmosphere).expect("material");
        assert_eq!(glow.blending, Blending::Additive);
        assert_eq!(glow.side, Side::Back);
        assert_eq!(
            world.transform(scene.atmosphere).expect("transform").scale,
            Vec3::splat(1.1)
        );

        let Some(Shape3D::Points { cloud }) = world.drawable_3d(scene.stars).map(|d| d.shape) else {
            panic!("stars should be a point cloud");
        };
        assert_eq!(world.point_cloud(cloud).map(<[Vec3]>::len), Some(16));
    }

    #[test]
    fn sphere_is_yawed_inside_the_group() {
        let mut world = World::new();
        let scene = spawn_globe_scene(
            &mut world,
            &GlobeParams::default(),
            &small_sky(),
            &mut StdRng::seed_from_u64(1),
        );
        // -90° yaw turns local +Z toward -X.
        let z = world.world_matrix(scene.sphere).transform_vector(Vec3::Z);
        assert!((z - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-9);
    }
}
