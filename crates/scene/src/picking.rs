use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::components::Shape3D;
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerHit {
    pub entity: EntityId,
    pub distance: f64,
    pub point: Vec3,
}

/// Every visible marker box pierced by `ray`, nearest first.
///
/// Ordering contract:
/// - Hits are sorted by distance along the normalized ray.
/// - Equal distances are ordered by ascending `EntityId::index()`.
///
/// Only marker boxes are tested; the globe does not occlude them.
pub fn pick_markers(world: &World, ray: Ray) -> Vec<MarkerHit> {
    let Some(dir) = ray.dir.try_normalize() else {
        return Vec::new();
    };
    if !ray.origin.is_finite() {
        return Vec::new();
    }
    let ray = Ray::new(ray.origin, dir);

    let mut hits = Vec::new();
    for (entity, _marker) in world.markers() {
        let Some(bounds) = world.drawable_3d(entity).and_then(|d| d.box_bounds()) else {
            continue;
        };
        let Some(inverse) = world.world_matrix(entity).inverse_affine() else {
            continue;
        };

        // The inverse maps the ray into box space without renormalizing, so
        // the box-space parameter is also the world-space distance.
        let local_origin = inverse.transform_point(ray.origin);
        let local_dir = inverse.transform_vector(ray.dir);
        let Some(t) = bounds.ray_entry(local_origin, local_dir, 0.0, f64::INFINITY) else {
            continue;
        };

        hits.push(MarkerHit {
            entity,
            distance: t,
            point: ray.at(t),
        });
    }

    hits.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance, b.distance).then_with(|| a.entity.index().cmp(&b.entity.index()))
    });
    hits
}

/// Distance along `ray` to the first intersection with a sphere entity.
///
/// Returns `None` for a miss, for non-sphere entities, and when the sphere
/// lies entirely behind the ray origin.
pub fn ray_hits_sphere(world: &World, entity: EntityId, ray: Ray) -> Option<f64> {
    let Shape3D::Sphere { radius, .. } = world.drawable_3d(entity)?.shape else {
        return None;
    };
    let dir = ray.dir.try_normalize()?;
    let inverse = world.world_matrix(entity).inverse_affine()?;

    let o = inverse.transform_point(ray.origin);
    let d = inverse.transform_vector(dir);

    let a = d.dot(d);
    let b = 2.0 * o.dot(d);
    let c = o.dot(o) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if !(disc >= 0.0) || a <= 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let near = (-b - sqrt_disc) / (2.0 * a);
    let far = (-b + sqrt_disc) / (2.0 * a);
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}
