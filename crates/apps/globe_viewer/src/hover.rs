use foundation::math::Vec2;
use scene::World;
use scene::entity::EntityId;
use scene::picking::{Ray, pick_markers};

/// Tooltip state for the DOM layer to apply after each frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverState {
    pub visible: bool,
    /// Client position the tooltip is anchored at.
    pub position: Option<Vec2>,
    pub country: String,
    pub population: String,
    /// Number of markers under the pointer.
    pub hits: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverStyle {
    pub base_opacity: f32,
    pub hover_opacity: f32,
}

/// Per-frame hover pass over the markers parented to `group`.
///
/// Every marker is reset to the base opacity, then each one under `ray` is
/// highlighted. Hits are visited nearest first, so the tooltip ends up
/// describing the farthest marker under the pointer.
pub fn hover_pass(
    world: &mut World,
    group: EntityId,
    ray: Option<Ray>,
    pointer_client: Option<Vec2>,
    style: HoverStyle,
) -> HoverState {
    for child in world.children(group) {
        if world.marker(child).is_none() {
            continue;
        }
        if let Some(material) = world.material_mut(child) {
            material.opacity = style.base_opacity;
        }
    }

    let mut state = HoverState {
        position: pointer_client,
        ..HoverState::default()
    };
    let Some(ray) = ray else {
        return state;
    };

    let hits = pick_markers(world, ray);
    state.hits = hits.len();
    for hit in &hits {
        if world.parent(hit.entity) != Some(group) {
            continue;
        }
        if let Some(material) = world.material_mut(hit.entity) {
            material.opacity = style.hover_opacity;
        }
        if let Some(marker) = world.marker(hit.entity) {
            state.visible = true;
            state.country.clone_from(&marker.country);
            state.population.clone_from(&marker.population);
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::{HoverStyle, hover_pass};
    use foundation::math::{Vec2, Vec3};
    use pretty_assertions::assert_eq;
    use scene::World;
    use scene::components::{Color, Drawable3D, Marker, Material, Transform};
    use scene::entity::EntityId;
    use scene::picking::Ray;

    const STYLE: HoverStyle = HoverStyle {
        base_opacity: 0.4,
        hover_opacity: 1.0,
    };

    fn marker(world: &mut World, group: EntityId, z: f64, name: &str) -> EntityId {
        let e = world.spawn();
        world.set_parent(e, group);
        world.set_transform(e, Transform::translate(Vec3::new(0.0, 0.0, z)));
        world.set_drawable_3d(e, Drawable3D::cuboid(Vec3::splat(0.5), Vec3::ZERO));
        world.set_material(e, Material::translucent(Color::WHITE, 0.4));
        world.set_marker(e, Marker::new(name, format!("{name}-pop")));
        e
    }

    fn scene() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new();
        let group = world.spawn();
        world.set_transform(group, Transform::identity());
        let near = marker(&mut world, group, 6.0, "Near");
        let far = marker(&mut world, group, -6.0, "Far");
        (world, group, near, far)
    }

    fn down_the_axis() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 15.0), -Vec3::Z)
    }

    #[test]
    fn no_pointer_hides_the_tooltip() {
        let (mut world, group, near, _) = scene();
        let state = hover_pass(&mut world, group, None, None, STYLE);
        assert!(!state.visible);
        assert_eq!(state.hits, 0);
        assert_eq!(world.material(near).map(|m| m.opacity), Some(0.4));
    }

    #[test]
    fn every_hit_lights_up_and_the_farthest_names_the_tooltip() {
        let (mut world, group, near, far) = scene();
        let at = Some(Vec2::new(10.0, 20.0));
        let state = hover_pass(&mut world, group, Some(down_the_axis()), at, STYLE);

        assert!(state.visible);
        assert_eq!(state.hits, 2);
        assert_eq!(state.position, at);
        assert_eq!(state.country, "Far");
        assert_eq!(state.population, "Far-pop");
        assert_eq!(world.material(near).map(|m| m.opacity), Some(1.0));
        assert_eq!(world.material(far).map(|m| m.opacity), Some(1.0));
    }

    #[test]
    fn opacity_resets_once_the_pointer_leaves() {
        let (mut world, group, near, _) = scene();
        hover_pass(&mut world, group, Some(down_the_axis()), None, STYLE);

        let away = Ray::new(Vec3::new(3.0, 0.0, 15.0), -Vec3::Z);
        let state = hover_pass(&mut world, group, Some(away), None, STYLE);
        assert!(!state.visible);
        assert_eq!(world.material(near).map(|m| m.opacity), Some(0.4));
    }

    #[test]
    fn non_marker_children_keep_their_opacity() {
        let (mut world, group, _, _) = scene();
        let sphere = world.spawn();
        world.set_parent(sphere, group);
        world.set_drawable_3d(sphere, Drawable3D::sphere(5.0, 8, 8));
        world.set_material(sphere, Material::default());

        hover_pass(&mut world, group, Some(down_the_axis()), None, STYLE);
        assert_eq!(world.material(sphere).map(|m| m.opacity), Some(1.0));
    }
}
