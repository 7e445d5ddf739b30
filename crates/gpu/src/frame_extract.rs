use bytemuck::{Pod, Zeroable};
use foundation::math::{Mat4, Vec3};
use scene::World;
use scene::components::{Blending, PointCloudId, Shape3D};

use crate::camera::PerspectiveCamera;

/// Per-instance data for the unit-cube marker mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MarkerInstance {
    /// Unit cube to world: box size and offset folded in.
    pub model: [[f32; 4]; 4],
    /// RGB plus current opacity.
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereDraw {
    /// Unit sphere to world: radius folded in.
    pub model: [[f32; 4]; 4],
    pub segments: u32,
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointsDraw {
    pub model: [[f32; 4]; 4],
    pub cloud: PointCloudId,
    pub count: u32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderFrame {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub globe: Option<SphereDraw>,
    pub atmosphere: Option<SphereDraw>,
    pub stars: Option<PointsDraw>,
    pub markers: Vec<MarkerInstance>,
}

pub struct Renderer;

impl Renderer {
    /// Snapshot of everything visible, grouped by render pass.
    ///
    /// Additive spheres go to the atmosphere pass, other spheres to the globe
    /// pass; the last of each kind wins. Boxes become marker instances in
    /// entity order.
    pub fn collect(world: &World, camera: &PerspectiveCamera) -> RenderFrame {
        let mut frame = RenderFrame {
            view_proj: camera.view_proj(),
            camera_position: camera.position.to_f32(),
            ..RenderFrame::default()
        };

        for (entity, world_matrix, drawable) in world.drawables_3d() {
            let material = world.material(entity).unwrap_or_default();
            match drawable.shape {
                Shape3D::Sphere {
                    radius,
                    width_segments,
                    ..
                } => {
                    let model = world_matrix * Mat4::scale(Vec3::splat(radius));
                    let draw = SphereDraw {
                        model: model.to_f32_cols(),
                        segments: width_segments,
                        color: material.color.with_alpha(material.opacity),
                    };
                    match material.blending {
                        Blending::Additive => frame.atmosphere = Some(draw),
                        Blending::Normal => frame.globe = Some(draw),
                    }
                }
                Shape3D::Box { size, center } => {
                    let model = world_matrix * Mat4::translation(center) * Mat4::scale(size);
                    frame.markers.push(MarkerInstance {
                        model: model.to_f32_cols(),
                        color: material.color.with_alpha(material.opacity),
                    });
                }
                Shape3D::Points { cloud } => {
                    let count = world.point_cloud(cloud).map_or(0, <[_]>::len);
                    frame.stars = Some(PointsDraw {
                        model: world_matrix.to_f32_cols(),
                        cloud,
                        count: count as u32,
                    });
                }
            }
        }

        frame
    }
}

/// Point cloud positions as GPU vertices.
pub fn point_vertices(world: &World, cloud: PointCloudId) -> Vec<[f32; 3]> {
    world
        .point_cloud(cloud)
        .map(|points| points.iter().map(|p| p.to_f32()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{Renderer, point_vertices};
    use crate::camera::PerspectiveCamera;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use scene::World;
    use scene::components::Visibility;
    use scene::prefabs::{GlobeParams, GlobeScene, MarkerSpec, MarkerStyle, spawn_globe_scene, spawn_marker};
    use scene::starfield::StarfieldParams;

    fn globe_world() -> (World, GlobeScene) {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(7);
        let sky = StarfieldParams {
            count: 32,
            ..StarfieldParams::default()
        };
        let scene = spawn_globe_scene(&mut world, &GlobeParams::default(), &sky, &mut rng);
        (world, scene)
    }

    fn spec(lat: f64, lon: f64) -> MarkerSpec {
        MarkerSpec {
            lat_deg: lat,
            lon_deg: lon,
            country: "X".to_string(),
            population: Some(1_000_000_000),
            population_label: "1,000,000,000".to_string(),
        }
    }

    #[test]
    fn groups_drawables_by_pass() {
        let (mut world, scene) = globe_world();
        let mut rng = StdRng::seed_from_u64(3);
        let style = MarkerStyle::default();
        spawn_marker(&mut world, scene.group, 5.0, &spec(0.0, 0.0), &style, &mut rng);
        spawn_marker(&mut world, scene.group, 5.0, &spec(10.0, 20.0), &style, &mut rng);

        let frame = Renderer::collect(&world, &PerspectiveCamera::default());
        assert!(frame.globe.is_some());
        assert!(frame.atmosphere.is_some());
        assert_eq!(frame.stars.map(|s| s.count), Some(32));
        assert_eq!(frame.markers.len(), 2);
        assert_eq!(frame.markers[0].color[3], 0.4);
        assert_eq!(frame.camera_position, [0.0, 0.0, 15.0]);
    }

    #[test]
    fn marker_model_places_the_box_outside_the_surface() {
        let (mut world, scene) = globe_world();
        let mut rng = StdRng::seed_from_u64(3);
        spawn_marker(
            &mut world,
            scene.group,
            5.0,
            &spec(0.0, 0.0),
            &MarkerStyle::default(),
            &mut rng,
        );

        let frame = Renderer::collect(&world, &PerspectiveCamera::default());
        let m = frame.markers[0].model;
        // Unit cube center lands half the extrusion above the surface.
        let center = [m[3][0], m[3][1], m[3][2]];
        assert!((center[0] - 0.0).abs() < 1e-5);
        assert!((center[1] - 0.0).abs() < 1e-5);
        assert!((center[2] - 5.4).abs() < 1e-5);
    }

    #[test]
    fn globe_model_folds_in_radius() {
        let (world, _) = globe_world();
        let frame = Renderer::collect(&world, &PerspectiveCamera::default());
        let globe = frame.globe.expect("globe");
        let col0 = globe.model[0];
        let len = (col0[0] * col0[0] + col0[1] * col0[1] + col0[2] * col0[2]).sqrt();
        assert!((len - 5.0).abs() < 1e-5);
        assert_eq!(globe.segments, 50);

        let atmosphere = frame.atmosphere.expect("atmosphere");
        let col1 = atmosphere.model[1];
        assert!((col1[1] - 5.5).abs() < 1e-5);
    }

    #[test]
    fn hidden_entities_are_skipped() {
        let (mut world, scene) = globe_world();
        world.set_visibility(scene.stars, Visibility::hidden());
        let frame = Renderer::collect(&world, &PerspectiveCamera::default());
        assert!(frame.stars.is_none());
    }

    #[test]
    fn point_vertices_match_cloud() {
        let (world, scene) = globe_world();
        let Some(scene::components::Shape3D::Points { cloud }) =
            world.drawable_3d(scene.stars).map(|d| d.shape)
        else {
            panic!("stars should be points");
        };
        let verts = point_vertices(&world, cloud);
        assert_eq!(verts.len(), 32);
        assert!(verts.iter().all(|v| v[2] <= 0.0));
        assert_eq!(
            verts[0],
            world.point_cloud(cloud).expect("cloud")[0].to_f32()
        );
    }
}
