use crate::components::{Drawable3D, Marker, Material, PointCloudId, ScalePulse, Transform, Visibility};
use crate::entity::EntityId;
use foundation::handles::Handle;
use foundation::math::{Mat4, Vec3};

/// Scene graph: entities with optional components stored by entity index.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    parents: Vec<Option<EntityId>>,
    visibility: Vec<Option<Visibility>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    materials: Vec<Option<Material>>,
    markers: Vec<Option<Marker>>,
    pulses: Vec<Option<ScalePulse>>,
    point_clouds: Vec<Vec<Vec3>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, 0));
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        id
    }

    pub fn entity_count(&self) -> usize {
        self.next_index as usize
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms.get(entity.index() as usize).and_then(|t| *t)
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.transforms
            .get_mut(entity.index() as usize)
            .and_then(|t| t.as_mut())
    }

    pub fn set_parent(&mut self, entity: EntityId, parent: EntityId) {
        self.ensure_capacity(entity.index() as usize);
        self.parents[entity.index() as usize] = Some(parent);
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(entity.index() as usize).and_then(|p| *p)
    }

    /// Direct children of `parent`, in ascending entity order.
    pub fn children(&self, parent: EntityId) -> Vec<EntityId> {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == Some(parent))
            .map(|(idx, _)| Self::entity_at(idx))
            .collect()
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.index() as usize);
        self.visibility[entity.index() as usize] = Some(visibility);
    }

    /// Entities are visible unless they or an ancestor are explicitly hidden.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.ancestry(entity).all(|e| {
            self.visibility
                .get(e.index() as usize)
                .and_then(|v| *v)
                .is_none_or(|v| v.visible)
        })
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        self.ensure_capacity(entity.index() as usize);
        self.drawables_3d[entity.index() as usize] = Some(drawable);
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.drawables_3d.get(entity.index() as usize).and_then(|d| *d)
    }

    pub fn set_material(&mut self, entity: EntityId, material: Material) {
        self.ensure_capacity(entity.index() as usize);
        self.materials[entity.index() as usize] = Some(material);
    }

    pub fn material(&self, entity: EntityId) -> Option<Material> {
        self.materials.get(entity.index() as usize).and_then(|m| *m)
    }

    pub fn material_mut(&mut self, entity: EntityId) -> Option<&mut Material> {
        self.materials
            .get_mut(entity.index() as usize)
            .and_then(|m| m.as_mut())
    }

    pub fn set_marker(&mut self, entity: EntityId, marker: Marker) {
        self.ensure_capacity(entity.index() as usize);
        self.markers[entity.index() as usize] = Some(marker);
    }

    pub fn marker(&self, entity: EntityId) -> Option<&Marker> {
        self.markers.get(entity.index() as usize).and_then(|m| m.as_ref())
    }

    /// Visible markers in ascending entity order.
    pub fn markers(&self) -> Vec<(EntityId, &Marker)> {
        self.markers
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| m.as_ref().map(|m| (Self::entity_at(idx), m)))
            .filter(|(e, _)| self.is_visible(*e))
            .collect()
    }

    pub fn set_pulse(&mut self, entity: EntityId, pulse: ScalePulse) {
        self.ensure_capacity(entity.index() as usize);
        self.pulses[entity.index() as usize] = Some(pulse);
    }

    pub fn pulse(&self, entity: EntityId) -> Option<ScalePulse> {
        self.pulses.get(entity.index() as usize).and_then(|p| *p)
    }

    /// Advances every scale pulse and writes the result into `scale.z`.
    pub fn tick_pulses(&mut self, dt_s: f64) {
        for (idx, pulse) in self.pulses.iter_mut().enumerate() {
            let Some(pulse) = pulse else { continue };
            let z = pulse.tick(dt_s);
            if let Some(Some(transform)) = self.transforms.get_mut(idx) {
                transform.scale.z = z;
            }
        }
    }

    pub fn add_point_cloud(&mut self, positions: Vec<Vec3>) -> PointCloudId {
        let id = PointCloudId(self.point_clouds.len() as u32);
        self.point_clouds.push(positions);
        id
    }

    pub fn point_cloud(&self, id: PointCloudId) -> Option<&[Vec3]> {
        self.point_clouds.get(id.0 as usize).map(Vec::as_slice)
    }

    /// Local-to-world matrix: ancestors' transforms composed root first.
    ///
    /// Entities without a transform contribute identity.
    pub fn world_matrix(&self, entity: EntityId) -> Mat4 {
        let chain: Vec<EntityId> = self.ancestry(entity).collect();
        chain.iter().rev().fold(Mat4::IDENTITY, |acc, e| {
            let local = self.transform(*e).map(|t| t.matrix()).unwrap_or(Mat4::IDENTITY);
            acc * local
        })
    }

    /// Visible drawables with their world matrices, in ascending entity order.
    pub fn drawables_3d(&self) -> Vec<(EntityId, Mat4, Drawable3D)> {
        self.drawables_3d
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| d.map(|d| (Self::entity_at(idx), d)))
            .filter(|(e, _)| self.is_visible(*e))
            .map(|(e, d)| (e, self.world_matrix(e), d))
            .collect()
    }

    /// `entity` followed by its ancestors. Stops on cycles.
    fn ancestry(&self, entity: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let limit = self.entity_count().max(1);
        std::iter::successors(Some(entity), |e| self.parent(*e)).take(limit)
    }

    fn entity_at(idx: usize) -> EntityId {
        EntityId(Handle::new(idx as u32, 0))
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.parents.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.materials.resize(new_len, None);
            self.markers.resize(new_len, None);
            self.pulses.resize(new_len, None);
        }
    }
}
