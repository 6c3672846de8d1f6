use glam::Vec3;

/// Default half-width of the collision box, in world units.
pub const COLLISION_EXTENT: f32 = 15.0;

/// Box proximity test on the water plane.
///
/// True iff the two points are strictly closer than `extent` on both X and
/// Z. Height is ignored, so a boat riding above a submerged piece of trash
/// still hits it.
pub fn is_colliding(a: Vec3, b: Vec3, extent: f32) -> bool {
    (a.x - b.x).abs() < extent && (a.z - b.z).abs() < extent
}
