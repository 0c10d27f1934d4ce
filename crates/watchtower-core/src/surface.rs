//! Pickable quads and ray intersection.

use glam::Mat4;

use crate::pointer::Ray;
use crate::scene::ObjectId;

/// A rectangle in world space that can be hit by a view ray.
///
/// In local space the quad spans `[-width/2, width/2] x [-height/2, height/2]`
/// at `z = 0` and faces +Z. Only the front face is hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// The scene object this surface belongs to.
    pub object: ObjectId,
    /// Local-to-world matrix.
    pub world: Mat4,
    /// Width in local units.
    pub width: f32,
    /// Height in local units.
    pub height: f32,
}

impl Surface {
    /// Creates a surface.
    #[must_use]
    pub fn new(object: ObjectId, world: Mat4, width: f32, height: f32) -> Self {
        Self {
            object,
            world,
            width,
            height,
        }
    }

    /// Returns the ray parameter of the hit, if the ray strikes the front face.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inverse = self.world.inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);

        // Parallel rays and rays approaching from behind miss
        if direction.z > -1e-8 {
            return None;
        }

        // Affine maps preserve the ray parameter
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }

        let hit = origin + direction * t;
        (hit.x.abs() <= self.width * 0.5 && hit.y.abs() <= self.height * 0.5).then_some(t)
    }
}
