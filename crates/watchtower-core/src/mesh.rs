//! CPU-side triangle meshes.
//!
//! All generators emit counter-clockwise front faces and UVs with the origin
//! at the top-left of each face, matching wgpu's texture orientation.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

/// Interleaved vertex layout shared with the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Creates a vertex.
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// An indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertices.
    pub vertices: Vec<Vertex>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Returns the number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a rectangle centred at `center` spanning `u * half_u` and `v * half_v`.
    /// The face normal is `u x v`.
    fn push_face(&mut self, center: Vec3, u: Vec3, v: Vec3, half_u: f32, half_v: f32) {
        let normal = u.cross(v).normalize();
        let base = self.vertices.len() as u32;
        let corners = [
            (center - u * half_u + v * half_v, Vec2::new(0.0, 0.0)),
            (center - u * half_u - v * half_v, Vec2::new(0.0, 1.0)),
            (center + u * half_u - v * half_v, Vec2::new(1.0, 1.0)),
            (center + u * half_u + v * half_v, Vec2::new(1.0, 0.0)),
        ];
        self.vertices
            .extend(corners.iter().map(|(p, uv)| Vertex::new(*p, normal, *uv)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// A `width` x `height` rectangle in the XY plane facing +Z.
#[must_use]
pub fn quad(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    mesh.push_face(Vec3::ZERO, Vec3::X, Vec3::Y, width * 0.5, height * 0.5);
    mesh
}

/// An axis-aligned box centred on the origin.
#[must_use]
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut mesh = MeshData::default();
    mesh.push_face(Vec3::Z * hz, Vec3::X, Vec3::Y, hx, hy);
    mesh.push_face(Vec3::NEG_Z * hz, Vec3::NEG_X, Vec3::Y, hx, hy);
    mesh.push_face(Vec3::X * hx, Vec3::NEG_Z, Vec3::Y, hz, hy);
    mesh.push_face(Vec3::NEG_X * hx, Vec3::Z, Vec3::Y, hz, hy);
    mesh.push_face(Vec3::Y * hy, Vec3::X, Vec3::NEG_Z, hx, hz);
    mesh.push_face(Vec3::NEG_Y * hy, Vec3::X, Vec3::Z, hx, hz);
    mesh
}

/// A capped cylinder along Y centred on the origin.
#[must_use]
pub fn cylinder(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let mut mesh = MeshData::default();

    let ring = |i: u32| {
        let theta = i as f32 / segments as f32 * TAU;
        Vec3::new(theta.sin(), 0.0, theta.cos())
    };

    // Side
    for i in 0..segments {
        let (a, b) = (ring(i), ring(i + 1));
        let (ua, ub) = (i as f32 / segments as f32, (i + 1) as f32 / segments as f32);
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend_from_slice(&[
            Vertex::new(a * radius + Vec3::Y * half, a, Vec2::new(ua, 0.0)),
            Vertex::new(a * radius - Vec3::Y * half, a, Vec2::new(ua, 1.0)),
            Vertex::new(b * radius - Vec3::Y * half, b, Vec2::new(ub, 1.0)),
            Vertex::new(b * radius + Vec3::Y * half, b, Vec2::new(ub, 0.0)),
        ]);
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    // Caps
    for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::new(
            Vec3::Y * y,
            normal,
            Vec2::new(0.5, 0.5),
        ));
        for i in 0..=segments {
            let p = ring(i);
            mesh.vertices.push(Vertex::new(
                p * radius + Vec3::Y * y,
                normal,
                Vec2::new(p.x * 0.5 + 0.5, p.z * 0.5 + 0.5),
            ));
        }
        for i in 0..segments {
            let (a, b) = (center + 1 + i, center + 2 + i);
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[center, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    mesh
}
