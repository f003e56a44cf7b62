use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::types::{LineVertex, Vertex};

/// Indexed triangle mesh. The uv set doubles as the second uv channel
/// sampled by ambient occlusion maps.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Axis-aligned box centred on the origin, one quad per face
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut geometry = Geometry::default();
        // (u axis, v axis, w axis, u dir, v dir, width, height, depth)
        let faces: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
            (2, 1, 0, -1.0, -1.0, depth, height, width),   // +x
            (2, 1, 0, 1.0, -1.0, depth, height, -width),   // -x
            (0, 2, 1, 1.0, 1.0, width, depth, height),     // +y
            (0, 2, 1, 1.0, -1.0, width, depth, -height),   // -y
            (0, 1, 2, 1.0, -1.0, width, height, depth),    // +z
            (0, 1, 2, -1.0, -1.0, width, height, -depth),  // -z
        ];

        for (u, v, w, udir, vdir, face_width, face_height, face_depth) in faces {
            geometry.push_box_face(u, v, w, udir, vdir, face_width, face_height, face_depth);
        }
        geometry
    }

    #[allow(clippy::too_many_arguments)]
    fn push_box_face(
        &mut self,
        u: usize,
        v: usize,
        w: usize,
        udir: f32,
        vdir: f32,
        width: f32,
        height: f32,
        depth: f32,
    ) {
        let start = self.vertices.len() as u32;
        let w_sign = if depth > 0.0 { 1.0 } else { -1.0 };

        for iy in 0..2 {
            let y = iy as f32 * height - height * 0.5;
            for ix in 0..2 {
                let x = ix as f32 * width - width * 0.5;

                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = depth * 0.5;

                let mut normal = [0.0; 3];
                normal[w] = w_sign;

                self.vertices.push(Vertex::new(
                    position,
                    normal,
                    [ix as f32, 1.0 - iy as f32],
                ));
            }
        }

        let a = start;
        let b = start + 2;
        let c = start + 3;
        let d = start + 1;
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    /// UV sphere with poles on the Y axis
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut geometry = Geometry::default();
        let mut grid = Vec::with_capacity(height_segments as usize + 1);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (sin_phi, cos_phi) = (u * TAU).sin_cos();
                let (sin_theta, cos_theta) = (v * PI).sin_cos();

                let position = Vec3::new(
                    -radius * cos_phi * sin_theta,
                    radius * cos_theta,
                    radius * sin_phi * sin_theta,
                );
                let normal = position.normalize_or_zero();

                row.push(geometry.vertices.len() as u32);
                geometry.vertices.push(Vertex::new(
                    position.to_array(),
                    normal.to_array(),
                    [u + u_offset, 1.0 - v],
                ));
            }
            grid.push(row);
        }

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        geometry
    }

    /// Subdivided plane in XY facing +Z
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;
        let mut geometry = Geometry::default();

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height * 0.5;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width * 0.5;
                geometry.vertices.push(Vertex::new(
                    [x, -y, 0.0],
                    [0.0, 0.0, 1.0],
                    [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
                ));
            }
        }

        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry
    }

    /// Torus around the Z axis
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(2);
        let tubular_segments = tubular_segments.max(3);
        let mut geometry = Geometry::default();

        for j in 0..=radial_segments {
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let v = j as f32 / radial_segments as f32 * TAU;

                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();

                geometry.vertices.push(Vertex::new(
                    position.to_array(),
                    normal.to_array(),
                    [
                        i as f32 / tubular_segments as f32,
                        j as f32 / radial_segments as f32,
                    ],
                ));
            }
        }

        let row = tubular_segments + 1;
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unique triangle edges as a line list, in first-seen order
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.extend_from_slice(&[a, b]);
                }
            }
        }
        lines
    }
}

/// Line segments for an axes helper: X red, Y green, Z blue
pub fn axes_lines(size: f32) -> Vec<LineVertex> {
    vec![
        LineVertex::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        LineVertex::new([size, 0.0, 0.0], [1.0, 0.6, 0.0]),
        LineVertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        LineVertex::new([0.0, size, 0.0], [0.6, 1.0, 0.0]),
        LineVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        LineVertex::new([0.0, 0.0, size], [0.0, 0.6, 1.0]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_normals(geometry: &Geometry) {
        for vertex in &geometry.vertices {
            let length = Vec3::from_array(vertex.normal).length();
            assert!((length - 1.0).abs() < 1e-4, "normal length {}", length);
        }
    }

    fn assert_indices_in_range(geometry: &Geometry) {
        let count = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_cuboid_counts() {
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_unit_normals(&cube);
        assert_indices_in_range(&cube);
    }

    #[test]
    fn test_cuboid_extent() {
        let cube = Geometry::cuboid(2.0, 4.0, 6.0);
        for vertex in &cube.vertices {
            assert!(vertex.position[0].abs() <= 1.0 + 1e-6);
            assert!(vertex.position[1].abs() <= 2.0 + 1e-6);
            assert!(vertex.position[2].abs() <= 3.0 + 1e-6);
        }
    }

    #[test]
    fn test_cuboid_faces_point_outwards() {
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        for tri in cube.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from_array(cube.vertices[i as usize].position))
                .collect();
            let face_normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
            let vertex_normal = Vec3::from_array(cube.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(vertex_normal) > 0.99);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Geometry::sphere(0.5, 64, 64);
        assert_eq!(sphere.vertices.len(), 65 * 65);
        // pole rows contribute one triangle per segment instead of two
        assert_eq!(sphere.triangle_count(), 64 * 64 * 2 - 64 * 2);
        assert_unit_normals(&sphere);
        assert_indices_in_range(&sphere);
    }

    #[test]
    fn test_sphere_radius() {
        let sphere = Geometry::sphere(0.5, 16, 8);
        for vertex in &sphere.vertices {
            let r = Vec3::from_array(vertex.position).length();
            assert!((r - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_counts() {
        let plane = Geometry::plane(1.0, 1.0, 64, 64);
        assert_eq!(plane.vertices.len(), 65 * 65);
        assert_eq!(plane.indices.len(), 64 * 64 * 6);
        assert_indices_in_range(&plane);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_plane_uv_corners() {
        let plane = Geometry::plane(2.0, 2.0, 1, 1);
        assert_eq!(plane.vertices[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(plane.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(plane.vertices[3].position, [1.0, -1.0, 0.0]);
        assert_eq!(plane.vertices[3].uv, [1.0, 0.0]);
    }

    #[test]
    fn test_torus_counts() {
        let torus = Geometry::torus(0.35, 0.2, 64, 128);
        assert_eq!(torus.vertices.len(), 65 * 129);
        assert_eq!(torus.indices.len(), 64 * 128 * 6);
        assert_unit_normals(&torus);
        assert_indices_in_range(&torus);
    }

    #[test]
    fn test_torus_extent() {
        let torus = Geometry::torus(0.35, 0.2, 16, 32);
        for vertex in &torus.vertices {
            let p = Vec3::from_array(vertex.position);
            assert!(p.z.abs() <= 0.2 + 1e-5);
            let ring = (p.x * p.x + p.y * p.y).sqrt();
            assert!(ring >= 0.15 - 1e-5 && ring <= 0.55 + 1e-5);
        }
    }

    #[test]
    fn test_wireframe_dedupes_shared_edges() {
        // two triangles sharing the diagonal: 5 unique edges
        let quad = Geometry::plane(1.0, 1.0, 1, 1);
        assert_eq!(quad.wireframe_indices().len(), 5 * 2);

        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        assert_eq!(cube.wireframe_indices().len(), 6 * 5 * 2);
    }

    #[test]
    fn test_axes_lines() {
        let lines = axes_lines(3.0);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1].position, [3.0, 0.0, 0.0]);
        assert_eq!(lines[3].position, [0.0, 3.0, 0.0]);
        assert_eq!(lines[5].position, [0.0, 0.0, 3.0]);
    }
}
