use std::f32::consts::TAU;

/// Indexed triangle mesh data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Flat disc in the XY plane facing +Z: a center vertex plus `segments + 1` rim
    /// vertices (the seam is duplicated so UVs stay continuous).
    pub fn circle(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut g = Geometry::default();

        g.positions.push([0.0, 0.0, 0.0]);
        g.normals.push([0.0, 0.0, 1.0]);
        g.uvs.push([0.5, 0.5]);

        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let (x, y) = (radius * cos, radius * sin);
            g.positions.push([x, y, 0.0]);
            g.normals.push([0.0, 0.0, 1.0]);
            g.uvs.push([(cos + 1.0) * 0.5, (sin + 1.0) * 0.5]);
        }

        for i in 1..=segments {
            g.indices.extend_from_slice(&[i, i + 1, 0]);
        }
        g
    }

    /// Axis-aligned box centered on the origin with per-face normals.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
        // (normal, tangent u, tangent v) per face; corners are n ± u ± v.
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut g = Geometry::default();
        for (n, u, v) in faces {
            let base = g.positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = [
                    (n[0] + su * u[0] + sv * v[0]) * hx,
                    (n[1] + su * u[1] + sv * v[1]) * hy,
                    (n[2] + su * u[2] + sv * v[2]) * hz,
                ];
                g.positions.push(p);
                g.normals.push(n);
                g.uvs.push([(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
            }
            g.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        g
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Attribute arrays agree in length and every index is in range.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.uvs.len() == n
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn circle_has_center_plus_closed_rim() {
        let g = Geometry::circle(5.0, 64);
        assert_eq!(g.vertex_count(), 1 + 65);
        assert_eq!(g.triangle_count(), 64);
        assert!(g.is_valid());

        let [x, y, _] = g.positions[1];
        assert_relative_eq!((x * x + y * y).sqrt(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn circle_clamps_degenerate_segment_count() {
        assert_eq!(Geometry::circle(1.0, 0).triangle_count(), 3);
    }

    #[test]
    fn cuboid_spans_its_extents() {
        let g = Geometry::cuboid(2.0, 4.0, 6.0);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        assert!(g.is_valid());

        let max_y = g.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        let min_z = g.positions.iter().map(|p| p[2]).fold(f32::MAX, f32::min);
        assert_relative_eq!(max_y, 2.0);
        assert_relative_eq!(min_z, -3.0);
    }
}
