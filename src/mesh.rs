// mesh.rs — upright textured quads for the image plane and the title label

#[derive(Debug, Clone)]
pub struct PlaneMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

/// A `width` × `height` quad standing in the XZ plane, facing -Y, centered on
/// `center`. Texture row 0 is at the top (+Z).
pub fn build_plane(width: f32, height: f32, center: [f32; 3]) -> PlaneMesh {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let [cx, cy, cz] = center;

    let positions = vec![
        [cx - hw, cy, cz + hh],
        [cx + hw, cy, cz + hh],
        [cx + hw, cy, cz - hh],
        [cx - hw, cy, cz - hh],
    ];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    // counter-clockwise seen from -Y
    let indices = vec![0, 3, 2, 0, 2, 1];

    PlaneMesh {
        positions,
        uvs,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_centered_and_upright() {
        let m = build_plane(10.0, 5.0, [0.0, 0.0, 256.0]);
        assert_eq!(m.positions.len(), 4);
        assert_eq!(m.indices.len(), 6);
        assert!(m.positions.iter().all(|p| p[1] == 0.0));
        let (min_z, max_z) = m
            .positions
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p[2]), hi.max(p[2])));
        assert_eq!((min_z, max_z), (253.5, 258.5));
    }

    #[test]
    fn top_edge_samples_texture_row_zero() {
        let m = build_plane(2.0, 2.0, [0.0, 0.0, 0.0]);
        for (p, uv) in m.positions.iter().zip(&m.uvs) {
            assert_eq!(uv[1] == 0.0, p[2] > 0.0);
        }
    }

    #[test]
    fn triangles_face_the_observer() {
        // the default observer stands on -Y; front faces must have a -Y normal
        let m = build_plane(2.0, 2.0, [0.0, 0.0, 0.0]);
        for tri in m.indices.chunks(3) {
            let a = glam::Vec3::from(m.positions[tri[0] as usize]);
            let b = glam::Vec3::from(m.positions[tri[1] as usize]);
            let c = glam::Vec3::from(m.positions[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            assert!(normal.y < 0.0);
        }
    }
}
