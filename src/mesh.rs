//! CPU-side mesh data for the two shapes the demo draws. Upload to the GPU
//! happens in the wasm layer; the data itself is host-testable.

use crate::error::HiveError;

/// Primitive topology for a vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    TriangleFan,
}

/// Immutable vertex positions and colors plus the topology to draw them with.
/// One `MeshData` may back any number of drawables; the hexagon is shared by
/// every hive tile.
#[derive(Debug, Clone)]
pub struct MeshData {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    topology: Topology,
}

impl MeshData {
    pub fn new(
        positions: Vec<[f32; 3]>,
        colors: Vec<[f32; 4]>,
        topology: Topology,
    ) -> Result<Self, HiveError> {
        if positions.len() != colors.len() {
            return Err(HiveError::MeshMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        Ok(Self {
            positions,
            colors,
            topology,
        })
    }

    /// Three-sided arrow head, one RGB corner per face.
    pub fn arrow() -> Self {
        let tip = [1.0, 0.0, 0.0];
        let back_up = [-1.0, 0.866, -0.5];
        let back_down = [-1.0, -0.866, -0.5];
        let back_out = [-1.0, 0.0, 1.0];

        let positions = vec![
            tip, back_up, back_down, //
            tip, back_up, back_out, //
            tip, back_down, back_out,
        ];
        let corner_colors = [
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        let colors = (0..3).flat_map(|_| corner_colors).collect();

        Self::new(positions, colors, Topology::Triangles)
            .unwrap_or_else(|_| unreachable!("arrow vertex tables match"))
    }

    /// Unit hexagon as a triangle fan: center plus seven rim vertices (the
    /// first rim vertex repeats to close the fan), all white.
    pub fn hexagon() -> Self {
        let mut positions = vec![[0.0, 0.0, 0.0]];
        let step = std::f32::consts::PI / 3.0;
        for i in 0..=6 {
            let a = i as f32 * step;
            positions.push([a.cos(), a.sin(), 0.0]);
        }
        let colors = vec![[1.0, 1.0, 1.0, 1.0]; positions.len()];

        Self::new(positions, colors, Topology::TriangleFan)
            .unwrap_or_else(|_| unreachable!("hexagon vertex tables match"))
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions flattened for buffer upload.
    pub fn position_floats(&self) -> Vec<f32> {
        self.positions.iter().flatten().copied().collect()
    }

    pub fn color_floats(&self) -> Vec<f32> {
        self.colors.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_counts_are_rejected() {
        let err = MeshData::new(
            vec![[0.0; 3], [1.0; 3]],
            vec![[1.0; 4]],
            Topology::Triangles,
        );
        assert!(matches!(
            err,
            Err(HiveError::MeshMismatch {
                positions: 2,
                colors: 1
            })
        ));
    }

    #[test]
    fn hexagon_fan_has_center_plus_closed_rim() {
        let hex = MeshData::hexagon();
        assert_eq!(hex.vertex_count(), 8);
        assert_eq!(hex.topology(), Topology::TriangleFan);
        // fan closes: last rim vertex coincides with the first
        let rim_first = hex.positions()[1];
        let rim_last = hex.positions()[7];
        assert!((rim_first[0] - rim_last[0]).abs() < 1e-5);
        assert!((rim_first[1] - rim_last[1]).abs() < 1e-5);
        // unit radius
        for v in &hex.positions()[1..] {
            let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn arrow_is_three_triangles() {
        let arrow = MeshData::arrow();
        assert_eq!(arrow.vertex_count(), 9);
        assert_eq!(arrow.topology(), Topology::Triangles);
        assert_eq!(arrow.position_floats().len(), 27);
        assert_eq!(arrow.color_floats().len(), 36);
    }
}
