//! KCL packer: orchestrates the welders, face records, and octree into one
//! binary collision payload.

use bytemuck::{Pod, Zeroable};
use serde::Deserialize;

use crate::emitter::ByteSink;
use crate::error::{GeometryOverflow, OverflowKind};
use crate::octree::Octree;
use crate::vector::{cross, dot, Vector};
use crate::weld::VertexWelder;

/// Octree tuning knobs, loadable from a collaborator's config file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub max_triangles: u32,
    pub min_width: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_triangles: 25, min_width: 8 }
    }
}

/// A single triangle, pre-validated and immutable once constructed.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub u: Vector,
    pub v: Vector,
    pub w: Vector,
    pub n: Vector,
    pub group_index: u32,
}

/// Degenerate triangles (raw cross product squared length < this) are
/// rejected at construction time and never enter the pipeline.
const DEGENERATE_THRESHOLD: f32 = 0.001;

impl Triangle {
    /// Construct a triangle from its three vertex positions and surface
    /// group. Returns `None` for degenerate (near-collinear) input.
    pub fn new(u: Vector, v: Vector, w: Vector, group_index: u32) -> Option<Self> {
        let raw_normal = cross(v - u, w - u);
        if raw_normal.norm_square() < DEGENERATE_THRESHOLD {
            return None;
        }
        Some(Self { u, v, w, n: raw_normal.unit(), group_index })
    }
}

/// 16-byte packed face record.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Face {
    pub length: f32,
    pub p_index: u16,
    pub n_index: u16,
    pub a_index: u16,
    pub b_index: u16,
    pub c_index: u16,
    pub group_index: u16,
}

/// Fixed 60-byte KCL header, written as a zeroed placeholder then
/// back-patched once every offset is known.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    pub vertex_offset: u32,
    pub normal_offset: u32,
    pub face_offset: u32,
    pub octree_offset: u32,
    pub unknown0: f32,
    pub base: Vector,
    pub x_mask: u32,
    pub y_mask: u32,
    pub z_mask: u32,
    pub coordinate_shift: u32,
    pub y_shift: u32,
    pub z_shift: u32,
}

const FACE_SIZE: u64 = std::mem::size_of::<Face>() as u64;

/// Write one complete KCL payload for `triangles` into `sink`, using octree
/// tuning loaded from a [`BuildOptions`] (e.g. deserialized from a
/// collaborator's config file) rather than passed as loose arguments.
pub fn pack_with_options(
    sink: &mut dyn ByteSink,
    triangles: &[Triangle],
    options: BuildOptions,
) -> anyhow::Result<()> {
    pack(sink, triangles, options.max_triangles as usize, options.min_width)
}

/// Write one complete KCL payload for `triangles` into `sink`.
///
/// `max_triangles` and `min_width` tune the octree; see
/// [`crate::octree::Octree::build`].
pub fn pack(
    sink: &mut dyn ByteSink,
    triangles: &[Triangle],
    max_triangles: usize,
    min_width: u32,
) -> anyhow::Result<()> {
    // The face list is indexed with a 16-bit count field, so it tops out one
    // below the all-ones sentinel.
    if triangles.len() >= 0xFFFE {
        anyhow::bail!(GeometryOverflow(OverflowKind::Faces));
    }

    let vertex_bucket_count = ((triangles.len() as f64) / 64.0).ceil() as usize;
    let normal_bucket_count = ((4 * triangles.len()) as f64 / 64.0).ceil() as usize;
    let mut vertex_welder = VertexWelder::new(2f32.powi(-1), vertex_bucket_count);
    let mut normal_welder = VertexWelder::new(2f32.powi(-22), normal_bucket_count);

    let mut faces = Vec::with_capacity(triangles.len());
    for triangle in triangles {
        let a = cross(triangle.u - triangle.w, triangle.n).unit();
        let b = cross(triangle.v - triangle.u, triangle.n).unit();
        let c = cross(triangle.w - triangle.v, triangle.n).unit();
        let length = dot(triangle.v - triangle.u, c);

        faces.push(Face {
            length,
            p_index: vertex_welder.add(triangle.u) as u16,
            n_index: normal_welder.add(triangle.n) as u16,
            a_index: normal_welder.add(a) as u16,
            b_index: normal_welder.add(b) as u16,
            c_index: normal_welder.add(c) as u16,
            group_index: triangle.group_index as u16,
        });
    }

    if vertex_welder.len() >= 0xFFFF {
        anyhow::bail!(GeometryOverflow(OverflowKind::Vertices));
    }
    if normal_welder.len() >= 0xFFFF {
        anyhow::bail!(GeometryOverflow(OverflowKind::Normals));
    }

    tracing::info!(
        faces = faces.len(),
        vertices = vertex_welder.len(),
        normals = normal_welder.len(),
        "welded geometry for KCL pack"
    );

    sink.write_bytes(&[0u8; std::mem::size_of::<Header>()])?;

    let vertex_offset = sink.tell()?;
    for vertex in vertex_welder.vertices() {
        crate::emitter::write_pod(sink, vertex)?;
    }

    let normal_offset = sink.tell()?;
    for normal in normal_welder.vertices() {
        crate::emitter::write_pod(sink, normal)?;
    }

    let face_offset = sink.tell()? - FACE_SIZE;
    for face in &faces {
        crate::emitter::write_pod(sink, face)?;
    }

    let octree_offset = sink.tell()?;
    let octree = Octree::build(triangles, max_triangles, min_width);
    octree.pack(sink)?;

    tracing::info!(
        vertex_offset, normal_offset, face_offset, octree_offset,
        base_width = octree.base_width, nx = octree.nx, ny = octree.ny, nz = octree.nz,
        "packed octree region"
    );

    let header = Header {
        vertex_offset: vertex_offset as u32,
        normal_offset: normal_offset as u32,
        face_offset: face_offset as u32,
        octree_offset: octree_offset as u32,
        base: octree.base,
        x_mask: !(octree.width_x - 1),
        y_mask: !(octree.width_y - 1),
        z_mask: !(octree.width_z - 1),
        coordinate_shift: octree.base_width.trailing_zeros(),
        y_shift: octree.nx.trailing_zeros(),
        z_shift: octree.nx.trailing_zeros() + octree.ny.trailing_zeros(),
        unknown0: 40.0,
    };

    sink.seek_to(0)?;
    crate::emitter::write_pod(sink, &header)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::VecSink;

    fn single_triangle() -> Vec<Triangle> {
        vec![Triangle::new(
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            0,
        )
        .unwrap()]
    }

    #[test]
    fn build_options_default_matches_examples_used_elsewhere() {
        let options = BuildOptions::default();
        assert_eq!(options.max_triangles, 25);
        assert_eq!(options.min_width, 8);
    }

    #[test]
    fn build_options_deserializes_from_partial_json() {
        let options: BuildOptions = serde_json::from_str(r#"{"max_triangles": 50}"#).unwrap();
        assert_eq!(options.max_triangles, 50);
        assert_eq!(options.min_width, 8);
    }

    #[test]
    fn pack_with_options_matches_pack() {
        let triangles = single_triangle();
        let mut a = VecSink::new();
        pack(&mut a, &triangles, 25, 8).unwrap();
        let mut b = VecSink::new();
        pack_with_options(&mut b, &triangles, BuildOptions::default()).unwrap();
        assert_eq!(a.into_bytes(), b.into_bytes());
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let u = Vector::new(0.0, 0.0, 0.0);
        let v = Vector::new(1.0, 0.0, 0.0);
        let w = u + 2.0 * (v - u);
        assert!(Triangle::new(u, v, w, 0).is_none());
    }

    #[test]
    fn single_triangle_welds_three_vertices_and_four_normals() {
        let triangles = single_triangle();
        let mut sink = VecSink::new();
        pack(&mut sink, &triangles, 25, 8).unwrap();
        let bytes = sink.into_bytes();
        assert!(bytes.len() > std::mem::size_of::<Header>());

        let header: &Header = bytemuck::from_bytes(&bytes[0..std::mem::size_of::<Header>()]);
        assert_eq!(header.unknown0, 40.0);
        // vertex region holds exactly 3 welded vertices (12 bytes each)
        assert_eq!(header.normal_offset - header.vertex_offset, 3 * 12);
        // normal region holds exactly 4 welded normals (face + 3 edges)
        assert_eq!(header.face_offset + FACE_SIZE as u32 - header.normal_offset, 4 * 12);
    }

    #[test]
    fn face_count_cap() {
        fn repeated_triangles(n: usize) -> Vec<Triangle> {
            let t = Triangle::new(
                Vector::new(0.0, 0.0, 0.0),
                Vector::new(1.0, 0.0, 0.0),
                Vector::new(0.0, 1.0, 0.0),
                0,
            )
            .unwrap();
            vec![t; n]
        }

        let ok = repeated_triangles(65533);
        let mut sink = VecSink::new();
        assert!(pack(&mut sink, &ok, 25, 8).is_ok());

        let overflow = repeated_triangles(65534);
        let mut sink = VecSink::new();
        let err = pack(&mut sink, &overflow, 25, 8).unwrap_err();
        assert!(err.to_string().contains("too many faces"));
    }
}
