//! Collision compiler core — triangle mesh to binary KCL + BCSV sidecar
//!
//! Converts an already-triangulated mesh into a binary collision payload
//! ("KCL") and a small structured-record sidecar ("PA") describing surface
//! properties per triangle group.
//!
//! - **Vertex welder**: spatial-hash dedup of near-coincident vertices.
//! - **Octree builder**: adaptive subdivision with top-level flattening.
//! - **KCL packer**: header back-patching, face records, octree region.
//! - **BCSV packer**: the `.pa` surface-type sidecar table.
//!
//! ## Example
//! ```no_run
//! use astraweave_collision_compiler::emitter::VecSink;
//! use astraweave_collision_compiler::kcl::{pack, Triangle};
//! use astraweave_collision_compiler::vector::Vector;
//!
//! # fn example() -> anyhow::Result<()> {
//! let triangles = vec![Triangle::new(
//!     Vector::new(0.0, 0.0, 0.0),
//!     Vector::new(1.0, 0.0, 0.0),
//!     Vector::new(0.0, 1.0, 0.0),
//!     0,
//! ).expect("non-degenerate")];
//!
//! let mut sink = VecSink::new();
//! pack(&mut sink, &triangles, 25, 8)?;
//! let kcl_bytes = sink.into_bytes();
//! # Ok(())
//! # }
//! ```
//!
//! This crate is synchronous and single-threaded by design: a build runs to
//! completion or fails fast, and callers that want to keep a GUI responsive
//! are expected to run [`kcl::pack`] on a worker of their own choosing. No
//! OBJ text parsing, mesh repair, or KCL deserialization is provided — those
//! are collaborator concerns outside this core.

pub mod bcsv;
pub mod emitter;
pub mod error;
pub mod kcl;
pub mod octree;
pub mod tribox;
pub mod vector;
pub mod weld;

pub use bcsv::{SurfaceType, FLOOR_CODES, SOUND_CODES, WALL_CODES};
pub use error::{FormatError, GeometryOverflow, OverflowKind};
pub use kcl::{pack, pack_with_options, BuildOptions, Triangle};
pub use octree::Octree;
