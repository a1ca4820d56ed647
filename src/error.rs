//! Error types for the collision compiler core.

use thiserror::Error;

/// The three fatal overflow conditions the KCL packer can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowKind {
    Faces,
    Vertices,
    Normals,
}

impl std::fmt::Display for OverflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverflowKind::Faces => "too many faces",
            OverflowKind::Vertices => "too many vertices",
            OverflowKind::Normals => "too many normals",
        };
        f.write_str(s)
    }
}

/// Raised when a mesh exceeds the 16-bit index space the KCL format uses.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("geometry overflow: {0}")]
pub struct GeometryOverflow(pub OverflowKind);

/// Raised by the BCSV decoder on an unrecognized field `data_type`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid field data type: {0}")]
    InvalidDataType(u8),
    #[error("field list does not match expected schema")]
    SchemaMismatch,
    #[error("truncated BCSV stream")]
    Truncated,
}
