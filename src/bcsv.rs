//! BCSV sidecar table: the PA file describing per-group surface properties.
//!
//! A tiny structured-record format: a fixed header, field descriptors, one
//! fixed-size row per entry, a Shift-JIS string pool, then `0x40` padding to
//! a 32-byte boundary. The row/field machinery (`BcsvField`, `FieldValue`,
//! `pack_rows`/`decode_rows`) is generic over the original's six wire types
//! even though the one schema this crate ships — [`SurfaceType`] — only
//! ever uses `UINT32` fields at a shared offset.

use std::collections::HashMap;

use crate::error::FormatError;

/// One of the six primitive wire types a BCSV field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Uint32,
    Float32,
    Sint32,
    Sint16,
    Sint8,
    String,
}

impl DataType {
    fn from_tag(tag: u8) -> Result<Self, FormatError> {
        match tag {
            0 => Ok(DataType::Uint32),
            2 => Ok(DataType::Float32),
            3 => Ok(DataType::Sint32),
            4 => Ok(DataType::Sint16),
            5 => Ok(DataType::Sint8),
            6 => Ok(DataType::String),
            other => Err(FormatError::InvalidDataType(other)),
        }
    }

    fn tag(self) -> u8 {
        match self {
            DataType::Uint32 => 0,
            DataType::Float32 => 2,
            DataType::Sint32 => 3,
            DataType::Sint16 => 4,
            DataType::Sint8 => 5,
            DataType::String => 6,
        }
    }

    fn data_size(self) -> u32 {
        match self {
            DataType::Uint32 | DataType::Float32 | DataType::Sint32 | DataType::String => 4,
            DataType::Sint16 => 2,
            DataType::Sint8 => 1,
        }
    }
}

/// A field descriptor, as laid out on disk (12 bytes): name hash, bit mask,
/// byte offset, bit shift, wire type.
#[derive(Debug, Clone)]
pub struct BcsvField {
    pub name: &'static str,
    pub name_hash: u32,
    pub offset: u16,
    pub shift: u8,
    pub mask: u32,
    pub data_type: DataType,
}

impl BcsvField {
    pub fn new(name: &'static str, offset: u16, mask: u32, shift: u8, data_type: DataType) -> Self {
        Self { name, name_hash: calculate_name_hash(name), offset, shift, mask, data_type }
    }
}

/// `h = 0; for c in name: h = (h*31 + codepoint(c)) mod 2^32`.
pub fn calculate_name_hash(name: &str) -> u32 {
    let mut h: u32 = 0;
    for c in name.chars() {
        h = h.wrapping_mul(31).wrapping_add(c as u32);
    }
    h
}

/// A decoded field value, tagged by the wire type it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Uint32(u32),
    Float32(f32),
    Sint32(i32),
    Sint16(i16),
    Sint8(i8),
    Str(String),
}

/// A row type that can supply a value for each named BCSV field.
pub trait BcsvRow {
    fn field_value(&self, name: &str) -> FieldValue;
}

const PADDING_BYTE: u8 = 0x40;
const ALIGNMENT: usize = 0x20;
const HEADER_SIZE: u32 = 16;
const FIELD_DESC_SIZE: u32 = 12;

fn align_up(value: u32, boundary: u32) -> u32 {
    value.div_ceil(boundary) * boundary
}

/// Encode `entries` against `fields` into one complete BCSV payload.
pub fn pack_rows<T: BcsvRow>(fields: &[BcsvField], entries: &[T]) -> Vec<u8> {
    let entry_size =
        align_up(fields.iter().map(|f| f.offset as u32 + f.data_type.data_size()).max().unwrap_or(0), 4);
    let entry_offset = HEADER_SIZE + fields.len() as u32 * FIELD_DESC_SIZE;

    let mut out = Vec::new();
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    out.extend_from_slice(&(fields.len() as u32).to_le_bytes());
    out.extend_from_slice(&entry_offset.to_le_bytes());
    out.extend_from_slice(&entry_size.to_le_bytes());

    for field in fields {
        out.extend_from_slice(&field.name_hash.to_le_bytes());
        out.extend_from_slice(&field.mask.to_le_bytes());
        out.extend_from_slice(&field.offset.to_le_bytes());
        out.push(field.shift);
        out.push(field.data_type.tag());
    }

    let mut string_pool: Vec<u8> = Vec::new();
    let mut string_table: HashMap<String, u32> = HashMap::new();

    for entry in entries {
        let mut row = vec![0u8; entry_size as usize];
        for field in fields {
            let offset = field.offset as usize;
            match (field.data_type, entry.field_value(field.name)) {
                (DataType::Uint32, FieldValue::Uint32(value)) => {
                    let current = u32::from_le_bytes(row[offset..offset + 4].try_into().unwrap());
                    let new_value = (value << field.shift) | current;
                    row[offset..offset + 4].copy_from_slice(&new_value.to_le_bytes());
                }
                (DataType::Float32, FieldValue::Float32(value)) => {
                    row[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
                }
                (DataType::Sint32, FieldValue::Sint32(value)) => {
                    row[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
                }
                (DataType::Sint16, FieldValue::Sint16(value)) => {
                    row[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
                }
                (DataType::Sint8, FieldValue::Sint8(value)) => {
                    row[offset] = value as u8;
                }
                (DataType::String, FieldValue::Str(value)) => {
                    let pool_offset = *string_table.entry(value.clone()).or_insert_with(|| {
                        let offset = string_pool.len() as u32;
                        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(&value);
                        string_pool.extend_from_slice(&encoded);
                        string_pool.push(0);
                        offset
                    });
                    row[offset..offset + 4].copy_from_slice(&pool_offset.to_le_bytes());
                }
                (expected, got) => {
                    panic!("field {} expects {:?}, row supplied {:?}", field.name, expected, got);
                }
            }
        }
        out.extend_from_slice(&row);
    }

    out.extend_from_slice(&string_pool);

    let remainder = out.len() % ALIGNMENT;
    if remainder != 0 {
        out.resize(out.len() + (ALIGNMENT - remainder), PADDING_BYTE);
    }

    out
}

/// Decode a BCSV payload into per-row field maps, validating each row
/// against `expected_fields` (name hash + wire type must match).
pub fn decode_rows(
    bytes: &[u8],
    expected_fields: &[BcsvField],
) -> Result<Vec<HashMap<&'static str, FieldValue>>, FormatError> {
    if bytes.len() < HEADER_SIZE as usize {
        return Err(FormatError::Truncated);
    }
    let entry_count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let field_count = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    let entry_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
    let entry_size = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;

    if field_count != expected_fields.len() {
        return Err(FormatError::SchemaMismatch);
    }

    let mut fields = Vec::with_capacity(field_count);
    let mut cursor = HEADER_SIZE as usize;
    for _ in 0..field_count {
        if bytes.len() < cursor + 12 {
            return Err(FormatError::Truncated);
        }
        let name_hash = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
        let offset = u16::from_le_bytes(bytes[cursor + 8..cursor + 10].try_into().unwrap());
        let mask = u32::from_le_bytes(bytes[cursor + 4..cursor + 8].try_into().unwrap());
        let shift = bytes[cursor + 10];
        let data_type = DataType::from_tag(bytes[cursor + 11])?;

        let expected = expected_fields
            .iter()
            .find(|f| f.name_hash == name_hash)
            .ok_or(FormatError::SchemaMismatch)?;
        fields.push((expected.name, mask, offset, shift, data_type));
        cursor += 12;
    }

    let string_pool = &bytes[entry_offset + entry_count * entry_size..];

    let mut rows = Vec::with_capacity(entry_count);
    for row_index in 0..entry_count {
        let row_start = entry_offset + row_index * entry_size;
        if bytes.len() < row_start + entry_size {
            return Err(FormatError::Truncated);
        }
        let row = &bytes[row_start..row_start + entry_size];

        let mut values = HashMap::with_capacity(fields.len());
        for (name, mask, offset, shift, data_type) in &fields {
            let offset = *offset as usize;
            let value = match data_type {
                DataType::Uint32 => {
                    let raw = u32::from_le_bytes(row[offset..offset + 4].try_into().unwrap());
                    FieldValue::Uint32((raw & mask) >> shift)
                }
                DataType::Float32 => {
                    FieldValue::Float32(f32::from_le_bytes(row[offset..offset + 4].try_into().unwrap()))
                }
                DataType::Sint32 => {
                    FieldValue::Sint32(i32::from_le_bytes(row[offset..offset + 4].try_into().unwrap()))
                }
                DataType::Sint16 => {
                    FieldValue::Sint16(i16::from_le_bytes(row[offset..offset + 2].try_into().unwrap()))
                }
                DataType::Sint8 => FieldValue::Sint8(row[offset] as i8),
                DataType::String => {
                    let pool_offset =
                        u32::from_le_bytes(row[offset..offset + 4].try_into().unwrap()) as usize;
                    let end = string_pool[pool_offset..]
                        .iter()
                        .position(|&b| b == 0)
                        .map(|n| pool_offset + n)
                        .ok_or(FormatError::Truncated)?;
                    let (decoded, _, _) = encoding_rs::SHIFT_JIS.decode(&string_pool[pool_offset..end]);
                    FieldValue::Str(decoded.into_owned())
                }
            };
            values.insert(*name, value);
        }
        rows.push(values);
    }

    Ok(rows)
}

/// `camera_id`, `sound_code`, `floor_code`, `wall_code`, `camera_through`,
/// packed into one shared `u32` at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceType {
    pub camera_id: u8,
    pub sound_code: u8,
    pub floor_code: u8,
    pub wall_code: u8,
    pub camera_through: bool,
}

impl Default for SurfaceType {
    fn default() -> Self {
        Self { camera_id: 0xFF, sound_code: 0, floor_code: 0, wall_code: 0, camera_through: false }
    }
}

impl BcsvRow for SurfaceType {
    fn field_value(&self, name: &str) -> FieldValue {
        match name {
            "camera_id" => FieldValue::Uint32(self.camera_id as u32),
            "Sound_code" => FieldValue::Uint32(self.sound_code as u32),
            "Floor_code" => FieldValue::Uint32(self.floor_code as u32),
            "Wall_code" => FieldValue::Uint32(self.wall_code as u32),
            "Camera_through" => FieldValue::Uint32(self.camera_through as u32),
            other => panic!("unknown surface-type field {other}"),
        }
    }
}

/// Enum-index names for `SurfaceType::sound_code`; does not affect the
/// on-disk encoding (still a raw index) but is handy for logs/UIs.
pub const SOUND_CODES: &[&str] = &[
    "null", "Soil", "Lawn", "Stone", "Marble", "Wood Thick", "Wood Thin", "Metal", "Snow", "Ice",
    "Shallow", "Beach", "unknown", "Carpet", "Mud", "Honey", "Metal Heavy", "Marble Snow",
    "Marble Soil", "Metal Soil", "Cloud", "Marble Beach", "Marble Sand",
];

pub const FLOOR_CODES: &[&str] = &[
    "Normal", "Death", "Slip", "No Slip", "Damage Normal", "Ice", "Jump Low", "Jump Middle",
    "Jump High", "Slider", "Damage Fire", "Jump Normal", "Fire Dance", "Sand", "Glass",
    "Damage Electric", "Pull Back", "Sink", "Sink Poison", "Slide", "Water Bottom H",
    "Water Bottom M", "Water Bottom L", "Shallow", "Needle", "Sink Death", "Snow", "Rail Move",
    "Area Move", "Press", "No Stamp Sand", "Sink Death Mud", "Brake", "Glass Ice",
    "Jump Parasol", "unknown", "No Dig", "Lawn", "Cloud", "Press And No Slip", "Force Dash",
    "Dark Matter", "Dust", "Snow And No Slip",
];

pub const WALL_CODES: &[&str] = &[
    "Normal", "Not Wall Jump", "Not Wall Slip", "Not Grap", "Ghost Through", "Not Side Step",
    "Rebound", "Honey", "No Action",
];

fn surface_type_fields() -> [BcsvField; 5] {
    [
        BcsvField::new("camera_id", 0, 0x0000_00FF, 0, DataType::Uint32),
        BcsvField::new("Sound_code", 0, 0x0000_7F00, 8, DataType::Uint32),
        BcsvField::new("Floor_code", 0, 0x001F_8000, 15, DataType::Uint32),
        BcsvField::new("Wall_code", 0, 0x01E0_0000, 21, DataType::Uint32),
        BcsvField::new("Camera_through", 0, 0x0200_0000, 25, DataType::Uint32),
    ]
}

/// Encode `entries` into one complete BCSV (`.pa`) payload.
pub fn pack(entries: &[SurfaceType]) -> Vec<u8> {
    pack_rows(&surface_type_fields(), entries)
}

/// Decode a BCSV payload produced by [`pack`] back into `SurfaceType`
/// entries. Returns [`FormatError`] on an unrecognized field `data_type`
/// or a field set that doesn't match the fixed surface-type schema.
pub fn decode(bytes: &[u8]) -> Result<Vec<SurfaceType>, FormatError> {
    let rows = decode_rows(bytes, &surface_type_fields())?;
    rows.into_iter()
        .map(|row| {
            let get_u32 = |name: &str| match row.get(name) {
                Some(FieldValue::Uint32(v)) => Ok(*v),
                _ => Err(FormatError::SchemaMismatch),
            };
            Ok(SurfaceType {
                camera_id: get_u32("camera_id")? as u8,
                sound_code: get_u32("Sound_code")? as u8,
                floor_code: get_u32("Floor_code")? as u8,
                wall_code: get_u32("Wall_code")? as u8,
                camera_through: get_u32("Camera_through")? != 0,
            })
        })
        .collect()
}
