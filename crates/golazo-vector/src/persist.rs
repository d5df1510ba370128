//! On-disk layout of a saved store.
//!
//! A store directory holds two index-aligned files:
//! - `vectors.npy` - NPY v1.0 matrix, little-endian f32, shape `(n, d)`
//! - `metadata.json` - array of `{id, text, metadata}` in entry order
//!
//! Matrices written by numpy as `<f8` are accepted and narrowed to f32.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use golazo_core::error::{GolazoError, Result};

use crate::store::Metadata;

pub const VECTORS_FILE: &str = "vectors.npy";
pub const METADATA_FILE: &str = "metadata.json";

const NPY_MAGIC: &[u8] = b"\x93NUMPY";
/// Magic, two version bytes and the u16 header length.
const NPY_PREAMBLE_V1: usize = NPY_MAGIC.len() + 2 + 2;
const NPY_ALIGNMENT: usize = 64;

/// One row of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

pub fn write_records(path: &Path, records: &[PersistedRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<PersistedRecord>> {
    if !path.is_file() {
        return Err(GolazoError::Persistence(format!(
            "metadata file not found: {}",
            path.display()
        )));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write `matrix` as an NPY v1.0 file of `<f4` values in C order.
pub fn write_matrix(path: &Path, matrix: ArrayView2<'_, f32>) -> Result<()> {
    let (rows, cols) = matrix.dim();
    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows, cols
    );
    // Pad with spaces so the data starts on an aligned offset; the header
    // always ends with a newline.
    let unpadded = NPY_PREAMBLE_V1 + header.len() + 1;
    let padding = (NPY_ALIGNMENT - unpadded % NPY_ALIGNMENT) % NPY_ALIGNMENT;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let header_len = u16::try_from(header.len())
        .map_err(|_| GolazoError::Persistence("NPY header too long".to_string()))?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(NPY_MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&header_len.to_le_bytes())?;
    writer.write_all(header.as_bytes())?;
    for value in matrix.iter() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a 2-D NPY matrix of `<f4` or `<f8` values in C order.
pub fn read_matrix(path: &Path) -> Result<Array2<f32>> {
    let bytes = std::fs::read(path)?;
    let (header, data) = split_npy(&bytes)?;
    let header = NpyHeader::parse(header)?;

    let count = header
        .rows
        .checked_mul(header.cols)
        .ok_or_else(shape_overflow)?;
    let values: Vec<f32> = match header.descr.as_str() {
        "<f4" => decode(data, count, 4, |chunk| {
            f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        })?,
        "<f8" => decode(data, count, 8, |chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw) as f32
        })?,
        other => {
            return Err(GolazoError::Persistence(format!(
                "unsupported NPY dtype {}",
                other
            )))
        }
    };

    Array2::from_shape_vec((header.rows, header.cols), values)
        .map_err(|e| GolazoError::Persistence(format!("NPY shape: {}", e)))
}

fn split_npy(bytes: &[u8]) -> Result<(&str, &[u8])> {
    if bytes.len() < NPY_PREAMBLE_V1 || !bytes.starts_with(NPY_MAGIC) {
        return Err(GolazoError::Persistence("not an NPY file".to_string()));
    }

    let major = bytes[NPY_MAGIC.len()];
    let (header_len, header_start) = match major {
        1 => (
            u16::from_le_bytes([bytes[8], bytes[9]]) as usize,
            NPY_PREAMBLE_V1,
        ),
        2 | 3 if bytes.len() >= 12 => (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        ),
        _ => {
            return Err(GolazoError::Persistence(format!(
                "unsupported NPY version {}",
                major
            )))
        }
    };

    let header_end = header_start + header_len;
    if bytes.len() < header_end {
        return Err(GolazoError::Persistence("truncated NPY header".to_string()));
    }
    let header = std::str::from_utf8(&bytes[header_start..header_end])
        .map_err(|e| GolazoError::Persistence(format!("NPY header: {}", e)))?;
    Ok((header, &bytes[header_end..]))
}

fn decode(
    data: &[u8],
    count: usize,
    width: usize,
    convert: impl Fn(&[u8]) -> f32,
) -> Result<Vec<f32>> {
    let byte_len = count.checked_mul(width).ok_or_else(shape_overflow)?;
    if data.len() < byte_len {
        return Err(GolazoError::Persistence(format!(
            "NPY data truncated: expected {} values",
            count
        )));
    }
    Ok(data[..byte_len].chunks_exact(width).map(convert).collect())
}

fn shape_overflow() -> GolazoError {
    GolazoError::Persistence("NPY shape overflows".to_string())
}

#[derive(Debug, PartialEq)]
struct NpyHeader {
    descr: String,
    rows: usize,
    cols: usize,
}

impl NpyHeader {
    /// Parse the Python dict literal numpy writes, e.g.
    /// `{'descr': '<f4', 'fortran_order': False, 'shape': (3, 384), }`.
    fn parse(header: &str) -> Result<Self> {
        let descr = quoted_value(header, "descr")
            .ok_or_else(|| GolazoError::Persistence("NPY header lacks descr".to_string()))?;

        if header.contains("'fortran_order': True") {
            return Err(GolazoError::Persistence(
                "Fortran-ordered NPY matrices are not supported".to_string(),
            ));
        }

        let shape_start = header
            .find("'shape':")
            .and_then(|i| header[i..].find('(').map(|j| i + j + 1))
            .ok_or_else(|| GolazoError::Persistence("NPY header lacks shape".to_string()))?;
        let shape_end = header[shape_start..]
            .find(')')
            .map(|j| shape_start + j)
            .ok_or_else(|| GolazoError::Persistence("unterminated NPY shape".to_string()))?;

        let dims = header[shape_start..shape_end]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|e| GolazoError::Persistence(format!("NPY shape {:?}: {}", s, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        match dims.as_slice() {
            [rows, cols] => Ok(Self {
                descr,
                rows: *rows,
                cols: *cols,
            }),
            other => Err(GolazoError::Persistence(format!(
                "expected a 2-D NPY matrix, got shape {:?}",
                other
            ))),
        }
    }
}

fn quoted_value(header: &str, key: &str) -> Option<String> {
    let key = format!("'{}':", key);
    let rest = &header[header.find(&key)? + key.len()..];
    let start = rest.find('\'')? + 1;
    let end = start + rest[start..].find('\'')?;
    Some(rest[start..end].to_string())
}
