//! Approximate nearest-neighbour primitive.
//!
//! The dense index only talks to the ANN backend through [`AnnBuilder`] and
//! [`AnnIndex`], so an HNSW or IVF backend can replace [`FlatAnn`] without
//! touching the index lifecycle. Vectors are expected to be unit length and
//! similarity is the inner product.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rayon::prelude::*;

use crate::error::{ModelseekError, Result};
use crate::vector::core::vector::Vector;

/// A built, searchable nearest-neighbour index.
pub trait AnnIndex: Send + Sync + std::fmt::Debug {
    /// Top `k` neighbours of `query` as `(internal index, similarity)`,
    /// highest similarity first.
    fn search(&self, query: &Vector, k: usize) -> Vec<(usize, f32)>;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension.
    fn dimension(&self) -> usize;

    /// Serialize the index.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Builds and reloads [`AnnIndex`] instances of one backend.
pub trait AnnBuilder: Send + Sync + std::fmt::Debug {
    /// Build an index over `vectors`; internal indices follow input order.
    fn build(&self, vectors: Vec<Vector>) -> Result<Box<dyn AnnIndex>>;

    /// Reload an index produced by [`AnnIndex::to_bytes`].
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn AnnIndex>>;

    /// Backend name.
    fn name(&self) -> &str;
}

const FLAT_MAGIC: u32 = 0x4E41_534D; // "MSAN" little-endian
const FLAT_VERSION: u32 = 1;
const FLAT_HEADER_LEN: usize = 4 + 4 + 4 + 8;
const CHECKSUM_LEN: usize = 4;

/// Exact inner-product search over a contiguous matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatAnn {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatAnn {
    /// Build from vectors of identical dimension.
    pub fn from_vectors(vectors: Vec<Vector>) -> Result<Self> {
        let dimension = vectors.first().map(Vector::dimension).unwrap_or(0);
        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            vector.validate_dimension(dimension)?;
            data.extend(vector.data);
        }
        Ok(Self { dimension, data })
    }

    /// Decode the checksummed binary layout written by [`AnnIndex::to_bytes`].
    ///
    /// Layout (little-endian): magic `u32`, version `u32`, dimension `u32`,
    /// count `u64`, `count * dimension` `f32` values, CRC32 `u32` over all
    /// preceding bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FLAT_HEADER_LEN + CHECKSUM_LEN {
            return Err(ModelseekError::corrupt_index(format!(
                "ANN data too short: {} bytes",
                bytes.len()
            )));
        }

        let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        let stored_checksum = Cursor::new(trailer)
            .read_u32::<LittleEndian>()
            .map_err(|e| ModelseekError::corrupt_index(e.to_string()))?;
        let checksum = crc32fast::hash(body);
        if checksum != stored_checksum {
            return Err(ModelseekError::corrupt_index(format!(
                "ANN checksum mismatch: stored {stored_checksum:#010x}, computed {checksum:#010x}"
            )));
        }

        let mut reader = Cursor::new(body);
        let read_err = |e: std::io::Error| ModelseekError::corrupt_index(e.to_string());

        let magic = reader.read_u32::<LittleEndian>().map_err(read_err)?;
        if magic != FLAT_MAGIC {
            return Err(ModelseekError::corrupt_index(format!(
                "bad ANN magic {magic:#010x}"
            )));
        }
        let version = reader.read_u32::<LittleEndian>().map_err(read_err)?;
        if version != FLAT_VERSION {
            return Err(ModelseekError::corrupt_index(format!(
                "unsupported ANN version {version}"
            )));
        }
        let dimension = reader.read_u32::<LittleEndian>().map_err(read_err)? as usize;
        let count = reader.read_u64::<LittleEndian>().map_err(read_err)? as usize;

        let expected = count
            .checked_mul(dimension)
            .and_then(|values| values.checked_mul(4))
            .ok_or_else(|| ModelseekError::corrupt_index("ANN size overflow"))?;
        if body.len() - FLAT_HEADER_LEN != expected {
            return Err(ModelseekError::corrupt_index(format!(
                "ANN payload is {} bytes, header declares {expected}",
                body.len() - FLAT_HEADER_LEN
            )));
        }

        let mut data = vec![0.0f32; count * dimension];
        reader
            .read_f32_into::<LittleEndian>(&mut data)
            .map_err(read_err)?;

        Ok(Self { dimension, data })
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dimension..(i + 1) * self.dimension]
    }
}

impl AnnIndex for FlatAnn {
    fn search(&self, query: &Vector, k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.dimension == 0 || query.dimension() != self.dimension {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .into_par_iter()
            .map(|i| {
                let similarity = self
                    .row(i)
                    .iter()
                    .zip(query.data.iter())
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
                (i, similarity)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer =
            Vec::with_capacity(FLAT_HEADER_LEN + self.data.len() * 4 + CHECKSUM_LEN);
        buffer.write_u32::<LittleEndian>(FLAT_MAGIC)?;
        buffer.write_u32::<LittleEndian>(FLAT_VERSION)?;
        buffer.write_u32::<LittleEndian>(self.dimension as u32)?;
        buffer.write_u64::<LittleEndian>(self.len() as u64)?;
        for value in &self.data {
            buffer.write_f32::<LittleEndian>(*value)?;
        }
        let checksum = crc32fast::hash(&buffer);
        buffer.write_u32::<LittleEndian>(checksum)?;
        Ok(buffer)
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// Builder for [`FlatAnn`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatAnnBuilder;

impl AnnBuilder for FlatAnnBuilder {
    fn build(&self, vectors: Vec<Vector>) -> Result<Box<dyn AnnIndex>> {
        Ok(Box::new(FlatAnn::from_vectors(vectors)?))
    }

    fn load(&self, bytes: &[u8]) -> Result<Box<dyn AnnIndex>> {
        Ok(Box::new(FlatAnn::from_bytes(bytes)?))
    }

    fn name(&self) -> &str {
        "flat"
    }
}
