//! Record type for stored rows.

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;
use crate::value::{Row, Value};

/// A single stored field.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct RecordField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: Value,
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Record {
    /// Stored fields in name order.
    pub fields: Vec<RecordField>,
}

impl Record {
    /// Create a record from a row.
    pub fn new(row: &Row) -> Self {
        Self {
            fields: row
                .iter()
                .map(|(name, value)| RecordField {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    /// Convert back to a row.
    pub fn to_row(&self) -> Row {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        // sled hands out buffers without alignment guarantees.
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
