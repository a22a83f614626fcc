//! The fixed 8-byte Escher record header.
//!
//! # Format
//!
//! - Byte 0, low nibble: version (0xF marks a container)
//! - Byte 0, high nibble + byte 1: instance (12 bits)
//! - Bytes 2-3: record type tag (little-endian)
//! - Bytes 4-7: payload length (little-endian, excludes the header)

use crate::error::{EscherError, Result};
use zerocopy::{
    FromBytes, IntoBytes,
    byteorder::{LittleEndian, U16, U32},
};
use zerocopy_derive::*;

/// Wire layout of the 8-byte header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RawHeader {
    ver_inst: U16<LittleEndian>,
    record_type: U16<LittleEndian>,
    length: U32<LittleEndian>,
}

/// Decoded Escher record header.
///
/// `length` always reflects the most recent serialization of the owning
/// record's payload; it is recomputed on every serialize and never trusted
/// from a stale cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record type tag (`MSOFBT*`)
    pub record_type: u16,
    /// Instance field (12 bits); meaning depends on the record type
    pub instance: u16,
    /// Version field (4 bits)
    pub version: u8,
    /// Payload length in bytes
    pub length: u32,
}

impl RecordHeader {
    /// Encoded size of the header.
    pub const SIZE: usize = 8;

    /// Header for a freshly built record; the length is filled in at
    /// serialization time.
    #[inline]
    pub const fn new(record_type: u16, instance: u16, version: u8) -> Self {
        Self {
            record_type,
            instance,
            version,
            length: 0,
        }
    }

    /// Unpack a header from the first 8 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(EscherError::Truncated {
                context: "record header",
                needed: Self::SIZE,
                available: data.len(),
            });
        }

        let ver_inst = U16::<LittleEndian>::read_from_bytes(&data[0..2])
            .map(|v| v.get())
            .unwrap_or(0);
        let record_type = U16::<LittleEndian>::read_from_bytes(&data[2..4])
            .map(|v| v.get())
            .unwrap_or(0);
        let length = U32::<LittleEndian>::read_from_bytes(&data[4..8])
            .map(|v| v.get())
            .unwrap_or(0);

        Ok(Self {
            record_type,
            instance: (ver_inst >> 4) & 0x0FFF,
            version: (ver_inst & 0x000F) as u8,
            length,
        })
    }

    /// Pack into the 8-byte wire form.
    ///
    /// Instance and version values wider than their 12/4-bit fields are
    /// caller bugs, not runtime input.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        debug_assert!(self.instance <= 0x0FFF, "instance exceeds 12 bits");
        debug_assert!(self.version <= 0x0F, "version exceeds 4 bits");

        let raw = RawHeader {
            ver_inst: U16::new((self.version as u16 & 0x000F) | ((self.instance & 0x0FFF) << 4)),
            record_type: U16::new(self.record_type),
            length: U32::new(self.length),
        };

        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(raw.as_bytes());
        out
    }
}
