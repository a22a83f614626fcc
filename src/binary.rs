//! Bounds-checked little-endian field readers.
//!
//! Every multi-byte integer in an Escher stream is little-endian. These
//! helpers read one field at an offset and report a truncation with the
//! caller's context string instead of panicking.

use crate::error::{EscherError, Result};
use zerocopy::{
    FromBytes,
    byteorder::{I16, I32, LittleEndian, U16, U32},
};

/// Read a little-endian u16 from `data` at `offset`.
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize, context: &'static str) -> Result<u16> {
    if offset + 2 > data.len() {
        return Err(EscherError::Truncated {
            context,
            needed: 2,
            available: data.len().saturating_sub(offset),
        });
    }
    Ok(U16::<LittleEndian>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .unwrap_or(0))
}

/// Read a little-endian i16 from `data` at `offset`.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize, context: &'static str) -> Result<i16> {
    if offset + 2 > data.len() {
        return Err(EscherError::Truncated {
            context,
            needed: 2,
            available: data.len().saturating_sub(offset),
        });
    }
    Ok(I16::<LittleEndian>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .unwrap_or(0))
}

/// Read a little-endian u32 from `data` at `offset`.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize, context: &'static str) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(EscherError::Truncated {
            context,
            needed: 4,
            available: data.len().saturating_sub(offset),
        });
    }
    Ok(U32::<LittleEndian>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .unwrap_or(0))
}

/// Read a little-endian i32 from `data` at `offset`.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize, context: &'static str) -> Result<i32> {
    if offset + 4 > data.len() {
        return Err(EscherError::Truncated {
            context,
            needed: 4,
            available: data.len().saturating_sub(offset),
        });
    }
    Ok(I32::<LittleEndian>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_fields() {
        let data = [0x0D, 0x00, 0x00, 0x08, 0xFF, 0xFF];

        assert_eq!(read_u16_le(&data, 0, "test").unwrap(), 0x000D);
        assert_eq!(read_u32_le(&data, 0, "test").unwrap(), 0x0800_000D);
        assert_eq!(read_i16_le(&data, 4, "test").unwrap(), -1);
        assert_eq!(read_i32_le(&data, 2, "test").unwrap(), -0x0000_F800_i32);
    }

    #[test]
    fn short_buffer_is_truncated() {
        let data = [0x01, 0x02];

        let err = read_u32_le(&data, 0, "length field").unwrap_err();
        match err {
            EscherError::Truncated {
                context,
                needed,
                available,
            } => {
                assert_eq!(context, "length field");
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
