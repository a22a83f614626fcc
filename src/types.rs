//! Escher record type tags.

/// Record type tags (`MSOFBT*` values) for the drawing records this codec
/// round-trips.
///
/// The variant set is closed: the surrounding record-stream reader locates
/// drawing byte ranges and only hands these tags to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EscherRecordType {
    /// Unknown or unsupported record type
    Unknown = 0x0000,
    /// Drawing-group metadata atom: shape id high-water mark, id clusters,
    /// saved shape and drawing counts
    Dgg = 0xF006,
    /// Per-drawing metadata atom: shape count and last shape id
    Dg = 0xF008,
    /// Group-shape coordinate system; child anchors are expressed in it
    Spgr = 0xF009,
    /// Shape identity atom: shape id and persistence flags
    Sp = 0xF00A,
    /// Shape property table
    Opt = 0xF00B,
    /// Cell-range anchor of a top-level shape
    ClientAnchor = 0xF010,
    /// Most-recently-used menu colors
    SplitMenuColors = 0xF11E,
}

impl From<u16> for EscherRecordType {
    fn from(value: u16) -> Self {
        match value {
            0xF006 => Self::Dgg,
            0xF008 => Self::Dg,
            0xF009 => Self::Spgr,
            0xF00A => Self::Sp,
            0xF00B => Self::Opt,
            0xF010 => Self::ClientAnchor,
            0xF11E => Self::SplitMenuColors,
            _ => Self::Unknown,
        }
    }
}

impl EscherRecordType {
    /// The raw 16-bit tag value.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trip() {
        for tag in [
            EscherRecordType::Dgg,
            EscherRecordType::Dg,
            EscherRecordType::Spgr,
            EscherRecordType::Sp,
            EscherRecordType::Opt,
            EscherRecordType::ClientAnchor,
            EscherRecordType::SplitMenuColors,
        ] {
            assert_eq!(EscherRecordType::from(tag.as_u16()), tag);
        }
    }

    #[test]
    fn unsupported_tags_map_to_unknown() {
        // containers and blip records are outside this codec
        assert_eq!(EscherRecordType::from(0xF000), EscherRecordType::Unknown);
        assert_eq!(EscherRecordType::from(0xF004), EscherRecordType::Unknown);
        assert_eq!(EscherRecordType::from(0xF007), EscherRecordType::Unknown);
    }
}
