//! Record envelope: one header plus one variant payload.
//!
//! The variant set is closed (the external format fixes it), so dispatch is
//! a single match over [`EscherRecordType`] rather than virtual calls.

use crate::atoms::{ClientAnchor, Dg, Dgg, Sp, Spgr, SplitMenuColors};
use crate::error::{EscherError, Result};
use crate::header::RecordHeader;
use crate::opt::Opt;
use crate::types::EscherRecordType;

/// Payload of one Escher record.
#[derive(Debug, Clone)]
pub enum RecordBody {
    Dgg(Dgg),
    Dg(Dg),
    Spgr(Spgr),
    Sp(Sp),
    Opt(Opt),
    ClientAnchor(ClientAnchor),
    SplitMenuColors(SplitMenuColors),
}

/// A drawing record: header plus variant payload.
///
/// Records come into being either freshly built through the `new_*`
/// constructors or by decoding the payload bytes the surrounding
/// record-stream reader hands over together with the already-split header
/// triple.
#[derive(Debug, Clone)]
pub struct EscherRecord {
    header: RecordHeader,
    body: RecordBody,
}

impl EscherRecord {
    /// Decode a record from its header triple and payload bytes.
    pub fn decode(record_type: u16, instance: u16, version: u8, payload: &[u8]) -> Result<Self> {
        let mut header = RecordHeader::new(record_type, instance, version);
        header.length = payload.len() as u32;

        let body = match EscherRecordType::from(record_type) {
            EscherRecordType::Dgg => RecordBody::Dgg(Dgg::parse(payload)?),
            EscherRecordType::Dg => RecordBody::Dg(Dg::parse(payload)?),
            EscherRecordType::Spgr => RecordBody::Spgr(Spgr::parse(payload)?),
            EscherRecordType::Sp => RecordBody::Sp(Sp::parse(payload)?),
            EscherRecordType::Opt => RecordBody::Opt(Opt::parse(&mut header, payload)?),
            EscherRecordType::ClientAnchor => {
                RecordBody::ClientAnchor(ClientAnchor::parse(payload)?)
            },
            EscherRecordType::SplitMenuColors => {
                RecordBody::SplitMenuColors(SplitMenuColors::parse(payload)?)
            },
            EscherRecordType::Unknown => {
                return Err(EscherError::UnsupportedRecordType(record_type));
            },
        };

        Ok(Self { header, body })
    }

    /// Serialize to wire bytes.
    ///
    /// The variant payload is produced first, because a body may refresh
    /// its header fields while encoding (the property table resets the
    /// instance count to its entry count); the header then goes out with
    /// the freshly computed length.
    pub fn serialize(&mut self) -> Vec<u8> {
        let payload = match &mut self.body {
            RecordBody::Dgg(r) => r.payload(),
            RecordBody::Dg(r) => r.payload(),
            RecordBody::Spgr(r) => r.payload(),
            RecordBody::Sp(r) => r.payload(),
            RecordBody::Opt(r) => {
                let payload = r.payload();
                self.header.instance = r.instance();
                payload
            },
            RecordBody::ClientAnchor(r) => r.payload(),
            RecordBody::SplitMenuColors(r) => {
                // the instance field of this record always holds its color
                // count
                self.header.instance = 4;
                r.payload()
            },
        };

        self.header.length = payload.len() as u32;

        let mut out = Vec::with_capacity(RecordHeader::SIZE + payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Fresh drawing-group metadata record.
    pub fn new_dgg(dgg: Dgg) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::Dgg.as_u16(), 0, 0),
            body: RecordBody::Dgg(dgg),
        }
    }

    /// Fresh drawing metadata record for the given drawing id.
    pub fn new_dg(drawing_id: u16, dg: Dg) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::Dg.as_u16(), drawing_id, 0),
            body: RecordBody::Dg(dg),
        }
    }

    /// Fresh group-bounds record.
    pub fn new_spgr(spgr: Spgr) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::Spgr.as_u16(), 0, 1),
            body: RecordBody::Spgr(spgr),
        }
    }

    /// Fresh shape identity record; the shape type travels in the instance
    /// field.
    pub fn new_sp(shape_type: u16, sp: Sp) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::Sp.as_u16(), shape_type, 2),
            body: RecordBody::Sp(sp),
        }
    }

    /// Fresh property-table record.
    pub fn new_opt(opt: Opt) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::Opt.as_u16(), opt.instance(), 3),
            body: RecordBody::Opt(opt),
        }
    }

    /// Fresh client-anchor record.
    pub fn new_client_anchor(anchor: ClientAnchor) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::ClientAnchor.as_u16(), 0, 0),
            body: RecordBody::ClientAnchor(anchor),
        }
    }

    /// Fresh split-menu-colors record.
    pub fn new_split_menu_colors(colors: SplitMenuColors) -> Self {
        Self {
            header: RecordHeader::new(EscherRecordType::SplitMenuColors.as_u16(), 4, 0),
            body: RecordBody::SplitMenuColors(colors),
        }
    }

    #[inline]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    #[inline]
    pub fn record_type(&self) -> EscherRecordType {
        EscherRecordType::from(self.header.record_type)
    }

    #[inline]
    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut RecordBody {
        &mut self.body
    }

    /// The property table, when this is a property-table record.
    pub fn as_opt(&self) -> Option<&Opt> {
        match &self.body {
            RecordBody::Opt(opt) => Some(opt),
            _ => None,
        }
    }

    /// Mutable property table, when this is a property-table record.
    pub fn as_opt_mut(&mut self) -> Option<&mut Opt> {
        match &mut self.body {
            RecordBody::Opt(opt) => Some(opt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::SpFlags;
    use crate::consts::shape_type;
    use crate::opt::{PropertyId, PropertyValue};

    #[test]
    fn unknown_tag_is_rejected() {
        // SpContainer is handled by the stream reader, not this codec
        assert!(matches!(
            EscherRecord::decode(0xF004, 0, 0x0F, &[]).unwrap_err(),
            EscherError::UnsupportedRecordType(0xF004)
        ));
    }

    #[test]
    fn client_anchor_serializes_with_header() {
        let mut anchor = ClientAnchor::new();
        anchor.set_bounds(&[1, 0, 1, 0, 4, 0, 8, 0]);

        let mut record = EscherRecord::new_client_anchor(anchor);
        let bytes = record.serialize();
        assert_eq!(bytes.len(), 8 + 18);
        // type tag and recomputed length land in the header
        assert_eq!(&bytes[2..4], &0xF010u16.to_le_bytes());
        assert_eq!(&bytes[4..8], &18u32.to_le_bytes());

        let header = RecordHeader::parse(&bytes).unwrap();
        let decoded = EscherRecord::decode(
            header.record_type,
            header.instance,
            header.version,
            &bytes[8..],
        )
        .unwrap();
        match decoded.body() {
            RecordBody::ClientAnchor(a) => {
                assert_eq!(a.bounds(), [1, 0, 1, 0, 4, 0, 8, 0]);
            },
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn sp_carries_shape_type_in_instance() {
        let mut sp = Sp::new();
        sp.set_shape_id(1025);
        sp.set_flags(SpFlags::HAVE_ANCHOR | SpFlags::HAVE_SPT);

        let mut record = EscherRecord::new_sp(shape_type::TEXT_BOX, sp);
        let bytes = record.serialize();

        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.instance, shape_type::TEXT_BOX);
        assert_eq!(header.version, 2);
        assert_eq!(header.length, 8);
    }

    #[test]
    fn opt_serialization_refreshes_instance_count() {
        let mut opt = Opt::new();
        opt.set_shape_name("Box 1");
        opt.set(
            PropertyId::new(384).unwrap(),
            false,
            PropertyValue::Fixed(0),
        );

        let mut record = EscherRecord::new_opt(opt);
        let bytes = record.serialize();

        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.instance, 2);
        assert_eq!(header.version, 3);
        assert_eq!(header.length as usize, bytes.len() - 8);

        // mutate through the envelope and observe the refreshed count
        record.as_opt_mut().unwrap().set_image_index(1);
        let bytes = record.serialize();
        assert_eq!(RecordHeader::parse(&bytes).unwrap().instance, 3);
    }

    #[test]
    fn serialize_decode_serialize_is_stable() {
        let mut dgg = Dgg::new();
        dgg.set_spid_max(2048);
        dgg.set_num_shapes(4);
        dgg.set_num_drawings(1);

        let mut record = EscherRecord::new_dgg(dgg);
        let first = record.serialize();

        let header = RecordHeader::parse(&first).unwrap();
        let mut decoded = EscherRecord::decode(
            header.record_type,
            header.instance,
            header.version,
            &first[8..],
        )
        .unwrap();
        assert_eq!(decoded.serialize(), first);
    }

    #[test]
    fn split_menu_colors_forces_instance() {
        let mut record = EscherRecord::new_split_menu_colors(SplitMenuColors::new());
        let bytes = record.serialize();

        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.instance, 4);
        assert_eq!(header.length, 16);
    }
}
