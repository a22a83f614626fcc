//! The fixed-layout drawing atoms.
//!
//! Six of the seven record variants carry payloads that are plain sequences
//! of little-endian integer fields. Each decoder is the exact field-order
//! inverse of its encoder; the only validation is a buffer-length check.

use crate::binary::{read_i16_le, read_i32_le, read_u32_le};
use crate::error::{EscherError, Result};
use bitflags::bitflags;

/// Shapes allocated per id cluster in the drawing group.
const SHAPES_PER_CLUSTER: u32 = 1024;

/// Drawing-group metadata atom (0xF006).
///
/// Tracks the shape-id high-water mark and the saved shape/drawing counts
/// for the whole workbook. The id-cluster count is purely a function of
/// `spid_max` and is rederived on every encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dgg {
    spid_max: u32,
    num_shapes: u32,
    num_drawings: u32,
}

impl Dgg {
    pub fn new() -> Self {
        Self {
            spid_max: SHAPES_PER_CLUSTER,
            num_shapes: 0,
            num_drawings: 0,
        }
    }

    /// Highest shape id allocated across the workbook.
    #[inline]
    pub fn spid_max(&self) -> u32 {
        self.spid_max
    }

    pub fn set_spid_max(&mut self, spid: u32) {
        self.spid_max = spid;
    }

    #[inline]
    pub fn num_shapes(&self) -> u32 {
        self.num_shapes
    }

    pub fn set_num_shapes(&mut self, count: u32) {
        self.num_shapes = count;
    }

    #[inline]
    pub fn num_drawings(&self) -> u32 {
        self.num_drawings
    }

    pub fn set_num_drawings(&mut self, count: u32) {
        self.num_drawings = count;
    }

    /// Id-cluster count: `ceil(spid_max / 1024)`.
    #[inline]
    pub fn num_id_clusters(&self) -> u32 {
        self.spid_max / SHAPES_PER_CLUSTER + u32::from(self.spid_max % SHAPES_PER_CLUSTER != 0)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let spid_max = read_u32_le(data, 0, "drawing group spidMax")?;
        let num_id_clusters = read_u32_le(data, 4, "drawing group cluster count")?;
        let num_shapes = read_u32_le(data, 8, "drawing group shape count")?;
        let num_drawings = read_u32_le(data, 12, "drawing group drawing count")?;

        // trailing id-cluster pairs; their contents are rederived on encode
        let clusters = num_id_clusters.saturating_sub(1) as usize;
        let needed = clusters * 8;
        if data.len() < 16 + needed {
            return Err(EscherError::Truncated {
                context: "drawing group id clusters",
                needed,
                available: data.len().saturating_sub(16),
            });
        }

        Ok(Self {
            spid_max,
            num_shapes,
            num_drawings,
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let clusters = self.num_id_clusters().saturating_sub(1) as usize;
        let mut out = Vec::with_capacity(16 + clusters * 8);
        out.extend_from_slice(&self.spid_max.to_le_bytes());
        out.extend_from_slice(&self.num_id_clusters().to_le_bytes());
        out.extend_from_slice(&self.num_shapes.to_le_bytes());
        out.extend_from_slice(&self.num_drawings.to_le_bytes());
        for i in 0..clusters {
            // each cluster belongs to drawing 1; the first carries the
            // total used-shape count, the rest one apiece
            out.extend_from_slice(&1u32.to_le_bytes());
            let used = if i == 0 { self.num_shapes } else { 1 };
            out.extend_from_slice(&used.to_le_bytes());
        }
        out
    }
}

impl Default for Dgg {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-drawing metadata atom (0xF008): shape count and last shape id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dg {
    num_shapes: u32,
    last_spid: u32,
}

impl Dg {
    pub fn new() -> Self {
        Self {
            num_shapes: 0,
            last_spid: 0,
        }
    }

    #[inline]
    pub fn num_shapes(&self) -> u32 {
        self.num_shapes
    }

    pub fn set_num_shapes(&mut self, count: u32) {
        self.num_shapes = count;
    }

    /// Last shape id allocated in this drawing.
    #[inline]
    pub fn last_spid(&self) -> u32 {
        self.last_spid
    }

    pub fn set_last_spid(&mut self, spid: u32) {
        self.last_spid = spid;
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            num_shapes: read_u32_le(data, 0, "drawing shape count")?,
            last_spid: read_u32_le(data, 4, "drawing last shape id")?,
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&self.num_shapes.to_le_bytes());
        out.extend_from_slice(&self.last_spid.to_le_bytes());
        out
    }
}

impl Default for Dg {
    fn default() -> Self {
        Self::new()
    }
}

/// Group-shape coordinate system atom (0xF009).
///
/// Present only on shapes that are groups; child-shape anchors are
/// expressed in this rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spgr {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Spgr {
    pub fn new() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        }
    }

    pub fn set_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.left = left;
        self.top = top;
        self.right = right;
        self.bottom = bottom;
    }

    /// The bounding rectangle as (left, top, right, bottom).
    #[inline]
    pub fn rect(&self) -> (i32, i32, i32, i32) {
        (self.left, self.top, self.right, self.bottom)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            left: read_i32_le(data, 0, "group bounds left")?,
            top: read_i32_le(data, 4, "group bounds top")?,
            right: read_i32_le(data, 8, "group bounds right")?,
            bottom: read_i32_le(data, 12, "group bounds bottom")?,
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.left.to_le_bytes());
        out.extend_from_slice(&self.top.to_le_bytes());
        out.extend_from_slice(&self.right.to_le_bytes());
        out.extend_from_slice(&self.bottom.to_le_bytes());
        out
    }
}

impl Default for Spgr {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Shape persistence flags carried by the shape identity atom.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpFlags: u32 {
        /// Shape is a group
        const GROUP = 0x0001;
        /// Shape is a child of a group
        const CHILD = 0x0002;
        /// Shape is the topmost group of the drawing
        const PATRIARCH = 0x0004;
        /// Shape has been deleted
        const DELETED = 0x0008;
        /// Shape is an OLE object
        const OLE_SHAPE = 0x0010;
        /// Shape has a valid master
        const HAVE_MASTER = 0x0020;
        /// Shape is flipped horizontally
        const FLIP_H = 0x0040;
        /// Shape is flipped vertically
        const FLIP_V = 0x0080;
        /// Shape is a connector
        const CONNECTOR = 0x0100;
        /// Shape has an anchor
        const HAVE_ANCHOR = 0x0200;
        /// Shape is a background shape
        const BACKGROUND = 0x0400;
        /// Shape carries a shape-type property
        const HAVE_SPT = 0x0800;
    }
}

/// Shape identity atom (0xF00A): shape id plus persistence flags.
///
/// The shape type rides in the header instance field, not the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sp {
    shape_id: u32,
    flags: SpFlags,
}

impl Sp {
    pub fn new() -> Self {
        Self {
            shape_id: 0,
            flags: SpFlags::empty(),
        }
    }

    #[inline]
    pub fn shape_id(&self) -> u32 {
        self.shape_id
    }

    pub fn set_shape_id(&mut self, id: u32) {
        self.shape_id = id;
    }

    #[inline]
    pub fn flags(&self) -> SpFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: SpFlags) {
        self.flags = flags;
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            shape_id: read_u32_le(data, 0, "shape id")?,
            flags: SpFlags::from_bits_retain(read_u32_le(data, 4, "shape flags")?),
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&self.shape_id.to_le_bytes());
        out.extend_from_slice(&self.flags.bits().to_le_bytes());
        out
    }
}

impl Default for Sp {
    fn default() -> Self {
        Self::new()
    }
}

/// Cell-range anchor of a top-level shape (0xF010): nine 16-bit fields,
/// 18 bytes.
///
/// Column/row indexes name the anchor cells; the offsets position the
/// shape's corners within them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAnchor {
    flag: i16,
    left_col: i16,
    x_offset_left: i16,
    top_row: i16,
    y_offset_top: i16,
    right_col: i16,
    x_offset_right: i16,
    bottom_row: i16,
    y_offset_bottom: i16,
}

impl ClientAnchor {
    /// Encoded payload size.
    pub const SIZE: usize = 18;

    pub fn new() -> Self {
        Self {
            // observed to always be 2 in workbook streams
            flag: 2,
            left_col: 0,
            x_offset_left: 0,
            top_row: 0,
            y_offset_top: 0,
            right_col: 0,
            x_offset_right: 0,
            bottom_row: 0,
            y_offset_bottom: 0,
        }
    }

    #[inline]
    pub fn flag(&self) -> i16 {
        self.flag
    }

    pub fn set_flag(&mut self, flag: i16) {
        self.flag = flag;
    }

    /// Set the anchor cells and offsets:
    /// `[left_col, x_offset_left, top_row, y_offset_top, right_col,
    /// x_offset_right, bottom_row, y_offset_bottom]`.
    pub fn set_bounds(&mut self, bounds: &[i16; 8]) {
        self.left_col = bounds[0];
        self.x_offset_left = bounds[1];
        self.top_row = bounds[2];
        self.y_offset_top = bounds[3];
        self.right_col = bounds[4];
        self.x_offset_right = bounds[5];
        self.bottom_row = bounds[6];
        self.y_offset_bottom = bounds[7];
    }

    /// The anchor cells and offsets in `set_bounds` order.
    pub fn bounds(&self) -> [i16; 8] {
        [
            self.left_col,
            self.x_offset_left,
            self.top_row,
            self.y_offset_top,
            self.right_col,
            self.x_offset_right,
            self.bottom_row,
            self.y_offset_bottom,
        ]
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            flag: read_i16_le(data, 0, "anchor flag")?,
            left_col: read_i16_le(data, 2, "anchor left column")?,
            x_offset_left: read_i16_le(data, 4, "anchor left offset")?,
            top_row: read_i16_le(data, 6, "anchor top row")?,
            y_offset_top: read_i16_le(data, 8, "anchor top offset")?,
            right_col: read_i16_le(data, 10, "anchor right column")?,
            x_offset_right: read_i16_le(data, 12, "anchor right offset")?,
            bottom_row: read_i16_le(data, 14, "anchor bottom row")?,
            y_offset_bottom: read_i16_le(data, 16, "anchor bottom offset")?,
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        for field in [
            self.flag,
            self.left_col,
            self.x_offset_left,
            self.top_row,
            self.y_offset_top,
            self.right_col,
            self.x_offset_right,
            self.bottom_row,
            self.y_offset_bottom,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out
    }
}

impl Default for ClientAnchor {
    fn default() -> Self {
        Self::new()
    }
}

/// Most-recently-used menu colors (0xF11E): four packed color references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMenuColors {
    fill_color: u32,
    line_color: u32,
    shadow_color: u32,
    three_d_color: u32,
}

impl SplitMenuColors {
    /// Defaults taken from records produced by Excel itself.
    pub fn new() -> Self {
        Self {
            fill_color: 0x0800_000D,
            line_color: 0x0800_000C,
            shadow_color: 0x0800_0017,
            three_d_color: 0x1000_00F7,
        }
    }

    #[inline]
    pub fn fill_color(&self) -> u32 {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color_ref: u32) {
        self.fill_color = color_ref;
    }

    #[inline]
    pub fn line_color(&self) -> u32 {
        self.line_color
    }

    pub fn set_line_color(&mut self, color_ref: u32) {
        self.line_color = color_ref;
    }

    #[inline]
    pub fn shadow_color(&self) -> u32 {
        self.shadow_color
    }

    pub fn set_shadow_color(&mut self, color_ref: u32) {
        self.shadow_color = color_ref;
    }

    #[inline]
    pub fn three_d_color(&self) -> u32 {
        self.three_d_color
    }

    pub fn set_three_d_color(&mut self, color_ref: u32) {
        self.three_d_color = color_ref;
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            fill_color: read_u32_le(data, 0, "menu fill color")?,
            line_color: read_u32_le(data, 4, "menu line color")?,
            shadow_color: read_u32_le(data, 8, "menu shadow color")?,
            three_d_color: read_u32_le(data, 12, "menu 3-D color")?,
        })
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.fill_color.to_le_bytes());
        out.extend_from_slice(&self.line_color.to_le_bytes());
        out.extend_from_slice(&self.shadow_color.to_le_bytes());
        out.extend_from_slice(&self.three_d_color.to_le_bytes());
        out
    }
}

impl Default for SplitMenuColors {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dgg_single_cluster_has_no_pairs() {
        let mut dgg = Dgg::new();
        dgg.set_spid_max(1024);
        dgg.set_num_shapes(3);
        dgg.set_num_drawings(1);

        assert_eq!(dgg.num_id_clusters(), 1);
        let payload = dgg.payload();
        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[0..4], &1024u32.to_le_bytes());
        assert_eq!(&payload[4..8], &1u32.to_le_bytes());
        assert_eq!(&payload[8..12], &3u32.to_le_bytes());
        assert_eq!(&payload[12..16], &1u32.to_le_bytes());

        assert_eq!(Dgg::parse(&payload).unwrap(), dgg);
    }

    #[test]
    fn dgg_extra_cluster_carries_shape_count() {
        let mut dgg = Dgg::new();
        dgg.set_spid_max(1025);
        dgg.set_num_shapes(7);

        assert_eq!(dgg.num_id_clusters(), 2);
        let payload = dgg.payload();
        assert_eq!(payload.len(), 24);
        // one trailing pair: drawing id 1, shape count 7
        assert_eq!(&payload[16..20], &1u32.to_le_bytes());
        assert_eq!(&payload[20..24], &7u32.to_le_bytes());
    }

    #[test]
    fn dgg_later_clusters_use_one() {
        let mut dgg = Dgg::new();
        dgg.set_spid_max(3000);
        dgg.set_num_shapes(5);

        assert_eq!(dgg.num_id_clusters(), 3);
        let payload = dgg.payload();
        assert_eq!(payload.len(), 32);
        assert_eq!(&payload[20..24], &5u32.to_le_bytes());
        assert_eq!(&payload[28..32], &1u32.to_le_bytes());
    }

    #[test]
    fn dgg_truncated_cluster_list_fails() {
        let mut payload = Dgg::new().payload();
        payload[4..8].copy_from_slice(&4u32.to_le_bytes()); // claims 3 pairs

        assert!(matches!(
            Dgg::parse(&payload).unwrap_err(),
            EscherError::Truncated { .. }
        ));
    }

    #[test]
    fn dg_round_trip() {
        let mut dg = Dg::new();
        dg.set_num_shapes(2);
        dg.set_last_spid(1026);

        let payload = dg.payload();
        assert_eq!(payload, [2, 0, 0, 0, 2, 4, 0, 0]);
        assert_eq!(Dg::parse(&payload).unwrap(), dg);
    }

    #[test]
    fn spgr_round_trip() {
        let mut spgr = Spgr::new();
        spgr.set_rect(-10, 20, 400, 300);

        let decoded = Spgr::parse(&spgr.payload()).unwrap();
        assert_eq!(decoded.rect(), (-10, 20, 400, 300));
    }

    #[test]
    fn spgr_short_buffer_fails() {
        assert!(matches!(
            Spgr::parse(&[0u8; 12]).unwrap_err(),
            EscherError::Truncated { .. }
        ));
    }

    #[test]
    fn sp_round_trip_keeps_flags() {
        let mut sp = Sp::new();
        sp.set_shape_id(1025);
        sp.set_flags(SpFlags::HAVE_ANCHOR | SpFlags::HAVE_SPT);

        let payload = sp.payload();
        assert_eq!(&payload[4..8], &0x0A00u32.to_le_bytes());
        assert_eq!(Sp::parse(&payload).unwrap(), sp);
    }

    #[test]
    fn sp_parse_keeps_unknown_flag_bits() {
        let mut data = Vec::new();
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(&0x0001_0200u32.to_le_bytes());

        let sp = Sp::parse(&data).unwrap();
        assert_eq!(sp.flags().bits(), 0x0001_0200);
        assert_eq!(sp.payload(), data);
    }

    #[test]
    fn client_anchor_defaults_and_round_trip() {
        let mut anchor = ClientAnchor::new();
        assert_eq!(anchor.flag(), 2);

        anchor.set_bounds(&[1, 100, 2, 50, 6, 800, 12, 700]);
        let payload = anchor.payload();
        assert_eq!(payload.len(), ClientAnchor::SIZE);
        assert_eq!(&payload[0..2], &2i16.to_le_bytes());

        let decoded = ClientAnchor::parse(&payload).unwrap();
        assert_eq!(decoded.bounds(), [1, 100, 2, 50, 6, 800, 12, 700]);
        assert_eq!(decoded, anchor);
    }

    #[test]
    fn split_menu_colors_defaults() {
        let colors = SplitMenuColors::new();
        let payload = colors.payload();
        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[0..4], &0x0800_000Du32.to_le_bytes());
        assert_eq!(&payload[12..16], &0x1000_00F7u32.to_le_bytes());
        assert_eq!(SplitMenuColors::parse(&payload).unwrap(), colors);
    }
}
