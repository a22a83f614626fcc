//! The shape property table (0xF00B).
//!
//! The payload is an array of 6-byte fixed entries followed by a
//! complex-data region:
//!
//! - Bytes 0-1 of an entry pack a 14-bit property id, a blip-id flag
//!   (bit 14) and a complex flag (bit 15).
//! - Bytes 2-5 hold a little-endian 32-bit value: the property value
//!   itself, or, for complex entries, the byte length of a block stored
//!   after the last fixed entry.
//! - Each complex block ends with a two-byte zero delimiter that is counted
//!   in the stored length but is not part of the data.
//!
//! Decode keeps entries in stream order (complex blocks are laid out in the
//! order their fixed entries appeared), while encode always emits fixed
//! entries sorted ascending by property id with the complex region in that
//! same order, which is what the format's producers write.

use crate::binary::read_i32_le;
use crate::color::{ResolvedColor, resolve_color_ref};
use crate::error::{EscherError, Result};
use crate::header::RecordHeader;
use indexmap::IndexMap;
use std::collections::HashMap;

const FOPTE_SIZE: usize = 6;
const COMPLEX_FLAG: u8 = 0x80;
const BLIP_FLAG: u8 = 0x40;

/// A property id: the low 14 bits of an entry's 16-bit id field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Largest representable id.
    pub const MAX: u16 = 0x3FFF;

    /// Host-assigned text id; its presence changes how the surrounding
    /// container computes record lengths
    pub const TEXT_ID: PropertyId = PropertyId(128);
    /// Index of the displayed image in the blip store
    pub const IMAGE_INDEX: PropertyId = PropertyId(260);
    /// Image file name (wide string)
    pub const IMAGE_NAME: PropertyId = PropertyId(261);
    /// OLE server is active (pictures only)
    pub const PICTURE_ACTIVE: PropertyId = PropertyId(319);
    /// Fill type
    pub const FILL_TYPE: PropertyId = PropertyId(384);
    /// Fill foreground color (packed color reference)
    pub const FILL_COLOR: PropertyId = PropertyId(385);
    /// Comment, file name or URL used as a picture fill (wide string)
    pub const FILL_BLIP_NAME: PropertyId = PropertyId(391);
    /// Line color (packed color reference)
    pub const LINE_COLOR: PropertyId = PropertyId(448);
    /// Line weight in EMUs (12700 per point)
    pub const LINE_WIDTH: PropertyId = PropertyId(459);
    /// Line style
    pub const LINE_STYLE: PropertyId = PropertyId(461);
    /// Marks the background shape
    pub const BACKGROUND: PropertyId = PropertyId(831);
    /// Shape name (wide string, present when named explicitly)
    pub const SHAPE_NAME: PropertyId = PropertyId(896);
    /// Alternate text (wide string)
    pub const DESCRIPTION: PropertyId = PropertyId(897);
    /// Boolean property block for groups and shapes; kept raw
    pub const GROUP_SHAPE_PROPS: PropertyId = PropertyId(959);

    /// Build a property id, rejecting values that do not fit 14 bits.
    pub fn new(raw: u16) -> Result<Self> {
        if raw > Self::MAX {
            return Err(EscherError::UnsupportedInput(format!(
                "property id {raw} exceeds 14 bits"
            )));
        }
        Ok(Self(raw))
    }

    /// The raw id value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// A property value: an inline 32-bit integer, or an owned buffer stored in
/// the complex-data region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Fixed(i32),
    Complex(Vec<u8>),
}

/// One property-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// The fixed value is a blip-store id
    pub blip_id: bool,
    pub value: PropertyValue,
}

/// Line properties collected from the line-control entries.
///
/// The color is the raw packed reference; resolve it with
/// [`resolve_color_ref`] when a concrete color is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineProperties {
    pub style: i32,
    pub weight: i32,
    pub color: i32,
}

/// Shape property table record.
///
/// The cached display scalars (image index and name, shape name, alternate
/// text, fill, line properties) stay consistent with the entry map: every
/// setter rewrites both and marks the table dirty. Wire bytes are memoized;
/// an unmutated table re-emits exactly the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct Opt {
    entries: IndexMap<PropertyId, Property>,
    /// Entry count as written to the header instance field
    instance: u16,
    /// Memoized wire bytes, valid while `dirty` is false
    cached: Vec<u8>,
    dirty: bool,

    image_index: Option<i32>,
    image_name: String,
    shape_name: String,
    alternate_text: String,
    fill_type: i32,
    fill_color: Option<ResolvedColor>,
    background: bool,
    picture_active: bool,
    line_props: Option<LineProperties>,
    has_text_id: bool,
}

impl Opt {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            instance: 0,
            cached: Vec::new(),
            dirty: false,
            image_index: None,
            image_name: String::new(),
            shape_name: String::new(),
            alternate_text: String::new(),
            fill_type: 0,
            fill_color: None,
            background: false,
            picture_active: false,
            line_props: None,
            has_text_id: false,
        }
    }

    /// Decode a property table from `payload`.
    ///
    /// When the external instance count is zero but the payload is not
    /// empty, the table is self-describing: it was embedded in another
    /// record's body with its own 8-byte header at the start of the
    /// payload, and `header` is rewritten from that embedded header before
    /// the entries are read.
    pub fn parse(header: &mut RecordHeader, payload: &[u8]) -> Result<Self> {
        let mut opt = Self::new();
        let mut pos = 0usize;

        if header.instance == 0 && !payload.is_empty() {
            let embedded = RecordHeader::parse(payload)?;
            header.version = embedded.version;
            header.instance = embedded.instance;
            header.record_type = embedded.record_type;
            pos = RecordHeader::SIZE;
        }

        let count = header.instance as usize;
        // complex lengths as declared by the fixed entries; on a duplicate
        // id the last declaration wins, like the map insert below
        let mut declared: HashMap<PropertyId, i32> = HashMap::new();

        for _ in 0..count {
            if pos + FOPTE_SIZE > payload.len() {
                return Err(EscherError::Truncated {
                    context: "property table entry",
                    needed: FOPTE_SIZE,
                    available: payload.len().saturating_sub(pos),
                });
            }

            let id = PropertyId(u16::from(payload[pos]) | (u16::from(payload[pos + 1] & 0x3F) << 8));
            let complex = payload[pos + 1] & COMPLEX_FLAG != 0;
            let blip_id = payload[pos + 1] & BLIP_FLAG != 0;
            let dtx = read_i32_le(payload, pos + 2, "property table entry value")?;

            opt.note_fixed(id, dtx);
            let value = if complex {
                declared.insert(id, dtx);
                // filled in by the complex walk below
                PropertyValue::Complex(Vec::new())
            } else {
                PropertyValue::Fixed(dtx)
            };
            opt.entries.insert(id, Property { blip_id, value });
            pos += FOPTE_SIZE;
        }

        // complex blocks follow the fixed entries in original stream order
        let ids: Vec<PropertyId> = opt.entries.keys().copied().collect();
        for id in ids {
            // a duplicate id may have re-declared the entry as fixed; only
            // the surviving state reads complex data
            if !matches!(
                opt.entries.get(&id),
                Some(Property {
                    value: PropertyValue::Complex(_),
                    ..
                })
            ) {
                continue;
            }
            let Some(len) = declared.get(&id).copied() else {
                continue;
            };
            // a stored length below 2 cannot even cover its own trailing
            // delimiter; such entries carry no data and consume no bytes
            if len < 2 {
                continue;
            }
            let data_len = len as usize - 2;
            if pos + data_len > payload.len() {
                return Err(EscherError::Truncated {
                    context: "complex property data",
                    needed: data_len,
                    available: payload.len().saturating_sub(pos),
                });
            }
            let data = payload[pos..pos + data_len].to_vec();
            pos += len as usize;

            opt.note_complex(id, &data);
            if let Some(prop) = opt.entries.get_mut(&id) {
                prop.value = PropertyValue::Complex(data);
            }
        }

        opt.instance = header.instance;
        opt.cached = payload.to_vec();
        Ok(opt)
    }

    /// Interpret the semantically known fixed entries as they stream past.
    fn note_fixed(&mut self, id: PropertyId, dtx: i32) {
        match id {
            PropertyId::IMAGE_INDEX => self.image_index = Some(dtx),
            PropertyId::FILL_TYPE => self.fill_type = dtx,
            PropertyId::FILL_COLOR => self.fill_color = Some(resolve_color_ref(dtx as u32)),
            PropertyId::BACKGROUND => self.background = dtx != 0,
            PropertyId::PICTURE_ACTIVE => self.picture_active = dtx != 0,
            PropertyId::LINE_WIDTH => self.line_props_mut().weight = dtx,
            PropertyId::LINE_COLOR => self.line_props_mut().color = dtx,
            PropertyId::LINE_STYLE => self.line_props_mut().style = dtx,
            PropertyId::TEXT_ID => self.has_text_id = true,
            _ => {},
        }
    }

    /// Interpret the string-valued complex entries. Decode failures here
    /// concern cosmetic fields only and never fail the record.
    fn note_complex(&mut self, id: PropertyId, data: &[u8]) {
        match id {
            PropertyId::IMAGE_NAME => match decode_wide(data) {
                Some(name) => self.image_name = name,
                None => {
                    log::warn!("image name is not valid UTF-16LE; substituting placeholder");
                    self.image_name = "Unnamed".to_string();
                },
            },
            PropertyId::SHAPE_NAME => match decode_wide(data) {
                Some(name) => self.shape_name = name,
                None => log::warn!("discarding malformed shape name"),
            },
            PropertyId::DESCRIPTION => match decode_wide(data) {
                Some(text) => self.alternate_text = text,
                None => log::warn!("discarding malformed alternate text"),
            },
            _ => {},
        }
    }

    fn line_props_mut(&mut self) -> &mut LineProperties {
        self.line_props.get_or_insert_with(LineProperties::default)
    }

    /// Wire bytes of the table.
    ///
    /// Regenerated from the entry map only when a setter has run since the
    /// last encode: fixed entries sorted ascending by id, then the complex
    /// region in the same order, each block followed by the two-byte zero
    /// delimiter. Otherwise the memoized bytes are returned unchanged,
    /// which keeps an unmutated decode byte-identical to its source.
    pub fn payload(&mut self) -> Vec<u8> {
        if self.dirty {
            let mut fixed = Vec::with_capacity(self.entries.len() * FOPTE_SIZE);
            let mut complex_region = Vec::new();

            let mut ids: Vec<PropertyId> = self.entries.keys().copied().collect();
            ids.sort_unstable();

            for id in &ids {
                let prop = &self.entries[id];
                let mut flag = (id.raw() >> 8) as u8 & 0x3F;
                if prop.blip_id {
                    flag |= BLIP_FLAG;
                }
                let dtx = match &prop.value {
                    PropertyValue::Fixed(value) => *value,
                    PropertyValue::Complex(data) => {
                        flag |= COMPLEX_FLAG;
                        complex_region.extend_from_slice(data);
                        complex_region.extend_from_slice(&[0, 0]);
                        data.len() as i32 + 2
                    },
                };
                fixed.push(id.raw() as u8);
                fixed.push(flag);
                fixed.extend_from_slice(&dtx.to_le_bytes());
            }

            fixed.extend_from_slice(&complex_region);
            self.cached = fixed;
            self.dirty = false;
        }
        self.cached.clone()
    }

    /// Insert or replace a property, refresh the header-bound entry count
    /// and mark the table dirty.
    pub fn set(&mut self, id: PropertyId, blip_id: bool, value: PropertyValue) {
        self.entries.insert(id, Property { blip_id, value });
        self.instance = self.entries.len() as u16;
        self.dirty = true;
    }

    /// Remove a property; no-op when absent.
    pub fn remove(&mut self, id: PropertyId) {
        if self.entries.shift_remove(&id).is_some() {
            self.instance = self.entries.len() as u16;
            self.dirty = true;
        }
    }

    /// Set the blip-store index of the displayed image; a negative index
    /// removes the property.
    pub fn set_image_index(&mut self, index: i32) {
        if index > -1 {
            self.image_index = Some(index);
            self.set(PropertyId::IMAGE_INDEX, true, PropertyValue::Fixed(index));
        } else {
            self.image_index = None;
            self.remove(PropertyId::IMAGE_INDEX);
        }
    }

    /// Set the image file name; an empty name removes the property.
    pub fn set_image_name(&mut self, name: &str) {
        self.image_name = name.to_string();
        if name.is_empty() {
            self.remove(PropertyId::IMAGE_NAME);
        } else {
            self.set(
                PropertyId::IMAGE_NAME,
                true,
                PropertyValue::Complex(encode_wide(name)),
            );
        }
    }

    /// Set the shape name; an empty name removes the property.
    pub fn set_shape_name(&mut self, name: &str) {
        self.shape_name = name.to_string();
        if name.is_empty() {
            self.remove(PropertyId::SHAPE_NAME);
        } else {
            self.set(
                PropertyId::SHAPE_NAME,
                true,
                PropertyValue::Complex(encode_wide(name)),
            );
        }
    }

    /// Set the alternate text; an empty string removes the property.
    pub fn set_alternate_text(&mut self, text: &str) {
        self.alternate_text = text.to_string();
        if text.is_empty() {
            self.remove(PropertyId::DESCRIPTION);
        } else {
            self.set(
                PropertyId::DESCRIPTION,
                false,
                PropertyValue::Complex(encode_wide(text)),
            );
        }
    }

    #[inline]
    pub fn image_index(&self) -> Option<i32> {
        self.image_index
    }

    #[inline]
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    #[inline]
    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    #[inline]
    pub fn alternate_text(&self) -> &str {
        &self.alternate_text
    }

    #[inline]
    pub fn fill_type(&self) -> i32 {
        self.fill_type
    }

    /// Resolved fill color, if a fill-color property is present.
    #[inline]
    pub fn fill_color(&self) -> Option<ResolvedColor> {
        self.fill_color
    }

    #[inline]
    pub fn is_background(&self) -> bool {
        self.background
    }

    #[inline]
    pub fn is_picture_active(&self) -> bool {
        self.picture_active
    }

    /// True when the table carries a text-id entry; the surrounding
    /// container needs this to size its enclosing records correctly.
    #[inline]
    pub fn has_text_id(&self) -> bool {
        self.has_text_id
    }

    #[inline]
    pub fn line_properties(&self) -> Option<LineProperties> {
        self.line_props
    }

    /// Border weight from the line properties, when present.
    #[inline]
    pub fn border_line_width(&self) -> Option<i32> {
        self.line_props.map(|l| l.weight)
    }

    /// A border is drawn when the line weight exceeds one.
    #[inline]
    pub fn has_border(&self) -> bool {
        self.line_props.is_some_and(|l| l.weight > 1)
    }

    #[inline]
    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        self.entries.get(&id)
    }

    /// Fixed value of a property, if present and non-complex.
    #[inline]
    pub fn get_int(&self, id: PropertyId) -> Option<i32> {
        match self.entries.get(&id) {
            Some(Property {
                value: PropertyValue::Fixed(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// Complex data of a property, if present and complex.
    #[inline]
    pub fn get_complex(&self, id: PropertyId) -> Option<&[u8]> {
        match self.entries.get(&id) {
            Some(Property {
                value: PropertyValue::Complex(data),
                ..
            }) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn has(&self, id: PropertyId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in decode/insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, &Property)> {
        self.entries.iter()
    }

    /// Entry count for the owning record's header instance field.
    #[inline]
    pub(crate) fn instance(&self) -> u16 {
        self.instance
    }
}

impl Default for Opt {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a UTF-16LE property string; `None` when the bytes are not valid
/// UTF-16LE.
fn decode_wide(data: &[u8]) -> Option<String> {
    encoding_rs::UTF_16LE
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|s| s.into_owned())
}

/// Encode a string as UTF-16LE without a byte-order mark.
fn encode_wide(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}
