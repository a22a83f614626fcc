//! Codec for Microsoft Office Drawing ("Escher"/MS-ODRAW) records as they
//! are embedded in legacy Excel binary workbooks.
//!
//! The workbook stream stores drawing objects (shapes, shape groups,
//! drawing canvases, per-shape property tables) as variable-length,
//! type-tagged binary blocks. This crate decodes those blocks into a
//! mutable object model and re-encodes them byte-compatibly after
//! mutation. The surrounding container format (the BIFF record stream that
//! locates the drawing byte ranges) is deliberately out of scope: the
//! codec consumes a payload slice plus the already-split header triple and
//! hands back serialized bytes.
//!
//! # Supported records
//!
//! - Drawing-group and per-drawing metadata ([`Dgg`], [`Dg`])
//! - Group coordinate systems and shape identities ([`Spgr`], [`Sp`])
//! - Cell anchors ([`ClientAnchor`]) and menu colors ([`SplitMenuColors`])
//! - The shape property table ([`Opt`]), including complex (variable
//!   length) properties and packed color references
//!
//! # Example
//!
//! ```
//! use longan_escher::{consts::shape_type, EscherRecord, Opt, RecordBody, Sp, SpFlags};
//!
//! // build a named text box shape
//! let mut sp = Sp::new();
//! sp.set_shape_id(1025);
//! sp.set_flags(SpFlags::HAVE_ANCHOR | SpFlags::HAVE_SPT);
//! let mut sp_record = EscherRecord::new_sp(shape_type::TEXT_BOX, sp);
//!
//! let mut opt = Opt::new();
//! opt.set_shape_name("Notes");
//! let mut opt_record = EscherRecord::new_opt(opt);
//!
//! let sp_bytes = sp_record.serialize();
//! assert_eq!(sp_bytes.len(), 16); // 8-byte header + id and flags
//!
//! let opt_bytes = opt_record.serialize();
//!
//! // the container hands the header triple and payload back for decoding
//! let decoded = EscherRecord::decode(0xF00B, 1, 3, &opt_bytes[8..])?;
//! match decoded.body() {
//!     RecordBody::Opt(opt) => assert_eq!(opt.shape_name(), "Notes"),
//!     other => unreachable!("unexpected body: {other:?}"),
//! }
//! # Ok::<(), longan_escher::EscherError>(())
//! ```

pub mod atoms;
pub mod binary;
pub mod color;
pub mod consts;
pub mod error;
pub mod header;
pub mod opt;
pub mod record;
pub mod types;

pub use atoms::{ClientAnchor, Dg, Dgg, Sp, SpFlags, Spgr, SplitMenuColors};
pub use color::{COLOR_TABLE, ResolvedColor, Rgb, resolve_color_ref};
pub use error::{EscherError, Result};
pub use header::RecordHeader;
pub use opt::{LineProperties, Opt, Property, PropertyId, PropertyValue};
pub use record::{EscherRecord, RecordBody};
pub use types::EscherRecordType;
