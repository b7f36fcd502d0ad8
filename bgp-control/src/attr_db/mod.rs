//! Path-attribute interning database (SPEC_FULL §4.C).

pub mod attr;
pub mod interner;

pub use attr::{AttrDb, BgpAttrSpec, UnknownAttr, prepend_asn};
pub use interner::{Handle, Interner};
