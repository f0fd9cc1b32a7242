//! Static and compound dictionary engines, both addressed through distances
//! that fall beyond the sliding window.

pub mod compound;
pub mod static_dict;

pub use compound::CompoundDictionary;
