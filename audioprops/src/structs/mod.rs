//! Data structures representing container headers.
//!
//! Contains the per-format header layouts, the lookup tables they index,
//! the format-neutral stream descriptor and the zone map used to patch
//! header fields after a metadata rewrite.

pub mod ac3;
pub mod descriptor;
pub mod dsf;
pub mod dts;
pub mod tables;
pub mod tta;
pub mod zone;
