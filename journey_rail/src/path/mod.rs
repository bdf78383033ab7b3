// path/mod.rs - Rail geometry: curve, frame table, anchored markers

pub mod curve;
pub mod frame_table;
pub mod markers;

pub use curve::*;
pub use frame_table::*;
pub use markers::*;
