//! # Formats Module
//!
//! JSON interchange between the engine and its callers.
//! File I/O lives in the app layer; everything here works on byte slices.

mod interchange;

pub use interchange::*;
