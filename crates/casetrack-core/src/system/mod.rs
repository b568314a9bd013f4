//! # System Module
//!
//! Pipeline stages and stage classification.
//!
//! Classification is pure and deterministic: the same record and the same
//! reference date always yield the same stage, so it lives in the core next
//! to the scheduler rather than in the application layer.

mod stage;

pub use stage::*;
