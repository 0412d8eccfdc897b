//! Revenue Triage statistical primitives.

pub mod math;

pub use math::stats::*;
