//! Keyed reconciliation of chart marks: diff two key snapshots, then reuse, create or
//! retire elements with tweens so data changes morph instead of jumping.

pub mod diff;
pub mod ext;
pub mod layer;
