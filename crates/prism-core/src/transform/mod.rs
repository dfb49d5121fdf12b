//! Transform pipeline: parameter definitions, per-pixel evaluation, and buffer application.

pub mod apply;
pub mod evaluate;
pub mod params;
