//! Prism Core: domain layer for histogram analysis and color grading.
//!
//! This crate contains the pixel pipeline: buffer types, the per-channel
//! histogram, the brightness/contrast/exposure grade, and the histogram
//! plot rasteriser. No GPU or framework dependencies.

pub mod color_management;
pub mod error;
pub mod image;
pub mod scopes;
pub mod transform;

// Re-exports for convenience.
pub use error::{CoreError, ScopeError};
pub use image::{GradedImage, PixelBuffer};
pub use scopes::histogram::{Channel, Histogram, compute_histogram, compute_histogram_par};
pub use transform::apply::{grade_graded, grade_image};
pub use transform::evaluate::{grade_pixel, grade_rgb};
pub use transform::params::GradingParams;
