//! Scope computation: per-channel histogram and its plot.

pub mod histogram;
pub mod plot;

pub use histogram::{Channel, DEFAULT_NUM_BINS, Histogram};
pub use plot::{DEFAULT_PLOT_HEIGHT, render_histogram};
