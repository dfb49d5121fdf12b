//! Color management: transfer functions between encoded and linear light.

pub mod transfer;

pub use transfer::{DISPLAY_GAMMA, Gamma22, TransferFunction};
