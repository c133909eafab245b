//! Ember Core - color providers for the path tracer.
//!
//! This crate provides:
//!
//! - **Textures**: solid, checker, image-lookup, and procedural-noise
//!   implementations of the `Texture` trait
//! - **Perlin noise**: deterministic gradient noise with multi-octave
//!   turbulence

pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{
    CheckerTexture, ImageData, ImageTexture, NoiseTexture, SolidColor, Texture, TextureError,
};
