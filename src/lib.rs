//! Fractal gradient noise and noise-distorted biome classification.
//!
//! The numeric core (`permutation`, `gradient_noise`, `octave_stack`,
//! `biome_classifier`) is pure and thread-safe; `biome_map` and
//! `map_renderer` drive it over pixel grids and produce images.

pub mod biome_classifier;
pub mod biome_map;
pub mod error;
pub mod gradient_noise;
pub mod map_renderer;
pub mod octave_stack;
pub mod permutation;
pub mod settings;

pub use biome_classifier::{cell_seed, Biome, BiomeClassifier, BiomeOrigin};
pub use biome_map::BiomeMap;
pub use error::{RenderError, SettingsError};
pub use gradient_noise::{GradientNoise, SINGLE_OCTAVE_BOUND};
pub use map_renderer::{FieldRange, MapRenderer};
pub use octave_stack::{NoiseField, NoiseGenerator, Octave};
pub use permutation::{build_permutation_table, wrap_cell, PermutationTable};
pub use settings::GenerationSettings;
