use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::biome_classifier::{Biome, BiomeClassifier};
use crate::error::SettingsError;
use crate::octave_stack::{NoiseGenerator, Octave};
use crate::permutation::PermutationTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub permutation_seed: u64, // shuffles the shared permutation table
    pub biome_seed: u64,       // mixed into every per-cell seed
    pub cell_separation: f64,  // distance between neighbouring cell centres
    pub noise_effect: f64,     // how far the distortion fields push a query
    pub x_octaves: Vec<Octave>,
    pub y_octaves: Vec<Octave>,
    pub palette: Vec<Biome>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            permutation_seed: 2023,
            biome_seed: 0,
            cell_separation: 100.0,
            noise_effect: 40.0,
            x_octaves: vec![
                Octave::new(1.0 / 80.0, 1.0),
                Octave::new(1.0 / 40.0, 0.5),
                Octave::new(1.0 / 20.0, 0.25),
            ],
            // Different frequencies keep the two axes from moving in lockstep
            y_octaves: vec![
                Octave::new(1.0 / 70.0, 1.0),
                Octave::new(1.0 / 35.0, 0.5),
                Octave::new(1.0 / 17.5, 0.25),
            ],
            palette: Biome::ALL.to_vec(),
        }
    }
}

impl GenerationSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let settings: GenerationSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.cell_separation.is_finite() || self.cell_separation <= 0.0 {
            return Err(SettingsError::InvalidCellSeparation(self.cell_separation));
        }
        if !self.noise_effect.is_finite() || self.noise_effect < 0.0 {
            return Err(SettingsError::InvalidNoiseEffect(self.noise_effect));
        }
        validate_octaves("x", &self.x_octaves)?;
        validate_octaves("y", &self.y_octaves)?;
        if self.palette.is_empty() {
            return Err(SettingsError::EmptyPalette);
        }
        Ok(())
    }

    pub fn x_noise(&self) -> NoiseGenerator {
        NoiseGenerator::new(self.x_octaves.clone())
    }

    pub fn y_noise(&self) -> NoiseGenerator {
        NoiseGenerator::new(self.y_octaves.clone())
    }

    pub fn build_classifier(&self) -> Result<BiomeClassifier, SettingsError> {
        self.validate()?;
        BiomeClassifier::new(
            PermutationTable::build(self.permutation_seed),
            self.x_noise(),
            self.y_noise(),
            self.cell_separation,
            self.noise_effect,
            self.palette.clone(),
            self.biome_seed,
        )
    }
}

// Zero amplitude is allowed; it just makes that octave contribute nothing
fn validate_octaves(axis: &'static str, octaves: &[Octave]) -> Result<(), SettingsError> {
    for (index, octave) in octaves.iter().enumerate() {
        if !octave.frequency.is_finite() || octave.frequency <= 0.0 {
            return Err(SettingsError::InvalidFrequency {
                axis,
                index,
                frequency: octave.frequency,
            });
        }
        if !octave.amplitude.is_finite() || octave.amplitude < 0.0 {
            return Err(SettingsError::InvalidAmplitude {
                axis,
                index,
                amplitude: octave.amplitude,
            });
        }
    }
    Ok(())
}
