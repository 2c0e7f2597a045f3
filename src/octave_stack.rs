use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use crate::gradient_noise::{GradientNoise, SINGLE_OCTAVE_BOUND};
use crate::permutation::PermutationTable;

/// One frequency/amplitude layer of a fractal noise sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    pub frequency: f64,
    pub amplitude: f64,
}

impl Octave {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Octave { frequency, amplitude }
    }
}

/// Sums gradient noise over an ordered list of octaves.
///
/// The generator holds no table of its own; the same table is passed to
/// every evaluation so both distortion axes can share it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseGenerator {
    octaves: Vec<Octave>,
}

impl NoiseGenerator {
    pub fn new(octaves: Vec<Octave>) -> Self {
        NoiseGenerator { octaves }
    }

    pub fn single(frequency: f64, amplitude: f64) -> Self {
        Self::new(vec![Octave::new(frequency, amplitude)])
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    /// Upper bound for the magnitude of [`NoiseGenerator::evaluate`].
    pub fn amplitude_sum(&self) -> f64 {
        self.octaves
            .iter()
            .map(|octave| octave.amplitude.abs() * SINGLE_OCTAVE_BOUND)
            .sum()
    }

    /// No clamping is applied; callers that need [0, 1] rescale themselves.
    pub fn evaluate(&self, x: f64, y: f64, table: &PermutationTable) -> f64 {
        let noise = GradientNoise::new(table);
        self.octaves
            .iter()
            .map(|octave| {
                noise.evaluate(x * octave.frequency, y * octave.frequency) * octave.amplitude
            })
            .sum()
    }

    pub fn bind<'a>(&'a self, table: &'a PermutationTable) -> NoiseField<'a> {
        NoiseField {
            generator: self,
            table,
        }
    }
}

/// A generator paired with its table, usable anywhere a `noise` field is.
#[derive(Debug, Clone, Copy)]
pub struct NoiseField<'a> {
    generator: &'a NoiseGenerator,
    table: &'a PermutationTable,
}

impl NoiseFn<f64, 2> for NoiseField<'_> {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.generator.evaluate(point[0], point[1], self.table)
    }
}
