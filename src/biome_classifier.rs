use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::octave_stack::NoiseGenerator;
use crate::permutation::PermutationTable;

// Keeps the i-keyed and j-keyed streams apart so (i, j) and (j, i) differ
const CELL_Y_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Snow,
    Jungle,
    Ocean,
}

impl Biome {
    pub const ALL: [Biome; 6] = [
        Biome::Plains,
        Biome::Forest,
        Biome::Desert,
        Biome::Snow,
        Biome::Jungle,
        Biome::Ocean,
    ];

    pub fn color(&self) -> [u8; 4] {
        match self {
            Biome::Plains => [120, 180, 90, 255],  // Light green grassland
            Biome::Forest => [50, 120, 50, 255],   // Forest green
            Biome::Desert => [230, 210, 170, 255], // Desert sand
            Biome::Snow => [245, 245, 250, 255],   // Snow white
            Biome::Jungle => [30, 90, 30, 255],    // Dense dark green
            Biome::Ocean => [5, 40, 120, 255],     // Ocean blue
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Biome::Plains => "Plains",
            Biome::Forest => "Forest",
            Biome::Desert => "Desert",
            Biome::Snow => "Snow",
            Biome::Jungle => "Jungle",
            Biome::Ocean => "Ocean",
        }
    }
}

/// A jittered cell centre. Recomputed on every query, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeOrigin {
    pub cell: (i64, i64),
    pub x: f64,
    pub y: f64,
    pub biome: Biome,
}

impl BiomeOrigin {
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Derives the RNG seed for cell `(i, j)`.
///
/// One ChaCha8 stream is seeded from `i` and one from `j ^ CELL_Y_SALT`; the
/// first word of each is combined with `biome_seed`.
pub fn cell_seed(biome_seed: u64, cell_x: i64, cell_y: i64) -> u64 {
    let a = ChaCha8Rng::seed_from_u64(cell_x as u64).next_u64();
    let b = ChaCha8Rng::seed_from_u64(cell_y as u64 ^ CELL_Y_SALT).next_u64();
    biome_seed ^ a ^ b.rotate_left(32)
}

/// Partitions the plane into noise-distorted cells, one biome per cell.
#[derive(Debug, Clone)]
pub struct BiomeClassifier {
    table: PermutationTable,
    x_noise: NoiseGenerator,
    y_noise: NoiseGenerator,
    cell_separation: f64,
    noise_effect: f64,
    palette: Vec<Biome>,
    biome_seed: u64,
}

impl BiomeClassifier {
    pub fn new(
        table: PermutationTable,
        x_noise: NoiseGenerator,
        y_noise: NoiseGenerator,
        cell_separation: f64,
        noise_effect: f64,
        palette: Vec<Biome>,
        biome_seed: u64,
    ) -> Result<Self, SettingsError> {
        if !cell_separation.is_finite() || cell_separation <= 0.0 {
            return Err(SettingsError::InvalidCellSeparation(cell_separation));
        }
        if !noise_effect.is_finite() || noise_effect < 0.0 {
            return Err(SettingsError::InvalidNoiseEffect(noise_effect));
        }
        if palette.is_empty() {
            return Err(SettingsError::EmptyPalette);
        }

        tracing::debug!(
            cell_separation,
            noise_effect,
            palette_len = palette.len(),
            "created biome classifier"
        );
        Ok(BiomeClassifier {
            table,
            x_noise,
            y_noise,
            cell_separation,
            noise_effect,
            palette,
            biome_seed,
        })
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    pub fn x_noise(&self) -> &NoiseGenerator {
        &self.x_noise
    }

    pub fn y_noise(&self) -> &NoiseGenerator {
        &self.y_noise
    }

    pub fn cell_separation(&self) -> f64 {
        self.cell_separation
    }

    pub fn palette(&self) -> &[Biome] {
        &self.palette
    }

    /// Jittered origin and biome of grid cell `(cell_x, cell_y)`.
    ///
    /// Draw order is fixed: jitter x, jitter y, then the palette index.
    pub fn cell_origin(&self, cell_x: i64, cell_y: i64) -> BiomeOrigin {
        let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(self.biome_seed, cell_x, cell_y));
        let half = self.cell_separation / 2.0;
        let jitter_x = rng.gen_range(-half..half);
        let jitter_y = rng.gen_range(-half..half);
        let biome = self.palette[rng.gen_range(0..self.palette.len())];

        BiomeOrigin {
            cell: (cell_x, cell_y),
            x: cell_x as f64 * self.cell_separation + jitter_x,
            y: cell_y as f64 * self.cell_separation + jitter_y,
            biome,
        }
    }

    /// The four cells bracketing `(x, y)` in enumeration order:
    /// (floor, floor), (floor, ceil), (ceil, floor), (ceil, ceil).
    /// Duplicates are kept when a coordinate is integral.
    pub fn candidate_cells(&self, x: f64, y: f64) -> [(i64, i64); 4] {
        let biome_x = x / self.cell_separation;
        let biome_y = y / self.cell_separation;
        let (low_x, high_x) = (biome_x.floor() as i64, biome_x.ceil() as i64);
        let (low_y, high_y) = (biome_y.floor() as i64, biome_y.ceil() as i64);
        [
            (low_x, low_y),
            (low_x, high_y),
            (high_x, low_y),
            (high_x, high_y),
        ]
    }

    pub fn distorted_position(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = self.x_noise.evaluate(x, y, &self.table) * self.noise_effect;
        let dy = self.y_noise.evaluate(x, y, &self.table) * self.noise_effect;
        (x + dx, y + dy)
    }

    /// Candidate origin closest to the distorted query point. Ties keep the
    /// earlier candidate.
    pub fn nearest_origin(&self, x: f64, y: f64) -> BiomeOrigin {
        let (query_x, query_y) = self.distorted_position(x, y);
        let candidates = self.candidate_cells(x, y);

        let mut best = self.cell_origin(candidates[0].0, candidates[0].1);
        let mut best_distance = best.distance_to(query_x, query_y);
        for &(cell_x, cell_y) in &candidates[1..] {
            let origin = self.cell_origin(cell_x, cell_y);
            let distance = origin.distance_to(query_x, query_y);
            if distance < best_distance {
                best = origin;
                best_distance = distance;
            }
        }
        best
    }

    pub fn classify(&self, x: f64, y: f64) -> Biome {
        self.nearest_origin(x, y).biome
    }

    pub fn classify_color(&self, x: f64, y: f64) -> [u8; 4] {
        self.classify(x, y).color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octave_stack::Octave;
    use crate::settings::GenerationSettings;
    use std::collections::HashMap;

    fn flat_classifier(separation: f64) -> BiomeClassifier {
        BiomeClassifier::new(
            PermutationTable::build(2023),
            NoiseGenerator::new(Vec::new()),
            NoiseGenerator::new(Vec::new()),
            separation,
            0.0,
            Biome::ALL.to_vec(),
            0,
        )
        .unwrap()
    }

    fn distorted_classifier() -> BiomeClassifier {
        BiomeClassifier::new(
            PermutationTable::build(2023),
            NoiseGenerator::new(vec![Octave::new(1.0 / 80.0, 1.0), Octave::new(1.0 / 40.0, 0.5)]),
            NoiseGenerator::new(vec![Octave::new(1.0 / 70.0, 1.0), Octave::new(1.0 / 35.0, 0.5)]),
            100.0,
            40.0,
            Biome::ALL.to_vec(),
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let table = PermutationTable::build(1);
        let make = |separation: f64, effect: f64, palette: Vec<Biome>| {
            BiomeClassifier::new(
                table.clone(),
                NoiseGenerator::default(),
                NoiseGenerator::default(),
                separation,
                effect,
                palette,
                0,
            )
        };
        assert!(matches!(
            make(0.0, 1.0, Biome::ALL.to_vec()),
            Err(SettingsError::InvalidCellSeparation(_))
        ));
        assert!(matches!(
            make(f64::NAN, 1.0, Biome::ALL.to_vec()),
            Err(SettingsError::InvalidCellSeparation(_))
        ));
        assert!(matches!(
            make(10.0, -1.0, Biome::ALL.to_vec()),
            Err(SettingsError::InvalidNoiseEffect(_))
        ));
        assert!(matches!(make(10.0, 1.0, Vec::new()), Err(SettingsError::EmptyPalette)));
    }

    #[test]
    fn test_cell_seed_is_stable_and_asymmetric() {
        assert_eq!(cell_seed(0, 3, 9), cell_seed(0, 3, 9));
        assert_ne!(cell_seed(0, 3, 9), cell_seed(0, 9, 3));
        assert_ne!(cell_seed(0, 4, 4), cell_seed(0, -4, -4));
        assert_ne!(cell_seed(0, 1, 2), cell_seed(1, 1, 2));
    }

    #[test]
    fn test_cell_origin_within_cell() {
        let classifier = flat_classifier(100.0);
        for i in -10..10 {
            for j in -10..10 {
                let origin = classifier.cell_origin(i, j);
                assert_eq!(origin, classifier.cell_origin(i, j));
                let dx = origin.x - i as f64 * 100.0;
                let dy = origin.y - j as f64 * 100.0;
                assert!((-50.0..50.0).contains(&dx), "dx {}", dx);
                assert!((-50.0..50.0).contains(&dy), "dy {}", dy);
            }
        }
    }

    #[test]
    fn test_candidate_order() {
        let classifier = flat_classifier(100.0);
        assert_eq!(
            classifier.candidate_cells(150.0, 260.0),
            [(1, 2), (1, 3), (2, 2), (2, 3)]
        );
        assert_eq!(
            classifier.candidate_cells(-50.0, 10.0),
            [(-1, 0), (-1, 1), (0, 0), (0, 1)]
        );
        // On a grid line the duplicates stay in place
        assert_eq!(
            classifier.candidate_cells(200.0, 50.0),
            [(2, 0), (2, 1), (2, 0), (2, 1)]
        );
    }

    #[test]
    fn test_known_cell_draws() {
        let classifier = flat_classifier(100.0);
        let expected = [
            ((0, 0), 35.033334960975694, 24.02367171301674, Biome::Forest),
            ((0, 1), 41.01961434785014, -47.59728554349509, Biome::Jungle),
            ((1, 0), 44.493819376866895, 1.186688240374714, Biome::Desert),
            ((1, 1), 32.095830805952204, 36.94200995976584, Biome::Ocean),
        ];
        for (cell, jitter_x, jitter_y, biome) in expected {
            let origin = classifier.cell_origin(cell.0, cell.1);
            assert_eq!(origin.cell, cell);
            assert_eq!(origin.x, cell.0 as f64 * 100.0 + jitter_x);
            assert_eq!(origin.y, cell.1 as f64 * 100.0 + jitter_y);
            assert_eq!(origin.biome, biome);
        }
    }

    #[test]
    fn test_hand_computed_example() {
        // Undistorted query (50, 50) against the draws above:
        // (0,0) ~29.98, (0,1) ~9.30, (1,0) ~106.36, (1,1) ~119.58
        let classifier = flat_classifier(100.0);
        let nearest = classifier.nearest_origin(50.0, 50.0);
        assert_eq!(nearest.cell, (0, 1));
        assert_eq!(nearest.x, 41.01961434785014);
        assert_eq!(nearest.y, 52.40271445650491);
        assert_eq!(classifier.classify(50.0, 50.0), Biome::Jungle);
        assert_eq!(classifier.classify_color(50.0, 50.0), Biome::Jungle.color());
    }

    #[test]
    fn test_known_default_classification() {
        let classifier = GenerationSettings::default().build_classifier().unwrap();
        let nearest = classifier.nearest_origin(50.0, 50.0);
        assert_eq!(nearest.cell, (0, 1));
        assert_eq!(nearest.x, 41.01961434785014);
        assert_eq!(nearest.y, 52.40271445650491);
        assert_eq!(nearest.biome, Biome::Jungle);
    }

    #[test]
    fn test_zero_effect_ignores_noise() {
        let flat = flat_classifier(100.0);
        let noisy = BiomeClassifier::new(
            PermutationTable::build(2023),
            NoiseGenerator::single(0.01, 5.0),
            NoiseGenerator::single(0.02, 5.0),
            100.0,
            0.0,
            Biome::ALL.to_vec(),
            0,
        )
        .unwrap();
        for i in 0..40 {
            let x = i as f64 * 13.7;
            let y = i as f64 * 7.1 - 90.0;
            assert_eq!(flat.distorted_position(x, y), (x, y));
            assert_eq!(flat.nearest_origin(x, y), noisy.nearest_origin(x, y));
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = distorted_classifier();
        let b = distorted_classifier();
        for i in 0..100 {
            let x = i as f64 * 17.3 - 400.0;
            let y = i as f64 * 9.1 + 12.0;
            assert_eq!(a.nearest_origin(x, y), a.nearest_origin(x, y));
            assert_eq!(a.nearest_origin(x, y), b.nearest_origin(x, y));
        }
    }

    #[test]
    fn test_distortion_moves_query() {
        let classifier = distorted_classifier();
        let moved = (0..100).any(|i| {
            let x = i as f64 * 11.3 + 0.5;
            let (qx, qy) = classifier.distorted_position(x, 37.25);
            qx != x || qy != 37.25
        });
        assert!(moved);
    }

    #[test]
    fn test_no_flicker_along_scan() {
        // Undistorted only: with a fixed candidate set the nearest-origin
        // regions along a line are intervals, so an origin is never revisited.
        // Once distortion is on, candidates still come from the undistorted
        // point, so short runs can appear near cell corners.
        let classifier = flat_classifier(100.0);
        for row in 0..20 {
            let y = 305.0 + row as f64 * 4.5;
            let mut visited: Vec<(i64, i64)> = Vec::new();
            for step in 1..2000 {
                let x = 200.0 + step as f64 * 0.05;
                let cell = classifier.nearest_origin(x, y).cell;
                match visited.last() {
                    Some(&last) if last == cell => {}
                    _ => {
                        assert!(!visited.contains(&cell), "origin {:?} revisited", cell);
                        visited.push(cell);
                    }
                }
            }
            assert!(visited.len() <= 4);
        }
    }

    #[test]
    fn test_distorted_scan_crosses_boundary_once() {
        // Columns chosen away from cell corners under the default settings
        let classifier = GenerationSettings::default().build_classifier().unwrap();
        for x in [20.5, 50.5] {
            let mut visited: Vec<(i64, i64)> = Vec::new();
            for step in 1..2000 {
                let y = step as f64 * 0.05;
                let cell = classifier.nearest_origin(x, y).cell;
                if visited.last() != Some(&cell) {
                    visited.push(cell);
                }
            }
            assert_eq!(visited, vec![(0, 0), (0, 1)], "column x = {}", x);
        }
    }

    #[test]
    fn test_palette_coverage() {
        let classifier = flat_classifier(100.0);
        let mut counts: HashMap<Biome, usize> = HashMap::new();
        for i in 0..100 {
            for j in 0..100 {
                *counts.entry(classifier.cell_origin(i, j).biome).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), Biome::ALL.len());
        // Expected ~1667 per biome out of 10000
        for biome in Biome::ALL {
            let count = counts[&biome];
            assert!((1400..=1950).contains(&count), "{:?}: {}", biome, count);
        }
    }

    #[test]
    fn test_custom_palette_only_uses_its_entries() {
        let classifier = BiomeClassifier::new(
            PermutationTable::build(2023),
            NoiseGenerator::default(),
            NoiseGenerator::default(),
            50.0,
            0.0,
            vec![Biome::Snow, Biome::Ocean],
            7,
        )
        .unwrap();
        for i in 0..30 {
            let biome = classifier.classify(i as f64 * 21.0, i as f64 * -13.0);
            assert!(biome == Biome::Snow || biome == Biome::Ocean);
        }
    }
}
