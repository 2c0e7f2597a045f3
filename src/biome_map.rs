use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biome_classifier::{Biome, BiomeClassifier};

/// A rectangular window of classified tiles, one per integer coordinate.
#[derive(Debug, Serialize, Deserialize)]
pub struct BiomeMap {
    pub width: usize,
    pub height: usize,
    pub origin_x: i64,
    pub origin_y: i64,
    pub tiles: Vec<Vec<Biome>>,
}

impl BiomeMap {
    /// Classifies `(origin_x + x, origin_y + y)` for every tile. Rows are
    /// processed in parallel; each classification seeds its own RNGs.
    pub fn generate(
        classifier: &BiomeClassifier,
        width: usize,
        height: usize,
        origin_x: i64,
        origin_y: i64,
    ) -> Self {
        tracing::info!(
            width,
            height,
            origin_x,
            origin_y,
            "Classifying biome map"
        );

        let tiles: Vec<Vec<Biome>> = (0..height)
            .into_par_iter()
            .map(|y| {
                let world_y = (origin_y + y as i64) as f64;
                (0..width)
                    .map(|x| classifier.classify((origin_x + x as i64) as f64, world_y))
                    .collect()
            })
            .collect();

        BiomeMap {
            width,
            height,
            origin_x,
            origin_y,
            tiles,
        }
    }

    pub fn get_tile(&self, x: usize, y: usize) -> Option<Biome> {
        if x < self.width && y < self.height {
            Some(self.tiles[y][x])
        } else {
            None
        }
    }

    /// Tile count per biome, listed in `Biome::ALL` order. Biomes that never
    /// occur are included with a count of zero.
    pub fn biome_counts(&self) -> Vec<(Biome, usize)> {
        let mut counts: Vec<(Biome, usize)> = Biome::ALL.iter().map(|&b| (b, 0)).collect();
        for row in &self.tiles {
            for tile in row {
                if let Some(entry) = counts.iter_mut().find(|(biome, _)| biome == tile) {
                    entry.1 += 1;
                }
            }
        }
        counts
    }
}
