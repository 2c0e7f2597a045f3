use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use noise::NoiseFn;
use rayon::prelude::*;
use std::path::Path;

use crate::biome_map::BiomeMap;
use crate::error::RenderError;

/// Empirical value range of a sampled field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn of(samples: &[f64]) -> Self {
        samples.iter().fold(
            FieldRange {
                min: f64::MAX,
                max: f64::MIN,
            },
            |range, &value| FieldRange {
                min: range.min.min(value),
                max: range.max.max(value),
            },
        )
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

pub struct MapRenderer;

impl MapRenderer {
    /// Renders a biome map, each tile becoming a `scale`x`scale` block
    pub fn render_biome_map(map: &BiomeMap, scale: u32) -> Result<RgbImage, RenderError> {
        let scale = scale.max(1);
        let scaled = |tiles: usize| u32::try_from(tiles).ok().and_then(|t| t.checked_mul(scale));
        let (width, height) = match (scaled(map.width), scaled(map.height)) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                return Err(RenderError::ImageTooLarge {
                    width: map.width,
                    height: map.height,
                    scale,
                })
            }
        };
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        let mut img = ImageBuffer::new(width, height);

        for (ty, row) in map.tiles.iter().enumerate() {
            for (tx, biome) in row.iter().enumerate() {
                let [r, g, b, _] = biome.color();
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(tx as u32 * scale + dx, ty as u32 * scale + dy, Rgb([r, g, b]));
                    }
                }
            }
        }

        Ok(img)
    }

    /// Samples `field` at integer coordinates, row-major.
    pub fn sample_field<F>(field: &F, width: u32, height: u32) -> Vec<f64>
    where
        F: NoiseFn<f64, 2> + Sync,
    {
        (0..height)
            .into_par_iter()
            .flat_map_iter(|y| (0..width).map(move |x| field.get([x as f64, y as f64])))
            .collect()
    }

    /// Renders a field as grayscale, stretched over its sampled min/max.
    ///
    /// A flat field (e.g. every octave with zero amplitude) is reported as
    /// [`RenderError::FlatField`] rather than divided by zero.
    pub fn render_noise_field<F>(field: &F, width: u32, height: u32) -> Result<GrayImage, RenderError>
    where
        F: NoiseFn<f64, 2> + Sync,
    {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }

        let samples = Self::sample_field(field, width, height);
        let range = FieldRange::of(&samples);
        tracing::debug!(min = range.min, max = range.max, "sampled noise field");
        if range.span() <= 0.0 {
            return Err(RenderError::FlatField(range.min));
        }

        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let value = samples[(y * width + x) as usize];
            let normalized = (value - range.min) / range.span();
            Luma([(normalized * 255.0).round() as u8])
        });
        Ok(img)
    }

    pub fn save_png(img: impl Into<DynamicImage>, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        img.into().save(path)?;
        tracing::info!("Saved image to {}", path.display());
        Ok(())
    }
}
