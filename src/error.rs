use thiserror::Error;

/// Errors raised while loading, saving or validating generation settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cell separation must be finite and positive, got {0}")]
    InvalidCellSeparation(f64),
    #[error("Noise effect must be finite and non-negative, got {0}")]
    InvalidNoiseEffect(f64),
    #[error("Octave {index} of the {axis} generator has invalid frequency {frequency}")]
    InvalidFrequency {
        axis: &'static str,
        index: usize,
        frequency: f64,
    },
    #[error("Octave {index} of the {axis} generator has invalid amplitude {amplitude}")]
    InvalidAmplitude {
        axis: &'static str,
        index: usize,
        amplitude: f64,
    },
    #[error("Biome palette is empty")]
    EmptyPalette,
}

/// Errors raised while rasterising or writing images.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The sampled field has identical min and max, so it cannot be normalised.
    #[error("Noise field is flat (every sample equals {0}), nothing to normalise")]
    FlatField(f64),
    #[error("Image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("Image of {width}x{height} tiles at scale {scale} does not fit in u32 pixels")]
    ImageTooLarge {
        width: usize,
        height: usize,
        scale: u32,
    },
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
