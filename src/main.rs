use biome_mapper::{
    Biome, BiomeMap, GenerationSettings, MapRenderer, NoiseGenerator, PermutationTable,
    SINGLE_OCTAVE_BOUND,
};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "biome-mapper-cli")]
#[command(about = "Generate noise-distorted biome maps and fractal noise images")]
struct Args {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a window of the plane and save it as a PNG
    Biomes {
        #[arg(short = 'W', long, default_value = "512")]
        width: usize,
        #[arg(short = 'H', long, default_value = "512")]
        height: usize,
        /// World X coordinate of the top-left tile
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        origin_x: i64,
        /// World Y coordinate of the top-left tile
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        origin_y: i64,
        /// Pixel size of each tile in the output image
        #[arg(short, long, default_value = "1")]
        scale: u32,
        #[arg(short, long, default_value = "biomes.png")]
        output: PathBuf,
        /// Print an ANSI preview to the terminal
        #[arg(long)]
        ascii: bool,
        /// Also dump the classified grid as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Render one distortion field as a normalised grayscale PNG
    Noise {
        #[arg(long, value_enum, default_value = "x")]
        axis: Axis,
        #[arg(short = 'W', long, default_value = "512")]
        width: u32,
        #[arg(short = 'H', long, default_value = "512")]
        height: u32,
        #[arg(short, long, default_value = "noise.png")]
        output: PathBuf,
    },
    /// Scan a single-octave field for samples above a magnitude threshold
    Bounds {
        #[arg(short, long, default_value = "1000")]
        size: u32,
        #[arg(long, default_value_t = 1.0 / 80.0)]
        frequency: f64,
        #[arg(long, default_value_t = std::f64::consts::FRAC_1_SQRT_2)]
        threshold: f64,
    },
    /// Write the default settings to a JSON file
    Config {
        #[arg(short, long, default_value = "settings.json")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Axis {
    X,
    Y,
}

fn print_biome_ascii(map: &BiomeMap) {
    // Sample large maps down to roughly terminal size
    let sample_x = (map.width / 80).max(1);
    let sample_y = (map.height / 30).max(1);

    for y in (0..map.height).step_by(sample_y) {
        for x in (0..map.width).step_by(sample_x) {
            let (ch, color_code) = match map.tiles[y][x] {
                Biome::Plains => (',', "\x1b[92m"), // Light green
                Biome::Forest => ('♣', "\x1b[32m"), // Green
                Biome::Desert => ('=', "\x1b[93m"), // Yellow
                Biome::Snow => ('*', "\x1b[97m"),   // White
                Biome::Jungle => ('%', "\x1b[35m"), // Magenta
                Biome::Ocean => ('~', "\x1b[34m"),  // Blue
            };
            print!("{}{}\x1b[0m", color_code, ch);
        }
        println!();
    }
}

fn print_biome_info(map: &BiomeMap) {
    let total_tiles = (map.width * map.height).max(1);
    println!("\n\x1b[1mBiome Distribution:\x1b[0m");
    for (biome, count) in map.biome_counts() {
        let percentage = (count as f64 / total_tiles as f64) * 100.0;
        println!("  {:<7} {:>5.1}%", biome.name(), percentage);
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<GenerationSettings, Box<dyn Error>> {
    match path {
        Some(path) => Ok(GenerationSettings::load(path)?),
        None => Ok(GenerationSettings::default()),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(args.config.as_ref())?;

    match args.command {
        Command::Biomes {
            width,
            height,
            origin_x,
            origin_y,
            scale,
            output,
            ascii,
            json,
        } => {
            let classifier = settings.build_classifier()?;
            let map = BiomeMap::generate(&classifier, width, height, origin_x, origin_y);

            if ascii {
                print_biome_ascii(&map);
            }
            print_biome_info(&map);

            if let Some(json_path) = json {
                std::fs::write(&json_path, serde_json::to_string(&map)?)?;
                tracing::info!("Saved biome grid to {}", json_path.display());
            }

            let img = MapRenderer::render_biome_map(&map, scale)?;
            MapRenderer::save_png(img, &output)?;
            println!("Map saved as: {}", output.display());
        }
        Command::Noise {
            axis,
            width,
            height,
            output,
        } => {
            settings.validate()?;
            let table = PermutationTable::build(settings.permutation_seed);
            let generator = match axis {
                Axis::X => settings.x_noise(),
                Axis::Y => settings.y_noise(),
            };
            let img = MapRenderer::render_noise_field(&generator.bind(&table), width, height)?;
            MapRenderer::save_png(img, &output)?;
            println!("Noise saved as: {}", output.display());
        }
        Command::Bounds {
            size,
            frequency,
            threshold,
        } => {
            let table = PermutationTable::build(settings.permutation_seed);
            let generator = NoiseGenerator::single(frequency, 1.0);
            tracing::info!(size, frequency, threshold, "Scanning single-octave bounds");

            let (min, max, exceeding) = (0..size)
                .into_par_iter()
                .map(|x| {
                    let mut min = f64::MAX;
                    let mut max = f64::MIN;
                    let mut exceeding = 0usize;
                    for y in 0..size {
                        let value = generator.evaluate(x as f64, y as f64, &table);
                        min = min.min(value);
                        max = max.max(value);
                        if value.abs() > threshold {
                            exceeding += 1;
                        }
                    }
                    (min, max, exceeding)
                })
                .reduce(
                    || (f64::MAX, f64::MIN, 0),
                    |a, b| (a.0.min(b.0), a.1.max(b.1), a.2 + b.2),
                );

            println!("Samples:   {}", size as u64 * size as u64);
            println!("Range:     {:.6} to {:.6}", min, max);
            println!("Above {:.4}: {}", threshold, exceeding);
            if max > SINGLE_OCTAVE_BOUND || min < -SINGLE_OCTAVE_BOUND {
                tracing::warn!(min, max, "Single-octave output exceeded the theoretical bound");
            }
        }
        Command::Config { output } => {
            settings.save(&output)?;
            println!("Settings written to: {}", output.display());
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("\x1b[91mError: {}\x1b[0m", e);
        std::process::exit(1);
    }
}
