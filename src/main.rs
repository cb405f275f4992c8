use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::ImageOutputFormat;
use log::info;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

mod cache;
mod model;

use animbuild::{AnimBuildConfig, AnimBuilder};
use cache::{Cache, render_key};
use mapviz::{Raster, render_map};
use model::{load_settings, load_turn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the cache directory
    #[arg(short, long, default_value = ".cache")]
    cache_dir: String,

    /// Path to the output directory
    #[arg(short, long, default_value = "output")]
    output_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single turn to a PNG
    Render {
        /// Path to the turn JSON file
        #[arg(short, long)]
        turn: PathBuf,

        /// Path to the render settings JSON file
        #[arg(short, long)]
        settings: PathBuf,

        /// Output filename, relative to the output directory
        #[arg(long, default_value = "map.png")]
        output: String,
    },

    /// Render a sequence of turns into an animated GIF
    Animate {
        /// Path to the render settings JSON file
        #[arg(short, long)]
        settings: PathBuf,

        /// Output filename, relative to the output directory
        #[arg(long, default_value = "animation.gif")]
        output: String,

        /// Display time of each frame in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u32,

        /// Also save every frame as a PNG in this directory, relative to the output directory
        #[arg(long)]
        frames_dir: Option<String>,

        /// Turn JSON files, in playback order
        #[arg(required = true)]
        turns: Vec<PathBuf>,
    },

    /// Clear the cache
    ClearCache,
}

fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let image = raster.to_image().context("Raster buffer does not match its size")?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(png)
}

fn render_turn(cache: &Cache, turn_path: &Path, settings_path: &Path, output_path: &Path) -> Result<()> {
    let turn = load_turn(turn_path)?;
    let settings = load_settings(settings_path)?;
    let key = render_key(&turn, &settings)?;

    let png = match cache.get_cached_file(&key) {
        Some(cached) => {
            info!("Using cached render {}", cached.display());
            fs::read(&cached).with_context(|| format!("Failed to read cached render {:?}", cached))?
        }
        None => {
            info!("Rendering turn {} from {}", turn.turn, turn_path.display());
            let raster = render_map(&turn, &settings)
                .with_context(|| format!("Failed to render turn {}", turn.turn))?;
            let png = encode_png(&raster)?;
            cache.save_to_cache(&key, &png).context("Failed to cache render")?;
            png
        }
    };

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(output_path, png)
        .with_context(|| format!("Failed to write map to {:?}", output_path))?;
    info!("Wrote map to {}", output_path.display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let cli = Cli::parse();

    let cache = Cache::new(&cli.cache_dir)
        .context("Failed to create cache")?;

    std::fs::create_dir_all(&cli.output_dir)
        .context("Failed to create output directory")?;

    match &cli.command {
        Commands::Render { turn, settings, output } => {
            let output_path = PathBuf::from(&cli.output_dir).join(output);
            render_turn(&cache, turn, settings, &output_path)?;
            info!("Done");
        },

        Commands::Animate { settings, output, delay_ms, frames_dir, turns } => {
            let settings = load_settings(settings)?;
            let turns = turns
                .iter()
                .map(load_turn)
                .collect::<Result<Vec<_>>>()?;

            let config = AnimBuildConfig {
                output_path: PathBuf::from(&cli.output_dir).join(output),
                frame_delay_ms: *delay_ms,
                frames_dir: frames_dir.as_ref().map(|dir| PathBuf::from(&cli.output_dir).join(dir)),
            };
            let path = AnimBuilder::new(config)
                .build(&turns, &settings)
                .context("Failed to build animation")?;
            info!("Wrote animation to {}", path.display());
        },

        Commands::ClearCache => {
            info!("Clearing cache");
            cache.clear()
                .context("Failed to clear cache")?;
            info!("Cache cleared");
        },
    }

    Ok(())
}
