use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage, imageops};
use log::{debug, info};
use rayon::prelude::*;
use schema::{RenderSettings, TurnData};

use mapviz::color::opaque;
use mapviz::{parse_hex_color, render_map};

/// Configuration for animation builds
#[derive(Debug, Clone)]
pub struct AnimBuildConfig {
    // Path of the animated GIF
    pub output_path: PathBuf,

    // Display time of each frame
    pub frame_delay_ms: u32,

    // Also write every padded frame as turn_<n>.png in this directory
    pub frames_dir: Option<PathBuf>,
}

impl Default for AnimBuildConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output/animation.gif"),
            frame_delay_ms: 500,
            frames_dir: None,
        }
    }
}

/// Renders a sequence of turns into one looping animation
pub struct AnimBuilder {
    config: AnimBuildConfig,
}

impl AnimBuilder {
    pub fn new(config: AnimBuildConfig) -> Self {
        Self { config }
    }

    /// Renders every turn with the same settings and writes the GIF.
    ///
    /// Frames keep the order of `turns`. Returns the path of the GIF.
    pub fn build(&self, turns: &[TurnData], settings: &RenderSettings) -> Result<PathBuf> {
        if turns.is_empty() {
            bail!("No turns to animate");
        }
        info!("Rendering {} turns", turns.len());

        let images = turns
            .par_iter()
            .map(|turn| {
                let raster = render_map(turn, settings)
                    .with_context(|| format!("Failed to render turn {}", turn.turn))?;
                raster
                    .to_image()
                    .with_context(|| format!("Raster of turn {} has an invalid buffer", turn.turn))
            })
            .collect::<Result<Vec<RgbaImage>>>()?;

        let background = opaque(parse_hex_color(&settings.background_color));
        let frames = pad_frames(&images, background);

        if let Some(frames_dir) = &self.config.frames_dir {
            self.write_frames(frames_dir, turns, &frames)?;
        }

        self.write_gif(frames)?;
        info!("Wrote animation to {:?}", self.config.output_path);
        Ok(self.config.output_path.clone())
    }

    fn write_frames(&self, frames_dir: &Path, turns: &[TurnData], frames: &[RgbaImage]) -> Result<()> {
        fs::create_dir_all(frames_dir).context("Failed to create frames directory")?;

        frames.par_iter().zip(turns).try_for_each(|(frame, turn)| {
            let path = frames_dir.join(format!("turn_{}.png", turn.turn));
            debug!("Saving frame {:?}", path);
            frame
                .save_with_format(&path, ImageFormat::Png)
                .with_context(|| format!("Failed to save frame to {:?}", path))
        })
    }

    fn write_gif(&self, frames: Vec<RgbaImage>) -> Result<()> {
        let path = &self.config.output_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create animation directory")?;
        }

        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder.set_repeat(Repeat::Infinite).context("Failed to set GIF looping")?;

        let delay = Delay::from_numer_denom_ms(self.config.frame_delay_ms, 1);
        encoder
            .encode_frames(frames.into_iter().map(|image| Frame::from_parts(image, 0, 0, delay)))
            .context("Failed to encode GIF frames")?;
        Ok(())
    }
}

/// Centers every image on a square background canvas of the largest side.
pub fn pad_frames(images: &[RgbaImage], background: image::Rgba<u8>) -> Vec<RgbaImage> {
    let side = images
        .iter()
        .map(|image| image.width().max(image.height()))
        .max()
        .unwrap_or(0);

    images
        .iter()
        .map(|image| {
            let mut canvas = RgbaImage::from_pixel(side, side, background);
            let x = i64::from((side - image.width()) / 2);
            let y = i64::from((side - image.height()) / 2);
            imageops::overlay(&mut canvas, image, x, y);
            canvas
        })
        .collect()
}
