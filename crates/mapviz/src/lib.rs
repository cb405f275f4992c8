pub mod caption;
pub mod color;
pub mod crop;
pub mod expansion;
pub mod filters;
pub mod influence;
pub mod legend;
pub mod raster;
pub mod text;

use image::Rgb;
use log::{debug, info, warn};
use schema::{MAP_SPAN, MAX_SCALE, RenderSettings, TurnData};
use thiserror::Error;

pub use color::parse_hex_color;
pub use expansion::calc_expansion_array;
pub use influence::GroupId;
pub use raster::Raster;

use influence::{GroupIndex, accumulate};
use legend::{LegendEntry, draw_legend, legend_font_size};

/// Largest raster side, in pixels, the renderer agrees to allocate
pub const MAX_RASTER_SIDE: u64 = 16384;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Raster side of {side}px exceeds the {limit}px limit")]
    RasterTooLarge { side: u64, limit: u64 },
}

pub type StatusOr<T> = Result<T, RenderError>;

fn checked_side(cells: i64, scale: u32) -> StatusOr<u32> {
    let side = cells.max(1) as u64 * u64::from(scale);
    if side > MAX_RASTER_SIDE {
        return Err(RenderError::RasterTooLarge { side, limit: MAX_RASTER_SIDE });
    }
    Ok(side as u32)
}

/// Side of the background-only raster returned for unusable input
fn fallback_cells(turn: &TurnData, settings: &RenderSettings) -> i64 {
    match settings.output_width {
        Some(width) if !settings.trim && width > 0 => i64::from(width),
        _ => i64::from(turn.width.clamp(1, MAP_SPAN)),
    }
}

/// Renders one turn into a finished, annotated raster.
///
/// Unusable input (scale 0, an empty map, a crop that leaves nothing) yields a
/// background-only raster. Only oversized rasters are an error.
pub fn render_map(turn: &TurnData, settings: &RenderSettings) -> StatusOr<Raster> {
    let background = parse_hex_color(&settings.background_color);

    if settings.scale == 0 || turn.width <= 0 {
        warn!("Nothing to render (scale {}, width {}), returning background", settings.scale, turn.width);
        let side = checked_side(fallback_cells(turn, settings), settings.scale.max(1))?;
        return Ok(Raster::blank(side, background));
    }

    let scale = if settings.scale > MAX_SCALE {
        warn!("Scale {} clamped to {}", settings.scale, MAX_SCALE);
        MAX_SCALE
    } else {
        settings.scale
    };

    info!(
        "Rendering turn {} ({} tribes, {} villages, {} groups)",
        turn.turn,
        turn.tribes.len(),
        turn.village_count(),
        settings.groups.len()
    );

    let groups = GroupIndex::new(&settings.groups);
    let accumulation = accumulate(turn, &groups, settings.top_spot_size);
    let influence = &accumulation.influence;

    let margin = crop::resolve_margin(settings, influence);
    let cells = raster::cropped_side(influence.width(), margin);
    let side = checked_side(cells, scale)?;
    if cells <= 0 {
        warn!("Crop margin {} leaves no content, returning background", margin);
        return Ok(Raster::blank(side, background));
    }
    debug!("Content width {}, margin {}, raster side {}px", influence.width(), margin, side);

    let palette: Vec<Rgb<u8>> = settings.groups.iter().map(|g| parse_hex_color(&g.color)).collect();
    let mut grid = raster::rasterize(influence, &palette, background, margin, scale as usize);

    // Smoothing must finish before borders read the grid
    if settings.smooth {
        filters::smooth(&mut grid);
    }
    if settings.draw_borders {
        filters::draw_borders(&mut grid, background, parse_hex_color(&settings.border_color));
    }

    let mut image = grid.to_image();

    if settings.draw_legend && !settings.groups.is_empty() {
        let entries: Vec<LegendEntry> = settings
            .groups
            .iter()
            .zip(&palette)
            .map(|(group, &color)| LegendEntry { name: group.name.clone(), color })
            .collect();
        let font_size = legend_font_size(image.width(), settings.legend_font_size);
        draw_legend(&mut image, &entries, &accumulation.quadrants.assign(), font_size);
    }

    caption::draw_captions(&mut image, &settings.captions);

    info!("Rendered {}x{} raster from {} placed villages", image.width(), image.height(), accumulation.placed);
    Ok(image.into())
}
