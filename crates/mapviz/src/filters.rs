use image::Rgb;
use log::debug;

use crate::raster::PixelGrid;

/// Neighborhood radius of the majority filter
pub const SMOOTH_DISTANCE: usize = 2;

/// Pixels this close to an edge are never filtered
pub const FILTER_MARGIN: usize = SMOOTH_DISTANCE;

fn interior(grid: &PixelGrid) -> impl Iterator<Item = (usize, usize)> {
    let side = grid.side();
    let end = side.saturating_sub(FILTER_MARGIN);
    (FILTER_MARGIN..end).flat_map(move |y| (FILTER_MARGIN..end).map(move |x| (x, y)))
}

/// Repaints pixels that are a minority in their neighborhood.
///
/// A pixel whose color fills less than half of the (2d+1)x(2d+1) window takes
/// the first color, in row-major window order, that outnumbers it. All
/// changes are computed before any is applied. Returns the number of changes.
pub fn smooth(grid: &mut PixelGrid) -> usize {
    let d = SMOOTH_DISTANCE;
    let area = ((2 * d + 1) * (2 * d + 1)) as u32;
    let mut tally: Vec<(Rgb<u8>, u32)> = Vec::with_capacity(8);
    let mut corrections = Vec::new();

    for (x, y) in interior(grid) {
        tally.clear();
        for ny in y - d..=y + d {
            for nx in x - d..=x + d {
                let color = grid.get(nx, ny);
                match tally.iter_mut().find(|(c, _)| *c == color) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((color, 1)),
                }
            }
        }

        let center = grid.get(x, y);
        let own = tally.iter().find(|(c, _)| *c == center).map_or(0, |&(_, n)| n);
        if 2 * own >= area {
            continue;
        }
        if let Some(&(color, _)) = tally.iter().find(|&&(c, n)| c != center && n > own) {
            corrections.push((x, y, color));
        }
    }

    let changed = corrections.len();
    for (x, y, color) in corrections {
        grid.set(x, y, color);
    }
    debug!("Smoothing repainted {} pixels", changed);
    changed
}

/// Outlines boundaries between two different non-background regions.
///
/// Returns the number of pixels recolored.
pub fn draw_borders(grid: &mut PixelGrid, background: Rgb<u8>, border: Rgb<u8>) -> usize {
    let mut edges = Vec::new();

    for (x, y) in interior(grid) {
        let color = grid.get(x, y);
        if color == background {
            continue;
        }
        let neighbors = [
            grid.get(x - 1, y),
            grid.get(x + 1, y),
            grid.get(x, y - 1),
            grid.get(x, y + 1),
        ];
        if neighbors.iter().any(|&n| n != color && n != background) {
            edges.push((x, y));
        }
    }

    let changed = edges.len();
    for (x, y) in edges {
        grid.set(x, y, border);
    }
    debug!("Border pass recolored {} pixels", changed);
    changed
}
