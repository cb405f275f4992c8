use image::{Rgb, RgbaImage};
use schema::MAP_SPAN;

use crate::color::opaque;
use crate::influence::GroupId;
use crate::text::{draw_text, line_height, text_width};

/// Percent scale for `RenderSettings::legend_font_size`
pub const LEGEND_FONT_SCALE: u32 = 100;
pub const MIN_LEGEND_FONT: u32 = 8;

/// Map corner a legend block is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// Tie-break order of the quadrant search
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Quadrant of a map coordinate, split at the map center
    pub fn of(x: i32, y: i32) -> Self {
        let half = MAP_SPAN / 2;
        match (x < half, y < half) {
            (true, true) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (false, false) => Quadrant::SouthEast,
        }
    }

    fn is_east(self) -> bool {
        matches!(self, Quadrant::NorthEast | Quadrant::SouthEast)
    }

    fn is_south(self) -> bool {
        matches!(self, Quadrant::SouthWest | Quadrant::SouthEast)
    }
}

/// Village count of every group per quadrant
#[derive(Debug, Clone, Default)]
pub struct QuadrantTally {
    counts: Vec<[u32; 4]>,
}

impl QuadrantTally {
    pub fn new(groups: usize) -> Self {
        Self { counts: vec![[0; 4]; groups] }
    }

    pub fn record(&mut self, GroupId(group): GroupId, x: i32, y: i32) {
        if let Some(counts) = self.counts.get_mut(group) {
            counts[Quadrant::of(x, y) as usize] += 1;
        }
    }

    #[cfg(test)]
    fn count(&self, GroupId(group): GroupId, quadrant: Quadrant) -> u32 {
        self.counts.get(group).map_or(0, |c| c[quadrant as usize])
    }

    /// Quadrant holding most of each group's villages. Groups with no villages get NorthWest.
    pub fn assign(&self) -> Vec<Quadrant> {
        self.counts
            .iter()
            .map(|counts| {
                let mut best = Quadrant::NorthWest;
                for quadrant in Quadrant::ALL {
                    if counts[quadrant as usize] > counts[best as usize] {
                        best = quadrant;
                    }
                }
                best
            })
            .collect()
    }
}

/// Group name and color as shown in the legend
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb<u8>,
}

/// Legend text height for a raster of the given width
pub fn legend_font_size(raster_width: u32, legend_font_size: u32) -> u32 {
    let size = u64::from(raster_width) * u64::from(legend_font_size) / u64::from(LEGEND_FONT_SCALE);
    u32::try_from(size).unwrap_or(u32::MAX).max(MIN_LEGEND_FONT)
}

/// Stacks each quadrant's group names in its corner, in group order.
pub fn draw_legend(image: &mut RgbaImage, entries: &[LegendEntry], assignment: &[Quadrant], font_size: u32) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let line = i64::from(line_height(font_size));
    let pad = line / 2;

    for quadrant in Quadrant::ALL {
        let block: Vec<&LegendEntry> = entries
            .iter()
            .zip(assignment)
            .filter(|(_, q)| **q == quadrant)
            .map(|(entry, _)| entry)
            .collect();

        let top = if quadrant.is_south() {
            height - pad - line * block.len() as i64
        } else {
            pad
        };

        for (row, entry) in block.iter().enumerate() {
            let x = if quadrant.is_east() {
                width - pad - i64::from(text_width(&entry.name, font_size))
            } else {
                pad
            };
            let y = top + line * row as i64;
            draw_text(image, x, y, &entry.name, opaque(entry.color), font_size);
        }
    }
}
