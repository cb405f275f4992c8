use image::{ImageBuffer, Rgb, RgbaImage};

use crate::color::opaque;
use crate::influence::InfluenceMap;

/// Finished map: square, row-major RGBA, always opaque
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Uniform square raster
    pub fn blank(side: u32, color: Rgb<u8>) -> Self {
        RgbaImage::from_pixel(side, side, opaque(color)).into()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels.get(i..i + 4).and_then(|p| p.try_into().ok())
    }

    /// Copies the raster into an image buffer for encoders.
    pub fn to_image(&self) -> Option<RgbaImage> {
        ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
    }
}

impl From<RgbaImage> for Raster {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height, pixels: image.into_raw() }
    }
}

/// Scaled color grid the filters operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    side: usize,
    pixels: Vec<Rgb<u8>>,
}

impl PixelGrid {
    pub fn new(side: usize, fill: Rgb<u8>) -> Self {
        Self { side, pixels: vec![fill; side * side] }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb<u8> {
        self.pixels[y * self.side + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb<u8>) {
        self.pixels[y * self.side + x] = color;
    }

    fn fill_block(&mut self, x0: usize, y0: usize, size: usize, color: Rgb<u8>) {
        for y in y0..y0 + size {
            let row = y * self.side;
            self.pixels[row + x0..row + x0 + size].fill(color);
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.side as u32, self.side as u32, |x, y| {
            opaque(self.get(x as usize, y as usize))
        })
    }
}

/// Side in cells of the cropped map; zero or less means nothing to draw.
pub fn cropped_side(content_width: usize, margin: i32) -> i64 {
    content_width as i64 + 2 * i64::from(margin)
}

/// Paints each cropped cell's winning color as a `scale` x `scale` block.
pub fn rasterize(
    map: &InfluenceMap,
    palette: &[Rgb<u8>],
    background: Rgb<u8>,
    margin: i32,
    scale: usize,
) -> PixelGrid {
    let cells = cropped_side(map.width(), margin).max(0) as usize;
    let mut grid = PixelGrid::new(cells * scale, background);
    let margin = i64::from(margin);

    for v in 0..cells {
        for u in 0..cells {
            let (sx, sy) = (u as i64 - margin, v as i64 - margin);
            let color = map
                .winner(sx, sy)
                .and_then(|group| palette.get(group.0).copied())
                .unwrap_or(background);
            if color != background {
                grid.fill_block(u * scale, v * scale, scale, color);
            }
        }
    }

    grid
}
