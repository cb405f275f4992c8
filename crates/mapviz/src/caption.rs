use image::RgbaImage;
use schema::Caption;

use crate::color::{opaque, parse_hex_color};
use crate::text::draw_text;

/// Draws each caption at its absolute pixel position, top-left anchored.
pub fn draw_captions(image: &mut RgbaImage, captions: &[Caption]) {
    for caption in captions {
        if caption.text.is_empty() {
            continue;
        }
        let color = opaque(parse_hex_color(&caption.color));
        draw_text(image, i64::from(caption.x), i64::from(caption.y), &caption.text, color, caption.font_size);
    }
}
