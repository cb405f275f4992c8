use image::{Rgb, Rgba};

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Parses `#RRGGBB` (any case). Anything else silently becomes black.
pub fn parse_hex_color(s: &str) -> Rgb<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 7 || bytes[0] != b'#' || !bytes[1..].iter().all(u8::is_ascii_hexdigit) {
        return BLACK;
    }

    // All seven bytes are ASCII here, so slicing on byte offsets is safe
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).unwrap_or(0);
    Rgb([channel(1), channel(3), channel(5)])
}

/// Opaque RGBA version of a resolved color
pub fn opaque(color: Rgb<u8>) -> Rgba<u8> {
    let [r, g, b] = color.0;
    Rgba([r, g, b, 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_colors() {
        assert_eq!(parse_hex_color("#8B50d3"), Rgb([139, 80, 211]));
        assert_eq!(parse_hex_color("#000000"), Rgb([0, 0, 0]));
        assert_eq!(parse_hex_color("#FFFFFF"), Rgb([255, 255, 255]));
        assert_eq!(parse_hex_color("#ff0000"), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_parse_every_channel_value() {
        for value in 0..=255u8 {
            let lower = format!("#{:02x}{:02x}{:02x}", value, 255 - value, value / 2);
            let upper = lower.to_uppercase();
            let expected = Rgb([value, 255 - value, value / 2]);
            assert_eq!(parse_hex_color(&lower), expected);
            assert_eq!(parse_hex_color(&upper), expected);
        }
    }

    #[test]
    fn test_malformed_colors_are_black() {
        for input in ["8000FF", "", "#", "#12345", "#1234567", "#12345g", " #123456", "#12 456", "#ééé"] {
            assert_eq!(parse_hex_color(input), BLACK, "input {:?}", input);
        }
    }

    #[test]
    fn test_opaque() {
        assert_eq!(opaque(Rgb([1, 2, 3])), Rgba([1, 2, 3, 255]));
    }
}
