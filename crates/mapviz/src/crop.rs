use log::debug;
use schema::RenderSettings;

use crate::influence::InfluenceMap;

/// Cells of background kept around trimmed content
pub const TRIM_PAD: i32 = 10;

/// Margin that centers the content in `output_width` cells. Negative crops.
pub fn explicit_margin(output_width: i32, content_width: usize) -> i32 {
    ((f64::from(output_width) - content_width as f64) / 2.0).round() as i32
}

/// Shrinks a square inward until its perimeter touches a claimed cell.
///
/// Each step walks two paths: the top row plus left column, then the bottom
/// row plus right column. The first hit at inset `s` gives `TRIM_PAD - s`.
/// The crop is symmetric and driven by the side closest to the content, so it
/// only approximates the content's bounding box.
pub fn trim_margin(map: &InfluenceMap) -> i32 {
    let w = map.width() as i64;
    let half = (w + 1) / 2;

    for s in 0..half {
        let (lo, hi) = (s, w - 1 - s);
        let north_west = (lo..=hi).any(|i| map.is_claimed(i, lo) || map.is_claimed(lo, i));
        let south_east = (lo..=hi).any(|i| map.is_claimed(i, hi) || map.is_claimed(hi, i));
        if north_west || south_east {
            debug!("Content found at inset {}", s);
            return TRIM_PAD - s as i32;
        }
    }

    0
}

pub fn resolve_margin(settings: &RenderSettings, map: &InfluenceMap) -> i32 {
    if settings.trim {
        trim_margin(map)
    } else if let Some(output_width) = settings.output_width {
        explicit_margin(output_width, map.width())
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influence::{GroupIndex, accumulate};
    use schema::{MarkGroup, TribeRecord, TurnData, Village};

    fn map_with(width: i32, villages: &[(i32, i32)]) -> InfluenceMap {
        let mut turn = TurnData { turn: 0, width, tribes: Default::default() };
        turn.tribes.insert(3, TribeRecord {
            id: 3,
            villages: villages.iter().map(|&(x, y)| Village { x, y, points: 1 }).collect(),
            ..Default::default()
        });
        let groups = vec![MarkGroup { name: "A".into(), color: "#00ff00".into(), tribes: vec![3] }];
        accumulate(&turn, &GroupIndex::new(&groups), 2).influence
    }

    #[test]
    fn test_explicit_margin_rounding() {
        assert_eq!(explicit_margin(10, 100), -45);
        assert_eq!(explicit_margin(120, 100), 10);
        assert_eq!(explicit_margin(10, 101), -46);
        assert_eq!(explicit_margin(11, 100), -45);
        assert_eq!(explicit_margin(101, 100), 1);
    }

    #[test]
    fn test_trim_empty_map_keeps_margin_zero() {
        assert_eq!(trim_margin(&map_with(50, &[])), 0);
        assert_eq!(trim_margin(&InfluenceMap::new(0)), 0);
    }

    #[test]
    fn test_trim_centered_spot() {
        // Grid 100 starts at 450; the spot covers cells 48..=52, which is inset 47 from the far side
        let map = map_with(100, &[(500, 500)]);
        assert_eq!(trim_margin(&map), TRIM_PAD - 47);
    }

    #[test]
    fn test_trim_uses_nearest_side() {
        // Spot around cell (20, 70) reaches column 18 first
        let map = map_with(100, &[(470, 520)]);
        assert_eq!(trim_margin(&map), TRIM_PAD - 18);

        // Spot around cell (80, 60) reaches inset 17 from the right
        let map = map_with(100, &[(530, 510)]);
        assert_eq!(trim_margin(&map), TRIM_PAD - 17);
    }

    #[test]
    fn test_trim_pads_content_near_edge() {
        let map = map_with(40, &[(481, 500)]);
        // Cell (1, 20): the spot already touches column 0
        assert_eq!(trim_margin(&map), TRIM_PAD);
    }

    #[test]
    fn test_trim_single_cell_grid() {
        // A one-cell grid sits at (499, 499); the only inset is 0
        assert_eq!(trim_margin(&map_with(1, &[(499, 499)])), TRIM_PAD);
        assert_eq!(trim_margin(&map_with(1, &[(200, 200)])), 0);
    }

    #[test]
    fn test_resolve_margin_modes() {
        let map = map_with(100, &[(500, 500)]);
        let mut settings = RenderSettings { output_width: Some(60), ..Default::default() };
        assert_eq!(resolve_margin(&settings, &map), -20);

        settings.trim = true;
        assert_eq!(resolve_margin(&settings, &map), TRIM_PAD - 47);

        settings.trim = false;
        settings.output_width = None;
        assert_eq!(resolve_margin(&settings, &map), 0);
    }
}
