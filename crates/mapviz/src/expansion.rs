/// Offset from a spot center, in map units
pub type Offset = (i32, i32);

/// Builds the rings of a disk of radius `n`.
///
/// Ring `d` holds every offset whose Euclidean distance rounds to `d`, ordered
/// by row (`dy`) and then column (`dx`). Negative radii yield no rings.
pub fn calc_expansion_array(n: i32) -> Vec<Vec<Offset>> {
    if n < 0 {
        return Vec::new();
    }

    let mut rings = vec![Vec::new(); n as usize + 1];
    for dy in -n..=n {
        for dx in -n..=n {
            let d = f64::from(dx).hypot(f64::from(dy)).round() as i32;
            if d <= n {
                rings[d as usize].push((dx, dy));
            }
        }
    }
    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_degenerate_radii() {
        assert_eq!(calc_expansion_array(0), vec![vec![(0, 0)]]);
        assert!(calc_expansion_array(-1).is_empty());
        assert!(calc_expansion_array(-5).is_empty());
    }

    #[test]
    fn test_first_ring() {
        let rings = calc_expansion_array(1);
        assert_eq!(rings.len(), 2);
        // hypot(1, 1) = 1.41 rounds to 1, so the diagonals belong to ring 1
        assert_eq!(
            rings[1],
            vec![(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)]
        );
    }

    #[test]
    fn test_rings_cover_disk_exactly_once() {
        for n in 0..12 {
            let rings = calc_expansion_array(n);
            assert_eq!(rings.len(), n as usize + 1);

            let mut seen = HashSet::new();
            for (d, ring) in rings.iter().enumerate() {
                for &(dx, dy) in ring {
                    assert_eq!(f64::from(dx).hypot(f64::from(dy)).round() as usize, d);
                    assert!(seen.insert((dx, dy)), "offset {:?} appears twice", (dx, dy));
                }
            }

            let limit = (f64::from(n) + 0.5).powi(2);
            for dy in -n - 1..=n + 1 {
                for dx in -n - 1..=n + 1 {
                    let inside = f64::from(dx * dx + dy * dy) <= limit;
                    assert_eq!(seen.contains(&(dx, dy)), inside, "n={} offset={:?}", n, (dx, dy));
                }
            }
        }
    }
}
