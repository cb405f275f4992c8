use std::collections::HashMap;

use log::{debug, warn};
use schema::{MAP_SPAN, MarkGroup, TribeId, TribeRecord, TurnData};

use crate::expansion::calc_expansion_array;
use crate::legend::QuadrantTally;

/// Spot radius of the weakest grouped villages
pub const MIN_SPOT_SIZE: u32 = 2;

/// Index of a group in `RenderSettings::groups`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub usize);

/// Tribe to group lookup, built once per render
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    owners: HashMap<TribeId, GroupId>,
    len: usize,
}

impl GroupIndex {
    pub fn new(groups: &[MarkGroup]) -> Self {
        let mut owners = HashMap::new();
        for (i, group) in groups.iter().enumerate() {
            for &tribe in &group.tribes {
                // The first group listing a tribe keeps it
                if let Some(first) = owners.get(&tribe) {
                    let GroupId(first) = *first;
                    warn!("Tribe {} is in groups {} and {}, keeping {}", tribe, first, i, first);
                    continue;
                }
                owners.insert(tribe, GroupId(i));
            }
        }
        Self { owners, len: groups.len() }
    }

    pub fn group_of(&self, tribe: TribeId) -> Option<GroupId> {
        self.owners.get(&tribe).copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Maps village points to a spot radius using quantile thresholds
#[derive(Debug, Clone)]
pub struct SpotSizer {
    thresholds: Vec<u32>,
}

impl SpotSizer {
    /// `strengths` are the points of every grouped village in the turn.
    pub fn new(mut strengths: Vec<u32>, top_spot_size: u32) -> Self {
        let top_spot_size = top_spot_size.max(MIN_SPOT_SIZE);
        let buckets = (top_spot_size - MIN_SPOT_SIZE + 1) as usize;

        strengths.sort_unstable();
        let thresholds = if strengths.is_empty() {
            Vec::new()
        } else {
            (0..buckets)
                .map(|k| strengths[k * strengths.len() / buckets])
                .collect()
        };

        Self { thresholds }
    }

    pub fn spot_size(&self, strength: u32) -> u32 {
        // Number of thresholds <= strength; the last of them is the bucket
        let passed = self.thresholds.partition_point(|&t| t <= strength);
        MIN_SPOT_SIZE + passed.saturating_sub(1) as u32
    }
}

/// One cell of the pre-scale grid: accumulated influence per group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    claims: Vec<(GroupId, u32)>,
}

impl RawCell {
    fn add(&mut self, group: GroupId, amount: u32) {
        match self.claims.iter_mut().find(|(g, _)| *g == group) {
            Some((_, value)) => *value = value.saturating_add(amount),
            None => self.claims.push((group, amount)),
        }
    }

    pub fn is_claimed(&self) -> bool {
        !self.claims.is_empty()
    }

    #[cfg(test)]
    fn influence(&self, group: GroupId) -> Option<u32> {
        self.claims.iter().find(|(g, _)| *g == group).map(|&(_, v)| v)
    }

    /// Strongest claim; equal claims go to the lowest group id.
    pub fn winner(&self) -> Option<GroupId> {
        self.claims
            .iter()
            .copied()
            .min_by(|(ga, va), (gb, vb)| vb.cmp(va).then(ga.cmp(gb)))
            .map(|(g, _)| g)
    }
}

/// Square grid of raw cells centered on the middle of the map
#[derive(Debug, Clone)]
pub struct InfluenceMap {
    width: usize,
    origin: i32,
    cells: Vec<RawCell>,
}

impl InfluenceMap {
    pub fn new(width: usize) -> Self {
        let width = width.min(MAP_SPAN as usize);
        Self {
            width,
            origin: (MAP_SPAN - width as i32) / 2,
            cells: vec![RawCell::default(); width * width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Map coordinate of grid cell (0, 0)
    pub fn origin(&self) -> i32 {
        self.origin
    }

    /// Grid cell at (cx, cy); out of range cells read as unclaimed.
    pub fn cell(&self, cx: i64, cy: i64) -> Option<&RawCell> {
        let w = self.width as i64;
        if cx < 0 || cy < 0 || cx >= w || cy >= w {
            return None;
        }
        self.cells.get((cy * w + cx) as usize)
    }

    pub fn winner(&self, cx: i64, cy: i64) -> Option<GroupId> {
        self.cell(cx, cy).and_then(RawCell::winner)
    }

    pub fn is_claimed(&self, cx: i64, cy: i64) -> bool {
        self.cell(cx, cy).is_some_and(RawCell::is_claimed)
    }

    /// Adds influence at map coordinate (x, y), ignoring points off the grid.
    fn add(&mut self, x: i32, y: i32, group: GroupId, amount: u32) {
        let cx = i64::from(x) - i64::from(self.origin);
        let cy = i64::from(y) - i64::from(self.origin);
        let w = self.width as i64;
        if cx < 0 || cy < 0 || cx >= w || cy >= w {
            return;
        }
        self.cells[(cy * w + cx) as usize].add(group, amount);
    }
}

/// Result of spreading every grouped village over the grid
#[derive(Debug, Clone)]
pub struct Accumulation {
    pub influence: InfluenceMap,
    pub quadrants: QuadrantTally,
    pub placed: usize,
}

fn on_map(x: i32, y: i32) -> bool {
    (0..MAP_SPAN).contains(&x) && (0..MAP_SPAN).contains(&y)
}

fn grouped_tribes<'a>(
    turn: &'a TurnData,
    groups: &'a GroupIndex,
) -> impl Iterator<Item = (GroupId, &'a TribeRecord)> + 'a {
    turn.tribes
        .values()
        .filter_map(move |tribe| groups.group_of(tribe.id).map(|group| (group, tribe)))
}

/// Spreads each grouped village as a disk whose weight falls off by one per ring.
pub fn accumulate(turn: &TurnData, groups: &GroupIndex, top_spot_size: u32) -> Accumulation {
    let width = usize::try_from(turn.width).unwrap_or(0);
    let mut influence = InfluenceMap::new(width);
    let mut quadrants = QuadrantTally::new(groups.len());
    if groups.is_empty() {
        debug!("No groups, leaving the {}x{} grid unclaimed", influence.width(), influence.width());
        return Accumulation { influence, quadrants, placed: 0 };
    }

    let strengths: Vec<u32> = grouped_tribes(turn, groups)
        .flat_map(|(_, tribe)| tribe.villages.iter().map(|v| v.points))
        .collect();
    let sizer = SpotSizer::new(strengths, top_spot_size);
    let rings = calc_expansion_array(top_spot_size.max(MIN_SPOT_SIZE) as i32);

    let mut placed = 0;
    for (group, tribe) in grouped_tribes(turn, groups) {
        for village in &tribe.villages {
            if !on_map(village.x, village.y) {
                debug!("Skipping village of tribe {} at ({}, {})", tribe.id, village.x, village.y);
                continue;
            }

            let spot_size = sizer.spot_size(village.points);
            for (d, ring) in rings.iter().enumerate().take(spot_size as usize + 1) {
                let amount = spot_size - d as u32;
                for &(dx, dy) in ring {
                    influence.add(village.x + dx, village.y + dy, group, amount);
                }
            }

            quadrants.record(group, village.x, village.y);
            placed += 1;
        }
    }

    debug!(
        "Placed {} villages on a {}x{} grid at origin {}",
        placed,
        influence.width(),
        influence.width(),
        influence.origin()
    );
    Accumulation { influence, quadrants, placed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::Village;

    fn turn(width: i32, tribes: &[(TribeId, &[Village])]) -> TurnData {
        TurnData {
            turn: 1,
            width,
            tribes: tribes
                .iter()
                .map(|&(id, villages)| {
                    (id, TribeRecord { id, villages: villages.to_vec(), ..Default::default() })
                })
                .collect(),
        }
    }

    fn groups(tribes: &[&[TribeId]]) -> Vec<MarkGroup> {
        tribes
            .iter()
            .enumerate()
            .map(|(i, t)| MarkGroup {
                name: format!("Group {}", i),
                color: "#ff0000".to_string(),
                tribes: t.to_vec(),
            })
            .collect()
    }

    fn village(x: i32, y: i32, points: u32) -> Village {
        Village { x, y, points }
    }

    #[test]
    fn test_group_index_first_claim_wins() {
        let index = GroupIndex::new(&groups(&[&[1, 2], &[2, 3]]));
        assert_eq!(index.len(), 2);
        assert_eq!(index.group_of(1), Some(GroupId(0)));
        assert_eq!(index.group_of(2), Some(GroupId(0)));
        assert_eq!(index.group_of(3), Some(GroupId(1)));
        assert_eq!(index.group_of(4), None);
    }

    #[test]
    fn test_spot_sizer_quantiles() {
        // Four buckets over 2..=5
        let sizer = SpotSizer::new(vec![400, 100, 300, 200, 800, 700, 600, 500], 5);
        assert_eq!(sizer.thresholds, vec![100, 300, 500, 700]);
        assert_eq!(sizer.spot_size(50), MIN_SPOT_SIZE);
        assert_eq!(sizer.spot_size(100), 2);
        assert_eq!(sizer.spot_size(299), 2);
        assert_eq!(sizer.spot_size(300), 3);
        assert_eq!(sizer.spot_size(650), 4);
        assert_eq!(sizer.spot_size(10_000), 5);
    }

    #[test]
    fn test_spot_sizer_single_village_gets_top_size() {
        assert_eq!(SpotSizer::new(vec![1000], 3).spot_size(1000), 3);
        assert_eq!(SpotSizer::new(vec![1000], 8).spot_size(1000), 8);
    }

    #[test]
    fn test_spot_sizer_clamps_small_top_size() {
        let sizer = SpotSizer::new(vec![10, 20], 0);
        assert_eq!(sizer.spot_size(20), MIN_SPOT_SIZE);
        assert_eq!(SpotSizer::new(Vec::new(), 6).spot_size(5), MIN_SPOT_SIZE);
    }

    #[test]
    fn test_raw_cell_winner_tie_goes_to_lowest_group() {
        let mut cell = RawCell::default();
        assert_eq!(cell.winner(), None);

        cell.add(GroupId(3), 5);
        cell.add(GroupId(1), 5);
        assert_eq!(cell.winner(), Some(GroupId(1)));

        cell.add(GroupId(3), 1);
        assert_eq!(cell.winner(), Some(GroupId(3)));
        assert_eq!(cell.influence(GroupId(3)), Some(6));
    }

    #[test]
    fn test_single_village_disk() {
        let data = turn(100, &[(7, &[village(500, 500, 1000)])]);
        let index = GroupIndex::new(&groups(&[&[7]]));
        let acc = accumulate(&data, &index, 3);

        assert_eq!(acc.placed, 1);
        assert_eq!(acc.influence.origin(), 450);

        // Village sits at grid cell (50, 50)
        let at = |dx: i64, dy: i64| acc.influence.cell(50 + dx, 50 + dy).and_then(|c| c.influence(GroupId(0)));
        assert_eq!(at(0, 0), Some(3));
        assert_eq!(at(1, 0), Some(2));
        assert_eq!(at(1, 1), Some(2));
        assert_eq!(at(2, 0), Some(1));
        assert_eq!(at(3, 0), Some(0));
        assert_eq!(at(4, 0), None);
        assert_eq!(at(3, 3), None);
        assert!(acc.influence.is_claimed(53, 50));
        assert!(!acc.influence.is_claimed(54, 50));
    }

    #[test]
    fn test_ungrouped_and_off_map_villages_are_ignored() {
        let data = turn(
            100,
            &[
                (1, &[village(500, 500, 10), village(-4, 20, 10), village(1000, 3, 10)]),
                (2, &[village(480, 480, 10)]),
            ],
        );
        let index = GroupIndex::new(&groups(&[&[1]]));
        let acc = accumulate(&data, &index, 2);

        assert_eq!(acc.placed, 1);
        assert!(!acc.influence.is_claimed(30, 30));
    }

    #[test]
    fn test_no_groups_leaves_grid_unclaimed() {
        let data = turn(40, &[(1, &[village(500, 500, 10)])]);
        let index = GroupIndex::new(&[]);
        assert!(index.is_empty());

        let acc = accumulate(&data, &index, 4);
        assert_eq!(acc.placed, 0);
        assert_eq!(acc.influence.width(), 40);
        assert!((0..40).all(|y| (0..40).all(|x| !acc.influence.is_claimed(x, y))));
    }

    #[test]
    fn test_spots_clip_at_grid_edge() {
        // Grid covers 495..505; the spot spills over its corner
        let data = turn(10, &[(1, &[village(495, 495, 10)])]);
        let acc = accumulate(&data, &GroupIndex::new(&groups(&[&[1]])), 2);

        assert_eq!(acc.placed, 1);
        assert_eq!(acc.influence.cell(0, 0).and_then(|c| c.influence(GroupId(0))), Some(2));
        assert!(acc.influence.cell(-1, 0).is_none());
    }

    #[test]
    fn test_stronger_group_wins_shared_cell() {
        let data = turn(
            50,
            &[
                (1, &[village(500, 500, 100)]),
                (2, &[village(500, 500, 900)]),
            ],
        );
        let index = GroupIndex::new(&groups(&[&[1], &[2]]));

        for _ in 0..5 {
            let acc = accumulate(&data, &index, 6);
            let (cx, cy) = (25, 25);
            let cell = acc.influence.cell(cx, cy).expect("center cell");
            assert!(cell.influence(GroupId(1)) > cell.influence(GroupId(0)));
            assert_eq!(acc.influence.winner(cx, cy), Some(GroupId(1)));
        }
    }

    #[test]
    fn test_accumulation_is_deterministic() {
        let villages: Vec<Village> = (0..40).map(|i| village(470 + i, 480 + (i * 7) % 40, 50 * i as u32)).collect();
        let others: Vec<Village> = (0..40).map(|i| village(510 - i, 470 + (i * 3) % 40, 900 - 20 * i as u32)).collect();
        let data = turn(80, &[(1, &villages[..]), (2, &others[..])]);
        let index = GroupIndex::new(&groups(&[&[1], &[2]]));

        let winners = |acc: &Accumulation| -> Vec<Option<GroupId>> {
            (0..80).flat_map(|y| (0..80).map(move |x| (x, y)))
                .map(|(x, y)| acc.influence.winner(x, y))
                .collect()
        };

        let first = winners(&accumulate(&data, &index, 7));
        for _ in 0..3 {
            assert_eq!(winners(&accumulate(&data, &index, 7)), first);
        }
    }
}
