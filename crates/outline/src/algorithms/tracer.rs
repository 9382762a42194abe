use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{PixelGrid, Ring},
};

use super::simplification::simplify_ring;

/// Crack-following contour extractor.
///
/// Groups foreground pixels into regions with a single row-major sweep, then
/// walks each region's crack boundary along cell corners and elides collinear
/// vertices. Works without any boolean-geometry machinery, but sees every
/// region as solid: enclosed background is not reported as a hole.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrackTraceExtractor;

impl ContourExtractor for CrackTraceExtractor {
    fn extract_rings(&self, grid: &PixelGrid) -> Result<Vec<Ring>> {
        let regions = group_regions(grid);
        debug!(regions = regions.len(), "grouped foreground pixels");

        let rings = regions
            .iter()
            .map(|region| {
                let mut ring = walk_boundary(region);
                simplify_ring(&mut ring);
                ring
            })
            .collect();
        Ok(rings)
    }
}

/// Row-major sweep with one row of lookback. A pixel joins the region above
/// it when there is one; otherwise it joins the region to its left, unless
/// that region already owns the upper-left diagonal — a region formed across
/// such a junction would not be traceable by [`walk_boundary`]'s local rule.
fn group_regions(grid: &PixelGrid) -> Vec<HashSet<(i64, i64)>> {
    let mut regions: Vec<HashSet<(i64, i64)>> = Vec::new();
    let mut owner: HashMap<(i64, i64), usize> = HashMap::new();

    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            if !grid.foreground(x, y) {
                continue;
            }
            let joined = if let Some(&above) = owner.get(&(x, y - 1)) {
                Some(above)
            } else {
                match owner.get(&(x - 1, y)) {
                    Some(&left) if !regions[left].contains(&(x - 1, y - 1)) => Some(left),
                    _ => None,
                }
            };
            let index = joined.unwrap_or_else(|| {
                regions.push(HashSet::new());
                regions.len() - 1
            });
            regions[index].insert((x, y));
            owner.insert((x, y), index);
        }
    }
    regions
}

/// Walk the crack boundary of a region along cell corners, starting from the
/// lexicographically smallest corner touching it. Returns the closed loop of
/// visited corners. The region must have been formed by [`group_regions`];
/// the walk's local rule cannot handle diagonal pinch points.
fn walk_boundary(region: &HashSet<(i64, i64)>) -> Ring {
    assert!(!region.is_empty(), "cannot trace an empty region");

    let start = region
        .iter()
        .copied()
        .min()
        .expect("region has at least one cell");

    let mut ring: Ring = vec![[start.0 as f32, start.1 as f32]];
    let (mut cx, mut cy) = start;
    loop {
        if region.contains(&(cx, cy)) && !region.contains(&(cx, cy - 1)) {
            cx += 1;
        } else if region.contains(&(cx - 1, cy)) {
            cy += 1;
        } else if region.contains(&(cx - 1, cy - 1)) {
            cx -= 1;
        } else {
            cy -= 1;
        }
        if (cx, cy) == start {
            break;
        }
        ring.push([cx as f32, cy as f32]);
    }
    ring.push([start.0 as f32, start.1 as f32]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(rows: &[&str]) -> Vec<Ring> {
        let grid = PixelGrid::from_rows(rows);
        CrackTraceExtractor
            .extract_rings(&grid)
            .expect("tracing cannot fail")
    }

    #[test]
    fn single_pixel_traces_unit_square() {
        let rings = extract(&["#"]);
        assert_eq!(
            rings,
            vec![vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0],
                [0.0, 0.0],
            ]]
        );
    }

    #[test]
    fn blank_grid_traces_nothing() {
        assert!(extract(&["...", "..."]).is_empty());
    }

    #[test]
    fn rectangle_simplifies_to_four_corners() {
        let rings = extract(&["###", "###"]);
        assert_eq!(
            rings,
            vec![vec![
                [0.0, 0.0],
                [3.0, 0.0],
                [3.0, 2.0],
                [0.0, 2.0],
                [0.0, 0.0],
            ]]
        );
    }

    #[test]
    fn disjoint_blobs_trace_separately() {
        let rings = extract(&["#.#"]);
        assert_eq!(rings.len(), 2);
        for ring in &rings {
            assert_eq!(ring.first(), ring.last());
            assert_eq!(ring.len(), 5);
        }
    }

    #[test]
    fn concave_region_boundary_follows_the_notch() {
        // An upside-down U: the walk must dip into the opening.
        let rings = extract(&["###", "#.#"]);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 9);
        assert!(ring.contains(&[1.0, 2.0]));
        assert!(ring.contains(&[2.0, 1.0]));
    }

    #[test]
    fn left_join_without_diagonal_is_allowed() {
        let grid = PixelGrid::from_rows(&["##"]);
        assert_eq!(group_regions(&grid).len(), 1);
    }

    #[test]
    fn pinch_guard_splits_left_join_across_diagonal() {
        // The lower-right pixel may not join from the left because the region
        // already owns its upper-left diagonal; it becomes a region of its own.
        let grid = PixelGrid::from_rows(&["#.", "##"]);
        let regions = group_regions(&grid);
        assert_eq!(regions.len(), 2);
        let covered: usize = regions.iter().map(|r| r.len()).sum();
        assert_eq!(covered, 3);
    }

    #[test]
    fn enclosed_background_is_never_swallowed() {
        // A full ring of pixels: the sweep splits it before it can close
        // around the center, so every traced region stays simply connected
        // and the center cell is left uncovered.
        let rings = extract(&["###", "#.#", "###"]);
        let total: f32 = rings
            .iter()
            .map(|r| crate::algorithms::simplification::signed_area(&r[..r.len() - 1]))
            .sum();
        assert_eq!(total, 8.0);
    }
}
