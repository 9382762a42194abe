use std::collections::HashSet;

use geo::{BooleanOps, Intersects};
use geo_types::{LineString, MultiPolygon, Polygon};
use tracing::debug;

use crate::{
    error::{OutlineError, Result},
    traits::ContourExtractor,
    types::{PixelGrid, Ring},
};

use super::simplification::{canonicalize_ring, simplify_ring_eps};

/// Unions of cell polygons introduce near-degenerate vertices well below
/// this tolerance; exact pixel geometry sits on integer coordinates.
const DEFAULT_SIMPLIFY_TOLERANCE: f32 = 1e-3;

const DEFAULT_MAX_PASSES: usize = 1024;

/// A rejected union: the two inputs do not combine into one simple polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotSimple;

/// Capability interface for polygon boolean union.
///
/// Accepts two simple polygons and returns either the single merged polygon
/// or a rejection when the result would be a multi-polygon. The merge
/// extractors treat rejections as a normal branch, never an error. Merging
/// runs on f64 coordinates; the pixel geometry is exact either way.
pub trait PolygonBooleanOps: Send + Sync {
    fn union(&self, a: &Polygon<f64>, b: &Polygon<f64>)
        -> std::result::Result<Polygon<f64>, NotSimple>;
}

/// Bridge to geo's boolean-ops engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoBooleanOps;

impl PolygonBooleanOps for GeoBooleanOps {
    fn union(
        &self,
        a: &Polygon<f64>,
        b: &Polygon<f64>,
    ) -> std::result::Result<Polygon<f64>, NotSimple> {
        let merged: MultiPolygon<f64> = BooleanOps::union(a, b);
        let mut polygons = merged.0.into_iter();
        match (polygons.next(), polygons.next()) {
            (Some(polygon), None) => Ok(polygon),
            _ => Err(NotSimple),
        }
    }
}

/// The unit cell polygon for one foreground pixel.
fn unit_square(x: i64, y: i64) -> Polygon<f64> {
    let (x, y) = (x as f64, y as f64);
    Polygon::new(
        LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]),
        vec![],
    )
}

fn ring_from_line_string(line: &LineString<f64>) -> Ring {
    line.coords()
        .map(|coord| [coord.x as f32, coord.y as f32])
        .collect()
}

/// Flatten a merged polygon into its boundary loops: exterior first, then
/// every interior ring. Nesting classification happens downstream.
fn finish_rings(polygons: impl IntoIterator<Item = Polygon<f64>>, tolerance: f32) -> Vec<Ring> {
    let mut rings = Vec::new();
    for polygon in polygons {
        let mut boundary = vec![ring_from_line_string(polygon.exterior())];
        boundary.extend(polygon.interiors().iter().map(ring_from_line_string));
        for mut ring in boundary {
            simplify_ring_eps(&mut ring, tolerance);
            canonicalize_ring(&mut ring);
            rings.push(ring);
        }
    }
    rings
}

/// Disjoint-set over pixel indices with path compression and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    fn union(&mut self, a: usize, b: usize) -> usize {
        let (mut root_a, mut root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return root_a;
        }
        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
        root_a
    }
}

/// Directional-probe merge extractor.
///
/// One unit square per foreground pixel; a row-major sweep probes the left
/// and upper neighbours of each pixel and unions the two components'
/// polygons, with a disjoint set tracking which component owns which merged
/// polygon. Grid adjacency means every probe shares a full cell edge, so no
/// touch scan is needed. Enclosed background ends up as interior rings of
/// the merged polygons.
#[derive(Debug, Clone)]
pub struct GridMergeExtractor<B: PolygonBooleanOps = GeoBooleanOps> {
    pub boolean_ops: B,
    pub simplify_tolerance: f32,
}

impl Default for GridMergeExtractor<GeoBooleanOps> {
    fn default() -> Self {
        Self {
            boolean_ops: GeoBooleanOps,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

impl<B: PolygonBooleanOps> ContourExtractor for GridMergeExtractor<B> {
    fn extract_rings(&self, grid: &PixelGrid) -> Result<Vec<Ring>> {
        let width = grid.width() as i64;
        let height = grid.height() as i64;
        let mut components = DisjointSet::new((width * height) as usize);
        let mut polygons: Vec<Option<Polygon<f64>>> = vec![None; (width * height) as usize];

        for y in 0..height {
            for x in 0..width {
                if !grid.foreground(x, y) {
                    continue;
                }
                let cell = (y * width + x) as usize;
                polygons[cell] = Some(unit_square(x, y));

                for (nx, ny) in [(x - 1, y), (x, y - 1)] {
                    if !grid.foreground(nx, ny) {
                        continue;
                    }
                    let a = components.find(cell);
                    let b = components.find((ny * width + nx) as usize);
                    if a == b {
                        continue;
                    }
                    let first = polygons[a].take().expect("component root owns a polygon");
                    let second = polygons[b].take().expect("component root owns a polygon");
                    match self.boolean_ops.union(&first, &second) {
                        Ok(merged) => {
                            let root = components.union(a, b);
                            polygons[root] = Some(merged);
                        }
                        Err(NotSimple) => {
                            // Edge-adjacent cells always merge cleanly; keep
                            // both components if the engine disagrees.
                            polygons[a] = Some(first);
                            polygons[b] = Some(second);
                        }
                    }
                }
            }
        }

        let rings = finish_rings(polygons.into_iter().flatten(), self.simplify_tolerance);
        debug!(rings = rings.len(), "directional merge settled");
        Ok(rings)
    }
}

/// Worklist merge extractor.
///
/// Pops a focus polygon and repeatedly folds in any remaining candidate that
/// touches it and unions into one simple polygon; settled polygons retire
/// from the pool. An outer loop re-runs full passes until a pass changes
/// nothing, with a pass cap turning pathological inputs into
/// [`OutlineError::MergeDivergence`] instead of spinning forever.
#[derive(Debug, Clone)]
pub struct WorklistMergeExtractor<B: PolygonBooleanOps = GeoBooleanOps> {
    pub boolean_ops: B,
    /// Reject unions whose shared boundary points are not contiguous index
    /// runs on both rings. Guards against merging across an isolated
    /// touching corner, which would pinch the merged polygon.
    pub strict_contiguity: bool,
    pub max_passes: usize,
    pub simplify_tolerance: f32,
}

impl Default for WorklistMergeExtractor<GeoBooleanOps> {
    fn default() -> Self {
        Self {
            boolean_ops: GeoBooleanOps,
            strict_contiguity: true,
            max_passes: DEFAULT_MAX_PASSES,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

impl<B: PolygonBooleanOps> WorklistMergeExtractor<B> {
    fn merge_pass(&self, pool: Vec<Polygon<f64>>) -> Vec<Polygon<f64>> {
        let mut settled = Vec::with_capacity(pool.len());
        let mut work = pool;

        while let Some(mut focus) = work.pop() {
            loop {
                let mut merged_any = false;
                let mut keep = Vec::with_capacity(work.len());
                for candidate in std::mem::take(&mut work) {
                    if !focus.intersects(&candidate) {
                        keep.push(candidate);
                        continue;
                    }
                    if self.strict_contiguity && !contiguous_touch(&focus, &candidate) {
                        keep.push(candidate);
                        continue;
                    }
                    match self.boolean_ops.union(&focus, &candidate) {
                        Ok(merged) => {
                            focus = merged;
                            merged_any = true;
                        }
                        Err(NotSimple) => keep.push(candidate),
                    }
                }
                work = keep;
                if !merged_any {
                    break;
                }
            }
            settled.push(focus);
        }
        settled
    }
}

impl<B: PolygonBooleanOps> ContourExtractor for WorklistMergeExtractor<B> {
    fn extract_rings(&self, grid: &PixelGrid) -> Result<Vec<Ring>> {
        let mut pool = Vec::new();
        for y in 0..grid.height() as i64 {
            for x in 0..grid.width() as i64 {
                if grid.foreground(x, y) {
                    pool.push(unit_square(x, y));
                }
            }
        }

        let mut passes = 0;
        loop {
            if passes == self.max_passes {
                return Err(OutlineError::MergeDivergence { passes });
            }
            passes += 1;
            let before = pool.len();
            pool = self.merge_pass(pool);
            debug!(pass = passes, polygons = pool.len(), "worklist merge pass");
            if pool.len() == before {
                break;
            }
        }

        Ok(finish_rings(pool, self.simplify_tolerance))
    }
}

fn vertex_key(point: [f64; 2]) -> (u64, u64) {
    (point[0].to_bits(), point[1].to_bits())
}

fn open_exterior(polygon: &Polygon<f64>) -> Vec<[f64; 2]> {
    let mut points: Vec<[f64; 2]> = polygon
        .exterior()
        .coords()
        .map(|coord| [coord.x, coord.y])
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Ascending `indices` into a ring of length `len` form one contiguous run
/// modulo the loop length.
fn contiguous_run(indices: &[usize], len: usize) -> bool {
    let mut breaks = 0;
    for pair in indices.windows(2) {
        if pair[1] - pair[0] != 1 {
            breaks += 1;
        }
    }
    if indices[0] + len - indices[indices.len() - 1] != 1 {
        breaks += 1;
    }
    breaks <= 1
}

/// The contiguous-touching-points test: the vertices shared between the two
/// exteriors must form a contiguous run on both boundary orderings, and a
/// single shared vertex (an isolated corner) never qualifies.
fn contiguous_touch(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    let ring_a = open_exterior(a);
    let ring_b = open_exterior(b);

    let keys_b: HashSet<(u64, u64)> = ring_b.iter().map(|&p| vertex_key(p)).collect();
    let shared_a: Vec<usize> = (0..ring_a.len())
        .filter(|&i| keys_b.contains(&vertex_key(ring_a[i])))
        .collect();
    if shared_a.len() < 2 {
        return false;
    }

    let keys_a: HashSet<(u64, u64)> = ring_a.iter().map(|&p| vertex_key(p)).collect();
    let shared_b: Vec<usize> = (0..ring_b.len())
        .filter(|&i| keys_a.contains(&vertex_key(ring_b[i])))
        .collect();

    contiguous_run(&shared_a, ring_a.len()) && contiguous_run(&shared_b, ring_b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(points: &[[f32; 2]]) -> Ring {
        let mut ring: Ring = points.to_vec();
        ring.push(points[0]);
        ring
    }

    #[test]
    fn single_pixel_merges_to_unit_square() {
        let grid = PixelGrid::from_rows(&["#"]);
        let rings = GridMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(
            rings,
            vec![closed(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])]
        );
    }

    #[test]
    fn adjacent_pixels_merge_into_one_rectangle() {
        let grid = PixelGrid::from_rows(&["##"]);
        let rings = GridMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(
            rings,
            vec![closed(&[[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0]])]
        );
    }

    #[test]
    fn ring_of_pixels_merges_with_interior_ring() {
        let grid = PixelGrid::from_rows(&["###", "#.#", "###"]);
        let rings = GridMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(rings.len(), 2);
        assert!(rings.contains(&closed(&[[0.0, 0.0], [3.0, 0.0], [3.0, 3.0], [0.0, 3.0]])));
        assert!(rings.contains(&closed(&[[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0]])));
    }

    #[test]
    fn diagonal_pixels_stay_separate() {
        let grid = PixelGrid::from_rows(&["#.", ".#"]);
        let rings = GridMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn worklist_merges_a_block() {
        let grid = PixelGrid::from_rows(&["##", "##"]);
        let rings = WorklistMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(
            rings,
            vec![closed(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]])]
        );
    }

    #[test]
    fn worklist_rejects_corner_touch_under_strict_contiguity() {
        let grid = PixelGrid::from_rows(&["#.", ".#"]);
        let rings = WorklistMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges");
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn worklist_pass_cap_reports_divergence() {
        let grid = PixelGrid::from_rows(&["##"]);
        let capped = WorklistMergeExtractor {
            max_passes: 1,
            ..Default::default()
        };
        match capped.extract_rings(&grid) {
            Err(OutlineError::MergeDivergence { passes }) => assert_eq!(passes, 1),
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn blank_grid_merges_to_nothing() {
        let grid = PixelGrid::from_rows(&["..", ".."]);
        assert!(GridMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges")
            .is_empty());
        assert!(WorklistMergeExtractor::default()
            .extract_rings(&grid)
            .expect("merge converges")
            .is_empty());
    }

    #[test]
    fn contiguous_run_allows_wraparound() {
        assert!(contiguous_run(&[0, 1], 4));
        assert!(contiguous_run(&[0, 3], 4));
        assert!(!contiguous_run(&[0, 2], 4));
        assert!(contiguous_run(&[0, 1, 2, 3], 4));
    }

    #[test]
    fn shared_edge_is_a_contiguous_touch() {
        assert!(contiguous_touch(&unit_square(0, 0), &unit_square(1, 0)));
        assert!(!contiguous_touch(&unit_square(0, 0), &unit_square(1, 1)));
    }
}
