use crate::{
    error::Result,
    traits::ContourPostProcessor,
    types::{Contour, Ring},
};
use geo_types::{Coord, LineString};

/// Exact collinearity for rectilinear rings: three points on one horizontal
/// or one vertical line.
fn collinear(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
    (a[0] == b[0] && b[0] == c[0]) || (a[1] == b[1] && b[1] == c[1])
}

/// Distance from `b` to the line through `a` and `c`; degenerates to the
/// point distance when `a == c`.
fn deviation(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    let (acx, acy) = (c[0] - a[0], c[1] - a[1]);
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let length = (acx * acx + acy * acy).sqrt();
    if length == 0.0 {
        return (abx * abx + aby * aby).sqrt();
    }
    (acx * aby - acy * abx).abs() / length
}

fn drop_middle_points<F>(ring: &mut Ring, mut removable: F)
where
    F: FnMut([f32; 2], [f32; 2], [f32; 2]) -> bool,
{
    if ring.len() < 4 {
        return;
    }
    let closed = ring.first() == ring.last();
    if closed {
        ring.pop();
    }
    // The triple check is circular, so wrap-around middles are elided too.
    loop {
        let n = ring.len();
        if n < 4 {
            break;
        }
        let retained: Ring = (0..n)
            .filter(|&i| {
                let prev = ring[(i + n - 1) % n];
                let next = ring[(i + 1) % n];
                !removable(prev, ring[i], next)
            })
            .map(|i| ring[i])
            .collect();
        if retained.len() < 3 || retained.len() == ring.len() {
            break;
        }
        *ring = retained;
    }
    if closed {
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
    }
}

/// Remove every vertex lying on the straight run between its neighbours,
/// repeating until a full scan deletes nothing. Idempotent.
pub fn simplify_ring(ring: &mut Ring) {
    drop_middle_points(ring, |a, b, c| collinear(a, b, c));
}

/// Tolerance-based variant: collapses near-duplicate vertices and vertices
/// within `epsilon` of the segment joining their neighbours. Boolean unions
/// introduce near-degenerate vertices the exact test cannot see.
pub fn simplify_ring_eps(ring: &mut Ring, epsilon: f32) {
    drop_middle_points(ring, |a, b, c| {
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        (dx * dx + dy * dy).sqrt() <= epsilon || deviation(a, b, c) <= epsilon
    });
}

/// Rotate a closed ring so the lexicographically smallest point comes first
/// and orient it with positive signed area in image coordinates. Makes ring
/// output independent of the boolean engine's internal ordering.
pub fn canonicalize_ring(ring: &mut Ring) {
    if ring.len() < 3 {
        return;
    }
    if ring.first() == ring.last() {
        ring.pop();
    }
    if signed_area(ring) < 0.0 {
        ring.reverse();
    }
    let start = (0..ring.len())
        .min_by(|&i, &j| {
            ring[i][0]
                .total_cmp(&ring[j][0])
                .then(ring[i][1].total_cmp(&ring[j][1]))
        })
        .unwrap_or(0);
    ring.rotate_left(start);
    ring.push(ring[0]);
}

/// Shoelace sum over an open ring; positive for loops running
/// right-then-down in image coordinates.
pub fn signed_area(ring: &[[f32; 2]]) -> f32 {
    let n = ring.len();
    let mut doubled = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        doubled += ring[i][0] * ring[j][1] - ring[j][0] * ring[i][1];
    }
    doubled / 2.0
}

/// Douglas-Peucker simplifier using geo's implementation. Opt-in
/// post-processing for callers that want coarser output than the built-in
/// collinear elision.
#[derive(Debug, Clone)]
pub struct DouglasPeuckerSimplifier {
    pub tolerance: f32,
}

impl ContourPostProcessor for DouglasPeuckerSimplifier {
    fn process(&self, contours: &mut [Contour]) -> Result<()> {
        use geo::Simplify;

        for contour in contours {
            let coords: Vec<Coord<f32>> = contour
                .ring
                .iter()
                .map(|&[x, y]| Coord { x, y })
                .collect();
            let simplified = LineString::new(coords).simplify(&self.tolerance);
            contour.ring = simplified.coords().map(|coord| [coord.x, coord.y]).collect();
        }
        Ok(())
    }
}

/// Clears contours too degenerate to render: fewer than four points in the
/// closed loop, or non-finite coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourValidator;

impl ContourPostProcessor for ContourValidator {
    fn process(&self, contours: &mut [Contour]) -> Result<()> {
        for contour in contours {
            let degenerate = contour.ring.len() < 4
                || contour
                    .ring
                    .iter()
                    .any(|&[x, y]| !x.is_finite() || !y.is_finite());
            if degenerate {
                contour.ring.clear();
            }
        }
        Ok(())
    }
}
