use geo_types::Polygon;
use tracing::debug;

use crate::{
    error::Result,
    traits::ContourNester,
    types::{ring_to_polygon, Contour, Ring},
};

/// Even-odd containment nester.
///
/// Builds the polygon containment tree and classifies each ring by nesting
/// depth parity: roots are solid, their immediate children are holes, and so
/// on. Emission order is painter-friendly: each node precedes its children,
/// and children are visited in reverse discovery order so a later (hole)
/// contour always overdraws its parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenOddNester;

/// Passthrough nester: every ring is a solid contour. For extractors that
/// never report enclosed background.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidNester;

struct Node {
    ring: Ring,
    area: f32,
    children: Vec<usize>,
}

impl ContourNester for EvenOddNester {
    fn resolve(&self, rings: Vec<Ring>) -> Result<Vec<Contour>> {
        use geo::{Area, Contains};

        let mut indexed: Vec<(Ring, Polygon<f32>, f32)> = rings
            .into_iter()
            .map(|ring| {
                let polygon = ring_to_polygon(&ring);
                let area = polygon.unsigned_area();
                (ring, polygon, area)
            })
            .collect();

        // Largest first, so every potential parent is placed before its
        // children and the smallest containing ring is the direct parent.
        indexed.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut nodes: Vec<Node> = Vec::with_capacity(indexed.len());
        let mut polygons: Vec<Polygon<f32>> = Vec::with_capacity(indexed.len());
        let mut roots: Vec<usize> = Vec::new();

        for (ring, polygon, area) in indexed {
            let index = nodes.len();
            let mut parent: Option<usize> = None;
            for candidate in 0..index {
                if polygons[candidate].contains(&polygon)
                    && parent.is_none_or(|p| nodes[candidate].area < nodes[p].area)
                {
                    parent = Some(candidate);
                }
            }
            match parent {
                Some(p) => nodes[p].children.push(index),
                None => roots.push(index),
            }
            nodes.push(Node {
                ring,
                area,
                children: Vec::new(),
            });
            polygons.push(polygon);
        }

        let mut contours = Vec::with_capacity(nodes.len());
        for &root in roots.iter().rev() {
            emit(&mut nodes, root, false, &mut contours);
        }
        debug!(
            solids = contours.iter().filter(|c| !c.is_hole).count(),
            holes = contours.iter().filter(|c| c.is_hole).count(),
            "resolved nesting"
        );
        Ok(contours)
    }
}

fn emit(nodes: &mut [Node], index: usize, is_hole: bool, out: &mut Vec<Contour>) {
    let ring = std::mem::take(&mut nodes[index].ring);
    out.push(Contour { ring, is_hole });
    let children = std::mem::take(&mut nodes[index].children);
    for &child in children.iter().rev() {
        emit(nodes, child, !is_hole, out);
    }
}

impl ContourNester for SolidNester {
    fn resolve(&self, rings: Vec<Ring>) -> Result<Vec<Contour>> {
        Ok(rings
            .into_iter()
            .map(|ring| Contour {
                ring,
                is_hole: false,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(origin: f32, size: f32) -> Ring {
        vec![
            [origin, origin],
            [origin + size, origin],
            [origin + size, origin + size],
            [origin, origin + size],
            [origin, origin],
        ]
    }

    #[test]
    fn disjoint_rings_are_all_solid() {
        let contours = EvenOddNester
            .resolve(vec![square(0.0, 2.0), square(5.0, 1.0)])
            .expect("nesting succeeds");
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| !c.is_hole));
    }

    #[test]
    fn nested_ring_becomes_a_hole_after_its_parent() {
        let contours = EvenOddNester
            .resolve(vec![square(1.0, 1.0), square(0.0, 3.0)])
            .expect("nesting succeeds");
        assert_eq!(contours.len(), 2);
        assert!(!contours[0].is_hole);
        assert_eq!(contours[0].ring, square(0.0, 3.0));
        assert!(contours[1].is_hole);
        assert_eq!(contours[1].ring, square(1.0, 1.0));
    }

    #[test]
    fn parity_alternates_with_depth() {
        let contours = EvenOddNester
            .resolve(vec![square(0.0, 9.0), square(1.0, 7.0), square(2.0, 5.0)])
            .expect("nesting succeeds");
        let flags: Vec<bool> = contours.iter().map(|c| c.is_hole).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn directly_contained_rings_differ_in_hole_flag() {
        let contours = EvenOddNester
            .resolve(vec![
                square(0.0, 9.0),
                square(1.0, 3.0),
                square(5.0, 3.0),
            ])
            .expect("nesting succeeds");
        assert_eq!(contours.len(), 3);
        assert!(!contours[0].is_hole);
        assert!(contours[1].is_hole);
        assert!(contours[2].is_hole);
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        assert!(EvenOddNester.resolve(vec![]).expect("nesting succeeds").is_empty());
    }

    #[test]
    fn solid_nester_never_reports_holes() {
        let contours = SolidNester
            .resolve(vec![square(1.0, 1.0), square(0.0, 3.0)])
            .expect("nesting succeeds");
        assert!(contours.iter().all(|c| !c.is_hole));
    }
}
