use geo_types::{Coord, LineString, Polygon};
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// A closed point loop: the first point is repeated as the last.
pub type Ring = Vec<[f32; 2]>;

/// One classified boundary loop of the traced image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contour {
    /// The closed boundary loop
    pub ring: Ring,
    /// Whether this loop punches a hole in an enclosing solid contour
    pub is_hole: bool,
}

/// The full result of tracing one image: contours in painter's-algorithm
/// emission order (a hole is always emitted after the solid it punches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
    /// Original image dimensions
    pub image_width: u32,
    pub image_height: u32,
}

impl Contour {
    /// Convert to a geo-types Polygon (exterior ring only) for geometric
    /// operations.
    pub fn to_geo_polygon(&self) -> Polygon<f32> {
        ring_to_polygon(&self.ring)
    }

    /// Area enclosed by the loop, ignoring nesting.
    pub fn area(&self) -> f32 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    pub fn is_closed(&self) -> bool {
        self.ring.first() == self.ring.last()
    }
}

impl ContourSet {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn solid_count(&self) -> usize {
        self.contours.iter().filter(|c| !c.is_hole).count()
    }

    pub fn hole_count(&self) -> usize {
        self.contours.iter().filter(|c| c.is_hole).count()
    }

    /// Foreground area covered by this contour set: solids minus holes.
    pub fn covered_area(&self) -> f32 {
        self.contours
            .iter()
            .map(|c| if c.is_hole { -c.area() } else { c.area() })
            .sum()
    }
}

/// Convert a (closed or open) ring to a geo-types Polygon with no interiors.
pub fn ring_to_polygon(ring: &Ring) -> Polygon<f32> {
    let coords: Vec<Coord<f32>> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Immutable boolean pixel matrix with `(0, 0)` at top-left.
///
/// Built from a thresholded image; black pixels are foreground. Out-of-range
/// probes read as background, which lets the boundary walk step one cell
/// outside the grid.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    /// Build from a binary image, treating black (luma 0) as foreground.
    pub fn from_binary_image(image: &GrayImage) -> Self {
        let mut grid = Self::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel.0[0] == 0 {
                grid.set(x, y, true);
            }
        }
        grid
    }

    /// Build from ASCII art rows, `#` marking foreground. Handy for tests and
    /// quick experiments.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set(x as u32, y as u32, true);
                }
            }
        }
        grid
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let index = (y * self.width + x) as usize;
        self.cells[index] = foreground;
    }

    pub fn foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn grid_from_binary_image_treats_black_as_foreground() {
        let mut img = GrayImage::from_pixel(3, 2, Luma([255u8]));
        img.put_pixel(1, 0, Luma([0u8]));
        img.put_pixel(2, 1, Luma([0u8]));

        let grid = PixelGrid::from_binary_image(&img);
        assert!(grid.foreground(1, 0));
        assert!(grid.foreground(2, 1));
        assert!(!grid.foreground(0, 0));
        assert_eq!(grid.foreground_count(), 2);
    }

    #[test]
    fn grid_out_of_range_reads_as_background() {
        let grid = PixelGrid::from_rows(&["#"]);
        assert!(grid.foreground(0, 0));
        assert!(!grid.foreground(-1, 0));
        assert!(!grid.foreground(0, -1));
        assert!(!grid.foreground(1, 0));
        assert!(!grid.foreground(0, 1));
    }

    #[test]
    fn contour_area_of_unit_square() {
        let contour = Contour {
            ring: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
            is_hole: false,
        };
        assert!(contour.is_closed());
        assert_eq!(contour.area(), 1.0);
    }
}
