use std::path::Path;

use crate::{error::Result, types::ContourSet};

/// Debug palette for telling adjacent regions apart in viewer output. The
/// production cut path is plain black.
pub const REGION_PALETTE: [&str; 16] = [
    "#001f3f", // navy
    "#0074d9", // blue
    "#7fdbff", // aqua
    "#39cccc", // teal
    "#3d9970", // olive
    "#2ecc40", // green
    "#01ff70", // lime
    "#ffdc00", // yellow
    "#ff851b", // orange
    "#ff4136", // red
    "#85144b", // maroon
    "#f012be", // fuchsia
    "#b10dc9", // purple
    "#111111", // black
    "#aaaaaa", // grey
    "#dddddd", // silver
];

/// Rendering options for the SVG document.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Multiplier from pixel-grid units to document units
    pub scale: u32,
    /// Blank border around the scaled drawing, in document units
    pub margin: u32,
    /// Colour each solid region from [`REGION_PALETTE`] instead of black
    pub region_colors: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 100,
            margin: 10,
            region_colors: false,
        }
    }
}

impl ContourSet {
    /// Render the contour set as a standalone SVG document.
    ///
    /// Contours become filled `<path>` elements in emission order under an
    /// even-odd fill rule; holes are filled white so they read as cutouts
    /// when drawn over their parent. The group transform maps pixel-grid
    /// coordinates to document units.
    pub fn to_svg_string(&self, options: &SvgOptions) -> String {
        let width = options.scale * self.image_width + 2 * options.margin;
        let height = options.scale * self.image_height + 2 * options.margin;

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push_str(
            "<!DOCTYPE svg PUBLIC \"-//W3C/DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
        );
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" baseProfile=\"full\" width=\"{width}\" height=\"{height}\">\n",
        ));
        out.push_str(&format!(
            "<g id=\"marker\" transform=\"translate({margin} {margin}) scale({scale})\" stroke=\"none\" fill-rule=\"evenodd\">\n",
            margin = options.margin,
            scale = options.scale,
        ));

        let mut solid_index = 0usize;
        for contour in &self.contours {
            let ring = &contour.ring;
            if ring.is_empty() {
                continue;
            }
            // The closing duplicate is implied by the `z` command.
            let open = if ring.len() > 1 && ring.first() == ring.last() {
                &ring[..ring.len() - 1]
            } else {
                &ring[..]
            };

            let mut data = format!("M{} {}", open[0][0], open[0][1]);
            for point in &open[1..] {
                data.push_str(&format!(" L{} {}", point[0], point[1]));
            }
            data.push_str(" z");

            let fill = if contour.is_hole {
                "white"
            } else if options.region_colors {
                let color = REGION_PALETTE[solid_index % REGION_PALETTE.len()];
                solid_index += 1;
                color
            } else {
                "black"
            };

            out.push_str(&format!("<path d=\"{data}\" fill=\"{fill}\"/>\n"));
        }

        out.push_str("</g>\n</svg>\n");
        out
    }

    /// Render and write the SVG document to a file.
    pub fn save_svg(&self, path: impl AsRef<Path>, options: &SvgOptions) -> Result<()> {
        std::fs::write(path, self.to_svg_string(options))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Contour;

    fn unit_square_set() -> ContourSet {
        ContourSet {
            contours: vec![Contour {
                ring: vec![
                    [0.0, 0.0],
                    [1.0, 0.0],
                    [1.0, 1.0],
                    [0.0, 1.0],
                    [0.0, 0.0],
                ],
                is_hole: false,
            }],
            image_width: 1,
            image_height: 1,
        }
    }

    #[test]
    fn svg_document_carries_transform_and_path() {
        let svg = unit_square_set().to_svg_string(&SvgOptions::default());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(svg.contains("width=\"120\" height=\"120\""));
        assert!(svg.contains("transform=\"translate(10 10) scale(100)\""));
        assert!(svg.contains("fill-rule=\"evenodd\""));
        assert!(svg.contains("<path d=\"M0 0 L1 0 L1 1 L0 1 z\" fill=\"black\"/>"));
    }

    #[test]
    fn holes_are_filled_white() {
        let mut set = unit_square_set();
        set.contours[0].is_hole = true;
        let svg = set.to_svg_string(&SvgOptions::default());
        assert!(svg.contains("fill=\"white\""));
    }

    #[test]
    fn region_palette_cycles_over_solids_only() {
        let mut set = unit_square_set();
        let mut hole = set.contours[0].clone();
        hole.is_hole = true;
        let solid = set.contours[0].clone();
        set.contours.push(hole);
        set.contours.push(solid);

        let svg = set.to_svg_string(&SvgOptions {
            region_colors: true,
            ..SvgOptions::default()
        });
        assert!(svg.contains("fill=\"#001f3f\""));
        assert!(svg.contains("fill=\"white\""));
        assert!(svg.contains("fill=\"#0074d9\""));
    }
}
