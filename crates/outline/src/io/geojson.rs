use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, Value};
use geo_types::{Coord, LineString, Polygon};

use crate::{
    error::Result,
    types::{ring_to_polygon, ContourSet, Ring},
};

fn ring_coordinates(ring: &Ring) -> Vec<Vec<f64>> {
    ring.iter()
        .map(|&[x, y]| vec![x as f64, y as f64])
        .collect()
}

fn ring_line_string(ring: &Ring) -> LineString<f32> {
    LineString::new(ring.iter().map(|&[x, y]| Coord { x, y }).collect())
}

impl ContourSet {
    /// Export to a GeoJSON feature collection: one `Polygon` feature per
    /// solid contour, with the holes it directly encloses as interior rings.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        use geo::{Area, Contains};

        let solids: Vec<(&Ring, Polygon<f32>)> = self
            .contours
            .iter()
            .filter(|contour| !contour.is_hole)
            .map(|contour| (&contour.ring, ring_to_polygon(&contour.ring)))
            .collect();

        // Holes attach to the smallest solid that contains them.
        let mut holes_per_solid: Vec<Vec<&Ring>> = vec![Vec::new(); solids.len()];
        for contour in self.contours.iter().filter(|contour| contour.is_hole) {
            let hole_polygon = ring_to_polygon(&contour.ring);
            let parent = solids
                .iter()
                .enumerate()
                .filter(|(_, (_, solid))| solid.contains(&hole_polygon))
                .min_by(|(_, (_, a)), (_, (_, b))| {
                    a.unsigned_area().total_cmp(&b.unsigned_area())
                })
                .map(|(index, _)| index);
            if let Some(index) = parent {
                holes_per_solid[index].push(&contour.ring);
            }
        }

        let mut features = Vec::new();
        for (i, (exterior, _)) in solids.iter().enumerate() {
            let holes = &holes_per_solid[i];

            let mut coordinates = vec![ring_coordinates(exterior)];
            coordinates.extend(holes.iter().map(|hole| ring_coordinates(hole)));

            let shape = Polygon::new(
                ring_line_string(exterior),
                holes.iter().map(|hole| ring_line_string(hole)).collect(),
            );

            let geometry = Geometry::new(Value::Polygon(coordinates));

            let mut properties = serde_json::Map::new();
            properties.insert(
                "id".to_string(),
                serde_json::Value::Number(serde_json::Number::from(i)),
            );
            properties.insert(
                "area".to_string(),
                serde_json::Value::Number(
                    serde_json::Number::from_f64(shape.unsigned_area() as f64)
                        .unwrap_or_else(|| serde_json::Number::from(0)),
                ),
            );
            properties.insert(
                "hole_count".to_string(),
                serde_json::Value::Number(serde_json::Number::from(holes.len())),
            );

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert(
            "image_width".to_string(),
            serde_json::Value::Number(serde_json::Number::from(self.image_width)),
        );
        foreign_members.insert(
            "image_height".to_string(),
            serde_json::Value::Number(serde_json::Number::from(self.image_height)),
        );
        foreign_members.insert(
            "contour_count".to_string(),
            serde_json::Value::Number(serde_json::Number::from(self.contours.len())),
        );

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to a JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to a file
    pub fn save_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Load a contour set from a GeoJSON file
    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_geojson_string(&std::fs::read_to_string(path)?)
    }

    /// Load a contour set from a GeoJSON string written by
    /// [`ContourSet::to_geojson`]. Each polygon feature's first ring becomes
    /// a solid contour, followed by its interior rings as holes.
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let collection: FeatureCollection = geojson_str.parse()?;

        let dimension = |key: &str| {
            collection
                .foreign_members
                .as_ref()
                .and_then(|members| members.get(key))
                .and_then(|value| value.as_u64())
                .unwrap_or(0) as u32
        };
        let image_width = dimension("image_width");
        let image_height = dimension("image_height");

        let mut contours = Vec::new();
        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let Value::Polygon(rings) = geometry.value else {
                continue;
            };
            for (index, ring) in rings.into_iter().enumerate() {
                contours.push(crate::types::Contour {
                    ring: ring
                        .into_iter()
                        .map(|coord| [coord[0] as f32, coord[1] as f32])
                        .collect(),
                    is_hole: index > 0,
                });
            }
        }

        Ok(ContourSet {
            contours,
            image_width,
            image_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Contour;

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
    fn donut_exports_as_one_polygon_with_interior_ring() {
        let set = ContourSet {
            contours: vec![
                Contour {
                    ring: square(0.0, 3.0),
                    is_hole: false,
                },
                Contour {
                    ring: square(1.0, 1.0),
                    is_hole: true,
                },
            ],
            image_width: 3,
            image_height: 3,
        };

        let collection = set.to_geojson().expect("export succeeds");
        assert_eq!(collection.features.len(), 1);

        let geometry = collection.features[0]
            .geometry
            .as_ref()
            .expect("feature has geometry");
        match &geometry.value {
            Value::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[1].len(), 5);
            }
            other => panic!("expected polygon, got {other:?}"),
        }

        let members = collection
            .foreign_members
            .as_ref()
            .expect("metadata present");
        assert_eq!(members["image_width"], 3);
        assert_eq!(members["contour_count"], 2);
    }

    #[test]
    fn disjoint_solids_export_as_separate_features() {
        let set = ContourSet {
            contours: vec![
                Contour {
                    ring: square(0.0, 1.0),
                    is_hole: false,
                },
                Contour {
                    ring: square(5.0, 1.0),
                    is_hole: false,
                },
            ],
            image_width: 7,
            image_height: 7,
        };
        let collection = set.to_geojson().expect("export succeeds");
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn geojson_round_trips_through_serde() {
        let set = ContourSet {
            contours: vec![
                Contour {
                    ring: square(0.0, 3.0),
                    is_hole: false,
                },
                Contour {
                    ring: square(1.0, 1.0),
                    is_hole: true,
                },
            ],
            image_width: 3,
            image_height: 3,
        };
        let text = set.to_geojson_string().expect("serialization succeeds");
        let parsed = ContourSet::from_geojson_string(&text).expect("valid GeoJSON");
        assert_eq!(parsed.contours.len(), 2);
        assert!(!parsed.contours[0].is_hole);
        assert!(parsed.contours[1].is_hole);
        assert_eq!(parsed.image_width, 3);
        assert_eq!(parsed.contours[0].ring, square(0.0, 3.0));
    }
}
