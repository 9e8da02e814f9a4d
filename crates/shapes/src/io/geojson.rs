use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use tracing::info;

use crate::{
    algorithms::LABEL_TABLE_VERSION,
    error::Result,
    typed_geojson::{ShapeGeoJson, ShapeProperties, TypedFeature, TypedFeatureCollection},
    types::{DetectedShape, Detection, Point},
};

/// Closed GeoJSON ring through `points`.
fn ring(points: &[Point]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points.iter().map(|p| vec![p.x, p.y]).collect();
    if let Some(first) = ring.first().cloned() {
        if ring.last() != Some(&first) {
            ring.push(first);
        }
    }
    ring
}

fn geometry(shape: &DetectedShape) -> Geometry {
    Geometry::new(Value::Polygon(vec![ring(&shape.outline)]))
}

fn properties(id: usize, shape: &DetectedShape) -> ShapeProperties {
    ShapeProperties {
        id: id as u32,
        label: shape.label,
        count: shape.count as u32,
        area: shape.area(),
        perimeter: shape.perimeter(),
        centroid: shape.centroid,
    }
}

impl Detection {
    fn metadata(&self) -> JsonObject {
        let mut foreign_members = JsonObject::new();
        foreign_members.insert("image_width".to_string(), self.image_width.into());
        foreign_members.insert("image_height".to_string(), self.image_height.into());
        foreign_members.insert("shape_count".to_string(), self.shapes.len().into());
        foreign_members.insert("strategy".to_string(), self.strategy.to_string().into());
        foreign_members.insert("label_table_version".to_string(), LABEL_TABLE_VERSION.into());
        foreign_members
    }

    /// Export with typed feature properties
    pub fn to_typed_geojson(&self) -> Result<ShapeGeoJson> {
        let features = self
            .shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| TypedFeature::new(Some(geometry(shape)), i, properties(i, shape)))
            .collect();

        Ok(TypedFeatureCollection {
            features,
            foreign_members: self.metadata(),
        })
    }

    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.shapes.len());
        for (i, shape) in self.shapes.iter().enumerate() {
            let properties = match serde_json::to_value(properties(i, shape))? {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            };
            features.push(Feature {
                bbox: None,
                geometry: Some(geometry(shape)),
                id: Some(geojson::feature::Id::Number(i.into())),
                properties,
                foreign_members: None,
            });
        }

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(self.metadata()),
        })
    }

    /// Export to GeoJSON and serialize to a pretty-printed JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    pub fn save_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_geojson_string()?)?;
        info!(path = %path.display(), shapes = self.shapes.len(), "saved geojson");
        Ok(())
    }
}
