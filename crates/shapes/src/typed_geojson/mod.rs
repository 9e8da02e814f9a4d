use std::collections::HashMap;
use std::marker::PhantomData;

use geojson::{Geometry, JsonObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Point, ShapeLabel};

/// Properties for classified shape features
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS, JsonSchema)]
#[ts(export)]
#[schemars(description = "Properties for classified shape features")]
pub struct ShapeProperties {
    #[schemars(description = "Index of the shape in contour order")]
    pub id: u32,
    #[schemars(description = "Shape label looked up from the count")]
    pub label: ShapeLabel,
    #[schemars(description = "Vertex count or enclosed corner count, depending on the strategy")]
    pub count: u32,
    #[schemars(description = "Area of the outline in square pixels")]
    pub area: f64,
    #[schemars(description = "Perimeter of the outline in pixels")]
    pub perimeter: f64,
    #[schemars(description = "Centroid from the outline's raw moments")]
    pub centroid: Point,
}

pub type ShapeGeoJson = TypedFeatureCollection<ShapeProperties>;

/// A GeoJSON feature whose properties deserialize into `P`.
#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeature<P> {
    #[serde(flatten)]
    pub feature: geojson::Feature,
    #[serde(skip)]
    _properties: PhantomData<P>,
}

impl<P> TypedFeature<P>
where
    for<'de> P: Serialize + Deserialize<'de>,
{
    pub fn new(geometry: Option<Geometry>, id: usize, properties: P) -> Self {
        let feature = geojson::Feature {
            bbox: None,
            geometry,
            id: Some(geojson::feature::Id::Number(id.into())),
            properties: serde_json::to_value(properties).ok().and_then(|v| v.as_object().cloned()),
            foreign_members: None,
        };
        Self {
            feature,
            _properties: PhantomData,
        }
    }

    /// The feature's properties, if they parse as `P`.
    pub fn properties(&self) -> Option<P> {
        self.feature
            .properties
            .as_ref()
            .and_then(|p| serde_json::from_value(serde_json::Value::Object(p.clone())).ok())
    }
}

/// Feature collection with typed features; serializes as a GeoJSON
/// `FeatureCollection` with the foreign members inlined.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct TypedFeatureCollection<P> {
    pub features: Vec<TypedFeature<P>>,
    #[serde(flatten)]
    pub foreign_members: JsonObject,
}

impl<P> TypedFeatureCollection<P> {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl ShapeGeoJson {
    /// Properties of every feature carrying `label`.
    pub fn shapes_labelled(&self, label: ShapeLabel) -> Vec<ShapeProperties> {
        self.features
            .iter()
            .filter_map(TypedFeature::properties)
            .filter(|props| props.label == label)
            .collect()
    }

    /// Number of features per label.
    pub fn label_counts(&self) -> HashMap<ShapeLabel, usize> {
        let mut counts = HashMap::new();
        for props in self.features.iter().filter_map(TypedFeature::properties) {
            *counts.entry(props.label).or_insert(0) += 1;
        }
        counts
    }
}
