use image::{DynamicImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    config::DetectorConfig,
    detect_and_classify_polygons, detect_and_draw_diagonals,
    error::Result,
    find_corners_with_harris, find_corners_with_shi_tomasi,
    types::Detection,
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShapeCommand {
    /// Classify outlines by the vertex count of their simplified convex hulls
    ClassifyPolygons,

    /// Classify outlines by the number of Harris corners inside them
    HarrisCorners,

    /// Classify outlines by the number of Shi-Tomasi features inside them
    ShiTomasiCorners,
}

impl ShapeCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ShapeCommand)
    }

    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ClassifyPolygons => "Reduce each outline's convex hull with Ramer-Douglas-Peucker and label it by vertex count",
            Self::HarrisCorners => "Detect Harris corners and label each outline by how many fall inside it",
            Self::ShiTomasiCorners => "Detect Shi-Tomasi features and label each outline by how many fall inside it",
        }
    }
}

/// Run one command against `image`. Nothing is kept between calls.
pub fn execute(
    image: &DynamicImage,
    command: ShapeCommand,
    config: &DetectorConfig,
) -> Result<(RgbImage, Detection)> {
    match command {
        ShapeCommand::ClassifyPolygons => detect_and_classify_polygons(image, config),
        ShapeCommand::HarrisCorners => {
            let (corners, contours) = find_corners_with_harris(image, config)?;
            detect_and_draw_diagonals(image, &corners, &contours)
        }
        ShapeCommand::ShiTomasiCorners => {
            let (corners, contours) = find_corners_with_shi_tomasi(image, config)?;
            detect_and_draw_diagonals(image, &corners, &contours)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ClassificationStrategy;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_command_names() {
        assert_eq!(
            ShapeCommand::command_names(),
            &["classify_polygons", "harris_corners", "shi_tomasi_corners"]
        );
        assert_eq!(ShapeCommand::from_str("harris_corners").unwrap(), ShapeCommand::HarrisCorners);
        assert!(ShapeCommand::from_str("sobel").is_err());
        assert_eq!(ShapeCommand::ShiTomasiCorners.to_string(), "shi_tomasi_corners");
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_value(ShapeCommand::ClassifyPolygons).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "classify_polygons" }));

        let parsed: ShapeCommand = serde_json::from_str(r#"{"type":"shi_tomasi_corners"}"#).unwrap();
        assert_eq!(parsed, ShapeCommand::ShiTomasiCorners);
    }

    #[test]
    fn test_every_command_is_described() {
        for command in ShapeCommand::iter() {
            assert!(!command.description().is_empty());
        }
        let schema = serde_json::to_string(&ShapeCommand::schema()).unwrap();
        assert!(schema.contains("harris_corners"));
    }

    #[test]
    fn test_execute_reports_strategy() {
        let image = DynamicImage::new_luma8(64, 64);
        let config = DetectorConfig::default();

        let (annotated, detection) = execute(&image, ShapeCommand::ClassifyPolygons, &config).unwrap();
        assert_eq!(detection.strategy, ClassificationStrategy::VertexCount);
        assert_eq!(annotated.dimensions(), (64, 64));

        let (_, detection) = execute(&image, ShapeCommand::ShiTomasiCorners, &config).unwrap();
        assert_eq!(detection.strategy, ClassificationStrategy::CornerCount);
        assert!(detection.shapes.is_empty());
    }
}
