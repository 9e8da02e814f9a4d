use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters of the image → binary mask stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur sigma; `0` skips blurring
    pub blur_sigma: f32,
    /// Half size of the adaptive threshold neighbourhood
    pub block_radius: u32,
    /// A pixel is foreground when it is darker than its local mean minus this offset
    pub offset: i16,
    /// Radius of the square structuring element used for opening
    pub open_radius: u8,
    /// Number of erosions (then dilations) in the opening; `0` skips it
    pub open_iterations: u8,
}

impl PreprocessConfig {
    /// Light blur, wide threshold window, single opening.
    pub fn polygon() -> Self {
        Self {
            blur_sigma: 1.0,
            block_radius: 7,
            offset: 2,
            open_radius: 1,
            open_iterations: 1,
        }
    }

    /// Heavier blur and a narrower threshold window, used ahead of corner
    /// counting. A single 3x3 opening keeps the thin edge ring along sloped
    /// sides closed.
    pub fn corners() -> Self {
        Self {
            blur_sigma: 2.0,
            block_radius: 5,
            offset: 2,
            open_radius: 1,
            open_iterations: 1,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::polygon()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Contours enclosing no more than this many square pixels are dropped as noise
    pub min_area: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_area: 200.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SimplifyConfig {
    /// RDP epsilon as a fraction of the hull perimeter
    pub epsilon_ratio: f64,
    /// Sequential filter threshold is the hull perimeter divided by this
    pub filter_divisor: f64,
    /// Greedy merge threshold in pixels
    pub merge_distance: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            epsilon_ratio: 0.01,
            filter_divisor: 20.0,
            merge_distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HarrisConfig {
    pub pre_blur_sigma: f32,
    /// Structure tensor window is `2 * window_radius + 1` pixels wide
    pub window_radius: u32,
    pub k: f64,
    /// Fraction of the strongest response a candidate must exceed
    pub quality_ratio: f64,
    /// Half size of the suppression square around each accepted corner
    pub nms_radius: u32,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            pre_blur_sigma: 0.8,
            window_radius: 2,
            k: 0.1,
            quality_ratio: 0.01,
            nms_radius: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShiTomasiConfig {
    pub window_radius: u32,
    pub max_corners: usize,
    pub quality_level: f64,
    /// Minimum Euclidean distance between accepted corners
    pub min_distance: f64,
}

impl Default for ShiTomasiConfig {
    fn default() -> Self {
        Self {
            window_radius: 1,
            max_corners: 100,
            quality_level: 0.05,
            min_distance: 50.0,
        }
    }
}

/// Every tunable of the detection pipeline. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mask preparation for vertex counting
    pub preprocess: PreprocessConfig,
    /// Mask preparation for corner counting
    pub corner_preprocess: PreprocessConfig,
    pub extraction: ExtractionConfig,
    pub simplify: SimplifyConfig,
    pub harris: HarrisConfig,
    pub shi_tomasi: ShiTomasiConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::polygon(),
            corner_preprocess: PreprocessConfig::corners(),
            extraction: ExtractionConfig::default(),
            simplify: SimplifyConfig::default(),
            harris: HarrisConfig::default(),
            shi_tomasi: ShiTomasiConfig::default(),
        }
    }
}

impl DetectorConfig {
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DetectorConfig = toml::from_str(
            r#"
            [simplify]
            merge_distance = 12.5

            [harris]
            nms_radius = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.simplify.merge_distance, 12.5);
        assert_eq!(config.simplify.epsilon_ratio, 0.01);
        assert_eq!(config.harris.nms_radius, 4);
        assert_eq!(config.harris.k, 0.1);
        assert_eq!(config.corner_preprocess, PreprocessConfig::corners());
        assert_eq!(config.extraction.min_area, 200.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = DetectorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DetectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let empty: DetectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, config);
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = serde_json::to_value(DetectorConfig::schema()).unwrap();
        let properties = &schema["properties"];
        for section in ["preprocess", "corner_preprocess", "extraction", "simplify", "harris", "shi_tomasi"] {
            assert!(properties.get(section).is_some(), "missing {section}");
        }
    }
}
