use crate::{
    algorithms::{extraction::ImageprocContourExtractor, preprocessing::preprocessors_for, simplification::PolygonSimplifier},
    config::{DetectorConfig, PreprocessConfig},
    pipeline::Pipeline,
    traits::{ContourExtractor, ImagePreprocessor},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<PolygonSimplifier>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            contour_extractor: None,
            simplifier: None,
        }
    }

    /// Add a preprocessor to the end of the chain
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Append the blur, threshold and opening stages described by `config`
    pub fn with_preprocessing(mut self, config: &PreprocessConfig) -> Self {
        self.preprocessors.extend(preprocessors_for(config));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    pub fn with_simplifier(mut self, simplifier: PolygonSimplifier) -> Self {
        self.simplifier = Some(simplifier);
        self
    }

    /// Build the pipeline; without preprocessors the input is taken to be a binary mask
    pub fn build(self) -> Pipeline {
        let contour_extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor::default()));

        Pipeline::new(
            self.preprocessors,
            contour_extractor,
            self.simplifier.unwrap_or_default(),
        )
    }

    /// Pipeline for vertex-count classification of a photographed or drawn image
    pub fn build_for_polygons(config: &DetectorConfig) -> Pipeline {
        Self::new()
            .with_preprocessing(&config.preprocess)
            .set_contour_extractor(ImageprocContourExtractor::from(&config.extraction))
            .with_simplifier(PolygonSimplifier::from(&config.simplify))
            .build()
    }

    /// Pipeline providing the contours for corner-count classification
    pub fn build_for_corners(config: &DetectorConfig) -> Pipeline {
        Self::new()
            .with_preprocessing(&config.corner_preprocess)
            .set_contour_extractor(ImageprocContourExtractor::from(&config.extraction))
            .with_simplifier(PolygonSimplifier::from(&config.simplify))
            .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
