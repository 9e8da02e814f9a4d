use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use crate::{config::PreprocessConfig, error::Result, traits::ImagePreprocessor};

/// Gaussian blur preprocessor for noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.sigma <= 0.0 {
            return Ok(image.clone());
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}

/// Inverted mean-C adaptive threshold: pixels darker than their local mean
/// minus `offset` become foreground (255), everything else background (0).
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdPreprocessor {
    pub block_radius: u32,
    pub offset: i16,
}

impl Default for AdaptiveThresholdPreprocessor {
    fn default() -> Self {
        Self {
            block_radius: 7,
            offset: 2,
        }
    }
}

impl ImagePreprocessor for AdaptiveThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mean = imageproc::filter::box_filter(image, self.block_radius, self.block_radius);
        let offset = self.offset;

        Ok(imageproc::map::map_colors2(image, &mean, |p: Luma<u8>, m: Luma<u8>| {
            if p[0] as i16 <= m[0] as i16 - offset {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        }))
    }
}

/// Morphological opening with a square structuring element, repeated
/// `iterations` times (erosions first, then as many dilations).
#[derive(Debug, Clone)]
pub struct OpeningPreprocessor {
    pub radius: u8,
    pub iterations: u8,
}

impl Default for OpeningPreprocessor {
    fn default() -> Self {
        Self {
            radius: 1,
            iterations: 1,
        }
    }
}

impl ImagePreprocessor for OpeningPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        // n erosions by a square of radius r equal one erosion by radius n * r
        let k = (self.radius as u16 * self.iterations as u16).min(u8::MAX as u16) as u8;
        if k == 0 {
            return Ok(image.clone());
        }
        Ok(imageproc::morphology::open(image, Norm::LInf, k))
    }
}

/// The blur → threshold → opening chain described by `config`.
pub fn preprocessors_for(config: &PreprocessConfig) -> Vec<Box<dyn ImagePreprocessor>> {
    vec![
        Box::new(GaussianBlurPreprocessor { sigma: config.blur_sigma }),
        Box::new(AdaptiveThresholdPreprocessor {
            block_radius: config.block_radius,
            offset: config.offset,
        }),
        Box::new(OpeningPreprocessor {
            radius: config.open_radius,
            iterations: config.open_iterations,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_square() -> GrayImage {
        let mut img = GrayImage::from_pixel(100, 100, Luma([255u8]));
        for y in 30..70 {
            for x in 30..70 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        img
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_side_of_edges() {
        let mask = AdaptiveThresholdPreprocessor::default()
            .preprocess(&dark_square())
            .unwrap();

        // just inside the square edge
        assert_eq!(mask.get_pixel(31, 50)[0], 255);
        // flat interior and flat background
        assert_eq!(mask.get_pixel(50, 50)[0], 0);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
        // bright side of the edge
        assert_eq!(mask.get_pixel(28, 50)[0], 0);
    }

    #[test]
    fn test_opening_removes_specks() {
        let mut img = GrayImage::new(40, 40);
        img.put_pixel(5, 5, Luma([255u8]));
        for y in 20..30 {
            for x in 20..30 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }

        let opened = OpeningPreprocessor::default().preprocess(&img).unwrap();
        assert_eq!(opened.get_pixel(5, 5)[0], 0);
        assert_eq!(opened.get_pixel(25, 25)[0], 255);
        assert_eq!(opened.get_pixel(20, 20)[0], 255);
    }

    #[test]
    fn test_zero_parameters_are_identity() {
        let img = dark_square();
        assert_eq!(GaussianBlurPreprocessor { sigma: 0.0 }.preprocess(&img).unwrap(), img);
        let opening = OpeningPreprocessor { radius: 1, iterations: 0 };
        assert_eq!(opening.preprocess(&img).unwrap(), img);
    }

    #[test]
    fn test_chain_from_config() {
        let chain = preprocessors_for(&PreprocessConfig::polygon());
        assert_eq!(chain.len(), 3);

        let mut mask = dark_square();
        for stage in &chain {
            mask = stage.preprocess(&mask).unwrap();
        }
        assert!(mask.pixels().any(|p| p[0] == 255));
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
