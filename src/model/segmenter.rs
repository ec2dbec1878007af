use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, RgbImage};

use crate::category::{Category, CategoryMask};
use crate::error::{Error, Result};

use super::input::{image_to_tensor, Normalization};
use super::Segmenter;

type ConfidencePlane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Multiclass selfie segmentation (hair, skin, clothes, ...).
///
/// Input `[1, 256, 256, 3]` in [0,1], output `[1, 256, 256, 6]` class
/// confidences in label order.
pub struct SelfieSegmenter {
    session: ort::Session,
}

impl SelfieSegmenter {
    pub const INPUT_SIZE: u32 = 256;

    // selfie_multiclass_256x256.onnx
    #[tracing::instrument(name = "Initialize segmentation model", err)]
    pub fn new(onnx_path: PathBuf) -> Result<Self> {
        Ok(Self {
            session: super::start_session_from_file(onnx_path)?,
        })
    }
}

impl Segmenter for SelfieSegmenter {
    fn segment(&mut self, image: &RgbImage) -> Result<CategoryMask> {
        let size = Self::INPUT_SIZE;
        let tensor = image_to_tensor(image, size, size, Normalization::ZeroToOne);

        let outputs = self.session.run(ort::inputs![tensor]?)?;
        let confidences = outputs[0].try_extract_tensor::<f32>()?;

        let expected = [1, size as usize, size as usize, Category::ALL.len()];
        if confidences.shape() != expected {
            return Err(Error::InvalidModelOutput(format!(
                "segmentation output shape {:?}, expected {:?}",
                confidences.shape(),
                expected
            )));
        }

        let data: Vec<f32> = confidences.iter().copied().collect();
        categories_from_confidences(&data, (size, size), image.dimensions())
    }
}

/// Upsample per-class confidences (`h x w x classes`, row-major) to `target`
/// and label each pixel with its most confident class.
///
/// Ties go to the lower label.
pub fn categories_from_confidences(
    confidences: &[f32],
    (width, height): (u32, u32),
    (target_width, target_height): (u32, u32),
) -> Result<CategoryMask> {
    let classes = Category::ALL.len();
    let pixels = (width * height) as usize;
    if confidences.len() != pixels * classes {
        return Err(Error::InvalidModelOutput(format!(
            "expected {} confidences, got {}",
            pixels * classes,
            confidences.len()
        )));
    }

    let planes: Vec<ConfidencePlane> = (0..classes)
        .map(|class| {
            let plane = ConfidencePlane::from_fn(width, height, |x, y| {
                let idx = (y * width + x) as usize * classes + class;
                Luma([confidences[idx]])
            });
            if (width, height) == (target_width, target_height) {
                plane
            } else {
                imageops::resize(&plane, target_width, target_height, FilterType::Triangle)
            }
        })
        .collect();

    let labels = GrayImage::from_fn(target_width, target_height, |x, y| {
        let mut best = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (class, plane) in planes.iter().enumerate() {
            let score = plane.get_pixel(x, y)[0];
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        Luma([Category::ALL[best].label()])
    });

    Ok(CategoryMask::new(labels))
}
