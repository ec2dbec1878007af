use std::path::PathBuf;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::landmarks::{validate_tables, FACE_LANDMARK_COUNT};
use crate::types::{BoundingBox, FaceLandmarks, Landmark, Point};

use super::face_detector::Detection;
use super::input::{crop_to_tensor, roi_to_image, Normalization};

pub const INPUT_SIZE: u32 = 256;

/// Face presence probability below which a mesh is discarded.
pub const PRESENCE_THRESHOLD: f32 = 0.5;

/// ROI side relative to the longer side of the detection box.
pub const ROI_SCALE: f32 = 1.5;

/// 478-point face mesh with iris refinement, run on a square face crop.
pub struct FaceMesh {
    session: ort::Session,
}

/// Square face crop in image pixels, turned about its center so the eyes
/// sit level in the crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRoi {
    pub bbox: BoundingBox,
    /// Radians; see [`roi_to_image`].
    pub rotation: f32,
}

/// Crop around a detected face: the box enlarged by [`ROI_SCALE`] to a square,
/// turned by the angle of the eye keypoints.
pub fn face_roi(detection: &Detection) -> FaceRoi {
    let bbox = &detection.bbox;
    let side = bbox.width.max(bbox.height) * ROI_SCALE;
    FaceRoi {
        bbox: BoundingBox::from_center(bbox.center(), side, side),
        rotation: eye_rotation(&detection.keypoints),
    }
}

/// Angle of the line from the first keypoint (right eye) to the second (left
/// eye). Zero when the detection carries fewer than two keypoints.
pub fn eye_rotation(keypoints: &[Point]) -> f32 {
    match keypoints {
        [right_eye, left_eye, ..] => (left_eye.y - right_eye.y).atan2(left_eye.x - right_eye.x),
        _ => 0.0,
    }
}

/// Project mesh output (crop pixels, `x y z` triples) to image-normalized landmarks.
pub fn project_landmarks(
    raw: &[f32],
    roi: &FaceRoi,
    (width, height): (u32, u32),
) -> Result<FaceLandmarks> {
    if raw.len() != FACE_LANDMARK_COUNT * 3 {
        return Err(Error::InvalidModelOutput(format!(
            "face mesh produced {} values, expected {}",
            raw.len(),
            FACE_LANDMARK_COUNT * 3
        )));
    }

    let n = INPUT_SIZE as f32;
    let points = raw
        .chunks_exact(3)
        .map(|p| {
            let xy = roi_to_image(&roi.bbox, roi.rotation, Point::new(p[0] / n, p[1] / n));
            // depth shares the x scale
            let z = p[2] / n * roi.bbox.width;
            Landmark::new(xy.x / width as f32, xy.y / height as f32, z / width as f32)
        })
        .collect();

    Ok(FaceLandmarks::new(points))
}

impl FaceMesh {
    // face_landmarks_detector.onnx
    #[tracing::instrument(name = "Initialize face mesh model", err)]
    pub fn new(onnx_path: PathBuf) -> Result<Self> {
        validate_tables(FACE_LANDMARK_COUNT)?;
        Ok(Self {
            session: super::start_session_from_file(onnx_path)?,
        })
    }

    /// Landmarks for the face inside `roi`, or `None` when the model reports
    /// no face there.
    pub fn landmarks(&self, image: &RgbImage, roi: &FaceRoi) -> Result<Option<FaceLandmarks>> {
        let tensor = crop_to_tensor(
            image,
            &roi.bbox,
            roi.rotation,
            INPUT_SIZE,
            Normalization::ZeroToOne,
        );
        let outputs = self.session.run(ort::inputs![tensor]?)?;

        let mut raw_landmarks = None;
        let mut presence = None;
        for index in 0..self.session.outputs.len() {
            let values: Vec<f32> = outputs[index]
                .try_extract_tensor::<f32>()?
                .iter()
                .copied()
                .collect();
            match values.len() {
                n if n == FACE_LANDMARK_COUNT * 3 => raw_landmarks = Some(values),
                1 => presence = Some(values[0]),
                n => tracing::debug!(index, len = n, "ignoring face mesh output"),
            }
        }

        let raw_landmarks = raw_landmarks.ok_or_else(|| {
            Error::InvalidModelOutput("face mesh has no 478-point landmark output".into())
        })?;

        if let Some(logit) = presence {
            let probability = 1.0 / (1.0 + (-logit).exp());
            if probability < PRESENCE_THRESHOLD {
                tracing::debug!(probability, "face mesh rejected crop");
                return Ok(None);
            }
        }

        project_landmarks(&raw_landmarks, roi, image.dimensions()).map(Some)
    }
}
