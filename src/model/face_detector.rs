//! Short-range BlazeFace detector: anchors, box decoding, and suppression.

use std::path::PathBuf;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Point};

use super::input::{crop_to_tensor, letterbox_roi, Normalization};

pub const INPUT_SIZE: u32 = 128;
pub const NUM_ANCHORS: usize = 896;
pub const NUM_KEYPOINTS: usize = 6;

/// Box (4) plus keypoints (2 each) per anchor.
const NUM_COORDS: usize = 4 + NUM_KEYPOINTS * 2;

/// Feature map strides; consecutive equal strides share one grid.
const STRIDES: [u32; 4] = [8, 16, 16, 16];

/// Anchors per layer per cell (one square anchor plus the interpolated one).
const ANCHORS_PER_LAYER: usize = 2;

pub const SCORE_THRESHOLD: f32 = 0.5;
pub const IOU_THRESHOLD: f32 = 0.3;

/// A detected face in image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Right eye, left eye, nose tip, mouth, right and left ear tragion,
    /// as seen by the subject.
    pub keypoints: Vec<Point>,
    pub score: f32,
}

/// SSD anchor centers, normalized to the detector input.
pub fn generate_anchors() -> Vec<Point> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    let mut layer = 0;

    while layer < STRIDES.len() {
        let stride = STRIDES[layer];
        let mut per_cell = 0;
        while layer < STRIDES.len() && STRIDES[layer] == stride {
            per_cell += ANCHORS_PER_LAYER;
            layer += 1;
        }

        let grid = INPUT_SIZE.div_ceil(stride);
        for y in 0..grid {
            for x in 0..grid {
                let center = Point::new(
                    (x as f32 + 0.5) / grid as f32,
                    (y as f32 + 0.5) / grid as f32,
                );
                anchors.extend(std::iter::repeat(center).take(per_cell));
            }
        }
    }

    anchors
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-100.0, 100.0)).exp())
}

/// Decode raw regressor and score tensors against `anchors`.
///
/// Returned boxes and keypoints are normalized to the detector input; only
/// detections scoring at least `threshold` are kept.
pub fn decode(
    raw_boxes: &[f32],
    raw_scores: &[f32],
    anchors: &[Point],
    threshold: f32,
) -> Result<Vec<Detection>> {
    if raw_boxes.len() != anchors.len() * NUM_COORDS || raw_scores.len() != anchors.len() {
        return Err(Error::InvalidModelOutput(format!(
            "detector produced {} box values and {} scores for {} anchors",
            raw_boxes.len(),
            raw_scores.len(),
            anchors.len()
        )));
    }

    let scale = INPUT_SIZE as f32;
    let detections = anchors
        .iter()
        .zip(raw_boxes.chunks_exact(NUM_COORDS))
        .zip(raw_scores)
        .filter_map(|((anchor, raw), &logit)| {
            let score = sigmoid(logit);
            if score < threshold {
                return None;
            }

            let center = Point::new(raw[0] / scale + anchor.x, raw[1] / scale + anchor.y);
            let bbox = BoundingBox::from_center(center, raw[2] / scale, raw[3] / scale);
            let keypoints = raw[4..]
                .chunks_exact(2)
                .map(|kp| Point::new(kp[0] / scale + anchor.x, kp[1] / scale + anchor.y))
                .collect();

            Some(Detection {
                bbox,
                keypoints,
                score,
            })
        })
        .collect();

    Ok(detections)
}

/// Greedy non-maximum suppression; output is sorted by descending score.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        if kept
            .iter()
            .all(|k| k.bbox.iou(&detection.bbox) <= iou_threshold)
        {
            kept.push(detection);
        }
    }
    kept
}

/// Map a detection normalized to `roi` back into image pixels.
fn to_image_space(detection: Detection, roi: &BoundingBox) -> Detection {
    let tl = roi.denormalize_point(Point::new(detection.bbox.x, detection.bbox.y));
    Detection {
        bbox: BoundingBox::new(
            tl.x,
            tl.y,
            detection.bbox.width * roi.width,
            detection.bbox.height * roi.height,
        ),
        keypoints: detection
            .keypoints
            .into_iter()
            .map(|p| roi.denormalize_point(p))
            .collect(),
        score: detection.score,
    }
}

pub struct FaceDetector {
    session: ort::Session,
    anchors: Vec<Point>,
}

impl FaceDetector {
    // face_detector.onnx (BlazeFace short range)
    #[tracing::instrument(name = "Initialize face detection model", err)]
    pub fn new(onnx_path: PathBuf) -> Result<Self> {
        Ok(Self {
            session: super::start_session_from_file(onnx_path)?,
            anchors: generate_anchors(),
        })
    }

    /// Faces in `image`, most confident first.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let (width, height) = image.dimensions();
        let roi = letterbox_roi(width, height);
        let tensor = crop_to_tensor(image, &roi, 0.0, INPUT_SIZE, Normalization::MinusOneToOne);

        let outputs = self.session.run(ort::inputs![tensor]?)?;
        let mut raw_boxes = Vec::new();
        let mut raw_scores = Vec::new();
        for index in 0..self.session.outputs.len() {
            let values: Vec<f32> = outputs[index]
                .try_extract_tensor::<f32>()?
                .iter()
                .copied()
                .collect();
            match values.len() {
                n if n == NUM_ANCHORS * NUM_COORDS => raw_boxes = values,
                n if n == NUM_ANCHORS => raw_scores = values,
                n => tracing::debug!(index, len = n, "ignoring detector output"),
            }
        }

        let detections = decode(&raw_boxes, &raw_scores, &self.anchors, SCORE_THRESHOLD)?;
        let detections = non_max_suppression(detections, IOU_THRESHOLD);
        tracing::debug!(faces = detections.len(), "face detection");

        Ok(detections
            .into_iter()
            .map(|d| to_image_space(d, &roi))
            .collect())
    }
}
