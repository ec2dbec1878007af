//! Model invocation: segmentation and face landmark detection.
//!
//! Both models sit behind a trait so the color pipeline can run against any
//! backend. The bundled backends run ONNX exports of the MediaPipe selfie
//! multiclass segmenter, BlazeFace short-range detector, and face mesh.

use std::path::PathBuf;

use image::RgbImage;

use crate::category::CategoryMask;
use crate::error::{Error, Result};
use crate::types::FaceLandmarks;

pub use face_detector::{Detection, FaceDetector};
pub use face_mesh::{FaceMesh, FaceRoi};
pub use segmenter::SelfieSegmenter;

pub mod face_detector;
pub mod face_mesh;
pub mod input;
pub mod segmenter;

/// Produces one category label per image pixel.
pub trait Segmenter {
    fn segment(&mut self, image: &RgbImage) -> Result<CategoryMask>;
}

/// Produces normalized landmarks for each face found, most confident first.
pub trait LandmarkDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<FaceLandmarks>>;
}

/// Raw model outputs for one image.
#[derive(Debug, Clone)]
pub struct Inference {
    pub categories: CategoryMask,
    pub faces: Vec<FaceLandmarks>,
}

/// Run each model exactly once on `image`.
///
/// Both models are consumed and released before this returns, on success and
/// on error alike.
#[tracing::instrument(name = "Running models", skip_all, fields(width = image.width(), height = image.height()))]
pub fn infer<S, D>(mut segmenter: S, mut detector: D, image: &RgbImage) -> Result<Inference>
where
    S: Segmenter,
    D: LandmarkDetector,
{
    let categories = segmenter.segment(image)?;
    drop(segmenter);
    Error::check_dimensions(image.dimensions(), categories.dimensions())?;

    let faces = detector.detect(image)?;
    drop(detector);
    tracing::debug!(faces = faces.len(), "landmark detection");

    Ok(Inference { categories, faces })
}

/// Face detector followed by the face mesh on each detected face.
pub struct FaceLandmarker {
    detector: FaceDetector,
    mesh: FaceMesh,
    max_faces: usize,
}

impl FaceLandmarker {
    /// Faces meshed per image unless changed with [`FaceLandmarker::with_max_faces`].
    pub const DEFAULT_MAX_FACES: usize = 1;

    pub fn new(detector: FaceDetector, mesh: FaceMesh) -> Self {
        Self {
            detector,
            mesh,
            max_faces: Self::DEFAULT_MAX_FACES,
        }
    }

    pub fn from_files(detector_path: PathBuf, mesh_path: PathBuf) -> Result<Self> {
        Ok(Self::new(
            FaceDetector::new(detector_path)?,
            FaceMesh::new(mesh_path)?,
        ))
    }

    pub fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }
}

impl LandmarkDetector for FaceLandmarker {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<FaceLandmarks>> {
        let detections = self.detector.detect(image)?;

        let mut faces = Vec::new();
        for detection in detections.iter().take(self.max_faces) {
            let roi = face_mesh::face_roi(detection);
            if let Some(face) = self.mesh.landmarks(image, &roi)? {
                faces.push(face);
            }
        }
        Ok(faces)
    }
}

/// Initialize the ONNX Runtime environment once per process.
#[tracing::instrument(err)]
pub fn register_ort() -> Result<()> {
    ort::init().with_name("face_colors").commit()?;
    Ok(())
}

fn start_session_from_file(onnx_path: PathBuf) -> Result<ort::Session> {
    Ok(ort::Session::builder()?
        .with_intra_threads(4)?
        .commit_from_file(onnx_path)?)
}
