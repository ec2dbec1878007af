//! # face-colors
//!
//! Average colors of facial and body regions from a single portrait.
//!
//! This crate provides:
//! - **Category regions**: hair, skin (body + face), and clothes masks read off
//!   a multiclass selfie segmentation
//! - **Landmark regions**: iris disks and eyebrow and lip polygons rasterized
//!   from the 478-point face mesh
//! - **Color aggregation**: the mean RGB of the image under each mask
//!
//! ## Pipeline
//!
//! 1. Run the segmentation model and the face landmarker once each
//!    ([`infer`])
//! 2. Build binary region masks from labels and landmarks ([`RegionMask`])
//! 3. Average the image under each mask ([`average_color`])
//! 4. Report the colors, or that no face was found ([`Report`])
//!
//! ## Quick Start
//!
//! ```rust
//! use face_colors::{
//!     extract_colors, Category, CategoryMask, FaceLandmarks, Landmark, Report,
//!     FACE_LANDMARK_COUNT,
//! };
//! use image::{Rgb, RgbImage};
//!
//! let image = RgbImage::from_pixel(64, 64, Rgb([120, 80, 60]));
//! let categories = CategoryMask::from_fn(64, 64, |_, y| {
//!     if y < 16 { Category::Hair } else { Category::FaceSkin }
//! });
//! let face = FaceLandmarks::new(vec![Landmark::new(0.5, 0.5, 0.0); FACE_LANDMARK_COUNT]);
//!
//! let report = extract_colors(&image, &categories, &[face]).unwrap();
//! assert!(matches!(report, Report::Colors(_)));
//! println!("{}", report);
//! ```
//!
//! ## Custom Models
//!
//! Implement [`Segmenter`] and [`LandmarkDetector`] to run the pipeline on
//! other backends:
//!
//! ```rust
//! use face_colors::{Category, CategoryMask, FaceLandmarks, LandmarkDetector, Result, Segmenter};
//! use image::RgbImage;
//!
//! struct AllHair;
//!
//! impl Segmenter for AllHair {
//!     fn segment(&mut self, image: &RgbImage) -> Result<CategoryMask> {
//!         Ok(CategoryMask::from_fn(image.width(), image.height(), |_, _| Category::Hair))
//!     }
//! }
//!
//! struct NoFaces;
//!
//! impl LandmarkDetector for NoFaces {
//!     fn detect(&mut self, _image: &RgbImage) -> Result<Vec<FaceLandmarks>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let inference = face_colors::infer(AllHair, NoFaces, &RgbImage::new(8, 8)).unwrap();
//! assert!(inference.faces.is_empty());
//! ```

mod category;
mod color;
mod error;
mod geometry;
pub mod landmarks;
mod mask;
pub mod model;
mod pipeline;
mod types;

pub use category::{Category, CategoryMask};
pub use color::{average_color, AverageColor};
pub use error::{Error, Result};
pub use geometry::{mean_radius, polygon_area, to_pixels};
pub use landmarks::{validate_tables, Region, FACE_LANDMARK_COUNT};
pub use mask::{RegionMask, IRIS_POINTS};
pub use model::{
    infer, register_ort, FaceLandmarker, Inference, LandmarkDetector, Segmenter, SelfieSegmenter,
};
pub use pipeline::{extract_colors, CategoryRegions, LandmarkRegions, RegionColors, Report};
pub use types::{BoundingBox, FaceLandmarks, Landmark, Point};
