//! Binary region masks built from segmentation labels or facial landmarks.
//!
//! A [`RegionMask`] always holds exactly two values: [`RegionMask::ON`] for
//! pixels inside the region and 0 elsewhere.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

use crate::category::{Category, CategoryMask};
use crate::error::{Error, Result};
use crate::geometry::{mean_radius, polygon_area, rasterizable_vertices, to_pixels};
use crate::types::Landmark;

/// Landmarks needed for an iris: the center and four boundary points.
pub const IRIS_POINTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    pixels: GrayImage,
}

impl RegionMask {
    pub const ON: u8 = 255;

    /// An all-off mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    /// Pixels whose label equals `category`.
    pub fn from_category(categories: &CategoryMask, category: Category) -> Self {
        let (width, height) = categories.dimensions();
        let label = category.label();
        let pixels = GrayImage::from_fn(width, height, |x, y| {
            if categories.label_at(x, y) == label {
                Luma([Self::ON])
            } else {
                Luma([0])
            }
        });
        Self { pixels }
    }

    /// Fill the closed polygon traced by `landmarks`, in order.
    ///
    /// Vertices are `round(x * width), round(y * height)`. Boundary pixels are
    /// included. A polygon that collapses to a point or a segment rasterizes
    /// as that point or segment.
    pub fn from_polygon(landmarks: &[Landmark], width: u32, height: u32) -> Self {
        let mut mask = Self::empty(width, height);
        let points = to_pixels(landmarks, width, height);
        let vertices = rasterizable_vertices(&points);
        let on = Luma([Self::ON]);

        match vertices.as_slice() {
            [] => {}
            [(x, y)] => {
                if *x >= 0 && *y >= 0 && (*x as u32) < width && (*y as u32) < height {
                    mask.pixels.put_pixel(*x as u32, *y as u32, on);
                }
            }
            _ => {
                let polygon: Vec<PixelPoint<i32>> = vertices
                    .iter()
                    .map(|&(x, y)| PixelPoint::new(x, y))
                    .collect();
                draw_polygon_mut(&mut mask.pixels, &polygon, on);
            }
        }

        tracing::debug!(
            vertices = vertices.len(),
            area = polygon_area(&points),
            "rasterized polygon"
        );
        mask
    }

    /// Fill a disk approximating the iris.
    ///
    /// `landmarks[0]` is the center; the next four are boundary samples whose
    /// mean distance from the center gives the radius.
    pub fn from_iris(landmarks: &[Landmark], width: u32, height: u32) -> Result<Self> {
        if landmarks.len() < IRIS_POINTS {
            return Err(Error::InvalidLandmarks {
                required: IRIS_POINTS,
                actual: landmarks.len(),
            });
        }

        let points = to_pixels(&landmarks[..IRIS_POINTS], width, height);
        let radius = mean_radius(points[0], &points[1..]);

        let mut mask = Self::empty(width, height);
        draw_filled_circle_mut(
            &mut mask.pixels,
            points[0].round(),
            radius.round() as i32,
            Luma([Self::ON]),
        );

        tracing::trace!(radius, "rasterized iris");
        Ok(mask)
    }

    /// Pixel-wise logical OR.
    pub fn union(&self, other: &RegionMask) -> Result<Self> {
        Error::check_dimensions(self.dimensions(), other.dimensions())?;

        let pixels = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            if self.contains(x, y) || other.contains(x, y) {
                Luma([Self::ON])
            } else {
                Luma([0])
            }
        });
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[0] != 0
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.pixels.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.pixels
    }
}
