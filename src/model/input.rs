//! Image to tensor conversion for the NHWC float models.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use crate::types::{BoundingBox, Point};

/// Pixel value range a model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// `v / 255`
    ZeroToOne,
    /// `v / 127.5 - 1`
    MinusOneToOne,
}

impl Normalization {
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Normalization::ZeroToOne => value / 255.0,
            Normalization::MinusOneToOne => value / 127.5 - 1.0,
        }
    }
}

/// Resize the whole image to `width` x `height` and lay it out as `[1, h, w, 3]`.
pub fn image_to_tensor(
    image: &RgbImage,
    width: u32,
    height: u32,
    normalization: Normalization,
) -> Array4<f32> {
    let resized = imageops::resize(image, width, height, FilterType::Triangle);
    Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, c)| normalization.apply(resized.get_pixel(x as u32, y as u32)[c] as f32),
    )
}

/// Map `p`, normalized to `roi` turned by `rotation` radians about its center,
/// into image pixels.
///
/// Positive rotation turns the crop's x axis toward the image's y axis.
pub fn roi_to_image(roi: &BoundingBox, rotation: f32, p: Point) -> Point {
    let center = roi.center();
    let dx = (p.x - 0.5) * roi.width;
    let dy = (p.y - 0.5) * roi.height;
    let (sin, cos) = rotation.sin_cos();
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Sample `roi` (in image pixels), turned by `rotation` radians, into a
/// `size` x `size` tensor `[1, size, size, 3]`.
///
/// The region may extend past the image; those samples read as black before
/// normalization.
pub fn crop_to_tensor(
    image: &RgbImage,
    roi: &BoundingBox,
    rotation: f32,
    size: u32,
    normalization: Normalization,
) -> Array4<f32> {
    let n = size as f32;
    Array4::from_shape_fn((1, size as usize, size as usize, 3), |(_, y, x, c)| {
        let src = roi_to_image(
            roi,
            rotation,
            Point::new((x as f32 + 0.5) / n, (y as f32 + 0.5) / n),
        );
        normalization.apply(sample_bilinear(image, src.x - 0.5, src.y - 0.5, c))
    })
}

/// The square region, centered on the image, that letterboxes it.
pub fn letterbox_roi(width: u32, height: u32) -> BoundingBox {
    let side = width.max(height) as f32;
    BoundingBox::from_center(
        Point::new(width as f32 / 2.0, height as f32 / 2.0),
        side,
        side,
    )
}

#[inline]
fn channel_at(image: &RgbImage, x: i32, y: i32, c: usize) -> f32 {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return 0.0;
    }
    image.get_pixel(x as u32, y as u32)[c] as f32
}

/// Sample one channel with bilinear interpolation for sub-pixel accuracy.
/// Coordinates address pixel centers at integer positions.
#[inline]
fn sample_bilinear(image: &RgbImage, x: f32, y: f32, c: usize) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = channel_at(image, x0, y0, c);
    let p10 = channel_at(image, x1, y0, c);
    let p01 = channel_at(image, x0, y1, c);
    let p11 = channel_at(image, x1, y1, c);

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bottom = p01 * (1.0 - fx) + p11 * fx;
    top * (1.0 - fy) + bottom * fy
}
