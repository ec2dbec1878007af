//! Mean color of an image under a region mask.

use std::fmt;

use image::{Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::mask::RegionMask;

/// Mean R, G, B of a region, each rounded to the nearest integer (ties to even).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AverageColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AverageColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl From<Rgb<u8>> for AverageColor {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::new(r, g, b)
    }
}

impl From<AverageColor> for Rgb<u8> {
    fn from(color: AverageColor) -> Self {
        Rgb([color.r, color.g, color.b])
    }
}

impl fmt::Display for AverageColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Mean color of the pixels of `image` selected by `mask`.
///
/// A mask that selects nothing yields black rather than an error.
pub fn average_color(image: &RgbImage, mask: &RegionMask) -> Result<AverageColor> {
    Error::check_dimensions(mask.dimensions(), image.dimensions())?;

    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.contains(x, y) {
            for (total, value) in sum.iter_mut().zip(pixel.0) {
                *total += value as u64;
            }
            count += 1;
        }
    }

    if count == 0 {
        return Ok(AverageColor::black());
    }

    let channel = |total: u64| {
        (total as f64 / count as f64)
            .round_ties_even()
            .clamp(0.0, 255.0) as u8
    };
    Ok(AverageColor::new(
        channel(sum[0]),
        channel(sum[1]),
        channel(sum[2]),
    ))
}
