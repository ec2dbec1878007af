//! Segmentation labels and the per-pixel category mask.

use image::{GrayImage, Luma};

use crate::error::{Error, Result};

/// Labels of the multiclass selfie segmentation model.
///
/// The discriminants are the integer labels the model writes into its
/// category mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    Background = 0,
    Hair = 1,
    BodySkin = 2,
    FaceSkin = 3,
    Clothes = 4,
    Others = 5,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Background,
        Category::Hair,
        Category::BodySkin,
        Category::FaceSkin,
        Category::Clothes,
        Category::Others,
    ];

    pub const fn label(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Background => "background",
            Category::Hair => "hair",
            Category::BodySkin => "body-skin",
            Category::FaceSkin => "face-skin",
            Category::Clothes => "clothes",
            Category::Others => "others",
        }
    }
}

impl TryFrom<u8> for Category {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Category::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::UnknownCategory(value))
    }
}

/// One segmentation label per image pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMask {
    labels: GrayImage,
}

impl CategoryMask {
    pub fn new(labels: GrayImage) -> Self {
        Self { labels }
    }

    /// Build a mask from row-major labels.
    ///
    /// A buffer too short for the grid is reported as a `len x 1` mismatch.
    pub fn from_raw(width: u32, height: u32, labels: Vec<u8>) -> Result<Self> {
        let len = labels.len() as u32;
        GrayImage::from_raw(width, height, labels)
            .map(Self::new)
            .ok_or(Error::DimensionMismatch {
                expected: (width, height),
                actual: (len, 1),
            })
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> Category,
    {
        Self::new(GrayImage::from_fn(width, height, |x, y| {
            Luma([f(x, y).label()])
        }))
    }

    pub fn width(&self) -> u32 {
        self.labels.width()
    }

    pub fn height(&self) -> u32 {
        self.labels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.labels.dimensions()
    }

    pub fn label_at(&self, x: u32, y: u32) -> u8 {
        self.labels.get_pixel(x, y)[0]
    }

    pub fn category_at(&self, x: u32, y: u32) -> Result<Category> {
        Category::try_from(self.label_at(x, y))
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.labels
    }

    /// Number of pixels carrying `category`.
    pub fn count(&self, category: Category) -> usize {
        self.labels
            .pixels()
            .filter(|p| p[0] == category.label())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_u8() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(category.label()).unwrap(), category);
        }
        assert_eq!(Category::Hair.label(), 1);
        assert_eq!(Category::Clothes.label(), 4);
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert!(matches!(
            Category::try_from(6),
            Err(Error::UnknownCategory(6))
        ));
    }

    #[test]
    fn mask_from_fn_and_count() {
        let mask = CategoryMask::from_fn(4, 2, |x, _| {
            if x < 1 {
                Category::Hair
            } else {
                Category::Background
            }
        });
        assert_eq!(mask.dimensions(), (4, 2));
        assert_eq!(mask.count(Category::Hair), 2);
        assert_eq!(mask.count(Category::Background), 6);
        assert_eq!(mask.category_at(0, 1).unwrap(), Category::Hair);
    }

    #[test]
    fn raw_labels_must_fill_the_grid() {
        assert!(CategoryMask::from_raw(2, 2, vec![0, 1, 2, 3]).is_ok());
        assert!(matches!(
            CategoryMask::from_raw(2, 2, vec![0, 1, 2]),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
