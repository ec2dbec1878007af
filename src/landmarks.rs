//! Anatomical landmark tables for the 478-point face mesh.
//!
//! Each table is an ordered list of model landmark indices. For the polygon
//! regions the order traces the region contour, so it must not be reshuffled.

use crate::error::{Error, Result};

/// Landmarks per face produced by the face mesh model with iris refinement.
pub const FACE_LANDMARK_COUNT: usize = 478;

/// Left iris: center first, then four boundary points.
pub const IRIS_LEFT: [usize; 5] = [468, 469, 470, 471, 472];

/// Right iris: center first, then four boundary points.
pub const IRIS_RIGHT: [usize; 5] = [473, 474, 475, 476, 477];

pub const EYEBROW_LEFT: [usize; 10] = [70, 63, 105, 66, 107, 55, 65, 52, 53, 46];

pub const EYEBROW_RIGHT: [usize; 10] = [336, 296, 334, 293, 300, 276, 283, 282, 295, 285];

/// Upper lip: outer edge left to right, then inner edge left to right.
pub const LIPS_UPPER: [usize; 22] = [
    61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 78, 191, 80, 81, 82, 13, 312, 311, 310, 415,
    308,
];

pub const LIPS_LOWER: [usize; 20] = [
    375, 321, 405, 314, 17, 84, 181, 91, 146, 61, 324, 318, 402, 317, 14, 87, 178, 88, 95, 78,
];

/// A landmark-derived facial region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    IrisLeft,
    IrisRight,
    EyebrowLeft,
    EyebrowRight,
    LipsUpper,
    LipsLower,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::IrisLeft,
        Region::IrisRight,
        Region::EyebrowLeft,
        Region::EyebrowRight,
        Region::LipsUpper,
        Region::LipsLower,
    ];

    pub fn indices(&self) -> &'static [usize] {
        match self {
            Region::IrisLeft => &IRIS_LEFT,
            Region::IrisRight => &IRIS_RIGHT,
            Region::EyebrowLeft => &EYEBROW_LEFT,
            Region::EyebrowRight => &EYEBROW_RIGHT,
            Region::LipsUpper => &LIPS_UPPER,
            Region::LipsLower => &LIPS_LOWER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Region::IrisLeft => "left iris",
            Region::IrisRight => "right iris",
            Region::EyebrowLeft => "left eyebrow",
            Region::EyebrowRight => "right eyebrow",
            Region::LipsUpper => "upper lip",
            Region::LipsLower => "lower lip",
        }
    }

    pub fn is_iris(&self) -> bool {
        matches!(self, Region::IrisLeft | Region::IrisRight)
    }
}

/// Check that every table index addresses a face with `landmark_count` points.
pub fn validate_tables(landmark_count: usize) -> Result<()> {
    let required = Region::ALL
        .iter()
        .flat_map(|r| r.indices().iter())
        .max()
        .map_or(0, |max| max + 1);

    if landmark_count < required {
        return Err(Error::InvalidLandmarks {
            required,
            actual: landmark_count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_fit_the_face_mesh() {
        assert!(validate_tables(FACE_LANDMARK_COUNT).is_ok());
    }

    #[test]
    fn short_faces_are_rejected() {
        // 468 points is the mesh without iris refinement
        match validate_tables(468) {
            Err(Error::InvalidLandmarks { required, actual }) => {
                assert_eq!(required, FACE_LANDMARK_COUNT);
                assert_eq!(actual, 468);
            }
            other => panic!("expected InvalidLandmarks, got {:?}", other),
        }
    }

    #[test]
    fn iris_tables_are_center_plus_four() {
        for region in [Region::IrisLeft, Region::IrisRight] {
            assert!(region.is_iris());
            assert_eq!(region.indices().len(), 5);
        }
        assert!(!Region::LipsUpper.is_iris());
    }
}
