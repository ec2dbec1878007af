//! Region masks and average colors for one image.

use std::fmt;

use image::RgbImage;

use crate::category::{Category, CategoryMask};
use crate::color::{average_color, AverageColor};
use crate::error::{Error, Result};
use crate::landmarks::{validate_tables, Region};
use crate::mask::RegionMask;
use crate::types::FaceLandmarks;

/// Average color of every reported region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionColors {
    pub hair: AverageColor,
    /// Body skin and face skin together.
    pub skin: AverageColor,
    pub clothes: AverageColor,
    pub iris: AverageColor,
    pub eyebrows: AverageColor,
    pub lips: AverageColor,
    pub body_skin: AverageColor,
    pub face_skin: AverageColor,
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Colors(RegionColors),
    /// No face was detected. No colors are reported, including those that do
    /// not depend on landmarks.
    NoFace,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::NoFace => write!(f, "No face landmarks detected."),
            Report::Colors(c) => {
                writeln!(f, "Hair: {}", c.hair)?;
                writeln!(f, "Skin_sum: {}", c.skin)?;
                writeln!(f, "clothes: {}", c.clothes)?;
                writeln!(f, "Iris Color: {}", c.iris)?;
                writeln!(f, "Eyebrows Average Color: {}", c.eyebrows)?;
                write!(f, "Lips Average Color: {}", c.lips)
            }
        }
    }
}

/// Masks for the regions read straight off the segmentation labels.
#[derive(Debug, Clone)]
pub struct CategoryRegions {
    pub hair: RegionMask,
    pub body_skin: RegionMask,
    pub face_skin: RegionMask,
    pub skin: RegionMask,
    pub clothes: RegionMask,
}

impl CategoryRegions {
    pub fn new(categories: &CategoryMask) -> Result<Self> {
        let body_skin = RegionMask::from_category(categories, Category::BodySkin);
        let face_skin = RegionMask::from_category(categories, Category::FaceSkin);
        let skin = body_skin.union(&face_skin)?;

        Ok(Self {
            hair: RegionMask::from_category(categories, Category::Hair),
            body_skin,
            face_skin,
            skin,
            clothes: RegionMask::from_category(categories, Category::Clothes),
        })
    }
}

/// Masks for the regions traced from one face's landmarks.
#[derive(Debug, Clone)]
pub struct LandmarkRegions {
    pub iris: RegionMask,
    pub eyebrows: RegionMask,
    pub lips: RegionMask,
}

impl LandmarkRegions {
    pub fn new(face: &FaceLandmarks, width: u32, height: u32) -> Result<Self> {
        validate_tables(face.num_landmarks())?;

        let build = |region: Region| -> Result<RegionMask> {
            let points = face.select(region.indices());
            let mask = if region.is_iris() {
                RegionMask::from_iris(&points, width, height)?
            } else {
                RegionMask::from_polygon(&points, width, height)
            };
            tracing::debug!(region = region.name(), pixels = mask.count(), "landmark region");
            Ok(mask)
        };

        Ok(Self {
            iris: build(Region::IrisLeft)?.union(&build(Region::IrisRight)?)?,
            eyebrows: build(Region::EyebrowLeft)?.union(&build(Region::EyebrowRight)?)?,
            lips: build(Region::LipsUpper)?.union(&build(Region::LipsLower)?)?,
        })
    }
}

fn region_color(image: &RgbImage, name: &str, mask: &RegionMask) -> Result<AverageColor> {
    let color = average_color(image, mask)?;
    let pixels = mask.count();
    if pixels == 0 {
        tracing::debug!(region = name, "empty region, reporting black");
    } else {
        tracing::debug!(region = name, pixels, %color, "region color");
    }
    Ok(color)
}

/// Compute the report for `image` from its segmentation and detected faces.
///
/// Only the first face is used. With no faces the report is
/// [`Report::NoFace`], even though hair, skin, and clothes do not need
/// landmarks.
pub fn extract_colors(
    image: &RgbImage,
    categories: &CategoryMask,
    faces: &[FaceLandmarks],
) -> Result<Report> {
    Error::check_dimensions(image.dimensions(), categories.dimensions())?;

    let Some(face) = faces.first() else {
        tracing::info!("no face landmarks detected");
        return Ok(Report::NoFace);
    };
    if faces.len() > 1 {
        tracing::warn!(
            faces = faces.len(),
            "multiple faces detected, using the first"
        );
    }

    let (width, height) = image.dimensions();
    let by_category = CategoryRegions::new(categories)?;
    let by_landmark = LandmarkRegions::new(face, width, height)?;

    Ok(Report::Colors(RegionColors {
        hair: region_color(image, "hair", &by_category.hair)?,
        skin: region_color(image, "skin", &by_category.skin)?,
        clothes: region_color(image, "clothes", &by_category.clothes)?,
        iris: region_color(image, "iris", &by_landmark.iris)?,
        eyebrows: region_color(image, "eyebrows", &by_landmark.eyebrows)?,
        lips: region_color(image, "lips", &by_landmark.lips)?,
        body_skin: region_color(image, "body-skin", &by_category.body_skin)?,
        face_skin: region_color(image, "face-skin", &by_category.face_skin)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::FACE_LANDMARK_COUNT;
    use crate::types::Landmark;
    use image::Rgb;

    fn centered_face() -> FaceLandmarks {
        FaceLandmarks::new(vec![Landmark::new(0.5, 0.5, 0.0); FACE_LANDMARK_COUNT])
    }

    #[test]
    fn report_lines() {
        let color = AverageColor::new(1, 2, 3);
        let report = Report::Colors(RegionColors {
            hair: color,
            skin: AverageColor::new(4, 5, 6),
            clothes: color,
            iris: color,
            eyebrows: color,
            lips: AverageColor::new(7, 8, 9),
            body_skin: color,
            face_skin: color,
        });
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Hair: (1, 2, 3)",
                "Skin_sum: (4, 5, 6)",
                "clothes: (1, 2, 3)",
                "Iris Color: (1, 2, 3)",
                "Eyebrows Average Color: (1, 2, 3)",
                "Lips Average Color: (7, 8, 9)",
            ]
        );
    }

    #[test]
    fn all_hair_scenario() {
        let image = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([100, 0, 0])
            } else {
                Rgb([0, 0, 200])
            }
        });
        let categories = CategoryMask::from_fn(10, 10, |_, _| Category::Hair);

        let Report::Colors(colors) = extract_colors(&image, &categories, &[centered_face()]).unwrap()
        else {
            panic!("expected colors");
        };
        assert_eq!(colors.hair, AverageColor::new(50, 0, 100));
        assert_eq!(colors.skin, AverageColor::black());
        assert_eq!(colors.clothes, AverageColor::black());
        assert_eq!(colors.body_skin, AverageColor::black());
        assert_eq!(colors.face_skin, AverageColor::black());
    }

    #[test]
    fn no_face_reports_nothing_else() {
        // Hair, skin, and clothes need no landmarks but are still withheld.
        // Reporting them here would be a reasonable change of behavior.
        let image = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let categories = CategoryMask::from_fn(4, 4, |_, _| Category::Hair);

        let report = extract_colors(&image, &categories, &[]).unwrap();
        assert_eq!(report, Report::NoFace);
        assert_eq!(report.to_string(), "No face landmarks detected.");
    }

    #[test]
    fn short_face_is_rejected() {
        let image = RgbImage::new(4, 4);
        let categories = CategoryMask::from_fn(4, 4, |_, _| Category::Background);
        let face = FaceLandmarks::new(vec![Landmark::default(); 468]);

        assert!(matches!(
            extract_colors(&image, &categories, &[face]),
            Err(Error::InvalidLandmarks { .. })
        ));
    }

    #[test]
    fn mismatched_segmentation_is_rejected() {
        let image = RgbImage::new(4, 4);
        let categories = CategoryMask::from_fn(4, 3, |_, _| Category::Hair);
        assert!(matches!(
            extract_colors(&image, &categories, &[]),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
