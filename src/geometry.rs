//! Pixel-space geometry over landmark regions.

use crate::types::{Landmark, Point};

/// Project normalized landmarks into pixel space of a `width` x `height` image.
pub fn to_pixels(landmarks: &[Landmark], width: u32, height: u32) -> Vec<Point> {
    landmarks
        .iter()
        .map(|lm| lm.to_pixel(width, height))
        .collect()
}

/// Area enclosed by a landmark contour, in square pixels (shoelace formula).
///
/// Self-intersecting contours count overlapping lobes with opposite signs.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_signed: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();

    twice_signed.abs() / 2.0
}

/// Mean distance from `center` to each of `boundary`.
///
/// Returns 0 for an empty boundary.
pub fn mean_radius(center: Point, boundary: &[Point]) -> f32 {
    if boundary.is_empty() {
        return 0.0;
    }
    let total: f32 = boundary.iter().map(|p| center.distance(p)).sum();
    total / boundary.len() as f32
}

/// Round to pixel vertices, dropping consecutive duplicates and a closing
/// vertex that repeats the first.
pub(crate) fn rasterizable_vertices(points: &[Point]) -> Vec<(i32, i32)> {
    let mut vertices: Vec<(i32, i32)> = Vec::with_capacity(points.len());
    for p in points {
        let v = p.round();
        if vertices.last() != Some(&v) {
            vertices.push(v);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}
