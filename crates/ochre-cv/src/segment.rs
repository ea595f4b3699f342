//! Colour-based object segmentation.
//!
//! A frame is thresholded into a binary mask by an HSV range, cleaned up
//! with a morphological close (dilate, fill external contours, erode) so
//! near-touching fragments merge and speckles vanish, then traced into
//! contours. Each contour becomes a [`Blob`] positioned in screen space.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use ochre_core::{ColourRange, Point, Rect, geometry::point_in_polygon};

use crate::frame::{Frame, rgb_to_hsv};

/// Radius of the square structuring element used by the morphological close.
const CLOSE_RADIUS: u8 = 10;

/// One connected region matching a colour range: contour polygon and
/// bounding box, both in screen space. Owned by the detection call that
/// produced it.
#[derive(Debug, Clone)]
pub struct Blob {
    pub id: usize,
    pub polygon: Vec<Point>,
    pub bounds: Rect,
}

impl Blob {
    /// True if the screen-space point lies inside the blob's contour.
    /// Degenerate contours (fewer than three vertices) fall back to the
    /// bounding box.
    pub fn contains(&self, p: Point) -> bool {
        if self.polygon.len() < 3 {
            self.bounds.contains(p)
        } else {
            point_in_polygon(p, &self.polygon)
        }
    }
}

/// Thresholds the frame into a binary mask: 255 where the pixel's HSV value
/// falls inside `range`, 0 elsewhere.
pub fn colour_mask(frame: &Frame, range: &ColourRange) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (x, y, px) in frame.image().enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        if range.contains(h, s, v) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Accumulates masks for several ranges into one, converting to HSV once.
/// Used for zones whose text is rendered in more than one colour.
pub fn combined_mask(frame: &Frame, ranges: &[ColourRange]) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (x, y, px) in frame.image().enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        if ranges.iter().any(|r| r.contains(h, s, v)) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Morphological close: dilate to bridge breaks (a C becomes an O), fill
/// every external contour so internal holes cannot split one object into
/// several, then erode back to the original scale.
pub fn morph_close(mask: &GrayImage) -> GrayImage {
    let mut closed = dilate(mask, Norm::LInf, CLOSE_RADIUS);

    let contours = find_contours::<i32>(&closed);
    for contour in &contours {
        if contour.border_type == BorderType::Outer {
            fill_contour(&mut closed, contour);
        }
    }

    erode(&closed, Norm::LInf, CLOSE_RADIUS)
}

fn fill_contour(mask: &mut GrayImage, contour: &Contour<i32>) {
    if contour.points.len() >= 3 {
        imageproc::drawing::draw_polygon_mut(mask, &contour.points, Luma([255]));
    } else {
        for p in &contour.points {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height() {
                mask.put_pixel(p.x as u32, p.y as u32, Luma([255]));
            }
        }
    }
}

/// Segments the frame into blobs of the given colour.
///
/// Returns an empty list, never an error, when nothing in the frame matches.
pub fn segment(frame: &Frame, range: &ColourRange) -> Vec<Blob> {
    let mask = colour_mask(frame, range);
    let closed = morph_close(&mask);
    blobs_from_mask(&closed, frame.region().origin())
}

/// Traces the contours of a binary mask into screen-space blobs. The mask is
/// frame-local; `origin` is the capture rectangle's top-left corner.
pub fn blobs_from_mask(mask: &GrayImage, origin: Point) -> Vec<Blob> {
    find_contours::<i32>(mask)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .enumerate()
        .map(|(id, contour)| {
            let polygon: Vec<Point> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x + origin.x, p.y + origin.y))
                .collect();
            Blob {
                id,
                bounds: polygon_bounds(&polygon),
                polygon,
            }
        })
        .collect()
}

fn polygon_bounds(polygon: &[Point]) -> Rect {
    let min_x = polygon.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = polygon.iter().map(|p| p.y).min().unwrap_or(0);
    let max_x = polygon.iter().map(|p| p.x).max().unwrap_or(0);
    let max_y = polygon.iter().map(|p| p.y).max().unwrap_or(0);
    Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Picks the blob whose bounding-box centre is nearest the window centre.
/// Ties resolve to the first candidate in input order. Used whenever exactly
/// one target is wanted among several same-coloured candidates.
pub fn closest_to_centre<'a>(blobs: &'a [Blob], window: Rect) -> Option<&'a Blob> {
    let centre = window.centre();
    let mut best: Option<(&Blob, f64)> = None;
    for blob in blobs {
        let d = blob.bounds.centre().distance(centre);
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((blob, d));
        }
    }
    best.map(|(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use ochre_core::colour;

    /// A frame with a solid-coloured square drawn at `rect` (frame-local).
    fn frame_with_square(size: u32, rect: Rect, rgba: [u8; 4], origin: Point) -> Frame {
        let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                img.put_pixel(x as u32, y as u32, Rgba(rgba));
            }
        }
        Frame::new(img, Rect::new(origin.x, origin.y, size as i32, size as i32))
    }

    // Pure purple: H=150 in OpenCV convention, inside the Purple range.
    const PURPLE_RGBA: [u8; 4] = [255, 0, 255, 255];

    #[test]
    fn test_segment_finds_square_in_screen_space() {
        let origin = Point::new(300, 400);
        let frame = frame_with_square(120, Rect::new(40, 50, 30, 30), PURPLE_RGBA, origin);
        let blobs = segment(&frame, &colour::PURPLE);

        assert_eq!(blobs.len(), 1);
        let blob = &blobs[0];
        // Bounding box must land inside the capture rect in screen space.
        assert!(frame.region().encloses(blob.bounds));
        // And roughly where the square was drawn (close is not exact at edges).
        assert!((blob.bounds.x - (origin.x + 40)).abs() <= 2);
        assert!((blob.bounds.y - (origin.y + 50)).abs() <= 2);
    }

    #[test]
    fn test_segment_nothing_matching_is_empty() {
        let frame = frame_with_square(
            80,
            Rect::new(10, 10, 20, 20),
            [0, 255, 0, 255],
            Point::new(0, 0),
        );
        assert!(segment(&frame, &colour::PURPLE).is_empty());
    }

    #[test]
    fn test_morph_close_bridges_fragments() {
        // Two purple fragments 6px apart merge into a single blob after the
        // close, where a raw trace would find two.
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        for y in 40..60 {
            for x in 20..44 {
                img.put_pixel(x, y, Rgba(PURPLE_RGBA));
            }
            for x in 50..74 {
                img.put_pixel(x, y, Rgba(PURPLE_RGBA));
            }
        }
        let frame = Frame::new(img, Rect::new(0, 0, 100, 100));
        let blobs = segment(&frame, &colour::PURPLE);
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn test_blob_contains_uses_polygon() {
        let origin = Point::new(0, 0);
        let frame = frame_with_square(100, Rect::new(30, 30, 40, 40), PURPLE_RGBA, origin);
        let blobs = segment(&frame, &colour::PURPLE);
        let blob = &blobs[0];
        assert!(blob.contains(Point::new(50, 50)));
        assert!(!blob.contains(Point::new(5, 5)));
    }

    #[test]
    fn test_closest_to_centre_prefers_central_blob() {
        let window = Rect::new(0, 0, 200, 200);
        let blobs = vec![
            Blob {
                id: 0,
                polygon: vec![],
                bounds: Rect::new(10, 10, 10, 10),
            },
            Blob {
                id: 1,
                polygon: vec![],
                bounds: Rect::new(95, 95, 10, 10),
            },
            Blob {
                id: 2,
                polygon: vec![],
                bounds: Rect::new(150, 150, 10, 10),
            },
        ];
        assert_eq!(closest_to_centre(&blobs, window).unwrap().id, 1);
    }

    #[test]
    fn test_closest_to_centre_tie_takes_first() {
        let window = Rect::new(0, 0, 100, 100);
        // Mirror images around the centre: identical distance.
        let blobs = vec![
            Blob {
                id: 0,
                polygon: vec![],
                bounds: Rect::new(20, 45, 10, 10),
            },
            Blob {
                id: 1,
                polygon: vec![],
                bounds: Rect::new(70, 45, 10, 10),
            },
        ];
        assert_eq!(closest_to_centre(&blobs, window).unwrap().id, 0);
    }

    #[test]
    fn test_closest_to_centre_empty() {
        assert!(closest_to_centre(&[], Rect::new(0, 0, 10, 10)).is_none());
    }

    #[test]
    fn test_combined_mask_unions_ranges() {
        let mut img = RgbaImage::from_pixel(40, 10, Rgba([0, 0, 0, 255]));
        img.put_pixel(5, 5, Rgba(PURPLE_RGBA));
        img.put_pixel(25, 5, Rgba([0, 255, 0, 255]));
        let frame = Frame::new(img, Rect::new(0, 0, 40, 10));

        let mask = combined_mask(&frame, &[colour::PURPLE, colour::GREEN]);
        assert_eq!(mask.get_pixel(5, 5)[0], 255);
        assert_eq!(mask.get_pixel(25, 5)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }
}
