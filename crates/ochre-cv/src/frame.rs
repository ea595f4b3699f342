//! Captured frames.

use image::RgbaImage;
use ochre_core::{Point, Rect};

/// An immutable pixel buffer tagged with the screen-space rectangle it was
/// captured from. The capturing caller owns it exclusively; vision code only
/// ever reads it.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    region: Rect,
}

impl Frame {
    /// Wraps a captured buffer. The buffer dimensions must match the region.
    pub fn new(image: RgbaImage, region: Rect) -> Self {
        debug_assert_eq!(image.width() as i32, region.width);
        debug_assert_eq!(image.height() as i32, region.height);
        Self { image, region }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The screen-space rectangle this frame covers.
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Screen-space point -> frame-local point.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.region.x, p.y - self.region.y)
    }

    /// Frame-local point -> screen-space point.
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x + self.region.x, p.y + self.region.y)
    }
}

/// RGB -> HSV in the OpenCV convention: hue 0..180, saturation and value
/// 0..255. Matches how the colour catalogue's bounds were calibrated.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max == 0.0 { 0.0 } else { delta / max };

    (
        (h / 2.0).round().min(179.0) as u8,
        (s * 255.0).round() as u8,
        (max * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
    }

    #[test]
    fn test_hsv_greys() {
        assert_eq!(rgb_to_hsv(0, 0, 0), (0, 0, 0));
        assert_eq!(rgb_to_hsv(255, 255, 255), (0, 0, 255));
        let (_, s, v) = rgb_to_hsv(128, 128, 128);
        assert_eq!(s, 0);
        assert_eq!(v, 128);
    }

    #[test]
    fn test_frame_coordinate_conversion() {
        let frame = Frame::new(RgbaImage::new(10, 10), Rect::new(100, 200, 10, 10));
        assert_eq!(frame.to_local(Point::new(105, 207)), Point::new(5, 7));
        assert_eq!(frame.to_screen(Point::new(5, 7)), Point::new(105, 207));
    }
}
