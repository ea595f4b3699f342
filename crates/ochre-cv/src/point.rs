//! Human-plausible click point selection.
//!
//! Candidates follow a centre-biased Gaussian over the target's bounding
//! box: most clicks land near the middle, a few drift outward, none outside
//! the box. The `tightness` divisor controls the spread — higher values
//! cluster candidates closer to the centre. Irregular blobs additionally
//! validate each candidate against the actual contour polygon and resample
//! on a miss.

use ochre_core::{Point, Rect};
use rand::Rng;

use crate::segment::Blob;

/// Spread divisor used when the caller has no preference. Derived from the
/// target's size so small targets cluster proportionally tighter.
pub fn heuristic_tightness(rect: Rect) -> f64 {
    let span = rect.width.min(rect.height) as f64;
    (span / 12.0).clamp(4.0, 10.0)
}

/// One centre-biased sample inside `rect`. Always valid for plain
/// rectangular targets — no polygon test needed.
pub fn point_in_rect(rect: Rect, tightness: f64, rng: &mut impl Rng) -> Point {
    let centre = rect.centre();
    let sx = rect.width as f64 / tightness;
    let sy = rect.height as f64 / tightness;
    let x = (centre.x as f64 + gaussian(rng) * sx).round() as i32;
    let y = (centre.y as f64 + gaussian(rng) * sy).round() as i32;
    Point::new(
        x.clamp(rect.x, rect.right() - 1),
        y.clamp(rect.y, rect.bottom() - 1),
    )
}

/// Samples up to `max_attempts` candidates over the blob's bounding box and
/// returns the first that lies inside the contour polygon. Exhaustion is a
/// miss, not an error: the caller treats `None` as "no actionable point this
/// cycle".
pub fn point_in_blob(
    blob: &Blob,
    max_attempts: u32,
    tightness: f64,
    rng: &mut impl Rng,
) -> Option<Point> {
    for _ in 0..max_attempts {
        let candidate = point_in_rect(blob.bounds, tightness, rng);
        if blob.contains(candidate) {
            return Some(candidate);
        }
    }
    log::warn!(
        "no valid point inside blob {} after {} attempts",
        blob.id,
        max_attempts
    );
    None
}

/// Standard Gaussian via Box-Muller over the crate's uniform source.
fn gaussian(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn diamond_blob() -> Blob {
        // Convex diamond inscribed in a 40x40 box: exactly half the area.
        Blob {
            id: 0,
            polygon: vec![
                Point::new(20, 0),
                Point::new(40, 20),
                Point::new(20, 40),
                Point::new(0, 20),
            ],
            bounds: Rect::new(0, 0, 41, 41),
        }
    }

    #[test]
    fn test_zero_attempts_is_deterministically_empty() {
        let blob = diamond_blob();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(point_in_blob(&blob, 0, 5.0, &mut rng).is_none());
        }
    }

    #[test]
    fn test_convex_polygon_converges_with_attempts() {
        let blob = diamond_blob();
        let mut rng = StdRng::seed_from_u64(42);
        let hits = (0..200)
            .filter(|_| point_in_blob(&blob, 20, 5.0, &mut rng).is_some())
            .count();
        // Centre-biased samples over a centred convex shape covering half
        // the box succeed almost always within 20 attempts.
        assert!(hits > 190, "only {hits}/200 runs found a point");
    }

    #[test]
    fn test_found_points_lie_inside_polygon() {
        let blob = diamond_blob();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            if let Some(p) = point_in_blob(&blob, 20, 5.0, &mut rng) {
                assert!(blob.contains(p));
            }
        }
    }

    #[test]
    fn test_rect_samples_stay_in_bounds() {
        let rect = Rect::new(100, 200, 30, 10);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let p = point_in_rect(rect, 2.0, &mut rng);
            assert!(rect.contains(p), "{p:?} escaped {rect:?}");
        }
    }

    #[test]
    fn test_higher_tightness_clusters_closer() {
        let rect = Rect::new(0, 0, 100, 100);
        let centre = rect.centre();
        let mut rng = StdRng::seed_from_u64(11);

        let spread = |tightness: f64, rng: &mut StdRng| -> f64 {
            (0..400)
                .map(|_| point_in_rect(rect, tightness, rng).distance(centre))
                .sum::<f64>()
                / 400.0
        };

        let loose = spread(4.0, &mut rng);
        let tight = spread(15.0, &mut rng);
        assert!(
            tight < loose,
            "tightness 15 spread {tight:.1} not under tightness 4 spread {loose:.1}"
        );
    }

    #[test]
    fn test_heuristic_tightness_scales_with_size() {
        assert_eq!(heuristic_tightness(Rect::new(0, 0, 10, 10)), 4.0);
        assert_eq!(heuristic_tightness(Rect::new(0, 0, 200, 200)), 10.0);
        let mid = heuristic_tightness(Rect::new(0, 0, 96, 96));
        assert!(mid > 4.0 && mid < 10.0);
    }
}
