use crate::geometry::{Point, deg_to_rad, normalize_angle_rad};
use crate::options::FabOptions;
use std::f64::consts::PI;

pub const OUTLINE_SAMPLES: usize = 36;
pub const BULGE_SIGMA: f64 = 0.6;

/// A radial deformation of the blob centred on `angle` (radians, y-up convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bulge {
    pub angle: f64,
    pub magnitude: f64,
}

impl Bulge {
    pub fn from_degrees(angle_deg: f64, magnitude: f64) -> Self {
        Self {
            angle: deg_to_rad(angle_deg),
            magnitude,
        }
    }

    fn falloff(&self, point_angle: f64) -> f64 {
        let delta = normalize_angle_rad(point_angle - self.angle);
        (-(delta * delta) / (2.0 * BULGE_SIGMA * BULGE_SIGMA)).exp()
    }
}

/// Quadratic curve segment, ending at `to`; the start is the previous segment's end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSegment {
    pub control: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlobPath {
    pub start: Point,
    pub segments: Vec<QuadSegment>,
}

impl BlobPath {
    /// Same curve expressed with cubic segments, for backends without quadratic curves.
    pub fn to_cubics(&self) -> Vec<CubicSegment> {
        let mut from = self.start;
        self.segments
            .iter()
            .map(|seg| {
                let c1 = Point::new(
                    from.x + 2.0 / 3.0 * (seg.control.x - from.x),
                    from.y + 2.0 / 3.0 * (seg.control.y - from.y),
                );
                let c2 = Point::new(
                    seg.to.x + 2.0 / 3.0 * (seg.control.x - seg.to.x),
                    seg.to.y + 2.0 / 3.0 * (seg.control.y - seg.to.y),
                );
                from = seg.to;
                CubicSegment { c1, c2, to: seg.to }
            })
            .collect()
    }
}

fn point_angle(center: Point, p: Point) -> f64 {
    (-(p.y - center.y)).atan2(p.x - center.x)
}

pub fn sample_circle(center: Point, radius: f64) -> Vec<Point> {
    (0..OUTLINE_SAMPLES)
        .map(|k| {
            let theta = 2.0 * PI * k as f64 / OUTLINE_SAMPLES as f64;
            Point::new(
                center.x + radius * theta.cos(),
                center.y - radius * theta.sin(),
            )
        })
        .collect()
}

/// Displaces the outline radially, one bulge after another on the already-deformed points.
pub fn deform(
    points: &mut [Point],
    center: Point,
    radius: f64,
    bounce_factor: f64,
    bulges: &[Bulge],
) {
    for bulge in bulges.iter().filter(|b| b.magnitude != 0.0) {
        for p in points.iter_mut() {
            let theta = point_angle(center, *p);
            let dist = p.distance(center);
            let push = radius * bounce_factor * bulge.magnitude * bulge.falloff(theta);
            let new_dist = dist + push;
            *p = Point::new(
                center.x + new_dist * theta.cos(),
                center.y - new_dist * theta.sin(),
            );
        }
    }
}

/// Closes the polygon with quadratic curves through the midpoints of consecutive samples.
pub fn smooth_closed(points: &[Point]) -> BlobPath {
    let Some(&last) = points.last() else {
        return BlobPath {
            start: Point::default(),
            segments: Vec::new(),
        };
    };

    let segments = points
        .iter()
        .enumerate()
        .map(|(i, &p)| QuadSegment {
            control: p,
            to: p.midpoint(points[(i + 1) % points.len()]),
        })
        .collect();

    BlobPath {
        start: last.midpoint(points[0]),
        segments,
    }
}

pub fn blob_path(center: Point, radius: f64, bounce_factor: f64, bulges: &[Bulge]) -> BlobPath {
    let mut points = sample_circle(center, radius);
    deform(&mut points, center, radius, bounce_factor, bulges);
    smooth_closed(&points)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub opacity: f64,
    pub blur: f64,
    pub offset_y: f64,
}

impl Shadow {
    pub fn from_bulges(bulges: &[Bulge], options: &FabOptions) -> Self {
        let mean = if bulges.is_empty() {
            0.0
        } else {
            bulges.iter().map(|b| b.magnitude.abs()).sum::<f64>() / bulges.len() as f64
        };

        // the bulge pointing most upwards
        let top = bulges
            .iter()
            .max_by(|a, b| a.angle.sin().total_cmp(&b.angle.sin()))
            .map(|b| b.magnitude)
            .unwrap_or(0.0);

        Self {
            opacity: (options.shadow_base_opacity + options.shadow_opacity_gain * mean)
                .clamp(0.0, 1.0),
            blur: options.shadow_base_blur + options.shadow_blur_gain * mean,
            offset_y: options.shadow_base_offset - options.shadow_lift * top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point { x: 100.0, y: 100.0 };

    #[test]
    fn test_sample_count_and_radius() {
        let points = sample_circle(CENTER, 28.0);
        assert_eq!(points.len(), OUTLINE_SAMPLES);
        for p in &points {
            assert!((p.distance(CENTER) - 28.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_no_bulge_keeps_circle() {
        let mut points = sample_circle(CENTER, 28.0);
        let original = points.clone();
        deform(&mut points, CENTER, 28.0, 0.18, &[Bulge::from_degrees(90.0, 0.0)]);
        assert_eq!(points, original);
    }

    #[test]
    fn test_bulge_pushes_nearest_sample_outward() {
        let radius = 28.0;
        let mut points = sample_circle(CENTER, radius);
        deform(&mut points, CENTER, radius, 0.2, &[Bulge::from_degrees(90.0, 1.0)]);

        // sample 9 sits at 90 degrees, straight up
        let top = points[9];
        assert!((top.distance(CENTER) - (radius + radius * 0.2)).abs() < 1e-9);
        assert!(top.y < CENTER.y);

        // opposite side barely moves
        let bottom = points[27];
        assert!(bottom.distance(CENTER) - radius < 0.01);
    }

    #[test]
    fn test_inward_bulge_shrinks() {
        let radius = 28.0;
        let mut points = sample_circle(CENTER, radius);
        deform(&mut points, CENTER, radius, 0.2, &[Bulge::from_degrees(180.0, -0.5)]);
        assert!(points[18].distance(CENTER) < radius);
    }

    #[test]
    fn test_bulges_compose() {
        let radius = 30.0;
        let mut once = sample_circle(CENTER, radius);
        deform(&mut once, CENTER, radius, 0.2, &[Bulge::from_degrees(0.0, 1.0)]);
        let mut twice = sample_circle(CENTER, radius);
        deform(
            &mut twice,
            CENTER,
            radius,
            0.2,
            &[Bulge::from_degrees(0.0, 0.5), Bulge::from_degrees(0.0, 0.5)],
        );
        for (a, b) in once.iter().zip(&twice) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn test_smooth_path_is_closed() {
        let path = blob_path(CENTER, 20.0, 0.18, &[]);
        assert_eq!(path.segments.len(), OUTLINE_SAMPLES);
        let end = path.segments.last().map(|s| s.to);
        assert_eq!(end, Some(path.start));

        let cubics = path.to_cubics();
        assert_eq!(cubics.len(), OUTLINE_SAMPLES);
        assert_eq!(cubics[0].to, path.segments[0].to);
    }

    #[test]
    fn test_shadow_responds_to_bulges() {
        let options = FabOptions::default();
        let rest = Shadow::from_bulges(&[], &options);
        assert_eq!(rest.opacity, options.shadow_base_opacity);
        assert_eq!(rest.offset_y, options.shadow_base_offset);

        let lifted = Shadow::from_bulges(
            &[Bulge::from_degrees(90.0, 0.8), Bulge::from_degrees(180.0, 0.0)],
            &options,
        );
        assert!(lifted.opacity > rest.opacity);
        assert!(lifted.blur > rest.blur);
        assert!(lifted.offset_y < rest.offset_y);

        let sunk = Shadow::from_bulges(&[Bulge::from_degrees(90.0, -0.8)], &options);
        assert!(sunk.offset_y > rest.offset_y);
    }
}
