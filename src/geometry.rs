use std::f64::consts::PI;

pub const PRIMARY_START_DEG: f64 = 270.0;
pub const PRIMARY_END_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Evenly spreads `count` angles (degrees) from `start_deg` to `end_deg`, both inclusive.
pub fn even_arc_angles(count: usize, start_deg: f64, end_deg: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start_deg],
        _ => {
            let step = (end_deg - start_deg) / (count - 1).max(1) as f64;
            (0..count).map(|i| start_deg + step * i as f64).collect()
        }
    }
}

/// Polar to cartesian with y growing downwards.
pub fn arc_offset(angle_deg: f64, radius: f64) -> Point {
    let theta = deg_to_rad(angle_deg);
    Point::new(radius * theta.cos(), -radius * theta.sin())
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}

pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Wraps any finite angle into (-PI, PI].
pub fn normalize_angle_rad(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_even_arc_angles_counts() {
        assert!(even_arc_angles(0, 270.0, 180.0).is_empty());
        assert_eq!(even_arc_angles(1, 270.0, 180.0), vec![270.0]);

        for count in 2..12 {
            let angles = even_arc_angles(count, PRIMARY_START_DEG, PRIMARY_END_DEG);
            assert_eq!(angles.len(), count);
            assert!((angles[0] - 270.0).abs() < EPS);
            assert!((angles[count - 1] - 180.0).abs() < EPS);

            let step = angles[1] - angles[0];
            for pair in angles.windows(2) {
                assert!((pair[1] - pair[0] - step).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
        assert_eq!(lerp(2.0, 10.0, -3.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 7.0), 10.0);

        let p = lerp_point(Point::new(0.0, 0.0), Point::new(4.0, -8.0), 0.25);
        assert_eq!(p, Point::new(1.0, -2.0));
    }

    #[test]
    fn test_normalize_angle_range() {
        let inputs = [
            0.0, PI, -PI, 3.0 * PI, -3.0 * PI, 7.5, -7.5, 1e6, -1e6, 2.0 * PI, 0.1,
        ];
        for a in inputs {
            let n = normalize_angle_rad(a);
            assert!(n > -PI && n <= PI, "{a} normalized to {n}");
            // same direction on the circle
            assert!((n.sin() - a.sin()).abs() < 1e-6);
            assert!((n.cos() - a.cos()).abs() < 1e-6);
        }
        assert!((normalize_angle_rad(-PI) - PI).abs() < EPS);
    }

    #[test]
    fn test_arc_offset_magnitude_matches_radius() {
        for step in 0..72 {
            let angle = step as f64 * 5.0 - 180.0;
            for radius in [0.0, 1.0, 56.0, 120.0] {
                let offset = arc_offset(angle, radius);
                assert!((offset.magnitude() - radius).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_arc_offset_y_points_down() {
        let up = arc_offset(90.0, 10.0);
        assert!(up.x.abs() < EPS);
        assert!((up.y + 10.0).abs() < EPS);

        let left = arc_offset(180.0, 10.0);
        assert!((left.x + 10.0).abs() < EPS);
        assert!(left.y.abs() < EPS);
    }
}
