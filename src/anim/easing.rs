use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};

/// Easing curves usable by tweens. Named curves can be picked from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Default, StrumDisplay, EnumString, DeserializeFromStr)]
#[strum(ascii_case_insensitive)]
pub enum Easing {
    Linear,
    #[default]
    #[strum(serialize = "FastOutSlowIn", serialize = "standard")]
    FastOutSlowIn,
    #[strum(serialize = "LinearOutSlowIn", serialize = "decelerate")]
    LinearOutSlowIn,
    #[strum(serialize = "FastOutLinearIn", serialize = "accelerate")]
    FastOutLinearIn,
    EaseInOutCubic,
    #[strum(disabled)]
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::FastOutSlowIn => cubic_bezier(t, 0.4, 0.0, 0.2, 1.0),
            Self::LinearOutSlowIn => cubic_bezier(t, 0.0, 0.0, 0.2, 1.0),
            Self::FastOutLinearIn => cubic_bezier(t, 0.4, 0.0, 1.0, 1.0),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, x1, y1, x2, y2),
        }
    }
}

/// CSS style cubic bezier: solve x(p) = t, return y(p).
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-9 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-9 {
            break;
        }
        p -= err / slope;
    }

    // bisection fallback when newton stalls on a flat slope
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = t;
    for _ in 0..30 {
        let x = bezier_sample(p, x1, x2);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }
    bezier_sample(p, y1, y2)
}

#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_exact() {
        for easing in [
            Easing::Linear,
            Easing::FastOutSlowIn,
            Easing::LinearOutSlowIn,
            Easing::FastOutLinearIn,
            Easing::EaseInOutCubic,
            Easing::CubicBezier(0.3, 0.1, 0.3, 1.0),
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-1.0), 0.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
    }

    #[test]
    fn test_standard_curve_is_monotonic() {
        let mut last = 0.0;
        for i in 1..=100 {
            let v = Easing::FastOutSlowIn.apply(i as f64 / 100.0);
            assert!(v >= last - 1e-9);
            last = v;
        }
        // front loaded
        assert!(Easing::FastOutSlowIn.apply(0.5) > 0.5);
    }

    #[test]
    fn test_easing_from_config_name() {
        let cases = vec![
            ("\"standard\"", Easing::FastOutSlowIn),
            ("\"fastoutslowin\"", Easing::FastOutSlowIn),
            ("\"Linear\"", Easing::Linear),
            ("\"decelerate\"", Easing::LinearOutSlowIn),
        ];
        for (json, expected) in cases {
            let easing: Easing = serde_json::from_str(json).unwrap();
            assert_eq!(easing, expected);
        }
    }
}
