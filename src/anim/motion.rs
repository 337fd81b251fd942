use super::easing::Easing;
use std::time::Duration;

const SPRING_STEP: f64 = 0.001;
const SPRING_POSITION_THRESHOLD: f64 = 0.001;
const SPRING_VELOCITY_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn new(to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            to,
            duration,
            easing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub to: f64,
    pub stiffness: f64,
    pub damping_ratio: f64,
}

impl Spring {
    pub fn new(to: f64, stiffness: f64, damping_ratio: f64) -> Self {
        Self {
            to,
            stiffness,
            damping_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Tween(Tween),
    Spring(Spring),
}

impl Motion {
    pub fn target(&self) -> f64 {
        match self {
            Self::Tween(t) => t.to,
            Self::Spring(s) => s.to,
        }
    }
}

impl From<Tween> for Motion {
    fn from(t: Tween) -> Self {
        Self::Tween(t)
    }
}

impl From<Spring> for Motion {
    fn from(s: Spring) -> Self {
        Self::Spring(s)
    }
}

#[derive(Debug, Clone, Copy)]
struct Running {
    motion: Motion,
    from: f64,
    elapsed: Duration,
}

/// A scalar driven by at most one motion at a time. Starting a new motion interrupts the
/// current one and continues from the current value (and velocity, for springs).
#[derive(Debug, Clone, Default)]
pub struct AnimatedValue {
    value: f64,
    velocity: f64,
    running: Option<Running>,
}

impl AnimatedValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
            running: None,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn target(&self) -> f64 {
        self.running
            .map(|r| r.motion.target())
            .unwrap_or(self.value)
    }

    pub fn snap_to(&mut self, value: f64) {
        self.value = value;
        self.velocity = 0.0;
        self.running = None;
    }

    /// Stops the motion in place.
    pub fn stop(&mut self) {
        self.running = None;
        self.velocity = 0.0;
    }

    pub fn start(&mut self, motion: impl Into<Motion>) {
        let motion = motion.into();
        if let Motion::Tween(_) = motion {
            self.velocity = 0.0;
        }
        self.running = Some(Running {
            motion,
            from: self.value,
            elapsed: Duration::ZERO,
        });
    }

    /// Moves the running motion forward. Returns the unused part of `dt` when the motion
    /// finished during this call, `None` while it is still going (or nothing was running).
    pub fn advance(&mut self, dt: Duration) -> Option<Duration> {
        let mut running = self.running?;

        let leftover = match running.motion {
            Motion::Tween(tween) => {
                running.elapsed += dt;
                if running.elapsed >= tween.duration {
                    self.value = tween.to;
                    Some(running.elapsed - tween.duration)
                } else {
                    let t = tween
                        .easing
                        .apply(running.elapsed.as_secs_f64() / tween.duration.as_secs_f64());
                    self.value = running.from + (tween.to - running.from) * t;
                    None
                }
            }
            Motion::Spring(spring) => self
                .integrate_spring(&spring, dt.as_secs_f64())
                .map(|rest| Duration::from_secs_f64(rest.max(0.0))),
        };

        match leftover {
            Some(rest) => {
                self.running = None;
                self.velocity = 0.0;
                Some(rest)
            }
            None => {
                self.running = Some(running);
                None
            }
        }
    }

    fn integrate_spring(&mut self, spring: &Spring, dt: f64) -> Option<f64> {
        let damping = 2.0 * spring.damping_ratio * spring.stiffness.sqrt();
        let mut remaining = dt;

        while remaining > 0.0 {
            let h = remaining.min(SPRING_STEP);
            let accel = -spring.stiffness * (self.value - spring.to) - damping * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;

            if !self.value.is_finite() || !self.velocity.is_finite() {
                log::warn!("Spring to {} diverged, snapping to target", spring.to);
                self.value = spring.to;
                return Some(remaining.max(0.0));
            }
            if (self.value - spring.to).abs() < SPRING_POSITION_THRESHOLD
                && self.velocity.abs() < SPRING_VELOCITY_THRESHOLD
            {
                self.value = spring.to;
                return Some(remaining);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tween_reaches_target_with_leftover() {
        let mut v = AnimatedValue::new(0.0);
        v.start(Tween::new(1.0, ms(100), Easing::Linear));

        assert_eq!(v.advance(ms(40)), None);
        assert!((v.value() - 0.4).abs() < 1e-9);

        let rest = v.advance(ms(80)).unwrap();
        assert_eq!(v.value(), 1.0);
        assert!(!v.is_running());
        assert_eq!(rest, ms(20));
    }

    #[test]
    fn test_interrupt_continues_from_current_value() {
        let mut v = AnimatedValue::new(0.0);
        v.start(Tween::new(1.0, ms(100), Easing::Linear));
        v.advance(ms(50));

        v.start(Tween::new(0.0, ms(100), Easing::Linear));
        v.advance(ms(50));
        assert!((v.value() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_spring_overshoots_and_settles() {
        let mut v = AnimatedValue::new(0.0);
        v.start(Spring::new(1.0, 1500.0, 0.5));

        let mut peak: f64 = 0.0;
        let mut settled = false;
        for _ in 0..200 {
            if v.advance(ms(16)).is_some() {
                settled = true;
                break;
            }
            peak = peak.max(v.value());
        }
        assert!(settled);
        assert!(peak > 1.0);
        assert_eq!(v.value(), 1.0);
    }

    #[test]
    fn test_unstable_spring_ends_at_target() {
        let mut v = AnimatedValue::new(0.0);
        v.start(Spring::new(1.0, 1500.0, 40.0));

        let mut settled = false;
        for _ in 0..200 {
            if v.advance(ms(16)).is_some() {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(v.value(), 1.0);
        assert!(!v.is_running());
    }

    #[test]
    fn test_advance_idle_value_is_noop() {
        let mut v = AnimatedValue::new(0.3);
        assert_eq!(v.advance(ms(16)), None);
        assert_eq!(v.value(), 0.3);
        assert_eq!(v.target(), 0.3);
    }
}
