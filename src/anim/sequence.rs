use super::motion::{AnimatedValue, Motion};
use std::collections::VecDeque;
use std::time::Duration;

/// Addresses one animated value of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Primary(usize),
    Secondary(usize),
    Bulge(usize),
    Overlay,
}

pub trait Channels {
    fn channel_mut(&mut self, channel: Channel) -> Option<&mut AnimatedValue>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Wait(Duration),
    Animate(Channel, Motion),
}

#[derive(Debug, Clone, Copy)]
enum Current {
    Waiting(Duration),
    Animating(Channel),
}

/// Steps executed one after the other.
#[derive(Debug, Clone, Default)]
pub struct Track {
    steps: VecDeque<Step>,
    current: Option<Current>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(mut self, d: Duration) -> Self {
        if !d.is_zero() {
            self.steps.push_back(Step::Wait(d));
        }
        self
    }

    pub fn animate(mut self, channel: Channel, motion: impl Into<Motion>) -> Self {
        self.steps
            .push_back(Step::Animate(channel, motion.into()));
        self
    }

    pub fn then(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.steps.is_empty()
    }

    fn advance(&mut self, mut dt: Duration, values: &mut impl Channels) -> Option<Duration> {
        loop {
            let current = match self.current {
                Some(c) => c,
                None => match self.steps.pop_front() {
                    None => return Some(dt),
                    Some(Step::Wait(d)) => Current::Waiting(d),
                    Some(Step::Animate(channel, motion)) => match values.channel_mut(channel) {
                        Some(value) => {
                            value.start(motion);
                            Current::Animating(channel)
                        }
                        None => {
                            log::warn!("Skipping animation on missing channel {channel:?}");
                            continue;
                        }
                    },
                },
            };

            match current {
                Current::Waiting(rest) if dt >= rest => {
                    dt -= rest;
                    self.current = None;
                }
                Current::Waiting(rest) => {
                    self.current = Some(Current::Waiting(rest - dt));
                    return None;
                }
                Current::Animating(channel) => {
                    // a value stopped from outside ends its step
                    let leftover = match values.channel_mut(channel) {
                        Some(v) if v.is_running() => v.advance(dt),
                        _ => Some(dt),
                    };
                    match leftover {
                        Some(left) => {
                            dt = left;
                            self.current = None;
                        }
                        None => {
                            self.current = Some(current);
                            return None;
                        }
                    }
                }
            }
        }
    }
}

/// Tracks that run side by side. A phase ends once all of its tracks are done.
#[derive(Debug, Clone, Default)]
pub struct Phase {
    tracks: Vec<Track>,
}

impl Phase {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    fn advance(&mut self, dt: Duration, values: &mut impl Channels) -> Option<Duration> {
        let mut leftover: Option<Duration> = Some(dt);
        for track in self.tracks.iter_mut().filter(|t| !t.is_finished()) {
            leftover = match (leftover, track.advance(dt, values)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                _ => None,
            };
        }
        leftover
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sequence {
    phases: VecDeque<Phase>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phases.push_back(phase);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.phases.is_empty()
    }

    /// Runs the sequence for `dt`, carrying time left over by a finished phase into the next.
    pub fn advance(&mut self, mut dt: Duration, values: &mut impl Channels) {
        while let Some(phase) = self.phases.front_mut() {
            match phase.advance(dt, values) {
                Some(left) => {
                    self.phases.pop_front();
                    dt = left;
                }
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{Easing, Tween};

    #[derive(Default)]
    struct Pair {
        a: AnimatedValue,
        b: AnimatedValue,
    }

    impl Channels for Pair {
        fn channel_mut(&mut self, channel: Channel) -> Option<&mut AnimatedValue> {
            match channel {
                Channel::Primary(0) => Some(&mut self.a),
                Channel::Primary(1) => Some(&mut self.b),
                _ => None,
            }
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn linear(to: f64, d: u64) -> Tween {
        Tween::new(to, ms(d), Easing::Linear)
    }

    #[test]
    fn test_wait_then_animate() {
        let mut values = Pair::default();
        let mut seq = Sequence::new().phase(Phase::new(vec![
            Track::new().wait(ms(100)).animate(Channel::Primary(0), linear(1.0, 100)),
        ]));

        seq.advance(ms(90), &mut values);
        assert_eq!(values.a.value(), 0.0);

        seq.advance(ms(60), &mut values);
        assert!((values.a.value() - 0.5).abs() < 1e-9);

        seq.advance(ms(60), &mut values);
        assert_eq!(values.a.value(), 1.0);
        assert!(seq.is_finished());
    }

    #[test]
    fn test_phase_waits_for_slowest_track() {
        let mut values = Pair::default();
        let mut seq = Sequence::new()
            .phase(Phase::new(vec![
                Track::new().animate(Channel::Primary(0), linear(1.0, 50)),
                Track::new().wait(ms(100)),
            ]))
            .phase(Phase::new(vec![
                Track::new().animate(Channel::Primary(1), linear(1.0, 100)),
            ]));

        seq.advance(ms(80), &mut values);
        assert_eq!(values.a.value(), 1.0);
        assert_eq!(values.b.value(), 0.0);

        // 20ms finish the first phase, 30ms carry into the second
        seq.advance(ms(50), &mut values);
        assert!((values.b.value() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_missing_channel_is_skipped() {
        let mut values = Pair::default();
        let mut seq = Sequence::new().phase(Phase::new(vec![
            Track::new()
                .animate(Channel::Overlay, linear(1.0, 50))
                .animate(Channel::Primary(0), linear(1.0, 50)),
        ]));
        seq.advance(ms(60), &mut values);
        assert!(seq.is_finished());
        assert_eq!(values.a.value(), 1.0);
    }
}
