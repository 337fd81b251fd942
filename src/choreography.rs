//! The concrete animation sequences of the menu, built from [`crate::anim`] primitives.

use crate::anim::{Channel, Easing, Phase, Sequence, Step, Track, Tween};
use crate::options::{FabOptions, SECONDARY_COLLAPSE_DURATION};
use std::time::Duration;

pub const SECONDARY_OVERSHOOT: f64 = 1.06;
pub const COLLAPSE_PULSE_PEAK: f64 = 0.3;
const DOUBLE_BOUNCE: [f64; 4] = [0.7, -0.3, 0.1, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceDirection {
    Outward,
    Inward,
}

impl BounceDirection {
    fn sign(self) -> f64 {
        match self {
            Self::Outward => 1.0,
            Self::Inward => -1.0,
        }
    }
}

fn stagger(step: Duration, index: usize) -> Duration {
    step * index as u32
}

/// Decaying wobble `+0.7 -> -0.3 -> +0.1 -> 0`, scaled and optionally flipped.
pub fn double_bounce(
    channel: Channel,
    options: &FabOptions,
    scale: f64,
    direction: BounceDirection,
) -> Vec<Step> {
    DOUBLE_BOUNCE
        .iter()
        .map(|&v| {
            Step::Animate(
                channel,
                Tween::new(
                    v * scale * direction.sign(),
                    options.bounce_leg,
                    Easing::EaseInOutCubic,
                )
                .into(),
            )
        })
        .collect()
}

pub fn primary_expand(count: usize, options: &FabOptions) -> Sequence {
    let mut phase = Phase::default();

    for i in 0..count {
        let delay = stagger(options.expand_stagger, i);
        phase.push(Track::new().wait(delay).animate(
            Channel::Primary(i),
            Tween::new(1.0, options.progress_duration, options.easing),
        ));

        let mut bulge = Track::new()
            .wait(delay)
            .animate(
                Channel::Bulge(i),
                Tween::new(options.pulse_peak, options.pulse_rise, Easing::LinearOutSlowIn),
            )
            .animate(Channel::Bulge(i), options.spring_to(0.0));
        if i + 1 == count {
            bulge = bulge.then(double_bounce(
                Channel::Bulge(i),
                options,
                1.0,
                BounceDirection::Outward,
            ));
        }
        phase.push(bulge);
    }

    Sequence::new().phase(phase)
}

pub fn primary_collapse(count: usize, options: &FabOptions) -> Sequence {
    let mut fold = Phase::default();
    for i in 0..count {
        let delay = stagger(options.collapse_stagger, i);
        fold.push(
            Track::new()
                .wait(delay)
                .animate(
                    Channel::Bulge(i),
                    Tween::new(COLLAPSE_PULSE_PEAK, options.collapse_pulse, Easing::Linear),
                )
                .animate(
                    Channel::Bulge(i),
                    Tween::new(0.0, options.collapse_pulse, Easing::Linear),
                ),
        );
        fold.push(Track::new().wait(delay).animate(
            Channel::Primary(i),
            Tween::new(0.0, options.progress_duration, options.easing),
        ));
    }

    let mut settle = Phase::default();
    if count >= 2 {
        settle.push(Track::new().then(double_bounce(
            Channel::Bulge(0),
            options,
            options.soft_bounce_scale,
            BounceDirection::Inward,
        )));
    }
    if count >= 1 {
        let last = Channel::Bulge(count - 1);
        settle.push(Track::new().wait(options.bounce_offset).then(double_bounce(
            last,
            options,
            1.0,
            BounceDirection::Inward,
        )));
    }

    Sequence::new().phase(fold).phase(settle)
}

pub fn secondary_expand(count: usize, options: &FabOptions) -> Sequence {
    let tracks = (0..count)
        .map(|i| {
            Track::new()
                .wait(stagger(options.secondary_stagger, i))
                .animate(
                    Channel::Secondary(i),
                    Tween::new(SECONDARY_OVERSHOOT, options.overshoot_duration, options.easing),
                )
                .animate(Channel::Secondary(i), options.spring_to(1.0))
        })
        .collect();
    Sequence::new().phase(Phase::new(tracks))
}

/// Folds the secondary layer back, last item first.
pub fn secondary_collapse(count: usize, options: &FabOptions) -> Sequence {
    let tracks = (0..count)
        .rev()
        .map(|i| {
            Track::new()
                .wait(stagger(options.secondary_stagger, count - 1 - i))
                .animate(
                    Channel::Secondary(i),
                    Tween::new(0.0, SECONDARY_COLLAPSE_DURATION, options.easing),
                )
        })
        .collect();
    Sequence::new().phase(Phase::new(tracks))
}

/// How long [`secondary_collapse`] takes for `count` items.
pub fn secondary_collapse_total(count: usize, secondary_stagger: Duration) -> Duration {
    match count {
        0 => Duration::ZERO,
        n => stagger(secondary_stagger, n - 1) + SECONDARY_COLLAPSE_DURATION,
    }
}

pub fn overlay_fade(visible: bool, options: &FabOptions) -> Sequence {
    let target = if visible { 1.0 } else { 0.0 };
    Sequence::new().phase(Phase::new(vec![Track::new().animate(
        Channel::Overlay,
        Tween::new(target, options.overlay_fade, Easing::Linear),
    )]))
}
