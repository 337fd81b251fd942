use crate::anim::{Easing, Spring};
use crate::geometry::{PRIMARY_END_DEG, PRIMARY_START_DEG};
use derive_more::{Deref, From, Into};
use palette::Srgba;
use serde::Deserialize;
use serde_with::{DeserializeFromStr, DurationMilliSeconds, serde_as};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const SECONDARY_COLLAPSE_DURATION: Duration = Duration::from_millis(200);

/// Timing, shadow and spacing knobs of one menu instance.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FabOptions {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub expand_stagger: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub collapse_stagger: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub secondary_stagger: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub progress_duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub pulse_rise: Duration,
    pub pulse_peak: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub bounce_leg: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub collapse_pulse: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub bounce_offset: Duration,
    pub soft_bounce_scale: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub overshoot_duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub overlay_fade: Duration,
    pub easing: Easing,
    pub spring_stiffness: f64,
    pub spring_damping_ratio: f64,

    pub bounce_factor: f64,
    pub shadow_base_opacity: f64,
    pub shadow_opacity_gain: f64,
    pub shadow_base_blur: f64,
    pub shadow_blur_gain: f64,
    pub shadow_base_offset: f64,
    pub shadow_lift: f64,

    pub base_arc_radius: f64,
    pub secondary_spacing: f64,
    pub primary_start_deg: f64,
    pub primary_end_deg: f64,
    pub secondary_start_deg: f64,
    pub secondary_end_deg: f64,
}

impl Default for FabOptions {
    fn default() -> Self {
        Self {
            expand_stagger: Duration::from_millis(60),
            collapse_stagger: Duration::from_millis(40),
            secondary_stagger: Duration::from_millis(80),
            progress_duration: Duration::from_millis(380),
            pulse_rise: Duration::from_millis(120),
            pulse_peak: 1.0,
            bounce_leg: Duration::from_millis(110),
            collapse_pulse: Duration::from_millis(90),
            bounce_offset: Duration::from_millis(60),
            soft_bounce_scale: 0.5,
            overshoot_duration: Duration::from_millis(160),
            overlay_fade: Duration::from_millis(250),
            easing: Easing::FastOutSlowIn,
            spring_stiffness: 1500.0,
            spring_damping_ratio: 0.5,

            bounce_factor: 0.18,
            shadow_base_opacity: 0.28,
            shadow_opacity_gain: 0.25,
            shadow_base_blur: 8.0,
            shadow_blur_gain: 10.0,
            shadow_base_offset: 4.0,
            shadow_lift: 6.0,

            base_arc_radius: 120.0,
            secondary_spacing: 0.75,
            primary_start_deg: PRIMARY_START_DEG,
            primary_end_deg: PRIMARY_END_DEG,
            secondary_start_deg: 180.0,
            secondary_end_deg: 90.0,
        }
    }
}

const MAX_SPRING_STIFFNESS: f64 = 100_000.0;
const MIN_DAMPING_RATIO: f64 = 0.05;
const MAX_DAMPING_RATIO: f64 = 2.0;

impl FabOptions {
    pub fn spring_to(&self, to: f64) -> Spring {
        Spring::new(to, self.spring_stiffness, self.spring_damping_ratio)
    }

    /// Clamps values that would break the animation math (negative radii, a spring
    /// without stiffness) back to usable ranges.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.spring_stiffness.is_nan() || self.spring_stiffness <= 0.0 {
            log::warn!(
                "spring_stiffness {} is not positive, using {}",
                self.spring_stiffness,
                defaults.spring_stiffness
            );
            self.spring_stiffness = defaults.spring_stiffness;
        }
        // keeps the 1ms spring integration stable
        self.spring_stiffness = self.spring_stiffness.min(MAX_SPRING_STIFFNESS);
        if self.spring_damping_ratio.is_nan() {
            self.spring_damping_ratio = defaults.spring_damping_ratio;
        }
        let damping = self
            .spring_damping_ratio
            .clamp(MIN_DAMPING_RATIO, MAX_DAMPING_RATIO);
        if damping != self.spring_damping_ratio {
            log::warn!(
                "spring_damping_ratio {} is out of range, using {}",
                self.spring_damping_ratio,
                damping
            );
            self.spring_damping_ratio = damping;
        }
        self.base_arc_radius = self.base_arc_radius.max(0.0);
        self.secondary_spacing = self.secondary_spacing.max(0.0);
        self.bounce_factor = self.bounce_factor.max(0.0);
        self.soft_bounce_scale = self.soft_bounce_scale.clamp(0.0, 1.0);
        self.shadow_base_opacity = self.shadow_base_opacity.clamp(0.0, 1.0);
        self.shadow_base_blur = self.shadow_base_blur.max(0.0);
        self
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid color '{0}', expected #rrggbb or #rrggbbaa")]
    Invalid(String),
}

/// An sRGB color read from `#rrggbb` / `#rrggbbaa` notation.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, DeserializeFromStr)]
pub struct HexColor(Srgba<f64>);

impl HexColor {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self(Srgba::new(r, g, b, a))
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        let (r, g, b, a) = self.0.into_components();
        Self::new(r, g, b, a * alpha.clamp(0.0, 1.0))
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorError::Invalid(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| invalid())
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}
