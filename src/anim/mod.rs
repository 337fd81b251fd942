//! Frame driven value animation: easing curves, tween/spring motions and
//! phase-ordered sequences of staggered tracks.

pub mod easing;
pub mod motion;
pub mod sequence;

pub use easing::Easing;
pub use motion::{AnimatedValue, Motion, Spring, Tween};
pub use sequence::{Channel, Channels, Phase, Sequence, Step, Track};
