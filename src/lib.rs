//! Animated "jelly" floating action button menu: arc placement, blob outline
//! deformation and the staggered expand/collapse choreography, independent of
//! any UI toolkit. The host feeds frame deltas to [`JellyFab::tick`] and draws
//! the [`Scene`] it gets back.

pub mod macros;

pub mod anim;
pub mod choreography;
pub mod dispatch;
pub mod engine;
pub mod geometry;
pub mod options;
pub mod outline;
pub mod scene;
pub mod state;
pub mod widget;

pub use dispatch::{Command, TapTarget};
pub use engine::{Effect, Engine, Glyph};
pub use geometry::Point;
pub use options::{FabOptions, HexColor};
pub use scene::{ButtonSprite, FabLayout, Scene};
pub use state::{FabState, MenuPhase};
pub use widget::{FabSpec, IconRef, JellyFab, MenuItem};
