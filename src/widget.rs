use crate::dispatch::{Command, TapTarget};
use crate::engine::{Effect, Engine};
use crate::geometry::Point;
use crate::options::{FabOptions, HexColor};
use crate::scene::{FabLayout, Scene};
use crate::state::FabState;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Icon name or path, resolved by the host.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconRef(String);

crate::impl_string_newtype!(IconRef);

pub type Action = Box<dyn FnMut()>;

pub struct MenuItem {
    pub icon: IconRef,
    action: Action,
}

impl MenuItem {
    pub fn new(icon: impl Into<String>, action: impl FnMut() + 'static) -> Self {
        Self {
            icon: IconRef::new(icon),
            action: Box::new(action),
        }
    }

    pub fn invoke(&mut self) {
        (self.action)();
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Everything needed to construct one menu.
#[derive(Debug)]
pub struct FabSpec {
    pub main_diameter: f64,
    pub item_diameter: f64,
    pub main_color: HexColor,
    pub item_color: HexColor,
    pub primary: Vec<MenuItem>,
    pub secondary: Vec<MenuItem>,
    pub show_overlay: bool,
    pub options: FabOptions,
    pub state: FabState,
}

impl Default for FabSpec {
    fn default() -> Self {
        Self {
            main_diameter: 56.0,
            item_diameter: 40.0,
            main_color: HexColor::new(0.38, 0.0, 0.93, 1.0),
            item_color: HexColor::new(0.01, 0.85, 0.77, 1.0),
            primary: Vec::new(),
            secondary: Vec::new(),
            show_overlay: true,
            options: FabOptions::default(),
            state: FabState::default(),
        }
    }
}

/// A jelly FAB menu: items, their actions and the animation engine.
pub struct JellyFab {
    pub main_diameter: f64,
    pub item_diameter: f64,
    pub main_color: HexColor,
    pub item_color: HexColor,
    pub show_overlay: bool,
    primary: Vec<MenuItem>,
    secondary: Vec<MenuItem>,
    engine: Engine,
}

impl JellyFab {
    pub fn new(spec: FabSpec) -> Self {
        let engine = Engine::mount(
            spec.options.sanitized(),
            spec.primary.len(),
            spec.secondary.len(),
            spec.state,
        );
        log::debug!(
            "Mounted menu with {} primary and {} secondary items",
            spec.primary.len(),
            spec.secondary.len()
        );

        Self {
            main_diameter: spec.main_diameter,
            item_diameter: spec.item_diameter,
            main_color: spec.main_color,
            item_color: spec.item_color,
            show_overlay: spec.show_overlay,
            primary: spec.primary,
            secondary: spec.secondary,
            engine,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> FabState {
        self.engine.state()
    }

    /// The flags the menu is heading towards; see [`Engine::requested_state`].
    pub fn requested_state(&self) -> FabState {
        self.engine.requested_state()
    }

    /// Applies a host write of both flags. Each flag that differs from where the menu is
    /// heading is set, so the last write wins over an in-flight compound close.
    pub fn sync_state(&mut self, wanted: FabState) {
        let requested = self.requested_state();
        if wanted.expanded() != requested.expanded() {
            self.engine.set_expanded(wanted.expanded());
        }
        if wanted.secondary_expanded() != self.state().secondary_expanded() {
            self.engine.set_secondary_expanded(wanted.secondary_expanded());
        }
    }

    pub fn primary_items(&self) -> &[MenuItem] {
        &self.primary
    }

    pub fn secondary_items(&self) -> &[MenuItem] {
        &self.secondary
    }

    pub fn layout(&self, center: Point) -> FabLayout {
        FabLayout::new(center, self.main_diameter, self.item_diameter)
    }

    pub fn scene(&self, center: Point) -> Scene {
        Scene::build(&self.engine, &self.layout(center), self.show_overlay)
    }

    pub fn is_animating(&self) -> bool {
        self.engine.is_animating()
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.engine.set_expanded(expanded);
    }

    pub fn set_secondary_expanded(&mut self, open: bool) {
        self.engine.set_secondary_expanded(open);
    }

    pub fn tap(&mut self, target: TapTarget) -> Command {
        if target == TapTarget::Overlay && !self.show_overlay {
            return Command::Ignore;
        }
        self.engine.tap(target)
    }

    pub fn apply(&mut self, command: Command) {
        self.engine.apply(command);
    }

    /// Taps whatever is drawn at `p`, if anything.
    pub fn tap_at(&mut self, center: Point, p: Point) -> Command {
        match self.scene(center).hit_test(p) {
            Some(target) => self.tap(target),
            None => Command::Ignore,
        }
    }

    /// Advances the animations and runs due item actions. Returns the new flags when they
    /// changed on their own (a deferred collapse).
    pub fn tick(&mut self, dt: Duration) -> Option<FabState> {
        let mut changed = None;
        for effect in self.engine.tick(dt) {
            match effect {
                Effect::Invoke(index) => match self.secondary.get_mut(index) {
                    Some(item) => {
                        log::debug!("Running action of secondary item {index} ({})", item.icon);
                        item.invoke();
                    }
                    None => log::warn!("No secondary item at index {index}"),
                },
                Effect::StateChanged(state) => changed = Some(state),
            }
        }
        changed
    }
}
