use crate::gui::theme::ThemeColors;
use crate::icon::IconCache;
use gtk::prelude::*;
use gtk4 as gtk;
use jellyfab::{Command, FabState, JellyFab, Point};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub mod view;

pub use view::draw;

pub const GLYPH_FONT_SIZE: f64 = 18.0; // at a 20px button radius
pub const ICON_FILL: f64 = 0.6; // icon width relative to the button
pub const SHADOW_LAYERS: usize = 4;

/// Center of the main button, pinned to the top-right corner so the default arcs fan into the
/// window.
pub fn fab_center(width: f64, height: f64, main_diameter: f64, margin: f64) -> Point {
    let r = main_diameter / 2.0;
    let x = (width - margin - r).max(r);
    let y = (margin + r).min(height - r).max(r);
    Point::new(x, y)
}

/// Ties a menu to a drawing area: redraws, frame-clock ticks and the host-owned flags.
#[derive(Clone)]
pub struct FabCanvas {
    fab: Rc<RefCell<JellyFab>>,
    handle: Rc<Cell<FabState>>,
    area: gtk::DrawingArea,
    icons: Rc<RefCell<IconCache>>,
    ticking: Rc<Cell<bool>>,
    margin: Rc<Cell<f64>>,
}

impl FabCanvas {
    pub fn new(fab: JellyFab, area: gtk::DrawingArea, margin: f64) -> Self {
        let handle = Rc::new(Cell::new(fab.requested_state()));
        let icons = IconCache::load(
            fab.primary_items()
                .iter()
                .chain(fab.secondary_items())
                .map(|item| &item.icon),
        );
        let canvas = Self {
            fab: Rc::new(RefCell::new(fab)),
            handle,
            area,
            icons: Rc::new(RefCell::new(icons)),
            ticking: Rc::new(Cell::new(false)),
            margin: Rc::new(Cell::new(margin)),
        };
        canvas.install_draw();
        canvas
    }

    /// The flags as the host sees them. Writing to the cell and calling [`Self::sync`] drives
    /// the menu from outside.
    pub fn handle(&self) -> Rc<Cell<FabState>> {
        self.handle.clone()
    }

    fn install_draw(&self) {
        let fab = self.fab.clone();
        let icons = self.icons.clone();
        let margin = self.margin.clone();
        self.area.set_draw_func(move |area, cr, width, height| {
            let colors = ThemeColors::from_context(&area.style_context());
            let fab = fab.borrow();
            let (w, h) = (width as f64, height as f64);
            let center = fab_center(w, h, fab.main_diameter, margin.get());
            let scene = fab.scene(center);
            if let Err(e) = draw(cr, &fab, &scene, &colors, &icons.borrow(), (w, h)) {
                log::error!("Drawing error: {}", e);
            }
        });
    }

    fn center(&self) -> Point {
        fab_center(
            self.area.width() as f64,
            self.area.height() as f64,
            self.fab.borrow().main_diameter,
            self.margin.get(),
        )
    }

    /// Routes a pointer press at `p` through the menu.
    pub fn click(&self, p: Point) -> Command {
        self.sync();
        let center = self.center();
        let command = self.fab.borrow_mut().tap_at(center, p);
        log::debug!("Tap at ({:.0}, {:.0}) -> {:?}", p.x, p.y, command);
        self.handle.set(self.fab.borrow().requested_state());
        self.animate();
        command
    }

    /// Runs an already resolved command, e.g. from the keyboard.
    pub fn apply(&self, command: Command) {
        self.sync();
        self.fab.borrow_mut().apply(command);
        self.handle.set(self.fab.borrow().requested_state());
        self.animate();
    }

    /// Picks up flag changes the host wrote into the handle.
    pub fn sync(&self) {
        let wanted = self.handle.get();
        let mut fab = self.fab.borrow_mut();
        if wanted == fab.requested_state() {
            return;
        }
        fab.sync_state(wanted);
        self.handle.set(fab.requested_state());
        drop(fab);
        self.animate();
    }

    /// Swaps in a rebuilt menu, e.g. after a config reload.
    pub fn replace(&self, fab: JellyFab, margin: f64) {
        let icons = IconCache::load(
            fab.primary_items()
                .iter()
                .chain(fab.secondary_items())
                .map(|item| &item.icon),
        );
        self.handle.set(fab.requested_state());
        *self.icons.borrow_mut() = icons;
        *self.fab.borrow_mut() = fab;
        self.margin.set(margin);
        self.area.queue_draw();
    }

    fn animate(&self) {
        self.area.queue_draw();
        if self.ticking.get() || !self.fab.borrow().is_animating() {
            return;
        }
        self.ticking.set(true);

        let fab = self.fab.clone();
        let handle = self.handle.clone();
        let ticking = self.ticking.clone();
        let last_frame = Cell::new(None::<i64>);
        self.area.add_tick_callback(move |area, clock| {
            let now = clock.frame_time();
            let dt = last_frame
                .replace(Some(now))
                .map(|prev| Duration::from_micros(now.saturating_sub(prev).max(0) as u64))
                .unwrap_or_default();

            let mut fab = fab.borrow_mut();
            if let Some(state) = fab.tick(dt) {
                handle.set(state);
            }
            area.queue_draw();

            if fab.is_animating() {
                glib::ControlFlow::Continue
            } else {
                ticking.set(false);
                glib::ControlFlow::Break
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fab_center_top_right() {
        let c = fab_center(800.0, 600.0, 56.0, 24.0);
        assert_eq!(c, Point::new(800.0 - 24.0 - 28.0, 24.0 + 28.0));
    }

    #[test]
    fn test_fab_center_tiny_window_stays_inside() {
        let c = fab_center(20.0, 20.0, 56.0, 24.0);
        assert_eq!(c, Point::new(28.0, 28.0));
    }
}
