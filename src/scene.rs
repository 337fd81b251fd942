use crate::dispatch::TapTarget;
use crate::engine::{Engine, Glyph};
use crate::geometry::{Point, arc_offset, even_arc_angles, lerp_point};
use crate::outline::{self, BlobPath, Bulge, Shadow};

/// Where the menu sits and how big its buttons are, in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FabLayout {
    pub center: Point,
    pub main_diameter: f64,
    pub item_diameter: f64,
}

impl FabLayout {
    pub fn new(center: Point, main_diameter: f64, item_diameter: f64) -> Self {
        Self {
            center,
            main_diameter,
            item_diameter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonSprite {
    pub center: Point,
    pub radius: f64,
    pub alpha: f64,
    pub visible: bool,
}

impl ButtonSprite {
    fn contains(&self, p: Point) -> bool {
        self.visible && self.alpha > 0.0 && p.distance(self.center) <= self.radius
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub overlay_alpha: f64,
    pub blob: BlobPath,
    pub shadow: Shadow,
    pub main: ButtonSprite,
    pub primary: Vec<ButtonSprite>,
    pub secondary: Vec<ButtonSprite>,
    pub anchor_glyph: Option<Glyph>,
}

impl Scene {
    pub fn build(engine: &Engine, layout: &FabLayout, overlay_enabled: bool) -> Self {
        let options = engine.options();
        let item_radius = layout.item_diameter / 2.0;
        let main_radius = layout.main_diameter / 2.0;

        let primary_angles = even_arc_angles(
            engine.primary_count(),
            options.primary_start_deg,
            options.primary_end_deg,
        );

        let primary: Vec<ButtonSprite> = primary_angles
            .iter()
            .enumerate()
            .map(|(i, &angle)| {
                let progress = engine.primary_progress(i);
                ButtonSprite {
                    center: layout
                        .center
                        .offset(arc_offset(angle, options.base_arc_radius * progress)),
                    radius: item_radius,
                    alpha: progress.clamp(0.0, 1.0),
                    visible: progress > 0.0,
                }
            })
            .collect();

        let anchor = primary.first().map(|s| s.center).unwrap_or(layout.center);
        let secondary = secondary_chain(engine, anchor, item_radius);

        let bulges: Vec<Bulge> = primary_angles
            .iter()
            .enumerate()
            .map(|(i, &angle)| Bulge::from_degrees(angle, engine.bulge(i)))
            .collect();

        Self {
            overlay_alpha: if overlay_enabled {
                engine.overlay_alpha()
            } else {
                0.0
            },
            blob: outline::blob_path(layout.center, main_radius, options.bounce_factor, &bulges),
            shadow: Shadow::from_bulges(&bulges, options),
            main: ButtonSprite {
                center: layout.center,
                radius: main_radius,
                alpha: 1.0,
                visible: true,
            },
            primary,
            secondary,
            anchor_glyph: (engine.secondary_count() > 0).then(|| engine.glyph()),
        }
    }

    /// Resolves a point to the top-most thing drawn there.
    pub fn hit_test(&self, p: Point) -> Option<TapTarget> {
        if let Some(i) = self.secondary.iter().rposition(|s| s.contains(p)) {
            return Some(TapTarget::Secondary(i));
        }
        if let Some(i) = self.primary.iter().rposition(|s| s.contains(p)) {
            return Some(TapTarget::Primary(i));
        }
        if self.main.contains(p) {
            return Some(TapTarget::MainButton);
        }
        (self.overlay_alpha > 0.0).then_some(TapTarget::Overlay)
    }
}

/// Each secondary item unfurls from the previous one (the anchor for the first) towards
/// its own spot on the secondary arc.
fn secondary_chain(engine: &Engine, anchor: Point, radius: f64) -> Vec<ButtonSprite> {
    let options = engine.options();
    let spacing = options.base_arc_radius * options.secondary_spacing;
    let angles = even_arc_angles(
        engine.secondary_count(),
        options.secondary_start_deg,
        options.secondary_end_deg,
    );

    let mut prev = anchor;
    angles
        .iter()
        .enumerate()
        .map(|(i, &angle)| {
            let progress = engine.secondary_progress(i);
            let target = anchor.offset(arc_offset(angle, spacing));
            let center = lerp_point(prev, target, progress);
            prev = center;
            ButtonSprite {
                center,
                radius,
                alpha: progress.clamp(0.0, 1.0),
                visible: progress != 0.0 || engine.secondary_in_motion(i),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FabOptions;
    use crate::state::FabState;
    use std::time::Duration;

    fn layout() -> FabLayout {
        FabLayout::new(Point::new(300.0, 300.0), 56.0, 40.0)
    }

    #[test]
    fn test_collapsed_scene_hides_items() {
        let engine = Engine::mount(FabOptions::default(), 3, 2, FabState::default());
        let scene = Scene::build(&engine, &layout(), true);

        assert!(scene.primary.iter().all(|s| !s.visible));
        assert!(scene.secondary.iter().all(|s| !s.visible));
        assert_eq!(scene.overlay_alpha, 0.0);
        assert_eq!(scene.anchor_glyph, Some(Glyph::Expand));
        assert_eq!(scene.hit_test(Point::new(300.0, 300.0)), Some(TapTarget::MainButton));
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_expanded_items_sit_on_the_arc() {
        let options = FabOptions::default();
        let engine = Engine::mount(options.clone(), 3, 0, FabState::new(true, false));
        let scene = Scene::build(&engine, &layout(), false);

        for sprite in &scene.primary {
            let d = sprite.center.distance(layout().center);
            assert!((d - options.base_arc_radius).abs() < 1e-9);
            assert_eq!(sprite.alpha, 1.0);
        }
        // first item straight down, last one to the left
        assert!((scene.primary[0].center.y - 420.0).abs() < 1e-9);
        assert!((scene.primary[2].center.x - 180.0).abs() < 1e-9);

        let hit = scene.hit_test(scene.primary[1].center);
        assert_eq!(hit, Some(TapTarget::Primary(1)));
        assert_eq!(scene.anchor_glyph, None);
    }

    #[test]
    fn test_secondary_chain_positions() {
        let options = FabOptions::default();
        let engine = Engine::mount(options.clone(), 2, 3, FabState::new(true, true));
        let scene = Scene::build(&engine, &layout(), true);

        let anchor = scene.primary[0].center;
        let spacing = options.base_arc_radius * options.secondary_spacing;
        for sprite in &scene.secondary {
            assert!((sprite.center.distance(anchor) - spacing).abs() < 1e-9);
            assert!(sprite.visible);
        }
        assert_eq!(
            scene.hit_test(scene.secondary[2].center),
            Some(TapTarget::Secondary(2))
        );
        assert_eq!(scene.hit_test(Point::new(5.0, 5.0)), Some(TapTarget::Overlay));
    }

    #[test]
    fn test_secondary_unfurls_from_anchor() {
        let mut engine = Engine::mount(FabOptions::default(), 2, 3, FabState::new(true, false));
        engine.set_secondary_expanded(true);
        engine.tick(Duration::from_millis(1));

        let scene = Scene::build(&engine, &layout(), true);
        let anchor = scene.primary[0].center;
        // the last item has not started yet and rides on its predecessor
        assert!(scene.secondary[2].center.distance(scene.secondary[1].center) < 1e-9);
        assert!(scene.secondary[0].center.distance(anchor) < 5.0);
        assert!(!scene.secondary[2].visible);
    }

    #[test]
    fn test_bulging_blob_changes_shadow() {
        let mut engine = Engine::mount(FabOptions::default(), 3, 0, FabState::default());
        let rest = Scene::build(&engine, &layout(), true);

        engine.set_expanded(true);
        engine.tick(Duration::from_millis(100));
        let moving = Scene::build(&engine, &layout(), true);

        assert_ne!(rest.blob, moving.blob);
        assert!(moving.shadow.opacity > rest.shadow.opacity);
    }
}
