use crate::anim::{AnimatedValue, Channel, Channels, Sequence};
use crate::choreography::{self, secondary_collapse_total};
use crate::dispatch::{self, Command, TapTarget};
use crate::options::FabOptions;
use crate::state::{FabState, MenuPhase};
use std::time::Duration;
use strum::Display as StrumDisplay;

/// Icon shown on primary item 0 when it carries a secondary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Glyph {
    #[default]
    Expand,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The flags changed without a direct call (a deferred collapse landed).
    StateChanged(FabState),
    /// Run the action of this secondary item.
    Invoke(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    CollapsePrimary,
    Invoke(usize),
    AnchorGlyph(Glyph),
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Duration,
    action: DeferredAction,
}

#[derive(Debug, Default)]
struct ValueBank {
    primary: Vec<AnimatedValue>,
    secondary: Vec<AnimatedValue>,
    bulges: Vec<AnimatedValue>,
    overlay: AnimatedValue,
}

impl Channels for ValueBank {
    fn channel_mut(&mut self, channel: Channel) -> Option<&mut AnimatedValue> {
        match channel {
            Channel::Primary(i) => self.primary.get_mut(i),
            Channel::Secondary(i) => self.secondary.get_mut(i),
            Channel::Bulge(i) => self.bulges.get_mut(i),
            Channel::Overlay => Some(&mut self.overlay),
        }
    }
}

fn value_of(values: &[AnimatedValue], index: usize) -> f64 {
    values.get(index).map(AnimatedValue::value).unwrap_or(0.0)
}

/// Owns every animated value of one menu and the sequences driving them.
///
/// The host advances it once per frame with [`Engine::tick`]; flag changes and taps
/// replace the in-flight sequence of the affected layer.
pub struct Engine {
    options: FabOptions,
    state: FabState,
    values: ValueBank,
    primary_seq: Option<Sequence>,
    secondary_seq: Option<Sequence>,
    overlay_seq: Option<Sequence>,
    deferred: Vec<Deferred>,
    clock: Duration,
    glyph: Glyph,
}

impl Engine {
    /// Creates the engine with every value already at rest for `state`.
    pub fn mount(
        options: FabOptions,
        primary_count: usize,
        secondary_count: usize,
        state: FabState,
    ) -> Self {
        let progress = |open: bool| AnimatedValue::new(if open { 1.0 } else { 0.0 });
        let values = ValueBank {
            primary: vec![progress(state.expanded()); primary_count],
            secondary: vec![progress(state.secondary_expanded()); secondary_count],
            bulges: vec![AnimatedValue::default(); primary_count],
            overlay: progress(state.is_open()),
        };

        Self {
            options,
            state,
            values,
            primary_seq: None,
            secondary_seq: None,
            overlay_seq: None,
            deferred: Vec::new(),
            clock: Duration::ZERO,
            glyph: if state.secondary_expanded() {
                Glyph::Close
            } else {
                Glyph::Expand
            },
        }
    }

    pub fn options(&self) -> &FabOptions {
        &self.options
    }

    pub fn state(&self) -> FabState {
        self.state
    }

    pub fn glyph(&self) -> Glyph {
        self.glyph
    }

    pub fn primary_count(&self) -> usize {
        self.values.primary.len()
    }

    pub fn secondary_count(&self) -> usize {
        self.values.secondary.len()
    }

    pub fn primary_progress(&self, index: usize) -> f64 {
        value_of(&self.values.primary, index)
    }

    pub fn secondary_progress(&self, index: usize) -> f64 {
        value_of(&self.values.secondary, index)
    }

    pub fn secondary_in_motion(&self, index: usize) -> bool {
        self.values
            .secondary
            .get(index)
            .is_some_and(AnimatedValue::is_running)
    }

    pub fn bulge(&self, index: usize) -> f64 {
        value_of(&self.values.bulges, index)
    }

    pub fn overlay_alpha(&self) -> f64 {
        self.values.overlay.value().clamp(0.0, 1.0)
    }

    /// A fully faded overlay lets taps through.
    pub fn overlay_intercepts(&self) -> bool {
        self.overlay_alpha() > 0.0
    }

    pub fn phase(&self) -> MenuPhase {
        MenuPhase::resolve(
            self.state,
            self.primary_seq.is_some(),
            self.secondary_seq.is_some(),
        )
    }

    /// A compound close has folded the secondary layer and will collapse the primary one.
    pub fn collapse_pending(&self) -> bool {
        self.deferred
            .iter()
            .any(|d| d.action == DeferredAction::CollapsePrimary)
    }

    /// The flags with a pending collapse already applied, i.e. where the menu is heading.
    pub fn requested_state(&self) -> FabState {
        FabState::new(
            self.state.expanded() && !self.collapse_pending(),
            self.state.secondary_expanded(),
        )
    }

    /// True while anything still needs frames.
    pub fn is_animating(&self) -> bool {
        self.primary_seq.is_some()
            || self.secondary_seq.is_some()
            || self.overlay_seq.is_some()
            || !self.deferred.is_empty()
    }

    pub fn secondary_close_duration(&self) -> Duration {
        secondary_collapse_total(self.secondary_count(), self.options.secondary_stagger)
    }

    pub fn tap(&mut self, target: TapTarget) -> Command {
        if target == TapTarget::Overlay && !self.overlay_intercepts() {
            return Command::Ignore;
        }
        let command = dispatch::resolve_tap(target, self.state, self.secondary_count());
        log::debug!("Tap on {target:?} resolved to {command:?}");
        self.apply(command);
        command
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Expand => self.set_expanded(true),
            Command::Collapse => self.set_expanded(false),
            Command::ToggleSecondary => {
                let open = !self.state.secondary_expanded();
                self.set_secondary_expanded(open);
            }
            Command::CompoundClose { invoke } => self.compound_close(invoke),
            Command::Ignore => {}
        }
    }

    /// External write of the `expanded` flag. Closing while the secondary layer is open
    /// folds that layer first.
    pub fn set_expanded(&mut self, expanded: bool) {
        if expanded == self.state.expanded() {
            if expanded && self.collapse_pending() {
                log::debug!("Re-expand cancels the pending collapse");
                self.cancel_deferred(|a| a == DeferredAction::CollapsePrimary);
            }
            return;
        }
        if !expanded && self.state.secondary_expanded() {
            self.compound_close(None);
            return;
        }

        self.cancel_deferred(|a| a == DeferredAction::CollapsePrimary);
        self.state.set_expanded(expanded);
        self.restart_primary();
        self.sync_overlay();
    }

    pub fn set_secondary_expanded(&mut self, open: bool) {
        if open == self.state.secondary_expanded() {
            return;
        }
        if !self.state.set_secondary_expanded(open) {
            log::debug!("Ignoring secondary expand while the primary layer is closed");
            return;
        }

        self.cancel_deferred(|a| matches!(a, DeferredAction::AnchorGlyph(_)));
        if open {
            // reopening wins over a pending compound close
            self.cancel_deferred(|a| a == DeferredAction::CollapsePrimary);
            self.glyph = Glyph::Close;
        } else {
            self.defer(
                self.secondary_close_duration(),
                DeferredAction::AnchorGlyph(Glyph::Expand),
            );
        }
        self.restart_secondary();
        self.sync_overlay();
    }

    fn compound_close(&mut self, invoke: Option<usize>) {
        let wait = if self.state.secondary_expanded() {
            self.set_secondary_expanded(false);
            self.secondary_close_duration()
        } else {
            Duration::ZERO
        };

        if let Some(index) = invoke {
            self.defer(wait, DeferredAction::Invoke(index));
        }

        self.cancel_deferred(|a| a == DeferredAction::CollapsePrimary);
        if wait.is_zero() {
            self.collapse_primary();
        } else {
            self.defer(wait, DeferredAction::CollapsePrimary);
        }
    }

    fn collapse_primary(&mut self) -> bool {
        if !self.state.expanded() {
            return false;
        }
        self.state.set_expanded(false);
        self.restart_primary();
        self.sync_overlay();
        true
    }

    fn defer(&mut self, after: Duration, action: DeferredAction) {
        self.deferred.push(Deferred {
            due: self.clock + after,
            action,
        });
    }

    fn cancel_deferred(&mut self, pred: impl Fn(DeferredAction) -> bool) {
        self.deferred.retain(|d| !pred(d.action));
    }

    fn restart_primary(&mut self) {
        for v in self
            .values
            .primary
            .iter_mut()
            .chain(self.values.bulges.iter_mut())
        {
            v.stop();
        }
        let count = self.primary_count();
        self.primary_seq = Some(if self.state.expanded() {
            choreography::primary_expand(count, &self.options)
        } else {
            choreography::primary_collapse(count, &self.options)
        });
    }

    fn restart_secondary(&mut self) {
        for v in &mut self.values.secondary {
            v.stop();
        }
        let count = self.secondary_count();
        self.secondary_seq = Some(if self.state.secondary_expanded() {
            choreography::secondary_expand(count, &self.options)
        } else {
            choreography::secondary_collapse(count, &self.options)
        });
    }

    /// Fades the overlay towards the open state, unless it is already heading there.
    fn sync_overlay(&mut self) {
        let target = if self.state.is_open() { 1.0 } else { 0.0 };
        if self.values.overlay.target() == target {
            return;
        }
        self.values.overlay.stop();
        self.overlay_seq = Some(choreography::overlay_fade(
            self.state.is_open(),
            &self.options,
        ));
    }

    /// Advances the clock, firing deferred actions at their exact due time.
    pub fn tick(&mut self, dt: Duration) -> Vec<Effect> {
        let mut effects = Vec::new();
        let target = self.clock + dt;

        while let Some(idx) = self
            .deferred
            .iter()
            .enumerate()
            .filter(|(_, d)| d.due <= target)
            .min_by_key(|(_, d)| d.due)
            .map(|(i, _)| i)
        {
            let deferred = self.deferred.remove(idx);
            let step = deferred.due.saturating_sub(self.clock);
            self.advance(step);
            self.clock = self.clock.max(deferred.due);
            self.fire(deferred.action, &mut effects);
        }

        self.advance(target.saturating_sub(self.clock));
        self.clock = target;
        effects
    }

    fn fire(&mut self, action: DeferredAction, effects: &mut Vec<Effect>) {
        match action {
            DeferredAction::CollapsePrimary => {
                if self.collapse_primary() {
                    effects.push(Effect::StateChanged(self.state));
                }
            }
            DeferredAction::Invoke(index) => effects.push(Effect::Invoke(index)),
            DeferredAction::AnchorGlyph(glyph) => self.glyph = glyph,
        }
    }

    fn advance(&mut self, dt: Duration) {
        if dt.is_zero() {
            return;
        }
        for seq in [
            &mut self.primary_seq,
            &mut self.secondary_seq,
            &mut self.overlay_seq,
        ] {
            if let Some(s) = seq {
                s.advance(dt, &mut self.values);
                if s.is_finished() {
                    *seq = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine(primary: usize, secondary: usize, state: FabState) -> Engine {
        Engine::mount(FabOptions::default(), primary, secondary, state)
    }

    fn settle(engine: &mut Engine) -> Vec<Effect> {
        let mut effects = Vec::new();
        for _ in 0..500 {
            if !engine.is_animating() {
                break;
            }
            effects.extend(engine.tick(ms(16)));
        }
        effects
    }

    #[test]
    fn test_mount_snaps_without_animating() {
        let e = engine(3, 2, FabState::new(true, true));
        assert!(!e.is_animating());
        assert_eq!(e.primary_progress(2), 1.0);
        assert_eq!(e.secondary_progress(1), 1.0);
        assert_eq!(e.overlay_alpha(), 1.0);
        assert_eq!(e.glyph(), Glyph::Close);
        assert_eq!(e.phase(), MenuPhase::SecondaryExpanded);
    }

    #[test]
    fn test_expand_and_collapse() {
        let mut e = engine(3, 0, FabState::default());
        e.tap(TapTarget::MainButton);
        assert_eq!(e.phase(), MenuPhase::Expanding);
        settle(&mut e);
        assert_eq!(e.phase(), MenuPhase::Expanded);
        assert_eq!(e.primary_progress(0), 1.0);

        e.tap(TapTarget::MainButton);
        assert_eq!(e.phase(), MenuPhase::Collapsing);
        settle(&mut e);
        assert_eq!(e.phase(), MenuPhase::Collapsed);
        assert_eq!(e.primary_progress(2), 0.0);
        assert!(!e.overlay_intercepts());
    }

    #[test]
    fn test_rapid_toggle_cancels_in_flight_expand() {
        let mut e = engine(3, 0, FabState::default());
        e.set_expanded(true);
        e.tick(ms(100));
        let partial = e.primary_progress(0);
        assert!(partial > 0.0 && partial < 1.0);

        e.set_expanded(false);
        e.set_expanded(true);
        e.set_expanded(false);
        // values continue from where the cancelled sequence left them
        assert_eq!(e.primary_progress(0), partial);

        settle(&mut e);
        assert!(!e.state().expanded());
        assert_eq!(e.primary_progress(0), 0.0);
    }

    #[test]
    fn test_secondary_toggle_and_glyph_delay() {
        let mut e = engine(3, 4, FabState::new(true, false));
        e.tap(TapTarget::Primary(0));
        assert!(e.state().secondary_expanded());
        assert_eq!(e.glyph(), Glyph::Close);
        settle(&mut e);
        assert_eq!(e.secondary_progress(3), 1.0);

        e.tap(TapTarget::Primary(0));
        assert!(!e.state().secondary_expanded());
        assert!(e.state().expanded());
        e.tick(ms(439));
        assert_eq!(e.glyph(), Glyph::Close);
        e.tick(ms(1));
        assert_eq!(e.glyph(), Glyph::Expand);
    }

    #[test]
    fn test_secondary_tap_invokes_once_after_close() {
        let mut e = engine(3, 4, FabState::new(true, true));
        let command = e.tap(TapTarget::Secondary(0));
        assert_eq!(command, Command::CompoundClose { invoke: Some(0) });
        assert!(!e.state().secondary_expanded());

        assert!(e.tick(ms(439)).is_empty());
        assert_eq!(e.phase(), MenuPhase::SecondaryCollapsing);

        let effects = e.tick(ms(1));
        assert!(effects.contains(&Effect::Invoke(0)));
        assert!(effects.contains(&Effect::StateChanged(FabState::default())));
        assert_eq!(e.phase(), MenuPhase::Collapsing);

        let rest = settle(&mut e);
        assert!(!rest.iter().any(|fx| matches!(fx, Effect::Invoke(_))));
        assert_eq!(e.phase(), MenuPhase::Collapsed);
    }

    #[test]
    fn test_external_collapse_folds_secondary_first() {
        let mut e = engine(2, 2, FabState::new(true, true));
        e.set_expanded(false);
        assert!(e.state().expanded());
        assert!(!e.state().secondary_expanded());

        e.tick(ms(100));
        assert_eq!(e.primary_progress(1), 1.0);

        settle(&mut e);
        assert!(!e.state().expanded());
        assert_eq!(e.primary_progress(1), 0.0);
    }

    #[test]
    fn test_overlay_only_intercepts_while_visible() {
        let mut e = engine(2, 0, FabState::default());
        assert_eq!(e.tap(TapTarget::Overlay), Command::Ignore);

        e.tap(TapTarget::MainButton);
        e.tick(ms(10));
        assert!(e.overlay_intercepts());
        assert_eq!(
            e.tap(TapTarget::Overlay),
            Command::CompoundClose { invoke: None }
        );
        settle(&mut e);
        assert_eq!(e.overlay_alpha(), 0.0);
        assert!(!e.state().is_open());
    }

    #[test]
    fn test_external_reexpand_cancels_pending_collapse() {
        let mut e = engine(3, 4, FabState::new(true, true));
        e.set_expanded(false);
        assert!(e.collapse_pending());
        assert_eq!(e.requested_state(), FabState::default());

        e.set_expanded(true);
        assert!(!e.collapse_pending());
        assert_eq!(e.requested_state(), FabState::new(true, false));

        let effects = settle(&mut e);
        assert!(effects.is_empty());
        assert!(e.state().expanded());
        assert!(!e.state().secondary_expanded());
        assert_eq!(e.primary_progress(0), 1.0);
        assert_eq!(e.phase(), MenuPhase::Expanded);
    }

    #[test]
    fn test_overdamped_spring_options_still_settle() {
        let options = FabOptions {
            spring_damping_ratio: 40.0,
            ..FabOptions::default()
        }
        .sanitized();
        let mut e = Engine::mount(options, 2, 3, FabState::new(true, false));
        e.set_secondary_expanded(true);
        settle(&mut e);

        assert!(!e.is_animating());
        for i in 0..3 {
            assert_eq!(e.secondary_progress(i), 1.0);
        }
    }

    #[test]
    fn test_reexpand_during_compound_close_keeps_menu_open() {
        let mut e = engine(2, 2, FabState::new(true, true));
        e.tap(TapTarget::MainButton);
        e.tick(ms(100));
        // primary item 0 reopens the secondary layer before the deferred collapse lands
        e.tap(TapTarget::Primary(0));
        settle(&mut e);
        assert!(e.state().expanded());
        assert!(e.state().secondary_expanded());
    }
}
