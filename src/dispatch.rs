use crate::state::FabState;

/// What a tap landed on, top-most first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapTarget {
    Secondary(usize),
    Primary(usize),
    MainButton,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Expand,
    Collapse,
    ToggleSecondary,
    /// Fold the secondary layer, then the primary one; optionally run a secondary item's
    /// action once the secondary layer has folded.
    CompoundClose { invoke: Option<usize> },
    Ignore,
}

pub fn resolve_tap(target: TapTarget, state: FabState, secondary_count: usize) -> Command {
    let secondary_open = state.secondary_expanded();

    match target {
        TapTarget::MainButton if !state.expanded() => Command::Expand,
        TapTarget::MainButton if secondary_open => Command::CompoundClose { invoke: None },
        TapTarget::MainButton => Command::Collapse,

        TapTarget::Primary(_) if !state.expanded() => Command::Ignore,
        TapTarget::Primary(0) if secondary_count > 0 => Command::ToggleSecondary,
        TapTarget::Primary(_) if secondary_open => Command::CompoundClose { invoke: None },
        TapTarget::Primary(_) => Command::Collapse,

        TapTarget::Secondary(i) if secondary_open && i < secondary_count => {
            Command::CompoundClose { invoke: Some(i) }
        }
        TapTarget::Secondary(_) => Command::Ignore,

        TapTarget::Overlay if state.is_open() => Command::CompoundClose { invoke: None },
        TapTarget::Overlay => Command::Ignore,
    }
}
