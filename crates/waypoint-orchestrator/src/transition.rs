//! The navigation transition table.

use waypoint_core::error::NavigationError;
use waypoint_core::phase::NavigationPhase;

/// Everything that can move the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    /// The intro finished (or failed, or timed out).
    FinishIntro,
    /// The reader picked a destination in the table of contents.
    BeginTransition,
    /// The fly-out animation finished.
    FinishTransition,
    /// Direct docked toggle used outside the intro flow.
    SetDocked(bool),
    /// The route changed away from home.
    LeaveHome,
}

impl NavigationCommand {
    /// Every command, for exhaustive checks.
    pub const ALL: [Self; 6] = [
        Self::FinishIntro,
        Self::BeginTransition,
        Self::FinishTransition,
        Self::SetDocked(true),
        Self::SetDocked(false),
        Self::LeaveHome,
    ];

    /// Operation name used in logs and errors.
    #[must_use]
    pub fn operation(self) -> &'static str {
        match self {
            Self::FinishIntro => "finish_intro",
            Self::BeginTransition => "begin_transition",
            Self::FinishTransition => "finish_transition",
            Self::SetDocked(_) => "set_docked",
            Self::LeaveHome => "leave_home",
        }
    }
}

/// Looks up the phase `command` moves `current` to.
///
/// `LeaveHome` docks from every phase, bypassing all guards. Undocking
/// returns to the table of contents only on the home route.
///
/// # Errors
///
/// Returns `NavigationError::InvalidTransition` when the table has no entry
/// for the pair; the orchestrator ignores those calls.
pub fn next_phase(
    current: NavigationPhase,
    command: NavigationCommand,
    on_home_route: bool,
) -> Result<NavigationPhase, NavigationError> {
    use NavigationCommand as C;
    use NavigationPhase as P;

    match (current, command) {
        (P::Preload, C::FinishIntro) => Ok(P::TableOfContents),
        (P::TableOfContents, C::BeginTransition) => Ok(P::Transitioning),
        (P::Transitioning, C::FinishTransition) | (_, C::LeaveHome | C::SetDocked(true)) => {
            Ok(P::Docked)
        }
        (P::Docked, C::SetDocked(false)) if on_home_route => Ok(P::TableOfContents),
        (P::Docked, C::SetDocked(false)) => Ok(P::Docked),
        (phase, command) => Err(NavigationError::InvalidTransition {
            operation: command.operation(),
            phase,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitioning_only_reachable_from_toc_by_selection() {
        for phase in NavigationPhase::ALL {
            for command in NavigationCommand::ALL {
                for on_home in [true, false] {
                    if next_phase(phase, command, on_home) == Ok(NavigationPhase::Transitioning) {
                        assert_eq!(phase, NavigationPhase::TableOfContents);
                        assert_eq!(command, NavigationCommand::BeginTransition);
                    }
                }
            }
        }
    }

    #[test]
    fn test_leave_home_docks_from_every_phase() {
        for phase in NavigationPhase::ALL {
            assert_eq!(
                next_phase(phase, NavigationCommand::LeaveHome, false),
                Ok(NavigationPhase::Docked)
            );
        }
    }

    #[test]
    fn test_undock_off_home_stays_docked() {
        for phase in NavigationPhase::ALL {
            let next = next_phase(phase, NavigationCommand::SetDocked(false), false);
            assert_ne!(next, Ok(NavigationPhase::TableOfContents));
            if phase == NavigationPhase::Docked {
                assert_eq!(next, Ok(NavigationPhase::Docked));
            }
        }
    }

    #[test]
    fn test_finish_intro_rejected_outside_preload() {
        let result = next_phase(
            NavigationPhase::TableOfContents,
            NavigationCommand::FinishIntro,
            true,
        );

        match result {
            Err(NavigationError::InvalidTransition { operation, phase }) => {
                assert_eq!(operation, "finish_intro");
                assert_eq!(phase, NavigationPhase::TableOfContents);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_full_table() {
        use NavigationCommand as C;
        use NavigationPhase as P;

        let accepted: Vec<(P, C)> = P::ALL
            .into_iter()
            .flat_map(|p| C::ALL.into_iter().map(move |c| (p, c)))
            .filter(|(p, c)| next_phase(*p, *c, true).is_ok())
            .collect();

        assert_eq!(
            accepted,
            vec![
                (P::Preload, C::FinishIntro),
                (P::Preload, C::SetDocked(true)),
                (P::Preload, C::LeaveHome),
                (P::TableOfContents, C::BeginTransition),
                (P::TableOfContents, C::SetDocked(true)),
                (P::TableOfContents, C::LeaveHome),
                (P::Transitioning, C::FinishTransition),
                (P::Transitioning, C::SetDocked(true)),
                (P::Transitioning, C::LeaveHome),
                (P::Docked, C::SetDocked(true)),
                (P::Docked, C::SetDocked(false)),
                (P::Docked, C::LeaveHome),
            ]
        );
    }
}
