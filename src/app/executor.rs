//! Roam executor: drives the roam state machine to a terminal state.

use log::debug;

use crate::error::RoamError;
use crate::fsm::context::{CommandPath, RoamContext, RoamOutcome, RoamRequest, VerifySettings};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::ports::{Pause, Station};

/// Everything a finished roam reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamReport {
    pub outcome: RoamOutcome,
    pub path: Vec<StateId>,
    pub command: Option<CommandPath>,
    pub probes: u32,
}

pub struct RoamExecutor {
    verify: VerifySettings,
}

impl RoamExecutor {
    /// Upper bound on ticks for one roam.  Every non-terminal state moves
    /// on after one update, so this is never reached in practice.
    const MAX_TICKS: u32 = 8;

    pub fn new(verify: VerifySettings) -> Self {
        Self { verify }
    }

    /// Roam to `request.target`.  A no-op when already associated with it.
    pub fn execute(
        &self,
        station: &mut dyn Station,
        pause: &dyn Pause,
        request: RoamRequest,
    ) -> RoamReport {
        let mut ctx = RoamContext::new(station, pause, request, self.verify);
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);

        for _ in 0..Self::MAX_TICKS {
            if fsm.current_state().is_terminal() {
                break;
            }
            fsm.tick(&mut ctx);
        }
        if !fsm.current_state().is_terminal() {
            debug!("roam FSM stalled in {:?}", fsm.current_state());
            fsm.force_transition(StateId::Failed, &mut ctx);
        }

        let outcome = ctx.outcome.take().unwrap_or_else(|| {
            RoamOutcome::Failed(RoamError::Unverified {
                target: ctx.request.target,
                probes: ctx.probes,
            })
        });
        RoamReport {
            outcome,
            path: fsm.visited().to_vec(),
            command: ctx.command_path,
            probes: ctx.probes,
        }
    }
}
