use std::time::Duration;

use crate::{CheckpointReason, Effect, HarvestState, Msg, Phase, StallSignal, Termination};

/// Pure update function: applies an observation to the run state and returns
/// the IO the engine should perform next, in order.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    if state.is_done() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Start => {
            if state.phase == Phase::Priming {
                vec![Effect::Prime]
            } else {
                Vec::new()
            }
        }
        Msg::Primed { ready: _, extent } => {
            state.last_extent = extent;
            state.phase = Phase::Extracting;
            vec![Effect::ExtractPass]
        }
        Msg::PassCompleted { admitted, held: _ } => {
            state.error_streak = 0;
            if admitted == 0 {
                state.no_new_streak += 1;
            } else {
                state.no_new_streak = 0;
            }

            if state.no_new_streak >= state.stall_threshold {
                finish(&mut state, Termination::Stalled(StallSignal::NoNewComments))
            } else {
                state.phase = Phase::Advancing;
                let pause = state.scheduler.next_delay(state.attempt + 1, 0);
                vec![
                    Effect::Checkpoint {
                        reason: CheckpointReason::Pass,
                    },
                    Effect::Advance { pause },
                ]
            }
        }
        Msg::Advanced { extent } => {
            state.attempt += 1;
            let unchanged = state.last_extent == Some(extent);
            let grew = state.last_extent.is_none_or(|previous| extent > previous);
            if unchanged {
                state.same_extent_streak += 1;
            } else {
                state.same_extent_streak = 0;
            }
            state.last_extent = Some(extent);

            if state.same_extent_streak >= state.stall_threshold {
                finish(&mut state, Termination::Stalled(StallSignal::ExtentUnchanged))
            } else if state.attempt >= state.max_attempts {
                finish(&mut state, Termination::AttemptsExhausted)
            } else {
                state.phase = Phase::Extracting;
                if grew {
                    vec![Effect::ExtractPass]
                } else {
                    vec![Effect::ClearObstacle, Effect::ExtractPass]
                }
            }
        }
        Msg::ProbeFailed { held } => {
            state.error_streak += 1;
            state.total_errors += 1;
            state.attempt += 1;

            if state.attempt >= state.max_attempts {
                finish(&mut state, Termination::AttemptsExhausted)
            } else {
                let mut effects = Vec::with_capacity(5);
                if held > 0 {
                    effects.push(Effect::Checkpoint {
                        reason: CheckpointReason::Error,
                    });
                }
                effects.push(Effect::ClearObstacle);
                if state.refresh_after_errors > 0
                    && state.error_streak % state.refresh_after_errors == 0
                {
                    effects.push(Effect::RefreshSession);
                }
                let delay = state.scheduler.next_delay(state.attempt, state.error_streak);
                effects.push(Effect::Sleep(delay));
                effects.push(retry_step(state.phase));
                effects
            }
        }
        Msg::ObstacleChecked { cleared } => {
            if cleared {
                state.obstacles_cleared += 1;
                state.same_extent_streak = 0;
            }
            Vec::new()
        }
        Msg::SessionRefreshed => {
            // The page reloaded; its extent starts over.
            state.last_extent = None;
            state.same_extent_streak = 0;
            Vec::new()
        }
        Msg::RefreshFailed => finish(&mut state, Termination::SessionLost),
        Msg::CancelRequested => finish(&mut state, Termination::Cancelled),
    };

    (state, effects)
}

fn finish(state: &mut HarvestState, termination: Termination) -> Vec<Effect> {
    state.finish(termination);
    vec![Effect::Finish(termination)]
}

fn retry_step(phase: Phase) -> Effect {
    match phase {
        Phase::Priming => Effect::Prime,
        Phase::Advancing => Effect::Advance {
            pause: Duration::ZERO,
        },
        Phase::Extracting | Phase::Done => Effect::ExtractPass,
    }
}
