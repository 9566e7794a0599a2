//! Deterministic lockstep replay with interactive controls.
//!
//! Replay input is a stream of `bound value` lines consumed one decision at
//! a time. Values at or above [`REPLAY_CONTROL_BASE`] are control tokens,
//! not data; they are decoded into [`ReplayToken`] here, at the I/O edge,
//! and never travel further as magic numbers. This strategy reproduces a
//! recorded execution and never enumerates: `advance` and `has_more` always
//! report false.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use tracing::{info, warn};
use wander_core::{Decision, EngineError, PathOutcome, REPLAY_CONTROL_BASE};

use crate::strategy::{DecisionCtx, Draw, EngineAction};

const CONTROL_DRAW_FRESH: u64 = REPLAY_CONTROL_BASE;
const CONTROL_TOGGLE_GUSTO: u64 = REPLAY_CONTROL_BASE + 1;
const CONTROL_SAVE_SEQUENCE: u64 = REPLAY_CONTROL_BASE + 2;
const CONTROL_RUN_UNTIL_LIVE: u64 = REPLAY_CONTROL_BASE + 3;
const CONTROL_TOGGLE_PROMPT: u64 = REPLAY_CONTROL_BASE + 4;
const CONTROL_SAVE_UP_TO: u64 = REPLAY_CONTROL_BASE + 5;
const CONTROL_TERMINATE: u64 = REPLAY_CONTROL_BASE + 6;

/// One decoded replay input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayToken {
    /// A real decision to serve verbatim.
    Value(Decision),
    /// Draw a fresh random value for this decision.
    DrawFresh,
    /// Toggle gusto, effective at the next decision.
    ToggleGusto,
    /// Save the current decision sequence under this name.
    SaveSequence(String),
    /// Run without replay until the path becomes live, then resume.
    RunUntilLive,
    /// Toggle interactive prompting.
    TogglePrompt,
    /// Save the decisions taken at or before the given step.
    SaveUpTo {
        /// Step horizon of the saved prefix.
        step: u64,
        /// Output file name.
        name: String,
    },
    /// Terminate the run.
    Terminate,
}

/// Convert recorded decisions (e.g. a decoded path file) into replay tokens.
///
/// Recorded decisions are always data: control interpretation applies only
/// to raw streams.
pub fn tokens_from_decisions(decisions: &[Decision]) -> Vec<ReplayToken> {
    decisions.iter().map(|&d| ReplayToken::Value(d)).collect()
}

enum TokenSource {
    Preloaded(VecDeque<ReplayToken>),
    Stream(Box<dyn BufRead + Send>),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Preloaded(tokens) => {
                f.debug_tuple("Preloaded").field(&tokens.len()).finish()
            }
            TokenSource::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// Reads decisions in lockstep with requests, reproducing a prior execution.
#[derive(Debug)]
pub struct DeterministicReplay {
    source: TokenSource,
    /// Serve random draws until a live path completes, then resume the
    /// stream.
    run_until_live: bool,
    /// A live path was reached; one more path runs to consume the rest of
    /// the stream.
    resumed: bool,
    prompt: bool,
    actions: Vec<EngineAction>,
}

impl DeterministicReplay {
    /// Replay a pre-decoded token sequence.
    pub fn from_tokens(tokens: Vec<ReplayToken>) -> Self {
        Self {
            source: TokenSource::Preloaded(tokens.into()),
            run_until_live: false,
            resumed: false,
            prompt: false,
            actions: Vec::new(),
        }
    }

    /// Replay recorded decisions verbatim.
    pub fn from_recorded(decisions: &[Decision]) -> Self {
        Self::from_tokens(tokens_from_decisions(decisions))
    }

    /// Replay from a raw line stream, e.g. standard input.
    ///
    /// When `prompt` is set, a prompt is written to standard error before
    /// each read.
    pub fn from_reader(reader: Box<dyn BufRead + Send>, prompt: bool) -> Self {
        Self {
            source: TokenSource::Stream(reader),
            run_until_live: false,
            resumed: false,
            prompt,
            actions: Vec::new(),
        }
    }

    /// Read and decode the next token. `None` means end of stream.
    fn next_token(&mut self, ctx: &DecisionCtx) -> Result<Option<ReplayToken>, EngineError> {
        match &mut self.source {
            TokenSource::Preloaded(tokens) => Ok(tokens.pop_front()),
            TokenSource::Stream(reader) => loop {
                if self.prompt {
                    let _ = write!(
                        std::io::stderr(),
                        "decision {} (bound {})> ",
                        ctx.position,
                        ctx.bound
                    );
                }
                let Some(line) = read_line(reader)? else {
                    return Ok(None);
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let mut parts = trimmed.split_whitespace();
                let parsed = match (parts.next(), parts.next(), parts.next()) {
                    (Some(bound), Some(value), None) => {
                        bound.parse::<u64>().ok().zip(value.parse::<u64>().ok())
                    }
                    _ => None,
                };
                let Some((bound, value)) = parsed else {
                    warn!(line = trimmed, "Unparsable replay line, skipping");
                    continue;
                };
                if value < REPLAY_CONTROL_BASE {
                    return Ok(Some(ReplayToken::Value(Decision { bound, value })));
                }
                match Self::decode_control(self.prompt, value, reader)? {
                    Some(token) => return Ok(Some(token)),
                    None => continue,
                }
            },
        }
    }

    /// Decode a control value, reading follow-up argument lines as needed.
    fn decode_control(
        prompt: bool,
        value: u64,
        reader: &mut Box<dyn BufRead + Send>,
    ) -> Result<Option<ReplayToken>, EngineError> {
        let token = match value {
            CONTROL_DRAW_FRESH => ReplayToken::DrawFresh,
            CONTROL_TOGGLE_GUSTO => ReplayToken::ToggleGusto,
            CONTROL_SAVE_SEQUENCE => {
                if prompt {
                    let _ = write!(std::io::stderr(), "file name> ");
                }
                match read_line(reader)? {
                    Some(name) => ReplayToken::SaveSequence(name.trim().to_string()),
                    None => return Ok(None),
                }
            }
            CONTROL_RUN_UNTIL_LIVE => ReplayToken::RunUntilLive,
            CONTROL_TOGGLE_PROMPT => ReplayToken::TogglePrompt,
            CONTROL_SAVE_UP_TO => {
                if prompt {
                    let _ = write!(std::io::stderr(), "step and file name> ");
                }
                let Some(line) = read_line(reader)? else {
                    return Ok(None);
                };
                let mut parts = line.trim().split_whitespace();
                match (parts.next().and_then(|s| s.parse().ok()), parts.next()) {
                    (Some(step), Some(name)) => ReplayToken::SaveUpTo {
                        step,
                        name: name.to_string(),
                    },
                    _ => {
                        warn!(line = line.trim(), "Unparsable save-up-to arguments");
                        return Ok(None);
                    }
                }
            }
            CONTROL_TERMINATE => ReplayToken::Terminate,
            other => {
                warn!(value = other, "Unknown replay control value, skipping");
                return Ok(None);
            }
        };
        Ok(Some(token))
    }

    pub(crate) fn on_path_begin(&mut self) {
        // Nothing per-path; the stream continues across paths.
    }

    pub(crate) fn next_decision(&mut self, ctx: &DecisionCtx) -> Result<Draw, EngineError> {
        if self.run_until_live {
            return Ok(Draw::Random);
        }
        loop {
            let Some(token) = self.next_token(ctx)? else {
                return Err(EngineError::StreamExhausted {
                    position: ctx.position,
                });
            };
            match token {
                ReplayToken::Value(recorded) => {
                    if recorded.bound != ctx.bound {
                        return Err(EngineError::BoundMismatch {
                            position: ctx.position,
                            recorded: recorded.bound,
                            requested: ctx.bound,
                        });
                    }
                    return Ok(Draw::Value(recorded.value));
                }
                ReplayToken::DrawFresh => return Ok(Draw::Random),
                ReplayToken::ToggleGusto => {
                    self.actions.push(EngineAction::RequestGustoToggle);
                }
                ReplayToken::SaveSequence(name) => {
                    self.actions.push(EngineAction::SavePath { name });
                }
                ReplayToken::RunUntilLive => {
                    info!("Replaying suspended until a live path completes");
                    self.run_until_live = true;
                    return Ok(Draw::Random);
                }
                ReplayToken::TogglePrompt => {
                    self.prompt = !self.prompt;
                }
                ReplayToken::SaveUpTo { step, name } => {
                    self.actions
                        .push(EngineAction::SavePrefixUpToStep { step, name });
                }
                ReplayToken::Terminate => return Err(EngineError::ReplayTerminated),
            }
        }
    }

    /// Replay runs a single path unless it is waiting out random paths for
    /// a live one, or has just found one and still owes the rest of the
    /// stream a path.
    pub(crate) fn has_more(&self) -> bool {
        self.run_until_live || self.resumed
    }

    pub(crate) fn on_path_complete(&mut self, outcome: &PathOutcome) {
        if self.run_until_live {
            if outcome.is_live {
                info!("Live path reached; replay resumes");
                self.run_until_live = false;
                self.resumed = true;
            }
        } else {
            self.resumed = false;
        }
    }

    pub(crate) fn drain_actions(&mut self) -> Vec<EngineAction> {
        std::mem::take(&mut self.actions)
    }
}

/// Read one line, mapping EOF to `None`.
fn read_line(reader: &mut Box<dyn BufRead + Send>) -> Result<Option<String>, EngineError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).map_err(|e| {
        warn!(error = %e, "Replay input read failed");
        EngineError::StreamExhausted { position: 0 }
    })?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(bound: u64, position: usize) -> DecisionCtx {
        DecisionCtx {
            bound,
            offset: position,
            position,
            step: 0,
        }
    }

    fn stream(input: &str) -> DeterministicReplay {
        DeterministicReplay::from_reader(Box::new(std::io::Cursor::new(input.to_string())), false)
    }

    #[test]
    fn test_values_served_in_lockstep() {
        let mut replay = stream("4 1\n3 2\n");
        assert_eq!(replay.next_decision(&ctx(4, 0)).unwrap(), Draw::Value(1));
        assert_eq!(replay.next_decision(&ctx(3, 1)).unwrap(), Draw::Value(2));
    }

    #[test]
    fn test_bound_mismatch_is_fatal() {
        let mut replay = stream("4 1\n");
        let err = replay.next_decision(&ctx(5, 0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::BoundMismatch {
                position: 0,
                recorded: 4,
                requested: 5,
            }
        );
    }

    #[test]
    fn test_end_of_stream_is_fatal() {
        let mut replay = stream("4 1\n");
        replay.next_decision(&ctx(4, 0)).unwrap();
        let err = replay.next_decision(&ctx(4, 1)).unwrap_err();
        assert_eq!(err, EngineError::StreamExhausted { position: 1 });
    }

    #[test]
    fn test_draw_fresh_control() {
        let mut replay = stream(&format!("0 {CONTROL_DRAW_FRESH}\n"));
        assert_eq!(replay.next_decision(&ctx(9, 0)).unwrap(), Draw::Random);
    }

    #[test]
    fn test_gusto_toggle_is_consumed_before_next_value() {
        let mut replay = stream(&format!("0 {CONTROL_TOGGLE_GUSTO}\n4 3\n"));
        assert_eq!(replay.next_decision(&ctx(4, 0)).unwrap(), Draw::Value(3));
        assert_eq!(
            replay.drain_actions(),
            vec![EngineAction::RequestGustoToggle]
        );
    }

    #[test]
    fn test_save_sequence_reads_name_line() {
        let mut replay = stream(&format!("0 {CONTROL_SAVE_SEQUENCE}\nsnapshot.path\n2 1\n"));
        assert_eq!(replay.next_decision(&ctx(2, 0)).unwrap(), Draw::Value(1));
        assert_eq!(
            replay.drain_actions(),
            vec![EngineAction::SavePath {
                name: "snapshot.path".to_string()
            }]
        );
    }

    #[test]
    fn test_save_up_to_reads_step_and_name() {
        let mut replay = stream(&format!("0 {CONTROL_SAVE_UP_TO}\n17 early.path\n2 0\n"));
        replay.next_decision(&ctx(2, 0)).unwrap();
        assert_eq!(
            replay.drain_actions(),
            vec![EngineAction::SavePrefixUpToStep {
                step: 17,
                name: "early.path".to_string()
            }]
        );
    }

    #[test]
    fn test_run_until_live_suspends_replay() {
        let mut replay = stream(&format!("0 {CONTROL_RUN_UNTIL_LIVE}\n4 2\n"));
        assert_eq!(replay.next_decision(&ctx(9, 0)).unwrap(), Draw::Random);
        assert_eq!(replay.next_decision(&ctx(9, 1)).unwrap(), Draw::Random);

        // A non-live path does not resume the stream.
        replay.on_path_complete(&wander_core::PathOutcome {
            cause: wander_core::EndCause::TooManySteps,
            is_live: false,
            is_safe: true,
            step_count: 1,
            decision_count: 2,
        });
        assert!(replay.has_more());
        assert_eq!(replay.next_decision(&ctx(9, 0)).unwrap(), Draw::Random);

        // A live path does, and one more path runs so the rest of the
        // stream gets replayed.
        replay.on_path_complete(&wander_core::PathOutcome {
            cause: wander_core::EndCause::StoppingCondition,
            is_live: true,
            is_safe: false,
            step_count: 1,
            decision_count: 2,
        });
        assert!(replay.has_more());
        assert_eq!(replay.next_decision(&ctx(4, 0)).unwrap(), Draw::Value(2));
        replay.on_path_complete(&wander_core::PathOutcome {
            cause: wander_core::EndCause::StoppingCondition,
            is_live: false,
            is_safe: true,
            step_count: 1,
            decision_count: 1,
        });
        assert!(!replay.has_more());
    }

    #[test]
    fn test_terminate_control() {
        let mut replay = stream(&format!("0 {CONTROL_TERMINATE}\n"));
        assert_eq!(
            replay.next_decision(&ctx(2, 0)).unwrap_err(),
            EngineError::ReplayTerminated
        );
    }

    #[test]
    fn test_recorded_decisions_replay_verbatim() {
        let recorded = vec![Decision::new(4, 1), Decision::new(3, 2)];
        let mut replay = DeterministicReplay::from_recorded(&recorded);
        assert_eq!(replay.next_decision(&ctx(4, 0)).unwrap(), Draw::Value(1));
        assert_eq!(replay.next_decision(&ctx(3, 1)).unwrap(), Draw::Value(2));
        assert_eq!(
            replay.next_decision(&ctx(2, 2)).unwrap_err(),
            EngineError::StreamExhausted { position: 2 }
        );
    }
}
