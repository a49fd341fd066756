use crate::engine::MutationEngine;
use crate::session::{FuzzSession, OutputMode};
use thiserror::Error;

/// Errors from validating a [`RunPlan`] before a run starts.
///
/// These are fatal at the configuration boundary only; nothing inside a
/// running sequence produces them.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("iteration count must be at least 1")]
    ZeroIterations,
    #[error("target iteration {target} is outside the run range 1..={iterations}")]
    TargetOutOfRange { target: u64, iterations: u64 },
}

/// Selects which iterations of a run are surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionFilter {
    /// Emit every iteration's result (a target iteration of 0 on the CLI).
    #[default]
    All,
    /// Emit only the result of the given 1-based iteration.
    Only(u64),
}

impl EmissionFilter {
    /// Whether the 1-based call index `call_index` should be emitted.
    pub fn selects(&self, call_index: u64) -> bool {
        match self {
            EmissionFilter::All => true,
            EmissionFilter::Only(target) => *target == call_index,
        }
    }
}

/// The shape of one bounded run: how many mutate calls to make, which results
/// to surface, and how large each per-call output buffer is.
#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    pub iterations: u64,
    pub filter: EmissionFilter,
    pub output_capacity: usize,
}

impl RunPlan {
    /// Rejects plans the run loop is not defined for. The CLI calls this
    /// before constructing a session, so a bad plan never starts a run.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.iterations < 1 {
            return Err(PlanError::ZeroIterations);
        }
        if let EmissionFilter::Only(target) = self.filter {
            if target == 0 || target > self.iterations {
                return Err(PlanError::TargetOutOfRange {
                    target,
                    iterations: self.iterations,
                });
            }
        }
        Ok(())
    }
}

/// One surfaced mutation result, tagged with the session state that produced
/// it so callers can report seed and iteration alongside the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub iteration: u64,
    pub seed: i64,
    pub data: Vec<u8>,
}

/// Drives a bounded sequence of mutate calls against one fixed input.
///
/// The driver owns the retry/continue policy: a validation failure on one
/// call is logged and skips that iteration's emission, never the rest of the
/// run. Results arrive in iteration order; under [`EmissionFilter::Only`]
/// the sequence is sparse but order-preserving.
#[derive(Debug, Clone, Copy)]
pub struct IterationDriver {
    plan: RunPlan,
}

impl IterationDriver {
    pub fn new(plan: RunPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Runs exactly `plan.iterations` mutate calls against `input` and
    /// collects the emitted results.
    ///
    /// The input is never consumed: every call re-reads the same source
    /// bytes, so in in-place mode each call starts from a fresh copy.
    pub fn run<E: MutationEngine>(
        &self,
        session: &mut FuzzSession<E>,
        input: &[u8],
    ) -> Vec<Emission> {
        let mut emissions = Vec::new();
        let mut output = vec![0u8; self.plan.output_capacity];
        for call_index in 1..=self.plan.iterations {
            if let Some(emission) = self.run_once(session, input, &mut output, call_index) {
                emissions.push(emission);
            }
        }
        emissions
    }

    /// Performs a single mutate call of a run and returns its emission, if
    /// the filter selects this `call_index` and the call passed validation.
    ///
    /// Exposed separately so harnesses can swap the input between calls;
    /// [`run`](Self::run) is just this in a loop with a fixed input.
    pub fn run_once<E: MutationEngine>(
        &self,
        session: &mut FuzzSession<E>,
        input: &[u8],
        output: &mut [u8],
        call_index: u64,
    ) -> Option<Emission> {
        let outcome = match session.mode() {
            OutputMode::SeparateBuffer => session
                .mutate(input, output)
                .map(|written| output[..written].to_vec()),
            OutputMode::InPlace => {
                let mut working = input.to_vec();
                session
                    .mutate_in_place(&mut working, self.plan.output_capacity)
                    .map(|_| working)
            }
        };

        match outcome {
            Ok(data) => self.plan.filter.selects(call_index).then(|| Emission {
                iteration: session.iteration(),
                seed: session.seed(),
                data,
            }),
            Err(e) => {
                eprintln!("mutation call {call_index} skipped: {e}");
                None
            }
        }
    }
}
