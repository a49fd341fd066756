use crate::engine::MutationEngine;
use thiserror::Error;

/// Errors a `FuzzSession` can report for a single mutate call.
///
/// Both kinds are recoverable at the caller: the iteration driver logs them
/// and moves on to the next call. Engine-side shortfalls are not errors at
/// this layer; an engine that writes nothing produced a valid empty result.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The input buffer was empty; the engine was not invoked.
    #[error("input buffer has no data")]
    EmptyInput,
    /// The output buffer had zero capacity; the engine was not invoked.
    #[error("output buffer has 0 capacity")]
    EmptyOutput,
}

/// Where a session writes its mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Mutations land in a caller-supplied output buffer, the input is untouched.
    #[default]
    SeparateBuffer,
    /// Mutations overwrite the caller's buffer with the mutation of its
    /// previous contents.
    InPlace,
}

/// A `FuzzSession` owns the state for one bounded run of mutate calls.
///
/// It validates buffer arguments, keeps the iteration counter, and delegates
/// the actual transformation to its `MutationEngine`. The seed is fixed at
/// construction and handed to the engine on every call, so a session's output
/// depends only on the seed, the inputs, and the engine's call sequence.
///
/// Sessions hold nothing beyond their own fields; dropping one needs no
/// teardown.
pub struct FuzzSession<E: MutationEngine> {
    engine: E,
    seed: i64,
    mode: OutputMode,
    iteration: u64,
    scratch: Vec<u8>,
}

impl<E: MutationEngine> FuzzSession<E> {
    pub fn new(engine: E, seed: i64, mode: OutputMode) -> Self {
        Self {
            engine,
            seed,
            mode,
            iteration: 0,
            scratch: Vec::new(),
        }
    }

    /// The configured PRNG seed, fixed for the session's lifetime.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// The configured output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// How many mutate calls this session has seen, validation failures
    /// included. Callers use this to tag results with the iteration that
    /// produced them.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Mutates `input` into `output`, returning the number of bytes written.
    ///
    /// Validation order is fixed: an empty input fails with
    /// [`SessionError::EmptyInput`], then a zero-capacity output fails with
    /// [`SessionError::EmptyOutput`]. Neither failure reaches the engine, but
    /// both still count against [`iteration`](Self::iteration).
    ///
    /// A return of `Ok(0)` means the engine declined to mutate; that is a
    /// valid empty result.
    pub fn mutate(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, SessionError> {
        self.iteration += 1;
        if input.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        if output.is_empty() {
            return Err(SessionError::EmptyOutput);
        }
        Ok(self.engine.mutate(input, output, self.seed as u32))
    }

    /// Mutates `buffer` in place: after a successful call it holds the
    /// mutation of its previous contents, truncated to the written length.
    ///
    /// `capacity` bounds the mutation size exactly like the output buffer
    /// length does for [`mutate`](Self::mutate). The previous contents are
    /// snapshotted into a session-owned scratch buffer first, which keeps
    /// the engine contract a plain non-aliasing `(input, output)` pair.
    pub fn mutate_in_place(
        &mut self,
        buffer: &mut Vec<u8>,
        capacity: usize,
    ) -> Result<usize, SessionError> {
        self.iteration += 1;
        if buffer.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        if capacity == 0 {
            return Err(SessionError::EmptyOutput);
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(buffer);
        buffer.resize(capacity, 0);
        let written = self
            .engine
            .mutate(&self.scratch, &mut buffer[..capacity], self.seed as u32);
        buffer.truncate(written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_utils::{CountingEngine, ReverseEngine};

    #[test]
    fn iteration_counts_every_call_including_validation_failures() {
        let engine = CountingEngine::with_payload(vec![1, 2, 3]);
        let mut session = FuzzSession::new(engine, 99, OutputMode::SeparateBuffer);
        let input = vec![0xAB; 4];
        let mut output = vec![0u8; 16];

        assert!(session.mutate(&input, &mut output).is_ok());
        assert!(session.mutate(&input, &mut output).is_ok());
        assert!(session.mutate(&[], &mut output).is_err());
        assert!(session.mutate(&input, &mut []).is_err());

        assert_eq!(
            session.iteration(),
            4,
            "Every mutate call must count, whether it passed validation or not"
        );
    }

    #[test]
    fn empty_input_fails_without_reaching_the_engine() {
        let engine = CountingEngine::with_payload(vec![7]);
        let mut session = FuzzSession::new(engine, 0, OutputMode::SeparateBuffer);
        let mut output = vec![0u8; 8];

        let result = session.mutate(&[], &mut output);
        assert_eq!(result, Err(SessionError::EmptyInput));
        assert_eq!(session.iteration(), 1);
    }

    #[test]
    fn empty_output_fails_without_reaching_the_engine() {
        let engine = CountingEngine::with_payload(vec![7]);
        let mut session = FuzzSession::new(engine, 0, OutputMode::SeparateBuffer);

        let result = session.mutate(&[1, 2, 3], &mut []);
        assert_eq!(result, Err(SessionError::EmptyOutput));
        assert_eq!(session.iteration(), 1);
    }

    #[test]
    fn empty_input_wins_when_both_buffers_are_empty() {
        let engine = CountingEngine::with_payload(vec![]);
        let mut session = FuzzSession::new(engine, 0, OutputMode::SeparateBuffer);

        let result = session.mutate(&[], &mut []);
        assert_eq!(
            result,
            Err(SessionError::EmptyInput),
            "Input validation is checked before output validation"
        );
    }

    #[test]
    fn validation_failures_never_invoke_the_engine() {
        let mut engine = CountingEngine::with_payload(vec![1]);
        let mut output = vec![0u8; 8];
        {
            let mut session = FuzzSession::new(&mut engine, 0, OutputMode::SeparateBuffer);
            let _ = session.mutate(&[], &mut output);
            let _ = session.mutate(&[1], &mut []);
            let written = session.mutate(&[9, 9], &mut output).unwrap();
            assert_eq!(written, 1);
            assert_eq!(session.iteration(), 3);
        }
        assert_eq!(
            engine.calls, 1,
            "Only the single validated call may reach the engine"
        );
    }

    #[test]
    fn engine_writing_zero_bytes_is_a_valid_empty_result() {
        let engine = CountingEngine::with_payload(Vec::new());
        let mut session = FuzzSession::new(engine, 5, OutputMode::SeparateBuffer);
        let mut output = vec![0u8; 8];

        let written = session.mutate(&[1, 2, 3], &mut output).unwrap();
        assert_eq!(written, 0, "A declined mutation is Ok(0), not an error");
    }

    #[test]
    fn seed_accessor_returns_configured_seed_and_engine_sees_truncation() {
        let mut engine = CountingEngine::with_payload(vec![1]);
        let mut output = vec![0u8; 4];
        {
            let mut session = FuzzSession::new(&mut engine, -1, OutputMode::SeparateBuffer);
            assert_eq!(session.seed(), -1);
            session.mutate(&[1], &mut output).unwrap();
        }
        // The engine boundary is 32-bit; -1 truncates to u32::MAX.
        assert_eq!(engine.last_seed, Some(u32::MAX));
    }

    #[test]
    fn mutate_in_place_overwrites_the_callers_buffer() {
        let mut session = FuzzSession::new(ReverseEngine, 3, OutputMode::InPlace);
        let mut buffer = vec![1u8, 2, 3, 4];

        let written = session.mutate_in_place(&mut buffer, 16).unwrap();
        assert_eq!(written, 4);
        assert_eq!(
            buffer,
            vec![4u8, 3, 2, 1],
            "The buffer must now hold the mutation of its previous contents"
        );
    }

    #[test]
    fn mutate_in_place_truncates_to_capacity() {
        let mut session = FuzzSession::new(ReverseEngine, 3, OutputMode::InPlace);
        let mut buffer = vec![1u8, 2, 3, 4, 5, 6];

        let written = session.mutate_in_place(&mut buffer, 2).unwrap();
        assert_eq!(written, 2);
        assert_eq!(buffer, vec![6u8, 5]);
    }

    #[test]
    fn mutate_in_place_validates_like_the_separate_buffer_path() {
        let mut session = FuzzSession::new(ReverseEngine, 0, OutputMode::InPlace);

        let mut empty = Vec::new();
        assert_eq!(
            session.mutate_in_place(&mut empty, 8),
            Err(SessionError::EmptyInput)
        );

        let mut buffer = vec![1u8, 2];
        assert_eq!(
            session.mutate_in_place(&mut buffer, 0),
            Err(SessionError::EmptyOutput)
        );
        assert_eq!(buffer, vec![1u8, 2], "A failed call must not touch the buffer");
        assert_eq!(session.iteration(), 2);
    }
}
