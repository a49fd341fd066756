use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// A `MutationEngine` is the byte-level transformer behind a fuzz session.
///
/// The engine is the external collaborator of this crate: sessions validate
/// arguments and keep iteration state, the engine does the actual fuzzing.
/// Implementations may carry internal PRNG state that advances on every call,
/// but a given engine value must be fully deterministic for a fixed seed and
/// call sequence, since run reproducibility is the whole point of exposing
/// the seed to callers.
pub trait MutationEngine {
    /// Mutates `input` into `output`, writing at most `output.len()` bytes.
    ///
    /// # Arguments
    /// * `input`: The source bytes. Never empty; the session validates that
    ///   before delegating here.
    /// * `output`: The destination buffer. Its length is the capacity; the
    ///   engine truncates oversized results rather than growing the buffer.
    /// * `seed`: The session seed, truncated to 32 bits at this boundary.
    ///
    /// # Returns
    /// The number of bytes written into `output`. Returning 0 means the
    /// engine declined to mutate, which callers treat as a valid empty
    /// result, not an error.
    fn mutate(&mut self, input: &[u8], output: &mut [u8], seed: u32) -> usize;
}

impl<E: MutationEngine + ?Sized> MutationEngine for &mut E {
    fn mutate(&mut self, input: &[u8], output: &mut [u8], seed: u32) -> usize {
        (**self).mutate(input, output, seed)
    }
}

/// Upper bound on how many byte positions a single `ByteNudgeEngine` call edits.
const MAX_NUDGES_PER_CALL: u32 = 4;

/// A small built-in `MutationEngine` that copies the input and nudges a few
/// bytes by adding small random values, with wrapping.
///
/// Each call draws from a fresh ChaCha8 stream keyed by the seed and the
/// engine's own call ordinal, so outputs vary across iterations of a run but
/// are byte-identical across runs and processes for the same seed. This is a
/// reference engine for driving the session and driver; serious fuzzing goes
/// through a real engine such as the `libradamsa` binding.
#[derive(Debug, Default)]
pub struct ByteNudgeEngine {
    calls: u64,
}

impl ByteNudgeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MutationEngine for ByteNudgeEngine {
    fn mutate(&mut self, input: &[u8], output: &mut [u8], seed: u32) -> usize {
        self.calls += 1;
        // Key the stream on (seed, call ordinal) so iteration k of a run is
        // reproducible without replaying iterations 1..k-1 byte-for-byte.
        let mut rng = ChaCha8Rng::seed_from_u64(((seed as u64) << 32) ^ self.calls);

        let written = input.len().min(output.len());
        output[..written].copy_from_slice(&input[..written]);

        let nudges = rng.random_range(1..=MAX_NUDGES_PER_CALL);
        for _ in 0..nudges {
            let index = rng.random_range(0..written);
            let delta = rng.random_range(1u8..=15u8);
            output[index] = output[index].wrapping_add(delta);
        }
        written
    }
}

/// FFI binding to the real libradamsa engine.
#[cfg(feature = "libradamsa")]
pub mod libradamsa {
    use super::MutationEngine;
    use std::sync::Once;

    #[link(name = "radamsa")]
    unsafe extern "C" {
        fn radamsa_init();
        fn radamsa(ptr: *const u8, len: usize, target: *mut u8, max: usize, seed: u32) -> usize;
    }

    /// libradamsa holds process-wide mutable state (PRNG, lookup tables);
    /// `radamsa_init` must run exactly once per process, before any mutate
    /// call, and has no teardown.
    static ENGINE_INIT: Once = Once::new();

    /// `MutationEngine` backed by libradamsa. Not safe to drive from multiple
    /// threads; the engine's global state has no internal synchronization.
    #[derive(Debug, Default)]
    pub struct LibRadamsaEngine;

    impl LibRadamsaEngine {
        pub fn new() -> Self {
            ENGINE_INIT.call_once(|| unsafe { radamsa_init() });
            LibRadamsaEngine
        }
    }

    impl MutationEngine for LibRadamsaEngine {
        fn mutate(&mut self, input: &[u8], output: &mut [u8], seed: u32) -> usize {
            // The only raw-pointer crossing in the crate. Both slices are
            // non-empty here; the session rejects empty buffers up front.
            unsafe {
                radamsa(
                    input.as_ptr(),
                    input.len(),
                    output.as_mut_ptr(),
                    output.len(),
                    seed,
                )
            }
        }
    }
}
