pub mod config;
pub mod driver;
pub mod engine;
pub mod session;

pub use config::ChurnConfig;
pub use driver::{Emission, EmissionFilter, IterationDriver, PlanError, RunPlan};
pub use engine::{ByteNudgeEngine, MutationEngine};
pub use session::{FuzzSession, OutputMode, SessionError};

mod tests {
    #[test]
    fn it_works() {
        let result = 2 + 2;
        assert_eq!(result, 4);
    }
}
