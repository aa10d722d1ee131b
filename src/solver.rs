//! Level-K reasoning over sequential games

pub mod level_k;
pub mod policy;
pub mod softmax;

pub use level_k::{DEFAULT_MAX_PLY, LevelKSolver};
pub use policy::{Policy, PolicyProfile, PolicyTable, ProfileExport};
pub use softmax::{softmax, softmax_expectation, uniform};
