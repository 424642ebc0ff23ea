pub mod evaluation;

pub use evaluation::{evaluate, Transition, TransitionKind};
