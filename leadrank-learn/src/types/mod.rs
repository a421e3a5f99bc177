//! Types for leadrank-learn

mod feedback;
mod weights;

pub use feedback::*;
pub use weights::*;
