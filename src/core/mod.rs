pub mod classify;
pub mod engine;
pub mod extract;
pub mod modality;
pub mod pipeline;

pub use crate::domain::model::{Category, Issue, Modality, Priority, Submission};
pub use crate::domain::ports::Pipeline;
pub use crate::utils::error::Result;
