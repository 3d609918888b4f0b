mod chat_completion_refiner;
mod passthrough_refiner;
mod refiner_factory;

pub use chat_completion_refiner::{ChatCompletionRefiner, DEFAULT_EXTRACTION_PROMPT};
pub use passthrough_refiner::PassthroughRefiner;
pub use refiner_factory::{RefinerFactory, RefinerFactoryError};
