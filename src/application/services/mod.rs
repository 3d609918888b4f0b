mod aggregation_service;
mod batch_orchestrator;
mod range_extraction_service;

pub use aggregation_service::{AggregationError, AggregationService, AggregationSummary};
pub use batch_orchestrator::{BatchOrchestrator, OrchestratorError};
pub use range_extraction_service::{RangeExtractionError, RangeExtractionService};
