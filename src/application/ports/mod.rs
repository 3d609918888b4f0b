mod batch_store;
mod page_source;
mod progress_ledger;
mod text_refiner;

pub use batch_store::{BatchStore, BatchStoreError};
pub use page_source::{PageSource, PageSourceError};
pub use progress_ledger::{LedgerError, ProgressLedger};
pub use text_refiner::{TextRefiner, TextRefinerError};
