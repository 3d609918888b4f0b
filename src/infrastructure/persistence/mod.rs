mod file_progress_ledger;
mod in_memory_progress_ledger;

pub use file_progress_ledger::{FileProgressLedger, LEDGER_FILE_NAME};
pub use in_memory_progress_ledger::InMemoryProgressLedger;
