mod markdown_batch_store;

pub use markdown_batch_store::MarkdownBatchStore;
