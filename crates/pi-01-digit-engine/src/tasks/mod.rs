//! Batch computation tasks

pub mod batch;

pub use batch::BlockBatchTask;
