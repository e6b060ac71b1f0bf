pub mod blob_store;
pub mod queue;
pub mod topic;
