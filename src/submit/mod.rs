pub mod client;
pub mod summary;

pub use client::{data_value_sets_url, SubmitError, Submitter};
pub use summary::{Conflict, ImportCount, ImportSummary};
