pub mod store;
pub mod text;
pub mod wfdb;

pub use store::{load_all, LoadFailure, LoadReport, RecordStore, WfdbStore};
