//! Task records and the shared task store
//!
//! A [`TaskRecord`] holds the lifecycle state of one download. The
//! [`TaskStore`] maps task ids to records behind a single lock and is shared
//! between request handlers, download workers and the retention sweep.

mod record;
mod store;

pub use record::TaskRecord;
pub use store::TaskStore;
