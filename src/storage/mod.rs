pub mod snapshot;

pub use snapshot::{RecoverStats, SnapshotStore};
