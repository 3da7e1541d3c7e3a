/// Shared parallel processing pipeline
///
/// This module provides:
/// - `Outcome`: success/failure of one item, carried as data
/// - `bounded_map`: run one task per item on a pool sized to the batch
/// - `ProgressObserver`: receives completed/total counts as items finish

pub mod mapper;
pub mod progress;

pub use mapper::{bounded_map, pool_size, Outcome};
pub use progress::{class_progress_bar, NoProgress, ProgressObserver};
