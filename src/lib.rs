/// Dataset preparation for image classification
///
/// Two independent pipelines over a `<root>/<class>/<images>` tree:
/// - `normalize`: resize, grayscale and intensity-stretch every image
/// - `split`: divide each class into train/val/test by ratio
///
/// Both process classes one at a time and the files of a class in
/// parallel through `pipeline::bounded_map`.

pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod split;

pub use config::{NormalizeConfig, SplitConfig, TargetSize};
pub use error::{PrepError, Result};
pub use normalize::{normalize_class, process_dataset, ClassReport, DatasetReport};
pub use pipeline::{bounded_map, Outcome};
pub use split::{split_dataset, ClassSplit, SplitReport};
