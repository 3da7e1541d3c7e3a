/// Dataset splitter
///
/// Divides each class into train/val/test by ratio and copies the files
/// into `<target_dir>/{train,val,test}/<class>/`.
///
/// - partition.rs: split counts, shuffling and slicing
/// - copy.rs: copy tasks and timestamp-preserving copies
///
/// All destination directories are created up front, before any class is
/// copied. Copy failures are counted and printed, never fatal.

pub mod copy;
pub mod partition;

use std::fs;
use std::path::Path;

use crate::config::SplitConfig;
use crate::dataset::{detect_classes, list_eligible_files, ClassDirectory};
use crate::error::{PrepError, Result};
use crate::pipeline::{bounded_map, class_progress_bar};
use copy::{build_copy_tasks, run_copy_task, split_class_dir};
use partition::{make_rng, Split, SplitAssignment, SplitCounts};

/// Split result for one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSplit {
    pub class_name: String,
    /// Files assigned to each split
    pub counts: SplitCounts,
    /// Copies that failed for this class
    pub failed_copies: usize,
}

/// Split result for the whole dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub classes: Vec<ClassSplit>,
}

impl SplitReport {
    /// Per-split totals over all classes
    pub fn totals(&self) -> SplitCounts {
        let mut totals = SplitCounts::default();
        for class in &self.classes {
            totals += class.counts;
        }
        totals
    }

    pub fn failed_copies(&self) -> usize {
        self.classes.iter().map(|c| c.failed_copies).sum()
    }
}

/// Split every class under `source_dir` into `target_dir`
///
/// Ratios are checked before anything else; a missing source root is
/// reported before any directory is created.
pub fn split_dataset(config: &SplitConfig) -> Result<SplitReport> {
    config.validate()?;

    let classes = detect_classes(&config.source_dir)?;
    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    println!("🔍 Detected classes: {:?}", names);

    create_split_dirs(&config.target_dir, &classes)?;

    let mut rng = make_rng(config.seed);
    let mut results = Vec::with_capacity(classes.len());

    for class in &classes {
        let images = list_eligible_files(&class.path, &config.valid_extensions)?;
        if images.is_empty() {
            results.push(ClassSplit {
                class_name: class.name.clone(),
                counts: SplitCounts::default(),
                failed_copies: 0,
            });
            continue;
        }

        let assignment =
            SplitAssignment::shuffled(images, config.train_ratio, config.val_ratio, &mut rng);
        let tasks = build_copy_tasks(&assignment, &config.target_dir, &class.name);

        println!("📦 Copying {} images of class '{}'...", tasks.len(), class.name);
        let bar = class_progress_bar("Copying", &class.name, tasks.len(), config.show_progress);
        let outcomes = bounded_map(&tasks, run_copy_task, config.max_workers, &bar)?;
        let failed_copies = outcomes.iter().filter(|o| !o.is_success()).count();

        tracing::info!(
            "class {}: {:?}, {} failed copies",
            class.name,
            assignment.counts(),
            failed_copies
        );

        results.push(ClassSplit {
            class_name: class.name.clone(),
            counts: assignment.counts(),
            failed_copies,
        });
    }

    let report = SplitReport { classes: results };
    print_summary(&report);
    Ok(report)
}

/// Create `<target>/<split>/<class>` for every split and class
pub fn create_split_dirs(target_dir: &Path, classes: &[ClassDirectory]) -> Result<()> {
    for split in Split::ALL {
        for class in classes {
            let dir = split_class_dir(target_dir, split, &class.name);
            fs::create_dir_all(&dir).map_err(|e| PrepError::io(&dir, e))?;
        }
    }
    Ok(())
}

fn print_summary(report: &SplitReport) {
    println!("\n{}", "=".repeat(50));
    println!("SPLIT SUMMARY");
    println!("{}", "=".repeat(50));

    for class in &report.classes {
        println!("Class {}: {}", class.class_name, describe_counts(&class.counts));
    }

    let totals = report.totals();
    println!("\nTOTAL: {}", describe_counts(&totals));
    println!("GRAND TOTAL: {} images", totals.total());

    let failed = report.failed_copies();
    if failed > 0 {
        println!("⚠️  {} copies failed (see messages above)", failed);
    }
}

/// "7 train, 2 val, 1 test"
fn describe_counts(counts: &SplitCounts) -> String {
    Split::ALL
        .iter()
        .map(|&split| format!("{} {}", counts.get(split), split.dir_name()))
        .collect::<Vec<_>>()
        .join(", ")
}
