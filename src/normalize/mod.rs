/// Image normalizer
///
/// This module handles:
/// - Resizing every class image to a fixed resolution (processor.rs)
/// - Grayscale conversion and intensity stretch (intensity.rs)
/// - Per-class parallel processing and the dataset-level report
/// - Writing the error log when any image failed
///
/// Classes are processed one after another; the images of one class
/// are processed in parallel.

pub mod intensity;
pub mod processor;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::NormalizeConfig;
use crate::dataset::{detect_classes, list_eligible_files};
use crate::error::{PrepError, Result};
use crate::pipeline::{bounded_map, class_progress_bar, Outcome};
use processor::{process_record, ImageRecord};

/// File (inside the output root) that lists every failed image
pub const ERROR_LOG_NAME: &str = "errores_procesamiento.txt";

/// How many errors are printed per class before truncating
const ERRORS_SHOWN_PER_CLASS: usize = 3;

/// Result of normalizing one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    pub class_name: String,
    pub successful: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

/// Result of normalizing the whole dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReport {
    pub classes: Vec<ClassReport>,
    pub total_processed: usize,
    pub total_images: usize,
    pub errors: Vec<String>,
    /// Set when errors were written to disk
    pub error_log: Option<PathBuf>,
}

impl DatasetReport {
    /// Percentage of images processed successfully, None when there were none
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_images == 0 {
            return None;
        }
        Some(self.total_processed as f64 / self.total_images as f64 * 100.0)
    }
}

/// Normalize every eligible image of one class
///
/// Reads `<dataset_dir>/<class_name>` and writes `<output_dir>/<class_name>`.
/// The output class directory is created even when the class is empty.
pub fn normalize_class(config: &NormalizeConfig, class_name: &str) -> Result<ClassReport> {
    let input_path = config.dataset_dir.join(class_name);
    let output_path = config.output_dir.join(class_name);
    fs::create_dir_all(&output_path).map_err(|e| PrepError::io(&output_path, e))?;

    let images = list_eligible_files(&input_path, &config.valid_extensions)?;
    if images.is_empty() {
        return Ok(ClassReport {
            class_name: class_name.to_string(),
            successful: 0,
            total: 0,
            errors: Vec::new(),
        });
    }

    let records: Vec<ImageRecord> = images
        .iter()
        .map(|img| ImageRecord::new(img, &output_path))
        .collect();

    let tasks: Vec<(&ImageRecord, Option<&str>)> = records
        .iter()
        .zip(first_producers(&records))
        .collect();

    let bar = class_progress_bar("Processing", class_name, records.len(), config.show_progress);
    let size = config.target_size;
    let outcomes = bounded_map(
        &tasks,
        |&(record, producer)| match producer {
            Some(other) => Outcome::Failure(format!(
                "{}: output {} already produced by {}",
                record.name,
                record.output.display(),
                other
            )),
            None => process_record(record, size),
        },
        config.max_workers,
        &bar,
    )?;

    let successful = outcomes.iter().filter(|o| o.is_success()).count();
    let errors: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.error().map(str::to_string))
        .collect();

    tracing::info!(
        "class {}: {}/{} images normalized",
        class_name,
        successful,
        records.len()
    );

    Ok(ClassReport {
        class_name: class_name.to_string(),
        successful,
        total: records.len(),
        errors,
    })
}

/// For each record, the name of an earlier record with the same output path
///
/// `a.png` and `a.PNG` (or `a.jpg`) both map to `a.png`; only the first
/// one is processed so no two tasks write the same file.
fn first_producers(records: &[ImageRecord]) -> Vec<Option<&str>> {
    let mut seen: HashMap<&Path, &str> = HashMap::with_capacity(records.len());
    records
        .iter()
        .map(|record| match seen.get(record.output.as_path()) {
            Some(&other) => Some(other),
            None => {
                seen.insert(record.output.as_path(), &record.name);
                None
            }
        })
        .collect()
}

/// Normalize every class under `dataset_dir` and print a summary
///
/// Fails without touching the output when the input root is missing.
pub fn process_dataset(config: &NormalizeConfig) -> Result<DatasetReport> {
    config.validate()?;

    let classes = detect_classes(&config.dataset_dir)?;
    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    println!("🔍 Detected classes: {:?}", names);
    println!("🖥️  Available CPUs: {}", num_cpus::get());
    println!("⏳ Processing {} classes...\n", classes.len());

    fs::create_dir_all(&config.output_dir).map_err(|e| PrepError::io(&config.output_dir, e))?;

    let mut reports = Vec::with_capacity(classes.len());
    let mut total_processed = 0;
    let mut total_images = 0;
    let mut all_errors = Vec::new();

    for class in &classes {
        let report = normalize_class(config, &class.name)?;
        print_class_report(&report);

        total_processed += report.successful;
        total_images += report.total;
        all_errors.extend(report.errors.iter().cloned());
        reports.push(report);
    }

    let error_log = if all_errors.is_empty() {
        None
    } else {
        Some(write_error_log(&config.output_dir, &all_errors)?)
    };

    let report = DatasetReport {
        classes: reports,
        total_processed,
        total_images,
        errors: all_errors,
        error_log,
    };
    print_summary(&report);

    Ok(report)
}

/// Write one error per line to `<output_dir>/errores_procesamiento.txt`
pub fn write_error_log(output_dir: &Path, errors: &[String]) -> Result<PathBuf> {
    let path = output_dir.join(ERROR_LOG_NAME);
    let mut contents = String::new();
    for error in errors {
        contents.push_str(error);
        contents.push('\n');
    }
    fs::write(&path, contents).map_err(|e| PrepError::io(&path, e))?;
    Ok(path)
}

fn print_class_report(report: &ClassReport) {
    println!(
        "📁 Class {}: {}/{} images processed",
        report.class_name, report.successful, report.total
    );

    if report.errors.is_empty() {
        return;
    }

    println!("  ⚠️  Errors in {}: {}", report.class_name, report.errors.len());
    for error in report.errors.iter().take(ERRORS_SHOWN_PER_CLASS) {
        println!("    - {}", error);
    }
    if report.errors.len() > ERRORS_SHOWN_PER_CLASS {
        println!(
            "    ... and {} more",
            report.errors.len() - ERRORS_SHOWN_PER_CLASS
        );
    }
}

fn print_summary(report: &DatasetReport) {
    println!("\n{}", "=".repeat(60));
    println!("FINAL SUMMARY");
    println!("{}", "=".repeat(60));
    println!(
        "Images processed successfully: {}/{}",
        report.total_processed, report.total_images
    );
    match report.success_rate() {
        Some(rate) => println!("Success rate: {:.2}%", rate),
        None => println!("Success rate: n/a (no images found)"),
    }

    if let Some(log) = &report.error_log {
        println!("\n❌ Total errors: {}", report.errors.len());
        println!("Error details saved to: {}", log.display());
    }

    println!("\n✅ Cleaning and normalization complete!");
}
