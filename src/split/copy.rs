/// File copy tasks for the splitter
///
/// Copies keep the original file name and try to keep the source
/// access/modification times. Failing to restore timestamps is not an
/// error; failing to copy the bytes is.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use super::partition::{Split, SplitAssignment};
use crate::dataset::display_name;
use crate::pipeline::Outcome;

/// One file copy: `source` -> `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// `<target_dir>/<split>/<class_name>`
pub fn split_class_dir(target_dir: &Path, split: Split, class_name: &str) -> PathBuf {
    target_dir.join(split.dir_name()).join(class_name)
}

/// One task per (file, split) pair, destination `<target>/<split>/<class>/<file name>`
pub fn build_copy_tasks(
    assignment: &SplitAssignment,
    target_dir: &Path,
    class_name: &str,
) -> Vec<CopyTask> {
    let mut tasks = Vec::with_capacity(assignment.counts().total());
    for split in Split::ALL {
        let dest_dir = split_class_dir(target_dir, split, class_name);
        for source in assignment.files(split) {
            tasks.push(CopyTask {
                source: source.clone(),
                destination: dest_dir.join(source.file_name().unwrap_or_default()),
            });
        }
    }
    tasks
}

/// Copy bytes, then carry over timestamps where the platform allows
pub fn copy_preserving_times(source: &Path, destination: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, destination)?;

    if let Err(e) = copy_times(source, destination) {
        tracing::debug!(
            "could not preserve timestamps on {}: {}",
            destination.display(),
            e
        );
    }

    Ok(bytes)
}

fn copy_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);

    let dest = File::options().write(true).open(destination)?;
    dest.set_times(times)
}

/// Worker entry point: never fails, reports errors as data
pub fn run_copy_task(task: &CopyTask) -> Outcome {
    match copy_preserving_times(&task.source, &task.destination) {
        Ok(_) => Outcome::Success,
        Err(e) => {
            eprintln!("⚠️  Error copying {}: {}", task.source.display(), e);
            tracing::warn!("copy failed {} -> {}: {}", task.source.display(), task.destination.display(), e);
            Outcome::Failure(format!("{}: {}", display_name(&task.source), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_build_copy_tasks() {
        let assignment = SplitAssignment {
            train: vec![PathBuf::from("/src/cat/a.png"), PathBuf::from("/src/cat/b.PNG")],
            val: vec![PathBuf::from("/src/cat/c.png")],
            test: Vec::new(),
        };

        let tasks = build_copy_tasks(&assignment, Path::new("/dst"), "cat");

        assert_eq!(
            tasks,
            vec![
                CopyTask {
                    source: PathBuf::from("/src/cat/a.png"),
                    destination: PathBuf::from("/dst/train/cat/a.png"),
                },
                CopyTask {
                    source: PathBuf::from("/src/cat/b.PNG"),
                    destination: PathBuf::from("/dst/train/cat/b.PNG"),
                },
                CopyTask {
                    source: PathBuf::from("/src/cat/c.png"),
                    destination: PathBuf::from("/dst/val/cat/c.png"),
                },
            ]
        );
    }

    #[test]
    fn test_copy_keeps_bytes_and_mtime() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let destination = dir.path().join("b.png");
        fs::write(&source, b"\x89PNG fake payload").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let outcome = run_copy_task(&CopyTask {
            source: source.clone(),
            destination: destination.clone(),
        });

        assert!(outcome.is_success());
        assert_eq!(fs::read(&source).unwrap(), fs::read(&destination).unwrap());
        assert_eq!(fs::metadata(&destination).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn test_missing_source_is_failure() {
        let dir = TempDir::new().unwrap();
        let outcome = run_copy_task(&CopyTask {
            source: dir.path().join("ghost.png"),
            destination: dir.path().join("out.png"),
        });

        assert!(outcome.error().unwrap().starts_with("ghost.png: "));
    }
}
