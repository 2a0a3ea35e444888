//! Batch framing.
//!
//! Takes the files and folders the user dropped on the tool, works out which
//! images to frame and where each result goes, then frames them in parallel.
//!
//! ## Inputs
//!
//! ```text
//! easyframe a.jpg holiday/ b.png
//!   a.jpg     → framed as given
//!   holiday/  → every supported image directly inside (not recursive), sorted
//!   b.png     → framed as given
//! ```
//!
//! ## Failure Model
//!
//! Every file stands alone. A file that cannot be read, planned, named, or
//! written becomes a [`ProcessEvent::Failed`] and the rest of the batch carries
//! on. The caller learns the totals from the returned [`BatchReport`].
//!
//! ## Parallel Processing
//!
//! Output names are assigned up front, in input order, so two sources can never
//! race for the same name. Framing then runs on the rayon global pool.

use crate::imaging::{self, BorderColor, ImageBackend, Quality};
use crate::layout::{BorderSpec, Dimensions, FramePlan};
use crate::naming::{self, NamingError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("--output can only be used with a single input, got {0}")]
    OutputWithMultipleInputs(usize),
    #[error(transparent)]
    Naming(#[from] NamingError),
}

/// Everything needed to frame a batch, resolved once before it starts.
#[derive(Debug, Clone)]
pub struct FrameJob {
    pub spec: BorderSpec,
    pub color: BorderColor,
    pub quality: Quality,
    pub output_pattern: String,
    pub overwrite: bool,
    /// Exact output path; only valid for a single input.
    pub output: Option<PathBuf>,
    /// `{timestamp}` value shared by the whole batch.
    pub timestamp: String,
}

/// Progress events emitted during framing.
///
/// Sent through an optional channel so the caller can display progress
/// as files complete. Workers finish in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Framed {
        source: PathBuf,
        output: PathBuf,
        original: Dimensions,
        plan: FramePlan,
    },
    Failed {
        source: PathBuf,
        reason: String,
    },
}

/// A file that could not be framed.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub framed: Vec<PathBuf>,
    pub failed: Vec<Failure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.framed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Inputs expanded into image files, plus paths that could not be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedInputs {
    pub files: Vec<PathBuf>,
    pub missing: Vec<Failure>,
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            imaging::supported_input_extensions().contains(&ext.as_str())
        })
}

/// Expand files and folders into the list of images to frame.
///
/// Files named explicitly are kept whatever their extension, so an unreadable
/// one is reported rather than silently skipped. Folders contribute only their
/// direct children with a supported extension.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<CollectedInputs, ProcessError> {
    let mut collected = CollectedInputs::default();

    for path in paths {
        if path.is_file() {
            collected.files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry?;
                if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                    collected.files.push(entry.into_path());
                }
            }
        } else {
            tracing::warn!("input not found: {}", path.display());
            collected.missing.push(Failure {
                source: path.clone(),
                reason: "not found".into(),
            });
        }
    }

    Ok(collected)
}

/// Pick an output path for every input, in order, never handing out a name twice.
fn assign_outputs(
    inputs: &[PathBuf],
    job: &FrameJob,
) -> Result<Vec<(PathBuf, Result<PathBuf, NamingError>)>, ProcessError> {
    if let Some(output) = &job.output {
        if inputs.len() != 1 {
            return Err(ProcessError::OutputWithMultipleInputs(inputs.len()));
        }
        return Ok(vec![(inputs[0].clone(), Ok(output.clone()))]);
    }

    naming::validate_pattern(&job.output_pattern)?;

    let mut claimed: HashSet<PathBuf> = HashSet::new();
    Ok(inputs
        .iter()
        .map(|source| {
            let output = naming::derive_output_path_with(
                source,
                &job.output_pattern,
                job.overwrite,
                &job.timestamp,
                |p| claimed.contains(p) || p.exists(),
            );
            if let Ok(path) = &output {
                claimed.insert(path.clone());
            }
            (source.clone(), output)
        })
        .collect())
}

fn frame_one(
    backend: &impl ImageBackend,
    source: &Path,
    output: Result<PathBuf, NamingError>,
    job: &FrameJob,
) -> ProcessEvent {
    let fail = |reason: String| {
        tracing::warn!("{}: {reason}", source.display());
        ProcessEvent::Failed {
            source: source.to_path_buf(),
            reason,
        }
    };

    let output = match output {
        Ok(path) => path,
        Err(e) => return fail(e.to_string()),
    };

    match imaging::frame_image(backend, source, &output, &job.spec, job.color, job.quality) {
        Ok((original, plan)) => {
            tracing::info!("framed {} → {}", source.display(), output.display());
            tracing::debug!(
                "{}: {original} resize {:?} borders {}",
                source.display(),
                plan.resize,
                plan.borders
            );
            ProcessEvent::Framed {
                source: source.to_path_buf(),
                output,
                original,
                plan,
            }
        }
        Err(e) => fail(e.to_string()),
    }
}

/// Frame every input on the rayon pool.
///
/// Per-file problems become [`ProcessEvent::Failed`]; only batch-level misuse
/// (an explicit output with several inputs, a malformed pattern) is an `Err`.
pub fn process_batch(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    job: &FrameJob,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let assigned = assign_outputs(inputs, job)?;
    tracing::debug!("framing {} images with {}", assigned.len(), job.spec);

    let results: Vec<ProcessEvent> = assigned
        .into_par_iter()
        .map_with(events, |tx, (source, output)| {
            let event = frame_one(backend, &source, output, job);
            if let Some(tx) = tx {
                tx.send(event.clone()).ok();
            }
            event
        })
        .collect();

    let mut report = BatchReport::default();
    for event in results {
        match event {
            ProcessEvent::Framed { output, .. } => report.framed.push(output),
            ProcessEvent::Failed { source, reason } => {
                report.failed.push(Failure { source, reason })
            }
        }
    }
    Ok(report)
}

/// Identify and plan every input without writing anything.
pub fn plan_batch(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    spec: &BorderSpec,
) -> Vec<(PathBuf, Result<(Dimensions, FramePlan), String>)> {
    inputs
        .par_iter()
        .map(|source| {
            let plan = imaging::plan_frame(backend, source, spec).map_err(|e| e.to_string());
            (source.clone(), plan)
        })
        .collect()
}
