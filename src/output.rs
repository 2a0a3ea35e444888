//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each framed image leads with its file name and where the result went;
//! the geometry follows as indented context lines. Failures carry the
//! reason on the same line so a long batch can be scanned quickly.
//!
//! # Output Format
//!
//! ## Frame
//!
//! ```text
//! beach.jpg → beach_processed.jpg
//!     1000x500 → resize 1064x532 → border 8/274/8/274 → 1080x1080
//! FAILED notes.jpg: Failed to decode /photos/notes.jpg: ...
//!
//! Framed 1 of 2 images, 1 failed
//! ```
//!
//! ## Plan
//!
//! ```text
//! beach.jpg
//!     1000x500 → resize 1064x532 → border 8/274/8/274 → 1080x1080
//! ```
//!
//! ## Profiles
//!
//! ```text
//! * basic_profile (active)
//!   instagram
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::layout::{Dimensions, FramePlan};
use crate::process::{BatchReport, ProcessEvent};
use crate::profile::Profile;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for display, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-line geometry summary: original → resize → border → final.
///
/// ```text
/// 800x600 → border 10/30/10/30 → 820x660
/// 1000x500 → resize 1064x532 → border 8/274/8/274 → 1080x1080
/// 3000x2000 → resize 1080x720
/// ```
fn plan_line(original: Dimensions, plan: &FramePlan) -> String {
    let mut parts = vec![original.to_string()];
    if let Some(resize) = plan.resize {
        parts.push(format!("resize {resize}"));
    }
    if !plan.borders.is_zero() {
        parts.push(format!("border {}", plan.borders));
        parts.push(plan.final_dimensions(original).to_string());
    }
    parts.join(" → ")
}

// ============================================================================
// Frame
// ============================================================================

/// Format a single frame progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Framed {
            source,
            output,
            original,
            plan,
        } => {
            let target = if source == output {
                "(overwritten)".to_string()
            } else {
                display_name(output)
            };
            vec![
                format!("{} → {}", display_name(source), target),
                format!("{}{}", indent(1), plan_line(*original, plan)),
            ]
        }
        ProcessEvent::Failed { source, reason } => {
            vec![format!("FAILED {}: {}", display_name(source), reason)]
        }
    }
}

/// Closing summary for a batch.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let total = report.total();
    let noun = if total == 1 { "image" } else { "images" };
    if report.failed.is_empty() {
        vec![format!("Framed {total} {noun}")]
    } else {
        vec![format!(
            "Framed {} of {total} {noun}, {} failed",
            report.framed.len(),
            report.failed.len()
        )]
    }
}

pub fn print_summary(report: &BatchReport) {
    println!();
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format the dry-run result for one file.
pub fn format_plan(source: &Path, result: &Result<(Dimensions, FramePlan), String>) -> Vec<String> {
    match result {
        Ok((original, plan)) => vec![
            display_name(source),
            format!("{}{}", indent(1), plan_line(*original, plan)),
        ],
        Err(reason) => vec![format!("FAILED {}: {}", display_name(source), reason)],
    }
}

pub fn print_plans(plans: &[(std::path::PathBuf, Result<(Dimensions, FramePlan), String>)]) {
    for (source, result) in plans {
        for line in format_plan(source, result) {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Profile names, the active one starred.
pub fn format_profile_list(names: &[String], active: &str) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            if name == active {
                format!("* {name} (active)")
            } else {
                format!("  {name}")
            }
        })
        .collect()
}

pub fn print_profile_list(names: &[String], active: &str) {
    for line in format_profile_list(names, active) {
        println!("{}", line);
    }
}

/// Human-readable view of one profile.
///
/// ```text
/// basic_profile
///     Mode: border_size
///     Border size: 5%
///     Color: 255,255,255
///     Output: {filename}_processed.{ext}
/// ```
pub fn format_profile(name: &str, profile: &Profile) -> Vec<String> {
    use crate::profile::Mode;

    let mut lines = vec![name.to_string(), format!("{}Mode: {}", indent(1), profile.mode)];
    match profile.mode {
        Mode::BorderSize => lines.push(format!(
            "{}Border size: {}",
            indent(1),
            profile
                .border_size
                .as_ref()
                .map_or("(missing)".to_string(), ToString::to_string)
        )),
        Mode::OutputSize => {
            lines.push(format!(
                "{}Output size: {}",
                indent(1),
                profile
                    .output_size
                    .as_ref()
                    .map_or("(missing)".to_string(), ToString::to_string)
            ));
            lines.push(format!("{}Min border: {}", indent(1), profile.min_border));
        }
    }
    lines.push(format!("{}Color: {}", indent(1), profile.border_color));
    lines.push(format!("{}Output: {}", indent(1), profile.output_pattern));
    if profile.overwrite {
        lines.push(format!("{}Overwrite: yes", indent(1)));
    }
    lines.push(format!("{}Quality: {}", indent(1), profile.quality));
    lines
}

pub fn print_profile(name: &str, profile: &Profile) {
    for line in format_profile(name, profile) {
        println!("{}", line);
    }
}
