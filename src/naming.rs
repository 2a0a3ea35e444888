//! Output file naming.
//!
//! A profile's `output_pattern` names the framed file relative to its source.
//! Placeholders are expanded per file:
//!
//! | Placeholder | Value for `/photos/IMG_0042.JPG` |
//! |---|---|
//! | `{filename}` | `IMG_0042` |
//! | `{ext}` | `JPG` |
//! | `{timestamp}` | `20240314_091500` (UTC, one stamp per batch) |
//!
//! The result always lands next to the source. An existing file is never
//! replaced unless overwriting is enabled: `_1`, `_2`, … is inserted before
//! the extension until the name is free.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NamingError {
    #[error("Invalid output pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Output pattern would overwrite the source {0}; enable overwrite to allow this")]
    WouldOverwrite(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Placeholder {
    Filename,
    Ext,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Field(Placeholder),
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, NamingError> {
    let invalid = |reason: String| NamingError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        let Some(open) = rest.find(['{', '}']) else {
            segments.push(Segment::Literal(rest));
            break;
        };
        if rest.as_bytes()[open] == b'}' {
            return Err(invalid("unmatched '}'".into()));
        }
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| invalid("unclosed '{'".into()))?;
        let field = match &after[..close] {
            "filename" => Placeholder::Filename,
            "ext" => Placeholder::Ext,
            "timestamp" => Placeholder::Timestamp,
            other => return Err(invalid(format!("unknown placeholder {{{other}}}"))),
        };
        segments.push(Segment::Field(field));
        rest = &after[close + 1..];
    }
    Ok(segments)
}

/// Check a pattern without expanding it.
pub fn validate_pattern(pattern: &str) -> Result<(), NamingError> {
    parse_pattern(pattern).map(|_| ())
}

/// Expand `pattern` into a bare file name for `input`.
pub fn expand_pattern(input: &Path, pattern: &str, timestamp: &str) -> Result<String, NamingError> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let mut name = String::new();
    for segment in parse_pattern(pattern)? {
        match segment {
            Segment::Literal(text) => name.push_str(text),
            Segment::Field(Placeholder::Filename) => name.push_str(&stem),
            Segment::Field(Placeholder::Ext) => name.push_str(&ext),
            Segment::Field(Placeholder::Timestamp) => name.push_str(timestamp),
        }
    }

    let invalid = |reason: &str| NamingError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    if name.trim().is_empty() || name == "." || name == ".." {
        return Err(invalid("expands to an empty file name"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("must name a file, not a path"));
    }
    Ok(name)
}

/// `photo.jpg` → `photo_<n>.jpg`.
fn with_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    path.with_file_name(name)
}

/// Where the framed version of `input` is written.
///
/// Existing files are detected with [`Path::exists`].
pub fn derive_output_path(
    input: &Path,
    pattern: &str,
    overwrite: bool,
    timestamp: &str,
) -> Result<PathBuf, NamingError> {
    derive_output_path_with(input, pattern, overwrite, timestamp, |p| p.exists())
}

/// [`derive_output_path`] with a caller-supplied "is this name taken" check,
/// so a batch can also avoid names it has already handed out.
pub fn derive_output_path_with(
    input: &Path,
    pattern: &str,
    overwrite: bool,
    timestamp: &str,
    is_taken: impl Fn(&Path) -> bool,
) -> Result<PathBuf, NamingError> {
    if overwrite {
        return Ok(input.to_path_buf());
    }

    let name = expand_pattern(input, pattern, timestamp)?;
    let candidate = input.with_file_name(name);
    if candidate == input {
        return Err(NamingError::WouldOverwrite(input.to_path_buf()));
    }
    if !is_taken(&candidate) {
        return Ok(candidate);
    }

    let mut n = 1;
    loop {
        let next = with_suffix(&candidate, n);
        if next != input && !is_taken(&next) {
            return Ok(next);
        }
        n += 1;
    }
}

// =========================================================================
// Timestamps
// =========================================================================

/// `YYYYMMDD_HHMMSS` in UTC.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    const STAMP: &str = "20240314_091500";

    fn never_taken(_: &Path) -> bool {
        false
    }

    // =========================================================================
    // Pattern expansion
    // =========================================================================

    #[test]
    fn default_pattern() {
        let out = derive_output_path_with(
            Path::new("/photos/beach.jpg"),
            "{filename}_processed.{ext}",
            false,
            STAMP,
            never_taken,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/photos/beach_processed.jpg"));
    }

    #[test]
    fn all_placeholders() {
        let name = expand_pattern(
            Path::new("IMG_0042.JPG"),
            "{timestamp}-{filename}.{ext}",
            STAMP,
        )
        .unwrap();
        assert_eq!(name, "20240314_091500-IMG_0042.JPG");
    }

    #[test]
    fn pattern_can_change_format() {
        let name = expand_pattern(Path::new("scan.tiff"), "{filename}.png", STAMP).unwrap();
        assert_eq!(name, "scan.png");
    }

    #[test]
    fn literal_only_pattern() {
        let name = expand_pattern(Path::new("a.jpg"), "framed.jpg", STAMP).unwrap();
        assert_eq!(name, "framed.jpg");
    }

    #[test]
    fn stem_keeps_inner_dots() {
        let name = expand_pattern(Path::new("my.trip.png"), "{filename}_f.{ext}", STAMP).unwrap();
        assert_eq!(name, "my.trip_f.png");
    }

    #[test]
    fn bad_patterns_rejected() {
        for bad in [
            "{name}.jpg",
            "{filename.jpg",
            "filename}.jpg",
            "{}.jpg",
            "sub/{filename}.{ext}",
            "..\\{filename}.{ext}",
            "",
            "   ",
            "..",
        ] {
            let result = expand_pattern(Path::new("a.jpg"), bad, STAMP);
            assert!(
                matches!(result, Err(NamingError::InvalidPattern { .. })),
                "{bad:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn validate_pattern_checks_syntax_only() {
        assert!(validate_pattern("{filename}_x.{ext}").is_ok());
        assert!(validate_pattern("{size}").is_err());
    }

    // =========================================================================
    // Overwrite and collisions
    // =========================================================================

    #[test]
    fn overwrite_returns_input() {
        let input = Path::new("/photos/beach.jpg");
        let out = derive_output_path_with(input, "{filename}_x.{ext}", true, STAMP, |_| true)
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn identity_pattern_without_overwrite_is_error() {
        let result = derive_output_path_with(
            Path::new("/photos/beach.jpg"),
            "{filename}.{ext}",
            false,
            STAMP,
            never_taken,
        );
        assert!(matches!(result, Err(NamingError::WouldOverwrite(_))));
    }

    #[test]
    fn collision_appends_counter() {
        let taken: HashSet<PathBuf> = [
            PathBuf::from("/p/beach_processed.jpg"),
            PathBuf::from("/p/beach_processed_1.jpg"),
        ]
        .into_iter()
        .collect();

        let out = derive_output_path_with(
            Path::new("/p/beach.jpg"),
            "{filename}_processed.{ext}",
            false,
            STAMP,
            |p| taken.contains(p),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/p/beach_processed_2.jpg"));
    }

    #[test]
    fn collision_uses_real_filesystem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("a.jpg");
        std::fs::write(tmp.path().join("a_processed.jpg"), b"x").unwrap();

        let out = derive_output_path(&input, "{filename}_processed.{ext}", false, STAMP).unwrap();
        assert_eq!(out, tmp.path().join("a_processed_1.jpg"));
    }

    // =========================================================================
    // Timestamps
    // =========================================================================

    #[test]
    fn timestamp_epoch() {
        let t = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(t), "19700101_000000");
    }

    #[test]
    fn timestamp_known_instant() {
        let t = Utc.with_ymd_and_hms(2024, 3, 14, 9, 15, 0).unwrap();
        assert_eq!(format_timestamp(t), "20240314_091500");
    }

    #[test]
    fn timestamp_leap_day() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(format_timestamp(t), "20240229_235959");
    }
}
