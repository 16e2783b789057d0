//! Batch processing of every document in a working directory.
//!
//! A batch run applies one tag pattern to each document in turn. The file
//! being processed travels with each [`Tag`](crate::Tag) as a
//! [`CurrentFile`], so diagnostics are prefixed with its name without any
//! shared state to set or reset.

mod scanner;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::tag::{CurrentFile, Tag, replace_all};

use scanner::Scanner;

/// Default log message for a batch run.
pub const DEFAULT_LOG_MESSAGE: &str = "Applying preprocessor";

/// Counts from a completed batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents read and substituted.
    pub files_scanned: usize,
    /// Documents written back to disk.
    pub files_rewritten: usize,
}

/// Batch processing error.
///
/// Tag-level failures never reach here; I/O failures abort the run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Apply `replacer` to every tag in every document under `working_dir`.
///
/// Documents are files whose extension is listed in `extensions`, visited in
/// a stable order. Each file is read whole, substituted in memory and written
/// back only if the result is non-empty and differs from the original. An
/// empty result leaves the file untouched.
///
/// `replacer` is expected to handle its own failures, typically by being
/// wrapped with [`allow_fail`](crate::allow_fail).
///
/// # Errors
///
/// Returns [`BatchError::Io`] on the first file or directory that can't be
/// read or written. Files processed before the failure keep their changes.
pub fn process_tags_for_all_files<F>(
    working_dir: &Path,
    extensions: &[String],
    pattern: &Regex,
    log_message: &str,
    mut replacer: F,
) -> Result<BatchSummary, BatchError>
where
    F: FnMut(&Tag<'_>) -> String,
{
    tracing::info!("{log_message}");

    let files = Scanner::new(working_dir, extensions).scan()?;
    let mut summary = BatchSummary::default();

    for path in files {
        let name = relative_name(working_dir, &path);
        let content = fs::read_to_string(&path).map_err(|e| BatchError::io(&path, e))?;

        let file = CurrentFile {
            name: &name,
            path: &path,
        };
        let processed = replace_all(pattern, &content, Some(file), &mut replacer);
        summary.files_scanned += 1;

        if processed.is_empty() {
            tracing::debug!(
                file = %name,
                "Substitution produced no output, leaving file unchanged"
            );
            continue;
        }
        if processed != content {
            fs::write(&path, processed).map_err(|e| BatchError::io(&path, e))?;
            summary.files_rewritten += 1;
            tracing::debug!(file = %name, "Rewrote document");
        }
    }

    tracing::debug!(
        files_scanned = summary.files_scanned,
        files_rewritten = summary.files_rewritten,
        "Batch completed"
    );
    Ok(summary)
}

/// Path of `path` relative to `root`, for display.
fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{TagError, allow_fail};
    use crate::warning::{BufferedOutput, WarningSink};
    use pretty_assertions::assert_eq;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn md() -> Vec<String> {
        vec!["md".to_owned()]
    }

    fn upper_pattern() -> Regex {
        Regex::new(r"<upper>(.*?)</upper>").unwrap()
    }

    #[test]
    fn test_rewrites_matching_files() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.md"), "x <upper>one</upper> y").unwrap();
        fs::write(root.join("sub/b.md"), "<upper>two</upper>").unwrap();
        fs::write(root.join("c.txt"), "<upper>three</upper>").unwrap();

        let summary = process_tags_for_all_files(
            root,
            &md(),
            &upper_pattern(),
            DEFAULT_LOG_MESSAGE,
            |tag: &Tag<'_>| tag.get(1).unwrap_or_default().to_uppercase(),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(root.join("a.md")).unwrap(), "x ONE y");
        assert_eq!(fs::read_to_string(root.join("sub/b.md")).unwrap(), "TWO");
        assert_eq!(
            fs::read_to_string(root.join("c.txt")).unwrap(),
            "<upper>three</upper>"
        );
        assert_eq!(
            summary,
            BatchSummary {
                files_scanned: 2,
                files_rewritten: 2,
            }
        );
    }

    #[test]
    fn test_failing_file_unchanged_and_other_rewritten() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("bad.md"), "before <upper>fail</upper> after").unwrap();
        fs::write(root.join("good.md"), "before <upper>ok</upper> after").unwrap();

        let sink = WarningSink::new(false, false, BufferedOutput::default());
        let handler = allow_fail(&sink, "Oops.", |tag: &Tag<'_>| -> Result<String, TagError> {
            match tag.get(1) {
                Some("fail") => Err("cannot process".into()),
                other => Ok(other.unwrap_or_default().to_uppercase()),
            }
        });

        let summary =
            process_tags_for_all_files(root, &md(), &upper_pattern(), "Testing", handler).unwrap();

        assert_eq!(
            fs::read_to_string(root.join("bad.md")).unwrap(),
            "before <upper>fail</upper> after"
        );
        assert_eq!(
            fs::read_to_string(root.join("good.md")).unwrap(),
            "before OK after"
        );
        assert_eq!(summary.files_rewritten, 1);
        assert_eq!(
            sink.output().lines(),
            vec!["WARNING: [bad.md] Oops. cannot process"]
        );

        // Outside a run there is no current file to prefix
        sink.warn(None, &crate::Warning::new("later"));
        assert_eq!(sink.output().lines()[1], "WARNING: later");
    }

    #[test]
    fn test_empty_result_keeps_file() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("only-tag.md"), "<upper>all</upper>").unwrap();

        let summary = process_tags_for_all_files(
            root,
            &md(),
            &upper_pattern(),
            DEFAULT_LOG_MESSAGE,
            |_: &Tag<'_>| String::new(),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(root.join("only-tag.md")).unwrap(),
            "<upper>all</upper>"
        );
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_rewritten, 0);
    }

    #[test]
    fn test_callback_sees_relative_and_full_path() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::create_dir(root.join("guide")).unwrap();
        fs::write(root.join("guide/setup.md"), "<upper>x</upper>").unwrap();

        let mut seen = Vec::new();
        process_tags_for_all_files(root, &md(), &upper_pattern(), "Testing", |tag| {
            seen.push((
                tag.file_name().unwrap().replace('\\', "/"),
                tag.path().unwrap().to_path_buf(),
            ));
            tag.as_str().to_owned()
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![("guide/setup.md".to_owned(), root.join("guide/setup.md"))]
        );
    }

    #[test]
    fn test_unmatched_file_not_rewritten() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("plain.md"), "nothing here").unwrap();

        let summary = process_tags_for_all_files(
            root,
            &md(),
            &upper_pattern(),
            DEFAULT_LOG_MESSAGE,
            |_: &Tag<'_>| String::from("unused"),
        )
        .unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_rewritten, 0);
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        // Invalid UTF-8 can't be read as text
        fs::write(root.join("binary.md"), [0xff, 0xfe, 0xfd]).unwrap();

        let err = process_tags_for_all_files(
            root,
            &md(),
            &upper_pattern(),
            DEFAULT_LOG_MESSAGE,
            |_: &Tag<'_>| String::new(),
        )
        .unwrap_err();

        let BatchError::Io { path, .. } = err;
        assert_eq!(path, root.join("binary.md"));
    }
}
