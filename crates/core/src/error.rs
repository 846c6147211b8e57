//! Typed pipeline errors, surfaced through `anyhow`.

use std::path::PathBuf;

/// Errors raised by the build pipeline itself rather than a font library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("{operation} failed for {failed} of {total} files: {}", file_list(.files))]
    PartialBatchFailure { operation: String, failed: usize, total: usize, files: Vec<PathBuf> },
}

fn file_list(files: &[PathBuf]) -> String {
    files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>().join(", ")
}
