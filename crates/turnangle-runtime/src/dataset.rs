//! Image datasets for multi-image runs.
//!
//! A dataset is a JSON array of cases, each naming one image:
//!
//! ```json
//! [
//!   { "image": "frames/0001.png" },
//!   { "image": "frames/0002.png" }
//! ]
//! ```
//!
//! Relative paths resolve against the directory holding the dataset file.
//! Other keys in a case are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset has no cases: {0}")]
    Empty(PathBuf),
}

/// One dataset entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetCase {
    pub image: PathBuf,
}

/// Load a dataset file and return its image paths in order.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, DatasetError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cases: Vec<DatasetCase> =
        serde_json::from_str(&content).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if cases.is_empty() {
        return Err(DatasetError::Empty(path.to_path_buf()));
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(cases
        .into_iter()
        .map(|case| {
            if case.image.is_absolute() {
                case.image
            } else {
                base.join(case.image)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steering.json");
        fs::write(
            &path,
            r#"[
                {"image": "frames/0001.png", "expected_keywords": ["left"]},
                {"image": "/data/0002.png"}
            ]"#,
        )
        .unwrap();

        let images = load_dataset(&path).unwrap();
        assert_eq!(
            images,
            vec![
                dir.path().join("frames/0001.png"),
                PathBuf::from("/data/0002.png")
            ]
        );
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "[]").unwrap();

        assert!(matches!(load_dataset(&path), Err(DatasetError::Empty(_))));
    }

    #[test]
    fn test_case_without_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"prompt": "turn?"}]"#).unwrap();

        assert!(matches!(load_dataset(&path), Err(DatasetError::Json { .. })));
    }

    #[test]
    fn test_missing_dataset() {
        let result = load_dataset("/no/such/dataset.json");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
