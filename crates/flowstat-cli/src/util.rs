use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Path argument that selects standard output instead of a file.
pub const STDOUT_PATH: &str = "-";

/// Destination of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path` and returns the
    /// destination as shown to the user.
    pub fn save_json<T>(value: &T, output_path: &Path) -> anyhow::Result<String>
    where
        T: serde::Serialize,
    {
        let output = Self::from_output_path(output_path);
        output.write_json(value)?;
        Ok(output.display_path())
    }

    #[must_use]
    pub fn from_output_path(output_path: &Path) -> Self {
        if output_path.as_os_str() == STDOUT_PATH {
            Self::Stdout
        } else {
            Self::File(output_path.to_path_buf())
        }
    }

    #[must_use]
    pub fn display_path(&self) -> String {
        match self {
            Self::Stdout => "stdout".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// The document is rendered in full before anything is written, so a
    /// serialization failure leaves an existing file untouched.
    pub fn write_json<T>(&self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for {}", self.display_path()))?;
        json.push('\n');
        match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(json.as_bytes())
                    .and_then(|()| stdout.flush())
                    .context("Failed to write JSON to stdout")?;
            }
            Self::File(path) => {
                fs::write(path, json)
                    .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        let shown = Output::save_json(&serde_json::json!({ "alpha": 0.05 }), &path).unwrap();
        assert_eq!(shown, path.display().to_string());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["alpha"], 0.05);
    }

    #[test]
    fn test_dash_selects_stdout() {
        let output = Output::from_output_path(Path::new(STDOUT_PATH));
        assert_eq!(output, Output::Stdout);
        assert_eq!(output.display_path(), "stdout");
        assert_eq!(
            Output::from_output_path(Path::new("out/-")),
            Output::File(PathBuf::from("out/-"))
        );
    }

    #[test]
    fn test_missing_directory_is_reported_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.json");
        let err = Output::save_json(&[1, 2, 3], &path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write JSON to"));
        assert!(!dir.path().join("missing").exists());
    }
}
