//! Feature schema registry: the ordered column list a fitted model expects.

use crate::config::PythonConfig;
use crate::error::YieldError;
use crate::features::crop::CROP_INDICATOR_PREFIX;
use crate::inference::{ModelFormat, detect_format};
use crate::runtime::PythonRunner;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Nitrogen, kg/ha.
pub const COL_NITROGEN: &str = "N";
/// Phosphorus, kg/ha.
pub const COL_PHOSPHORUS: &str = "P";
/// Potassium, kg/ha.
pub const COL_POTASSIUM: &str = "K";
pub const COL_PH: &str = "pH";
pub const COL_RAINFALL: &str = "Rainfall_mm";
pub const COL_TEMPERATURE: &str = "temp";
pub const COL_HUMIDITY: &str = "humidity";
pub const COL_WIND: &str = "wind";
pub const COL_RADIATION: &str = "radiation";
pub const COL_AREA: &str = "Area_ha";

/// Non-crop columns, in the order the builder materializes them.
pub const BASE_COLUMNS: [&str; 10] = [
    COL_NITROGEN,
    COL_PHOSPHORUS,
    COL_POTASSIUM,
    COL_PH,
    COL_RAINFALL,
    COL_TEMPERATURE,
    COL_HUMIDITY,
    COL_WIND,
    COL_RADIATION,
    COL_AREA,
];

/// Ordered, duplicate-free set of input column names.
///
/// Order is significant: predictors consume positional vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

/// On-disk shapes accepted for the fitted column artifact.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaArtifact {
    List(Vec<String>),
    Object { columns: Vec<String> },
}

impl SchemaArtifact {
    fn into_columns(self) -> Vec<String> {
        match self {
            SchemaArtifact::List(columns) => columns,
            SchemaArtifact::Object { columns } => columns,
        }
    }
}

/// Unpickles the column list and prints it as a JSON array of strings.
const UNPICKLE_COLUMNS_SCRIPT: &str = r#"
import json, sys
import joblib

req = json.load(sys.stdin)
columns = joblib.load(req["path"])
if hasattr(columns, "tolist"):
    columns = columns.tolist()
print(json.dumps([str(c) for c in columns]))
"#;

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, YieldError> {
        if columns.is_empty() {
            return Err(YieldError::schema_mismatch("feature schema has no columns"));
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(YieldError::schema_mismatch(format!(
                    "duplicate column '{col}' in feature schema"
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Load the fitted column list, dispatching on the artifact extension.
    ///
    /// `.json` is read directly; `.pkl`, `.pickle` and `.joblib` are unpickled
    /// through the configured Python interpreter.
    pub fn load(path: &Path, python: &PythonConfig) -> Result<Self, YieldError> {
        let schema = match detect_format(path) {
            ModelFormat::LinearJson => Self::load_json(path)?,
            ModelFormat::Pickle => Self::load_pickled(path, &PythonRunner::from_config(python))?,
            ModelFormat::Unknown => {
                return Err(YieldError::data_load(format!(
                    "unsupported feature schema artifact: {}",
                    path.display()
                )));
            }
        };
        tracing::info!(
            path = %path.display(),
            columns = schema.len(),
            "Loaded feature schema"
        );
        Ok(schema)
    }

    /// Read a JSON artifact: a bare array of names or `{ "columns": [...] }`.
    pub fn load_json(path: &Path) -> Result<Self, YieldError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            YieldError::data_load(format!(
                "failed to read feature schema {}: {e}",
                path.display()
            ))
        })?;
        Self::parse_artifact(&content, path)
    }

    fn load_pickled(path: &Path, runner: &PythonRunner) -> Result<Self, YieldError> {
        if !path.exists() {
            return Err(YieldError::data_load(format!(
                "feature schema not found: {}",
                path.display()
            )));
        }
        let input = serde_json::to_vec(&serde_json::json!({ "path": path }))?;
        let output = runner.run(UNPICKLE_COLUMNS_SCRIPT, &input).map_err(|e| {
            YieldError::data_load(format!(
                "failed to load feature schema {}: {e}",
                path.display()
            ))
        })?;
        if !output.status.success() {
            return Err(YieldError::data_load(format!(
                "failed to unpickle feature schema {} (exit {}): {}",
                path.display(),
                output.status,
                output.stderr_lossy()
            )));
        }
        Self::parse_artifact(&output.stdout_lossy(), path)
    }

    fn parse_artifact(content: &str, path: &Path) -> Result<Self, YieldError> {
        let artifact: SchemaArtifact = serde_json::from_str(content.trim()).map_err(|e| {
            YieldError::data_load(format!(
                "malformed feature schema {}: {e}",
                path.display()
            ))
        })?;
        Self::new(artifact.into_columns())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Crop indicator columns, in schema order.
    pub fn crop_indicator_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.starts_with(CROP_INDICATOR_PREFIX))
            .map(String::as_str)
            .collect()
    }

    /// Check that `columns` matches this schema exactly, names and order.
    pub fn verify<S: AsRef<str>>(&self, columns: &[S]) -> Result<(), YieldError> {
        for expected in &self.columns {
            if !columns.iter().any(|c| c.as_ref() == expected) {
                return Err(YieldError::schema_mismatch(format!(
                    "missing column '{expected}'"
                )));
            }
        }
        for col in columns {
            if !self.contains(col.as_ref()) {
                return Err(YieldError::schema_mismatch(format!(
                    "unexpected column '{}'",
                    col.as_ref()
                )));
            }
        }
        if columns.len() != self.columns.len() {
            return Err(YieldError::schema_mismatch(format!(
                "expected {} columns, got {}",
                self.columns.len(),
                columns.len()
            )));
        }
        for (idx, (expected, actual)) in self.columns.iter().zip(columns).enumerate() {
            if expected != actual.as_ref() {
                return Err(YieldError::schema_mismatch(format!(
                    "column {idx} is '{}', expected '{expected}'",
                    actual.as_ref()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = FeatureSchema::new(cols(&["N", "P", "N"])).unwrap_err();
        assert!(matches!(err, YieldError::SchemaMismatch(_)));
        assert!(err.to_string().contains("duplicate column 'N'"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(FeatureSchema::new(Vec::new()).is_err());
    }

    #[test]
    fn test_crop_indicator_columns_keep_schema_order() {
        let schema =
            FeatureSchema::new(cols(&["Crop_rice", "N", "Crop_cotton", "pH"])).unwrap();
        assert_eq!(schema.crop_indicator_columns(), vec!["Crop_rice", "Crop_cotton"]);
    }

    #[test]
    fn test_verify_exact_match() {
        let schema = FeatureSchema::new(cols(&["N", "P", "K"])).unwrap();
        assert!(schema.verify(&["N", "P", "K"]).is_ok());
    }

    #[test]
    fn test_verify_reports_order_mismatch() {
        let schema = FeatureSchema::new(cols(&["N", "P", "K"])).unwrap();
        let err = schema.verify(&["N", "K", "P"]).unwrap_err();
        assert!(err.to_string().contains("column 1 is 'K', expected 'P'"));
    }

    #[test]
    fn test_verify_reports_missing_and_extra() {
        let schema = FeatureSchema::new(cols(&["N", "P", "K"])).unwrap();
        let err = schema.verify(&["N", "P"]).unwrap_err();
        assert!(err.to_string().contains("missing column 'K'"));

        let err = schema.verify(&["N", "P", "K", "wind"]).unwrap_err();
        assert!(err.to_string().contains("unexpected column 'wind'"));
    }

    #[test]
    fn test_verify_rejects_repeated_column() {
        let schema = FeatureSchema::new(cols(&["N", "P"])).unwrap();
        let err = schema.verify(&["N", "P", "P"]).unwrap_err();
        assert!(err.to_string().contains("expected 2 columns, got 3"));
    }

    #[test]
    fn test_load_accepts_both_artifact_shapes() {
        let dir = tempfile::tempdir().unwrap();

        let list_path = dir.path().join("list.json");
        std::fs::write(&list_path, r#"["N", "P", "Crop_maize"]"#).unwrap();
        let schema = FeatureSchema::load_json(&list_path).unwrap();
        assert_eq!(schema.columns(), &cols(&["N", "P", "Crop_maize"])[..]);

        let obj_path = dir.path().join("obj.json");
        let mut file = std::fs::File::create(&obj_path).unwrap();
        write!(file, r#"{{"columns": ["pH", "temp"]}}"#).unwrap();
        let schema = FeatureSchema::load_json(&obj_path).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("temp"), Some(1));
    }

    #[test]
    fn test_load_missing_file_is_data_load() {
        let err = FeatureSchema::load_json(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert!(err.is_data_load());
    }

    fn unreachable_python() -> PythonConfig {
        PythonConfig {
            python_path: Some(std::path::PathBuf::from("/nonexistent/python-for-tests")),
            ..PythonConfig::default()
        }
    }

    #[test]
    fn test_load_dispatches_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_input_columns.json");
        std::fs::write(&path, r#"["N", "Crop_rice"]"#).unwrap();
        // JSON never touches the interpreter.
        let schema = FeatureSchema::load(&path, &unreachable_python()).unwrap();
        assert_eq!(schema.columns(), &cols(&["N", "Crop_rice"])[..]);
    }

    #[test]
    fn test_load_pickled_goes_through_python() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_input_columns.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();
        let err = FeatureSchema::load(&path, &unreachable_python()).unwrap_err();
        assert!(err.is_data_load());
        assert!(err.to_string().contains("Failed to spawn Python"));
    }

    #[test]
    fn test_load_missing_pickle_is_data_load() {
        let err = FeatureSchema::load(
            Path::new("/nonexistent/model_input_columns.pkl"),
            &unreachable_python(),
        )
        .unwrap_err();
        assert!(err.is_data_load());
        assert!(err.to_string().contains("feature schema not found"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.txt");
        std::fs::write(&path, "N,P,K").unwrap();
        let err = FeatureSchema::load(&path, &unreachable_python()).unwrap_err();
        assert!(err.to_string().contains("unsupported feature schema artifact"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unpickled_columns_are_parsed() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_input_columns.joblib");
        std::fs::write(&path, b"\x80\x04").unwrap();
        // Stand-in interpreter that prints what the unpickling script would.
        let python = dir.path().join("fake-python");
        std::fs::write(
            &python,
            "#!/bin/sh\ncat >/dev/null\necho '[\"N\", \"P\", \"Crop_maize\"]'\n",
        )
        .unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();
        let config = PythonConfig {
            python_path: Some(python),
            ..PythonConfig::default()
        };

        let schema = FeatureSchema::load(&path, &config).unwrap();
        assert_eq!(schema.columns(), &cols(&["N", "P", "Crop_maize"])[..]);
    }
}
