//! Predictor backed by a pickled model, run through a managed Python subprocess.
//!
//! The subprocess receives `{model_path, columns, values}` as JSON on stdin and
//! writes a single JSON number to stdout.

use crate::config::PythonConfig;
use crate::error::YieldError;
use crate::features::{FeatureSchema, FeatureVector};
use crate::inference::{YieldPredictor, check_columns};
use crate::runtime::PythonRunner;
use std::path::{Path, PathBuf};

/// Exit code the script uses when the model's fitted columns disagree.
const SCHEMA_MISMATCH_EXIT: i32 = 3;

const PREDICT_SCRIPT: &str = r#"
import json, sys
import joblib
import pandas as pd

req = json.load(sys.stdin)
model = joblib.load(req["model_path"])
fitted = getattr(model, "feature_names_in_", None)
if fitted is not None and list(fitted) != req["columns"]:
    sys.stderr.write("model was fitted on columns %s\n" % list(fitted))
    sys.exit(3)
frame = pd.DataFrame([req["values"]], columns=req["columns"])
print(json.dumps(float(model.predict(frame)[0])))
"#;

pub struct PythonPredictor {
    runner: PythonRunner,
    model_path: PathBuf,
    columns: Vec<String>,
}

impl PythonPredictor {
    pub fn new(model_path: &Path, schema: &FeatureSchema, config: &PythonConfig) -> Self {
        Self {
            runner: PythonRunner::from_config(config),
            model_path: model_path.to_path_buf(),
            columns: schema.columns().to_vec(),
        }
    }

    pub fn python(&self) -> &Path {
        self.runner.python()
    }
}

impl YieldPredictor for PythonPredictor {
    fn name(&self) -> &str {
        "python"
    }

    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, YieldError> {
        check_columns(&self.columns, features)?;

        let request = serde_json::json!({
            "model_path": self.model_path,
            "columns": features.columns(),
            "values": features.values(),
        });
        let payload = serde_json::to_vec(&request)?;

        let output = self.runner.run(PREDICT_SCRIPT, &payload)?;

        if !output.status.success() {
            let stderr = output.stderr_lossy();
            if output.status.code() == Some(SCHEMA_MISMATCH_EXIT) {
                return Err(YieldError::schema_mismatch(stderr));
            }
            return Err(YieldError::model(format!(
                "Python predictor failed (exit {}): {}",
                output.status, stderr
            )));
        }

        parse_prediction(&output.stdout_lossy())
    }
}

fn parse_prediction(stdout: &str) -> Result<f64, YieldError> {
    let value: serde_json::Value = serde_json::from_str(stdout.trim())
        .map_err(|e| YieldError::model(format!("Invalid JSON output: {e}")))?;
    value
        .as_f64()
        .ok_or_else(|| YieldError::model(format!("Predictor output is not a number: {value}")))
}
