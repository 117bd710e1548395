//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::MapArgs;
use crate::MapFormat;
use crate::PredictArgs;
use std::io::Write;
use std::path::Path;
use yieldcast_core::YieldConfig;
use yieldcast_core::config::workspace_config_path;
use yieldcast_core::features::{CropType, FeatureSchema, InputBounds, SoilWeatherInputs};
use yieldcast_core::inference::{PredictionService, load_predictor};
use yieldcast_core::summary::{ChoroplethPayload, SummaryService, write_csv};

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Predict(args) => handle_predict(args, workspace, config_file),
        Commands::Map(args) => handle_map(args, workspace, config_file),
        Commands::Crops => handle_crops(),
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

/// Layered config, with relative paths anchored at the workspace.
fn load_config(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<YieldConfig> {
    let mut config =
        yieldcast_core::config::load_config_with_file(Some(workspace), config_file, None)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config.resolve_paths(workspace);
    Ok(config)
}

impl PredictArgs {
    fn inputs(&self) -> SoilWeatherInputs {
        SoilWeatherInputs {
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            ph: self.ph,
            rainfall: self.rainfall,
            temperature: self.temperature,
            humidity: self.humidity,
            wind: self.wind,
            radiation: self.radiation,
        }
    }
}

fn handle_predict(
    args: PredictArgs,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let crop: CropType = args.crop.parse()?;
    let inputs = args.inputs();
    InputBounds::default().validate(&inputs)?;

    let config = load_config(workspace, config_file)?;
    let schema_path = args.schema.unwrap_or(config.artifacts.schema_path);
    let model_path = args.model.unwrap_or(config.artifacts.model_path);

    let schema = FeatureSchema::load(&schema_path, &config.python)?;
    let predictor = load_predictor(&model_path, &schema, &config.python)?;
    let service = PredictionService::new(schema, predictor)?;
    let prediction = service.predict(&inputs, crop)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("Expected yield for {}: {}", crop.title(), prediction);
    }
    Ok(())
}

fn handle_map(args: MapArgs, workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<()> {
    let crop: CropType = args.crop.parse()?;
    let config = load_config(workspace, config_file)?;
    let service = SummaryService::new(config.data, config.regions);
    let table = service.table_for(crop)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    match args.format {
        MapFormat::Csv => write_csv(&table, &mut out)?,
        MapFormat::Json => {
            let payload = ChoroplethPayload::new(&table, service.name_property());
            writeln!(out, "{}", payload.to_json_pretty()?)?;
        }
    }
    out.flush()?;

    tracing::info!(
        crop = %crop,
        regions = table.len(),
        with_history = table.matched_count(),
        "Exported region yields"
    );
    if let Some(path) = &args.output {
        eprintln!(
            "Wrote {} regions ({} with history) to {}",
            table.len(),
            table.matched_count(),
            path.display()
        );
    }
    Ok(())
}

fn handle_crops() -> anyhow::Result<()> {
    for crop in CropType::ALL {
        println!("{:<10} {}", crop.as_str(), crop.indicator_column());
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = YieldConfig::default().to_toml()?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(workspace, config_file)?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn predict_args(crop: &str) -> PredictArgs {
        PredictArgs {
            crop: crop.to_string(),
            nitrogen: 90.0,
            phosphorus: 40.0,
            potassium: 40.0,
            ph: 6.5,
            rainfall: 1000.0,
            temperature: 27.0,
            humidity: 75.0,
            wind: 2.5,
            radiation: 18.0,
            model: None,
            schema: None,
            json: false,
        }
    }

    fn write_linear_artifacts(workspace: &Path) {
        let mut columns = vec![
            "N", "P", "K", "pH", "Rainfall_mm", "temp", "humidity", "wind", "radiation",
            "Area_ha",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
        columns.extend(CropType::ALL.iter().map(|c| c.indicator_column()));
        std::fs::write(
            workspace.join("model_input_columns.json"),
            serde_json::to_string(&columns).unwrap(),
        )
        .unwrap();

        let coefficients: serde_json::Map<String, serde_json::Value> = columns
            .iter()
            .map(|c| (c.clone(), serde_json::json!(1.0)))
            .collect();
        std::fs::write(
            workspace.join("model.json"),
            serde_json::json!({"intercept": 0.0, "coefficients": coefficients}).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let command = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(command, workspace, None).unwrap();

        let config_path = workspace.join(".yieldcast").join("config.toml");
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: YieldConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.data.region_column, "State Name");
        assert_eq!(parsed.regions.name_property, "name");
    }

    #[test]
    fn test_config_init_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        let config_path = workspace_config_path(workspace);
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[data]\ndelimiter = \";\"\n").unwrap();

        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            workspace,
            None,
        )
        .unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, "[data]\ndelimiter = \";\"\n");
    }

    #[test]
    fn test_load_config_resolves_workspace_paths() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(
            config.regions.geometry_path,
            dir.path().join("india_states.json")
        );
    }

    #[test]
    fn test_explicit_config_file_wins() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(&file, "[regions]\nname_property = \"ST_NM\"\n").unwrap();
        let config = load_config(dir.path(), Some(&file)).unwrap();
        assert_eq!(config.regions.name_property, "ST_NM");
    }

    #[test]
    fn test_explicit_config_file_keeps_workspace_settings() {
        let dir = TempDir::new().unwrap();
        let workspace_file = workspace_config_path(dir.path());
        std::fs::create_dir_all(workspace_file.parent().unwrap()).unwrap();
        std::fs::write(&workspace_file, "[data]\nregion_column = \"state\"\n").unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(&file, "[regions]\nname_property = \"ST_NM\"\n").unwrap();

        let config = load_config(dir.path(), Some(&file)).unwrap();
        assert_eq!(config.data.region_column, "state");
        assert_eq!(config.regions.name_property, "ST_NM");
        assert_eq!(config.regions.geometry_path, dir.path().join("india_states.json"));
    }

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_predict_with_linear_model() {
        let dir = TempDir::new().unwrap();
        write_linear_artifacts(dir.path());
        let mut args = predict_args("Maize");
        args.schema = Some(dir.path().join("model_input_columns.json"));
        args.model = Some(dir.path().join("model.json"));
        handle_predict(args, dir.path(), None).unwrap();
    }

    #[test]
    fn test_predict_rejects_unknown_crop() {
        let dir = TempDir::new().unwrap();
        let err = handle_predict(predict_args("wheat"), dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("wheat"));
    }

    #[test]
    fn test_predict_rejects_out_of_range_input() {
        let dir = TempDir::new().unwrap();
        let mut args = predict_args("rice");
        args.ph = 15.0;
        let err = handle_predict(args, dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("ph"));
    }

    #[test]
    fn test_predict_ignores_missing_geometry() {
        let dir = TempDir::new().unwrap();
        write_linear_artifacts(dir.path());
        // No observations or region geometry exist in this workspace.
        let mut args = predict_args("cotton");
        args.schema = Some(dir.path().join("model_input_columns.json"));
        args.model = Some(dir.path().join("model.json"));
        args.json = true;
        assert!(handle_predict(args, dir.path(), None).is_ok());
    }

    #[test]
    fn test_map_writes_csv() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("cleaned.csv"),
            "State Name,Crop,yield\nBihar,Maize,2000\nBihar,Maize,3000\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("india_states.json"),
            r#"{"features": [{"properties": {"name": "Bihar"}}, {"properties": {"name": "Punjab"}}]}"#,
        )
        .unwrap();

        let output = dir.path().join("maize.csv");
        let args = MapArgs {
            crop: "maize".to_string(),
            format: MapFormat::Csv,
            output: Some(output.clone()),
        };
        handle_map(args, dir.path(), None).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "region,yield\nBihar,2500\nPunjab,0\n");
    }

    #[test]
    fn test_map_without_geometry_fails() {
        let dir = TempDir::new().unwrap();
        let args = MapArgs {
            crop: "rice".to_string(),
            format: MapFormat::Json,
            output: Some(dir.path().join("out.json")),
        };
        let err = handle_map(args, dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Data load error"));
    }
}
