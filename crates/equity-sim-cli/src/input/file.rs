use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Input file flavours, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Json,
    Yaml,
}

fn detect_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            InputFormat::Yaml
        }
        _ => InputFormat::Json,
    }
}

/// Read a JSON or YAML file and deserialise into a typed struct.
pub fn read_input_file<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    tracing::debug!(path = %canonical.display(), "reading input file");
    parse_contents(&contents, detect_format(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

fn parse_contents<T: DeserializeOwned>(
    contents: &str,
    format: InputFormat,
) -> Result<T, Box<dyn std::error::Error>> {
    Ok(match format {
        InputFormat::Json => serde_json::from_str(contents)?,
        InputFormat::Yaml => serde_yaml::from_str(contents)?,
    })
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equity_sim_core::valuation::{PlanType, ScenarioInputs};

    #[test]
    fn test_format_by_extension() {
        assert_eq!(detect_format(Path::new("grant.yaml")), InputFormat::Yaml);
        assert_eq!(detect_format(Path::new("grant.YML")), InputFormat::Yaml);
        assert_eq!(detect_format(Path::new("grant.json")), InputFormat::Json);
        assert_eq!(detect_format(Path::new("grant")), InputFormat::Json);
    }

    #[test]
    fn test_yaml_scenario() {
        let yaml = "shares: 2000\ncompany_valuation: 5000000\ntotal_shares: 1000000\nplan_type: PHANTOM\n";
        let inputs: ScenarioInputs = parse_contents(yaml, InputFormat::Yaml).unwrap();
        assert_eq!(inputs.plan_type, PlanType::Phantom);
        assert_eq!(inputs.shares, rust_decimal_macros::dec!(2000));
    }

    #[test]
    fn test_missing_file() {
        let err = read_input_file::<ScenarioInputs>("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
