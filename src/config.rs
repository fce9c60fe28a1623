use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::vectorfield::{EvaluatorKind, Parameters};

/// Evaluation settings read from a TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PetriConfig {
    #[serde(default)]
    pub evaluator: EvaluatorKind,
    #[serde(default = "default_time")]
    pub time: f64,
    /// Values for transitions whose rate is a parameter.
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for PetriConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::default(),
            time: default_time(),
            parameters: Parameters::default(),
            pretty: default_pretty(),
        }
    }
}

impl PetriConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_time() -> f64 {
    0.0
}

fn default_pretty() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{CastAttributes, Columns, Key, Net, Rate, TransitionSpec};
    use crate::vectorfield::compile;

    #[test]
    fn missing_file_yields_defaults() {
        let config = PetriConfig::load_from_file("/nonexistent/petri.toml").unwrap();
        assert_eq!(config, PetriConfig::default());
        assert_eq!(config.evaluator, EvaluatorKind::Planned);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config = PetriConfig::from_toml(
            r#"
            evaluator = "interpreted"

            [parameters]
            rec = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.evaluator, EvaluatorKind::Interpreted);
        assert_eq!(config.time, 0.0);
        assert!(config.pretty);
        assert_eq!(config.parameters.get(&Key::from("rec")), Some(0.25));
    }

    #[test]
    fn unknown_evaluator_is_rejected() {
        assert!(PetriConfig::from_toml(r#"evaluator = "symbolic""#).is_err());
    }

    #[test]
    fn numeric_parameter_keys_reach_unlabelled_nets() {
        let config = PetriConfig::from_toml(
            r#"
            [parameters]
            "1" = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.parameters.get(&Key::Index(1)), Some(0.5));

        let net = Net::new(1, [TransitionSpec::indices([1], [])])
            .unwrap()
            .cast(
                Columns::REACTION,
                CastAttributes::new()
                    .default_rate(Rate::Parameter)
                    .default_concentration(0.0),
            )
            .unwrap();
        let f = compile(&net, config.evaluator).unwrap();
        let du = f.derivative(&[2.0], &config.parameters, config.time).unwrap();
        assert_eq!(du, vec![-1.0]);
    }
}
