//! Runner configuration

use std::str::FromStr;

use dsmcost_common::{GenerationMode, ParameterError, Result};
use dsmcost_engine::{EngineConfig, EvictionPolicy, InitialCosts};
use serde::{Deserialize, Serialize};

/// Batch runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Model parameters
    pub engine: EngineConfig,
    /// Runs to execute with the same parameters
    pub runs: usize,
    /// Master seed; runs use forks of it
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            runs: 1,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their defaults; malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = parse_var(&lookup, "DSMCOST_COMPONENTS")? {
            cfg.engine.components = v;
        }
        if let Some(v) = parse_var(&lookup, "DSMCOST_DEGREE")? {
            cfg.engine.degree = v;
        }
        if let Some(raw) = lookup("DSMCOST_MODE") {
            cfg.engine.mode = raw.parse::<GenerationMode>()?;
        }
        if let Some(v) = parse_var(&lookup, "DSMCOST_STEPS")? {
            cfg.engine.steps = v;
        }
        if let Some(v) = parse_var(&lookup, "DSMCOST_EXPONENT")? {
            cfg.engine.exponent = v;
        }
        if let Some(raw) = lookup("DSMCOST_INITIAL_COST") {
            cfg.engine.initial_costs = if raw.trim().eq_ignore_ascii_case("random") {
                InitialCosts::Random
            } else {
                InitialCosts::Uniform(parse_value("DSMCOST_INITIAL_COST", &raw)?)
            };
        }
        if let Some(v) = parse_var(&lookup, "DSMCOST_HISTORY_CAPACITY")? {
            cfg.engine.history_capacity = v;
        }
        if let Some(raw) = lookup("DSMCOST_HISTORY_POLICY") {
            cfg.engine.history_policy = raw.parse::<EvictionPolicy>()?;
        }

        if let Some(v) = parse_var(&lookup, "DSMCOST_RUNS")? {
            cfg.runs = v;
        }
        if let Some(v) = parse_var(&lookup, "DSMCOST_SEED")? {
            cfg.seed = Some(v);
        }

        cfg.engine.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|raw| parse_value(key, &raw)).transpose()
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        ParameterError::NonNumeric {
            field: key.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = SimulatorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, SimulatorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = SimulatorConfig::from_lookup(lookup_from(&[
            ("DSMCOST_COMPONENTS", "50"),
            ("DSMCOST_DEGREE", "7"),
            ("DSMCOST_MODE", "random"),
            ("DSMCOST_STEPS", "1000"),
            ("DSMCOST_EXPONENT", "2.5"),
            ("DSMCOST_INITIAL_COST", "random"),
            ("DSMCOST_HISTORY_POLICY", "hard-reset"),
            ("DSMCOST_RUNS", "3"),
            ("DSMCOST_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(cfg.engine.components, 50);
        assert_eq!(cfg.engine.degree, 7);
        assert_eq!(cfg.engine.mode, GenerationMode::Random);
        assert_eq!(cfg.engine.steps, 1000);
        assert_eq!(cfg.engine.exponent, 2.5);
        assert_eq!(cfg.engine.initial_costs, InitialCosts::Random);
        assert_eq!(cfg.engine.history_policy, EvictionPolicy::HardReset);
        assert_eq!(cfg.runs, 3);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let err = SimulatorConfig::from_lookup(lookup_from(&[("DSMCOST_COMPONENTS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("DSMCOST_COMPONENTS"));
    }

    #[test]
    fn test_negative_steps_rejected() {
        let err =
            SimulatorConfig::from_lookup(lookup_from(&[("DSMCOST_STEPS", "-5")])).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = SimulatorConfig::from_lookup(lookup_from(&[("DSMCOST_MODE", "banded")]))
            .unwrap_err();
        assert!(err.to_string().contains("generation mode"));
    }

    #[test]
    fn test_single_component_rejected() {
        assert!(SimulatorConfig::from_lookup(lookup_from(&[("DSMCOST_COMPONENTS", "1")])).is_err());
    }

    #[test]
    fn test_oversized_degree_is_accepted() {
        // Clamping happens at generation time, not here
        let cfg = SimulatorConfig::from_lookup(lookup_from(&[
            ("DSMCOST_COMPONENTS", "2"),
            ("DSMCOST_DEGREE", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.engine.degree, 5);
    }
}
