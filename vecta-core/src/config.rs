// vecta-core - Interpreter configuration
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Limits and seeds for one interpreter run.

use serde::{Deserialize, Serialize};

/// Settings that bound a run and make it reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Steps allowed in one run to completion, and in each re-entrant
    /// function evaluation.
    pub max_steps: u64,
    /// Largest matrix `range`/`rrange` may produce.
    pub max_range_elements: usize,
    /// Value stack slots.
    pub stack_capacity: usize,
    pub max_call_depth: usize,
    /// Seed for `random()`.
    pub seed: u64,
    /// Samples per axis when a heatmap is evaluated.
    pub heatmap_resolution: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_steps: 10_000_000,
            max_range_elements: 1_000_000,
            stack_capacity: 65_536,
            max_call_depth: 1_024,
            seed: 0x5eed,
            heatmap_resolution: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InterpreterConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_steps, InterpreterConfig::default().max_steps);
    }
}
