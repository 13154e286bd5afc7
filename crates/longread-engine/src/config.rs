//! Configuration for the analysis engine
//!
//! Every size is counted in chars (Unicode scalar values), so a CJK novel and
//! an English one of the same character count split the same way.

use crate::sampler::Sampler;
use crate::splitter::Splitter;
use serde::{Deserialize, Serialize};

/// Configuration for chunking, sampling and synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target chunk size for the chunked strategy and the digest split step
    pub target_chunk_chars: usize,

    /// Minimum chunk size; the boundary search never goes below it
    pub min_chunk_chars: usize,

    /// How far the boundary search looks around the target cutoff
    pub boundary_window_chars: usize,

    /// Documents longer than this are sampled for style analysis
    pub sample_threshold_chars: usize,

    /// Size of each head/middle/tail sample
    pub sample_part_chars: usize,

    /// How far a sample edge may move to reach a sentence or line boundary
    pub sample_snap_chars: usize,

    /// Synthesis runs only while the accumulated per-part output is shorter
    pub synthesis_max_input_chars: usize,
}

impl Default for EngineConfig {
    /// Defaults sized for long-context models (about 1M tokens)
    fn default() -> Self {
        Self {
            target_chunk_chars: 400_000,
            min_chunk_chars: 1_000,
            boundary_window_chars: 5_000,
            sample_threshold_chars: 400_000,
            sample_part_chars: 150_000,
            sample_snap_chars: 1_000,
            synthesis_max_input_chars: 300_000,
        }
    }
}

impl EngineConfig {
    /// Compact preset: small chunks for local models with 32k-token contexts
    pub fn compact() -> Self {
        Self {
            target_chunk_chars: 24_000,
            min_chunk_chars: 500,
            boundary_window_chars: 2_000,
            sample_threshold_chars: 24_000,
            sample_part_chars: 8_000,
            sample_snap_chars: 400,
            synthesis_max_input_chars: 24_000,
        }
    }

    /// Long-context preset: fewer, larger chunks for 2M-token models
    pub fn long_context() -> Self {
        Self {
            target_chunk_chars: 800_000,
            min_chunk_chars: 2_000,
            boundary_window_chars: 10_000,
            sample_threshold_chars: 800_000,
            sample_part_chars: 250_000,
            sample_snap_chars: 2_000,
            synthesis_max_input_chars: 600_000,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_chunk_chars == 0 {
            return Err("target_chunk_chars must be greater than 0".to_string());
        }
        if self.min_chunk_chars == 0 {
            return Err("min_chunk_chars must be greater than 0".to_string());
        }
        if self.min_chunk_chars > self.target_chunk_chars {
            return Err("min_chunk_chars cannot exceed target_chunk_chars".to_string());
        }
        if self.sample_part_chars == 0 {
            return Err("sample_part_chars must be greater than 0".to_string());
        }
        if self.sample_part_chars > self.sample_threshold_chars {
            return Err("sample_part_chars cannot exceed sample_threshold_chars".to_string());
        }
        Ok(())
    }

    /// Splitter for the chunked strategy and the digest split step
    pub fn splitter(&self) -> Splitter {
        Splitter::new(
            self.target_chunk_chars,
            self.min_chunk_chars,
            self.boundary_window_chars,
        )
    }

    /// Sampler for style analysis
    pub fn sampler(&self) -> Sampler {
        Sampler::new(
            self.sample_threshold_chars,
            self.sample_part_chars,
            self.sample_snap_chars,
        )
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
