//! Configuration management for the CLI.

use crate::cli::CliFormat;
use crate::error::{CliError, Result};
use longread_domain::{AnalysisKind, PromptSpec};
use longread_engine::{default_condense_prompt, EngineConfig, PromptDrafts, TemplateRegistry};
use longread_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generation backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Chunking, sampling and synthesis
    #[serde(default)]
    pub engine: EngineConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Prompt overrides per analysis kind
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, PromptOverride>,

    /// Condensation prompt override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condense: Option<PromptOverride>,

    /// User-defined prompt templates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateDefinition>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Replacement for part of a built-in prompt; blank fields keep the default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PromptOverride {
    /// System instruction
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,

    /// User instruction
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
}

impl PromptOverride {
    fn apply_to(&self, mut spec: PromptSpec) -> PromptSpec {
        if !self.system.trim().is_empty() {
            spec.system = self.system.clone();
        }
        if !self.user.trim().is_empty() {
            spec.user = self.user.clone();
        }
        spec
    }
}

/// A user-defined template as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Stable id; derived from the kind and name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    pub name: String,

    /// Analysis kind (e.g. "outline", "plotholes")
    pub kind: String,

    /// System instruction
    #[serde(default)]
    pub system: String,

    /// User instruction
    pub user: String,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".longread").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the engine settings and prompt kinds.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate().map_err(CliError::Config)?;
        for kind in self.prompts.keys() {
            parse_kind(kind)?;
        }
        for template in &self.templates {
            parse_kind(&template.kind)?;
        }
        Ok(())
    }

    /// Prompt drafts: built-in prompts with the `[prompts.<kind>]` overrides applied.
    pub fn drafts(&self) -> Result<PromptDrafts> {
        let mut drafts = PromptDrafts::new();
        for (name, prompt) in &self.prompts {
            let kind = parse_kind(name)?;
            let spec = prompt.apply_to(drafts.get(kind).clone());
            drafts.set(kind, spec);
        }
        Ok(drafts)
    }

    /// Template registry with the `[[templates]]` entries loaded.
    pub fn registry(&self) -> Result<TemplateRegistry> {
        let mut registry = TemplateRegistry::new();
        for def in &self.templates {
            let kind = parse_kind(&def.kind)?;
            let spec = PromptSpec::new(def.system.clone(), def.user.clone());
            match &def.id {
                Some(id) => registry.insert(id.clone(), kind, &def.name, spec)?,
                None => {
                    let id = derived_id(&registry, kind, &def.name);
                    registry.insert(id, kind, &def.name, spec)?
                }
            };
        }
        Ok(registry)
    }

    /// Output format, with the `--format` flag taking precedence.
    pub fn output_format(&self, flag: Option<CliFormat>) -> OutputFormat {
        flag.map(Into::into).unwrap_or(self.settings.format)
    }

    /// Whether output is colored, given the `--no-color` flag.
    pub fn color_enabled(&self, no_color: bool) -> bool {
        !no_color && self.settings.color
    }

    /// Condensation prompt with the `[condense]` override applied.
    pub fn condense_prompt(&self) -> PromptSpec {
        let spec = default_condense_prompt();
        match &self.condense {
            Some(prompt) => prompt.apply_to(spec),
            None => spec,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

/// `user-<kind>-<slug>`, numbered when the same kind and name repeat.
fn derived_id(registry: &TemplateRegistry, kind: AnalysisKind, name: &str) -> String {
    let slug = name
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let base = format!("user-{}-{}", kind.as_str(), slug);

    let mut id = base.clone();
    let mut n = 2;
    while registry.get(&id).is_some() {
        id = format!("{}-{}", base, n);
        n += 1;
    }
    id
}

fn parse_kind(name: &str) -> Result<AnalysisKind> {
    AnalysisKind::parse(name)
        .ok_or_else(|| CliError::Config(format!("Unknown analysis kind '{}'", name)))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
