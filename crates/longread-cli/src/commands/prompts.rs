//! Prompts command implementation.

use crate::cli::{KindArg, PromptsAction, PromptsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use longread_domain::{AnalysisKind, PromptSpec};
use longread_engine::PromptTemplate;

/// Execute the prompts command.
pub async fn execute_prompts(args: PromptsArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        PromptsAction::List { kind } => list_templates(config, kind, formatter),
        PromptsAction::Show { kind, template } => show_prompt(config, kind, template, formatter),
    }
}

/// List templates, built-ins first.
fn list_templates(config: &Config, kind: Option<KindArg>, formatter: &Formatter) -> Result<()> {
    let registry = config.registry()?;
    let kinds: Vec<AnalysisKind> = match kind {
        Some(kind) => vec![kind.into()],
        None => AnalysisKind::ALL.to_vec(),
    };

    let templates: Vec<&PromptTemplate> = kinds
        .into_iter()
        .flat_map(|kind| registry.templates_for(kind))
        .collect();

    println!("{}", formatter.format_templates(&templates)?);
    Ok(())
}

/// Show the current prompt for a kind, or a specific template.
fn show_prompt(
    config: &Config,
    kind: KindArg,
    template: Option<String>,
    formatter: &Formatter,
) -> Result<()> {
    let kind: AnalysisKind = kind.into();

    let spec: PromptSpec = match template {
        Some(id) => {
            let registry = config.registry()?;
            let template = registry
                .get(&id)
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown template '{}'", id)))?;
            if template.kind != kind {
                return Err(CliError::InvalidInput(format!(
                    "Template '{}' is for {}, not {}",
                    id, template.kind, kind
                )));
            }
            println!("{}", formatter.info(&format!("Template: {}", template.name)));
            template.prompt.clone()
        }
        None => config.drafts()?.get(kind).clone(),
    };

    println!("{}\n", formatter.heading(&format!("{} (system)", kind)));
    println!("{}\n", spec.system);
    println!("{}\n", formatter.heading(&format!("{} (user)", kind)));
    println!("{}", spec.user);
    Ok(())
}
