//! Prompt templates and per-kind prompt drafts
//!
//! Each kind has one built-in template (`default-<kind>`) that can never be
//! changed or removed, plus any number of user-defined templates. The drafts
//! hold the prompt that the next run of each kind will use.

use crate::error::EngineError;
use crate::prompt::default_prompt;
use longread_domain::{AnalysisKind, PromptSpec};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Where a template comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// Shipped with the engine, read-only
    BuiltIn,
    /// Saved by the user
    UserDefined,
}

/// A named prompt for one analysis kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// The kind this template applies to
    pub kind: AnalysisKind,
    /// The prompt itself
    pub prompt: PromptSpec,
    /// Built-in or user-defined
    pub origin: TemplateOrigin,
}

impl PromptTemplate {
    /// True for built-in templates
    pub fn is_builtin(&self) -> bool {
        self.origin == TemplateOrigin::BuiltIn
    }
}

/// Identifier of the built-in template for `kind`
pub fn builtin_id(kind: AnalysisKind) -> String {
    format!("default-{}", kind.as_str())
}

/// Built-in and user-defined templates
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    builtins: Vec<PromptTemplate>,
    user: Vec<PromptTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry with one built-in template per kind and no user templates
    pub fn new() -> Self {
        let builtins = AnalysisKind::ALL
            .into_iter()
            .map(|kind| PromptTemplate {
                id: builtin_id(kind),
                name: "Default".to_string(),
                kind,
                prompt: default_prompt(kind),
                origin: TemplateOrigin::BuiltIn,
            })
            .collect();
        Self {
            builtins,
            user: Vec::new(),
        }
    }

    /// Templates for `kind`: the built-in first, then user templates in save order
    pub fn templates_for(&self, kind: AnalysisKind) -> Vec<&PromptTemplate> {
        self.builtins
            .iter()
            .chain(self.user.iter())
            .filter(|t| t.kind == kind)
            .collect()
    }

    /// User-defined templates in save order
    pub fn user_templates(&self) -> &[PromptTemplate] {
        &self.user
    }

    /// Look up any template by id
    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.builtins
            .iter()
            .chain(self.user.iter())
            .find(|t| t.id == id)
    }

    /// Save a new user template with a fresh id
    pub fn save(
        &mut self,
        kind: AnalysisKind,
        name: &str,
        prompt: PromptSpec,
    ) -> Result<&PromptTemplate, EngineError> {
        let id = Uuid::now_v7().to_string();
        self.insert(id, kind, name, prompt)
    }

    /// Add a user template with a known id (e.g. one loaded from disk)
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        kind: AnalysisKind,
        name: &str,
        prompt: PromptSpec,
    ) -> Result<&PromptTemplate, EngineError> {
        let id = id.into();
        let name = validate_name(name)?;
        if self.get(&id).is_some() {
            return Err(EngineError::Template(format!("Template id already exists: {}", id)));
        }

        debug!("Saving template {} ({}) for {}", name, id, kind);
        self.user.push(PromptTemplate {
            id,
            name,
            kind,
            prompt,
            origin: TemplateOrigin::UserDefined,
        });
        let index = self.user.len() - 1;
        Ok(&self.user[index])
    }

    /// Save the current draft for `kind` as a new user template
    pub fn save_draft(
        &mut self,
        drafts: &PromptDrafts,
        kind: AnalysisKind,
        name: &str,
    ) -> Result<&PromptTemplate, EngineError> {
        self.save(kind, name, drafts.get(kind).clone())
    }

    /// Replace the name and prompt of a user template
    pub fn update(&mut self, id: &str, name: &str, prompt: PromptSpec) -> Result<(), EngineError> {
        let name = validate_name(name)?;
        let template = self.user_mut(id)?;
        template.name = name;
        template.prompt = prompt;
        Ok(())
    }

    /// Remove a user template
    pub fn delete(&mut self, id: &str) -> Result<PromptTemplate, EngineError> {
        self.user_mut(id)?;
        let index = self
            .user
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EngineError::Template(format!("Template not found: {}", id)))?;
        Ok(self.user.remove(index))
    }

    fn user_mut(&mut self, id: &str) -> Result<&mut PromptTemplate, EngineError> {
        if self.builtins.iter().any(|t| t.id == id) {
            return Err(EngineError::Template(format!(
                "Built-in template cannot be modified: {}",
                id
            )));
        }
        self.user
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| EngineError::Template(format!("Template not found: {}", id)))
    }
}

fn validate_name(name: &str) -> Result<String, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Template("Template name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// The prompt each kind's next run will use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDrafts {
    drafts: BTreeMap<AnalysisKind, PromptSpec>,
}

impl Default for PromptDrafts {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptDrafts {
    /// Drafts initialized from the built-in prompts
    pub fn new() -> Self {
        let drafts = AnalysisKind::ALL
            .into_iter()
            .map(|kind| (kind, default_prompt(kind)))
            .collect();
        Self { drafts }
    }

    /// Current draft for `kind`
    pub fn get(&self, kind: AnalysisKind) -> &PromptSpec {
        &self.drafts[&kind]
    }

    /// Replace the draft for `kind`
    pub fn set(&mut self, kind: AnalysisKind, prompt: PromptSpec) {
        self.drafts.insert(kind, prompt);
    }

    /// Copy a template's prompt into the draft for its kind
    pub fn apply_template(&mut self, template: &PromptTemplate) {
        self.set(template.kind, template.prompt.clone());
    }

    /// Restore the built-in prompt for `kind`
    pub fn reset(&mut self, kind: AnalysisKind) {
        self.set(kind, default_prompt(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_per_kind() {
        let registry = TemplateRegistry::new();
        for kind in AnalysisKind::ALL {
            let templates = registry.templates_for(kind);
            assert_eq!(templates.len(), 1);
            assert_eq!(templates[0].id, builtin_id(kind));
            assert!(templates[0].is_builtin());
        }
        assert!(registry.get("default-plotholes").is_some());
    }

    #[test]
    fn test_save_and_list_user_template() {
        let mut registry = TemplateRegistry::new();
        let id = registry
            .save(AnalysisKind::Outline, "Terse", PromptSpec::new("sys", "Be terse."))
            .unwrap()
            .id
            .clone();

        let templates = registry.templates_for(AnalysisKind::Outline);
        assert_eq!(templates.len(), 2);
        assert!(templates[0].is_builtin());
        assert_eq!(templates[1].id, id);
        assert_eq!(registry.templates_for(AnalysisKind::Theme).len(), 1);
    }

    #[test]
    fn test_update_and_delete_user_template() {
        let mut registry = TemplateRegistry::new();
        let id = registry
            .save(AnalysisKind::Theme, "Mine", PromptSpec::new("a", "b"))
            .unwrap()
            .id
            .clone();

        registry.update(&id, "Renamed", PromptSpec::new("c", "d")).unwrap();
        let template = registry.get(&id).unwrap();
        assert_eq!(template.name, "Renamed");
        assert_eq!(template.prompt.user, "d");

        let removed = registry.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn test_builtin_is_read_only() {
        let mut registry = TemplateRegistry::new();
        let id = builtin_id(AnalysisKind::Summary);
        assert!(registry.update(&id, "x", PromptSpec::default()).is_err());
        assert!(registry.delete(&id).is_err());
        assert!(registry.get(&id).is_some());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = TemplateRegistry::new();
        let result = registry.save(AnalysisKind::Style, "  ", PromptSpec::default());
        assert!(matches!(result, Err(EngineError::Template(_))));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut registry = TemplateRegistry::new();
        registry
            .insert("abc", AnalysisKind::Style, "One", PromptSpec::default())
            .unwrap();
        assert!(registry
            .insert("abc", AnalysisKind::Style, "Two", PromptSpec::default())
            .is_err());
        assert!(registry
            .insert("default-style", AnalysisKind::Style, "Three", PromptSpec::default())
            .is_err());
    }

    #[test]
    fn test_drafts_apply_and_reset() {
        let mut registry = TemplateRegistry::new();
        let mut drafts = PromptDrafts::new();
        assert_eq!(drafts.get(AnalysisKind::Outline), &default_prompt(AnalysisKind::Outline));

        drafts.set(AnalysisKind::Outline, PromptSpec::new("s", "custom"));
        let id = registry
            .save_draft(&drafts, AnalysisKind::Outline, "From draft")
            .unwrap()
            .id
            .clone();

        drafts.reset(AnalysisKind::Outline);
        assert_eq!(drafts.get(AnalysisKind::Outline).user, default_prompt(AnalysisKind::Outline).user);

        let template = registry.get(&id).unwrap().clone();
        drafts.apply_template(&template);
        assert_eq!(drafts.get(AnalysisKind::Outline).user, "custom");
    }
}
