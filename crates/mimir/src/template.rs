//! `{name}` prompt templates

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::error::{MimirError, Result};
use crate::memory::Variables;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// A prompt with named placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template, collecting its placeholder names in first-use order
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut variables: Vec<String> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&template) {
            let name = &caps[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }
        Self {
            template,
            variables,
        }
    }

    /// Placeholder names, in order of first appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Fill every placeholder. Values are inserted verbatim and never
    /// re-scanned for placeholders.
    pub fn render(&self, values: &Variables) -> Result<String> {
        if let Some(missing) = self.variables.iter().find(|v| !values.contains_key(*v)) {
            return Err(MimirError::MissingKey(missing.clone()));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}
