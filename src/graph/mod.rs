//! Build graph model
//!
//! Rules, resolved edges and the default target set. Edges reference rules by
//! name, and every output path has exactly one producing edge.

use std::collections::HashMap;

pub mod ninja;

pub use ninja::render_ninja;

use ninja::{has_line_break, is_valid_name};

/// Ninja's built-in alias rule.
pub const PHONY: &str = "phony";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub command: String,
    pub description: Option<String>,
    /// Output is the build file itself.
    pub generator: bool,
    /// Re-stat outputs so an unchanged mtime stops propagation.
    pub restat: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            description: None,
            generator: false,
            restat: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn generator(mut self, generator: bool) -> Self {
        self.generator = generator;
        self
    }

    pub fn restat(mut self, restat: bool) -> Self {
        self.restat = restat;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
    pub rule: String,
    /// Edge-scoped variables, written verbatim (values may reference `$in`).
    pub variables: Vec<(String, String)>,
}

impl Edge {
    pub fn new(rule: impl Into<String>, outputs: Vec<String>) -> Self {
        Self { outputs, inputs: Vec::new(), rule: rule.into(), variables: Vec::new() }
    }

    pub fn inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((key.into(), value.into()));
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("rule '{0}' is declared more than once")]
    DuplicateRule(String),

    #[error("edge producing [{outputs}] uses undeclared rule '{rule}'")]
    UnknownRule { rule: String, outputs: String },

    #[error("edge using rule '{rule}' declares no outputs")]
    EmptyOutputs { rule: String },

    #[error("output '{output}' is produced by more than one edge (rules '{first}' and '{second}')")]
    DuplicateOutput { output: String, first: String, second: String },

    #[error("edge using rule '{rule}' lists '{path}' as both input and output")]
    SelfDependency { path: String, rule: String },

    #[error("'{name}' is not a valid rule or variable name (use letters, digits, '_', '.', '-')")]
    InvalidName { name: String },

    #[error("rule '{rule}' has a line break in {what} {text:?}")]
    LineBreak { rule: String, what: &'static str, text: String },
}

#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    rules: Vec<Rule>,
    edges: Vec<Edge>,
    defaults: Vec<String>,
    producers: HashMap<String, usize>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<(), GraphError> {
        if !is_valid_name(&rule.name) {
            return Err(GraphError::InvalidName { name: rule.name });
        }
        if rule.name == PHONY || self.has_rule(&rule.name) {
            return Err(GraphError::DuplicateRule(rule.name));
        }
        let texts = [("command", Some(&rule.command)), ("description", rule.description.as_ref())];
        for (what, text) in texts {
            if let Some(text) = text.filter(|t| has_line_break(t)) {
                let text = text.clone();
                return Err(GraphError::LineBreak { rule: rule.name.clone(), what, text });
            }
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn has_rule(&self, name: &str) -> bool {
        name == PHONY || self.rules.iter().any(|r| r.name == name)
    }

    /// Add an edge after checking its rule exists and none of its outputs is
    /// already produced elsewhere.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if edge.outputs.is_empty() {
            return Err(GraphError::EmptyOutputs { rule: edge.rule });
        }
        if !self.has_rule(&edge.rule) {
            return Err(GraphError::UnknownRule {
                rule: edge.rule.clone(),
                outputs: edge.outputs.join(", "),
            });
        }

        let line_break = |what: &'static str, text: &String| GraphError::LineBreak {
            rule: edge.rule.clone(),
            what,
            text: text.clone(),
        };
        if let Some(path) = edge.outputs.iter().chain(&edge.inputs).find(|p| has_line_break(p)) {
            return Err(line_break("path", path));
        }
        for (key, value) in &edge.variables {
            if !is_valid_name(key) {
                return Err(GraphError::InvalidName { name: key.clone() });
            }
            if has_line_break(value) {
                return Err(line_break("variable value", value));
            }
        }

        if let Some(path) = edge.outputs.iter().find(|o| edge.inputs.contains(*o)) {
            return Err(GraphError::SelfDependency { path: path.clone(), rule: edge.rule.clone() });
        }

        let index = self.edges.len();
        for (pos, output) in edge.outputs.iter().enumerate() {
            let earlier = self
                .producers
                .get(output)
                .map(|&i| self.edges[i].rule.clone())
                .or_else(|| edge.outputs[..pos].contains(output).then(|| edge.rule.clone()));
            if let Some(first) = earlier {
                return Err(GraphError::DuplicateOutput {
                    output: output.clone(),
                    first,
                    second: edge.rule.clone(),
                });
            }
        }

        for output in &edge.outputs {
            self.producers.insert(output.clone(), index);
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn set_defaults(&mut self, defaults: Vec<String>) {
        self.defaults = defaults;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// The edge producing `output`, if any.
    pub fn producer_of(&self, output: &str) -> Option<&Edge> {
        self.producers.get(output).map(|&i| &self.edges[i])
    }

    /// Edges whose rule is `rule`, in emission order.
    pub fn edges_using<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.rule == rule)
    }

    pub fn render(&self) -> String {
        render_ninja(self)
    }
}
