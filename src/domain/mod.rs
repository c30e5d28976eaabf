//! Edge builder declarations
//!
//! These are plain data collected while a pipeline description is evaluated.
//! They carry no behavior beyond chainable assignment; the compiler resolves
//! them into concrete edges.

use std::collections::BTreeMap;

/// Placeholder replaced by the matched file's stem in a `single` target.
pub const FILENAME_TOKEN: &str = "$filename";

/// A named shell command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub name: String,
    pub command: Option<String>,
}

impl RuleDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), command: None }
    }

    pub fn command(&mut self, command: impl Into<String>) -> &mut Self {
        self.command = Some(command.into());
        self
    }
}

/// One output per file matched by `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleBuilder {
    pub pattern: String,
    pub build_relative: bool,
    pub target: Option<String>,
    pub assignments: BTreeMap<String, String>,
    pub rule: Option<String>,
}

impl SingleBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            build_relative: false,
            target: None,
            assignments: BTreeMap::new(),
            rule: None,
        }
    }

    pub fn from_build(&mut self, from_build: bool) -> &mut Self {
        self.build_relative = from_build;
        self
    }

    pub fn to(&mut self, target: impl Into<String>) -> &mut Self {
        self.target = Some(target.into());
        self
    }

    /// Keep the matched file's stem and swap in `ext`.
    pub fn to_ext(&mut self, ext: &str) -> &mut Self {
        self.target = Some(format!("{FILENAME_TOKEN}{ext}"));
        self
    }

    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.assignments.insert(key.into(), value.into());
        self
    }

    pub fn using(&mut self, rule: impl Into<String>) -> &mut Self {
        self.rule = Some(rule.into());
        self
    }

    /// Output name for a matched file: the target template with every
    /// filename token replaced by the file's stem.
    pub fn output_name(&self, stem: &str) -> Option<String> {
        self.target.as_ref().map(|t| t.replace(FILENAME_TOKEN, stem))
    }
}

/// All files matched by `pattern` feed one edge producing `targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleBuilder {
    pub pattern: String,
    pub build_relative: bool,
    pub targets: Vec<String>,
    pub assignments: BTreeMap<String, String>,
    pub rule: Option<String>,
}

impl BundleBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            build_relative: false,
            targets: Vec::new(),
            assignments: BTreeMap::new(),
            rule: None,
        }
    }

    pub fn from_build(&mut self, from_build: bool) -> &mut Self {
        self.build_relative = from_build;
        self
    }

    /// Append targets. Repeated calls accumulate in call order.
    pub fn to<I, S>(&mut self, targets: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.assignments.insert(key.into(), value.into());
        self
    }

    pub fn using(&mut self, rule: impl Into<String>) -> &mut Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Borrowed view over either builder kind, used by the compiler to walk
/// singles and bundles through the same two-phase pass.
#[derive(Debug, Clone, Copy)]
pub enum EdgeBuilder<'a> {
    Single(&'a SingleBuilder),
    Bundle(&'a BundleBuilder),
}

impl<'a> EdgeBuilder<'a> {
    pub fn pattern(&self) -> &'a str {
        match self {
            EdgeBuilder::Single(s) => &s.pattern,
            EdgeBuilder::Bundle(b) => &b.pattern,
        }
    }

    pub fn build_relative(&self) -> bool {
        match self {
            EdgeBuilder::Single(s) => s.build_relative,
            EdgeBuilder::Bundle(b) => b.build_relative,
        }
    }

    pub fn rule(&self) -> Option<&'a str> {
        match self {
            EdgeBuilder::Single(s) => s.rule.as_deref(),
            EdgeBuilder::Bundle(b) => b.rule.as_deref(),
        }
    }

    pub fn assignments(&self) -> &'a BTreeMap<String, String> {
        match self {
            EdgeBuilder::Single(s) => &s.assignments,
            EdgeBuilder::Bundle(b) => &b.assignments,
        }
    }

    /// Declared target templates (a single has at most one).
    pub fn targets(&self) -> Vec<&'a str> {
        match self {
            EdgeBuilder::Single(s) => s.target.as_deref().into_iter().collect(),
            EdgeBuilder::Bundle(b) => b.targets.iter().map(String::as_str).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EdgeBuilder::Single(_) => "single",
            EdgeBuilder::Bundle(_) => "bundle",
        }
    }
}

/// Everything a pipeline description declared, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub rules: Vec<RuleDecl>,
    pub singles: Vec<SingleBuilder>,
    pub bundles: Vec<BundleBuilder>,
}

impl Declarations {
    /// Singles first, then bundles, matching the order edges are emitted in.
    pub fn edge_builders(&self) -> impl Iterator<Item = EdgeBuilder<'_>> {
        self.singles
            .iter()
            .map(EdgeBuilder::Single)
            .chain(self.bundles.iter().map(EdgeBuilder::Bundle))
    }
}
