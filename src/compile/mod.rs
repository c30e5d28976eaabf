//! Graph compilation
//!
//! Turns evaluated declarations into a [`BuildGraph`]. Resolution runs in two
//! phases: builders over the source tree first, then `fromBuild` builders,
//! which match against the outputs phase one declared instead of the disk
//! (those files do not exist yet when the graph is generated).

use crate::domain::{BundleBuilder, Declarations, EdgeBuilder, RuleDecl, SingleBuilder};
use crate::error::{GenerateError, GenerateResult};
use crate::graph::ninja::{has_line_break, is_valid_name};
use crate::graph::{BuildGraph, Edge, Rule, PHONY};
use crate::pattern::PatternResolver;
use crate::script;
use crate::utils::{file_stem, join_root, parent_dir};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub mod regen;

pub use regen::{wire_regeneration, RegenOptions, CLEAN, COMPARE_ECHO, GENERATE};

/// Rule names the generator defines for itself.
pub const RESERVED_RULES: [&str; 4] = [PHONY, COMPARE_ECHO, GENERATE, CLEAN];

/// Result of compiling one set of declarations.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub graph: BuildGraph,
    /// Outputs of every single/bundle edge: phase one, then phase two.
    pub outputs: Vec<String>,
    /// Distinct source-relative patterns, in first-seen order.
    pub source_patterns: Vec<String>,
    /// Soft warnings raised while compiling.
    pub warnings: Vec<String>,
}

/// Compiles declarations against one source root.
///
/// The pattern cache lives as long as the compiler, which is one generation
/// run.
pub struct GraphCompiler {
    src_root: String,
    resolver: PatternResolver,
}

impl GraphCompiler {
    pub fn new(src_root: impl Into<String>) -> Self {
        Self::with_resolver(src_root, PatternResolver::new())
    }

    pub fn with_resolver(src_root: impl Into<String>, resolver: PatternResolver) -> Self {
        Self { src_root: src_root.into(), resolver }
    }

    pub fn compile(mut self, decls: &Declarations) -> GenerateResult<Compiled> {
        let mut compiled = Compiled {
            graph: BuildGraph::new(),
            outputs: Vec::new(),
            source_patterns: Vec::new(),
            warnings: Vec::new(),
        };

        compile_rules(&mut compiled.graph, &decls.rules)?;
        for builder in decls.edge_builders() {
            validate_builder(&compiled.graph, builder)?;
        }

        // Phase 1: source-relative builders, resolved against the filesystem.
        let mut deferred = Vec::new();
        let src_root = self.src_root.clone();
        for builder in decls.edge_builders() {
            if builder.build_relative() {
                deferred.push(builder);
                continue;
            }

            let pattern = builder.pattern();
            if !compiled.source_patterns.iter().any(|p| p == pattern) {
                compiled.source_patterns.push(pattern.to_string());
            }

            let files = self.resolver.resolve(pattern, Path::new(&src_root))?;
            let outputs = compile_builder(&mut compiled, builder, &files, &src_root)?;
            compiled.outputs.extend(outputs);
        }

        // Phase 2: build-relative builders see only what phase 1 declared.
        let phase_one = compiled.outputs.clone();
        let mut phase_two = Vec::new();
        for builder in deferred {
            let mut files = Vec::new();
            for output in &phase_one {
                if self.resolver.matches(output, builder.pattern())? {
                    files.push(output.clone());
                }
            }
            let outputs = compile_builder(&mut compiled, builder, &files, ".")?;
            phase_two.extend(outputs);
        }
        compiled.outputs.extend(phase_two);

        tracing::debug!(
            "compiled {} edge(s) from {} source pattern(s)",
            compiled.graph.edges().len(),
            compiled.source_patterns.len()
        );
        Ok(compiled)
    }
}

fn compile_rules(graph: &mut BuildGraph, rules: &[RuleDecl]) -> GenerateResult<()> {
    for rule in rules {
        if RESERVED_RULES.contains(&rule.name.as_str()) {
            return Err(GenerateError::config(format!(
                "rule name '{}' is reserved for generated edges",
                rule.name
            )));
        }
        if !is_valid_name(&rule.name) {
            return Err(GenerateError::config(format!(
                "rule name '{}' is not valid; use letters, digits, '_', '.' or '-'",
                rule.name
            )));
        }
        let Some(command) = &rule.command else {
            return Err(GenerateError::config(format!("rule '{}' has no command", rule.name)));
        };
        if has_line_break(command) {
            return Err(GenerateError::config(format!(
                "rule '{}' has a line break in its command",
                rule.name
            )));
        }
        graph.add_rule(Rule::new(&rule.name, command))?;
    }
    Ok(())
}

fn validate_builder(graph: &BuildGraph, builder: EdgeBuilder<'_>) -> GenerateResult<()> {
    let kind = builder.kind();
    let pattern = builder.pattern();
    let Some(rule) = builder.rule() else {
        return Err(GenerateError::config(format!(
            "{kind}('{pattern}') has no rule; add .using('<rule>')"
        )));
    };
    if !graph.has_rule(rule) {
        return Err(GenerateError::config(format!(
            "{kind}('{pattern}') uses undeclared rule '{rule}'"
        )));
    }
    if has_line_break(pattern) {
        return Err(GenerateError::config(format!(
            "{kind}({pattern:?}) has a line break in its pattern"
        )));
    }
    if builder.targets().iter().any(|t| has_line_break(t)) {
        return Err(GenerateError::config(format!(
            "{kind}('{pattern}') has a line break in a target"
        )));
    }
    for (key, value) in builder.assignments() {
        if !is_valid_name(key) {
            return Err(GenerateError::config(format!(
                "{kind}('{pattern}') assigns invalid variable name '{key}'"
            )));
        }
        if has_line_break(value) {
            return Err(GenerateError::config(format!(
                "{kind}('{pattern}') has a line break in the value of '{key}'"
            )));
        }
    }
    if let EdgeBuilder::Single(single) = builder {
        if single.target.is_none() {
            return Err(GenerateError::config(format!(
                "single('{pattern}') has no target; add .to(...) or .toExt(...)"
            )));
        }
    }
    Ok(())
}

fn compile_builder(
    compiled: &mut Compiled,
    builder: EdgeBuilder<'_>,
    files: &[String],
    root: &str,
) -> GenerateResult<Vec<String>> {
    match builder {
        EdgeBuilder::Single(single) => compile_single(compiled, single, files, root),
        EdgeBuilder::Bundle(bundle) => compile_bundle(compiled, bundle, files, root),
    }
}

/// One edge per matched file. The output sits in the matched file's directory.
fn compile_single(
    compiled: &mut Compiled,
    single: &SingleBuilder,
    files: &[String],
    root: &str,
) -> GenerateResult<Vec<String>> {
    let rule = single.rule.as_deref().unwrap_or_default();
    let mut outputs = Vec::with_capacity(files.len());

    for file in files {
        let Some(out_name) = single.output_name(file_stem(file)) else {
            continue;
        };
        let output = join_root(parent_dir(file), &out_name);

        let mut edge = Edge::new(rule, vec![output.clone()]).inputs(vec![join_root(root, file)]);
        for (key, value) in &single.assignments {
            edge = edge.variable(key, value);
        }
        compiled.graph.add_edge(edge).map_err(|source| GenerateError::Edge {
            kind: "single",
            pattern: single.pattern.clone(),
            source,
        })?;
        outputs.push(output);
    }

    Ok(outputs)
}

/// One fan-in edge consuming every matched file.
fn compile_bundle(
    compiled: &mut Compiled,
    bundle: &BundleBuilder,
    files: &[String],
    root: &str,
) -> GenerateResult<Vec<String>> {
    if bundle.targets.is_empty() {
        let warning =
            format!("No targets specified for bundle clause with pattern: {}", bundle.pattern);
        tracing::warn!("{}", warning);
        compiled.warnings.push(warning);
        return Ok(Vec::new());
    }
    if files.is_empty() {
        tracing::debug!("bundle('{}') matched nothing, skipping", bundle.pattern);
        return Ok(Vec::new());
    }

    let inputs = files.iter().map(|f| join_root(root, f)).collect();
    let rule = bundle.rule.as_deref().unwrap_or_default();
    let mut edge = Edge::new(rule, bundle.targets.clone()).inputs(inputs);
    for (key, value) in &bundle.assignments {
        edge = edge.variable(key, value);
    }
    compiled.graph.add_edge(edge).map_err(|source| GenerateError::Edge {
        kind: "bundle",
        pattern: bundle.pattern.clone(),
        source,
    })?;

    Ok(bundle.targets.clone())
}

/// Evaluate `source` and compile it into a complete, self-regenerating graph.
pub fn generate_from_source(source: &str, options: &RegenOptions) -> GenerateResult<Compiled> {
    let decls = script::evaluate(source).map_err(|err| GenerateError::Script {
        path: PathBuf::from(&options.script_path),
        source: err,
    })?;
    tracing::debug!(
        "{} declared {} rule(s), {} single(s), {} bundle(s)",
        options.script_path,
        decls.rules.len(),
        decls.singles.len(),
        decls.bundles.len()
    );

    let mut compiled = GraphCompiler::new(&options.src_root).compile(&decls)?;
    wire_regeneration(&mut compiled, options)?;
    Ok(compiled)
}

/// Read the pipeline description named by `options` and generate its graph.
pub fn generate(options: &RegenOptions) -> GenerateResult<Compiled> {
    let source = match fs::read_to_string(&options.script_path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(GenerateError::MissingScript { path: PathBuf::from(&options.script_path) });
        }
        Err(e) => return Err(e.into()),
    };
    generate_from_source(&source, options)
}
