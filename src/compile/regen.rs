//! Self-regeneration wiring
//!
//! Adds the bookkeeping edges that keep `build.ninja` current:
//!
//! - `.dirty` is a phony target with no inputs, so it is always out of date.
//! - `.src_files` depends on `.dirty` and is rebuilt on every run by
//!   re-globbing the source patterns. The rule rewrites the list only when it
//!   changed and is marked `restat`, so an unchanged list stops there.
//! - `build.ninja` depends on the description and on `.src_files`, and is
//!   rebuilt by re-running the generator with the same source path.
//! - `clean` aliases the executor's own clean tool.
//! - `default` lists every user output, or just `build.ninja` when there are
//!   none, so `clean` is never built by accident.

use super::Compiled;
use crate::error::GenerateResult;
use crate::graph::ninja::escape_value;
use crate::graph::{Edge, Rule, PHONY};
use crate::utils::shell_quote;

pub const COMPARE_ECHO: &str = "COMPARE_ECHO";
pub const GENERATE: &str = "GENERATE";
pub const CLEAN: &str = "CLEAN";

/// Subcommand the `COMPARE_ECHO` rule invokes to refresh the file list.
pub const REFRESH_SUBCOMMAND: &str = "refresh-file-list";

/// Paths and commands the bookkeeping edges are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenOptions {
    /// Program that re-runs the generator.
    pub program: String,
    /// Source directory exactly as the generator was pointed at it.
    pub src_root: String,
    /// Pipeline description path (build-dir relative or absolute).
    pub script_path: String,
    /// Settings file that also triggers regeneration when present.
    pub settings_path: Option<String>,
    pub graph_file: String,
    pub file_list: String,
    pub dirty_marker: String,
    pub clean_command: String,
}

impl RegenOptions {
    pub fn new(program: impl Into<String>, src_root: impl Into<String>) -> Self {
        let src_root = src_root.into();
        Self {
            program: program.into(),
            script_path: crate::utils::join_root(&src_root, crate::config::DEFAULT_SCRIPT),
            src_root,
            settings_path: None,
            graph_file: crate::config::DEFAULT_GRAPH_FILE.to_string(),
            file_list: crate::config::DEFAULT_FILE_LIST.to_string(),
            dirty_marker: crate::config::DEFAULT_DIRTY_MARKER.to_string(),
            clean_command: crate::config::DEFAULT_CLEAN_COMMAND.to_string(),
        }
    }
}

/// Append bookkeeping rules and edges, and register the default target set.
pub fn wire_regeneration(compiled: &mut Compiled, options: &RegenOptions) -> GenerateResult<()> {
    let program = escape_value(&shell_quote(&options.program));
    let graph = &mut compiled.graph;

    graph.add_rule(
        Rule::new(
            COMPARE_ECHO,
            format!("{program} {REFRESH_SUBCOMMAND} --root $root --output $out $patterns"),
        )
        .description("Updating file list...")
        .restat(true),
    )?;
    graph.add_rule(
        Rule::new(GENERATE, format!("{program} {}", escape_value(&shell_quote(&options.src_root))))
            .description("Re-running assetman...")
            .generator(true),
    )?;
    graph.add_rule(Rule::new(CLEAN, &options.clean_command).description("Cleaning built files..."))?;

    graph.add_edge(Edge::new(PHONY, vec![options.dirty_marker.clone()]))?;

    let mut regen_inputs = vec![options.script_path.clone()];
    if let Some(settings) = &options.settings_path {
        regen_inputs.push(settings.clone());
    }

    if !compiled.source_patterns.is_empty() {
        let patterns: Vec<String> =
            compiled.source_patterns.iter().map(|p| shell_quote(p)).collect();
        graph.add_edge(
            Edge::new(COMPARE_ECHO, vec![options.file_list.clone()])
                .inputs(vec![options.dirty_marker.clone()])
                .variable("patterns", escape_value(&patterns.join(" ")))
                .variable("root", escape_value(&shell_quote(&options.src_root))),
        )?;
        regen_inputs.push(options.file_list.clone());
    }

    graph.add_edge(Edge::new(GENERATE, vec![options.graph_file.clone()]).inputs(regen_inputs))?;
    graph.add_edge(Edge::new(CLEAN, vec!["clean".to_string()]))?;

    // With no user outputs, a bare `ninja` would otherwise build every root,
    // `clean` included. The graph file is always safe to bring up to date.
    if compiled.outputs.is_empty() {
        graph.set_defaults(vec![options.graph_file.clone()]);
    } else {
        graph.set_defaults(compiled.outputs.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{generate_from_source, GraphCompiler};
    use crate::graph::BuildGraph;
    use crate::error::GenerateError;
    use crate::graph::GraphError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn options_for(root: &Path) -> RegenOptions {
        let mut options = RegenOptions::new("assetman", root.to_string_lossy());
        options.script_path = "assets.js".to_string();
        options
    }

    #[test]
    fn end_to_end_graph() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("foo.psd"), "").unwrap();
        fs::write(tmp.path().join("bar.psd"), "").unwrap();

        let mut options = RegenOptions::new("assetman", "src");
        options.script_path = "src/assets.js".to_string();
        let mut compiled = GraphCompiler::new(tmp.path().to_string_lossy())
            .compile(
                &crate::script::evaluate(
                    "rule('convert').command('tool $in $out');\
                     single('*.psd').toExt('.png').using('convert');",
                )
                .unwrap(),
            )
            .unwrap();
        wire_regeneration(&mut compiled, &options).unwrap();

        let graph = &compiled.graph;
        let converted: Vec<_> = graph
            .edges_using("convert")
            .map(|e| (e.outputs[0].as_str(), e.inputs.len()))
            .collect();
        assert_eq!(converted, vec![("bar.png", 1), ("foo.png", 1)]);
        assert_eq!(graph.defaults(), ["bar.png".to_string(), "foo.png".to_string()]);

        let dirty = graph.producer_of(".dirty").expect("dirty edge");
        assert_eq!(dirty.rule, PHONY);
        assert!(dirty.inputs.is_empty());

        let list = graph.producer_of(".src_files").expect("file list edge");
        assert_eq!(list.rule, COMPARE_ECHO);
        assert_eq!(list.inputs, vec![".dirty"]);
        assert!(list.variables.contains(&("patterns".to_string(), "'*.psd'".to_string())));
        assert!(list.variables.contains(&("root".to_string(), "src".to_string())));

        let regen = graph.producer_of("build.ninja").expect("regen edge");
        assert_eq!(regen.rule, GENERATE);
        assert_eq!(regen.inputs, vec!["src/assets.js", ".src_files"]);

        assert_eq!(graph.producer_of("clean").map(|e| e.rule.as_str()), Some(CLEAN));

        let rules: Vec<_> = graph.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rules, vec!["convert", COMPARE_ECHO, GENERATE, CLEAN]);
        let generate = &graph.rules()[2];
        assert!(generate.generator);
        assert_eq!(generate.command, "assetman src");
        assert!(graph.rules()[1].restat);
    }

    #[test]
    fn no_file_list_without_source_patterns() {
        let tmp = TempDir::new().unwrap();
        let compiled = generate_from_source("rule('r').command('x')", &options_for(tmp.path()))
            .unwrap();
        assert!(compiled.graph.producer_of(".src_files").is_none());
        let regen = compiled.graph.producer_of("build.ninja").expect("regen edge");
        assert_eq!(regen.inputs, vec!["assets.js"]);
    }

    #[test]
    fn default_never_falls_through_to_clean() {
        let tmp = TempDir::new().unwrap();
        let compiled = generate_from_source("rule('r').command('x')", &options_for(tmp.path()))
            .unwrap();
        assert_eq!(compiled.graph.defaults(), ["build.ninja".to_string()]);
        assert!(compiled.graph.render().ends_with("\ndefault build.ninja\n"));
    }

    #[test]
    fn settings_file_triggers_regeneration() {
        let tmp = TempDir::new().unwrap();
        let mut options = options_for(tmp.path());
        options.settings_path = Some("assetman.toml".to_string());
        let compiled = generate_from_source("", &options).unwrap();
        let regen = compiled.graph.producer_of("build.ninja").expect("regen edge");
        assert_eq!(regen.inputs, vec!["assets.js", "assetman.toml"]);
    }

    #[test]
    fn user_output_colliding_with_bookkeeping_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        let err = generate_from_source(
            "rule('r').command('x'); bundle('*.txt').to('clean').using('r')",
            &options_for(tmp.path()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Graph(GraphError::DuplicateOutput { ref output, .. }) if output == "clean"
        ));
    }

    #[test]
    fn quotes_program_and_patterns() {
        let mut options = RegenOptions::new("/opt/my tools/assetman", "my assets");
        options.script_path = "my assets/assets.js".to_string();

        let mut compiled = Compiled {
            graph: BuildGraph::new(),
            outputs: Vec::new(),
            source_patterns: vec!["**/*.psd".to_string(), "$odd/*.png".to_string()],
            warnings: Vec::new(),
        };
        wire_regeneration(&mut compiled, &options).unwrap();

        let compare = &compiled.graph.rules()[0];
        assert!(compare.command.starts_with("'/opt/my tools/assetman' refresh-file-list"));
        let generate = &compiled.graph.rules()[1];
        assert_eq!(generate.command, "'/opt/my tools/assetman' 'my assets'");

        let list = compiled.graph.producer_of(".src_files").expect("file list edge");
        assert!(list
            .variables
            .contains(&("patterns".to_string(), "'**/*.psd' '$$odd/*.png'".to_string())));
    }
}
