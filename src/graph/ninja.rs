//! Ninja build file rendering

use super::BuildGraph;

const HEADER: &str = "# This file is generated by assetman. Do not edit.";

/// Render the graph as a `build.ninja` document.
///
/// Rules come first in the order they were added, then edges, then the
/// `default` statement. Nothing is sorted here, so output order is exactly
/// declaration order.
pub fn render_ninja(graph: &BuildGraph) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for rule in graph.rules() {
        out.push('\n');
        out.push_str(&format!("rule {}\n", rule.name));
        out.push_str(&format!("  command = {}\n", rule.command));
        if let Some(description) = &rule.description {
            out.push_str(&format!("  description = {}\n", description));
        }
        if rule.generator {
            out.push_str("  generator = 1\n");
        }
        if rule.restat {
            out.push_str("  restat = 1\n");
        }
    }

    if !graph.edges().is_empty() {
        out.push('\n');
    }
    for edge in graph.edges() {
        out.push_str("build ");
        out.push_str(&join_paths(&edge.outputs));
        out.push_str(": ");
        out.push_str(&edge.rule);
        if !edge.inputs.is_empty() {
            out.push(' ');
            out.push_str(&join_paths(&edge.inputs));
        }
        out.push('\n');
        for (key, value) in &edge.variables {
            out.push_str(&format!("  {} = {}\n", key, value));
        }
    }

    if !graph.defaults().is_empty() {
        out.push('\n');
        out.push_str("default ");
        out.push_str(&join_paths(graph.defaults()));
        out.push('\n');
    }

    out
}

/// Whether `name` can be written as a rule name or variable key.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || "_.-".contains(c))
}

/// Ninja has no escape for a line break, so text containing one cannot be
/// written at all.
pub fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

/// Escape a path for a `build` or `default` line. Paths never contain line
/// breaks; the graph rejects them when an edge is added.
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '$' => escaped.push_str("$$"),
            ' ' => escaped.push_str("$ "),
            ':' => escaped.push_str("$:"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape literal text for a variable value, where only `$` is special.
pub fn escape_value(value: &str) -> String {
    value.replace('$', "$$")
}

fn join_paths(paths: &[String]) -> String {
    paths.iter().map(|p| escape_path(p)).collect::<Vec<_>>().join(" ")
}
