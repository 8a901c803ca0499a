//! Graphviz DOT export of a step tree, for the `--dot-file` option:
//! `rankdir=LR`, record-shaped nodes with `[action | description |
//! labels]` fields, solid grey parent-to-child containment edges, dashed
//! cyan back-edges for explicit `depends_on` relations, and `wrapper`/
//! `skip` nodes styled dashed (they are structural scaffolding, not real
//! work).

use std::fmt::Write as _;

use crate::step::Step;

/// Render `root` and its full subtree as a Graphviz DOT digraph.
pub fn to_dot(root: &Step) -> String {
    let mut out = String::new();
    out.push_str("digraph plan {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=record];\n");

    write_nodes(root, &mut out);
    write_edges(root, &mut out);

    out.push_str("}\n");
    out
}

fn write_nodes(step: &Step, out: &mut String) {
    let description = if step.description.is_empty() {
        step.action.name().to_string()
    } else {
        step.description.clone()
    };
    let labels = if step.labels.is_empty() {
        String::new()
    } else {
        step.labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    };
    let record = format!("{{ {} | {} | {} }}", escape(step.action.name()), escape(&description), escape(&labels));
    let style = if matches!(step.action.name(), "wrapper" | "skip") { " style=dashed" } else { "" };
    let _ = writeln!(out, "    \"{}\" [label=\"{}\"{}];", escape(&step.id), record, style);
    for child in &step.children {
        write_nodes(child, out);
    }
}

fn write_edges(step: &Step, out: &mut String) {
    for child in &step.children {
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [style=solid, color=gray40];",
            escape(&step.id),
            escape(&child.id)
        );
        write_edges(child, out);
    }
    for dependency in &step.depends_on {
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [style=dashed, color=cyan4];",
            escape(dependency),
            escape(&step.id)
        );
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SkipAction;
    use crate::builder::StepBuilder;

    #[test]
    fn renders_rankdir_and_record_nodes() {
        let root = StepBuilder::new("root").build();
        let dot = to_dot(&root);
        assert!(dot.starts_with("digraph plan {\n"));
        assert!(dot.contains("rankdir=LR;"));
        assert!(dot.contains("shape=record"));
        assert!(dot.contains("\"root\""));
    }

    #[test]
    fn draws_solid_containment_and_dashed_cyan_dependency_edges() {
        let root = StepBuilder::new("root")
            .children_serially([
                StepBuilder::new("a").action(SkipAction).build(),
                StepBuilder::new("b").action(SkipAction).build(),
            ])
            .build();
        let dot = to_dot(&root);
        assert!(dot.contains("\"root\" -> \"a\" [style=solid, color=gray40];"));
        assert!(dot.contains("\"a\" -> \"b\" [style=dashed, color=cyan4];"));
    }

    #[test]
    fn skip_and_wrapper_nodes_are_styled_dashed() {
        let root = StepBuilder::new("root")
            .children([StepBuilder::new("a").action(SkipAction).build()])
            .build();
        let dot = to_dot(&root);
        let node_line = dot.lines().find(|l| l.starts_with("    \"a\"")).unwrap();
        assert!(node_line.contains("style=dashed"));
    }

    #[test]
    fn two_node_plan_has_exactly_one_dependency_back_edge() {
        let root = StepBuilder::new("root")
            .children([
                StepBuilder::new("a").action(SkipAction).build(),
                StepBuilder::new("b").action(SkipAction).depends_on_id("a").build(),
            ])
            .build();
        let dot = to_dot(&root);
        let back_edges = dot.lines().filter(|l| l.contains("color=cyan4")).count();
        assert_eq!(back_edges, 1);
    }
}
