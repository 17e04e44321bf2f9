//! Directed-graph text export

use std::collections::BTreeMap;
use std::fmt::Write;

/// Render a resolved dependency set as Graphviz dot, one edge per dependency.
/// Dependency names are sorted so the output is deterministic and
/// diff-friendly regardless of discovery order.
pub fn render_dot(root: &str, dependencies: &BTreeMap<String, String>) -> String {
    let mut out = String::from("digraph deps {\n");
    for dependency in dependencies.keys() {
        let _ = writeln!(out, "    \"{}\" -> \"{}\"", root, dependency);
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::render_dot;
    use std::collections::BTreeMap;

    #[test]
    fn edges_render_in_sorted_order() {
        let mut deps = BTreeMap::new();
        deps.insert("c".to_string(), "2".to_string());
        deps.insert("b".to_string(), "1".to_string());

        let got = render_dot("a", &deps);
        assert_eq!(
            got,
            "digraph deps {\n    \"a\" -> \"b\"\n    \"a\" -> \"c\"\n}\n"
        );
    }

    #[test]
    fn empty_graph() {
        assert_eq!(render_dot("a", &BTreeMap::new()), "digraph deps {\n}\n");
    }
}
