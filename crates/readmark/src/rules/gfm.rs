//! GitHub-flavoured extensions: tables and strikethrough.

use super::{Filter, Rule};
use crate::node::NodeRef;
use crate::utilities::wrap_flanking;

/// Table rules, part of the built-in set
pub fn table_rules() -> Vec<Rule> {
    vec![table_cell_rule(), table_row_rule(), table_section_rule(), table_rule()]
}

/// `~~text~~` for `del`, `s` and `strike`.
///
/// Not part of the built-in set; [`crate::Converter::standard`] registers it
/// as the `strikethrough` custom rule.
pub fn strikethrough() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |_, content, _| {
        wrap_flanking(content, "~~")
    })
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |node, content, _| {
        let first = node.preceding_element_siblings().next().is_none();
        let prefix = if first { "| " } else { " " };
        let cell = content.trim().replace('\n', " ").replace('|', "\\|");
        format!("{prefix}{cell} |")
    })
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |node, content, _| {
        let row = format!("\n{}", content.trim());
        if !is_heading_row(node) {
            return row;
        }

        let border: String = node
            .element_children()
            .filter(|cell| matches!(cell.tag_name(), "th" | "td"))
            .enumerate()
            .map(|(i, _)| if i == 0 { "| --- |" } else { " --- |" })
            .collect();
        format!("{row}\n{border}")
    })
}

/// The row under which the `| --- |` separator goes: the first row of a
/// `thead`, or the first row of the table when it has no `thead`.
fn is_heading_row(tr: &NodeRef) -> bool {
    if tr.preceding_element_siblings().any(|n| n.tag_name() == "tr") {
        return false;
    }

    let Some(parent) = tr.parent() else {
        return false;
    };

    match parent.tag_name() {
        "thead" | "table" => true,
        "tbody" | "tfoot" => parent
            .preceding_element_siblings()
            .all(|n| matches!(n.tag_name(), "caption" | "colgroup")),
        _ => false,
    }
}

fn table_section_rule() -> Rule {
    Rule::for_tags(&["thead", "tbody", "tfoot"], |_, content, _| content.to_string())
}

fn table_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            // Only tables with at least one row are rendered as tables
            tag == "table" && node.find(|n| n.tag_name() == "tr").is_some()
        }),
        |_, content, _| {
            let rows = content.trim_matches('\n');
            format!("\n\n{rows}\n\n")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::options::Options;

    #[test]
    fn test_strikethrough() {
        let del = Node::element("del");
        let result = strikethrough().replace(&NodeRef::new(&del), "gone", &Options::default());
        assert_eq!(result, "~~gone~~");
    }

    #[test]
    fn test_heading_row_detection() {
        let mut table = Node::element("table");
        let mut tbody = Node::element("tbody");
        tbody.add_child(Node::element("tr"));
        tbody.add_child(Node::element("tr"));
        table.add_child(tbody);

        let table_ref = NodeRef::new(&table);
        let tbody_ref = table_ref.child(0).unwrap();
        assert!(is_heading_row(&tbody_ref.child(0).unwrap()));
        assert!(!is_heading_row(&tbody_ref.child(1).unwrap()));
    }

    #[test]
    fn test_body_after_thead_has_no_separator() {
        let mut table = Node::element("table");
        table.add_child(Node::element("thead"));
        let mut tbody = Node::element("tbody");
        tbody.add_child(Node::element("tr"));
        table.add_child(tbody);

        let table_ref = NodeRef::new(&table);
        let tbody_ref = table_ref.child(1).unwrap();
        assert!(!is_heading_row(&tbody_ref.child(0).unwrap()));
    }
}
