//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod gfm;
mod rule;

pub use commonmark::commonmark_rules;
pub use gfm::{strikethrough, table_rules};
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::options::Options;
use crate::utilities::is_block;

/// Elements dropped with their content unless a rule claims them
const DEFAULT_REMOVED: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML)
    keep_rules: Vec<Filter>,
    /// Remove rules (remove entirely)
    remove_rules: Vec<Filter>,
    /// Built-in CommonMark and table rules
    builtin_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        let mut builtin_rules = commonmark_rules();
        builtin_rules.extend(table_rules());

        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: vec![Filter::tags(DEFAULT_REMOVED)],
            builtin_rules,
        }
    }

    /// Add a custom rule. Re-using a key replaces the earlier rule in place.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// Keys of the registered custom rules, in registration order
    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// Find the appropriate rule for a node
    pub fn for_node<'a>(&'a self, node: &NodeRef, options: &Options) -> Option<&'a Rule> {
        let tag = node.tag_name();

        self.custom_rules
            .values()
            .chain(&self.builtin_rules)
            .find(|rule| rule.filter.matches(tag, node, options))
    }

    /// Check if a node should be kept as HTML
    pub fn should_keep(&self, node: &NodeRef, options: &Options) -> bool {
        let tag = node.tag_name();

        // Don't keep if a custom or built-in rule matches
        if self.for_node(node, options).is_some() {
            return false;
        }

        self.keep_rules
            .iter()
            .any(|filter| filter.matches(tag, node, options))
    }

    /// Check if a node should be removed
    pub fn should_remove(&self, node: &NodeRef, options: &Options) -> bool {
        let tag = node.tag_name();

        // Don't remove if keep matches
        if self.should_keep(node, options) {
            return false;
        }

        // Don't remove if a custom or built-in rule matches
        if self.for_node(node, options).is_some() {
            return false;
        }

        self.remove_rules
            .iter()
            .any(|filter| filter.matches(tag, node, options))
    }

    /// Get the keep replacement for a node
    pub fn keep_replacement(&self, node: &NodeRef) -> String {
        let html = node.outer_html();
        if is_block(node.tag_name()) {
            format!("\n\n{html}\n\n")
        } else {
            html
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_custom_rules_checked_first() {
        let mut rules = Rules::new();
        rules.add("shout", Rule::for_tag("strong", |_, c, _| c.to_uppercase()));

        let node = Node::element("strong");
        let node_ref = NodeRef::new(&node);
        let rule = rules.for_node(&node_ref, &Options::default()).unwrap();
        assert_eq!(rule.replace(&node_ref, "hey", &Options::default()), "HEY");
    }

    #[test]
    fn test_custom_key_replaced_in_place() {
        let mut rules = Rules::new();
        rules.add("a", Rule::for_tag("mark", |_, c, _| c.to_string()));
        rules.add("b", Rule::for_tag("kbd", |_, c, _| c.to_string()));
        rules.add("a", Rule::for_tag("mark", |_, c, _| format!("=={c}==")));

        assert_eq!(rules.custom_keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_default_removals() {
        let rules = Rules::new();
        let options = Options::default();
        let script = Node::element("script");
        assert!(rules.should_remove(&NodeRef::new(&script), &options));

        let p = Node::element("p");
        assert!(!rules.should_remove(&NodeRef::new(&p), &options));
    }

    #[test]
    fn test_keep_loses_to_rules() {
        let mut rules = Rules::new();
        rules.keep(Filter::tags(&["p", "video"]));
        let options = Options::default();

        let p = Node::element("p");
        assert!(!rules.should_keep(&NodeRef::new(&p), &options));

        let video = Node::element("video");
        assert!(rules.should_keep(&NodeRef::new(&video), &options));
        assert_eq!(
            rules.keep_replacement(&NodeRef::new(&video)),
            "<video></video>"
        );
    }
}
