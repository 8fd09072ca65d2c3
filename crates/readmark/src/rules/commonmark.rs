//! CommonMark rules for HTML to Markdown conversion.

use super::{Filter, Rule};
use crate::node::{Node, NodeRef};
use crate::options::{CodeBlockStyle, HeadingStyle, Options};
use crate::utilities::{clean_attribute, longest_run, wrap_flanking};

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content.trim()))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, options| format!("{}\n", options.br))
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, options| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

            let content = content.trim();
            if content.is_empty() {
                return String::new();
            }

            match options.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    let width = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                    format!("\n\n{}\n{}\n\n", content, underline.repeat(width))
                }
                // ATX headings live on a single line
                _ => format!("\n\n{} {}\n\n", "#".repeat(level), content.replace('\n', " ")),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::new(Filter::tags(&["ul", "ol"]), |node, content, _| {
        let content = content.trim_matches('\n');

        if node.parent_tag() == Some("li") {
            // Nested lists attach to the item line above them
            format!("\n{content}\n")
        } else {
            format!("\n\n{content}\n\n")
        }
    })
}

/// Marker for a list item: `N. ` inside an ordered list, the bullet otherwise
fn list_item_prefix(node: &NodeRef, options: &Options) -> String {
    let Some(parent) = node.parent().filter(|p| p.tag_name() == "ol") else {
        return format!("{} ", options.bullet_list_marker);
    };

    let start: usize = parent
        .attr("start")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1);
    let position = node
        .preceding_element_siblings()
        .filter(|n| n.tag_name() == "li")
        .count();
    format!("{}. ", start.saturating_add(position))
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        let prefix = list_item_prefix(node, options);
        let indent = " ".repeat(prefix.len());

        // Indent continuation lines to the item's content column
        let body = content
            .trim()
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 || line.is_empty() {
                    line.to_string()
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let separator = if node.next_element_sibling().is_some() {
            "\n"
        } else {
            ""
        };
        format!("{prefix}{body}{separator}")
    })
}

/// The code text and language hint of a `<pre>` block
fn code_block_parts(node: &Node) -> (String, Option<String>) {
    let code_child = node
        .element_children()
        .next()
        .filter(|c| c.tag_name() == "code" && node.element_children().count() == 1);

    let source = code_child.unwrap_or(node);
    let mut code = source.text_content();
    if code.ends_with('\n') {
        code.pop();
    }

    let language = source
        .classes()
        .chain(node.classes())
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .filter(|lang| !lang.is_empty())
        .map(str::to_string);

    (code, language)
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, options| {
            tag == "pre" && options.code_block_style == CodeBlockStyle::Indented
        }),
        |node, _, _| {
            let (code, _) = code_block_parts(node);
            let indented: Vec<String> = code.lines().map(|line| format!("    {line}")).collect();
            format!("\n\n{}\n\n", indented.join("\n"))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, options| {
            tag == "pre" && options.code_block_style == CodeBlockStyle::Fenced
        }),
        |node, _, options| {
            let (code, language) = code_block_parts(node);

            // The fence must be longer than any run of its character inside the code
            let fence_char = options.fence.chars().next().unwrap_or('`');
            let fence_len = options.fence.len().max(longest_run(&code, fence_char) + 1);
            let fence = fence_char.to_string().repeat(fence_len);

            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                fence,
                language.unwrap_or_default(),
                code,
                fence
            )
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "a" && node.attr("href").is_some_and(|h| !h.trim().is_empty())
        }),
        |node, content, _| {
            let href = clean_attribute(node.attr("href"))
                .replace('(', "\\(")
                .replace(')', "\\)");
            let title = clean_attribute(node.attr("title"));

            let title_part = if title.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", title.replace('"', "\\\""))
            };

            format!("[{}]({}{})", content.trim(), href, title_part)
        },
    )
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        wrap_flanking(content, &options.em_delimiter.to_string())
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        wrap_flanking(content, &options.strong_delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        // <code> inside <pre> belongs to the code block rules
        Filter::predicate(|tag, node, _| tag == "code" && !node.has_ancestor("pre")),
        |node, _, _| {
            let content = node.text_content().replace("\r\n", " ").replace(['\n', '\r'], " ");
            if content.is_empty() {
                return String::new();
            }

            // Pick a delimiter length that does not occur as a run inside the code
            let mut runs = Vec::new();
            let mut current = 0;
            for c in content.chars() {
                if c == '`' {
                    current += 1;
                } else if current > 0 {
                    runs.push(current);
                    current = 0;
                }
            }
            if current > 0 {
                runs.push(current);
            }
            let mut len = 1;
            while runs.contains(&len) {
                len += 1;
            }
            let delimiter = "`".repeat(len);

            let padded = content.starts_with('`')
                || content.ends_with('`')
                || (content.starts_with(' ')
                    && content.ends_with(' ')
                    && !content.trim().is_empty());
            let space = if padded { " " } else { "" };

            format!("{delimiter}{space}{content}{space}{delimiter}")
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        let title = clean_attribute(node.attr("title"));

        if src.is_empty() {
            return String::new();
        }

        let title_part = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title.replace('"', "\\\""))
        };

        format!("![{alt}]({src}{title_part})")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(rule: &Rule, node: &Node, content: &str) -> String {
        rule.replace(&NodeRef::new(node), content, &Options::default())
    }

    #[test]
    fn test_heading_setext() {
        let options = Options {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let h2 = Node::element("h2");
        let result = heading_rule().replace(&NodeRef::new(&h2), "Title", &options);
        assert_eq!(result, "\n\nTitle\n-----\n\n");

        let h3 = Node::element("h3");
        let result = heading_rule().replace(&NodeRef::new(&h3), "Sub", &options);
        assert_eq!(result, "\n\n### Sub\n\n");
    }

    #[test]
    fn test_blockquote_multiline() {
        let node = Node::element("blockquote");
        assert_eq!(
            apply(&blockquote_rule(), &node, "\n\none\n\ntwo\n\n"),
            "\n\n> one\n>\n> two\n\n"
        );
    }

    #[test]
    fn test_code_block_language_and_fence() {
        let mut pre = Node::element("pre");
        let mut code = Node::element_with_attrs("code", vec![("class", "language-rust")]);
        code.add_child(Node::text("let s = \"```\";\n"));
        pre.add_child(code);

        assert_eq!(
            apply(&fenced_code_block_rule(), &pre, ""),
            "\n\n````rust\nlet s = \"```\";\n````\n\n"
        );
    }

    #[test]
    fn test_pre_without_code() {
        let mut pre = Node::element("pre");
        pre.add_child(Node::text("plain\n  text"));
        assert_eq!(
            apply(&fenced_code_block_rule(), &pre, ""),
            "\n\n```\nplain\n  text\n```\n\n"
        );
    }

    #[test]
    fn test_inline_code_with_backticks() {
        let mut code = Node::element("code");
        code.add_child(Node::text("a ` b"));
        assert_eq!(apply(&code_rule(), &code, ""), "``a ` b``");

        let mut code = Node::element("code");
        code.add_child(Node::text("`tick"));
        assert_eq!(apply(&code_rule(), &code, ""), "`` `tick ``");
    }

    #[test]
    fn test_link_with_title_and_parens() {
        let a = Node::element_with_attrs(
            "a",
            vec![("href", "https://en.wikipedia.org/wiki/Rust_(language)"), ("title", "Say \"hi\"")],
        );
        assert_eq!(
            apply(&inline_link_rule(), &a, "Rust"),
            "[Rust](https://en.wikipedia.org/wiki/Rust_\\(language\\) \"Say \\\"hi\\\"\")"
        );
    }

    #[test]
    fn test_list_start_at_numeric_limit() {
        let start = usize::MAX.to_string();
        let mut ol = Node::element_with_attrs("ol", vec![("start", start.as_str())]);
        ol.add_child(Node::element("li"));
        ol.add_child(Node::element("li"));

        let ol_ref = NodeRef::new(&ol);
        let second = ol_ref.child(1).unwrap();
        assert_eq!(list_item_prefix(&second, &Options::default()), format!("{start}. "));
    }

    #[test]
    fn test_image_without_src() {
        let img = Node::element_with_attrs("img", vec![("alt", "nothing")]);
        assert_eq!(apply(&image_rule(), &img, ""), "");
    }
}
