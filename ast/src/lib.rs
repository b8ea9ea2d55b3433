use std::fmt;

use serde::{Deserialize, Serialize};
use types::{Context, ITERATION_VARIABLE};

/// Syntax tree for a template
///
/// Built once by the parser and never mutated afterwards. Parents own their
/// children so the tree can't contain cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Literal text
    Text(String),
    /// Dotted path to interpolate
    Variable(String),
    /// `if(condition)` with its two arms, elseif chains nest in `else_arm`
    Conditional {
        condition: String,
        then_arm: Box<Node>,
        else_arm: Box<Node>,
    },
    /// `for(source)` with an optional `sep` between elements
    Iteration {
        source: String,
        body: Box<Node>,
        separator: Option<Box<Node>>,
    },
    /// Children rendered one after another
    Sequence(Vec<Node>),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn variable(path: impl Into<String>) -> Self {
        Node::Variable(path.into())
    }

    pub fn conditional(condition: impl Into<String>, then_arm: Node, else_arm: Node) -> Self {
        Node::Conditional {
            condition: condition.into(),
            then_arm: Box::new(then_arm),
            else_arm: Box::new(else_arm),
        }
    }

    pub fn iteration(source: impl Into<String>, body: Node, separator: Option<Node>) -> Self {
        Node::Iteration {
            source: source.into(),
            body: Box::new(body),
            separator: separator.map(Box::new),
        }
    }

    /// Render this node against a context
    pub fn apply(&self, context: &Context) -> String {
        let mut output = String::new();
        self.apply_into(context, &mut output);
        output
    }

    fn apply_into(&self, context: &Context, output: &mut String) {
        match self {
            Node::Text(content) => output.push_str(content),
            Node::Variable(path) => output.push_str(&context.stringify(path)),
            Node::Conditional {
                condition,
                then_arm,
                else_arm,
            } => {
                if context.is_truthy(condition) {
                    then_arm.apply_into(context, output);
                } else {
                    else_arm.apply_into(context, output);
                }
            }
            Node::Iteration {
                source,
                body,
                separator,
            } => {
                let resolved = context.lookup(source).unwrap_or_default();

                let Some(items) = resolved.as_list() else {
                    // Anything but a list is iterated exactly once
                    let with_source = context.bind(source, &resolved);
                    let scope = with_source.bind(ITERATION_VARIABLE, &resolved);
                    body.apply_into(&scope, output);
                    return;
                };

                for (idx, item) in items.iter().enumerate() {
                    // `it` is bound last so it wins over sources like `it.children`
                    let with_source = context.bind(source, item);
                    let scope = with_source.bind(ITERATION_VARIABLE, item);

                    body.apply_into(&scope, output);

                    if let Some(separator) = separator {
                        if idx + 1 < items.len() {
                            separator.apply_into(&scope, output);
                        }
                    }
                }
            }
            Node::Sequence(children) => {
                for child in children {
                    child.apply_into(context, output);
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);

        match self {
            Node::Text(content) => writeln!(f, "{indent}Text<{content:?}>"),
            Node::Variable(path) => writeln!(f, "{indent}Variable<{path}>"),
            Node::Conditional {
                condition,
                then_arm,
                else_arm,
            } => {
                writeln!(f, "{indent}Conditional<{condition}>")?;
                then_arm.fmt_indented(f, depth + 1)?;
                writeln!(f, "{indent}else")?;
                else_arm.fmt_indented(f, depth + 1)
            }
            Node::Iteration {
                source,
                body,
                separator,
            } => {
                writeln!(f, "{indent}Iteration<{source}>")?;
                body.fmt_indented(f, depth + 1)?;

                match separator {
                    Some(separator) => {
                        writeln!(f, "{indent}sep")?;
                        separator.fmt_indented(f, depth + 1)
                    }
                    None => Ok(()),
                }
            }
            Node::Sequence(children) => {
                writeln!(f, "{indent}Sequence")?;
                children
                    .iter()
                    .try_for_each(|child| child.fmt_indented(f, depth + 1))
            }
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Sequence(vec![])
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod apply_tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use types::{Map, Value};

    use super::*;

    fn data(value: serde_json::Value) -> Map {
        match Value::from(value) {
            Value::Map(map) => map,
            other => panic!("expected a map, got {other:?}"),
        }
    }

    fn apply(node: &Node, value: serde_json::Value) -> String {
        let data = data(value);
        node.apply(&Context::new(&data))
    }

    #[test]
    fn text_is_returned_unchanged() {
        assert_eq!("a $ b\n", apply(&Node::text("a $ b\n"), json!({})));
    }

    #[test]
    fn variables_stringify_their_value() {
        let context = json!({
            "s": "text",
            "n": 42,
            "list": ["a", 1, "b"],
            "map": {"k": "v"},
            "nested": {"k": "v"}
        });

        assert_eq!("text", apply(&Node::variable("s"), context.clone()));
        assert_eq!("42", apply(&Node::variable("n"), context.clone()));
        assert_eq!("a1b", apply(&Node::variable("list"), context.clone()));
        assert_eq!("true", apply(&Node::variable("map"), context.clone()));
        assert_eq!("v", apply(&Node::variable("nested.k"), context.clone()));
        assert_eq!("", apply(&Node::variable("missing"), context.clone()));
        assert_eq!("", apply(&Node::variable("s.deeper"), context));
    }

    #[test]
    fn conditionals_pick_an_arm_by_truthiness() {
        let node = Node::conditional("flag", Node::text("then"), Node::text("else"));

        assert_eq!("then", apply(&node, json!({"flag": "yes"})));
        assert_eq!("then", apply(&node, json!({"flag": {"any": ""}})));
        assert_eq!("then", apply(&node, json!({"flag": ["", "x"]})));
        assert_eq!("else", apply(&node, json!({"flag": ""})));
        assert_eq!("else", apply(&node, json!({"flag": []})));
        assert_eq!("else", apply(&node, json!({"flag": false})));
        assert_eq!("else", apply(&node, json!({})));
    }

    #[test]
    fn iteration_binds_it_and_the_source_name() {
        let node = Node::iteration(
            "array",
            Node::Sequence(vec![Node::variable("it"), Node::variable("array")]),
            Some(Node::text(", ")),
        );

        assert_eq!("11, 22, 33", apply(&node, json!({"array": [1, 2, 3]})));
    }

    #[test]
    fn iteration_without_separator() {
        let node = Node::iteration("array", Node::variable("it"), None);

        assert_eq!("abc", apply(&node, json!({"array": ["a", "b", "c"]})));
    }

    #[test]
    fn separator_sees_the_current_element() {
        let node = Node::iteration(
            "array",
            Node::variable("it"),
            Some(Node::Sequence(vec![
                Node::text("<"),
                Node::variable("it"),
                Node::text(">"),
            ])),
        );

        assert_eq!("a<a>b<b>c", apply(&node, json!({"array": ["a", "b", "c"]})));
    }

    #[test]
    fn iteration_over_an_empty_list_renders_nothing() {
        let node = Node::iteration("array", Node::text("x"), Some(Node::text(",")));

        assert_eq!("", apply(&node, json!({"array": []})));
    }

    #[test]
    fn iteration_over_a_map_runs_once() {
        let node = Node::iteration(
            "mymap",
            Node::Sequence(vec![
                Node::variable("it.last"),
                Node::text(", "),
                Node::variable("it.first"),
            ]),
            Some(Node::text("never")),
        );

        assert_eq!(
            "Doe, John",
            apply(&node, json!({"mymap": {"first": "John", "last": "Doe"}}))
        );
    }

    #[test]
    fn iteration_over_a_missing_path_runs_once() {
        let node = Node::iteration("missing", Node::Sequence(vec![
            Node::text("["),
            Node::variable("it"),
            Node::text("]"),
        ]), None);

        assert_eq!("[]", apply(&node, json!({})));
    }

    #[test]
    fn iteration_over_a_dotted_path_shadows_only_that_key() {
        let node = Node::iteration(
            "forloop.content",
            Node::Sequence(vec![
                Node::text("- "),
                Node::variable("forloop.content"),
                Node::text(" "),
                Node::variable("forloop.title"),
                Node::text("\n"),
            ]),
            None,
        );

        assert_eq!(
            "- one T\n- two T\n",
            apply(
                &node,
                json!({"forloop": {"content": ["one", "two"], "title": "T"}})
            )
        );
    }

    #[test]
    fn nested_iterations_rebind_it() {
        let node = Node::iteration(
            "rows",
            Node::iteration("it.cells", Node::variable("it"), Some(Node::text(" "))),
            Some(Node::text("|")),
        );

        assert_eq!(
            "a b|c",
            apply(
                &node,
                json!({"rows": [{"cells": ["a", "b"]}, {"cells": ["c"]}]})
            )
        );
    }

    #[test]
    fn bindings_do_not_leak_out_of_the_loop() {
        let node = Node::Sequence(vec![
            Node::iteration("array", Node::variable("it"), None),
            Node::text("|"),
            Node::variable("it"),
            Node::variable("array"),
        ]);

        assert_eq!("xy|outerxy", apply(&node, json!({"array": ["x", "y"], "it": "outer"})));
    }

    #[test]
    fn sequences_concatenate_children() {
        let node = Node::Sequence(vec![
            Node::text("Hello, "),
            Node::variable("name"),
            Node::text("!"),
        ]);

        assert_eq!("Hello, World!", apply(&node, json!({"name": "World"})));
    }

    #[test]
    fn displays_an_indented_tree() {
        let node = Node::Sequence(vec![
            Node::text("a\n"),
            Node::conditional("x", Node::variable("x"), Node::text("")),
            Node::iteration("xs", Node::variable("it"), Some(Node::text(","))),
        ]);

        assert_eq!(
            textwrap::dedent(
                r#"
                Sequence
                    Text<"a\n">
                    Conditional<x>
                        Variable<x>
                    else
                        Text<"">
                    Iteration<xs>
                        Variable<it>
                    sep
                        Text<",">
                "#
            )
            .trim_start(),
            node.to_string()
        );
    }
}
