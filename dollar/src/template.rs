use std::fmt;

use ast::Node;
use errors::TemplateError;
use lexer::{DEFAULT_SIGIL, Tokenizer};
use serde::{Deserialize, Serialize};
use span::Spanned;
use tracing::debug;
use types::{Context, Map};

/// Settings for tokenizing templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Character that opens and closes directives
    pub sigil: char,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sigil: DEFAULT_SIGIL,
        }
    }
}

/// A parsed template, ready to be applied to any number of contexts
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Node,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, Spanned<TemplateError>> {
        Self::parse_with(source, &Options::default())
    }

    pub fn parse_with(source: &str, options: &Options) -> Result<Self, Spanned<TemplateError>> {
        let tokens = Tokenizer::with_sigil(source, options.sigil).collect::<Result<Vec<_>, _>>()?;

        let root = parser::parse(&tokens)?;

        debug!(tokens = tokens.len(), sigil = %options.sigil, "parsed template");

        Ok(Self { root })
    }

    pub fn apply(&self, context: &Context) -> String {
        self.root.apply(context)
    }

    pub fn render(&self, data: &Map) -> String {
        self.apply(&Context::new(data))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Tokenize, parse and apply a template in one go
pub fn render(template: &str, data: &Map) -> Result<String, Spanned<TemplateError>> {
    render_with(template, data, &Options::default())
}

pub fn render_with(
    template: &str,
    data: &Map,
    options: &Options,
) -> Result<String, Spanned<TemplateError>> {
    let output = Template::parse_with(template, options)?.render(data);

    debug!(bytes = output.len(), "rendered template");

    Ok(output)
}
