use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Literal text, emitted verbatim
    Plain(String),
    /// Content between sigils (trimmed) or between `${` and `}` (raw)
    Directive(String),
}

impl Token {
    pub fn content(&self) -> &str {
        match self {
            Token::Plain(content) | Token::Directive(content) => content,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            Token::Plain(_) => "Plain",
            Token::Directive(_) => "Directive",
        };

        let content = self
            .content()
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\t', "\\t")
            .replace('\n', "\\n");

        write!(f, "{kind}<{content}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_escaped_content() {
        assert_eq!(
            "Plain<a\\tb\\n\\\"c\\\" \\\\>",
            Token::Plain("a\tb\n\"c\" \\".to_string()).to_string()
        );
        assert_eq!(
            "Directive<if(one)>",
            Token::Directive("if(one)".to_string()).to_string()
        );
    }
}
