use std::sync::LazyLock;

use errors::ParseError;
use regex::Regex;

static BLOCK_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(elseif|if|for)\((.*)\)$").expect("block directive pattern should compile")
});

static BLOCK_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(elseif|if|for)\(").expect("block opener pattern should compile"));

/// What a directive token's content means to the parser
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Directive<'t> {
    If(&'t str),
    ElseIf(&'t str),
    Else,
    EndIf,
    For(&'t str),
    Sep,
    EndFor,
    Variable(&'t str),
}

/// Directives that can end a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Stop {
    ElseIf,
    Else,
    EndIf,
    Sep,
    EndFor,
}

impl<'t> Directive<'t> {
    pub(crate) fn classify(content: &'t str) -> Result<Self, ParseError> {
        if let Some(captures) = BLOCK_DIRECTIVE.captures(content) {
            let argument = captures.get(2).map_or("", |m| m.as_str());

            return Ok(match captures.get(1).map(|m| m.as_str()) {
                Some("if") => Directive::If(argument),
                Some("elseif") => Directive::ElseIf(argument),
                _ => Directive::For(argument),
            });
        }

        if BLOCK_OPENER.is_match(content) {
            return Err(ParseError::MalformedDirective(content.to_string()));
        }

        Ok(match content {
            "else" => Directive::Else,
            "endif" => Directive::EndIf,
            "sep" => Directive::Sep,
            "endfor" => Directive::EndFor,
            path => Directive::Variable(path),
        })
    }

    pub(crate) fn stop(&self) -> Option<Stop> {
        match self {
            Directive::ElseIf(_) => Some(Stop::ElseIf),
            Directive::Else => Some(Stop::Else),
            Directive::EndIf => Some(Stop::EndIf),
            Directive::Sep => Some(Stop::Sep),
            Directive::EndFor => Some(Stop::EndFor),
            Directive::If(_) | Directive::For(_) | Directive::Variable(_) => None,
        }
    }
}
