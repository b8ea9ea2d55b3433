use ast::Node;
use errors::{ParseError, TemplateError};
use lexer::Token;
use span::{Span, Spanned};
use tracing::debug;

use crate::directive::{Directive, Stop};

/// Parse a sequence of tokens in to a syntax tree
pub fn parse(tokens: &[Spanned<Token>]) -> Result<Node, Spanned<TemplateError>> {
    TemplateParser::new(tokens).parse()
}

/// Recursive descent over a token slice
///
/// Every block parser advances the same cursor, consuming exactly the tokens
/// that belong to its block including the closing directive.
pub struct TemplateParser<'t> {
    tokens: &'t [Spanned<Token>],
    cursor: usize,
}

/// A directive that started or ended a block
#[derive(Debug, Clone, Copy)]
struct Marker<'t> {
    content: &'t str,
    span: &'t Span,
}

type ParseResult<T> = Result<T, Spanned<TemplateError>>;

impl<'t> TemplateParser<'t> {
    pub fn new(tokens: &'t [Spanned<Token>]) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Consume every token, failing on the first structural error
    pub fn parse(&mut self) -> ParseResult<Node> {
        let (root, _) = self.sequence(&[])?;

        Ok(root)
    }

    fn next(&mut self) -> Option<&'t Spanned<Token>> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    /// Parse nodes until one of `stops` or the end of the tokens
    ///
    /// The matching stop directive is consumed and returned.
    fn sequence(
        &mut self,
        stops: &[Stop],
    ) -> ParseResult<(Node, Option<(Directive<'t>, Marker<'t>)>)> {
        let mut nodes = vec![];

        while let Some((token, span)) = self.next() {
            let content = match token {
                Token::Plain(text) if text.is_empty() => continue,
                Token::Plain(text) => {
                    nodes.push(Node::text(text.as_str()));
                    continue;
                }
                Token::Directive(content) => content.as_str(),
            };

            let directive =
                Directive::classify(content).map_err(|err| (err.into(), span.clone()))?;
            let marker = Marker { content, span };

            if directive.stop().is_some_and(|stop| stops.contains(&stop)) {
                return Ok((Node::Sequence(nodes), Some((directive, marker))));
            }

            let node = match directive {
                Directive::If(condition) => self.conditional(condition, marker)?,
                Directive::For(source) => self.iteration(source, marker)?,
                // Keywords outside of their block are plain lookups
                _ => Node::variable(content),
            };

            nodes.push(node);
        }

        Ok((Node::Sequence(nodes), None))
    }

    fn conditional(&mut self, condition: &'t str, opener: Marker<'t>) -> ParseResult<Node> {
        let (then_arm, end) = self.sequence(&[Stop::ElseIf, Stop::Else, Stop::EndIf])?;

        let else_arm = match end {
            Some((Directive::ElseIf(next), marker)) => {
                // The chained conditional consumes the shared `endif`
                self.conditional(next, marker)?
            }
            Some((Directive::Else, _)) => match self.sequence(&[Stop::EndIf])? {
                (else_arm, Some(_)) => else_arm,
                (_, None) => return Err(unterminated(opener, "'endif'")),
            },
            Some(_) => Node::text(""),
            None => {
                return Err(unterminated(
                    opener,
                    "'elseif(...)', 'else' or 'endif'",
                ))
            }
        };

        debug!(condition, "parsed conditional");

        Ok(Node::conditional(condition, then_arm, else_arm))
    }

    fn iteration(&mut self, source: &'t str, opener: Marker<'t>) -> ParseResult<Node> {
        let (body, end) = self.sequence(&[Stop::Sep, Stop::EndFor])?;

        let separator = match end {
            Some((Directive::Sep, _)) => match self.sequence(&[Stop::EndFor])? {
                (separator, Some(_)) => Some(separator),
                (_, None) => return Err(unterminated(opener, "'endfor'")),
            },
            Some(_) => None,
            None => return Err(unterminated(opener, "'sep' or 'endfor'")),
        };

        debug!(source, has_separator = separator.is_some(), "parsed iteration");

        Ok(Node::iteration(source, body, separator))
    }
}

fn unterminated(opener: Marker, expected: &str) -> Spanned<TemplateError> {
    (
        ParseError::UnterminatedBlock {
            opener: opener.content.to_string(),
            expected: expected.to_string(),
        }
        .into(),
        opener.span.clone(),
    )
}
