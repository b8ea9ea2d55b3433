use errors::{LexicalError, TemplateError};
use span::Spanned;
use tracing::trace;

pub use token::Token;

mod token;

/// Sigil used when none is configured
pub const DEFAULT_SIGIL: char = '$';

/// Follows a sigil to start a line comment
const COMMENT_MARKER: &str = "--";
const CURLY_OPEN: char = '{';
const CURLY_CLOSE: char = '}';

pub type LexResult = Result<Spanned<Token>, Spanned<TemplateError>>;

/// Tokenize a template using the [default sigil](DEFAULT_SIGIL)
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

/// Lazily splits template source in to [tokens](Token)
///
/// Escaped sigils and comments are resolved while scanning plain text, so
/// a single plain token may span several of them. Empty plain runs are
/// never yielded. A directive that isn't closed before the end of input
/// is an error and ends the stream.
pub struct Tokenizer<'input> {
    input: &'input str,
    cursor: usize,
    sigil: char,
}

impl<'input> Tokenizer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self::with_sigil(input, DEFAULT_SIGIL)
    }

    pub fn with_sigil(input: &'input str, sigil: char) -> Self {
        Self {
            input,
            cursor: 0,
            sigil,
        }
    }

    fn remaining(&self) -> &'input str {
        &self.input[self.cursor..]
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.input.len()
    }

    /// Scan plain text up to the next directive or the end of input
    fn plain(&mut self) -> Option<Spanned<Token>> {
        let start = self.cursor;
        let sigil_len = self.sigil.len_utf8();
        let mut text = String::new();

        loop {
            let rest = self.remaining();

            let Some(idx) = rest.find(self.sigil) else {
                text.push_str(rest);
                self.cursor = self.input.len();
                break;
            };

            text.push_str(&rest[..idx]);

            let after = &rest[idx + sigil_len..];

            if after.starts_with(self.sigil) {
                text.push(self.sigil);
                self.cursor += idx + sigil_len * 2;
            } else if let Some(comment) = after.strip_prefix(COMMENT_MARKER) {
                // The terminating newline belongs to the comment
                let skipped = comment.find('\n').map_or(comment.len(), |nl| nl + 1);
                self.cursor += idx + sigil_len + COMMENT_MARKER.len() + skipped;
            } else {
                self.cursor += idx;
                break;
            }
        }

        (!text.is_empty()).then(|| (Token::Plain(text), start..self.cursor))
    }

    /// Scan a directive, the cursor must be on its opening sigil
    fn directive(&mut self) -> LexResult {
        let start = self.cursor;
        let rest = self.remaining();
        let after_sigil = &rest[self.sigil.len_utf8()..];

        let (body, terminator, trim) = match after_sigil.strip_prefix(CURLY_OPEN) {
            Some(body) => (body, CURLY_CLOSE, false),
            None => (after_sigil, self.sigil, true),
        };

        let Some(end) = body.find(terminator) else {
            self.cursor = self.input.len();

            return Err((
                LexicalError::UnterminatedDirective { terminator }.into(),
                start..self.cursor,
            ));
        };

        let content = &body[..end];
        let content = if trim { content.trim() } else { content };

        self.cursor += (rest.len() - body.len()) + end + terminator.len_utf8();

        Ok((Token::Directive(content.to_string()), start..self.cursor))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = LexResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }

        let result = match self.plain() {
            Some(token) => Ok(token),
            None if self.is_done() => return None,
            None => self.directive(),
        };

        match &result {
            Ok((token, span)) => trace!(%token, ?span, "token"),
            Err((err, span)) => trace!(%err, ?span, "invalid token"),
        }

        Some(result)
    }
}
