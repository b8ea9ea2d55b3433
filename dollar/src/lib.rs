pub use ast;
pub use diagnostics;
pub use errors;
pub use errors::TemplateError;
pub use lexer::{DEFAULT_SIGIL, LexResult, Token, Tokenizer, tokenize};
pub use span::*;
pub use types::*;

pub use template::{Options, Template, render, render_with};

pub mod context;
pub mod prelude;
mod template;
