pub use crate::ast::Node;
pub use crate::context::{assign, load_file, merge, parse_assignment};
pub use crate::errors::TemplateError;
pub use span::{Span, Spanned};
pub use crate::template::{Options, Template, render, render_with};
pub use types::{Context, Map, Value};
