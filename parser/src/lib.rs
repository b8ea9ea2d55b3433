pub use parser::{parse, TemplateParser};

mod directive;
mod parser;
