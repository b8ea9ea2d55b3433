use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFile,
    term::{self, termcolor::NoColor},
};
use errors::{ContextError, LexicalError, ParseError, TemplateError};
use line_col::LineColLookup;
use serde::{Deserialize, Serialize};
use span::{Span, Spanned, clamp};

/// Get a list of diagnostics from a list of errors
pub fn get_diagnostics(errs: &[Spanned<TemplateError>], source: &str) -> Vec<Diagnosis> {
    let lookup = LineColLookup::new(source);

    errs.iter()
        .map(|(err, span)| Diagnosis {
            range: get_range(&lookup, source, span),
            severity: Some(DiagnosisSeverity::ERROR),
            message: err.to_string(),
        })
        .collect()
}

/// Render errors as a plain text report with source snippets
///
/// `name` is the file name shown in the report's location lines.
pub fn report(errs: &[Spanned<TemplateError>], name: &str, source: &str) -> String {
    let file = SimpleFile::new(name, source);
    let config = term::Config::default();
    let mut writer = NoColor::new(Vec::new());

    for (err, span) in errs {
        let diagnostic = err.as_diagnostic(&clamp(span, source.len()));

        if term::emit(&mut writer, &config, &file, &diagnostic).is_err() {
            // Fall back to the bare message if the snippet can't be rendered
            writer.get_mut().extend(format!("error: {err}\n").bytes());
        }
    }

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

fn get_range(lookup: &LineColLookup, source: &str, span: &Span) -> DiagnosisRange {
    let span = clamp(span, source.len());

    DiagnosisRange {
        start: get_position(lookup, span.start),
        end: get_position(lookup, span.end),
    }
}

/// Map a byte index to a zero based position
fn get_position(lookup: &LineColLookup, idx: usize) -> DiagnosisPosition {
    let (line, character) = lookup.get(idx);

    DiagnosisPosition {
        line: (line - 1) as u32,
        character: (character - 1) as u32,
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub range: DiagnosisRange,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<DiagnosisSeverity>,

    pub message: String,
}

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DiagnosisSeverity(i32);
impl DiagnosisSeverity {
    pub const ERROR: DiagnosisSeverity = DiagnosisSeverity(1);
}

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Default, Deserialize, Serialize)]
pub struct DiagnosisPosition {
    pub line: u32,
    pub character: u32,
}

impl DiagnosisPosition {
    pub fn new(line: u32, character: u32) -> DiagnosisPosition {
        DiagnosisPosition { line, character }
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Deserialize, Serialize)]
pub struct DiagnosisRange {
    /// The range's start position (inclusive)
    pub start: DiagnosisPosition,
    /// The range's end position (exclusive)
    pub end: DiagnosisPosition,
}

impl DiagnosisRange {
    pub fn new(start: DiagnosisPosition, end: DiagnosisPosition) -> DiagnosisRange {
        DiagnosisRange { start, end }
    }
}

trait AsDiagnostic {
    fn as_diagnostic(&self, span: &Span) -> Diagnostic<()>;
}

macro_rules! impl_as_dianostic {
    ($($error:tt),+) => {$(
        impl AsDiagnostic for $error {
            fn as_diagnostic(&self, span: &Span) -> Diagnostic<()> {
                Diagnostic::error()
                    .with_code(stringify!($error))
                    .with_message(self.to_string())
                    .with_labels(vec![Label::primary((), span.clone())])
            }
        }
    )+};
}

impl_as_dianostic!(LexicalError, ParseError, ContextError);

impl AsDiagnostic for TemplateError {
    fn as_diagnostic(&self, span: &Span) -> Diagnostic<()> {
        match self {
            TemplateError::LexicalError(e) => e.as_diagnostic(span),
            TemplateError::ParseError(e) => e.as_diagnostic(span),
            TemplateError::ContextError(e) => e.as_diagnostic(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use lexer::{LexResult, Tokenizer};
    use pretty_assertions::assert_eq;

    use super::*;

    fn errors_for(source: &str) -> Vec<Spanned<TemplateError>> {
        let tokens: Result<Vec<_>, _> = Tokenizer::new(source)
            .collect::<Vec<LexResult>>()
            .into_iter()
            .collect();

        let result = match tokens {
            Ok(tokens) => parser::parse(&tokens).map(|_| ()),
            Err(err) => Err(err),
        };

        result.err().into_iter().collect()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> DiagnosisRange {
        DiagnosisRange::new(
            DiagnosisPosition::new(start.0, start.1),
            DiagnosisPosition::new(end.0, end.1),
        )
    }

    #[test]
    fn it_has_no_diagnostics_for_a_valid_template() {
        let source = "Hello $name$!";

        assert_eq!(Vec::<Diagnosis>::new(), get_diagnostics(&errors_for(source), source));
    }

    #[test]
    fn it_diagnoses_unterminated_blocks() {
        let source = "$if(x)$yes";

        assert_eq!(
            vec![Diagnosis {
                range: range((0, 0), (0, 7)),
                severity: Some(DiagnosisSeverity::ERROR),
                message: String::from(
                    "ParseError: Block 'if(x)' is never closed, expected 'elseif(...)', 'else' or 'endif'"
                )
            }],
            get_diagnostics(&errors_for(source), source)
        );
    }

    #[test]
    fn it_diagnoses_unterminated_directives_on_later_lines() {
        let source = "line one\n${name";

        assert_eq!(
            vec![Diagnosis {
                range: range((1, 0), (1, 6)),
                severity: Some(DiagnosisSeverity::ERROR),
                message: String::from(
                    "LexicalError: Directive is never closed, expected '}' before the end of the template"
                )
            }],
            get_diagnostics(&errors_for(source), source)
        );
    }

    #[test]
    fn it_serializes_diagnoses_as_camel_case_json() {
        let diagnosis = Diagnosis {
            range: range((0, 1), (0, 2)),
            severity: Some(DiagnosisSeverity::ERROR),
            message: String::from("message"),
        };

        assert_eq!(
            serde_json::json!({
                "range": {
                    "start": {"line": 0, "character": 1},
                    "end": {"line": 0, "character": 2}
                },
                "severity": 1,
                "message": "message"
            }),
            serde_json::to_value(&diagnosis).unwrap()
        );
    }

    #[test]
    fn it_reports_errors_with_their_location() {
        let source = "a\n$for(xs)$b";

        let report = report(&errors_for(source), "list.dollar", source);

        assert!(report.contains("error[ParseError]"), "{report}");
        assert!(report.contains("list.dollar:2:1"), "{report}");
        assert!(report.contains("Block 'for(xs)' is never closed"), "{report}");
    }

    #[test]
    fn it_reports_errors_without_a_template_span() {
        let err: TemplateError = ContextError::InvalidAssignment("oops".to_string()).into();

        let report = report(&[(err, span::NO_SPAN)], "-", "");

        assert!(report.contains("Invalid assignment 'oops'"), "{report}");
    }
}
