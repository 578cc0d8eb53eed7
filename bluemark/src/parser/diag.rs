use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

use crate::block::SourceMap;

/// Categories of recoverable findings. Parsing continues past all of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A method section closed with zero response payloads.
    NoResponse,
    /// A header re-declared a name already set in the same or an outer scope.
    OvershadowingHeader,
    /// A second embedded object for the same resource.
    OvershadowingObject,
    /// A bare method header right after an abbreviated resource method.
    AmbiguousMethod,
    /// An expected preformatted asset was absent or empty.
    EmptyAsset,
    /// A header line without a `name: value` shape.
    MalformedHeader,
    /// A block or list item no section recognizes; skipped.
    IgnoringBlock,
}

impl WarningKind {
    /// Stable code string attached to emitted diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::NoResponse => "no-response",
            WarningKind::OvershadowingHeader => "overshadowing-header",
            WarningKind::OvershadowingObject => "overshadowing-object",
            WarningKind::AmbiguousMethod => "ambiguous-method",
            WarningKind::EmptyAsset => "empty-asset",
            WarningKind::MalformedHeader => "malformed-header",
            WarningKind::IgnoringBlock => "ignoring-block",
        }
    }
}

/// A recoverable finding with source provenance.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub source: SourceMap,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>, source: SourceMap) -> Self {
        Warning {
            kind,
            message: message.into(),
            source,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Warning)
            .with_message(&self.message)
            .with_code(self.kind.code())
            .with_labels(labels(file_id, &self.source))
    }
}

/// Categories of structural failures. The owning section parser stops at the
/// offending position and the error travels up unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The section's signature block is absent where one is mandatory.
    ExpectedSignature,
    /// A list begin without its matching end.
    UnbalancedStream,
    /// The document has no blueprint name and one was required.
    MissingName,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ExpectedSignature => "expected-signature",
            ErrorKind::UnbalancedStream => "unbalanced-stream",
            ErrorKind::MissingName => "missing-name",
        }
    }
}

/// A structural failure with source provenance.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: SourceMap,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, source: SourceMap) -> Self {
        ParseError {
            kind,
            message: message.into(),
            source,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_code(self.kind.code())
            .with_labels(labels(file_id, &self.source))
    }
}

/// Everything a section parser reports besides the tree itself.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Set when the section could not be interpreted at all.
    pub error: Option<ParseError>,
    /// Recoverable findings, in the order they were encountered.
    pub warnings: Vec<Warning>,
    /// The blocks this section consumed.
    pub source: SourceMap,
}

impl ParseReport {
    pub fn new() -> Self {
        ParseReport::default()
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>, source: SourceMap) {
        self.warnings.push(Warning::new(kind, message, source));
    }

    /// Record a structural failure. The first error stands.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>, source: SourceMap) {
        if self.error.is_none() {
            self.error = Some(ParseError::new(kind, message, source));
        }
    }

    /// Fold a child section's report into this one: warnings append in
    /// document order, provenance extends, the first error wins.
    pub fn merge(&mut self, child: ParseReport) {
        self.warnings.extend(child.warnings);
        self.source.append(&child.source);
        if self.error.is_none() {
            self.error = child.error;
        }
    }
}

fn labels(file_id: usize, source: &SourceMap) -> Vec<Label<usize>> {
    source
        .ranges()
        .iter()
        .map(|range| Label::primary(file_id, range.clone()))
        .collect()
}
