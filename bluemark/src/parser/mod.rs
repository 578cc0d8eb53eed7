use crate::block::{Block, BlockKind, SourceMap, matching_end};
use crate::blueprint::Blueprint;
use crate::markdown;

pub mod classify;
pub mod diag;

mod blueprint;
mod headers;
mod method;
mod payload;
mod resource;

pub use blueprint::{parse_blueprint, parse_resource_group};
pub use diag::{ErrorKind, ParseError, ParseReport, Warning, WarningKind};
pub use headers::parse_headers;
pub use method::parse_method;
pub use payload::{parse_asset, parse_payload};
pub use resource::parse_resource;

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Fail the parse when the document opens without a name header.
    pub require_blueprint_name: bool,
}

/// State shared by all section parsers of one parse: the source buffer the
/// block maps point into, and the options.
pub struct ParseContext<'a> {
    pub source: &'a str,
    pub options: ParseOptions,
}

/// What every section parser returns: the diagnostics it produced and the
/// first block position it did not consume.
#[derive(Debug, Clone)]
pub struct SectionResult {
    pub report: ParseReport,
    pub next: usize,
}

/// Parses API blueprint source into a [`Blueprint`] tree.
pub struct Parser {
    source: String,
    options: ParseOptions,
}

impl Parser {
    pub fn new(source: impl Into<String>) -> Self {
        Parser {
            source: source.into(),
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Tokenize the source and parse the whole block stream. The report
    /// carries all warnings and, on a malformed document, the first error;
    /// the blueprint holds whatever was built up to that point.
    pub fn parse(&self) -> (Blueprint, ParseReport) {
        let blocks = markdown::tokenize(&self.source);
        let ctx = ParseContext {
            source: &self.source,
            options: self.options,
        };
        let mut blueprint = Blueprint::default();
        let result = parse_blueprint(&blocks, &ctx, &mut blueprint);
        (blueprint, result.report)
    }
}

/// Provenance of the blocks in `from..next`.
pub(crate) fn section_source(blocks: &[Block], from: usize, next: usize) -> SourceMap {
    let mut map = SourceMap::new();
    for block in blocks.iter().take(next).skip(from) {
        map.append(&block.source);
    }
    map
}

/// Take one block of description content. A list contributes only its
/// ListEnd map, any other block its own. Returns the mapped text and the
/// next position, or None when the list is unbalanced.
pub(crate) fn continuation_text(
    blocks: &[Block],
    pos: usize,
    source: &str,
) -> Option<(String, usize)> {
    let block = &blocks[pos];
    if block.kind == BlockKind::ListBegin {
        let end = matching_end(blocks, pos)?;
        Some((blocks[end].source.text_of(source), end + 1))
    } else {
        Some((block.source.text_of(source), pos + 1))
    }
}
