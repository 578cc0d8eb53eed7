use std::ops::Range;

/// The kind of a single block token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Paragraph,
    Code,
    Quote,
    Html,
    HRule,
    ListBegin,
    ListEnd,
    ListItemBegin,
    ListItemEnd,
}

/// One or more byte ranges into the source document, sorted and disjoint.
///
/// Descriptions and fallback bodies are assembled by mapping the ranges of
/// their contributing blocks back onto the source buffer, so a single map can
/// cover several non-consecutive spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    ranges: Vec<Range<usize>>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap { ranges: Vec::new() }
    }

    pub fn single(range: Range<usize>) -> Self {
        SourceMap {
            ranges: vec![range],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Insert a range, coalescing it with any ranges it touches or overlaps.
    /// The set stays sorted and disjoint, so every byte is mapped at most
    /// once no matter how many blocks cover it.
    pub fn push(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let at = self.ranges.partition_point(|r| r.end < range.start);
        let mut merged = range;
        let mut absorb = at;
        while absorb < self.ranges.len() && self.ranges[absorb].start <= merged.end {
            merged.start = merged.start.min(self.ranges[absorb].start);
            merged.end = merged.end.max(self.ranges[absorb].end);
            absorb += 1;
        }
        self.ranges.splice(at..absorb, [merged]);
    }

    /// Append every range of another map.
    pub fn append(&mut self, other: &SourceMap) {
        for range in &other.ranges {
            self.push(range.clone());
        }
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Re-assemble the mapped text by concatenating the source slices in order.
    pub fn text_of(&self, source: &str) -> String {
        let mut text = String::new();
        for range in &self.ranges {
            if let Some(slice) = source.get(range.clone()) {
                text.push_str(slice);
            }
        }
        text
    }
}

/// One token of the block stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Decoded content: inline text for headers and paragraphs, literal
    /// content for code blocks, the raw source slice for quotes and HTML.
    pub text: String,
    /// Header depth (1-6); zero for every other kind.
    pub level: u8,
    /// Where the block came from in the source document.
    pub source: SourceMap,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>, source: SourceMap) -> Self {
        Block {
            kind,
            text: text.into(),
            level: 0,
            source,
        }
    }

    pub fn header(text: impl Into<String>, level: u8, source: SourceMap) -> Self {
        Block {
            kind: BlockKind::Header,
            text: text.into(),
            level,
            source,
        }
    }
}

/// Find the matching end for the list or list-item begin block at `from`.
///
/// The stream is nesting-balanced, so a single depth counter over both pair
/// kinds finds the partner. Returns None for unbalanced input.
pub fn matching_end(blocks: &[Block], from: usize) -> Option<usize> {
    match blocks.get(from)?.kind {
        BlockKind::ListBegin | BlockKind::ListItemBegin => {}
        _ => return None,
    }

    let mut depth = 1usize;
    let mut i = from + 1;
    while i < blocks.len() {
        match blocks[i].kind {
            BlockKind::ListBegin | BlockKind::ListItemBegin => depth += 1,
            BlockKind::ListEnd | BlockKind::ListItemEnd => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
