use crate::block::{Block, BlockKind, SourceMap, matching_end};
use crate::blueprint::Header;
use crate::parser::classify::{first_line, keyword_signature};
use crate::parser::diag::{ErrorKind, ParseReport, WarningKind};
use crate::parser::{SectionResult, section_source};

/// Parse a `Headers` list item into `target`, starting at its ListItemBegin.
///
/// Entries come from code blocks (one `name: value` per line) or from nested
/// list items carrying one entry each. `outer` holds the header scopes
/// enclosing `target`; a duplicate in any of them overshadows and is dropped.
pub fn parse_headers(
    blocks: &[Block],
    from: usize,
    outer: &[&[Header]],
    target: &mut Vec<Header>,
) -> SectionResult {
    let mut report = ParseReport::new();

    let Some(item_end) = matching_end(blocks, from) else {
        report.fail(
            ErrorKind::UnbalancedStream,
            "unbalanced list nesting in headers section",
            blocks[from].source.clone(),
        );
        return SectionResult { report, next: from };
    };

    // Loose items carry the signature on a leading paragraph, tight items on
    // the item end, after any nested blocks.
    let (signature, content_from) = if blocks[from + 1].kind == BlockKind::Paragraph {
        (&blocks[from + 1], from + 2)
    } else {
        (&blocks[item_end], from + 1)
    };
    if !keyword_signature(first_line(&signature.text), "headers") {
        report.fail(
            ErrorKind::ExpectedSignature,
            "expected a 'Headers' section",
            signature.source.clone(),
        );
        return SectionResult { report, next: from };
    }

    let mut entries = 0usize;

    // The signature block may carry header lines after the keyword.
    for line in signature.text.lines().skip(1) {
        consume_header_line(line, &signature.source, target, outer, &mut entries, &mut report);
    }

    let mut pos = content_from;
    while pos < item_end {
        let block = &blocks[pos];
        match block.kind {
            BlockKind::Code => {
                for line in block.text.lines() {
                    consume_header_line(line, &block.source, target, outer, &mut entries, &mut report);
                }
                pos += 1;
            }
            BlockKind::ListBegin => {
                // One entry per nested list item.
                pos += 1;
                while pos < item_end && blocks[pos].kind == BlockKind::ListItemBegin {
                    let Some(entry_end) = matching_end(blocks, pos) else {
                        report.fail(
                            ErrorKind::UnbalancedStream,
                            "unbalanced list nesting in headers section",
                            blocks[pos].source.clone(),
                        );
                        return SectionResult { report, next: pos };
                    };
                    if let Some((line, source)) = entry_line(blocks, pos) {
                        consume_header_line(line, source, target, outer, &mut entries, &mut report);
                    }
                    pos = entry_end + 1;
                }
                if pos < item_end && blocks[pos].kind == BlockKind::ListEnd {
                    pos += 1;
                }
            }
            _ => {
                report.warn(
                    WarningKind::IgnoringBlock,
                    "ignoring unrecognized block in headers section",
                    block.source.clone(),
                );
                pos += 1;
            }
        }
    }

    if entries == 0 {
        report.warn(
            WarningKind::EmptyAsset,
            "no headers specified",
            signature.source.clone(),
        );
    }

    report.source = section_source(blocks, from, item_end + 1);
    SectionResult {
        report,
        next: item_end + 1,
    }
}

/// Merge one header into `target` under the duplicate policy: a name already
/// present in the target or any outer scope keeps its existing value and the
/// new entry is dropped with a warning.
pub(super) fn merge_header(
    target: &mut Vec<Header>,
    outer: &[&[Header]],
    name: &str,
    value: &str,
    source: SourceMap,
    report: &mut ParseReport,
) {
    let shadowed = target.iter().any(|h| h.name == name)
        || outer.iter().any(|scope| scope.iter().any(|h| h.name == name));
    if shadowed {
        report.warn(
            WarningKind::OvershadowingHeader,
            format!("header '{}' already defined; keeping the original value", name),
            source,
        );
        return;
    }
    target.push(Header::new(name, value));
}

fn consume_header_line(
    line: &str,
    source: &SourceMap,
    target: &mut Vec<Header>,
    outer: &[&[Header]],
    entries: &mut usize,
    report: &mut ParseReport,
) {
    if line.trim().is_empty() {
        return;
    }
    match parse_header_line(line) {
        Some((name, value)) => {
            *entries += 1;
            merge_header(target, outer, name, value, source.clone(), report);
        }
        None => report.warn(
            WarningKind::MalformedHeader,
            format!("malformed header line '{}', expected 'name: value'", line.trim()),
            source.clone(),
        ),
    }
}

/// Split `name: value` on the first colon, both sides trimmed.
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// The first content line of a header entry item and the block carrying it.
fn entry_line(blocks: &[Block], item: usize) -> Option<(&str, &SourceMap)> {
    let content = blocks.get(item + 1)?;
    match content.kind {
        BlockKind::Paragraph | BlockKind::ListItemEnd => {
            Some((first_line(&content.text), &content.source))
        }
        _ => {
            let end = matching_end(blocks, item)?;
            Some((first_line(&blocks[end].text), &blocks[end].source))
        }
    }
}
