use crate::block::{Block, BlockKind, matching_end};
use crate::blueprint::{Header, Payload};
use crate::parser::classify::{
    Context, Section, classify_block, first_line, keyword_signature, object_signature,
    payload_signature,
};
use crate::parser::diag::{ErrorKind, ParseReport, WarningKind};
use crate::parser::headers::{merge_header, parse_headers};
use crate::parser::{ParseContext, SectionResult, section_source};

/// Parse one payload list item (request, response, or embedded object),
/// starting at its ListItemBegin.
///
/// The signature line yields the name and an optional media type; a declared
/// media type becomes a synthetic Content-Type header merged under the
/// duplicate policy. `outer` holds the enclosing header scopes.
pub fn parse_payload(
    blocks: &[Block],
    from: usize,
    ctx: &ParseContext<'_>,
    outer: &[&[Header]],
    out: &mut Payload,
) -> SectionResult {
    let mut report = ParseReport::new();

    let Some(item_end) = matching_end(blocks, from) else {
        report.fail(
            ErrorKind::UnbalancedStream,
            "unbalanced list nesting in payload section",
            blocks[from].source.clone(),
        );
        return SectionResult { report, next: from };
    };

    let (signature, content_from) = if blocks[from + 1].kind == BlockKind::Paragraph {
        (&blocks[from + 1], from + 2)
    } else {
        (&blocks[item_end], from + 1)
    };

    let line = first_line(&signature.text);
    let (name, media) = match payload_signature(line) {
        Some((_, name, media)) => (name, media),
        None => match object_signature(line) {
            Some((name, media)) => (name, media),
            None => {
                report.fail(
                    ErrorKind::ExpectedSignature,
                    "expected a request, response or object signature",
                    signature.source.clone(),
                );
                return SectionResult { report, next: from };
            }
        },
    };
    out.name = name.to_string();

    if let Some(media) = media {
        if !media.is_empty() {
            merge_header(
                &mut out.headers,
                outer,
                "Content-Type",
                media,
                signature.source.clone(),
                &mut report,
            );
        }
    }

    // Lines after the signature line are the payload description.
    let tail = signature.text.lines().skip(1).collect::<Vec<_>>().join("\n");
    let tail = tail.trim();
    if !tail.is_empty() {
        out.description = tail.to_string();
    }

    let mut asset_seen = false;
    let mut pos = content_from;
    while pos < item_end {
        let section = classify_block(Context::Payload, blocks, pos, Section::Undefined);
        match section {
            Section::Body if blocks[pos].kind == BlockKind::Code => {
                out.body.push_str(&blocks[pos].text);
                asset_seen = true;
                pos += 1;
            }
            Section::Headers | Section::Body | Section::Schema
                if blocks[pos].kind == BlockKind::ListBegin =>
            {
                pos += 1;
                while pos < item_end && blocks[pos].kind == BlockKind::ListItemBegin {
                    let child = match classify_block(Context::Payload, blocks, pos, Section::Undefined)
                    {
                        Section::Headers => parse_headers(blocks, pos, outer, &mut out.headers),
                        Section::Body => {
                            asset_seen = true;
                            parse_asset(blocks, pos, ctx, "body", &mut out.body)
                        }
                        Section::Schema => parse_asset(blocks, pos, ctx, "schema", &mut out.schema),
                        _ => {
                            let Some(skip_end) = matching_end(blocks, pos) else {
                                report.fail(
                                    ErrorKind::UnbalancedStream,
                                    "unbalanced list nesting in payload section",
                                    blocks[pos].source.clone(),
                                );
                                return SectionResult { report, next: pos };
                            };
                            report.warn(
                                WarningKind::IgnoringBlock,
                                "ignoring unrecognized list item in payload section",
                                section_source(blocks, pos, skip_end + 1),
                            );
                            pos = skip_end + 1;
                            continue;
                        }
                    };
                    pos = child.next;
                    let errored = !child.report.ok();
                    report.merge(child.report);
                    if errored {
                        return SectionResult { report, next: pos };
                    }
                }
                if pos < item_end && blocks[pos].kind == BlockKind::ListEnd {
                    pos += 1;
                }
            }
            _ => {
                if !asset_seen && out.body.is_empty() {
                    // Expected a preformatted asset here; fall back to the
                    // remaining content, mapped from the source verbatim.
                    let source = section_source(blocks, pos, item_end);
                    report.warn(
                        WarningKind::EmptyAsset,
                        "expected a preformatted asset, using the remaining content as the body",
                        source.clone(),
                    );
                    out.body = source.text_of(ctx.source);
                    asset_seen = true;
                    pos = item_end;
                } else {
                    // Skip a whole nested structure, not its blocks one by one.
                    let next_pos = if blocks[pos].kind == BlockKind::ListBegin {
                        let Some(skip_end) = matching_end(blocks, pos) else {
                            report.fail(
                                ErrorKind::UnbalancedStream,
                                "unbalanced list nesting in payload section",
                                blocks[pos].source.clone(),
                            );
                            return SectionResult { report, next: pos };
                        };
                        skip_end + 1
                    } else {
                        pos + 1
                    };
                    report.warn(
                        WarningKind::IgnoringBlock,
                        "ignoring unrecognized block in payload section",
                        section_source(blocks, pos, next_pos),
                    );
                    pos = next_pos;
                }
            }
        }
    }

    if !asset_seen {
        report.warn(
            WarningKind::EmptyAsset,
            "empty body asset",
            signature.source.clone(),
        );
    }

    report.source = section_source(blocks, from, item_end + 1);
    SectionResult {
        report,
        next: item_end + 1,
    }
}

/// Parse a `Body` or `Schema` asset item, starting at its ListItemBegin.
/// Code blocks append to `out` verbatim.
pub fn parse_asset(
    blocks: &[Block],
    from: usize,
    ctx: &ParseContext<'_>,
    what: &str,
    out: &mut String,
) -> SectionResult {
    let mut report = ParseReport::new();

    let Some(item_end) = matching_end(blocks, from) else {
        report.fail(
            ErrorKind::UnbalancedStream,
            "unbalanced list nesting in asset section",
            blocks[from].source.clone(),
        );
        return SectionResult { report, next: from };
    };

    let (signature, content_from) = if blocks[from + 1].kind == BlockKind::Paragraph {
        (&blocks[from + 1], from + 2)
    } else {
        (&blocks[item_end], from + 1)
    };
    if !keyword_signature(first_line(&signature.text), what) {
        report.fail(
            ErrorKind::ExpectedSignature,
            format!("expected a '{}' asset", what),
            signature.source.clone(),
        );
        return SectionResult { report, next: from };
    }

    let mut appended = false;
    let mut pos = content_from;
    while pos < item_end {
        let block = &blocks[pos];
        if block.kind == BlockKind::Code {
            out.push_str(&block.text);
            appended = true;
            pos += 1;
        } else {
            let source = section_source(blocks, pos, item_end);
            report.warn(
                WarningKind::EmptyAsset,
                format!("expected a preformatted {} asset, using the remaining content verbatim", what),
                source.clone(),
            );
            out.push_str(&source.text_of(ctx.source));
            appended = true;
            pos = item_end;
        }
    }

    if !appended {
        report.warn(
            WarningKind::EmptyAsset,
            format!("empty {} asset", what),
            signature.source.clone(),
        );
    }

    report.source = section_source(blocks, from, item_end + 1);
    SectionResult {
        report,
        next: item_end + 1,
    }
}
