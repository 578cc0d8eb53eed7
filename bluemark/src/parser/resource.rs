use crate::block::{Block, BlockKind, matching_end};
use crate::blueprint::{Method, Payload, Resource};
use crate::parser::classify::{
    Context, Section, classify_block, method_signature, resource_method_signature,
    resource_signature,
};
use crate::parser::diag::{ErrorKind, ParseReport, WarningKind};
use crate::parser::headers::parse_headers;
use crate::parser::method::parse_method;
use crate::parser::payload::parse_payload;
use crate::parser::{ParseContext, SectionResult, continuation_text, section_source};

/// Parse one resource section, starting at its header.
///
/// Accepts both forms of signature: `<name> [<uri>]` (or a bare `/<uri>`)
/// opening a full resource, and the abbreviated `<verb> <uri>` form where the
/// same header also opens the resource's single method.
pub fn parse_resource(
    blocks: &[Block],
    from: usize,
    ctx: &ParseContext<'_>,
    out: &mut Resource,
) -> SectionResult {
    let mut report = ParseReport::new();

    let Some(signature) = blocks.get(from).filter(|b| b.kind == BlockKind::Header) else {
        let source = blocks.get(from).map(|b| b.source.clone()).unwrap_or_default();
        report.fail(ErrorKind::ExpectedSignature, "expected a resource header", source);
        return SectionResult { report, next: from };
    };
    let text = signature.text.trim();

    let mut pos;
    let mut last;
    if let Some((_, uri)) = resource_method_signature(text) {
        // Abbreviated form. The resource claims the URI and the method parser
        // re-reads the same header for its verb.
        out.uri_template = uri.to_string();
        let mut method = Method::default();
        let child = parse_method(blocks, from, ctx, &out.headers, &mut method);
        pos = child.next;
        let errored = !child.report.ok();
        report.merge(child.report);
        out.methods.push(method);
        if errored {
            return SectionResult { report, next: pos };
        }
        // A bare verb header right after cannot be told apart from a method
        // of this resource or of some unstated one; flag it and leave it.
        if let Some(next_block) = blocks.get(pos) {
            if next_block.kind == BlockKind::Header && method_signature(next_block.text.trim()) {
                report.warn(
                    WarningKind::AmbiguousMethod,
                    format!(
                        "method '{}' after an abbreviated resource method is ambiguous, ignoring it",
                        next_block.text.trim()
                    ),
                    next_block.source.clone(),
                );
            }
        }
        last = Section::ResourceMethod;
    } else if let Some((name, uri)) = resource_signature(text) {
        out.name = name.to_string();
        out.uri_template = uri.to_string();
        pos = from + 1;
        last = Section::Resource;
    } else {
        report.fail(
            ErrorKind::ExpectedSignature,
            format!("expected a resource header, found '{text}'"),
            signature.source.clone(),
        );
        return SectionResult { report, next: from };
    }

    while pos < blocks.len() {
        match classify_block(Context::Resource, blocks, pos, last) {
            Section::Undefined => break,
            Section::Method => {
                let mut method = Method::default();
                let child = parse_method(blocks, pos, ctx, &out.headers, &mut method);
                pos = child.next;
                let errored = !child.report.ok();
                report.merge(child.report);
                out.methods.push(method);
                last = Section::Method;
                if errored {
                    return SectionResult { report, next: pos };
                }
            }
            Section::Object | Section::Headers if blocks[pos].kind == BlockKind::ListBegin => {
                pos += 1;
                while pos < blocks.len() && blocks[pos].kind == BlockKind::ListItemBegin {
                    match classify_block(Context::Resource, blocks, pos, last) {
                        Section::Object => {
                            let mut object = Payload::default();
                            let scopes: [&[_]; 1] = [&out.headers];
                            let child = parse_payload(blocks, pos, ctx, &scopes, &mut object);
                            pos = child.next;
                            let errored = !child.report.ok();
                            let item_source = child.report.source.clone();
                            report.merge(child.report);
                            if out.object.is_none() {
                                out.object = Some(object);
                            } else {
                                report.warn(
                                    WarningKind::OvershadowingObject,
                                    format!(
                                        "object '{}' overshadows a previous object definition, ignoring it",
                                        object.name
                                    ),
                                    item_source,
                                );
                            }
                            last = Section::Object;
                            if errored {
                                return SectionResult { report, next: pos };
                            }
                        }
                        Section::Headers => {
                            let child = parse_headers(blocks, pos, &[], &mut out.headers);
                            pos = child.next;
                            let errored = !child.report.ok();
                            report.merge(child.report);
                            last = Section::Headers;
                            if errored {
                                return SectionResult { report, next: pos };
                            }
                        }
                        _ => {
                            let Some(skip_end) = matching_end(blocks, pos) else {
                                report.fail(
                                    ErrorKind::UnbalancedStream,
                                    "unbalanced list nesting in resource section",
                                    blocks[pos].source.clone(),
                                );
                                return SectionResult { report, next: pos };
                            };
                            report.warn(
                                WarningKind::IgnoringBlock,
                                "ignoring unrecognized list item in resource section",
                                section_source(blocks, pos, skip_end + 1),
                            );
                            pos = skip_end + 1;
                        }
                    }
                }
                if pos < blocks.len() && blocks[pos].kind == BlockKind::ListEnd {
                    pos += 1;
                }
            }
            _ => {
                let Some((text, next_pos)) = continuation_text(blocks, pos, ctx.source) else {
                    report.fail(
                        ErrorKind::UnbalancedStream,
                        "unbalanced list nesting in resource section",
                        blocks[pos].source.clone(),
                    );
                    return SectionResult { report, next: pos };
                };
                out.description.push_str(&text);
                pos = next_pos;
                last = Section::Resource;
            }
        }
    }

    report.source = section_source(blocks, from, pos);
    SectionResult { report, next: pos }
}
