use crate::block::{Block, BlockKind, matching_end};
use crate::blueprint::{Header, Method, Payload};
use crate::parser::classify::{Context, Section, classify_block, method_signature};
use crate::parser::diag::{ErrorKind, ParseReport, WarningKind};
use crate::parser::headers::parse_headers;
use crate::parser::payload::parse_payload;
use crate::parser::{ParseContext, SectionResult, continuation_text, section_source};

/// Parse one method section, starting at its verb header.
///
/// For an abbreviated `<verb> <uri>` header the caller (the resource parser)
/// has already claimed the URI; only the verb is taken from the signature.
/// `resource_headers` is the enclosing header scope for payload merging.
pub fn parse_method(
    blocks: &[Block],
    from: usize,
    ctx: &ParseContext<'_>,
    resource_headers: &[Header],
    out: &mut Method,
) -> SectionResult {
    let mut report = ParseReport::new();

    let Some(signature) = blocks.get(from).filter(|b| b.kind == BlockKind::Header) else {
        let source = blocks.get(from).map(|b| b.source.clone()).unwrap_or_default();
        report.fail(ErrorKind::ExpectedSignature, "expected a method header", source);
        return SectionResult { report, next: from };
    };
    let verb = signature.text.trim().split_whitespace().next().unwrap_or("");
    if !method_signature(verb) {
        report.fail(
            ErrorKind::ExpectedSignature,
            format!("expected an HTTP method header, found '{}'", signature.text.trim()),
            signature.source.clone(),
        );
        return SectionResult { report, next: from };
    }
    out.method = verb.to_string();
    let signature_source = signature.source.clone();

    // Description before the first payload belongs to the method. After a
    // payload has been parsed, trailing text attaches to that payload.
    let mut last_payload: Option<Section> = None;
    let mut pos = from + 1;
    let mut last = Section::Method;

    while pos < blocks.len() {
        match classify_block(Context::Method, blocks, pos, last) {
            Section::Undefined => break,
            Section::Headers | Section::Request | Section::Response
                if blocks[pos].kind == BlockKind::ListBegin =>
            {
                pos += 1;
                while pos < blocks.len() && blocks[pos].kind == BlockKind::ListItemBegin {
                    match classify_block(Context::Method, blocks, pos, last) {
                        Section::Headers => {
                            let child =
                                parse_headers(blocks, pos, &[resource_headers], &mut out.headers);
                            pos = child.next;
                            let errored = !child.report.ok();
                            report.merge(child.report);
                            last = Section::Headers;
                            if errored {
                                return SectionResult { report, next: pos };
                            }
                        }
                        section @ (Section::Request | Section::Response) => {
                            let mut payload = Payload::default();
                            let scopes: [&[Header]; 2] = [&out.headers, resource_headers];
                            let child = parse_payload(blocks, pos, ctx, &scopes, &mut payload);
                            pos = child.next;
                            let errored = !child.report.ok();
                            report.merge(child.report);
                            if section == Section::Request {
                                out.requests.push(payload);
                            } else {
                                out.responses.push(payload);
                            }
                            last_payload = Some(section);
                            last = section;
                            if errored {
                                return SectionResult { report, next: pos };
                            }
                        }
                        _ => {
                            let Some(skip_end) = matching_end(blocks, pos) else {
                                report.fail(
                                    ErrorKind::UnbalancedStream,
                                    "unbalanced list nesting in method section",
                                    blocks[pos].source.clone(),
                                );
                                return SectionResult { report, next: pos };
                            };
                            report.warn(
                                WarningKind::IgnoringBlock,
                                "ignoring unrecognized list item in method section",
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
                        "unbalanced list nesting in method section",
                        blocks[pos].source.clone(),
                    );
                    return SectionResult { report, next: pos };
                };
                match last_payload {
                    Some(Section::Request) => {
                        if let Some(payload) = out.requests.last_mut() {
                            payload.description.push_str(&text);
                        }
                    }
                    Some(Section::Response) => {
                        if let Some(payload) = out.responses.last_mut() {
                            payload.description.push_str(&text);
                        }
                    }
                    _ => out.description.push_str(&text),
                }
                pos = next_pos;
                last = Section::Method;
            }
        }
    }

    if out.responses.is_empty() {
        report.warn(
            WarningKind::NoResponse,
            format!("no response defined for method '{}'", out.method),
            signature_source,
        );
    }

    report.source = section_source(blocks, from, pos);
    SectionResult { report, next: pos }
}
