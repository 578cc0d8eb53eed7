use crate::block::{Block, BlockKind};
use crate::blueprint::{Blueprint, Resource, ResourceGroup};
use crate::parser::classify::{Context, Section, classify_block, group_signature};
use crate::parser::diag::{ErrorKind, ParseReport};
use crate::parser::resource::parse_resource;
use crate::parser::{ParseContext, SectionResult, continuation_text, section_source};

/// Parse a whole block stream into a blueprint.
///
/// Leading key-value paragraphs become metadata, the first plain header the
/// blueprint name, and everything up to the first group or resource header
/// the blueprint description.
pub fn parse_blueprint(blocks: &[Block], ctx: &ParseContext<'_>, out: &mut Blueprint) -> SectionResult {
    let mut report = ParseReport::new();
    let mut pos = 0;
    let mut last = Section::Undefined;

    while pos < blocks.len() {
        match classify_block(Context::Blueprint, blocks, pos, last) {
            Section::Metadata => {
                for line in blocks[pos].text.lines() {
                    if let Some((key, value)) = line.split_once(':') {
                        out.metadata.push((key.trim().to_string(), value.trim().to_string()));
                    }
                }
                pos += 1;
                last = Section::Metadata;
            }
            Section::ResourceGroup => {
                let mut group = ResourceGroup::default();
                let child = parse_resource_group(blocks, pos, ctx, &mut group);
                pos = child.next;
                let errored = !child.report.ok();
                report.merge(child.report);
                out.resource_groups.push(group);
                last = Section::ResourceGroup;
                if errored {
                    return SectionResult { report, next: pos };
                }
            }
            _ => {
                let block = &blocks[pos];
                if block.kind == BlockKind::Header
                    && out.name.is_empty()
                    && matches!(last, Section::Undefined | Section::Metadata)
                {
                    out.name = block.text.trim().to_string();
                    pos += 1;
                } else {
                    let Some((text, next_pos)) = continuation_text(blocks, pos, ctx.source) else {
                        report.fail(
                            ErrorKind::UnbalancedStream,
                            "unbalanced list nesting in blueprint description",
                            blocks[pos].source.clone(),
                        );
                        return SectionResult { report, next: pos };
                    };
                    out.description.push_str(&text);
                    pos = next_pos;
                }
                last = Section::Blueprint;
            }
        }
    }

    if ctx.options.require_blueprint_name && out.name.is_empty() {
        let source = blocks.first().map(|b| b.source.clone()).unwrap_or_default();
        report.fail(
            ErrorKind::MissingName,
            "expected a blueprint name in the leading header",
            source,
        );
    }

    report.source = section_source(blocks, 0, pos);
    SectionResult { report, next: pos }
}

/// Parse one resource group. A `Group <name>` header opens a named group;
/// a resource header opens an anonymous one directly.
pub fn parse_resource_group(
    blocks: &[Block],
    from: usize,
    ctx: &ParseContext<'_>,
    out: &mut ResourceGroup,
) -> SectionResult {
    let mut report = ParseReport::new();
    let mut pos = from;
    let mut last = Section::Undefined;

    if let Some(block) = blocks.get(pos).filter(|b| b.kind == BlockKind::Header) {
        if let Some(name) = group_signature(block.text.trim()) {
            out.name = name.trim().to_string();
            pos += 1;
            last = Section::ResourceGroup;
        }
    }

    while pos < blocks.len() {
        match classify_block(Context::Group, blocks, pos, last) {
            Section::Undefined => break,
            Section::Resource | Section::ResourceMethod => {
                let mut resource = Resource::default();
                let child = parse_resource(blocks, pos, ctx, &mut resource);
                pos = child.next;
                let errored = !child.report.ok();
                report.merge(child.report);
                out.resources.push(resource);
                last = Section::Resource;
                if errored {
                    return SectionResult { report, next: pos };
                }
            }
            _ => {
                let Some((text, next_pos)) = continuation_text(blocks, pos, ctx.source) else {
                    report.fail(
                        ErrorKind::UnbalancedStream,
                        "unbalanced list nesting in group description",
                        blocks[pos].source.clone(),
                    );
                    return SectionResult { report, next: pos };
                };
                out.description.push_str(&text);
                pos = next_pos;
                last = Section::ResourceGroup;
            }
        }
    }

    report.source = section_source(blocks, from, pos);
    SectionResult { report, next: pos }
}
