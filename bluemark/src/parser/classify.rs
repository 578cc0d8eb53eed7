use crate::block::{Block, BlockKind, matching_end};

// ---------------------------------------------------------------------------
// Section kinds and contexts
// ---------------------------------------------------------------------------

/// Semantic section kinds. Classification is context-dependent: the same
/// block can classify differently depending on the entity being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Not owned by the current section: a boundary for the active parser.
    Undefined,
    Blueprint,
    Metadata,
    ResourceGroup,
    Resource,
    /// Abbreviated `<verb> <uri>` header opening a resource and its method
    /// in one block.
    ResourceMethod,
    Method,
    Object,
    Headers,
    Request,
    Response,
    Body,
    Schema,
}

/// The entity whose parser is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Blueprint,
    Group,
    Resource,
    Method,
    Payload,
}

/// HTTP verbs recognized in method and abbreviated-method signatures.
/// Matching is case-sensitive, as written in a document.
pub const HTTP_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH", "PROPPATCH", "LOCK", "UNLOCK", "COPY",
    "MOVE", "MKCOL", "HEAD",
];

/// Classify the block at `pos` without consuming anything.
///
/// `last` is the most recently active section of the asking parser; it
/// disambiguates entry signatures from boundaries and continuations.
pub fn classify_block(context: Context, blocks: &[Block], pos: usize, last: Section) -> Section {
    if pos >= blocks.len() {
        return Section::Undefined;
    }
    match context {
        Context::Blueprint => classify_blueprint(blocks, pos, last),
        Context::Group => classify_group(blocks, pos, last),
        Context::Resource => classify_resource(blocks, pos, last),
        Context::Method => classify_method(blocks, pos, last),
        Context::Payload => classify_payload(blocks, pos),
    }
}

// ---------------------------------------------------------------------------
// Per-context rules
// ---------------------------------------------------------------------------

fn classify_blueprint(blocks: &[Block], pos: usize, last: Section) -> Section {
    let block = &blocks[pos];
    match block.kind {
        BlockKind::Header => {
            let text = block.text.trim();
            if group_signature(text).is_some()
                || resource_method_signature(text).is_some()
                || resource_signature(text).is_some()
            {
                return Section::ResourceGroup;
            }
            Section::Blueprint
        }
        BlockKind::Paragraph => {
            // Metadata is only recognized before any blueprint content.
            if matches!(last, Section::Undefined | Section::Metadata)
                && metadata_signature(&block.text)
            {
                return Section::Metadata;
            }
            Section::Blueprint
        }
        _ => Section::Blueprint,
    }
}

fn classify_group(blocks: &[Block], pos: usize, last: Section) -> Section {
    let block = &blocks[pos];
    if block.kind == BlockKind::Header {
        let text = block.text.trim();
        if group_signature(text).is_some() {
            return entry_or_boundary(last, Section::ResourceGroup);
        }
        if resource_method_signature(text).is_some() {
            return Section::ResourceMethod;
        }
        if resource_signature(text).is_some() {
            return Section::Resource;
        }
    }
    continuation(last, Section::ResourceGroup)
}

fn classify_resource(blocks: &[Block], pos: usize, last: Section) -> Section {
    let block = &blocks[pos];
    match block.kind {
        BlockKind::Header => {
            let text = block.text.trim();
            // A group header is never part of a resource.
            if group_signature(text).is_some() {
                return Section::Undefined;
            }
            if resource_method_signature(text).is_some() {
                return entry_or_boundary(last, Section::ResourceMethod);
            }
            if resource_signature(text).is_some() {
                return entry_or_boundary(last, Section::Resource);
            }
            if method_signature(text) {
                // A bare verb right after an abbreviated signature is the
                // ambiguous continuation; the resource parser stops there.
                if last == Section::ResourceMethod {
                    return Section::Undefined;
                }
                return Section::Method;
            }
            continuation(last, Section::Resource)
        }
        BlockKind::ListBegin | BlockKind::ListItemBegin => match list_item_signature(blocks, pos) {
            Some(line) if keyword_signature(line, "headers") => Section::Headers,
            Some(line) if object_signature(line).is_some() => Section::Object,
            _ => continuation(last, Section::Resource),
        },
        _ => continuation(last, Section::Resource),
    }
}

fn classify_method(blocks: &[Block], pos: usize, last: Section) -> Section {
    let block = &blocks[pos];
    match block.kind {
        BlockKind::Header => {
            let text = block.text.trim();
            if group_signature(text).is_some()
                || resource_method_signature(text).is_some()
                || resource_signature(text).is_some()
            {
                return Section::Undefined;
            }
            if method_signature(text) {
                return entry_or_boundary(last, Section::Method);
            }
            continuation(last, Section::Method)
        }
        BlockKind::ListBegin | BlockKind::ListItemBegin => match list_item_signature(blocks, pos) {
            Some(line) if keyword_signature(line, "headers") => Section::Headers,
            Some(line) => match payload_signature(line) {
                Some((section, _, _)) => section,
                None => continuation(last, Section::Method),
            },
            None => continuation(last, Section::Method),
        },
        _ => continuation(last, Section::Method),
    }
}

fn classify_payload(blocks: &[Block], pos: usize) -> Section {
    let block = &blocks[pos];
    match block.kind {
        // A code block directly inside a payload item is its body.
        BlockKind::Code => Section::Body,
        BlockKind::ListBegin | BlockKind::ListItemBegin => match list_item_signature(blocks, pos) {
            Some(line) if keyword_signature(line, "headers") => Section::Headers,
            Some(line) if keyword_signature(line, "body") => Section::Body,
            Some(line) if keyword_signature(line, "schema") => Section::Schema,
            _ => Section::Undefined,
        },
        _ => Section::Undefined,
    }
}

/// An entry signature classifies once; seen again it is a boundary.
fn entry_or_boundary(last: Section, section: Section) -> Section {
    if last == Section::Undefined {
        section
    } else {
        Section::Undefined
    }
}

/// Unrecognized blocks continue the open section, if one is open at all.
fn continuation(last: Section, owner: Section) -> Section {
    if last == Section::Undefined {
        Section::Undefined
    } else {
        owner
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// `<name> [<uri-template>]` or a bare `<uri-template>` starting with `/`.
/// Returns (name, uri); name is empty for the bare form.
pub fn resource_signature(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if text.starts_with('/') {
        return Some(("", text));
    }
    let open = text.rfind('[')?;
    let uri = text[open + 1..].strip_suffix(']')?;
    if !uri.starts_with('/') {
        return None;
    }
    Some((text[..open].trim(), uri))
}

/// `<verb> <uri-template>`: an abbreviated resource method.
pub fn resource_method_signature(text: &str) -> Option<(&str, &str)> {
    let (verb, rest) = text.trim().split_once(char::is_whitespace)?;
    let uri = rest.trim();
    if HTTP_METHODS.contains(&verb) && uri.starts_with('/') {
        Some((verb, uri))
    } else {
        None
    }
}

/// A bare HTTP verb.
pub fn method_signature(text: &str) -> bool {
    HTTP_METHODS.contains(&text.trim())
}

/// `Group <name>` (keyword case-insensitive). Returns the group name.
pub fn group_signature(text: &str) -> Option<&str> {
    let (first, rest) = split_first_word(text.trim());
    if first.eq_ignore_ascii_case("group") {
        Some(rest)
    } else {
        None
    }
}

/// `<name> object` with an optional trailing `(<media type>)`.
pub fn object_signature(text: &str) -> Option<(&str, Option<&str>)> {
    let (head, media) = split_media(text.trim());
    let name = strip_keyword_suffix(head, "object")?;
    Some((name, media))
}

/// `Request <name>` / `Response <name>` with an optional trailing media
/// type. Returns the section the marker opens, the name, and the media type.
pub fn payload_signature(text: &str) -> Option<(Section, &str, Option<&str>)> {
    let (head, media) = split_media(text.trim());
    let (first, rest) = split_first_word(head);
    if first.eq_ignore_ascii_case("request") {
        Some((Section::Request, rest, media))
    } else if first.eq_ignore_ascii_case("response") {
        Some((Section::Response, rest, media))
    } else {
        None
    }
}

/// A bare keyword, case-insensitive exact match after trimming.
pub fn keyword_signature(text: &str, keyword: &str) -> bool {
    text.trim().eq_ignore_ascii_case(keyword)
}

/// A paragraph in which every line is `key: value` with a compact key.
pub fn metadata_signature(text: &str) -> bool {
    let mut any = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, _)) = line.split_once(':') else {
            return false;
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return false;
        }
        any = true;
    }
    any
}

/// The signature line of the list item at `pos` (a ListBegin or
/// ListItemBegin block): the first line of the item's first content.
///
/// Tight items carry their text on the matching ListItemEnd, after any
/// nested blocks.
pub fn list_item_signature(blocks: &[Block], pos: usize) -> Option<&str> {
    let item = match blocks[pos].kind {
        BlockKind::ListBegin => pos + 1,
        BlockKind::ListItemBegin => pos,
        _ => return None,
    };
    if blocks.get(item)?.kind != BlockKind::ListItemBegin {
        return None;
    }
    let content = blocks.get(item + 1)?;
    match content.kind {
        BlockKind::Paragraph | BlockKind::ListItemEnd => Some(first_line(&content.text)),
        _ => {
            let end = matching_end(blocks, item)?;
            Some(first_line(&blocks[end].text))
        }
    }
}

/// The first line of a text block.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split_first_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (text, ""),
    }
}

/// Split a trailing `(<media type>)` off a signature line.
fn split_media(text: &str) -> (&str, Option<&str>) {
    let text = text.trim_end();
    if let Some(stripped) = text.strip_suffix(')') {
        if let Some(open) = stripped.rfind('(') {
            return (text[..open].trim_end(), Some(stripped[open + 1..].trim()));
        }
    }
    (text, None)
}

/// Strip a case-insensitive keyword off the end of a line, requiring either
/// nothing or whitespace before it. Returns the trimmed remainder.
fn strip_keyword_suffix<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let text = text.trim_end();
    if text.len() < keyword.len() {
        return None;
    }
    let split = text.len() - keyword.len();
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    if !tail.eq_ignore_ascii_case(keyword) {
        return None;
    }
    if head.is_empty() || head.ends_with(char::is_whitespace) {
        Some(head.trim_end())
    } else {
        None
    }
}
