use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::block::{Block, BlockKind, SourceMap};

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Tokenize markdown source into the flat, nesting-balanced block stream the
/// section parsers consume.
///
/// Lists are flattened into begin/end marker blocks instead of a tree; the
/// text of a tight list item (one with no paragraph wrapper) is carried by
/// its ListItemEnd block. Begin markers carry no source data; an element's
/// range rides its end marker.
pub fn tokenize(source: &str) -> Vec<Block> {
    let parser = CmarkParser::new_ext(source, Options::empty());
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut blocks = Vec::new();
    // Pending text of open tight items, innermost last.
    let mut item_text: Vec<String> = Vec::new();
    let mut i = 0;

    while i < events.len() {
        let (ref ev, ref range) = events[i];

        match ev {
            Event::Start(Tag::Heading { level, .. }) => {
                let map = SourceMap::single(range.clone());
                let depth = heading_depth(level);
                i += 1;
                let text = collect_text(&events, &mut i, |e| matches!(e, TagEnd::Heading(_)));
                blocks.push(Block::header(text, depth, map));
            }

            Event::Start(Tag::Paragraph) => {
                let map = SourceMap::single(range.clone());
                i += 1;
                let text = collect_text(&events, &mut i, |e| matches!(e, TagEnd::Paragraph));
                blocks.push(Block::new(BlockKind::Paragraph, text, map));
            }

            Event::Start(Tag::CodeBlock(_)) => {
                let map = SourceMap::single(range.clone());
                i += 1;
                let text = collect_text(&events, &mut i, |e| matches!(e, TagEnd::CodeBlock));
                blocks.push(Block::new(BlockKind::Code, text, map));
            }

            Event::Start(Tag::List(_)) => {
                blocks.push(Block::new(BlockKind::ListBegin, "", SourceMap::new()));
                i += 1;
            }

            Event::End(TagEnd::List(_)) => {
                let map = SourceMap::single(range.clone());
                blocks.push(Block::new(BlockKind::ListEnd, "", map));
                i += 1;
            }

            Event::Start(Tag::Item) => {
                blocks.push(Block::new(BlockKind::ListItemBegin, "", SourceMap::new()));
                item_text.push(String::new());
                i += 1;
            }

            Event::End(TagEnd::Item) => {
                let map = SourceMap::single(range.clone());
                let text = item_text.pop().unwrap_or_default();
                blocks.push(Block::new(BlockKind::ListItemEnd, text, map));
                i += 1;
            }

            // Bare inline content reaching this loop sits directly inside a
            // list item: a tight item.
            Event::Text(s) | Event::Code(s) => {
                if let Some(pending) = item_text.last_mut() {
                    pending.push_str(s);
                }
                i += 1;
            }

            Event::SoftBreak | Event::HardBreak => {
                if let Some(pending) = item_text.last_mut() {
                    if !pending.is_empty() {
                        pending.push('\n');
                    }
                }
                i += 1;
            }

            Event::Rule => {
                blocks.push(Block::new(BlockKind::HRule, "", SourceMap::single(range.clone())));
                i += 1;
            }

            Event::Start(Tag::BlockQuote(_)) => {
                let map = SourceMap::single(range.clone());
                blocks.push(Block::new(BlockKind::Quote, raw_slice(source, range), map));
                i += 1;
                skip_quote(&events, &mut i);
            }

            Event::Start(Tag::HtmlBlock) => {
                let map = SourceMap::single(range.clone());
                blocks.push(Block::new(BlockKind::Html, raw_slice(source, range), map));
                i += 1;
                while i < events.len() && !matches!(events[i].0, Event::End(TagEnd::HtmlBlock)) {
                    i += 1;
                }
                if i < events.len() {
                    i += 1;
                }
            }

            _ => {
                i += 1;
            }
        }
    }

    blocks
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_depth(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Flatten inline content into plain text until a matching End tag.
/// Inline markup is dropped, its text kept; breaks become newlines.
fn collect_text(
    events: &[(Event<'_>, Range<usize>)],
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Code(s) => {
                text.push_str(s);
                *i += 1;
            }
            Event::Html(s) | Event::InlineHtml(s) => {
                text.push_str(s);
                *i += 1;
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}

/// Skip a block quote's inner events, minding nested quotes.
fn skip_quote(events: &[(Event<'_>, Range<usize>)], i: &mut usize) {
    let mut depth = 1usize;
    while *i < events.len() {
        match events[*i].0 {
            Event::Start(Tag::BlockQuote(_)) => depth += 1,
            Event::End(TagEnd::BlockQuote(_)) => {
                depth -= 1;
                if depth == 0 {
                    *i += 1;
                    return;
                }
            }
            _ => {}
        }
        *i += 1;
    }
}

fn raw_slice<'a>(source: &'a str, range: &Range<usize>) -> &'a str {
    source.get(range.clone()).unwrap_or("")
}
