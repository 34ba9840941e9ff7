//! Flattens report markdown into blocks the view can lay out with plain text
//! widgets.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(u8, String),
    Paragraph(String),
    ListItem { depth: usize, text: String },
    Code(String),
    Quote(String),
    Rule,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: String,
    list_depth: usize,
    in_quote: bool,
}

impl Builder {
    fn flush(&mut self) {
        let text = self.current.trim().to_string();
        self.current.clear();
        if text.is_empty() {
            return;
        }
        let block = if self.list_depth > 0 {
            Block::ListItem {
                depth: self.list_depth,
                text,
            }
        } else if self.in_quote {
            Block::Quote(text)
        } else {
            Block::Paragraph(text)
        };
        self.blocks.push(block);
    }
}

pub fn blocks(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut b = Builder::default();

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading(_, _, _)) => b.flush(),
            Event::End(Tag::Heading(level, _, _)) => {
                let text = b.current.trim().to_string();
                b.current.clear();
                b.blocks.push(Block::Heading(heading_level(level), text));
            }
            Event::Start(Tag::List(_)) => {
                b.flush();
                b.list_depth += 1;
            }
            Event::End(Tag::List(_)) => {
                b.flush();
                b.list_depth = b.list_depth.saturating_sub(1);
            }
            Event::Start(Tag::Item) => b.flush(),
            Event::End(Tag::Item) => b.flush(),
            Event::End(Tag::Paragraph) => {
                if b.list_depth > 0 {
                    b.current.push(' ');
                } else {
                    b.flush();
                }
            }
            Event::Start(Tag::BlockQuote) => {
                b.flush();
                b.in_quote = true;
            }
            Event::End(Tag::BlockQuote) => {
                b.flush();
                b.in_quote = false;
            }
            Event::Start(Tag::CodeBlock(_)) => b.flush(),
            Event::End(Tag::CodeBlock(_)) => {
                let code = b.current.trim_end_matches('\n').to_string();
                b.current.clear();
                b.blocks.push(Block::Code(code));
            }
            // Table cells read as one line per row.
            Event::End(Tag::TableCell) => b.current.push_str(" | "),
            Event::End(Tag::TableHead) | Event::End(Tag::TableRow) => b.flush(),
            Event::Text(text) | Event::Code(text) => b.current.push_str(&text),
            Event::SoftBreak => b.current.push(' '),
            Event::HardBreak => b.current.push('\n'),
            Event::Rule => {
                b.flush();
                b.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(done) => {
                b.current.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }
    b.flush();
    b.blocks
}
