//! Rich text content of a note.
//!
//! Text is a list of blocks (paragraphs or list items), each a list of
//! styled spans. Positions are char offsets into [`RichText::plain_text`],
//! where blocks are separated by a single `'\n'`.

use serde::{Deserialize, Serialize};

/// Default content for a fresh note.
pub const DEFAULT_NOTE_TEXT: &str = "Click to add text...";

fn is_false(value: &bool) -> bool {
    !*value
}

/// A run of text sharing one inline style.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Paragraph or list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Bullet,
    Numbered,
}

impl BlockKind {
    pub fn is_list(&self) -> bool {
        !matches!(self, BlockKind::Paragraph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StyledChar {
    ch: char,
    bold: bool,
    strike: bool,
}

/// One line of content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl Block {
    pub fn new(kind: BlockKind, text: &str) -> Self {
        let spans = if text.is_empty() { Vec::new() } else { vec![Span::plain(text)] };
        Self { kind, spans }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    fn chars(&self) -> Vec<StyledChar> {
        self.spans
            .iter()
            .flat_map(|span| {
                span.text.chars().map(|ch| StyledChar {
                    ch,
                    bold: span.bold,
                    strike: span.strike,
                })
            })
            .collect()
    }

    /// Rebuild spans, merging neighbours with the same style.
    fn set_chars(&mut self, chars: &[StyledChar]) {
        let mut spans: Vec<Span> = Vec::new();
        for c in chars {
            match spans.last_mut() {
                Some(last) if last.bold == c.bold && last.strike == c.strike => last.text.push(c.ch),
                _ => spans.push(Span {
                    text: c.ch.to_string(),
                    bold: c.bold,
                    strike: c.strike,
                }),
            }
        }
        self.spans = spans;
    }
}

/// A caret or selected range, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextSelection {
    pub anchor: usize,
    pub focus: usize,
}

impl TextSelection {
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Formatting commands from the note toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatCommand {
    Bold,
    Strike,
    UnorderedList,
    OrderedList,
}

#[derive(Debug, Clone, Copy)]
enum InlineStyle {
    Bold,
    Strike,
}

/// Note body text. Always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RichTextRepr")]
pub struct RichText {
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct RichTextRepr {
    #[serde(default)]
    blocks: Vec<Block>,
}

impl From<RichTextRepr> for RichText {
    fn from(repr: RichTextRepr) -> Self {
        Self::from_blocks(repr.blocks)
    }
}

impl Default for RichText {
    fn default() -> Self {
        Self::from_plain("")
    }
}

impl RichText {
    /// One paragraph per line.
    pub fn from_plain(text: &str) -> Self {
        let blocks = text.split('\n').map(|line| Block::new(BlockKind::Paragraph, line)).collect();
        Self { blocks }
    }

    /// Build from blocks. An empty list becomes a single empty paragraph.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut text = Self { blocks };
        if text.blocks.is_empty() {
            text.blocks.push(Block::default());
        }
        text
    }

    /// Parse the small HTML subset a contenteditable note body produces
    /// (`b`/`strong`, `s`/`strike`/`del`, `ul`/`ol`/`li`, `div`/`p`/`br`).
    /// Unknown tags are dropped, their text kept.
    pub fn from_markup(markup: &str) -> Self {
        let mut blocks = vec![Block::default()];
        let mut current: Vec<StyledChar> = Vec::new();
        let mut bold = 0usize;
        let mut strike = 0usize;
        let mut lists: Vec<BlockKind> = Vec::new();

        fn flush(blocks: &mut Vec<Block>, current: &mut Vec<StyledChar>) {
            if let Some(last) = blocks.last_mut() {
                last.set_chars(current);
            }
            current.clear();
        }

        fn start_block(blocks: &mut Vec<Block>, current: &mut Vec<StyledChar>, kind: BlockKind) {
            flush(blocks, current);
            let reuse = blocks.last().is_some_and(|b| b.spans.is_empty());
            if reuse {
                if let Some(last) = blocks.last_mut() {
                    last.kind = kind;
                }
            } else {
                blocks.push(Block { kind, spans: Vec::new() });
            }
        }

        let mut rest = markup;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('<') {
                let Some(close) = after.find('>') else {
                    break;
                };
                let tag = after[..close].trim();
                rest = &after[close + 1..];
                let closing = tag.starts_with('/');
                let name: String = tag
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                match (name.as_str(), closing) {
                    ("b" | "strong", false) => bold += 1,
                    ("b" | "strong", true) => bold = bold.saturating_sub(1),
                    ("s" | "strike" | "del", false) => strike += 1,
                    ("s" | "strike" | "del", true) => strike = strike.saturating_sub(1),
                    ("ul", false) => lists.push(BlockKind::Bullet),
                    ("ol", false) => lists.push(BlockKind::Numbered),
                    ("ul" | "ol", true) => {
                        lists.pop();
                        start_block(&mut blocks, &mut current, BlockKind::Paragraph);
                    }
                    ("li", false) => {
                        let kind = lists.last().copied().unwrap_or(BlockKind::Bullet);
                        start_block(&mut blocks, &mut current, kind);
                    }
                    ("div" | "p", false) | ("br", _) => {
                        start_block(&mut blocks, &mut current, BlockKind::Paragraph);
                    }
                    _ => {}
                }
                continue;
            }

            let (ch, len) = if let Some(entity) = rest.strip_prefix('&') {
                match entity.find(';').map(|end| (&entity[..end], end + 2)) {
                    Some(("nbsp", len)) => (' ', len),
                    Some(("amp", len)) => ('&', len),
                    Some(("lt", len)) => ('<', len),
                    Some(("gt", len)) => ('>', len),
                    Some(("quot", len)) => ('"', len),
                    _ => ('&', 1),
                }
            } else {
                match rest.chars().next() {
                    Some(c) => (c, c.len_utf8()),
                    None => break,
                }
            };
            rest = &rest[len..];
            if ch == '\n' {
                continue;
            }
            current.push(StyledChar {
                ch,
                bold: bold > 0,
                strike: strike > 0,
            });
        }
        flush(&mut blocks, &mut current);

        // Trailing empty paragraph left by a closing list or block tag.
        if blocks.len() > 1 && blocks.last().is_some_and(|b| b.spans.is_empty() && !b.kind.is_list()) {
            blocks.pop();
        }
        Self::from_blocks(blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Text with blocks joined by newlines, for list views and search.
    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
    }

    /// Length in chars, counting one per block separator.
    pub fn char_len(&self) -> usize {
        let text: usize = self.blocks.iter().map(Block::char_len).sum();
        text + self.blocks.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.char_len() == 0
    }

    /// (block index, offset inside block) for a document offset. Offsets
    /// past the end map to the end of the last block.
    fn locate(&self, offset: usize) -> (usize, usize) {
        let mut remaining = offset;
        for (i, block) in self.blocks.iter().enumerate() {
            let len = block.char_len();
            if remaining <= len {
                return (i, remaining);
            }
            remaining -= len + 1;
        }
        let last = self.blocks.len() - 1;
        (last, self.blocks[last].char_len())
    }

    /// Indices of blocks touched by `[start, end]`.
    fn block_range(&self, selection: TextSelection) -> std::ops::RangeInclusive<usize> {
        let (first, _) = self.locate(selection.start());
        let (last, _) = self.locate(selection.end());
        first..=last
    }

    /// Apply `f` to every char inside `selection`.
    fn for_each_selected(&mut self, selection: TextSelection, mut f: impl FnMut(&mut StyledChar)) {
        let mut offset = 0;
        let (start, end) = (selection.start(), selection.end());
        for block in &mut self.blocks {
            let len = block.char_len();
            let lo = start.max(offset);
            let hi = end.min(offset + len);
            if lo < hi {
                let mut chars = block.chars();
                for c in &mut chars[lo - offset..hi - offset] {
                    f(c);
                }
                block.set_chars(&chars);
            }
            offset += len + 1;
        }
    }

    fn all_selected(&self, selection: TextSelection, style: InlineStyle) -> bool {
        let mut offset = 0;
        let (start, end) = (selection.start(), selection.end());
        let mut seen = false;
        for block in &self.blocks {
            let len = block.char_len();
            let lo = start.max(offset);
            let hi = end.min(offset + len);
            if lo < hi {
                for c in &block.chars()[lo - offset..hi - offset] {
                    seen = true;
                    let set = match style {
                        InlineStyle::Bold => c.bold,
                        InlineStyle::Strike => c.strike,
                    };
                    if !set {
                        return false;
                    }
                }
            }
            offset += len + 1;
        }
        seen
    }

    fn toggle_inline(&mut self, selection: TextSelection, style: InlineStyle) {
        if selection.is_collapsed() {
            return;
        }
        let value = !self.all_selected(selection, style);
        self.for_each_selected(selection, |c| match style {
            InlineStyle::Bold => c.bold = value,
            InlineStyle::Strike => c.strike = value,
        });
    }

    /// Bold the selection, or un-bold it if it is already fully bold.
    pub fn toggle_bold(&mut self, selection: TextSelection) {
        self.toggle_inline(selection, InlineStyle::Bold);
    }

    /// Strike the selection, or un-strike it if already fully struck.
    pub fn toggle_strike(&mut self, selection: TextSelection) {
        self.toggle_inline(selection, InlineStyle::Strike);
    }

    /// Turn the touched blocks into `kind` list items. If any of them is
    /// already a list item of either kind, they all become paragraphs.
    pub fn toggle_list(&mut self, selection: TextSelection, kind: BlockKind) {
        let range = self.block_range(selection);
        let any_list = self.blocks[range.clone()].iter().any(|b| b.kind.is_list());
        let target = if any_list { BlockKind::Paragraph } else { kind };
        for block in &mut self.blocks[range] {
            block.kind = target;
        }
    }

    pub fn apply(&mut self, command: FormatCommand, selection: TextSelection) {
        match command {
            FormatCommand::Bold => self.toggle_bold(selection),
            FormatCommand::Strike => self.toggle_strike(selection),
            FormatCommand::UnorderedList => self.toggle_list(selection, BlockKind::Bullet),
            FormatCommand::OrderedList => self.toggle_list(selection, BlockKind::Numbered),
        }
    }

    /// Remove the selected range, joining blocks it spans.
    fn delete_range(&mut self, selection: TextSelection) {
        if selection.is_collapsed() {
            return;
        }
        let (bi, oi) = self.locate(selection.start());
        let (bj, oj) = self.locate(selection.end());
        let mut joined = self.blocks[bi].chars()[..oi].to_vec();
        joined.extend_from_slice(&self.blocks[bj].chars()[oj..]);
        self.blocks[bi].set_chars(&joined);
        self.blocks.drain(bi + 1..=bj);
    }

    /// Replace the selection with `text` and return the caret after it.
    ///
    /// Inserted chars take the style of the char before the caret. A
    /// newline splits the block; new blocks keep the current block kind.
    pub fn insert_text(&mut self, selection: TextSelection, text: &str) -> TextSelection {
        let start = selection.start().min(self.char_len());
        self.delete_range(selection);
        let (bi, oi) = self.locate(start);

        let chars = self.blocks[bi].chars();
        let (bold, strike) = oi
            .checked_sub(1)
            .and_then(|i| chars.get(i))
            .map(|c| (c.bold, c.strike))
            .unwrap_or((false, false));
        let styled = |line: &str| -> Vec<StyledChar> {
            line.chars().map(|ch| StyledChar { ch, bold, strike }).collect()
        };

        let kind = self.blocks[bi].kind;
        let tail = chars[oi..].to_vec();
        let mut lines = text.split('\n');
        let mut head = chars[..oi].to_vec();
        head.extend(styled(lines.next().unwrap_or_default()));

        let rest: Vec<&str> = lines.collect();
        if rest.is_empty() {
            head.extend_from_slice(&tail);
            self.blocks[bi].set_chars(&head);
        } else {
            self.blocks[bi].set_chars(&head);
            for (n, line) in rest.iter().enumerate() {
                let mut block_chars = styled(line);
                if n == rest.len() - 1 {
                    block_chars.extend_from_slice(&tail);
                }
                let mut block = Block { kind, spans: Vec::new() };
                block.set_chars(&block_chars);
                self.blocks.insert(bi + 1 + n, block);
            }
        }

        TextSelection::caret(start + text.chars().count())
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::from_plain(text)
    }
}
