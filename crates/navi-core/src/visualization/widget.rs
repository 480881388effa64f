//! Ratatui widgets for the thread forest and fetched nodes
//!
//! Provides `ThreadListWidget`, `FramesWidget` and `NodeViewWidget`, which can
//! be rendered in ratatui TUIs. Interactive values are underlined; the focused
//! one is reversed.
//!
//! Lines are wrapped here rather than by `Paragraph`, so mouse hit tests see
//! the same rows that are drawn.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::abbrev::Abbreviated;

use super::{ForestView, NodeBody, NodeView, RenderOptions, ThreadView, ValueView};

/// Color scheme for the navigator widgets
#[derive(Debug, Clone)]
pub struct NaviColors {
    /// Color for thread headings
    pub thread: Color,
    /// Color for the selected thread heading
    pub selected_thread: Color,
    /// Color for frame headings
    pub frame: Color,
    /// Color for native frame headings
    pub native: Color,
    /// Color for type headings in overlays
    pub heading: Color,
    /// Color for slot names
    pub key: Color,
    /// Color for plain values
    pub value: Color,
    /// Color for expandable values
    pub link: Color,
    /// Color for tree structure characters and separators
    pub tree_chars: Color,
}

impl Default for NaviColors {
    fn default() -> Self {
        Self {
            thread: Color::White,
            selected_thread: Color::Cyan,
            frame: Color::Green,
            native: Color::DarkGray,
            heading: Color::Magenta,
            key: Color::Yellow,
            value: Color::Gray,
            link: Color::Blue,
            tree_chars: Color::DarkGray,
        }
    }
}

impl NaviColors {
    fn value_style(&self, value: &ValueView, focused: bool) -> Style {
        if !value.is_interactive() {
            return Style::default().fg(self.value);
        }
        let style = Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED);
        if focused {
            style.add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            style
        }
    }
}

/// Numbers interactive values as lines are built
struct LinkCursor {
    next: usize,
    focus: Option<usize>,
}

impl LinkCursor {
    fn new(focus: Option<usize>) -> Self {
        Self { next: 0, focus }
    }

    /// Link index of `value`, if it is interactive
    fn visit(&mut self, value: &ValueView) -> Option<usize> {
        if !value.is_interactive() {
            return None;
        }
        let link = self.next;
        self.next += 1;
        Some(link)
    }

    fn is_focused(&self, link: Option<usize>) -> bool {
        link.is_some() && link == self.focus
    }
}

/// One screen row, with the links it shows as column ranges
struct Row<'a> {
    line: Line<'a>,
    links: Vec<(Range<usize>, usize)>,
}

impl<'a> Row<'a> {
    fn new(line: Line<'a>) -> Self {
        Self {
            line,
            links: Vec::new(),
        }
    }

    fn link_at(&self, column: usize) -> Option<usize> {
        self.links
            .iter()
            .find(|(columns, _)| columns.contains(&column))
            .map(|(_, link)| *link)
    }
}

/// Break `line` into rows of at most `width` columns. Zero means unbounded.
fn wrap_line(line: Line<'_>, width: usize) -> Vec<Line<'_>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut used = 0;
    for span in line.spans {
        let style = span.style;
        let mut piece = String::new();
        for c in span.content.chars() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if used > 0 && used + char_width > width {
                if !piece.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut piece), style));
                }
                rows.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            piece.push(c);
            used += char_width;
        }
        if !piece.is_empty() {
            current.push(Span::styled(piece, style));
        }
    }
    if !current.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}

/// Wrap a logical line; every row it spans activates `link`
fn wrap_rows(line: Line<'_>, link: Option<usize>, width: usize) -> impl Iterator<Item = Row<'_>> {
    wrap_line(line, width).into_iter().map(move |line| Row {
        line,
        links: link.map(|link| vec![(0..usize::MAX, link)]).unwrap_or_default(),
    })
}

fn slot_line<'a>(
    indent: String,
    name: &str,
    value: &ValueView,
    colors: &NaviColors,
    cursor: &mut LinkCursor,
) -> (Line<'a>, Option<usize>) {
    let link = cursor.visit(value);
    let focused = cursor.is_focused(link);
    let line = Line::from(vec![
        Span::styled(indent, Style::default().fg(colors.tree_chars)),
        Span::styled(name.to_string(), Style::default().fg(colors.key)),
        Span::styled(" = ", Style::default().fg(colors.tree_chars)),
        Span::styled(value.text.clone(), colors.value_style(value, focused)),
    ]);
    (line, link)
}

/// Draw the block, if any, and return the area left for content
fn render_block(block: Option<Block<'_>>, area: Rect, buf: &mut Buffer) -> Rect {
    match block {
        Some(block) => {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        }
        None => area,
    }
}

/// Draw pre-wrapped rows; anything wider than the area is clipped
fn render_rows<'a>(rows: impl IntoIterator<Item = Line<'a>>, scroll: usize, area: Rect, buf: &mut Buffer) {
    let visible: Vec<Line> = rows
        .into_iter()
        .skip(scroll)
        .take(area.height as usize)
        .collect();
    Paragraph::new(visible).render(area, buf);
}

/// Widget listing thread headings, one per row, with the selected one highlighted
pub struct ThreadListWidget<'a> {
    forest: &'a ForestView,
    selected: Option<usize>,
    colors: NaviColors,
    block: Option<Block<'a>>,
    scroll_offset: usize,
}

impl<'a> ThreadListWidget<'a> {
    pub fn new(forest: &'a ForestView) -> Self {
        Self {
            forest,
            selected: None,
            colors: NaviColors::default(),
            block: None,
            scroll_offset: 0,
        }
    }

    /// Set the selected thread index for highlighting
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    pub fn colors(mut self, colors: NaviColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Index of the first thread shown
    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    fn build_lines(&self) -> Vec<Line<'a>> {
        self.forest
            .threads
            .iter()
            .enumerate()
            .map(|(index, thread)| {
                let style = if self.selected == Some(index) {
                    Style::default()
                        .fg(self.colors.selected_thread)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(self.colors.thread)
                };
                Line::from(Span::styled(thread.heading(), style))
            })
            .collect()
    }
}

impl Widget for ThreadListWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = render_block(self.block.take(), area, buf);
        render_rows(self.build_lines(), self.scroll_offset, inner, buf);
    }
}

/// Widget showing the frames of one thread and their slots
pub struct FramesWidget<'a> {
    thread: Option<&'a ThreadView>,
    options: RenderOptions,
    colors: NaviColors,
    block: Option<Block<'a>>,
    focus: Option<usize>,
    scroll_offset: usize,
}

impl<'a> FramesWidget<'a> {
    pub fn new(thread: Option<&'a ThreadView>) -> Self {
        Self {
            thread,
            options: RenderOptions::default(),
            colors: NaviColors::default(),
            block: None,
            focus: None,
            scroll_offset: 0,
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn colors(mut self, colors: NaviColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Index of the focused link among this thread's links
    pub fn focus(mut self, focus: Option<usize>) -> Self {
        self.focus = focus;
        self
    }

    /// Set scroll offset, in rows, for viewing long stacks
    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Logical lines, each with the link it shows
    fn build_lines(&self) -> Vec<(Line<'a>, Option<usize>)> {
        let Some(thread) = self.thread else {
            return vec![(
                Line::from(Span::styled(
                    "No threads captured",
                    Style::default().fg(Color::DarkGray),
                )),
                None,
            )];
        };

        let style = self.options.style;
        let mut cursor = LinkCursor::new(self.focus);
        let mut lines = Vec::new();
        let frame_count = thread.frames.len();

        for (i, frame) in thread.frames.iter().enumerate() {
            let is_last = i + 1 == frame_count;
            let heading_style = if frame.native {
                Style::default()
                    .fg(self.colors.native)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
                    .fg(self.colors.frame)
                    .add_modifier(Modifier::BOLD)
            };
            let heading = Line::from(vec![
                Span::styled(
                    style.branch(is_last).to_string(),
                    Style::default().fg(self.colors.tree_chars),
                ),
                Span::styled(frame.heading(&self.options), heading_style),
            ]);
            lines.push((heading, None));

            let prefix = style.vertical(is_last);
            let slot_count = frame.slots.len();
            for (j, slot) in frame.slots.iter().enumerate() {
                let indent = format!("{}{}", prefix, style.branch(j + 1 == slot_count));
                lines.push(slot_line(indent, &slot.name, &slot.value, &self.colors, &mut cursor));
            }
        }

        lines
    }

    fn rows(&self, width: usize) -> Vec<Row<'a>> {
        self.build_lines()
            .into_iter()
            .flat_map(|(line, link)| wrap_rows(line, link, width))
            .collect()
    }

    /// Link shown on `row` of an inner area `width` columns wide, as an
    /// index among this thread's links
    pub fn link_at(&self, row: usize, width: u16) -> Option<usize> {
        self.rows(usize::from(width))
            .get(row + self.scroll_offset)?
            .link_at(0)
    }
}

impl Widget for FramesWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = render_block(self.block.take(), area, buf);
        let rows = self.rows(usize::from(inner.width));
        render_rows(rows.into_iter().map(|row| row.line), self.scroll_offset, inner, buf);
    }
}

/// Widget showing one fetched node
pub struct NodeViewWidget<'a> {
    view: &'a NodeView,
    options: RenderOptions,
    colors: NaviColors,
    block: Option<Block<'a>>,
    focus: Option<usize>,
}

impl<'a> NodeViewWidget<'a> {
    pub fn new(view: &'a NodeView) -> Self {
        Self {
            view,
            options: RenderOptions::default(),
            colors: NaviColors::default(),
            block: None,
            focus: None,
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn colors(mut self, colors: NaviColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Index of the focused link among this node's links
    pub fn focus(mut self, focus: Option<usize>) -> Self {
        self.focus = focus;
        self
    }

    /// Rows needed to show everything when drawn `width` columns wide,
    /// borders included
    pub fn desired_height(&self, width: u16) -> u16 {
        let border: u16 = if self.block.is_some() { 2 } else { 0 };
        let rows = self.rows(usize::from(width.saturating_sub(border))).len();
        u16::try_from(rows + usize::from(border)).unwrap_or(u16::MAX)
    }

    /// Link at a position inside an inner area `width` columns wide, as an
    /// index among this node's links
    pub fn link_at(&self, row: usize, column: usize, width: u16) -> Option<usize> {
        self.rows(usize::from(width)).get(row)?.link_at(column)
    }

    fn heading_line(&self, heading: &Abbreviated) -> Line<'a> {
        Line::from(Span::styled(
            heading.text(self.options.full_names).to_string(),
            Style::default()
                .fg(self.colors.heading)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn rows(&self, width: usize) -> Vec<Row<'a>> {
        let mut cursor = LinkCursor::new(self.focus);
        let indent = " ".repeat(self.options.indent_width);

        match &self.view.body {
            NodeBody::Object { heading, slots } => {
                let mut rows: Vec<Row> = wrap_rows(self.heading_line(heading), None, width).collect();
                for slot in slots {
                    let (line, link) = slot_line(
                        indent.clone(),
                        &slot.name,
                        &slot.value,
                        &self.colors,
                        &mut cursor,
                    );
                    rows.extend(wrap_rows(line, link, width));
                }
                rows
            }
            NodeBody::Sequence { heading, items } => {
                let mut rows: Vec<Row> = wrap_rows(self.heading_line(heading), None, width).collect();
                rows.extend(self.item_rows(items, &indent, width, &mut cursor));
                rows
            }
            NodeBody::Scalar { value } => {
                let line = Line::from(Span::styled(
                    value.text.clone(),
                    Style::default().fg(self.colors.value),
                ));
                wrap_rows(line, None, width).collect()
            }
        }
    }

    /// Flow sequence items across rows without splitting any item
    fn item_rows(
        &self,
        items: &[ValueView],
        indent: &str,
        width: usize,
        cursor: &mut LinkCursor,
    ) -> Vec<Row<'a>> {
        if items.is_empty() {
            return Vec::new();
        }
        let width = if width == 0 { usize::MAX } else { width };
        let separator = Style::default().fg(self.colors.tree_chars);
        let start_row = || Row::new(Line::from(Span::raw(indent.to_string())));

        let mut rows = Vec::new();
        let mut row = start_row();
        let mut column = indent.width();
        for (i, item) in items.iter().enumerate() {
            let item_width = item.text.width();
            if i > 0 {
                if column + 2 + item_width <= width {
                    row.line.spans.push(Span::styled(", ", separator));
                    column += 2;
                } else {
                    row.line.spans.push(Span::styled(",", separator));
                    rows.push(std::mem::replace(&mut row, start_row()));
                    column = indent.width();
                }
            }

            let link = cursor.visit(item);
            let focused = cursor.is_focused(link);
            row.line
                .spans
                .push(Span::styled(item.text.clone(), self.colors.value_style(item, focused)));
            if let Some(link) = link {
                row.links.push((column..column + item_width, link));
            }
            column += item_width;
        }
        rows.push(row);
        rows
    }
}

impl Widget for NodeViewWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = render_block(self.block.take(), area, buf);
        let rows = self.rows(usize::from(inner.width));
        render_rows(rows.into_iter().map(|row| row.line), 0, inner, buf);
    }
}
