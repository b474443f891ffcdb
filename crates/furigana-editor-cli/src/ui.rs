use furigana_editor_config::Theme;
use furigana_editor_engine::annotation::{Segment, parse_okurigana};
use furigana_editor_engine::{Document, GateState, Inline, Node, Surface, TextBuffer};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

struct Palette {
    base: Style,
    reading: Style,
    border: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            reading: Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
            border: Style::default().fg(Color::DarkGray).bg(Color::White),
        },
        Theme::Dark => Palette {
            base: Style::default().fg(Color::White).bg(Color::Black),
            reading: Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            border: Style::default().fg(Color::Gray).bg(Color::Black),
        },
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let palette = palette(app.theme());
    let [editor_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());

    let (lines, cursor) = match app.editor.surface() {
        Surface::Blocks(doc) => (document_lines(doc, &palette), document_cursor(doc)),
        Surface::Text(buffer) => (buffer_lines(buffer, &palette), buffer_cursor(buffer)),
    };

    let title = match app.editor.surface() {
        Surface::Blocks(_) => " furigana-editor (per line) ",
        Surface::Text(_) => " furigana-editor (whole text) ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(palette.border);
    let inner = block.inner(editor_area);

    let (row, col) = cursor;
    let scroll = row.saturating_sub(inner.height.saturating_sub(1) as usize);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(palette.base)
        .scroll((clamp_u16(scroll), 0));
    f.render_widget(paragraph, editor_area);

    match app.editor.gate_state() {
        GateState::Loading => loading_overlay(f, editor_area, &palette),
        GateState::Ready => f.set_cursor_position((
            inner.x + clamp_u16(col),
            inner.y + clamp_u16(row - scroll),
        )),
        GateState::Failed(_) => {}
    }

    f.render_widget(status_line(app, &palette), status_area);
}

fn loading_overlay(f: &mut Frame, area: Rect, palette: &Palette) {
    let message = "Loading dictionary…";
    let width = (message.width() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(message)
            .style(palette.base)
            .block(Block::default().borders(Borders::ALL).style(palette.border)),
        popup,
    );
}

fn status_line(app: &App, palette: &Palette) -> Paragraph<'static> {
    let help = "Enter: convert | Ctrl-T: theme | Ctrl-Q/Esc: quit";
    match (app.editor.gate_state(), &app.status) {
        (GateState::Failed(message), _) => Paragraph::new(format!(
            "Editing disabled: dictionary failed to load: {message}"
        ))
        .style(Style::default().fg(Color::White).bg(Color::Red)),
        (_, Some(status)) => Paragraph::new(format!("{status} | {help}")).style(palette.base),
        (_, None) => Paragraph::new(help).style(palette.base),
    }
}

/// One line per root child; readings styled apart from the base text.
fn document_lines(doc: &Document, palette: &Palette) -> Vec<Line<'static>> {
    doc.children()
        .iter()
        .map(|node| {
            let mut spans = Vec::new();
            match node {
                Node::Block(block) => {
                    for inline in block.inlines() {
                        push_inline(&mut spans, inline, palette);
                    }
                }
                Node::Loose(inline) => push_inline(&mut spans, inline, palette),
            }
            Line::from(spans)
        })
        .collect()
}

fn push_inline(spans: &mut Vec<Span<'static>>, inline: &Inline, palette: &Palette) {
    match inline {
        Inline::Text(text) => spans.push(Span::raw(text.clone())),
        Inline::Annotated(span) => push_segments(spans, span.segments(), palette),
    }
}

fn push_segments(spans: &mut Vec<Span<'static>>, segments: &[Segment], palette: &Palette) {
    for segment in segments {
        match segment {
            Segment::Plain(text) => spans.push(Span::raw(text.clone())),
            Segment::Ruby { base, reading } => {
                spans.push(Span::raw(base.clone()));
                spans.push(Span::styled(format!("({reading})"), palette.reading));
            }
        }
    }
}

/// (row, display column) of the caret.
fn document_cursor(doc: &Document) -> (usize, usize) {
    let caret = doc.caret();
    let col = doc
        .children()
        .get(caret.child)
        .map(|node| {
            let text = node.text();
            text.get(..caret.offset).map(UnicodeWidthStr::width).unwrap_or(0)
        })
        .unwrap_or(0);
    (caret.child, col)
}

fn buffer_lines(buffer: &TextBuffer, palette: &Palette) -> Vec<Line<'static>> {
    buffer
        .text()
        .split('\n')
        .map(|line| {
            let mut spans = Vec::new();
            push_segments(&mut spans, &parse_okurigana(line), palette);
            Line::from(spans)
        })
        .collect()
}

fn buffer_cursor(buffer: &TextBuffer) -> (usize, usize) {
    let text = buffer.text();
    let before = text.get(..buffer.caret()).unwrap_or(&text);
    let row = before.matches('\n').count();
    let line = before.rsplit('\n').next().unwrap_or("");
    (row, line.width())
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use furigana_editor_engine::{ConvertOptions, DictionaryConverter};
    use pretty_assertions::assert_eq;

    fn spans(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn readings_get_their_own_styled_span() {
        let converter = DictionaryConverter::from_entries([("食べる", "たべる")]).unwrap();
        let mut doc = Document::from_plain_text("食べる");
        doc.confirm_line_break(&converter, &ConvertOptions::default())
            .unwrap();
        let palette = palette(Theme::Dark);

        let lines = document_lines(&doc, &palette);

        assert_eq!(lines.len(), 2);
        assert_eq!(spans(&lines[0]), vec!["食", "(た)", "べる"]);
        assert_eq!(lines[0].spans[1].style, palette.reading);
        assert!(lines[1].spans.is_empty());
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut doc = Document::from_plain_text("あいう\nab");
        assert_eq!(document_cursor(&doc), (1, 2));
        doc.move_up();
        assert_eq!(document_cursor(&doc), (0, 4));

        let buffer = TextBuffer::from_text("漢字(かんじ)\nかな");
        assert_eq!(buffer_cursor(&buffer), (1, 4));
    }

    #[test]
    fn buffer_lines_style_inline_readings() {
        let buffer = TextBuffer::from_text("今日(きょう)は");
        let palette = palette(Theme::Light);

        let lines = buffer_lines(&buffer, &palette);

        assert_eq!(spans(&lines[0]), vec!["今日", "(きょう)", "は"]);
    }
}
