//! Screen layout

use navi_core::navigator::{OverlayId, Pane};
use navi_core::visualization::{FramesWidget, NodeViewWidget, ThreadListWidget};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, HitMap};

const HELP: &str = "q: Quit | h/l: Thread | j/k: Focus | Enter: Open | Esc/x: Close | o: Full names";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    // Header
    let pending = app.in_flight();
    let header_text = if pending > 0 {
        format!("Source: {} ({} pending)", app.source(), pending)
    } else {
        format!("Source: {}", app.source())
    };
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Navi"));
    frame.render_widget(header, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // Threads
            Constraint::Percentage(40), // Frames
            Constraint::Percentage(35), // Overlays
        ])
        .split(chunks[1]);

    let mut hits = HitMap::default();

    // Threads panel
    let block = Block::default().borders(Borders::ALL).title("Threads");
    hits.threads = block.inner(main_chunks[0]);
    let threads = ThreadListWidget::new(app.nav.forest())
        .selected(app.nav.selection().selected())
        .scroll(app.threads_scroll)
        .colors(app.colors.clone())
        .block(block);
    frame.render_widget(threads, main_chunks[0]);

    // Frames panel
    let title = app
        .nav
        .selected_thread()
        .map(|thread| thread.heading())
        .unwrap_or_else(|| "Frames".to_string());
    let block = Block::default().borders(Borders::ALL).title(title);
    hits.frames = block.inner(main_chunks[1]);
    let frames = FramesWidget::new(app.nav.selected_thread())
        .options(app.options.clone())
        .colors(app.colors.clone())
        .focus(app.nav.focus_in(Pane::Frames))
        .scroll(app.frames_scroll)
        .block(block);
    frame.render_widget(frames, main_chunks[1]);

    // Overlays panel
    (hits.overlays, hits.hidden) = draw_overlays(frame, app, main_chunks[2]);

    // Footer
    let footer_text = app.status.clone().unwrap_or_else(|| HELP.to_string());
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);

    app.hits = hits;
    app.clamp_threads_scroll();
}

/// Stack overlays top-down, newest first, until the area is full.
///
/// Returns the overlays drawn with their inner areas, and the ids of those
/// left off screen, which a "+N more" row stands in for.
fn draw_overlays(frame: &mut Frame, app: &App, area: Rect) -> (Vec<(OverlayId, Rect)>, Vec<OverlayId>) {
    let overlays = app.nav.overlays();
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("Overlays ({})", overlays.len()));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if overlays.is_empty() {
        let hint = Paragraph::new("Select a value and press Enter")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return (Vec::new(), Vec::new());
    }

    let widgets: Vec<_> = overlays
        .iter()
        .map(|overlay| {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(overlay.view.base.to_string());
            let widget = NodeViewWidget::new(&overlay.view)
                .options(app.options.clone())
                .colors(app.colors.clone())
                .focus(app.nav.focus_in(Pane::Overlay(overlay.id)))
                .block(block.clone());
            (overlay.id, block, widget)
        })
        .collect();

    let total: u32 = widgets
        .iter()
        .map(|(_, _, widget)| u32::from(widget.desired_height(inner.width)))
        .sum();
    let mut bottom = inner.y + inner.height;
    if total > u32::from(inner.height) {
        // Keep the last row for the marker
        bottom = bottom.saturating_sub(1);
    }

    let mut drawn = Vec::new();
    let mut hidden = Vec::new();
    let mut y = inner.y;
    for (id, block, widget) in widgets {
        // An overlay needs at least its borders and one row of content
        let desired = widget.desired_height(inner.width);
        if bottom.saturating_sub(y) < desired.min(3) {
            hidden.push(id);
            continue;
        }
        let height = desired.min(bottom - y);
        let slot = Rect::new(inner.x, y, inner.width, height);

        drawn.push((id, block.inner(slot)));
        frame.render_widget(widget, slot);
        y += height;
    }

    if !hidden.is_empty() {
        let marker = Paragraph::new(format!("+{} more (Esc closes the newest)", hidden.len()))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(marker, Rect::new(inner.x, bottom, inner.width, 1));
    }
    (drawn, hidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Action;
    use navi_core::config::Config;
    use navi_core::fetch::Snapshot;
    use navi_core::model::Node;
    use navi_core::navigator::Expansion;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::sync::Arc;

    const CAPTURE: &str = r#"{
        "forest": [
            ["<1> main", ["com/example/Main.run()V:3", false, ["this", "<c.e.Main>", "/t/0/0/this"]]],
            ["<2> worker", ["java/lang/Object.wait()V", true]]
        ]
    }"#;

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app() -> App {
        let (forest, fetcher) = Snapshot::from_json(CAPTURE).unwrap().into_parts();
        App::new(&forest, Arc::new(fetcher), &Config::default()).unwrap().0
    }

    #[test]
    fn test_draw_records_hit_areas() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Thread: <1> main"));
        assert!(text.contains("Thread: <2> worker"));
        assert!(text.contains("c.e.Main.run:3"));
        assert!(!text.contains("j.l.Object.wait"));
        assert!(text.contains("Overlays (0)"));

        assert_eq!(app.hits.threads.y, 4);
        assert!(app.hits.frames.x > app.hits.threads.x);
        assert!(app.hits.overlays.is_empty());
    }

    #[test]
    fn test_draw_overlays_newest_first() {
        let mut app = app();
        for (path, value) in [("/a", "first"), ("/b", "second")] {
            app.on_expansion(Expansion {
                path: path.into(),
                result: Ok(Node::Scalar(value.to_string())),
            });
        }

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        let second = text.find("second").unwrap();
        let first = text.find("first").unwrap();
        assert!(second < first);

        let drawn: Vec<u64> = app.hits.overlays.iter().map(|(id, _)| *id).collect();
        let expected: Vec<u64> = app.nav.overlays().iter().map(|o| o.id).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_overlays_past_the_fold_are_counted() {
        let mut app = app();
        for i in 0..6 {
            app.on_expansion(Expansion {
                path: format!("/v/{i}").as_str().into(),
                result: Ok(Node::Scalar(format!("value {i}"))),
            });
        }

        // Twelve rows hold three three-row overlays and the marker
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("value 5"));
        assert!(text.contains("value 3"));
        assert!(!text.contains("value 2"));
        assert!(text.contains("+3 more"));

        let newest: Vec<u64> = app.nav.overlays().iter().map(|o| o.id).collect();
        assert_eq!(app.hits.overlays.len(), 3);
        assert_eq!(app.hits.hidden, newest[3..].to_vec());
    }

    #[test]
    fn test_threads_pane_follows_selection() {
        let threads: Vec<String> = (0..30).map(|i| format!(r#"["thread-{i:02}"]"#)).collect();
        let capture = format!(r#"{{"forest": [{}]}}"#, threads.join(","));
        let (forest, fetcher) = Snapshot::from_json(&capture).unwrap().into_parts();
        let mut app = App::new(&forest, Arc::new(fetcher), &Config::default()).unwrap().0;

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        for _ in 0..25 {
            app.perform(Action::NextThread);
        }
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("thread-25"));
        assert!(!text.contains("thread-00"));
    }

    #[test]
    fn test_selected_thread_frames_follow_selection() {
        let mut app = app();
        app.perform(Action::NextThread);

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("j.l.Object.wait"));
        assert!(!text.contains("c.e.Main.run:3"));
    }
}
