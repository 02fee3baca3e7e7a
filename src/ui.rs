use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, OutputView};

const INPUT_PLACEHOLDER: &str = "e.g., write a story about a space cat";
const OUTPUT_PLACEHOLDER: &str = "Your enhanced prompt will appear here...";
const BUSY_MESSAGE: &str = "Generating optimized prompt...";
const SPINNER: [&str; 3] = ["⠋", "⠙", "⠹"];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [input_side, output_side] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(body_area);

    let [input_area, button_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(input_side);

    render_input(app, frame, input_area);
    render_submit_button(app, frame, button_area);
    render_output(app, frame, output_side);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Prompt ", Style::default().fg(Color::White).bold()),
        Span::styled("Enhancer ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("[{}]", app.model()), Style::default().fg(Color::Gray)),
    ];
    if app.api_key_missing {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " API_KEY not set ",
            Style::default().bg(Color::Red).fg(Color::White).bold(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.is_busy { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Your Raw Prompt ");

    let inner = block.inner(area);

    if app.input.is_empty() {
        let placeholder = Paragraph::new(INPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        if !app.is_busy {
            frame.set_cursor_position((inner.x, inner.y));
        }
        return;
    }

    // Keep the cursor inside the visible window, scrolling both ways
    let (line, _) = app.cursor_line_col();
    let col = app.cursor_display_col();
    let scroll_y = scroll_offset(line, inner.height as usize);
    let scroll_x = scroll_offset(col, inner.width as usize);

    let text_style = if app.is_busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let input = Paragraph::new(Text::raw(app.input.as_str()))
        .style(text_style)
        .block(block)
        .scroll((scroll_y as u16, scroll_x as u16));
    frame.render_widget(input, area);

    if !app.is_busy {
        frame.set_cursor_position((
            inner.x + (col - scroll_x) as u16,
            inner.y + (line - scroll_y) as u16,
        ));
    }
}

/// First visible index so that `pos` stays within a window of `size` cells.
fn scroll_offset(pos: usize, size: usize) -> usize {
    if size == 0 || pos < size {
        0
    } else {
        pos - size + 1
    }
}

fn render_submit_button(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.is_busy {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (
            format!("{} Enhancing{}", SPINNER[app.animation_frame as usize % SPINNER.len()], dots),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        )
    } else if app.can_submit() {
        (
            "Enhance Prompt".to_string(),
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Enhance Prompt".to_string(),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        )
    };

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(button, area);
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Enhanced Prompt ");

    let inner_area = block.inner(area);
    app.output_area = Some(area);
    app.output_height = inner_area.height;
    app.output_width = inner_area.width;

    // Scroll bounds come from the same wrapping the result is drawn with
    let wrapped_lines = match app.output_view() {
        OutputView::Result(text) => result_paragraph(text).line_count(inner_area.width),
        _ => 0,
    };
    app.output_lines = wrapped_lines.min(u16::MAX as usize) as u16;
    app.output_scroll = app
        .output_scroll
        .min(app.output_lines.saturating_sub(app.output_height));

    let paragraph = match app.output_view() {
        OutputView::Busy => {
            let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
            Paragraph::new(vec![
                Line::default(),
                Line::from(Span::styled(spinner, Style::default().fg(Color::Cyan))),
                Line::from(Span::styled(
                    BUSY_MESSAGE,
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block)
        }
        OutputView::Error(message) => Paragraph::new(Line::from(vec![
            Span::styled("Error:", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(message.to_string(), Style::default().fg(Color::Red)),
        ]))
        .wrap(Wrap { trim: true })
        .block(block),
        OutputView::Placeholder => Paragraph::new(OUTPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block),
        OutputView::Result(text) => result_paragraph(text)
            .scroll((app.output_scroll, 0))
            .block(block),
    };

    frame.render_widget(paragraph, area);

    let total_lines = app.output_lines;
    if total_lines > app.output_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total_lines as usize)
            .position(app.output_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// Verbatim result: no trimming, line breaks kept, long lines soft-wrapped.
fn result_paragraph(text: &str) -> Paragraph<'_> {
    Paragraph::new(Text::raw(text)).wrap(Wrap { trim: false })
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let hints = Line::from(vec![
        Span::styled(" Enter", key_style),
        Span::raw(" enhance  "),
        Span::styled("Alt+Enter", key_style),
        Span::raw(" newline  "),
        Span::styled("Ctrl+U", key_style),
        Span::raw(" clear  "),
        Span::styled("PgUp/PgDn", key_style),
        Span::raw(" scroll  "),
        Span::styled("Esc", key_style),
        Span::raw(" quit"),
    ]);

    let [hints_area, credit_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(26),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::Gray)), hints_area);
    frame.render_widget(
        Paragraph::new("Powered by Google Gemini ")
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        credit_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::enhancer::tests::ScriptedBackend;
    use crate::enhancer::Enhancer;
    use ratatui::{backend::TestBackend, Terminal};

    fn new_app() -> App {
        let config = Config {
            api_key: Some("k".to_string()),
            ..Config::default()
        };
        App::new(&config, Enhancer::new(ScriptedBackend::text("x")))
    }

    fn rendered(app: &mut App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn count_modes(screen: &str) -> usize {
        [BUSY_MESSAGE, "Error:", OUTPUT_PLACEHOLDER, "RESULT-MARKER"]
            .iter()
            .filter(|marker| screen.contains(*marker))
            .count()
    }

    #[test]
    fn test_placeholder_when_idle() {
        let mut app = new_app();
        let screen = rendered(&mut app).join("\n");
        assert!(screen.contains(OUTPUT_PLACEHOLDER));
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert_eq!(count_modes(&screen), 1);
        assert!(!screen.contains("API_KEY not set"));
    }

    #[test]
    fn test_busy_view() {
        let mut app = new_app();
        app.input = "hi".to_string();
        app.is_busy = true;
        let screen = rendered(&mut app).join("\n");
        assert!(screen.contains(BUSY_MESSAGE));
        assert!(screen.contains("Enhancing"));
        assert_eq!(count_modes(&screen), 1);
    }

    #[test]
    fn test_error_view_is_prefixed() {
        let mut app = new_app();
        app.error_text = Some("Something broke.".to_string());
        let screen = rendered(&mut app).join("\n");
        assert!(screen.contains("Error: Something broke."));
        assert_eq!(count_modes(&screen), 1);
    }

    #[test]
    fn test_result_preserves_whitespace() {
        let mut app = new_app();
        app.result_text = "RESULT-MARKER\n    indented line\n\nlast".to_string();
        let rows = rendered(&mut app);
        let screen = rows.join("\n");
        assert_eq!(count_modes(&screen), 1);

        let marker_row = rows.iter().position(|r| r.contains("RESULT-MARKER")).unwrap();
        assert!(rows[marker_row + 1].contains("│    indented line"));
        assert!(!rows[marker_row + 2].contains("last"));
        assert!(rows[marker_row + 3].contains("last"));
    }

    #[test]
    fn test_render_records_output_geometry() {
        let mut app = new_app();
        rendered(&mut app);
        // 120x30: body is 28 rows, right half is 60 columns, minus borders
        assert_eq!(app.output_height, 26);
        assert_eq!(app.output_width, 58);
        assert_eq!(app.output_area, Some(Rect::new(60, 1, 60, 28)));
    }

    #[test]
    fn test_missing_key_marker() {
        let mut app = App::new(&Config::default(), Enhancer::new(ScriptedBackend::text("x")));
        let screen = rendered(&mut app).join("\n");
        assert!(screen.contains("API_KEY not set"));
    }

    #[test]
    fn test_long_wrapped_result_scrolls_to_end() {
        let mut app = new_app();
        let long_line = format!("{} {} {}", "a".repeat(30), "b".repeat(30), "c".repeat(30));
        let mut lines = vec![long_line; 20];
        lines.push("FINAL-LINE".to_string());
        app.result_text = lines.join("\n");

        rendered(&mut app);
        // Each 92-char line word-wraps to three rows at width 58
        assert_eq!(app.output_lines, 61);

        app.scroll_output_down(10_000);
        assert_eq!(app.output_scroll, 61 - 26);

        let rows = rendered(&mut app);
        let last_inner_row = &rows[1 + 26];
        assert!(last_inner_row.contains("FINAL-LINE"), "last row: {:?}", last_inner_row);
    }

    #[test]
    fn test_scroll_is_clamped_when_result_shrinks() {
        let mut app = new_app();
        app.result_text = "x\n".repeat(100);
        rendered(&mut app);
        app.scroll_output_down(10_000);
        assert_eq!(app.output_scroll, 100 - 26);

        app.result_text = "short".to_string();
        let screen = rendered(&mut app).join("\n");
        assert_eq!(app.output_scroll, 0);
        assert!(screen.contains("short"));
    }

    #[test]
    fn test_enabled_button_label() {
        let mut app = new_app();
        app.input = "hi".to_string();
        let screen = rendered(&mut app).join("\n");
        assert!(screen.contains("Enhance Prompt"));
        assert!(!screen.contains("(Enter)"));
    }

    #[test]
    fn test_cursor_after_wide_chars() {
        let mut app = new_app();
        app.insert_str("你好");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        // Input inner area starts at (1, 2); each CJK char is two columns wide
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (5, 2));
    }

    #[test]
    fn test_scroll_offset_keeps_position_visible() {
        assert_eq!(scroll_offset(3, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(25, 10), 16);
        assert_eq!(scroll_offset(5, 0), 0);
    }
}
