//! UI rendering for the picker

use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use super::app::App;
use super::components::action_bar::{ordered_hints, render_action_bar};

const PROMPT: &str = "> ";
const CURSOR_MARKER: &str = "▶ ";
const ROW_INDENT: &str = "  ";

/// Draw the entire UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Prompt
            Constraint::Min(1),    // Ranked list
            Constraint::Length(2), // Action bar
        ])
        .split(frame.area());

    let list_height = chunks[1].height as usize;
    app.session.set_page_size(list_height);
    app.scroll_to_cursor(list_height);

    draw_prompt(frame, app, chunks[0]);
    draw_list(frame, app, chunks[1]);
    render_action_bar(
        frame,
        chunks[2],
        &ordered_hints(&[
            ("Enter", "Select"),
            ("↑/↓", "Move"),
            ("Ctrl+U", "Clear"),
            ("Esc", "Cancel"),
        ]),
    );
}

fn draw_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let counter = format!(
        "{}{}/{} [{}]",
        if app.is_ranking() { "… " } else { "" },
        app.session.ranked().len(),
        app.session.candidates().len(),
        app.rule_name
    );
    let counter_width = (counter.chars().count() as u16 + 1).min(area.width / 2);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(counter_width)])
        .split(area);

    let query = app.session.query();
    let prompt = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(query),
    ]);
    frame.render_widget(Paragraph::new(prompt), chunks[0]);
    frame.render_widget(
        Paragraph::new(counter)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right),
        chunks[1],
    );

    let cursor_x = chunks[0].x + (PROMPT.len() + query.chars().count()) as u16;
    if cursor_x < chunks[0].right() {
        frame.set_cursor_position((cursor_x, chunks[0].y));
    }
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let ranked = app.session.ranked();
    if ranked.is_empty() {
        let message = if app.session.candidates().is_empty() {
            "No candidates"
        } else {
            "No matches"
        };
        frame.render_widget(
            Paragraph::new(format!("{}{}", ROW_INDENT, message)).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let cursor = app.session.cursor();
    let lines: Vec<Line> = ranked
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height as usize)
        .map(|(row, m)| highlighted_row(&m.candidate, &m.positions, row == cursor))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// One list row with matched characters emphasised.
fn highlighted_row<'a>(candidate: &'a str, positions: &[usize], selected: bool) -> Line<'a> {
    let base = if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let matched = base.fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut spans = vec![Span::styled(if selected { CURSOR_MARKER } else { ROW_INDENT }, base)];
    let mut run = String::new();
    let mut run_matched = false;
    let mut next = positions.iter().peekable();

    for (idx, c) in candidate.chars().enumerate() {
        let is_match = next.peek() == Some(&&idx);
        if is_match {
            next.next();
        }
        if is_match != run_matched && !run.is_empty() {
            let style = if run_matched { matched } else { base };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = is_match;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, if run_matched { matched } else { base }));
    }

    let line = Line::from(spans);
    if selected {
        line.style(base)
    } else {
        line
    }
}
