use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Screen};
use crate::application::store::Snapshot;
use crate::view::detail::{CoverPreview, DetailView, DraftField};
use crate::view::form::{ActiveField, CreateForm};
use crate::view::format::{badge_label, check_mark, posted_at};

pub fn draw(f: &mut Frame, app: &App, snap: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let title = if snap.is_loading() { "todo-client (loading...)" } else { "todo-client" };
    let help = match &app.screen {
        Screen::List => "Enter: open, n: new, d: delete, f: filter, r: reload, q: quit",
        Screen::Detail(v) if v.editing => "Tab: next field, Space: toggle status, Enter: save, Esc: cancel",
        Screen::Detail(_) => "e: edit, c: cover, Left/Right: prev/next, Esc: back, q: quit",
        Screen::Create(_) => "Tab: switch field, Enter: save, Esc: cancel",
    };
    f.render_widget(Paragraph::new(help).block(Block::default().borders(Borders::ALL).title(title)), chunks[0]);

    match &app.screen {
        Screen::List => draw_list(f, chunks[1], app, snap),
        Screen::Detail(view) => draw_detail(f, chunks[1], view),
        Screen::Create(form) => draw_create(f, chunks[1], form),
    }

    let footer = match &app.cover_prompt {
        Some(path) => format!("Cover image path: {path}_  (Enter to upload, Esc to cancel)"),
        None => format!("{} task(s)  |  Filter=[{}]", snap.todos.len(), app.list.filter.label()),
    };
    f.render_widget(Paragraph::new(footer).block(Block::default().borders(Borders::ALL).title("info")), chunks[2]);

    if let Some(message) = app.notices.front() { draw_notice(f, message); }
}

fn draw_list(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let items: Vec<ListItem> = snap.todos.iter().map(|t| ListItem::new(format!("{} {}", check_mark(t.is_finished), t.title))).collect();
    let mut state = ListState::default();
    if !snap.todos.is_empty() { state.select(Some(app.list.selected)); }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("todos [{}]", app.list.filter.label())))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(f: &mut Frame, area: Rect, view: &DetailView) {
    let block = Block::default().borders(Borders::ALL).title(format!("todo #{}", view.route()));
    // Nothing for an unknown or not-yet-loaded id; no error screen.
    let Some(todo) = view.shown() else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let cover = match &view.cover {
        CoverPreview::Absent => "No cover image".to_string(),
        CoverPreview::Pending(preview) => format!("{} (preview, not saved yet)", preview.file_name),
        CoverPreview::Confirmed(url) => url.clone(),
    };
    let badge_style = if todo.is_finished { Style::default().fg(Color::Black).bg(Color::Green) } else { Style::default().fg(Color::Black).bg(Color::Yellow) };
    let mut lines = vec![
        Line::from(vec![Span::styled("Cover: ", Style::default().fg(Color::Gray)), Span::raw(cover)]),
        Line::from(""),
        Line::from(vec![
            Span::styled(todo.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!(" {} ", badge_label(todo.is_finished)), badge_style),
        ]),
        Line::from(Span::styled(posted_at(todo.created_at, Utc::now()), Style::default().fg(Color::DarkGray))),
        Line::from(format!("[{}]  [{}]", view.upload_label(), view.edit_label())),
        Line::from(""),
    ];
    if view.editing {
        let marker = |field: DraftField| if view.field == field { "> " } else { "  " };
        lines.push(Line::from(format!("{}Title: {}", marker(DraftField::Title), view.draft.title)));
        lines.push(Line::from(format!("{}Description: {}", marker(DraftField::Description), view.draft.description)));
        lines.push(Line::from(format!("{}Status: {}", marker(DraftField::Status), badge_label(view.draft.is_finished))));
    } else {
        lines.push(Line::from(todo.description.clone()));
    }
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_create(f: &mut Frame, area: Rect, form: &CreateForm) {
    let marker = |field: ActiveField| if form.field == field { "> " } else { "  " };
    let lines = vec![
        Line::from(format!("{}Title: {}", marker(ActiveField::Title), form.title)),
        Line::from(format!("{}Description: {}", marker(ActiveField::Description), form.description)),
    ];
    f.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("new todo")), area);
}

fn draw_notice(f: &mut Frame, message: &str) {
    let area = centered(f.size(), 50, 5);
    f.render_widget(Clear, area);
    let notice = Paragraph::new(vec![Line::from(message.to_string()), Line::from(""), Line::from("press any key")])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("error").border_style(Style::default().fg(Color::Red)));
    f.render_widget(notice, area);
}

fn centered(outer: Rect, width_percent: u16, height: u16) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(height), Constraint::Min(0)])
        .split(outer);
    let margin = (100 - width_percent.min(100)) / 2;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(margin), Constraint::Percentage(width_percent), Constraint::Percentage(margin)])
        .split(rows[1])[1]
}
