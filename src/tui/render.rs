use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::agents::AgentCategory;
use crate::constants::DISCLAIMER;
use crate::input::SAMPLE_PROMPTS;
use crate::session::TurnRole;
use crate::tui::app::{App, AppState};
use crate::tui::panel::VisualizationPanel;

const SIDEBAR_WIDTH: u16 = 30;
const ACCENT: Color = Color::Rgb(99, 102, 241);

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App, state: AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let mut columns = Vec::new();
    if app.show_sidebar {
        columns.push(Constraint::Length(SIDEBAR_WIDTH));
    }
    columns.push(Constraint::Min(30));
    if app.show_panel {
        columns.push(Constraint::Percentage(35));
    }
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(rows[0]);

    let mut next = 0;
    if app.show_sidebar {
        render_sidebar(frame, content[next], app);
        next += 1;
    }
    render_main(frame, content[next], app, state);
    if app.show_panel {
        render_panel(frame, content[next + 1], app);
    }

    render_status_bar(frame, rows[1], app, state);
}

/// Header, transcript and input, stacked
fn render_main(frame: &mut Frame, area: Rect, app: &App, state: AppState) {
    let input_height = input_height(app);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // Header
            Constraint::Min(5),               // Chat
            Constraint::Length(input_height), // Input
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_chat(frame, chunks[1], app);
    render_input(frame, chunks[2], app, state);

    if app.show_help {
        render_help(frame, chunks[1]);
    }
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.active_agent();
    let (dot, title) = if active.is_specialist() {
        (
            Span::styled("● ", Style::default().fg(ACCENT).add_modifier(Modifier::SLOW_BLINK)),
            format!("Orchestrating: {}", active),
        )
    } else {
        (
            Span::styled("● ", Style::default().fg(Color::DarkGray)),
            "Coordinator Standing By".to_string(),
        )
    };

    let header = Paragraph::new(Line::from(vec![
        dot,
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  ({})", app.model_name), Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}

/// Render the sidebar with one card per specialist
fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(
            "🩺 MediCore AI",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Hospital Orchestration System",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "ACTIVE AGENTS",
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let active = app.active_agent();
    for category in AgentCategory::SPECIALISTS {
        let is_active = category == active;
        let name_style = if is_active {
            Style::default()
                .fg(category.color())
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(category.color())
        };
        let description_style = if is_active {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        lines.push(Line::from(vec![
            Span::raw(format!("{} ", category.icon())),
            Span::styled(format!(" {} AGENT ", category), name_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", category.description()),
            description_style,
        )));
        if is_active {
            lines.push(Line::from(Span::styled(
                "   ● PROCESSING",
                Style::default()
                    .fg(category.color())
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(""));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block.clone()), chunks[0]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("System Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            "Online",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(block);
    frame.render_widget(footer, chunks[1]);
}

/// Render the chat area
fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let transcript = app.session.transcript();

    if transcript.is_empty() && !app.session.is_processing() {
        let banner = vec![
            Line::from(""),
            Line::from(Span::styled("🩺", Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                "MediCore Hospital Intelligence",
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Ready for Clinical, Admin, RME & Education tasks",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let top = area.height.saturating_sub(banner.len() as u16) / 2;
        let centered = Rect {
            y: area.y + top,
            height: area.height.saturating_sub(top),
            ..area
        };
        frame.render_widget(Paragraph::new(banner).alignment(Alignment::Center), centered);
        return;
    }

    let mut lines = Vec::new();
    for turn in transcript.iter() {
        match turn.role() {
            TurnRole::User => {
                lines.push(
                    Line::from(vec![
                        Span::styled(
                            turn.timestamp().format("%H:%M ").to_string(),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled("You", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                    ])
                    .alignment(Alignment::Right),
                );
                for line in turn.content().lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            TurnRole::Assistant if turn.is_error() => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "✗ Request failed",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" • {}", turn.error_kind().unwrap_or("error")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
                for line in turn.content().lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::LightRed),
                    )));
                }
            }
            TurnRole::Assistant => {
                let mut header = vec![Span::styled(
                    turn.timestamp().format("%H:%M ").to_string(),
                    Style::default().fg(Color::DarkGray),
                )];
                if let Some(response) = turn.response() {
                    header.push(Span::styled(
                        format!("{} Agent", response.category),
                        Style::default()
                            .fg(response.category.color())
                            .add_modifier(Modifier::BOLD),
                    ));
                    if !response.reasoning.is_empty() {
                        header.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
                        header.push(Span::styled(
                            response.reasoning.clone(),
                            Style::default()
                                .fg(Color::DarkGray)
                                .add_modifier(Modifier::ITALIC),
                        ));
                    }
                }
                lines.push(Line::from(header));
                for line in turn.content().lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
        }
        lines.push(Line::from("")); // Empty line between messages
    }

    if app.session.is_processing() {
        lines.push(typing_indicator(app));
    }

    // Keep the newest lines in view; scroll_offset counts back from there
    let inner_width = area.width.max(1) as usize;
    let rendered: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let bottom = (rendered as u16).saturating_sub(area.height);
    let scroll = bottom.saturating_sub(app.scroll_offset);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Three bouncing dots and what the coordinator is doing
fn typing_indicator(app: &App) -> Line<'static> {
    let frame = (app.tick / 6 % 3) as usize;
    let dots: String = (0..3).map(|i| if i == frame { '●' } else { '·' }).collect();
    let active = app.active_agent();
    let label = if active.is_specialist() {
        format!("Processing with {}...", active)
    } else {
        "Analyzing & Routing...".to_string()
    };

    Line::from(vec![
        Span::styled(format!("{} ", dots), Style::default().fg(ACCENT)),
        Span::styled(
            label,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

fn input_height(app: &App) -> u16 {
    let text_lines = app.session.input.split('\n').count().clamp(1, 6) as u16;
    let attachment = u16::from(app.session.attachment().is_some());
    let samples = u16::from(app.session.transcript().is_empty());
    text_lines + attachment + 2 + samples + 1
}

/// Render the input area
fn render_input(frame: &mut Frame, area: Rect, app: &App, state: AppState) {
    let show_samples = app.session.transcript().is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(show_samples)),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    if show_samples {
        let mut spans = vec![Span::styled("Try: ", Style::default().fg(Color::DarkGray))];
        for (i, sample) in SAMPLE_PROMPTS.iter().enumerate() {
            spans.push(Span::styled(
                format!("[F{}] {}", i + 1, sample.label),
                Style::default().fg(sample.category.color()),
            ));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
    }

    let mut lines = Vec::new();
    if let Some(attachment) = app.session.attachment() {
        lines.push(Line::from(vec![
            Span::styled("🖼  ", Style::default().fg(ACCENT)),
            Span::styled(
                format!("DICOM/Image Attached: {}", attachment.file_name()),
                Style::default().fg(ACCENT),
            ),
            Span::styled("  (:detach to remove)", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let (text, title, border) = match state {
        AppState::Command => (
            format!(":{}", app.command_input),
            " Enter Command ",
            Color::Yellow,
        ),
        _ if app.session.input.is_empty() => (String::new(), " Describe the clinical task or ask about administration ", Color::DarkGray),
        AppState::Insert => (app.session.input.clone(), " Message (Enter to send • Shift+Enter for newline) ", ACCENT),
        AppState::Normal => (app.session.input.clone(), " Message (i to type • : for commands) ", Color::DarkGray),
    };
    let text_lines: Vec<&str> = text.split('\n').collect();
    let first_text_line = lines.len();
    lines.extend(text_lines.iter().map(|l| Line::from(l.to_string())));

    let input = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
    frame.render_widget(input, chunks[1]);

    if state != AppState::Normal {
        let input_area = chunks[1];
        let last = text_lines.last().map(|l| l.chars().count()).unwrap_or(0);
        let row = first_text_line + text_lines.len() - 1;
        let cursor_x = clamp_offset(input_area.x, last, input_area.width);
        let cursor_y = clamp_offset(input_area.y, row, input_area.height);
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    let disclaimer = Paragraph::new(Span::styled(DISCLAIMER, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center);
    frame.render_widget(disclaimer, chunks[2]);
}

/// Position `offset` cells into a bordered box starting at `start`, kept inside the border
fn clamp_offset(start: u16, offset: usize, extent: u16) -> u16 {
    let room = extent.saturating_sub(2);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX).min(room);
    start.saturating_add(1).saturating_add(offset).min(start.saturating_add(room))
}

/// Right-hand visualization panel
fn render_panel(frame: &mut Frame, area: Rect, app: &App) {
    let visualization = app.visualization();
    let panel = VisualizationPanel {
        visualization: visualization.as_ref(),
        coordinating: app.is_coordinating(),
        answered: app.session.last_response().is_some(),
    };
    frame.render_widget(panel, area);
}

/// Key and command reference drawn over the chat
fn render_help(frame: &mut Frame, area: Rect) {
    let entries = [
        ("Enter", "Send message"),
        ("Shift/Alt+Enter", "New line"),
        ("F1-F4", "Insert a sample prompt (before the first message)"),
        ("Esc / i", "Normal mode / insert mode"),
        ("Tab", "Toggle agent sidebar"),
        ("v", "Toggle visualization panel (normal mode)"),
        ("PgUp/PgDn", "Scroll transcript"),
        (":attach <path>", "Attach a medical image"),
        (":detach", "Remove the attached image"),
        (":sample <cat>", "rme, admin, clinical or edu"),
        (":quit / Ctrl+C", "Quit"),
    ];

    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<18}", key),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        y: area.y + area.height.saturating_sub(height),
        height,
        ..area
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (Esc to close) "),
        ),
        popup,
    );
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, state: AppState) {
    let (mode_str, mode_color) = match state {
        AppState::Normal => ("NORMAL", Color::Blue),
        AppState::Insert => ("INSERT", Color::Green),
        AppState::Command => ("COMMAND", Color::Yellow),
    };

    let status_text = if let Some(status) = &app.status_message {
        status.clone()
    } else if app.session.is_processing() {
        "Waiting for the coordinator...".to_string()
    } else {
        "Ready".to_string()
    };

    let spans = vec![
        Span::styled(
            format!(" {} ", mode_str),
            Style::default()
                .bg(mode_color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(status_text),
        Span::raw(" | "),
        Span::styled(
            format!("{} messages", app.session.transcript().len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" | "),
        Span::styled(":help", Style::default().fg(Color::DarkGray)),
        Span::raw(" | "),
        Span::styled("Ctrl+C: quit", Style::default().fg(Color::DarkGray)),
    ];

    let status_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black))
        .block(Block::default());

    frame.render_widget(status_bar, area);
}
