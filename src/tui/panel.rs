use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, Paragraph, Row, Table,
        Widget, Wrap,
    },
};

use crate::agents::{AgingItem, EducationPoint, RiskLevel, VitalSign, VitalStatus};
use crate::visualization::{format_amount, RecordRows, Visualization, AGING_LEGEND};

const AMBER: Color = Color::Rgb(245, 158, 11);

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => AMBER,
        RiskLevel::High => Color::Red,
    }
}

fn status_color(status: VitalStatus) -> Color {
    match status {
        VitalStatus::Normal => Color::Green,
        VitalStatus::Warning => AMBER,
        VitalStatus::Critical => Color::Red,
    }
}

/// The "Operational Excellence" panel: one template per specialist
pub struct VisualizationPanel<'a> {
    pub visualization: Option<&'a Visualization>,
    /// A specialist is picked and its answer is on the way
    pub coordinating: bool,
    /// An answer has arrived, with or without a template
    pub answered: bool,
}

impl Widget for VisualizationPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                " OPERATIONAL EXCELLENCE ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::LEFT | Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.coordinating {
            render_placeholder(
                inner,
                buf,
                &[("◌ Coordinating Agents...", Style::default().fg(Color::Gray).add_modifier(Modifier::SLOW_BLINK))],
            );
            return;
        }

        let Some(view) = self.visualization else {
            // Coordinator answers carry no template and leave the panel blank
            if self.answered {
                return;
            }
            render_placeholder(
                inner,
                buf,
                &[
                    ("System Ready. Waiting for input.", Style::default().fg(Color::Gray)),
                    (
                        "Try asking about patient vitals, billing reports, or post-op care.",
                        Style::default().fg(Color::DarkGray),
                    ),
                ],
            );
            return;
        };

        let footnote_height = match view {
            Visualization::BillingAging(_) => AGING_LEGEND.len() as u16,
            _ if view.footnote().is_some() => 3,
            _ => 0,
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(footnote_height),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            view.title(),
            Style::default()
                .fg(view.category().color())
                .add_modifier(Modifier::BOLD),
        )))
        .render(chunks[0], buf);

        match view {
            Visualization::RecordsExtraction(records) => render_records(records, chunks[1], buf),
            Visualization::BillingAging(rows) => render_aging(rows, chunks[1], buf),
            Visualization::ClinicalVitals(rows) => render_vitals(rows, chunks[1], buf),
            Visualization::Education(points) => render_education(points, chunks[1], buf),
        }

        if let Visualization::BillingAging(_) = view {
            render_legend(chunks[2], buf);
        } else if let Some((heading, note)) = view.footnote() {
            let mut lines = Vec::new();
            if !heading.is_empty() {
                lines.push(Line::from(Span::styled(
                    heading,
                    Style::default()
                        .fg(view.category().color())
                        .add_modifier(Modifier::BOLD),
                )));
            }
            lines.push(Line::from(Span::styled(
                note,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);
        }
    }
}

fn render_placeholder(area: Rect, buf: &mut Buffer, messages: &[(&str, Style)]) {
    let top = area.height.saturating_sub(messages.len() as u16) / 2;
    let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
    lines.extend(
        messages
            .iter()
            .map(|(text, style)| Line::from(Span::styled(*text, *style)).centered()),
    );
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_records(records: &RecordRows, area: Rect, buf: &mut Buffer) {
    let rows = records.rows().map(|(label, value)| {
        Row::new(vec![
            Cell::from(label).style(Style::default().fg(Color::DarkGray)),
            Cell::from(value.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        ])
    });

    Widget::render(
        Table::new(rows, [Constraint::Length(12), Constraint::Min(10)]).column_spacing(1),
        area,
        buf,
    );
}

fn render_aging(rows: &[AgingItem], area: Rect, buf: &mut Buffer) {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            let color = risk_color(row.risk_level);
            Bar::default()
                .value(row.amount.max(0.0).round() as u64)
                .text_value(format_amount(row.amount))
                .label(Line::from(row.period.clone()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let gap = 1;
    let count = bars.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(gap * count) / count).clamp(3, 12);

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .render(area, buf);
}

fn render_legend(area: Rect, buf: &mut Buffer) {
    let colors = [Color::Green, AMBER, Color::Red];
    let lines: Vec<Line> = AGING_LEGEND
        .iter()
        .zip(colors)
        .map(|((risk, span), color)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(format!("{}: {}", risk, span)),
            ])
        })
        .collect();
    Paragraph::new(lines).render(area, buf);
}

fn render_vitals(rows: &[VitalSign], area: Rect, buf: &mut Buffer) {
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let color = status_color(row.status);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(row.metric.clone(), Style::default().fg(Color::Gray)),
                    Span::raw("  "),
                    Span::styled(
                        format!(" {} ", row.status.as_str().to_uppercase()),
                        Style::default()
                            .fg(Color::Black)
                            .bg(color)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    row.value.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
        })
        .collect();

    Widget::render(List::new(items), area, buf);
}

fn render_education(points: &[EducationPoint], area: Rect, buf: &mut Buffer) {
    let mut lines = Vec::new();
    for (i, point) in points.iter().enumerate() {
        let marker = point
            .icon
            .as_deref()
            .map(|icon| format!("{} ", icon))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", i + 1),
                Style::default()
                    .fg(Color::Black)
                    .bg(AMBER)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!("{}{}", marker, point.topic),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", point.explanation),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}
