use super::*;

impl TuiApp {
    pub(in crate::tui) fn draw(&self, frame: &mut Frame) {
        let area = frame.size();
        let dimmed =
            self.board.overlay().is_visible() || matches!(self.view, View::Confirm(_));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(DIAGNOSTICS_HEIGHT),
                Constraint::Length(1),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);

        self.draw_integrations(frame, columns[0], dimmed);
        self.draw_logs(frame, columns[1], dimmed);
        self.draw_diagnostics(frame, rows[1], dimmed);
        self.draw_footer(frame, rows[2]);

        match self.view {
            View::Board => {}
            View::Form(kind) => self.draw_form(frame, kind, area),
            View::Confirm(kind) => draw_confirm(frame, kind, area),
        }
    }

    fn draw_integrations(&self, frame: &mut Frame, area: Rect, dimmed: bool) {
        let items: Vec<ListItem> = self
            .board
            .controllers()
            .iter()
            .enumerate()
            .map(|(index, controller)| {
                integration_item(controller, index == self.selected, dimmed)
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Integrations")
                .style(base_style(dimmed)),
        );
        frame.render_widget(list, area);
    }

    fn draw_logs(&self, frame: &mut Frame, area: Rect, dimmed: bool) {
        let entries = self.logs.entries();
        let height = usize::from(area.height.saturating_sub(2));
        let lines: Vec<Line> = entries[tail_start(entries.len(), height)..]
            .iter()
            .map(|entry| {
                let marker = if entry.is_new { "+ " } else { "  " };
                let style = if dimmed {
                    base_style(true)
                } else {
                    log_style(entry)
                };
                Line::styled(format!("{marker}{}", entry.content), style)
            })
            .collect();
        let title = format!("Assistant log ({})", entries.len());
        let logs = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(base_style(dimmed)),
        );
        frame.render_widget(logs, area);
    }

    fn draw_diagnostics(&self, frame: &mut Frame, area: Rect, dimmed: bool) {
        let height = usize::from(area.height.saturating_sub(2));
        let lines: Vec<Line> = self
            .diagnostics
            .recent(height)
            .iter()
            .map(|entry| {
                let style = if dimmed {
                    base_style(true)
                } else if entry.level == Level::ERROR {
                    Style::default().fg(Color::Red)
                } else if entry.level == Level::WARN {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::styled(entry.format_compact(), style)
            })
            .collect();
        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Diagnostics")
                .style(base_style(dimmed)),
        );
        frame.render_widget(panel, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.view {
            View::Board => "↑/↓ select  enter connect/edit  d disconnect  q quit",
            View::Form(_) => "tab next field  enter submit  esc cancel",
            View::Confirm(_) => "y confirm  n cancel",
        };
        let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
        if let Some(status) = &self.status {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                status.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_form(&self, frame: &mut Frame, kind: IntegrationKind, area: Rect) {
        let Some(controller) = self.board.get(kind) else {
            return;
        };
        let definition = controller.definition();
        let mode = match controller.phase() {
            Phase::FormOpen(mode) | Phase::Submitting(mode) => mode,
            _ => FormMode::Connect,
        };
        let title = match mode {
            FormMode::Connect => format!("Connect {kind}"),
            FormMode::Edit => format!("Edit {kind}"),
        };

        let mut lines: Vec<Line> = definition
            .usage_lines
            .iter()
            .map(|usage| Line::from(*usage))
            .collect();
        lines.extend(definition.reference_links.iter().map(|link| {
            Line::styled(
                *link,
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )
        }));
        lines.extend(
            definition
                .notes
                .iter()
                .map(|note| Line::styled(*note, Style::default().fg(Color::Red))),
        );
        lines.push(Line::from(""));

        for (index, field) in definition.required_fields.iter().enumerate() {
            let active = index == self.input_index;
            let value = masked(field, controller.form_value(field));
            let mut spans = vec![
                Span::raw(if active { "> " } else { "  " }),
                Span::styled(format!("{field}: "), Style::default().fg(Color::Cyan)),
            ];
            if active {
                spans.push(Span::styled(
                    value,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled("_", Style::default().fg(Color::DarkGray)));
            } else {
                spans.push(Span::raw(value));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));

        if controller.phase().is_in_flight() {
            lines.push(Line::styled(
                format!("{}...", controller.phase()),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !controller.error_message().is_empty() {
            lines.push(Line::styled(
                controller.error_message().to_string(),
                Style::default().fg(Color::Red),
            ));
        }

        let popup = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup);
        let form = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(form, popup);
    }
}

fn integration_item(
    controller: &IntegrationController,
    selected: bool,
    dimmed: bool,
) -> ListItem<'static> {
    let connected = controller.is_connected();
    let marker = if connected { "●" } else { "○" };
    let mut name_style = base_style(dimmed);
    if selected {
        name_style = name_style.add_modifier(Modifier::REVERSED);
    }
    let status_style = if dimmed {
        base_style(true)
    } else if connected {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{marker} {:<16}", controller.kind().as_name()),
            name_style,
        ),
        Span::styled(controller.phase().to_string(), status_style),
    ])];
    if selected {
        lines.extend(controller.definition().usage_lines.iter().map(|usage| {
            Line::styled(format!("  {usage}"), Style::default().fg(Color::DarkGray))
        }));
    }
    if !controller.error_message().is_empty() {
        lines.push(Line::styled(
            format!("  {}", controller.error_message()),
            Style::default().fg(Color::Red),
        ));
    }
    ListItem::new(lines)
}

fn draw_confirm(frame: &mut Frame, kind: IntegrationKind, area: Rect) {
    let popup = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);
    let lines = vec![
        Line::from(disconnect_prompt(kind)),
        Line::from(""),
        Line::styled("[y] yes   [n] no", Style::default().fg(Color::DarkGray)),
    ];
    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Disconnect"));
    frame.render_widget(modal, popup);
}

pub(in crate::tui) fn base_style(dimmed: bool) -> Style {
    if dimmed {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

pub(in crate::tui) fn log_style(entry: &LogEntry) -> Style {
    let style = match entry.kind.as_str() {
        "error" => Style::default().fg(Color::Red),
        "warn" | "warning" => Style::default().fg(Color::Yellow),
        "heard" => Style::default().fg(Color::Cyan),
        "response" => Style::default().fg(Color::Green),
        _ => Style::default(),
    };
    if entry.is_new {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Secrets are shown as one bullet per character.
pub(in crate::tui) fn masked(field: &str, value: &str) -> String {
    if field.contains("secret") {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

pub(in crate::tui) fn tail_start(len: usize, height: usize) -> usize {
    len.saturating_sub(height)
}

pub(in crate::tui) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
