use {
    crate::consumer_core::{Alert, CategoryCount, Snapshot},
    crate::state::DashboardState,
    ratatui::{
        layout::{Constraint, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{BarChart, Block, Borders, Paragraph, Sparkline},
        Frame,
    },
};

/// Render the full dashboard layout.
pub fn render(f: &mut Frame, state: &DashboardState) {
    let area = f.size();
    let chunks = RatLayout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Chart body
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);

    match state.snapshot() {
        Some(Snapshot::TopK { entries, .. }) => render_top_k(f, chunks[1], entries),
        Some(Snapshot::Rolling {
            values,
            latest,
            mean,
            std_dev,
        }) => render_rolling(f, chunks[1], values, *latest, *mean, *std_dev, state.alert()),
        None => render_waiting(f, chunks[1]),
    }

    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled(
                "buzzflow",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - Live Stream Monitor"),
        ]),
        Line::from("Press 'q' or Esc to quit"),
    ];

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_waiting(f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Waiting");
    f.render_widget(
        Paragraph::new("No records yet - waiting for the producer...").block(block),
        area,
    );
}

fn render_top_k(f: &mut Frame, area: Rect, entries: &[CategoryCount]) {
    let bars: Vec<(&str, u64)> = entries
        .iter()
        .map(|e| (e.label.as_str(), e.count))
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Category Counts"))
        .data(&bars)
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    f.render_widget(chart, area);
}

fn render_rolling(
    f: &mut Frame,
    area: Rect,
    values: &[f64],
    latest: f64,
    mean: f64,
    std_dev: f64,
    alert: &Alert,
) {
    let chunks = RatLayout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    // Sparkline wants u64 heights; rebase on the window minimum.
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let heights: Vec<u64> = values
        .iter()
        .map(|v| (((v - min) * 10.0).max(0.0) as u64) + 1)
        .collect();

    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("Recent Values"))
        .data(&heights)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(sparkline, chunks[0]);

    let mut lines = vec![Line::from(format!(
        "latest {:.2}   mean {:.2}   std {:.2}   window {}",
        latest,
        mean,
        std_dev,
        values.len()
    ))];

    if alert.triggered {
        let threshold = alert.threshold.unwrap_or(0.0);
        lines.push(Line::from(Span::styled(
            format!(
                "ALERT {}: value {:.2} beyond threshold {:.2}",
                alert.reason.as_deref().unwrap_or("unnamed"),
                alert.value.unwrap_or(latest),
                threshold
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Rolling Stats")),
        chunks[1],
    );
}

fn render_footer(f: &mut Frame, area: Rect, state: &DashboardState) {
    let status = format!(
        "records: {} | alerts: {} | last update: {}",
        state.records_seen(),
        state.alerts_seen(),
        state
            .last_update()
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| "never".to_string())
    );

    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status")),
        area,
    );
}
