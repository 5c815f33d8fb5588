//! Dashboard layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
    Row, Table, Tabs,
};

use super::runtime::{App, View};
use super::style;
use crate::analytics::{
    HistoricalStats, LmpComponent, LmpSummary, SpreadSummary, StorageSummary, congested_nodes,
};

/// Renders the full dashboard frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // tabs
            Constraint::Min(10),   // body
            Constraint::Length(1), // status
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    match app.view {
        View::Overview => render_overview(frame, app, chunks[2]),
        View::Lmp => render_lmp(frame, app, chunks[2]),
        View::Congestion => render_congestion(frame, app, chunks[2]),
        View::Storage => render_storage(frame, app, chunks[2]),
        View::Historical => render_historical(frame, app, chunks[2]),
        View::Spread => render_spread(frame, app, chunks[2]),
        View::Settings => render_settings(frame, app, chunks[2]),
    }
    render_status(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let refreshed = app
        .last_refresh
        .map_or_else(|| "never".to_string(), |at| format!("{}s ago", at.elapsed().as_secs()));
    let header = Line::from(vec![
        Span::styled(
            " GRID MARKET ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} │ refreshed {refreshed} ", app.base_url())),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{} {}", i + 1, v.title()));
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(style::TAB_ACTIVE)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn waiting(frame: &mut Frame, area: Rect, what: &str) {
    let msg = Paragraph::new(format!("  No {what} data yet."))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(msg, area);
}

fn split_rows(area: Rect, top: u16) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top), Constraint::Min(5)])
        .split(area)
}

fn split_cols(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area)
}

/// Per-node bars for one LMP component.
fn lmp_bars<'a>(
    records: &'a [crate::assembler::LmpRecord],
    component: LmpComponent,
) -> Vec<Bar<'a>> {
    records
        .iter()
        .map(|r| {
            let value = component.value(r);
            Bar::default()
                .value(style::bar_height(value))
                .text_value(format!("{value:.1}"))
                .label(Line::from(r.node.as_str()))
        })
        .collect()
}

fn bar_chart<'a>(title: &'a str, bars: &'a [Bar<'a>]) -> BarChart<'a> {
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .bar_width(6)
        .bar_gap(1)
        .data(BarGroup::default().bars(bars))
}

fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let rows = split_rows(area, 6);

    let mut lines = Vec::new();
    match app.data.lmp.as_deref().and_then(LmpSummary::from_records) {
        Some(s) => lines.push(Line::from(format!(
            "  Avg LMP ${:.2}/MWh   Max LMP ${:.2}/MWh   Avg Congestion ${:.2}/MWh",
            s.avg_total, s.max_total, s.avg_congestion
        ))),
        None => lines.push(Line::from("  LMP: no data")),
    }
    if let Some(s) = app.data.storage.as_deref().and_then(StorageSummary::from_records) {
        lines.push(Line::from(format!(
            "  Total Storage Discharge {:.2} MW   Net {:.2} MW",
            s.total_discharge_mw, s.net_output_mw
        )));
    }
    if let Some(r) = &app.data.renewable {
        lines.push(Line::from(format!(
            "  Wind {:.0} MW ({:.1}%)   Solar {:.0} MW ({:.1}%)   {:.1}% of load",
            r.wind_mw,
            r.wind_percent_capacity,
            r.solar_mw,
            r.solar_percent_capacity,
            r.renewable_percent_of_load
        )));
    }
    if let Some(h) = &app.data.health {
        lines.push(Line::from(format!("  API {} v{} at {}", h.status, h.api_version, h.timestamp)));
    }
    let metrics = Paragraph::new(lines)
        .block(Block::default().title(" Key Metrics ").borders(Borders::ALL));
    frame.render_widget(metrics, rows[0]);

    let cols = split_cols(rows[1]);
    match app.data.lmp.as_deref() {
        Some(records) => {
            let bars = lmp_bars(records, LmpComponent::Total);
            frame.render_widget(bar_chart(" Total LMP by Node ($/MWh) ", &bars), cols[0]);
        }
        None => waiting(frame, cols[0], "LMP"),
    }
    match app.data.ancillary.as_deref() {
        Some(records) => {
            let rows = records.iter().map(|r| {
                Row::new(vec![
                    r.service.clone(),
                    format!("{:.2}", r.price),
                    format!("{:.0}", r.battery_participation_mw),
                    format!("{:.1}%", r.battery_percent),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Min(16),
                    Constraint::Length(8),
                    Constraint::Length(8),
                    Constraint::Length(7),
                ],
            )
            .header(header_row(["Service", "$/MW", "Bat MW", "Bat %"]))
            .block(Block::default().title(" Ancillary Services ").borders(Borders::ALL));
            frame.render_widget(table, cols[1]);
        }
        None => waiting(frame, cols[1], "ancillary"),
    }
}

fn header_row<const N: usize>(labels: [&'static str; N]) -> Row<'static> {
    Row::new(labels).style(Style::default().add_modifier(Modifier::BOLD))
}

fn render_lmp(frame: &mut Frame, app: &App, area: Rect) {
    let Some(records) = app.data.lmp.as_deref() else {
        return waiting(frame, area, "LMP");
    };
    let rows = split_rows(area, 3);
    if let Some(s) = LmpSummary::from_records(records) {
        let stats = Paragraph::new(format!(
            "  Avg Energy ${:.2}   Avg Congestion ${:.2}   Avg Loss ${:.2}",
            s.avg_energy, s.avg_congestion, s.avg_loss
        ))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(stats, rows[0]);
    }

    let cols = split_cols(rows[1]);
    let title = format!(" {} by Node (c to change) ", app.component.label());
    let bars = lmp_bars(records, app.component);
    frame.render_widget(bar_chart(&title, &bars), cols[0]);

    let table_rows = records.iter().map(|r| {
        Row::new(vec![
            r.node.clone(),
            r.node_type.clone(),
            format!("{:.2}", r.energy),
            format!("{:.2}", r.congestion),
            format!("{:.2}", r.loss),
            format!("{:.2}", r.total_lmp),
        ])
    });
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(8),
        ],
    )
    .header(header_row(["Node", "Type", "Energy", "Cong", "Loss", "Total"]))
    .block(Block::default().title(" LMP Components ").borders(Borders::ALL));
    frame.render_widget(table, cols[1]);
}

fn render_congestion(frame: &mut Frame, app: &App, area: Rect) {
    let rows = split_rows(area, 3);
    let cols = split_cols(rows[1]);

    match app.data.lmp.as_deref() {
        Some(records) => {
            let hot = congested_nodes(records, app.threshold);
            let (text, color) = if hot.is_empty() {
                ("All nodes below congestion threshold".to_string(), style::OK_FG)
            } else {
                let names: Vec<_> = hot.iter().map(|r| r.node.as_str()).collect();
                (
                    format!("{} node(s) exceeding threshold: {}", hot.len(), names.join(", ")),
                    style::ALERT_FG,
                )
            };
            let alert = Paragraph::new(Line::from(vec![
                Span::raw(format!("  Threshold ${:.0}/MWh (+/-)  ", app.threshold)),
                Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(alert, rows[0]);

            let mut sorted: Vec<_> = records.to_vec();
            sorted.sort_by(|a, b| b.congestion.total_cmp(&a.congestion));
            let bars = lmp_bars(&sorted, LmpComponent::Congestion);
            frame.render_widget(bar_chart(" Congestion by Node ($/MWh) ", &bars), cols[0]);
        }
        None => waiting(frame, rows[0], "LMP"),
    }

    match app.data.congestion.as_deref() {
        Some(events) => {
            let table_rows = events.iter().map(|e| {
                let severity = format!("{:?}", e.severity);
                Row::new(vec![
                    Cell::from(e.constraint_id.clone()),
                    Cell::from(e.name.clone()),
                    Cell::from(severity.clone())
                        .style(Style::default().fg(style::severity_color(&severity))),
                    Cell::from(format!("{:.1}%", e.flow_percent)),
                    Cell::from(format!("{}h", e.duration_hours)),
                ])
            });
            let table = Table::new(
                table_rows,
                [
                    Constraint::Length(7),
                    Constraint::Min(16),
                    Constraint::Length(7),
                    Constraint::Length(7),
                    Constraint::Length(4),
                ],
            )
            .header(header_row(["ID", "Element", "Sev", "Flow", "Dur"]))
            .block(Block::default().title(" Active Congestion Events ").borders(Borders::ALL));
            frame.render_widget(table, cols[1]);
        }
        None => waiting(frame, cols[1], "congestion"),
    }
}

fn render_storage(frame: &mut Frame, app: &App, area: Rect) {
    let Some(records) = app.data.storage.as_deref() else {
        return waiting(frame, area, "storage");
    };
    let rows = split_rows(area, 3);
    if let Some(s) = StorageSummary::from_records(records) {
        let summary = Paragraph::new(format!(
            "  Charge {:.2} MW   Discharge {:.2} MW   Net {:.2} MW   Avg Net/Site {:.2} MW",
            s.total_charge_mw, s.total_discharge_mw, s.net_output_mw, s.avg_net_per_site_mw
        ))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(summary, rows[0]);
    }
    let table_rows = records.iter().map(|r| {
        Row::new(vec![
            r.node.clone(),
            r.node_name.clone(),
            format!("{:.0}", r.capacity_mwh),
            format!("{:.2}", r.charge_mw),
            format!("{:.2}", r.discharge_mw),
            format!("{:.2}", r.net_output_mw),
            format!("{:.1}%", r.soc_percent),
            format!("{:.2}", r.power_loss_mw),
        ])
    });
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(header_row(["Node", "Site", "MWh", "Charge", "Dischrg", "Net", "SOC", "Loss"]))
    .block(Block::default().title(" Storage Dispatch ").borders(Borders::ALL));
    frame.render_widget(table, rows[1]);
}

/// Line chart over hourly points indexed 0..n, labelled with first/last time.
fn time_chart<'a>(
    title: &'a str,
    unit: &'a str,
    datasets: Vec<Dataset<'a>>,
    series: &[&[(f64, f64)]],
    first: String,
    last: String,
) -> Chart<'a> {
    let y = style::auto_bounds_y(series);
    let x_hi = series
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1) as f64;
    Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(Axis::default().bounds([0.0, x_hi]).labels(vec![first, last]))
        .y_axis(
            Axis::default()
                .title(unit)
                .bounds(y)
                .labels(vec![format!("{:.0}", y[0]), format!("{:.0}", y[1])]),
        )
}

fn line<'a>(name: &'a str, data: &'a [(f64, f64)], color: ratatui::style::Color) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn render_historical(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    match app.data.historical.as_deref() {
        Some(records) if !records.is_empty() => {
            let top = split_cols(halves[0]);
            let lmp: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.lmp)).collect();
            let energy: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.energy)).collect();
            let first = records[0].timestamp.format("%H:%M").to_string();
            let last = records[records.len() - 1].timestamp.format("%H:%M").to_string();
            let chart = time_chart(
                " 24h LMP History ",
                "$/MWh",
                vec![line("LMP", &lmp, style::PRIMARY), line("Energy", &energy, style::SECONDARY)],
                &[&lmp, &energy],
                first,
                last,
            );
            frame.render_widget(chart, top[0]);

            let stats = HistoricalStats::from_records(records).map_or_else(
                || vec![Line::from("  no data")],
                |s| {
                    vec![
                        Line::from(format!("  Min LMP  ${:.2}", s.min)),
                        Line::from(format!("  Max LMP  ${:.2}", s.max)),
                        Line::from(format!("  Avg LMP  ${:.2}", s.mean)),
                        Line::from(match s.std_dev {
                            Some(sd) => format!("  Std Dev  ${sd:.2}"),
                            None => "  Std Dev  n/a".to_string(),
                        }),
                    ]
                },
            );
            let title = format!(" Node {} ", records[0].node);
            let panel =
                Paragraph::new(stats).block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(panel, top[1]);
        }
        _ => waiting(frame, halves[0], "historical"),
    }

    match app.data.forecast.as_deref() {
        Some(records) if !records.is_empty() => {
            let point: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.forecast_load_mw)).collect();
            let lower: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.lower_bound_mw)).collect();
            let upper: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.upper_bound_mw)).collect();
            let prev: Vec<(f64, f64)> =
                records.iter().enumerate().map(|(i, r)| (i as f64, r.prev_day_actual_mw)).collect();
            let first = records[0].timestamp.format("%H:%M").to_string();
            let last = records[records.len() - 1].timestamp.format("%H:%M").to_string();
            let chart = time_chart(
                " 24h Demand Forecast ",
                "MW",
                vec![
                    line("Forecast", &point, style::PRIMARY),
                    line("Lower", &lower, style::MUTED),
                    line("Upper", &upper, style::MUTED),
                    line("Prev day", &prev, style::SECONDARY),
                ],
                &[&point, &lower, &upper, &prev],
                first,
                last,
            );
            frame.render_widget(chart, halves[1]);
        }
        _ => waiting(frame, halves[1], "forecast"),
    }
}

fn render_spread(frame: &mut Frame, app: &App, area: Rect) {
    let Some(records) = app.data.spread.as_deref() else {
        return waiting(frame, area, "spread");
    };
    let rows = split_rows(area, 3);
    if let Some(s) = SpreadSummary::from_records(records) {
        let summary = Paragraph::new(format!(
            "  DA > RT {} h   RT > DA {} h   Avg Spread ${:.2}",
            s.da_over_rt_hours, s.rt_over_da_hours, s.avg_spread
        ))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(summary, rows[0]);
    }
    let bars: Vec<Bar> = records
        .iter()
        .map(|r| {
            Bar::default()
                .value(style::bar_height(r.da_rt_spread))
                .text_value(format!("{:+.0}", r.da_rt_spread))
                .label(Line::from(r.timestamp.format("%H").to_string()))
                .style(Style::default().fg(style::spread_color(r.da_rt_spread)))
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" DA-RT Spread by Hour (blue: DA premium, red: RT premium) ")
                .borders(Borders::ALL),
        )
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, rows[1]);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let api = match &app.data.health {
        Some(h) => format!("{} (v{})", h.status, h.api_version),
        None => "unknown".to_string(),
    };
    let lines = vec![
        Line::from(format!("  API base URL       {}", app.base_url())),
        Line::from(format!("  API status         {api}")),
        Line::from(format!("  Refresh interval   {}s", app.refresh_every.as_secs())),
        Line::from(format!("  Cache TTL          {}s", app.cache_ttl.as_secs())),
        Line::from(format!("  Congestion alert   ${:.0}/MWh", app.threshold)),
        Line::from(format!("  LMP component      {}", app.component.label())),
    ];
    let panel =
        Paragraph::new(lines).block(Block::default().title(" Settings ").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(err) => Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(style::ERROR_FG),
        )),
        None => Line::from(Span::styled(" OK", Style::default().fg(style::OK_FG))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  Tab/1-7:View  r:Refresh  +/-:Threshold  c:Component",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
