use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Sparkline, Wrap},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ledger::Ledger;
use crate::stats::Granularity;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{trend_label, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary cards
            Constraint::Min(10),   // Category chart + breakdown
            Constraint::Length(5), // Timeline sparkline
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app, ledger);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_category_chart(f, middle[0], app);
    render_breakdown(f, middle[1], app, ledger);

    render_timeline(f, chunks[2], app);
}

fn block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::title_style()))
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let Some(summary) = &app.summary else {
        return;
    };

    render_card(
        f,
        cards[0],
        format!(" Spent ({}) ", app.period),
        ledger.format(summary.current_total),
        theme::RED,
        format!(
            "{} expense{}",
            summary.count,
            if summary.count == 1 { "" } else { "s" }
        ),
    );
    render_card(
        f,
        cards[1],
        " Previous ".into(),
        ledger.format(summary.previous_total),
        theme::TEXT,
        format!("before {}", summary.start),
    );
    // More spending is bad news
    let trend_color = if summary.trend > Decimal::ZERO {
        theme::RED
    } else {
        theme::GREEN
    };
    render_card(
        f,
        cards[2],
        " Trend ".into(),
        trend_label(summary.trend),
        trend_color,
        "vs previous period".into(),
    );
    render_card(
        f,
        cards[3],
        " Balance ".into(),
        ledger.format(app.total_balance),
        if app.total_balance >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        },
        if app.unconverted > 0 {
            format!("{} account(s) unconverted", app.unconverted)
        } else {
            "all active accounts".into()
        },
    );
}

fn render_card(f: &mut Frame, area: Rect, title: String, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block(title));

    f.render_widget(text, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let title = " Spending by Category ".to_string();
    if app.categories.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            format!("No expenses in the last {}. Add one with :add", app.period),
            theme::dim_style(),
        )))
        .centered()
        .block(block(title));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .categories
        .iter()
        .take(12)
        .map(|view| {
            let val = view.slice.amount.round().to_u64().unwrap_or(0);
            Bar::default()
                .value(val)
                .label(Line::from(truncate(&view.slice.category, 10)))
                .style(Style::default().fg(theme::hex_color(&view.color)))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::hex_color(&view.color))
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let mut lines: Vec<Line> = app
        .categories
        .iter()
        .map(|view| {
            Line::from(vec![
                Span::raw(format!(" {} ", view.icon)),
                Span::styled(
                    format!("{:<16}", truncate(&view.slice.category, 16)),
                    Style::default().fg(theme::hex_color(&view.color)),
                ),
                Span::styled(format!("{:>6.1}% ", view.slice.percent), theme::dim_style()),
                Span::styled(ledger.format(view.slice.amount), theme::normal_style()),
            ])
        })
        .collect();

    if !app.announcements.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Announcements",
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        )));
        for a in &app.announcements {
            lines.push(Line::from(vec![
                Span::styled(format!(" • {}: ", a.title), theme::normal_style()),
                Span::styled(a.body.clone(), theme::dim_style()),
            ]));
        }
    }

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block(" Breakdown ".into()));
    f.render_widget(para, area);
}

fn render_timeline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .summary
        .as_ref()
        .map(|s| {
            s.timeline
                .iter()
                .map(|(_, amount)| amount.round().to_u64().unwrap_or(0))
                .collect()
        })
        .unwrap_or_default();

    let bucket = match app.period.granularity() {
        Granularity::Day => "day",
        Granularity::Week => "week",
        Granularity::Month => "month",
    };

    let sparkline = Sparkline::default()
        .block(block(format!(
            " Spending per {bucket}, last {} ",
            app.period
        )))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
