use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::currency;
use crate::ui::app::App;
use crate::ui::theme;

/// Lines per account card.
const CARD_HEIGHT: usize = 4;

/// Cards that fit in `rows` content rows.
pub(crate) fn cards_per_page(rows: usize) -> usize {
    (rows.saturating_sub(2) / CARD_HEIGHT).max(1)
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.accounts.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No accounts yet.",
                theme::dim_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Create one with :account <name> [type].",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY)),
        );
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .accounts
        .iter()
        .enumerate()
        .skip(app.account_scroll)
        .take(cards_per_page(area.height as usize))
        .map(|(i, account)| {
            let selected = i == app.account_index;
            let swatch = theme::hex_color(&account.color);
            let border_color = if selected { theme::ACCENT } else { theme::OVERLAY };

            let mut title = vec![
                Span::styled("┌─", Style::default().fg(border_color)),
                Span::styled("■ ", Style::default().fg(swatch)),
                Span::styled(
                    format!("{} ({}) ", account.name, account.account_type),
                    Style::default()
                        .fg(if selected { theme::ACCENT } else { theme::TEXT_DIM })
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            if account.is_primary {
                title.push(Span::styled("★ primary ", Style::default().fg(theme::YELLOW)));
            }
            if !account.is_active() {
                title.push(Span::styled(
                    format!("[{}] ", account.status.as_str()),
                    theme::dim_style(),
                ));
            }

            let bal_color = if account.balance >= Decimal::ZERO {
                theme::GREEN
            } else {
                theme::RED
            };
            let balance_line = Line::from(vec![
                Span::styled("  Balance: ", theme::dim_style()),
                Span::styled(
                    currency::format_amount(account.balance, &account.currency),
                    Style::default().fg(bal_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", account.currency), theme::dim_style()),
            ]);

            let opened = account.created_at.get(..10).unwrap_or(&account.created_at);
            let detail_line = Line::from(Span::styled(
                format!("  Opened {opened}"),
                theme::dim_style(),
            ));

            let border_width = (area.width as usize).saturating_sub(3);
            let bottom_line = Line::from(Span::styled(
                format!("└{}", "─".repeat(border_width)),
                Style::default().fg(border_color),
            ));

            ListItem::new(vec![Line::from(title), balance_line, detail_line, bottom_line])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " {} Accounts | j/k navigate | :primary | D delete ",
                    app.accounts.len()
                ),
                theme::dim_style(),
            )),
    );
    f.render_widget(list, area);
}
