use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ledger::Ledger;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{short_timestamp, truncate};

/// Lines per notification entry.
const ENTRY_HEIGHT: usize = 2;

pub(crate) fn entries_per_page(rows: usize) -> usize {
    (rows.saturating_sub(2) / ENTRY_HEIGHT).max(1)
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let center = ledger.notifications();
    let title = format!(
        " Notifications ({}/{}) | {} unread ",
        center.len(),
        center.capacity(),
        center.unread_count()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::title_style()));

    if center.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("You're all caught up", theme::dim_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let width = (area.width as usize).saturating_sub(6);
    let items: Vec<ListItem> = center
        .recent(center.len())
        .enumerate()
        .skip(app.notification_scroll)
        .take(entries_per_page(area.height as usize))
        .map(|(i, n)| {
            let color = theme::kind_color(n.kind);
            let mut title_style = Style::default().fg(color);
            if !n.is_read {
                title_style = title_style.add_modifier(Modifier::BOLD);
            }
            let marker = if n.is_read { "  " } else { "● " };
            let head = Line::from(vec![
                Span::styled(marker, Style::default().fg(theme::ACCENT)),
                Span::styled(format!("{} {}", n.kind.icon(), n.title), title_style),
                Span::styled(
                    format!("  {}", short_timestamp(&n.created_at)),
                    theme::dim_style(),
                ),
            ]);
            let body = Line::from(Span::styled(
                format!("    {}", truncate(&n.message, width)),
                if n.is_read {
                    theme::dim_style()
                } else {
                    theme::normal_style()
                },
            ));
            let item = ListItem::new(vec![head, body]);
            if i == app.notification_index {
                item.style(Style::default().bg(theme::SURFACE))
            } else {
                item
            }
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
