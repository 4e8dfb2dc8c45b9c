use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use super::Env;
use crate::ledger::Ledger;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::screens::{accounts, notifications};
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

/// How often the loop wakes without input, so toasts can expire.
const TICK: Duration = Duration::from_millis(250);

pub(crate) fn as_tui(env: &Env) -> Result<()> {
    // Sign in before raw mode so the passcode prompt behaves
    let mut ledger = env.sign_in()?;
    let mut app = App::new();
    app.refresh_all(&ledger)?;
    if let Some(a) = app.announcements.first() {
        app.set_status(format!("📢 {}: {}", a.title, a.body));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut ledger);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("dashboard exited with error: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ledger: &mut Ledger,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app, ledger);
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if app.show_help {
                    app.show_help = false;
                    continue;
                }
                match app.input_mode {
                    InputMode::Normal => handle_normal_input(key, app, ledger)?,
                    InputMode::Command => handle_command_input(key, app, ledger)?,
                    InputMode::Search => handle_search_input(key, app, ledger)?,
                    InputMode::Confirm => handle_confirm_input(key, app, ledger)?,
                }
            }
        }
        app.expire_toast(Instant::now());
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, ledger: &mut Ledger) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app, ledger);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app, ledger),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = Screen::all().get(idx) {
                switch_screen(app, ledger, screen)?;
            }
        }
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            switch_screen(app, ledger, screens[(idx + 1) % screens.len()])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, ledger, screens[prev])?;
        }
        KeyCode::Char(']') => {
            app.cycle_period(true);
            app.refresh_dashboard(ledger)?;
            app.set_status(format!("Showing the last {}", app.period));
        }
        KeyCode::Char('[') => {
            app.cycle_period(false);
            app.refresh_dashboard(ledger)?;
            app.set_status(format!("Showing the last {}", app.period));
        }
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app, ledger),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('D') if matches!(app.screen, Screen::Expenses | Screen::Accounts) => {
            commands::handle_command("delete", app, ledger)?;
        }
        KeyCode::Enter if app.screen == Screen::Notifications => {
            let id = ledger
                .notifications()
                .recent(ledger.notifications().len())
                .nth(app.notification_index)
                .and_then(|n| n.id);
            if let Some(id) = id {
                if let Err(e) = ledger.mark_notification_read(id) {
                    app.report(Err(e));
                }
            }
        }
        KeyCode::Esc if !app.search_input.is_empty() => {
            app.search_input.clear();
            app.refresh_expenses(ledger)?;
            app.set_status("Search cleared");
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, ledger: &mut Ledger) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, ledger)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, ledger: &mut Ledger) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.screen = Screen::Expenses;
            app.refresh_expenses(ledger)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_expenses(ledger)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            live_search(app, ledger)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            live_search(app, ledger)?;
        }
        _ => {}
    }
    Ok(())
}

fn live_search(app: &mut App, ledger: &Ledger) -> Result<()> {
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(ledger)
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, ledger: &mut Ledger) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                let result = match action {
                    PendingAction::DeleteExpense { id, .. } => ledger.remove_expense(id),
                    PendingAction::DeleteAccount { id, .. } => ledger.delete_account(id),
                    PendingAction::ClearNotifications => ledger
                        .clear_notifications()
                        .map(|()| "Notification history cleared".to_string()),
                };
                app.report(result);
                app.refresh_all(ledger)?;
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, ledger: &Ledger, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_dashboard(ledger)?,
        Screen::Expenses => app.refresh_expenses(ledger)?,
        Screen::Accounts => app.refresh_accounts(ledger)?,
        Screen::Notifications => app.refresh_notifications(ledger),
    }
    Ok(())
}

/// Table rows visible on the expenses screen (minus header and borders).
fn expense_page(app: &App) -> usize {
    app.visible_rows.saturating_sub(3).max(1)
}

fn handle_move_down(app: &mut App, ledger: &Ledger) {
    match app.screen {
        Screen::Expenses => {
            let page = expense_page(app);
            scroll_down(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        Screen::Accounts => {
            let page = accounts::cards_per_page(app.visible_rows);
            scroll_down(
                &mut app.account_index,
                &mut app.account_scroll,
                app.accounts.len(),
                page,
            );
        }
        Screen::Notifications => {
            let page = notifications::entries_per_page(app.visible_rows);
            scroll_down(
                &mut app.notification_index,
                &mut app.notification_scroll,
                ledger.notifications().len(),
                page,
            );
        }
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Accounts => scroll_up(&mut app.account_index, &mut app.account_scroll),
        Screen::Notifications => {
            scroll_up(&mut app.notification_index, &mut app.notification_scroll)
        }
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Accounts => scroll_to_top(&mut app.account_index, &mut app.account_scroll),
        Screen::Notifications => {
            scroll_to_top(&mut app.notification_index, &mut app.notification_scroll)
        }
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App, ledger: &Ledger) {
    match app.screen {
        Screen::Expenses => {
            let page = expense_page(app);
            scroll_to_bottom(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        Screen::Accounts => {
            let page = accounts::cards_per_page(app.visible_rows);
            scroll_to_bottom(
                &mut app.account_index,
                &mut app.account_scroll,
                app.accounts.len(),
                page,
            );
        }
        Screen::Notifications => {
            let page = notifications::entries_per_page(app.visible_rows);
            scroll_to_bottom(
                &mut app.notification_index,
                &mut app.notification_scroll,
                ledger.notifications().len(),
                page,
            );
        }
        Screen::Dashboard => {}
    }
}
