use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::ledger::{Ledger, LedgerError};
use crate::models::{AccountType, Expense};
use crate::stats::Period;
use crate::validate::{self, ExpenseForm};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Ledger) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Spendlog", cmd_quit, r);
    register_command!("quit", "Quit Spendlog", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("accounts", "Go to Accounts", cmd_accounts, r);
    register_command!("n", "Go to Notifications", cmd_notifications, r);
    register_command!("notifications", "Go to Notifications", cmd_notifications, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "period",
        "Set statistics window (e.g. :period 3M)",
        cmd_period,
        r
    );
    register_command!("p", "Set statistics window (e.g. :p 1W)", cmd_period, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 150 Jollibee lunch)",
        cmd_add,
        r
    );
    register_command!(
        "edit",
        "Edit selected expense (e.g. :edit 180 Grab)",
        cmd_edit,
        r
    );
    register_command!("delete", "Delete selected expense or account", cmd_delete, r);
    register_command!("rm", "Delete selected expense or account", cmd_delete, r);
    register_command!(
        "account",
        "Create account (e.g. :account GCash e-wallet)",
        cmd_account,
        r
    );
    register_command!(
        "primary",
        "Make the selected account primary",
        cmd_primary,
        r
    );
    register_command!(
        "search",
        "Search expenses (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search expenses (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "convert",
        "Convert currency (e.g. :convert 100 USD PHP)",
        cmd_convert,
        r
    );
    register_command!("read", "Mark all notifications read", cmd_read, r);
    register_command!("clear", "Clear notification history", cmd_clear, r);
    register_command!(
        "export",
        "Export expenses to CSV (e.g. :export ~/spending.csv)",
        cmd_export,
        r
    );
    register_command!(
        "rates",
        "Refresh exchange rates (admin)",
        cmd_rates,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, ledger)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Split `<amount> <merchant...>` into an expense form.
fn parse_expense_args(args: &str) -> Option<ExpenseForm> {
    let (amount, merchant) = args.split_once(' ')?;
    let merchant = merchant.trim();
    if merchant.is_empty() {
        return None;
    }
    Some(ExpenseForm {
        amount: amount.to_string(),
        merchant: merchant.to_string(),
        ..Default::default()
    })
}

/// Split `<name> [type]`, treating a trailing known type word as the type.
fn parse_account_args(args: &str) -> (String, AccountType) {
    if let Some((name, last)) = args.rsplit_once(' ') {
        let account_type = AccountType::parse(last);
        if account_type != AccountType::Other || last.eq_ignore_ascii_case("other") {
            return (name.trim().to_string(), account_type);
        }
    }
    (args.to_string(), AccountType::Bank)
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(ledger)?;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_expenses(ledger)?;
    Ok(())
}

fn cmd_accounts(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Accounts;
    app.refresh_accounts(ledger)?;
    Ok(())
}

fn cmd_notifications(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Notifications;
    app.refresh_notifications(ledger);
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_period(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() {
        let labels: Vec<&str> = Period::all().iter().map(|p| p.as_str()).collect();
        app.set_status(format!("Usage: :period <{}>", labels.join("|")));
        return Ok(());
    }
    app.period = Period::parse(args);
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(ledger)?;
    app.set_status(format!("Showing the last {}", app.period));
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let Some(form) = parse_expense_args(args) else {
        app.set_status("Usage: :add <amount> <merchant or category>");
        return Ok(());
    };
    let primary = ledger.primary_account()?.and_then(|a| a.id);
    let result = ledger.add_expense(&form, primary, app.today);
    let ok = result.is_ok();
    app.report(result);
    if ok {
        app.refresh_all(ledger)?;
    }
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses {
        app.set_status("Select an expense on the Expenses screen first");
        return Ok(());
    }
    let Some(mut form) = parse_expense_args(args) else {
        app.set_status("Usage: :edit <amount> <merchant or category>");
        return Ok(());
    };
    let Some(Expense {
        id: Some(id),
        date,
        account_id,
        ..
    }) = app.selected_expense().cloned()
    else {
        app.set_status("No expense selected");
        return Ok(());
    };
    form.date = date.format("%Y-%m-%d").to_string();
    let result = ledger.edit_expense(id, &form, account_id, app.today);
    let ok = result.is_ok();
    app.report(result);
    if ok {
        app.refresh_all(ledger)?;
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    let pending = match app.screen {
        Screen::Expenses => app.selected_expense().and_then(|e| {
            e.id.map(|id| {
                (
                    format!("Delete expense '{}'?", e.description),
                    PendingAction::DeleteExpense {
                        id,
                        description: e.description.clone(),
                    },
                )
            })
        }),
        Screen::Accounts => app.selected_account().and_then(|a| {
            a.id.map(|id| {
                (
                    format!("Delete account '{}'?", a.name),
                    PendingAction::DeleteAccount {
                        id,
                        name: a.name.clone(),
                    },
                )
            })
        }),
        _ => None,
    };
    match pending {
        Some((message, action)) => {
            app.confirm_message = message;
            app.pending_action = Some(action);
            app.input_mode = InputMode::Confirm;
        }
        None => app.set_status("Select an expense or account to delete"),
    }
    Ok(())
}

fn cmd_account(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() {
        let types: Vec<&str> = AccountType::all().iter().map(|t| t.as_str()).collect();
        app.set_status(format!(
            "Usage: :account <name> [type]. Types: {}",
            types.join(", ")
        ));
        return Ok(());
    }
    let (name, account_type) = parse_account_args(args);
    let result = ledger.add_account(&name, account_type, None, None);
    let ok = result.is_ok();
    app.report(result);
    if ok {
        app.refresh_accounts(ledger)?;
    }
    Ok(())
}

fn cmd_primary(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let Some(id) = app.selected_account().and_then(|a| a.id) else {
        app.set_status("Select an account on the Accounts screen first");
        return Ok(());
    };
    let result = ledger.set_primary_account(id);
    app.report(result);
    app.refresh_accounts(ledger)?;
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(ledger)?;

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }
    Ok(())
}

fn cmd_convert(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [amount, from, to] = parts.as_slice() else {
        app.set_status("Usage: :convert <amount> <from> <to>");
        return Ok(());
    };
    let result = validate::parse_amount(amount)
        .map_err(LedgerError::from)
        .and_then(|amount| ledger.convert(amount, from, to));
    app.report(result);
    Ok(())
}

fn cmd_read(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let result = ledger
        .mark_all_read()
        .map(|()| "All notifications marked read".to_string());
    app.report(result);
    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.confirm_message = "Clear all notifications?".into();
    app.pending_action = Some(PendingAction::ClearNotifications);
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/spendlog-export-{}.csv", app.today.format("%Y-%m-%d"))
    } else {
        crate::run::shellexpand(args)
    };
    let result = ledger.export_csv(Path::new(&path));
    app.report(result);
    Ok(())
}

fn cmd_rates(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let result = ledger.update_rates();
    let ok = result.is_ok();
    app.report(result);
    if ok {
        app.refresh_dashboard(ledger)?;
    }
    Ok(())
}
