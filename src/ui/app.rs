use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::time::Instant;

use crate::db::ExpenseFilter;
use crate::ledger::{Ledger, LedgerResult};
use crate::models::*;
use crate::notify::Toast;
use crate::stats::{self, Period, Summary};

/// Rows fetched for the expenses screen.
const EXPENSE_PAGE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Accounts,
    Notifications,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Expenses,
            Self::Accounts,
            Self::Notifications,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Accounts => write!(f, "Accounts"),
            Self::Notifications => write!(f, "Notifications"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, description: String },
    DeleteAccount { id: i64, name: String },
    ClearNotifications,
}

/// A category slice decorated with its icon and colour.
#[derive(Debug, Clone)]
pub(crate) struct CategoryView {
    pub(crate) slice: stats::Slice,
    pub(crate) icon: String,
    pub(crate) color: String,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) show_help: bool,
    pub(crate) period: Period,
    pub(crate) today: NaiveDate,

    // Dashboard
    pub(crate) summary: Option<Summary>,
    pub(crate) categories: Vec<CategoryView>,
    pub(crate) total_balance: Decimal,
    pub(crate) unconverted: usize,
    pub(crate) announcements: Vec<Announcement>,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Accounts
    pub(crate) accounts: Vec<Account>,
    pub(crate) account_index: usize,
    pub(crate) account_scroll: usize,

    // Notifications
    pub(crate) notification_index: usize,
    pub(crate) notification_scroll: usize,

    pub(crate) toast: Option<Toast>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            show_help: false,
            period: Period::Month,
            today: Local::now().date_naive(),

            summary: None,
            categories: Vec::new(),
            total_balance: Decimal::ZERO,
            unconverted: 0,
            announcements: Vec::new(),

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,

            accounts: Vec::new(),
            account_index: 0,
            account_scroll: 0,

            notification_index: 0,
            notification_scroll: 0,

            toast: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_dashboard(&mut self, ledger: &Ledger) -> Result<()> {
        self.today = Local::now().date_naive();
        let summary = ledger.summarize(self.period, self.today)?;
        self.categories = stats::category_shares(&summary)
            .into_iter()
            .map(|slice| {
                let (icon, color) = ledger.brands().style_for(&slice.category);
                CategoryView {
                    icon: icon.to_string(),
                    color: color.to_string(),
                    slice,
                }
            })
            .collect();
        self.summary = Some(summary);

        let (total, problems) = ledger.total_balance()?;
        self.total_balance = total;
        self.unconverted = problems.len();
        self.announcements = ledger.announcements(true)?;
        Ok(())
    }

    pub(crate) fn refresh_expenses(&mut self, ledger: &Ledger) -> Result<()> {
        let filter = ExpenseFilter {
            search: (!self.search_input.is_empty()).then(|| self.search_input.clone()),
            limit: Some(EXPENSE_PAGE),
            ..Default::default()
        };
        self.expenses = ledger.expenses(&filter)?;
        clamp(&mut self.expense_index, &mut self.expense_scroll, self.expenses.len());
        Ok(())
    }

    pub(crate) fn refresh_accounts(&mut self, ledger: &Ledger) -> Result<()> {
        self.accounts = ledger.accounts()?;
        clamp(&mut self.account_index, &mut self.account_scroll, self.accounts.len());
        Ok(())
    }

    pub(crate) fn refresh_notifications(&mut self, ledger: &Ledger) {
        clamp(
            &mut self.notification_index,
            &mut self.notification_scroll,
            ledger.notifications().len(),
        );
    }

    pub(crate) fn refresh_all(&mut self, ledger: &Ledger) -> Result<()> {
        self.refresh_dashboard(ledger)?;
        self.refresh_expenses(ledger)?;
        self.refresh_accounts(ledger)?;
        self.refresh_notifications(ledger);
        Ok(())
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    pub(crate) fn selected_account(&self) -> Option<&Account> {
        self.accounts.get(self.account_index)
    }

    /// Name of the account an expense was drawn from, if it still exists.
    pub(crate) fn account_name(&self, id: Option<i64>) -> Option<&str> {
        let id = id?;
        self.accounts
            .iter()
            .find(|a| a.id == Some(id))
            .map(|a| a.name.as_str())
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg, NotificationKind::Info, Instant::now()));
    }

    /// Show the outcome of a ledger operation as a toast.
    pub(crate) fn report(&mut self, result: LedgerResult<String>) {
        let (message, kind) = match result {
            Ok(msg) => (msg, NotificationKind::Success),
            Err(e) => (e.to_string(), NotificationKind::Error),
        };
        self.toast = Some(Toast::new(message, kind, Instant::now()));
    }

    /// Drop the toast once its time is up. Returns whether it changed.
    pub(crate) fn expire_toast(&mut self, now: Instant) -> bool {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
            return true;
        }
        false
    }

    /// Step to the next (`forward`) or previous statistics window.
    pub(crate) fn cycle_period(&mut self, forward: bool) {
        let periods = Period::all();
        let idx = periods.iter().position(|p| *p == self.period).unwrap_or(0);
        let next = if forward {
            (idx + 1) % periods.len()
        } else if idx == 0 {
            periods.len() - 1
        } else {
            idx - 1
        };
        self.period = periods[next];
    }
}

/// Keep a cursor inside a list that may have shrunk.
fn clamp(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
