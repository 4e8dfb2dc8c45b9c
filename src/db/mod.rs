mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) struct Database {
    conn: Connection,
}

/// Optional narrowing for [`Database::get_expenses`].
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseFilter {
    pub(crate) account_id: Option<i64>,
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
    pub(crate) limit: Option<u32>,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        // A fresh database starts at version 1 and migrates forward like any other
        let current: i32 = if has_version_table {
            self.conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0)
        } else {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn
                .execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
            tracing::info!("created fresh schema");
            1
        };

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    /// Insert a user together with their primary cash account.
    pub(crate) fn create_user(&mut self, user: &User) -> Result<i64> {
        if self.get_user_by_username(&user.username)?.is_some() {
            anyhow::bail!("Username '{}' is already taken", user.username);
        }
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO users (username, passcode_hash, name, email, phone, currency, timezone, avatar, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.username,
                user.passcode_hash,
                user.name,
                user.email,
                user.phone,
                user.currency,
                user.timezone,
                user.avatar,
                user.is_admin,
                user.created_at,
            ],
        )?;
        let user_id = tx.last_insert_rowid();
        insert_account_row(&tx, &Account::primary(user_id, user.currency.clone()))?;
        tx.commit()?;
        tracing::info!(user_id, username = %user.username, "user created");
        Ok(user_id)
    }

    pub(crate) fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("{USER_COLUMNS} WHERE username = ?1"),
                params![username.trim()],
                row_to_user,
            )
            .optional()?)
    }

    pub(crate) fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(&format!("{USER_COLUMNS} WHERE id = ?1"), params![id], row_to_user)
            .optional()?)
    }

    pub(crate) fn get_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_COLUMNS} ORDER BY username"))?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<()> {
        let Some(mut user) = self.get_user_by_id(user_id)? else {
            anyhow::bail!("User {user_id} not found");
        };
        if let Some(v) = &update.name {
            user.name = v.clone();
        }
        if let Some(v) = &update.email {
            user.email = v.clone();
        }
        if let Some(v) = &update.phone {
            user.phone = v.clone();
        }
        if let Some(v) = &update.currency {
            user.currency = v.clone();
        }
        if let Some(v) = &update.timezone {
            user.timezone = v.clone();
        }
        if let Some(v) = &update.avatar {
            user.avatar = v.clone();
        }
        self.conn.execute(
            "UPDATE users SET name = ?1, email = ?2, phone = ?3, currency = ?4, timezone = ?5, avatar = ?6
             WHERE id = ?7",
            params![
                user.name,
                user.email,
                user.phone,
                user.currency,
                user.timezone,
                user.avatar,
                user_id,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn update_passcode(&self, user_id: i64, passcode_hash: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET passcode_hash = ?1 WHERE id = ?2",
            params![passcode_hash, user_id],
        )?;
        Ok(())
    }

    pub(crate) fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET is_admin = ?1 WHERE id = ?2",
            params![is_admin, user_id],
        )?;
        Ok(())
    }

    // ── Accounts ──────────────────────────────────────────────

    pub(crate) fn insert_account(&self, account: &Account) -> Result<i64> {
        insert_account_row(&self.conn, account)
    }

    pub(crate) fn get_accounts(&self, user_id: i64) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCOUNT_COLUMNS} WHERE user_id = ?1 ORDER BY is_primary DESC, name"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_account)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self
            .conn
            .query_row(
                &format!("{ACCOUNT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_account,
            )
            .optional()?)
    }

    pub(crate) fn get_primary_account(&self, user_id: i64) -> Result<Option<Account>> {
        Ok(self
            .conn
            .query_row(
                &format!("{ACCOUNT_COLUMNS} WHERE user_id = ?1 AND is_primary = 1 LIMIT 1"),
                params![user_id],
                row_to_account,
            )
            .optional()?)
    }

    /// Name, type, currency, color and status. Balance and the primary flag
    /// have their own operations.
    pub(crate) fn update_account(&self, account: &Account) -> Result<()> {
        let id = account.id.context("Account has no ID")?;
        let changed = self.conn.execute(
            "UPDATE accounts SET name = ?1, account_type = ?2, currency = ?3, color = ?4, status = ?5
             WHERE id = ?6",
            params![
                account.name,
                account.account_type.as_str(),
                account.currency,
                account.color,
                account.status.as_str(),
                id,
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Account {id} not found");
        }
        Ok(())
    }

    /// Overwrite the balance, e.g. after a manual reconciliation.
    pub(crate) fn set_account_balance(&self, account_id: i64, balance: Decimal) -> Result<()> {
        self.conn.execute(
            "UPDATE accounts SET balance = ?1 WHERE id = ?2",
            params![balance.to_string(), account_id],
        )?;
        Ok(())
    }

    pub(crate) fn set_primary_account(&mut self, user_id: i64, account_id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE accounts SET is_primary = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        let changed = tx.execute(
            "UPDATE accounts SET is_primary = 1 WHERE id = ?1 AND user_id = ?2",
            params![account_id, user_id],
        )?;
        if changed == 0 {
            anyhow::bail!("Account {account_id} not found");
        }
        tx.commit()?;
        Ok(())
    }

    /// Expenses drawn from the account keep their rows with no account.
    pub(crate) fn delete_account(&self, id: i64) -> Result<()> {
        let Some(account) = self.get_account_by_id(id)? else {
            anyhow::bail!("Account {id} not found");
        };
        if account.is_primary {
            anyhow::bail!("The primary account cannot be deleted");
        }
        self.conn
            .execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Insert the expense and deduct it from its account in one transaction.
    pub(crate) fn add_expense(&mut self, expense: &Expense) -> Result<i64> {
        if expense.amount < Decimal::ZERO {
            anyhow::bail!("Expense amount cannot be negative");
        }
        let tx = self.conn.transaction()?;
        if let Some(account_id) = expense.account_id {
            adjust_balance(&tx, account_id, expense.user_id, -expense.charged())?;
        }
        tx.execute(
            "INSERT INTO expenses (user_id, amount, category, description, date, account_id, account_amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                expense.user_id,
                expense.amount.to_string(),
                expense.category,
                expense.description,
                expense.date.format(DATE_FORMAT).to_string(),
                expense.account_id,
                expense.account_amount.map(|a| a.to_string()),
                expense.created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!(id, amount = %expense.amount, account_id = ?expense.account_id, "expense added");
        Ok(id)
    }

    /// Replace an expense, moving the balance effect to the new amount/account.
    pub(crate) fn update_expense(&mut self, expense: &Expense) -> Result<()> {
        let id = expense.id.context("Expense has no ID")?;
        if expense.amount < Decimal::ZERO {
            anyhow::bail!("Expense amount cannot be negative");
        }
        let tx = self.conn.transaction()?;
        let Some(old) = tx
            .query_row(
                &format!("{EXPENSE_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_expense,
            )
            .optional()?
        else {
            anyhow::bail!("Expense {id} not found");
        };
        if let Some(account_id) = old.account_id {
            adjust_balance(&tx, account_id, old.user_id, old.charged())?;
        }
        if let Some(account_id) = expense.account_id {
            adjust_balance(&tx, account_id, old.user_id, -expense.charged())?;
        }
        tx.execute(
            "UPDATE expenses SET amount = ?1, category = ?2, description = ?3, date = ?4, account_id = ?5,
             account_amount = ?6 WHERE id = ?7",
            params![
                expense.amount.to_string(),
                expense.category,
                expense.description,
                expense.date.format(DATE_FORMAT).to_string(),
                expense.account_id,
                expense.account_amount.map(|a| a.to_string()),
                id,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete an expense and refund its account. Returns the removed row.
    pub(crate) fn delete_expense(&mut self, id: i64) -> Result<Expense> {
        let tx = self.conn.transaction()?;
        let Some(old) = tx
            .query_row(
                &format!("{EXPENSE_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_expense,
            )
            .optional()?
        else {
            anyhow::bail!("Expense {id} not found");
        };
        if let Some(account_id) = old.account_id {
            adjust_balance(&tx, account_id, old.user_id, old.charged())?;
        }
        tx.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(old)
    }

    pub(crate) fn get_expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .conn
            .query_row(
                &format!("{EXPENSE_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_expense,
            )
            .optional()?)
    }

    pub(crate) fn get_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = format!("{EXPENSE_COLUMNS} WHERE user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id)];

        if let Some(aid) = filter.account_id {
            sql.push_str(&format!(" AND account_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(aid));
        }
        if let Some(cat) = &filter.category {
            sql.push_str(&format!(
                " AND category = ?{} COLLATE NOCASE",
                param_values.len() + 1
            ));
            param_values.push(Box::new(cat.clone()));
        }
        if let Some(s) = &filter.search {
            sql.push_str(&format!(
                " AND (description LIKE ?{0} OR category LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }
        if let Some(since) = filter.since {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(since.format(DATE_FORMAT).to_string()));
        }
        if let Some(until) = filter.until {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(until.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), row_to_expense)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_categories(&self, user_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM expenses WHERE user_id = ?1 ORDER BY category",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_count(&self, user_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    pub(crate) fn export_expenses_csv(&self, user_id: i64, path: &Path) -> Result<usize> {
        let expenses = self.get_expenses(user_id, &ExpenseFilter::default())?;
        let accounts = self.get_accounts(user_id)?;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record(["date", "amount", "category", "description", "account"])?;
        for e in &expenses {
            let account = e
                .account_id
                .and_then(|id| accounts.iter().find(|a| a.id == Some(id)))
                .map(|a| a.name.as_str())
                .unwrap_or("");
            wtr.write_record([
                e.date.format(DATE_FORMAT).to_string().as_str(),
                e.amount.to_string().as_str(),
                e.category.as_str(),
                e.description.as_str(),
                account,
            ])?;
        }
        wtr.flush()?;
        Ok(expenses.len())
    }

    // ── Notifications ─────────────────────────────────────────

    pub(crate) fn insert_notification(&self, n: &Notification) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO notifications (user_id, title, message, kind, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                n.user_id,
                n.title,
                n.message,
                n.kind.as_str(),
                n.is_read,
                n.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Newest first.
    pub(crate) fn get_notifications(&self, user_id: i64, limit: usize) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, message, kind, is_read, created_at
             FROM notifications WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(Notification {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                title: row.get(2)?,
                message: row.get(3)?,
                kind: NotificationKind::parse(&row.get::<_, String>(4)?),
                is_read: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn mark_notification_read(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    pub(crate) fn mark_all_notifications_read(&self, user_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    /// Keep only the newest `keep` notifications of a user. Returns rows removed.
    pub(crate) fn trim_notifications(&self, user_id: i64, keep: usize) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM notifications WHERE user_id = ?1 AND id NOT IN
                (SELECT id FROM notifications WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2)",
            params![user_id, keep as i64],
        )?)
    }

    pub(crate) fn clear_notifications(&self, user_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM notifications WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    // ── Policy rules ──────────────────────────────────────────

    pub(crate) fn insert_policy_rule(&self, rule: &PolicyRule) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO policy_rules (name, category, max_amount, requires_receipt, active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rule.name,
                rule.category,
                rule.max_amount.map(|m| m.to_string()),
                rule.requires_receipt,
                rule.active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_policy_rules(&self) -> Result<Vec<PolicyRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, max_amount, requires_receipt, active FROM policy_rules ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            let max: Option<String> = row.get(3)?;
            Ok(PolicyRule {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                category: row.get(2)?,
                max_amount: max.map(|m| parse_decimal(&m)),
                requires_receipt: row.get(4)?,
                active: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn set_policy_rule_active(&self, id: i64, active: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE policy_rules SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(())
    }

    pub(crate) fn delete_policy_rule(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM policy_rules WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Currency rates ────────────────────────────────────────

    pub(crate) fn get_currency_rates(&self) -> Result<Vec<CurrencyRate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, rate_per_usd, updated_at FROM currency_rates ORDER BY code",
        )?;
        let rows = stmt.query_map([], |row| {
            let rate: String = row.get(2)?;
            Ok(CurrencyRate {
                id: Some(row.get(0)?),
                code: row.get(1)?,
                rate_per_usd: parse_decimal(&rate),
                updated_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn upsert_currency_rates(&mut self, rates: &[CurrencyRate]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for rate in rates {
            tx.execute(
                "INSERT INTO currency_rates (code, rate_per_usd, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(code) DO UPDATE SET rate_per_usd = ?2, updated_at = ?3",
                params![
                    rate.code.to_uppercase(),
                    rate.rate_per_usd.to_string(),
                    rate.updated_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(rates.len())
    }

    pub(crate) fn delete_currency_rate(&self, code: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM currency_rates WHERE code = ?1",
            params![code.to_uppercase()],
        )?;
        Ok(())
    }

    // ── Integrations ──────────────────────────────────────────

    pub(crate) fn insert_integration(&self, integration: &Integration) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO integrations (provider, api_key, endpoint, enabled, last_synced)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(provider) DO UPDATE SET api_key = ?2, endpoint = ?3, enabled = ?4",
            params![
                integration.provider,
                integration.api_key,
                integration.endpoint,
                integration.enabled,
                integration.last_synced,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_integrations(&self) -> Result<Vec<Integration>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, provider, api_key, endpoint, enabled, last_synced FROM integrations ORDER BY provider",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Integration {
                id: Some(row.get(0)?),
                provider: row.get(1)?,
                api_key: row.get(2)?,
                endpoint: row.get(3)?,
                enabled: row.get(4)?,
                last_synced: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn mark_integration_synced(&self, id: i64, at: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE integrations SET last_synced = ?1 WHERE id = ?2 AND enabled = 1",
            params![at, id],
        )?;
        if changed == 0 {
            anyhow::bail!("Integration {id} not found or disabled");
        }
        Ok(())
    }

    pub(crate) fn set_integration_enabled(&self, id: i64, enabled: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE integrations SET enabled = ?1 WHERE id = ?2",
            params![enabled, id],
        )?;
        Ok(())
    }

    pub(crate) fn delete_integration(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM integrations WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Announcements ─────────────────────────────────────────

    pub(crate) fn insert_announcement(&self, a: &Announcement) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO announcements (title, body, active, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![a.title, a.body, a.active, a.created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Newest first.
    pub(crate) fn get_announcements(&self, active_only: bool) -> Result<Vec<Announcement>> {
        let sql = if active_only {
            "SELECT id, title, body, active, created_at FROM announcements WHERE active = 1 ORDER BY id DESC"
        } else {
            "SELECT id, title, body, active, created_at FROM announcements ORDER BY id DESC"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Announcement {
                id: Some(row.get(0)?),
                title: row.get(1)?,
                body: row.get(2)?,
                active: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn set_announcement_active(&self, id: i64, active: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE announcements SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(())
    }

    pub(crate) fn delete_announcement(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM announcements WHERE id = ?1", params![id])?;
        Ok(())
    }
}

// ── Row helpers ───────────────────────────────────────────────

const USER_COLUMNS: &str = "SELECT id, username, passcode_hash, name, email, phone, currency, timezone, avatar, is_admin, created_at FROM users";

const ACCOUNT_COLUMNS: &str = "SELECT id, user_id, name, account_type, currency, balance, color, is_primary, status, created_at FROM accounts";

const EXPENSE_COLUMNS: &str = "SELECT id, user_id, amount, category, description, date, account_id, created_at, account_amount FROM expenses";

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_default()
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        username: row.get(1)?,
        passcode_hash: row.get(2)?,
        name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        currency: row.get(6)?,
        timezone: row.get(7)?,
        avatar: row.get(8)?,
        is_admin: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let balance: String = row.get(5)?;
    Ok(Account {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        name: row.get(2)?,
        account_type: AccountType::parse(&row.get::<_, String>(3)?),
        currency: row.get(4)?,
        balance: parse_decimal(&balance),
        color: row.get(6)?,
        is_primary: row.get(7)?,
        status: AccountStatus::parse(&row.get::<_, String>(8)?),
        created_at: row.get(9)?,
    })
}

fn row_to_expense(row: &Row) -> rusqlite::Result<Expense> {
    let amount: String = row.get(2)?;
    let date: String = row.get(5)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Expense {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        amount: parse_decimal(&amount),
        category: row.get(3)?,
        description: row.get(4)?,
        date,
        account_id: row.get(6)?,
        account_amount: row.get::<_, Option<String>>(8)?.map(|a| parse_decimal(&a)),
        created_at: row.get(7)?,
    })
}

fn insert_account_row(conn: &Connection, account: &Account) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (user_id, name, account_type, currency, balance, color, is_primary, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            account.user_id,
            account.name,
            account.account_type.as_str(),
            account.currency,
            account.balance.to_string(),
            account.color,
            account.is_primary,
            account.status.as_str(),
            account.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Add `delta` to an account balance. The account must belong to `user_id`.
fn adjust_balance(conn: &Connection, account_id: i64, user_id: i64, delta: Decimal) -> Result<()> {
    let balance: Option<String> = conn
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1 AND user_id = ?2",
            params![account_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(balance) = balance else {
        anyhow::bail!("Account {account_id} not found");
    };
    let updated = parse_decimal(&balance)
        .checked_add(delta)
        .with_context(|| format!("Balance of account {account_id} out of range"))?;
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![updated.to_string(), account_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests;
