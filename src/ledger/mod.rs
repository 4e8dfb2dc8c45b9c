//! A signed-in user's session: every user action goes through here.
//!
//! Each write follows the same path: validate the raw input, resolve the
//! merchant to a category, write to the store, then record a notification.
//! Callers get a one-line message either way. Store failures are logged
//! with their cause and surfaced as [`LedgerError::Store`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;

use crate::auth::{AuthError, PasscodeHash};
use crate::brands::{BrandResolver, Identified};
use crate::currency::{self, CurrencyError, RateTable};
use crate::db::{Database, ExpenseFilter};
use crate::models::*;
use crate::notify::NotificationCenter;
use crate::stats::{self, Period, Summary};
use crate::validate::{self, ExpenseForm, FieldErrors, ValidationError};

#[derive(Debug, thiserror::Error)]
pub(crate) enum LedgerError {
    #[error("{}", validate::describe(.0))]
    Invalid(FieldErrors),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Currency(#[from] CurrencyError),
    #[error("{0}")]
    Rejected(String),
    #[error("Administrator access required")]
    NotAdmin,
    #[error("Could not save your changes. Please try again.")]
    Store,
}

pub(crate) type LedgerResult<T> = Result<T, LedgerError>;

fn store_failure(e: anyhow::Error) -> LedgerError {
    tracing::error!("store operation failed: {e:#}");
    LedgerError::Store
}

/// Raw profile form. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProfileForm {
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) currency: Option<String>,
    pub(crate) timezone: Option<String>,
    pub(crate) avatar: Option<String>,
}

impl ProfileForm {
    fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut update = ProfileUpdate::default();

        if let Some(v) = &self.name {
            match validate::required_text("Name", v, validate::MAX_NAME_LEN) {
                Ok(v) => update.name = Some(v),
                Err(e) => errors.push(("name", e)),
            }
        }
        if let Some(v) = &self.email {
            match validate::validate_email(v) {
                Ok(v) => update.email = Some(v),
                Err(e) => errors.push(("email", e)),
            }
        }
        if let Some(v) = &self.phone {
            match validate::validate_phone(v) {
                Ok(v) => update.phone = Some(v),
                Err(e) => errors.push(("phone", e)),
            }
        }
        if let Some(v) = &self.currency {
            match validate::validate_currency(v) {
                Ok(v) => update.currency = Some(v),
                Err(e) => errors.push(("currency", e)),
            }
        }
        if let Some(v) = &self.timezone {
            match validate::required_text("Timezone", v, validate::MAX_NAME_LEN) {
                Ok(v) => update.timezone = Some(v),
                Err(e) => errors.push(("timezone", e)),
            }
        }
        if let Some(v) = &self.avatar {
            match validate::optional_text("Avatar", v, validate::MAX_DESCRIPTION_LEN) {
                Ok(v) => update.avatar = Some(v),
                Err(e) => errors.push(("avatar", e)),
            }
        }

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(errors)
        }
    }
}

/// Raw account edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub(crate) struct AccountForm {
    pub(crate) name: Option<String>,
    pub(crate) account_type: Option<AccountType>,
    pub(crate) color: Option<String>,
    pub(crate) status: Option<AccountStatus>,
}

impl AccountForm {
    fn apply(&self, account: &mut Account) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(v) = &self.name {
            match validate::required_text("Account name", v, validate::MAX_NAME_LEN) {
                Ok(v) => account.name = v,
                Err(e) => errors.push(("name", e)),
            }
        }
        if let Some(v) = &self.color {
            match validate::validate_color(v) {
                Ok(v) => account.color = v,
                Err(e) => errors.push(("color", e)),
            }
        }
        if let Some(t) = self.account_type {
            account.account_type = t;
        }
        if let Some(s) = self.status {
            account.status = s;
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub(crate) struct Ledger {
    db: Database,
    brands: BrandResolver,
    rates: RateTable,
    notifications: NotificationCenter,
    user: User,
}

impl Ledger {
    /// Open a session for an authenticated user.
    pub(crate) fn new(
        db: Database,
        brands: BrandResolver,
        user: User,
        notification_capacity: usize,
    ) -> LedgerResult<Self> {
        let user_id = user
            .id
            .ok_or_else(|| LedgerError::Rejected("User has not been saved".into()))?;
        let rates = RateTable::with_rates(&db.get_currency_rates().map_err(store_failure)?);
        let notifications =
            NotificationCenter::load(&db, user_id, notification_capacity).map_err(store_failure)?;
        Ok(Self {
            db,
            brands,
            rates,
            notifications,
            user,
        })
    }

    fn user_id(&self) -> i64 {
        self.notifications.user_id()
    }

    pub(crate) fn user(&self) -> &User {
        &self.user
    }

    pub(crate) fn brands(&self) -> &BrandResolver {
        &self.brands
    }

    pub(crate) fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub(crate) fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Notification failures never undo the action that caused them.
    fn notify(&mut self, title: &str, message: &str, kind: NotificationKind) {
        if let Err(e) = self
            .notifications
            .add_notification(&self.db, title, message, kind)
        {
            tracing::warn!("could not record notification: {e:#}");
        }
    }

    fn require_admin(&self) -> LedgerResult<()> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin)
        }
    }

    pub(crate) fn format(&self, amount: Decimal) -> String {
        currency::format_amount(amount, &self.user.currency)
    }

    // ── Expenses ──────────────────────────────────────────────

    /// The user's account with `id`, archived or not.
    fn user_account(&self, id: i64) -> LedgerResult<Account> {
        match self.db.get_account_by_id(id).map_err(store_failure)? {
            Some(a) if a.user_id == self.user_id() => Ok(a),
            _ => Err(LedgerError::Rejected(format!("Account {id} not found"))),
        }
    }

    /// The user's active account with `id`.
    fn owned_account(&self, id: i64) -> LedgerResult<Account> {
        let account = self.user_account(id)?;
        if !account.is_active() {
            return Err(LedgerError::Rejected(format!(
                "Account '{}' is archived",
                account.name
            )));
        }
        Ok(account)
    }

    /// `amount` in the user's currency as charged to `account`, when the
    /// account keeps a different currency.
    fn account_charge(&self, amount: Decimal, account: Option<&Account>) -> LedgerResult<Option<Decimal>> {
        let Some(account) = account else {
            return Ok(None);
        };
        if account.currency.eq_ignore_ascii_case(&self.user.currency) {
            return Ok(None);
        }
        let converted = self
            .rates
            .convert(amount, &self.user.currency, &account.currency)?;
        Ok(Some(converted.round_dp(2)))
    }

    fn owned_expense(&self, id: i64) -> LedgerResult<Expense> {
        match self.db.get_expense_by_id(id).map_err(store_failure)? {
            Some(e) if e.user_id == self.user_id() => Ok(e),
            _ => Err(LedgerError::Rejected(format!("Expense {id} not found"))),
        }
    }

    /// Validate the form and resolve its merchant text.
    ///
    /// `current_account` is the account the expense already sits on; it stays
    /// usable after being archived.
    fn prepare(
        &self,
        form: &ExpenseForm,
        account_id: Option<i64>,
        current_account: Option<i64>,
        today: NaiveDate,
    ) -> LedgerResult<(validate::ValidExpense, Identified, Option<Account>)> {
        let valid = form.validate(today).map_err(LedgerError::Invalid)?;
        let account = account_id
            .map(|id| {
                if current_account == Some(id) {
                    self.user_account(id)
                } else {
                    self.owned_account(id)
                }
            })
            .transpose()?;
        let identified = self.brands.identify(&valid.merchant);
        Ok((valid, identified, account))
    }

    fn check_policies(&mut self, category: &str, amount: Decimal) {
        let rules = match self.db.get_policy_rules() {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!("could not load policy rules: {e:#}");
                return;
            }
        };
        for rule in rules.iter().filter(|r| r.is_violated_by(category, amount)) {
            let limit = rule.max_amount.map(|m| self.format(m)).unwrap_or_default();
            let message = format!("{} exceeds the {} limit of {limit}", self.format(amount), rule.name);
            self.notify("Spending policy", &message, NotificationKind::Warning);
        }
    }

    /// Record a new expense, deducting it from `account_id` when given.
    pub(crate) fn add_expense(
        &mut self,
        form: &ExpenseForm,
        account_id: Option<i64>,
        today: NaiveDate,
    ) -> LedgerResult<String> {
        let (valid, identified, account) = self.prepare(form, account_id, None, today)?;
        let description = if valid.description.is_empty() {
            valid.merchant.clone()
        } else {
            valid.description
        };
        let mut expense = Expense::new(
            self.user_id(),
            valid.amount,
            identified.category.clone(),
            description,
            valid.date,
            account.as_ref().and_then(|a| a.id),
        );
        expense.account_amount = self.account_charge(valid.amount, account.as_ref())?;
        let id = self.db.add_expense(&expense).map_err(store_failure)?;
        tracing::info!(id, category = %identified.category, "expense recorded");

        let message = match &account {
            Some(a) => match expense.account_amount {
                Some(charged) => format!(
                    "{} at {} ({}) from {} ({})",
                    self.format(valid.amount),
                    valid.merchant,
                    identified.category,
                    a.name,
                    currency::format_amount(charged, &a.currency)
                ),
                None => format!(
                    "{} at {} ({}) from {}",
                    self.format(valid.amount),
                    valid.merchant,
                    identified.category,
                    a.name
                ),
            },
            None => format!(
                "{} at {} ({})",
                self.format(valid.amount),
                valid.merchant,
                identified.category
            ),
        };
        self.notify("Expense added", &message, NotificationKind::Success);
        self.check_policies(&identified.category, valid.amount);
        Ok(format!("Added {message}"))
    }

    pub(crate) fn edit_expense(
        &mut self,
        id: i64,
        form: &ExpenseForm,
        account_id: Option<i64>,
        today: NaiveDate,
    ) -> LedgerResult<String> {
        let mut expense = self.owned_expense(id)?;
        let (valid, identified, account) =
            self.prepare(form, account_id, expense.account_id, today)?;
        expense.account_amount = self.account_charge(valid.amount, account.as_ref())?;
        expense.amount = valid.amount;
        expense.category = identified.category.clone();
        expense.description = if valid.description.is_empty() {
            valid.merchant.clone()
        } else {
            valid.description
        };
        expense.date = valid.date;
        expense.account_id = account.and_then(|a| a.id);
        self.db.update_expense(&expense).map_err(store_failure)?;

        let message = format!(
            "{} at {} ({})",
            self.format(valid.amount),
            valid.merchant,
            identified.category
        );
        self.notify("Expense updated", &message, NotificationKind::Info);
        self.check_policies(&identified.category, valid.amount);
        Ok(format!("Updated expense {id}: {message}"))
    }

    /// Delete an expense, refunding its account.
    pub(crate) fn remove_expense(&mut self, id: i64) -> LedgerResult<String> {
        self.owned_expense(id)?;
        let removed = self.db.delete_expense(id).map_err(store_failure)?;
        let message = format!("{} ({})", self.format(removed.amount), removed.category);
        self.notify("Expense deleted", &message, NotificationKind::Info);
        Ok(format!("Deleted expense {id}: {message}"))
    }

    pub(crate) fn expense(&self, id: i64) -> LedgerResult<Expense> {
        self.owned_expense(id)
    }

    pub(crate) fn expenses(&self, filter: &ExpenseFilter) -> LedgerResult<Vec<Expense>> {
        self.db
            .get_expenses(self.user_id(), filter)
            .map_err(store_failure)
    }

    pub(crate) fn expense_count(&self) -> LedgerResult<i64> {
        self.db
            .get_expense_count(self.user_id())
            .map_err(store_failure)
    }

    /// Categories the user has actually spent in.
    pub(crate) fn used_categories(&self) -> LedgerResult<Vec<String>> {
        self.db
            .get_expense_categories(self.user_id())
            .map_err(store_failure)
    }

    /// Spending statistics for `period` ending `today`.
    pub(crate) fn summarize(&self, period: Period, today: NaiveDate) -> LedgerResult<Summary> {
        // Two windows back covers the comparison period too
        let filter = ExpenseFilter {
            since: Some(period.back(period.back(today))),
            until: Some(today),
            ..Default::default()
        };
        Ok(stats::summarize(&self.expenses(&filter)?, period, today))
    }

    pub(crate) fn export_csv(&self, path: &Path) -> LedgerResult<String> {
        let count = self
            .db
            .export_expenses_csv(self.user_id(), path)
            .map_err(store_failure)?;
        Ok(format!("Exported {count} expenses to {}", path.display()))
    }

    // ── Accounts ──────────────────────────────────────────────

    pub(crate) fn accounts(&self) -> LedgerResult<Vec<Account>> {
        self.db.get_accounts(self.user_id()).map_err(store_failure)
    }

    pub(crate) fn add_account(
        &mut self,
        name: &str,
        account_type: AccountType,
        currency: Option<&str>,
        opening_balance: Option<&str>,
    ) -> LedgerResult<String> {
        let name = validate::required_text("Account name", name, validate::MAX_NAME_LEN)?;
        let currency = match currency {
            Some(c) => validate::validate_currency(c)?,
            None => self.user.currency.clone(),
        };
        let mut account = Account::new(self.user_id(), name, account_type, currency);
        if let Some(balance) = opening_balance.filter(|b| !b.trim().is_empty()) {
            account.balance = validate::parse_amount(balance)?;
        }
        let id = self.db.insert_account(&account).map_err(store_failure)?;
        let message = format!("{} ({})", account.name, account.account_type);
        self.notify("Account created", &message, NotificationKind::Success);
        Ok(format!("Created account {id}: {message}"))
    }

    /// The primary account cannot be deleted; expenses drawn from a deleted
    /// account stay on record without an account.
    pub(crate) fn delete_account(&mut self, id: i64) -> LedgerResult<String> {
        let account = self.user_account(id)?;
        if account.is_primary {
            return Err(LedgerError::Rejected(
                "The primary account cannot be deleted".into(),
            ));
        }
        self.db.delete_account(id).map_err(store_failure)?;
        self.notify("Account deleted", &account.name, NotificationKind::Info);
        Ok(format!("Deleted account '{}'", account.name))
    }

    pub(crate) fn set_primary_account(&mut self, id: i64) -> LedgerResult<String> {
        let account = self.owned_account(id)?;
        self.db
            .set_primary_account(self.user_id(), id)
            .map_err(store_failure)?;
        Ok(format!("'{}' is now the primary account", account.name))
    }

    pub(crate) fn primary_account(&self) -> LedgerResult<Option<Account>> {
        self.db
            .get_primary_account(self.user_id())
            .map_err(store_failure)
    }

    /// Rename, recolor, retype, archive or restore an account.
    pub(crate) fn update_account(&mut self, id: i64, form: &AccountForm) -> LedgerResult<String> {
        let mut account = self.user_account(id)?;
        form.apply(&mut account).map_err(LedgerError::Invalid)?;
        if account.is_primary && !account.is_active() {
            return Err(LedgerError::Rejected(
                "The primary account cannot be archived".into(),
            ));
        }
        self.db.update_account(&account).map_err(store_failure)?;
        Ok(format!("Updated account '{}'", account.name))
    }

    /// Overwrite a balance after reconciling it by hand.
    pub(crate) fn set_account_balance(&mut self, id: i64, balance: &str) -> LedgerResult<String> {
        let account = self.owned_account(id)?;
        let balance = validate::parse_balance(balance)?;
        self.db
            .set_account_balance(id, balance)
            .map_err(store_failure)?;
        tracing::info!(id, "account balance reconciled");
        Ok(format!(
            "'{}' balance set to {}",
            account.name,
            currency::format_amount(balance, &account.currency)
        ))
    }

    /// Sum of active account balances in the user's currency.
    ///
    /// Accounts whose currency cannot be converted are counted unconverted
    /// and reported in the second element.
    pub(crate) fn total_balance(&self) -> LedgerResult<(Decimal, Vec<CurrencyError>)> {
        let mut total = Decimal::ZERO;
        let mut problems = Vec::new();
        for account in self.accounts()?.iter().filter(|a| a.is_active()) {
            let (amount, problem) = self.to_user_currency(account.balance, &account.currency);
            total = total.saturating_add(amount);
            problems.extend(problem);
        }
        Ok((total, problems))
    }

    // ── Currency ──────────────────────────────────────────────

    /// Convert into the user's currency, falling back to the unconverted
    /// amount when no rate is available.
    pub(crate) fn to_user_currency(&self, amount: Decimal, from: &str) -> (Decimal, Option<CurrencyError>) {
        match self.rates.convert(amount, from, &self.user.currency) {
            Ok(converted) => (converted, None),
            Err(e) => {
                tracing::warn!(from, to = %self.user.currency, "conversion failed: {e}");
                (amount, Some(e))
            }
        }
    }

    pub(crate) fn convert(&self, amount: Decimal, from: &str, to: &str) -> LedgerResult<String> {
        let converted = self.rates.convert(amount, from, to)?;
        Ok(format!(
            "{} = {}",
            currency::format_amount(amount, from),
            currency::format_amount(converted, to)
        ))
    }

    // ── Profile ───────────────────────────────────────────────

    pub(crate) fn update_profile(&mut self, form: &ProfileForm) -> LedgerResult<String> {
        let update = form.validate().map_err(LedgerError::Invalid)?;
        let user_id = self.user_id();
        self.db
            .update_profile(user_id, &update)
            .map_err(store_failure)?;
        self.user = self
            .db
            .get_user_by_id(user_id)
            .map_err(store_failure)?
            .ok_or(LedgerError::Store)?;
        self.notify("Profile updated", "", NotificationKind::Success);
        Ok("Profile updated".into())
    }

    pub(crate) fn change_passcode(&mut self, current: &str, new: &str, cost: u32) -> LedgerResult<String> {
        if !PasscodeHash::from_stored(&self.user.passcode_hash).verify(current) {
            return Err(AuthError::InvalidCredentials.into());
        }
        let hash = PasscodeHash::from_raw(new, cost)?;
        self.db
            .update_passcode(self.user_id(), hash.as_str())
            .map_err(store_failure)?;
        self.user.passcode_hash = hash.to_string();
        self.notify("Passcode changed", "", NotificationKind::Info);
        Ok("Passcode changed".into())
    }

    // ── Notifications ─────────────────────────────────────────

    pub(crate) fn mark_notification_read(&mut self, id: i64) -> LedgerResult<bool> {
        self.notifications
            .mark_read(&self.db, id)
            .map_err(store_failure)
    }

    pub(crate) fn mark_all_read(&mut self) -> LedgerResult<()> {
        self.notifications
            .mark_all_read(&self.db)
            .map_err(store_failure)
    }

    pub(crate) fn clear_notifications(&mut self) -> LedgerResult<()> {
        self.notifications.clear(&self.db).map_err(store_failure)
    }

    // ── Admin ─────────────────────────────────────────────────

    /// Store the bundled sample rates and start using them.
    pub(crate) fn update_rates(&mut self) -> LedgerResult<String> {
        self.require_admin()?;
        let count = self
            .db
            .upsert_currency_rates(&currency::sample_rates())
            .map_err(store_failure)?;
        self.rates = RateTable::with_rates(&self.db.get_currency_rates().map_err(store_failure)?);
        tracing::info!(count, "currency rates updated");
        let message = format!("{count} rates updated");
        self.notify("Currency rates", &message, NotificationKind::Success);
        Ok(message)
    }

    pub(crate) fn currency_rates(&self) -> LedgerResult<Vec<CurrencyRate>> {
        self.db.get_currency_rates().map_err(store_failure)
    }

    pub(crate) fn add_policy_rule(
        &mut self,
        name: &str,
        category: &str,
        max_amount: Option<&str>,
    ) -> LedgerResult<String> {
        self.require_admin()?;
        let name = validate::required_text("Rule name", name, validate::MAX_NAME_LEN)?;
        let category = validate::required_text("Category", category, validate::MAX_NAME_LEN)?;
        let max_amount = max_amount.map(validate::parse_amount).transpose()?;
        let rule = PolicyRule::new(name, category, max_amount);
        let id = self.db.insert_policy_rule(&rule).map_err(store_failure)?;
        Ok(format!("Created policy rule {id}: {}", rule.name))
    }

    pub(crate) fn policy_rules(&self) -> LedgerResult<Vec<PolicyRule>> {
        self.db.get_policy_rules().map_err(store_failure)
    }

    pub(crate) fn set_policy_rule_active(&mut self, id: i64, active: bool) -> LedgerResult<String> {
        self.require_admin()?;
        self.db
            .set_policy_rule_active(id, active)
            .map_err(store_failure)?;
        Ok(format!(
            "Policy rule {id} {}",
            if active { "enabled" } else { "disabled" }
        ))
    }

    pub(crate) fn delete_policy_rule(&mut self, id: i64) -> LedgerResult<String> {
        self.require_admin()?;
        self.db.delete_policy_rule(id).map_err(store_failure)?;
        Ok(format!("Policy rule {id} deleted"))
    }

    /// Forget a stored rate; conversions fall back to the built-in table.
    pub(crate) fn delete_currency_rate(&mut self, code: &str) -> LedgerResult<String> {
        self.require_admin()?;
        self.db.delete_currency_rate(code).map_err(store_failure)?;
        self.rates = RateTable::with_rates(&self.db.get_currency_rates().map_err(store_failure)?);
        Ok(format!("Rate for {} removed", code.trim().to_uppercase()))
    }

    pub(crate) fn announce(&mut self, title: &str, body: &str) -> LedgerResult<String> {
        self.require_admin()?;
        let title = validate::required_text("Title", title, validate::MAX_NAME_LEN)?;
        let body = validate::optional_text("Body", body, validate::MAX_DESCRIPTION_LEN)?;
        let id = self
            .db
            .insert_announcement(&Announcement::new(title, body))
            .map_err(store_failure)?;
        Ok(format!("Published announcement {id}"))
    }

    pub(crate) fn announcements(&self, active_only: bool) -> LedgerResult<Vec<Announcement>> {
        self.db
            .get_announcements(active_only)
            .map_err(store_failure)
    }

    pub(crate) fn retract_announcement(&mut self, id: i64) -> LedgerResult<String> {
        self.require_admin()?;
        self.db
            .set_announcement_active(id, false)
            .map_err(store_failure)?;
        Ok(format!("Announcement {id} retracted"))
    }

    pub(crate) fn delete_announcement(&mut self, id: i64) -> LedgerResult<String> {
        self.require_admin()?;
        self.db.delete_announcement(id).map_err(store_failure)?;
        Ok(format!("Announcement {id} deleted"))
    }

    pub(crate) fn add_integration(
        &mut self,
        provider: &str,
        api_key: &str,
        endpoint: &str,
    ) -> LedgerResult<String> {
        self.require_admin()?;
        let provider = validate::required_text("Provider", provider, validate::MAX_NAME_LEN)?;
        let api_key = validate::required_text("API key", api_key, validate::MAX_DESCRIPTION_LEN)?;
        let endpoint = validate::optional_text("Endpoint", endpoint, validate::MAX_DESCRIPTION_LEN)?;
        let integration = Integration::new(provider, api_key, endpoint);
        self.db
            .insert_integration(&integration)
            .map_err(store_failure)?;
        Ok(format!(
            "Saved {} integration (key {})",
            integration.provider,
            integration.masked_key()
        ))
    }

    pub(crate) fn integrations(&self) -> LedgerResult<Vec<Integration>> {
        self.db.get_integrations().map_err(store_failure)
    }

    /// Only stamps the sync time; there is no remote to talk to.
    pub(crate) fn sync_integration(&mut self, id: i64) -> LedgerResult<String> {
        self.require_admin()?;
        let integration = self
            .integrations()?
            .into_iter()
            .find(|i| i.id == Some(id))
            .ok_or_else(|| LedgerError::Rejected(format!("Integration {id} not found")))?;
        if !integration.enabled {
            return Err(LedgerError::Rejected(format!(
                "{} integration is disabled",
                integration.provider
            )));
        }
        self.db
            .mark_integration_synced(id, &chrono::Utc::now().to_rfc3339())
            .map_err(store_failure)?;
        Ok(format!("{} marked as synced", integration.provider))
    }

    pub(crate) fn set_integration_enabled(&mut self, id: i64, enabled: bool) -> LedgerResult<String> {
        self.require_admin()?;
        self.db
            .set_integration_enabled(id, enabled)
            .map_err(store_failure)?;
        Ok(format!(
            "Integration {id} {}",
            if enabled { "enabled" } else { "disabled" }
        ))
    }

    pub(crate) fn delete_integration(&mut self, id: i64) -> LedgerResult<String> {
        self.require_admin()?;
        self.db.delete_integration(id).map_err(store_failure)?;
        Ok(format!("Integration {id} deleted"))
    }

    pub(crate) fn users(&self) -> LedgerResult<Vec<User>> {
        self.require_admin()?;
        self.db.get_users().map_err(store_failure)
    }

    /// Give another profile administrator access.
    pub(crate) fn grant_admin(&mut self, username: &str) -> LedgerResult<String> {
        self.require_admin()?;
        let user = self
            .db
            .get_user_by_username(username)
            .map_err(store_failure)?
            .ok_or_else(|| LedgerError::Rejected(format!("No profile named '{username}'")))?;
        let id = user.id.ok_or(LedgerError::Store)?;
        self.db.set_admin(id, true).map_err(store_failure)?;
        Ok(format!("'{}' is now an administrator", user.username))
    }
}
