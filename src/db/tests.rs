#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fresh database with one user. Returns (db, user_id, primary_account_id).
fn setup() -> (Database, i64, i64) {
    let mut db = Database::open_in_memory().unwrap();
    let user = User::new("jane".into(), "hash".into(), "PHP".into());
    let user_id = db.create_user(&user).unwrap();
    let primary = db.get_primary_account(user_id).unwrap().unwrap();
    (db, user_id, primary.id.unwrap())
}

fn expense(user_id: i64, amount: Decimal, category: &str, account_id: Option<i64>) -> Expense {
    Expense::new(
        user_id,
        amount,
        category.into(),
        String::new(),
        date(2024, 6, 10),
        account_id,
    )
}

fn balance(db: &Database, account_id: i64) -> Decimal {
    db.get_account_by_id(account_id).unwrap().unwrap().balance
}

// ── Users ─────────────────────────────────────────────────────

#[test]
fn test_create_user_makes_primary_account() {
    let (db, user_id, _) = setup();
    let accounts = db.get_accounts(user_id).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Cash");
    assert!(accounts[0].is_primary);
    assert_eq!(accounts[0].currency, "PHP");
    assert_eq!(accounts[0].balance, Decimal::ZERO);
}

#[test]
fn test_username_unique_case_insensitive() {
    let (mut db, _, _) = setup();
    let dup = User::new("JANE".into(), "hash".into(), "USD".into());
    let err = db.create_user(&dup).unwrap_err();
    assert!(err.to_string().contains("already taken"));
    assert_eq!(db.get_users().unwrap().len(), 1);
}

#[test]
fn test_get_user_by_username() {
    let (db, user_id, _) = setup();
    let user = db.get_user_by_username("Jane").unwrap().unwrap();
    assert_eq!(user.id, Some(user_id));
    assert!(db.get_user_by_username("nobody").unwrap().is_none());
}

#[test]
fn test_update_profile_partial() {
    let (db, user_id, _) = setup();
    let update = ProfileUpdate {
        email: Some("jane@example.com".into()),
        currency: Some("USD".into()),
        ..Default::default()
    };
    db.update_profile(user_id, &update).unwrap();
    let user = db.get_user_by_id(user_id).unwrap().unwrap();
    assert_eq!(user.email, "jane@example.com");
    assert_eq!(user.currency, "USD");
    // Untouched fields keep their values
    assert_eq!(user.name, "jane");
    assert_eq!(user.timezone, "UTC");
}

#[test]
fn test_update_profile_unknown_user() {
    let (db, _, _) = setup();
    assert!(db.update_profile(999, &ProfileUpdate::default()).is_err());
}

#[test]
fn test_update_passcode_and_admin() {
    let (db, user_id, _) = setup();
    db.update_passcode(user_id, "new-hash").unwrap();
    db.set_admin(user_id, true).unwrap();
    let user = db.get_user_by_id(user_id).unwrap().unwrap();
    assert_eq!(user.passcode_hash, "new-hash");
    assert!(user.is_admin);
}

// ── Accounts ──────────────────────────────────────────────────

#[test]
fn test_account_crud() {
    let (db, user_id, _) = setup();
    let mut wallet = Account::new(user_id, "GCash".into(), AccountType::EWallet, "PHP".into());
    let id = db.insert_account(&wallet).unwrap();
    wallet.id = Some(id);

    let fetched = db.get_account_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.account_type, AccountType::EWallet);
    assert_eq!(fetched.color, "#00BCD4");

    wallet.name = "Maya".into();
    wallet.status = AccountStatus::Archived;
    db.update_account(&wallet).unwrap();
    let fetched = db.get_account_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.name, "Maya");
    assert!(!fetched.is_active());

    // Primary sorts first
    let all = db.get_accounts(user_id).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].is_primary);
}

#[test]
fn test_account_by_id_not_found() {
    let (db, _, _) = setup();
    assert!(db.get_account_by_id(99999).unwrap().is_none());
}

#[test]
fn test_primary_account_cannot_be_deleted() {
    let (db, user_id, primary_id) = setup();
    let err = db.delete_account(primary_id).unwrap_err();
    assert!(err.to_string().contains("primary"));
    assert_eq!(db.get_accounts(user_id).unwrap().len(), 1);
}

#[test]
fn test_set_primary_account_moves_flag() {
    let (mut db, user_id, primary_id) = setup();
    let bank = Account::new(user_id, "BDO".into(), AccountType::Bank, "PHP".into());
    let bank_id = db.insert_account(&bank).unwrap();

    db.set_primary_account(user_id, bank_id).unwrap();
    assert_eq!(
        db.get_primary_account(user_id).unwrap().unwrap().id,
        Some(bank_id)
    );
    assert!(!db.get_account_by_id(primary_id).unwrap().unwrap().is_primary);

    // The old cash account is now an ordinary account
    db.delete_account(primary_id).unwrap();
}

#[test]
fn test_set_primary_account_rejects_foreign_account() {
    let (mut db, user_id, primary_id) = setup();
    let other = User::new("joe".into(), "hash".into(), "USD".into());
    let other_id = db.create_user(&other).unwrap();
    let other_primary = db.get_primary_account(other_id).unwrap().unwrap();

    assert!(db
        .set_primary_account(user_id, other_primary.id.unwrap())
        .is_err());
    // Rolled back: the original flag is intact
    assert!(db.get_account_by_id(primary_id).unwrap().unwrap().is_primary);
}

#[test]
fn test_delete_account_detaches_expenses() {
    let (mut db, user_id, _) = setup();
    let card = Account::new(user_id, "Visa".into(), AccountType::CreditCard, "PHP".into());
    let card_id = db.insert_account(&card).unwrap();
    let eid = db
        .add_expense(&expense(user_id, dec!(500), "Shopping", Some(card_id)))
        .unwrap();

    db.delete_account(card_id).unwrap();
    let e = db.get_expense_by_id(eid).unwrap().unwrap();
    assert_eq!(e.account_id, None);
    assert_eq!(e.amount, dec!(500));
}

// ── Expenses and balances ─────────────────────────────────────

#[test]
fn test_add_expense_deducts_balance() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, dec!(1000)).unwrap();

    db.add_expense(&expense(user_id, dec!(150.25), "Food & Dining", Some(cash)))
        .unwrap();
    assert_eq!(balance(&db, cash), dec!(849.75));
}

#[test]
fn test_balance_may_go_negative() {
    let (mut db, user_id, cash) = setup();
    db.add_expense(&expense(user_id, dec!(20), "Other", Some(cash)))
        .unwrap();
    assert_eq!(balance(&db, cash), dec!(-20));
}

#[test]
fn test_add_expense_without_account() {
    let (mut db, user_id, cash) = setup();
    db.add_expense(&expense(user_id, dec!(20), "Other", None))
        .unwrap();
    assert_eq!(balance(&db, cash), Decimal::ZERO);
    assert_eq!(db.get_expense_count(user_id).unwrap(), 1);
}

#[test]
fn test_add_expense_missing_account_rolls_back() {
    let (mut db, user_id, _) = setup();
    assert!(db
        .add_expense(&expense(user_id, dec!(20), "Other", Some(4242)))
        .is_err());
    assert_eq!(db.get_expense_count(user_id).unwrap(), 0);
}

#[test]
fn test_add_expense_rejects_other_users_account() {
    let (mut db, user_id, _) = setup();
    let other_id = db
        .create_user(&User::new("joe".into(), "hash".into(), "USD".into()))
        .unwrap();
    let other_cash = db.get_primary_account(other_id).unwrap().unwrap();
    let other_cash_id = other_cash.id.unwrap();

    assert!(db
        .add_expense(&expense(user_id, dec!(20), "Other", Some(other_cash_id)))
        .is_err());
    assert_eq!(balance(&db, other_cash_id), Decimal::ZERO);
    assert_eq!(db.get_expense_count(user_id).unwrap(), 0);
}

#[test]
fn test_add_expense_rejects_negative_amount() {
    let (mut db, user_id, cash) = setup();
    assert!(db
        .add_expense(&expense(user_id, dec!(-5), "Other", Some(cash)))
        .is_err());
    assert_eq!(balance(&db, cash), Decimal::ZERO);
}

#[test]
fn test_update_expense_moves_between_accounts() {
    let (mut db, user_id, cash) = setup();
    let bank_id = db
        .insert_account(&Account::new(user_id, "BDO".into(), AccountType::Bank, "PHP".into()))
        .unwrap();
    db.set_account_balance(cash, dec!(100)).unwrap();
    db.set_account_balance(bank_id, dec!(1000)).unwrap();

    let id = db
        .add_expense(&expense(user_id, dec!(40), "Groceries", Some(cash)))
        .unwrap();
    assert_eq!(balance(&db, cash), dec!(60));

    let mut e = db.get_expense_by_id(id).unwrap().unwrap();
    e.amount = dec!(75);
    e.account_id = Some(bank_id);
    e.description = "Weekly shop".into();
    db.update_expense(&e).unwrap();

    assert_eq!(balance(&db, cash), dec!(100));
    assert_eq!(balance(&db, bank_id), dec!(925));
    let stored = db.get_expense_by_id(id).unwrap().unwrap();
    assert_eq!(stored.amount, dec!(75));
    assert_eq!(stored.description, "Weekly shop");
}

#[test]
fn test_update_expense_same_account_applies_difference() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, dec!(100)).unwrap();
    let id = db
        .add_expense(&expense(user_id, dec!(30), "Groceries", Some(cash)))
        .unwrap();
    let mut e = db.get_expense_by_id(id).unwrap().unwrap();
    e.amount = dec!(10);
    db.update_expense(&e).unwrap();
    assert_eq!(balance(&db, cash), dec!(90));
}

#[test]
fn test_update_expense_bad_account_rolls_back() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, dec!(100)).unwrap();
    let id = db
        .add_expense(&expense(user_id, dec!(30), "Groceries", Some(cash)))
        .unwrap();
    let mut e = db.get_expense_by_id(id).unwrap().unwrap();
    e.account_id = Some(4242);
    assert!(db.update_expense(&e).is_err());
    // The refund to cash was rolled back along with the failed deduction
    assert_eq!(balance(&db, cash), dec!(70));
    assert_eq!(
        db.get_expense_by_id(id).unwrap().unwrap().account_id,
        Some(cash)
    );
}

#[test]
fn test_update_expense_not_found() {
    let (mut db, user_id, _) = setup();
    let mut e = expense(user_id, dec!(1), "Other", None);
    e.id = Some(777);
    assert!(db.update_expense(&e).is_err());
}

#[test]
fn test_delete_expense_refunds() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, dec!(100)).unwrap();
    let id = db
        .add_expense(&expense(user_id, dec!(30), "Groceries", Some(cash)))
        .unwrap();
    let removed = db.delete_expense(id).unwrap();
    assert_eq!(removed.amount, dec!(30));
    assert_eq!(balance(&db, cash), dec!(100));
    assert!(db.get_expense_by_id(id).unwrap().is_none());
    assert!(db.delete_expense(id).is_err());
}

#[test]
fn test_converted_charge_is_refunded_exactly() {
    let (mut db, user_id, cash) = setup();
    let mut e = expense(user_id, dec!(560), "Food & Dining", Some(cash));
    e.account_amount = Some(dec!(9.20));
    let id = db.add_expense(&e).unwrap();
    assert_eq!(balance(&db, cash), dec!(-9.20));
    assert_eq!(db.get_expense_by_id(id).unwrap().unwrap().account_amount, Some(dec!(9.20)));

    e.id = Some(id);
    e.account_amount = Some(dec!(18.40));
    db.update_expense(&e).unwrap();
    assert_eq!(balance(&db, cash), dec!(-18.40));

    db.delete_expense(id).unwrap();
    assert_eq!(balance(&db, cash), Decimal::ZERO);
}

#[test]
fn test_balance_overflow_rolls_back() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, Decimal::MIN).unwrap();
    let result = db.add_expense(&expense(user_id, dec!(1), "Other", Some(cash)));
    assert!(result.is_err());
    assert_eq!(balance(&db, cash), Decimal::MIN);
    assert!(db
        .get_expenses(user_id, &ExpenseFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_decimal_precision_preserved() {
    let (mut db, user_id, cash) = setup();
    db.set_account_balance(cash, dec!(0.30)).unwrap();
    for _ in 0..3 {
        db.add_expense(&expense(user_id, dec!(0.10), "Other", Some(cash)))
            .unwrap();
    }
    assert_eq!(balance(&db, cash), Decimal::ZERO);
}

// ── Expense queries ───────────────────────────────────────────

#[test]
fn test_get_expenses_filters() {
    let (mut db, user_id, cash) = setup();
    let mut a = expense(user_id, dec!(10), "Food & Dining", Some(cash));
    a.description = "Jollibee lunch".into();
    a.date = date(2024, 6, 1);
    let mut b = expense(user_id, dec!(20), "Transportation", None);
    b.description = "Grab to office".into();
    b.date = date(2024, 6, 5);
    let mut c = expense(user_id, dec!(30), "Food & Dining", None);
    c.date = date(2024, 6, 9);
    for e in [&a, &b, &c] {
        db.add_expense(e).unwrap();
    }

    let all = db.get_expenses(user_id, &ExpenseFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    // Newest first
    assert_eq!(all[0].date, date(2024, 6, 9));

    let food = db
        .get_expenses(
            user_id,
            &ExpenseFilter {
                category: Some("food & dining".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(food.len(), 2);

    let search = db
        .get_expenses(
            user_id,
            &ExpenseFilter {
                search: Some("grab".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].category, "Transportation");

    let ranged = db
        .get_expenses(
            user_id,
            &ExpenseFilter {
                since: Some(date(2024, 6, 2)),
                until: Some(date(2024, 6, 8)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ranged.len(), 1);

    let by_account = db
        .get_expenses(
            user_id,
            &ExpenseFilter {
                account_id: Some(cash),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(by_account.len(), 1);

    let limited = db
        .get_expenses(
            user_id,
            &ExpenseFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn test_expenses_scoped_to_user() {
    let (mut db, user_id, _) = setup();
    let other_id = db
        .create_user(&User::new("joe".into(), "hash".into(), "USD".into()))
        .unwrap();
    db.add_expense(&expense(user_id, dec!(1), "Other", None))
        .unwrap();
    db.add_expense(&expense(other_id, dec!(2), "Travel", None))
        .unwrap();
    assert_eq!(
        db.get_expenses(other_id, &ExpenseFilter::default())
            .unwrap()
            .len(),
        1
    );
    assert_eq!(db.get_expense_categories(other_id).unwrap(), vec!["Travel"]);
}

#[test]
fn test_get_expense_categories_distinct() {
    let (mut db, user_id, _) = setup();
    for cat in ["Travel", "Groceries", "Travel"] {
        db.add_expense(&expense(user_id, dec!(1), cat, None)).unwrap();
    }
    assert_eq!(
        db.get_expense_categories(user_id).unwrap(),
        vec!["Groceries", "Travel"]
    );
}

#[test]
fn test_export_expenses_csv() {
    let (mut db, user_id, cash) = setup();
    let mut e = expense(user_id, dec!(99.50), "Groceries", Some(cash));
    e.description = "Milk, eggs".into();
    db.add_expense(&e).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = db.export_expenses_csv(user_id, &path).unwrap();
    assert_eq!(count, 1);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,amount,category,description,account"));
    assert_eq!(lines.next(), Some("2024-06-10,99.50,Groceries,\"Milk, eggs\",Cash"));
}

// ── Notifications ─────────────────────────────────────────────

#[test]
fn test_notifications_newest_first_and_read_flags() {
    let (db, user_id, _) = setup();
    for i in 0..3 {
        let n = Notification::new(user_id, format!("n{i}"), String::new(), NotificationKind::Info);
        db.insert_notification(&n).unwrap();
    }
    let list = db.get_notifications(user_id, 10).unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].title, "n2");
    assert!(list.iter().all(|n| !n.is_read));

    db.mark_notification_read(list[0].id.unwrap()).unwrap();
    let list = db.get_notifications(user_id, 10).unwrap();
    assert_eq!(list.iter().filter(|n| n.is_read).count(), 1);

    db.mark_all_notifications_read(user_id).unwrap();
    let list = db.get_notifications(user_id, 10).unwrap();
    assert!(list.iter().all(|n| n.is_read));
}

#[test]
fn test_trim_notifications_keeps_newest() {
    let (db, user_id, _) = setup();
    for i in 0..8 {
        let n = Notification::new(user_id, format!("n{i}"), String::new(), NotificationKind::Success);
        db.insert_notification(&n).unwrap();
    }
    assert_eq!(db.trim_notifications(user_id, 5).unwrap(), 3);
    let list = db.get_notifications(user_id, 100).unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0].title, "n7");
    assert_eq!(list[4].title, "n3");
    assert_eq!(list[0].kind, NotificationKind::Success);

    db.clear_notifications(user_id).unwrap();
    assert!(db.get_notifications(user_id, 100).unwrap().is_empty());
}

// ── Admin tables ──────────────────────────────────────────────

#[test]
fn test_policy_rules() {
    let (db, _, _) = setup();
    let rule = PolicyRule::new("Meal cap".into(), "Food & Dining".into(), Some(dec!(500)));
    let id = db.insert_policy_rule(&rule).unwrap();
    db.insert_policy_rule(&PolicyRule::new("Receipts".into(), "Travel".into(), None))
        .unwrap();

    let rules = db.get_policy_rules().unwrap();
    assert_eq!(rules.len(), 2);
    let cap = rules.iter().find(|r| r.id == Some(id)).unwrap();
    assert_eq!(cap.max_amount, Some(dec!(500)));
    assert!(cap.is_violated_by("food & dining", dec!(501)));

    db.set_policy_rule_active(id, false).unwrap();
    let rules = db.get_policy_rules().unwrap();
    assert!(!rules.iter().find(|r| r.id == Some(id)).unwrap().active);

    db.delete_policy_rule(id).unwrap();
    assert_eq!(db.get_policy_rules().unwrap().len(), 1);
}

#[test]
fn test_currency_rates_upsert() {
    let (mut db, _, _) = setup();
    let stored = db
        .upsert_currency_rates(&[
            CurrencyRate::new("php".into(), dec!(56.45)),
            CurrencyRate::new("EUR".into(), dec!(0.93)),
        ])
        .unwrap();
    assert_eq!(stored, 2);

    db.upsert_currency_rates(&[CurrencyRate::new("PHP".into(), dec!(57))])
        .unwrap();
    let rates = db.get_currency_rates().unwrap();
    assert_eq!(rates.len(), 2);
    let php = rates.iter().find(|r| r.code == "PHP").unwrap();
    assert_eq!(php.rate_per_usd, dec!(57));

    db.delete_currency_rate("eur").unwrap();
    assert_eq!(db.get_currency_rates().unwrap().len(), 1);
}

#[test]
fn test_integrations() {
    let (db, _, _) = setup();
    let id = db
        .insert_integration(&Integration::new(
            "Xero".into(),
            "sk_live_12345678".into(),
            "https://api.xero.com".into(),
        ))
        .unwrap();

    db.mark_integration_synced(id, "2024-06-15T10:00:00Z").unwrap();
    let list = db.get_integrations().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].last_synced.as_deref(), Some("2024-06-15T10:00:00Z"));
    assert_eq!(list[0].masked_key(), "************5678");

    db.set_integration_enabled(id, false).unwrap();
    assert!(db.mark_integration_synced(id, "2024-06-16T10:00:00Z").is_err());

    db.delete_integration(id).unwrap();
    assert!(db.get_integrations().unwrap().is_empty());
}

#[test]
fn test_announcements_active_filter() {
    let (db, _, _) = setup();
    let first = db
        .insert_announcement(&Announcement::new("Welcome".into(), "Hello".into()))
        .unwrap();
    db.insert_announcement(&Announcement::new("Maintenance".into(), "Sunday".into()))
        .unwrap();

    db.set_announcement_active(first, false).unwrap();
    let active = db.get_announcements(true).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Maintenance");
    assert_eq!(db.get_announcements(false).unwrap().len(), 2);

    db.delete_announcement(first).unwrap();
    assert_eq!(db.get_announcements(false).unwrap().len(), 1);
}

// ── Migration ─────────────────────────────────────────────────

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlog.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.create_user(&User::new("jane".into(), "hash".into(), "PHP".into()))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_users().unwrap().len(), 1);
}

#[test]
fn test_version_one_database_gains_account_amount() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlog.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(super::schema::SCHEMA_V1).unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
            .unwrap();
    }
    let mut db = Database::open(&path).unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 2);

    let user_id = db
        .create_user(&User::new("jane".into(), "hash".into(), "PHP".into()))
        .unwrap();
    let cash = db.get_primary_account(user_id).unwrap().unwrap().id;
    let mut e = expense(user_id, dec!(100), "Other", cash);
    e.account_amount = Some(dec!(2));
    let id = db.add_expense(&e).unwrap();
    assert_eq!(db.get_expense_by_id(id).unwrap().unwrap().account_amount, Some(dec!(2)));
}
