use anyhow::{Context, Result};
use std::path::Path;

use super::{flag_value, positional, read_passcode, shellexpand, Env};
use crate::auth::{self, PasscodeHash};
use crate::currency;
use crate::db::ExpenseFilter;
use crate::ledger::{AccountForm, Ledger, ProfileForm};
use crate::models::{AccountStatus, AccountType, Expense};
use crate::stats::{self, Period};
use crate::ui::util::{short_timestamp, truncate};
use crate::validate::{self, ExpenseForm};

pub(crate) fn as_cli(args: &[String], env: &Env) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "register" => cli_register(rest, env),
        "identify" | "id" => cli_identify(rest, env),
        "currencies" => cli_currencies(),
        "categories" => with_ledger(env, cli_categories),
        "paths" => cli_paths(env),
        "add" | "a" => with_ledger(env, |l| cli_add(rest, l)),
        "edit" => with_ledger(env, |l| cli_edit(rest, l)),
        "rm" | "delete" => with_ledger(env, |l| cli_remove(rest, l)),
        "list" | "ls" => with_ledger(env, |l| cli_list(rest, l)),
        "summary" | "s" => with_ledger(env, |l| cli_summary(rest, l)),
        "accounts" => with_ledger(env, cli_accounts),
        "account" => with_ledger(env, |l| cli_account(rest, l)),
        "convert" => with_ledger(env, |l| cli_convert(rest, l)),
        "notifications" | "n" => with_ledger(env, |l| cli_notifications(rest, l)),
        "profile" => with_ledger(env, |l| cli_profile(rest, l)),
        "passcode" => with_ledger(env, cli_passcode),
        "export" => with_ledger(env, |l| cli_export(rest, l)),
        "admin" => with_ledger(env, |l| cli_admin(rest, l)),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendlog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn with_ledger(env: &Env, f: impl FnOnce(&mut Ledger) -> Result<()>) -> Result<()> {
    let mut ledger = env.sign_in()?;
    f(&mut ledger)
}

fn print_usage() {
    println!("spendlog: local expense tracker");
    println!();
    println!("Usage: spendlog [--user <name>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch the dashboard");
    println!("  register <username>             Create a profile");
    println!("    --currency <code>             Profile currency (default: from config)");
    println!("  identify <text>                 Show the category a merchant resolves to");
    println!("  currencies                      List supported currencies");
    println!("  categories                      List categories and the ones in use");
    println!("  paths                           Show where data, config and logs live");
    println!("  add <amount> <merchant...>      Record an expense");
    println!("    --date <YYYY-MM-DD>           Expense date (default: today)");
    println!("    --note <text>                 Description");
    println!("    --account <id>                Account to deduct from (default: primary)");
    println!("    --no-account                  Do not deduct from any account");
    println!("  edit <id> <amount> <merchant...> Replace an expense (same flags as add)");
    println!("  rm <id>                         Delete an expense and refund its account");
    println!("  list                            List expenses");
    println!("    --limit <n> --category <c> --search <s> --account <id>");
    println!("  summary [1D|1W|1M|3M|1Y]        Spending statistics (default: 1M)");
    println!("  accounts                        List accounts");
    println!("  account add <name>              Create an account");
    println!("    --type <type> --currency <code> --balance <amount>");
    println!("  account edit <id>               Change an account");
    println!("    --name --type --color <#RRGGBB> --archive --restore");
    println!("  account balance <id> <amount>   Reconcile an account balance");
    println!("  account rm <id>                 Delete an account");
    println!("  account primary <id>            Make an account the primary one");
    println!("  convert <amount> <from> <to>    Convert between currencies");
    println!("  notifications [--read|--clear]  Show notification history");
    println!("  profile                         Show or update the profile");
    println!("    --name --email --phone --currency --timezone --avatar");
    println!("  passcode                        Change the passcode");
    println!("  export [path]                   Export expenses to CSV");
    println!("  admin rates                     Store the sample currency rates");
    println!("  admin policy <name> <category> [max]  Add a spending policy rule");
    println!("  admin policy-off|policy-on|policy-rm <id>  Disable, enable or delete a rule");
    println!("  admin rate-rm <code>            Remove a stored currency rate");
    println!("  admin announce <title> [body]   Publish an announcement");
    println!("  admin retract|announce-rm <id>  Hide or delete an announcement");
    println!("  admin integration <provider> <key> [endpoint]  Save integration credentials");
    println!("  admin integration-on|integration-off|integration-rm <id>");
    println!("  admin sync <id>                 Mark an integration as synced");
    println!("  admin users                     List profiles");
    println!("  admin grant <username>          Give a profile administrator access");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
    raw.parse()
        .with_context(|| format!("Not a valid id: {raw}"))
}

fn cli_register(args: &[String], env: &Env) -> Result<()> {
    let pos = positional(args, &["--currency"]);
    let username = pos
        .first()
        .copied()
        .or(env.username)
        .ok_or_else(|| anyhow::anyhow!("Usage: spendlog register <username> [--currency <code>]"))?;
    let currency = flag_value(args, "--currency").unwrap_or(&env.config.currency);
    let passcode = read_passcode("Choose a 4-6 digit passcode: ")?;

    let mut db = env.open_db()?;
    let user = auth::register(&mut db, username, &passcode, currency, PasscodeHash::DEFAULT_COST)?;
    println!("Created profile '{}' ({})", user.username, user.currency);
    if user.is_admin {
        println!("This is the first profile, so it has administrator access.");
    }
    if env.config.default_user.is_none() {
        let mut config = env.config.clone();
        config.default_user = Some(user.username.clone());
        config.save(&env.paths.config_file)?;
        println!("Saved '{}' as the default profile", user.username);
    }
    Ok(())
}

fn cli_paths(env: &Env) -> Result<()> {
    let paths = env.paths;
    println!("Data:   {}", paths.data_dir.display());
    println!("Config: {}", paths.config_file.display());
    println!("DB:     {}", paths.db_file.display());
    println!("Log:    {}", paths.log_file.display());
    Ok(())
}

fn cli_identify(args: &[String], env: &Env) -> Result<()> {
    let text = args.join(" ");
    let brands = env.brands()?;
    let found = brands.identify(&text);
    println!("{} {}  {}", found.icon, found.category, found.color);
    if let Some(brand) = &found.brand {
        match brands.logo_url(brand) {
            Some(url) => println!("Brand: {brand} ({url})"),
            None => println!("Brand: {brand}"),
        }
    }
    Ok(())
}

fn cli_categories(ledger: &mut Ledger) -> Result<()> {
    let used = ledger.used_categories()?;
    let brands = ledger.brands();
    println!("{:<4} {:<22} {:<9} Used", "", "Category", "Color");
    println!("{}", "─".repeat(44));
    for c in brands.categories() {
        let mark = if used.iter().any(|u| u == &c.name) { "✓" } else { "" };
        println!("{:<4} {:<22} {:<9} {}", c.icon, c.name, c.color, mark);
    }
    // Free-text categories that aren't in the catalogue
    for name in used.iter().filter(|u| brands.categories().iter().all(|c| &c.name != *u)) {
        println!("{:<4} {:<22} {:<9} ✓", "", name, "");
    }
    println!(
        "{} brands across {} categories",
        brands.brand_count(),
        brands.categories().len()
    );
    Ok(())
}

fn cli_currencies() -> Result<()> {
    println!("{:<6} {:<6} Name", "Code", "Symbol");
    println!("{}", "─".repeat(36));
    for c in currency::currencies() {
        println!("{:<6} {:<6} {}", c.code, c.symbol.trim(), c.name);
    }
    Ok(())
}

/// Shared by `add` and `edit`: form text plus the account to deduct from.
///
/// Without `--date` or `--account`, an edited expense keeps its own date and
/// account; a new one gets today and the primary account.
fn expense_form(
    args: &[String],
    ledger: &Ledger,
    existing: Option<&Expense>,
) -> Result<(ExpenseForm, Option<i64>)> {
    let pos = positional(args, &["--date", "--note", "--account"]);
    if pos.len() < 2 {
        anyhow::bail!("An amount and a merchant are required");
    }
    let form = ExpenseForm {
        amount: pos[0].to_string(),
        merchant: pos[1..].join(" "),
        description: flag_value(args, "--note").unwrap_or_default().to_string(),
        date: match (flag_value(args, "--date"), existing) {
            (Some(d), _) => d.to_string(),
            (None, Some(e)) => e.date.format("%Y-%m-%d").to_string(),
            (None, None) => String::new(),
        },
    };
    let account_id = if args.iter().any(|a| a == "--no-account") {
        None
    } else if let Some(raw) = flag_value(args, "--account") {
        Some(parse_id(Some(raw), "--account <id>")?)
    } else if let Some(e) = existing {
        e.account_id
    } else {
        ledger.primary_account()?.and_then(|a| a.id)
    };
    Ok((form, account_id))
}

fn cli_add(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let (form, account_id) = expense_form(args, ledger, None)?;
    println!("{}", ledger.add_expense(&form, account_id, today())?);
    Ok(())
}

fn cli_edit(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let usage = "spendlog edit <id> <amount> <merchant...>";
    let id = parse_id(args.first().map(String::as_str), usage)?;
    let existing = ledger.expense(id)?;
    let (form, account_id) = expense_form(&args[1..], ledger, Some(&existing))?;
    println!("{}", ledger.edit_expense(id, &form, account_id, today())?);
    Ok(())
}

fn cli_remove(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let id = parse_id(args.first().map(String::as_str), "spendlog rm <id>")?;
    println!("{}", ledger.remove_expense(id)?);
    Ok(())
}

fn cli_list(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let filter = ExpenseFilter {
        account_id: flag_value(args, "--account")
            .map(|a| parse_id(Some(a), "--account <id>"))
            .transpose()?,
        category: flag_value(args, "--category").map(String::from),
        search: flag_value(args, "--search").map(String::from),
        limit: Some(
            flag_value(args, "--limit")
                .map(|l| l.parse().with_context(|| format!("Not a number: {l}")))
                .transpose()?
                .unwrap_or(50),
        ),
        ..Default::default()
    };
    let expenses = ledger.expenses(&filter)?;
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    let accounts = ledger.accounts()?;
    println!(
        "{:<5} {:<10} {:>14} {:<20} {:<24} Account",
        "ID", "Date", "Amount", "Category", "Description"
    );
    println!("{}", "─".repeat(90));
    for e in &expenses {
        let account = e
            .account_id
            .and_then(|id| accounts.iter().find(|a| a.id == Some(id)))
            .map(|a| a.name.as_str())
            .unwrap_or("-");
        println!(
            "{:<5} {:<10} {:>14} {:<20} {:<24} {}",
            e.id.unwrap_or(0),
            e.date,
            ledger.format(e.amount),
            truncate(&e.category, 20),
            truncate(&e.description, 24),
            account,
        );
    }
    let total = ledger.expense_count()?;
    if (expenses.len() as i64) < total {
        println!("Showing {} of {total} expenses", expenses.len());
    }
    Ok(())
}

fn cli_summary(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let period = args
        .first()
        .map(|p| Period::parse(p))
        .unwrap_or(Period::Month);
    let summary = ledger.summarize(period, today())?;

    println!(
        "spendlog {} ({} to {})",
        summary.period,
        summary.start.succ_opt().unwrap_or(summary.start),
        summary.end
    );
    println!("{}", "─".repeat(40));
    println!("  Spent:      {}", ledger.format(summary.current_total));
    println!("  Previous:   {}", ledger.format(summary.previous_total));
    println!("  Trend:      {:+}%", summary.trend);
    println!("  Expenses:   {}", summary.count);

    let slices = stats::category_shares(&summary);
    if !slices.is_empty() {
        println!();
        println!("By category:");
        for s in &slices {
            let (icon, _) = ledger.brands().style_for(&s.category);
            println!(
                "  {icon} {:<22} {:>14} {:>6}%",
                s.category,
                ledger.format(s.amount),
                s.percent
            );
        }
    }
    Ok(())
}

fn cli_accounts(ledger: &mut Ledger) -> Result<()> {
    let accounts = ledger.accounts()?;
    println!(
        "{:<4} {:<20} {:<12} {:<5} {:>16} Status",
        "ID", "Name", "Type", "Cur", "Balance"
    );
    println!("{}", "─".repeat(70));
    for acct in &accounts {
        println!(
            "{:<4} {:<20} {:<12} {:<5} {:>16} {}{}",
            acct.id.unwrap_or(0),
            acct.name,
            acct.account_type,
            acct.currency,
            currency::format_amount(acct.balance, &acct.currency),
            acct.status.as_str(),
            if acct.is_primary { " (primary)" } else { "" },
        );
    }
    let (total, problems) = ledger.total_balance()?;
    println!();
    println!("Total: {}", ledger.format(total));
    for p in problems {
        println!("  note: {p}; counted without conversion");
    }
    Ok(())
}

fn cli_account(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let usage = "spendlog account add|edit|balance|rm|primary ...";
    let sub = args.first().map(String::as_str).unwrap_or_default();
    let rest = args.get(1..).unwrap_or_default();
    let message = match sub {
        "add" => {
            let pos = positional(rest, &["--type", "--currency", "--balance"]);
            if pos.is_empty() {
                anyhow::bail!("Usage: spendlog account add <name> [--type <type>] [--currency <code>] [--balance <amount>]");
            }
            let account_type = flag_value(rest, "--type")
                .map(AccountType::parse)
                .unwrap_or(AccountType::Bank);
            ledger.add_account(
                &pos.join(" "),
                account_type,
                flag_value(rest, "--currency"),
                flag_value(rest, "--balance"),
            )?
        }
        "edit" => {
            let id = parse_id(rest.first().map(String::as_str), usage)?;
            let status = if rest.iter().any(|a| a == "--archive") {
                Some(AccountStatus::Archived)
            } else if rest.iter().any(|a| a == "--restore") {
                Some(AccountStatus::Active)
            } else {
                None
            };
            let form = AccountForm {
                name: flag_value(rest, "--name").map(String::from),
                account_type: flag_value(rest, "--type").map(AccountType::parse),
                color: flag_value(rest, "--color").map(String::from),
                status,
            };
            ledger.update_account(id, &form)?
        }
        "balance" => match rest {
            [id, balance] => ledger.set_account_balance(parse_id(Some(id.as_str()), usage)?, balance)?,
            _ => anyhow::bail!("Usage: spendlog account balance <id> <amount>"),
        },
        "rm" | "delete" => {
            ledger.delete_account(parse_id(rest.first().map(String::as_str), usage)?)?
        }
        "primary" => {
            ledger.set_primary_account(parse_id(rest.first().map(String::as_str), usage)?)?
        }
        _ => anyhow::bail!("Usage: {usage}"),
    };
    println!("{message}");
    Ok(())
}

fn cli_convert(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let [amount, from, to] = args else {
        anyhow::bail!("Usage: spendlog convert <amount> <from> <to>");
    };
    let amount = validate::parse_balance(amount)?;
    println!("{}", ledger.convert(amount, from, to)?);
    Ok(())
}

fn cli_notifications(args: &[String], ledger: &mut Ledger) -> Result<()> {
    if args.iter().any(|a| a == "--clear") {
        ledger.clear_notifications()?;
        println!("Notifications cleared");
        return Ok(());
    }
    let center = ledger.notifications();
    if center.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    println!("{} unread of {}", center.unread_count(), center.len());
    for n in center.recent(center.len()) {
        let marker = if n.is_read { " " } else { "•" };
        let when = short_timestamp(&n.created_at);
        if n.message.is_empty() {
            println!("{marker} {} {when}  {}", n.kind.icon(), n.title);
        } else {
            println!("{marker} {} {when}  {}: {}", n.kind.icon(), n.title, n.message);
        }
    }
    if args.iter().any(|a| a == "--read") {
        ledger.mark_all_read()?;
    }
    Ok(())
}

fn cli_profile(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let form = ProfileForm {
        name: flag_value(args, "--name").map(String::from),
        email: flag_value(args, "--email").map(String::from),
        phone: flag_value(args, "--phone").map(String::from),
        currency: flag_value(args, "--currency").map(String::from),
        timezone: flag_value(args, "--timezone").map(String::from),
        avatar: flag_value(args, "--avatar").map(String::from),
    };
    if !args.is_empty() {
        println!("{}", ledger.update_profile(&form)?);
    }
    let user = ledger.user();
    let avatar = if user.avatar.is_empty() {
        user.initials()
    } else {
        user.avatar.clone()
    };
    println!("[{avatar}] {} (@{})", user.name, user.username);
    println!("  Email:     {}", user.email);
    println!("  Phone:     {}", user.phone);
    println!("  Currency:  {}", user.currency);
    println!("  Timezone:  {}", user.timezone);
    if user.is_admin {
        println!("  Role:      administrator");
    }
    Ok(())
}

fn cli_passcode(ledger: &mut Ledger) -> Result<()> {
    let current = read_passcode("Current passcode: ")?;
    let new = read_passcode("New passcode: ")?;
    println!(
        "{}",
        ledger.change_passcode(&current, &new, PasscodeHash::DEFAULT_COST)?
    );
    Ok(())
}

fn cli_export(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/spendlog-export-{}.csv", today())
        });
    println!("{}", ledger.export_csv(Path::new(&output_path))?);
    Ok(())
}

fn cli_admin(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let sub = args.first().map(String::as_str).unwrap_or_default();
    let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
    let message = match (sub, rest.as_slice()) {
        ("rates", _) => {
            let message = ledger.update_rates()?;
            for r in ledger.currency_rates()? {
                println!("  {:<4} {}", r.code, r.rate_per_usd);
            }
            message
        }
        ("policy", [name, category, max @ ..]) => {
            ledger.add_policy_rule(name, category, max.first().copied())?
        }
        ("policy", _) => {
            for r in ledger.policy_rules()? {
                let max = r
                    .max_amount
                    .map(|m| ledger.format(m))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "  {:<4} {:<20} {:<20} {:>14} {}",
                    r.id.unwrap_or(0),
                    r.name,
                    r.category,
                    max,
                    if r.active { "active" } else { "off" }
                );
            }
            return Ok(());
        }
        ("policy-off", [id]) => {
            ledger.set_policy_rule_active(parse_id(Some(*id), "admin policy-off <id>")?, false)?
        }
        ("policy-on", [id]) => {
            ledger.set_policy_rule_active(parse_id(Some(*id), "admin policy-on <id>")?, true)?
        }
        ("policy-rm", [id]) => ledger.delete_policy_rule(parse_id(Some(*id), "admin policy-rm <id>")?)?,
        ("rate-rm", [code]) => ledger.delete_currency_rate(code)?,
        ("announce", [title, body @ ..]) => ledger.announce(title, &body.join(" "))?,
        ("announce", []) => {
            for a in ledger.announcements(true)? {
                println!("  {:<4} {}: {}", a.id.unwrap_or(0), a.title, a.body);
            }
            return Ok(());
        }
        ("integration", [provider, key, endpoint @ ..]) => {
            ledger.add_integration(provider, key, endpoint.first().copied().unwrap_or_default())?
        }
        ("retract", [id]) => ledger.retract_announcement(parse_id(Some(*id), "admin retract <id>")?)?,
        ("announce-rm", [id]) => {
            ledger.delete_announcement(parse_id(Some(*id), "admin announce-rm <id>")?)?
        }
        ("integration-on", [id]) => ledger
            .set_integration_enabled(parse_id(Some(*id), "admin integration-on <id>")?, true)?,
        ("integration-off", [id]) => ledger
            .set_integration_enabled(parse_id(Some(*id), "admin integration-off <id>")?, false)?,
        ("integration-rm", [id]) => {
            ledger.delete_integration(parse_id(Some(*id), "admin integration-rm <id>")?)?
        }
        ("integration", _) => {
            for i in ledger.integrations()? {
                println!(
                    "  {:<4} {:<16} {:<20} {}",
                    i.id.unwrap_or(0),
                    i.provider,
                    i.masked_key(),
                    i.last_synced.as_deref().unwrap_or("never synced")
                );
            }
            return Ok(());
        }
        ("sync", [id]) => ledger.sync_integration(parse_id(Some(*id), "admin sync <id>")?)?,
        ("grant", [username]) => ledger.grant_admin(username)?,
        ("users", _) => {
            for u in ledger.users()? {
                println!(
                    "  {:<4} {:<20} {:<5} {}",
                    u.id.unwrap_or(0),
                    u.username,
                    u.currency,
                    if u.is_admin { "admin" } else { "" }
                );
            }
            return Ok(());
        }
        _ => anyhow::bail!("Usage: spendlog admin <subcommand>. See spendlog help"),
    };
    println!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::brands::BrandResolver;
    use crate::db::Database;
    use chrono::NaiveDate;

    fn ledger() -> Ledger {
        let mut db = Database::open_in_memory().unwrap();
        let user = auth::register(&mut db, "jane", "1234", "PHP", 4).unwrap();
        Ledger::new(db, BrandResolver::builtin().unwrap(), user, 50).unwrap()
    }

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_add_form_defaults_to_primary_and_today() {
        let ledger = ledger();
        let primary = ledger.primary_account().unwrap().unwrap().id;
        let (form, account_id) = expense_form(&args("150 Jollibee"), &ledger, None).unwrap();
        assert_eq!(form.amount, "150");
        assert_eq!(form.merchant, "Jollibee");
        assert!(form.date.is_empty());
        assert_eq!(account_id, primary);
    }

    #[test]
    fn test_edit_form_keeps_date_and_account() {
        let mut ledger = ledger();
        ledger
            .add_account("Savings", AccountType::Savings, None, Some("500"))
            .unwrap();
        let savings = ledger
            .accounts()
            .unwrap()
            .into_iter()
            .find(|a| a.name == "Savings")
            .and_then(|a| a.id);
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let form = ExpenseForm {
            amount: "100".into(),
            merchant: "Starbucks".into(),
            description: String::new(),
            date: "2024-06-01".into(),
        };
        ledger.add_expense(&form, savings, today).unwrap();
        let existing = ledger.expenses(&ExpenseFilter::default()).unwrap().remove(0);

        let (form, account_id) =
            expense_form(&args("120 Starbucks"), &ledger, Some(&existing)).unwrap();
        assert_eq!(form.date, "2024-06-01");
        assert_eq!(account_id, savings);

        let id = existing.id.unwrap();
        ledger.edit_expense(id, &form, account_id, today).unwrap();
        let edited = ledger.expense(id).unwrap();
        assert_eq!(edited.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(edited.account_id, savings);
    }

    #[test]
    fn test_edit_form_flags_override_existing() {
        let ledger = ledger();
        let existing = Expense::new(
            1,
            rust_decimal::Decimal::ONE,
            "Food & Dining".into(),
            "Lunch".into(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Some(7),
        );
        let (form, account_id) = expense_form(
            &args("5 Lunch --date 2024-06-03 --no-account"),
            &ledger,
            Some(&existing),
        )
        .unwrap();
        assert_eq!(form.date, "2024-06-03");
        assert_eq!(account_id, None);
    }
}
