mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use crate::auth;
use crate::brands::BrandResolver;
use crate::config::{AppPaths, Config};
use crate::db::Database;
use crate::ledger::Ledger;

/// Supplies the passcode non-interactively, e.g. from scripts.
pub(crate) const PASSCODE_ENV: &str = "SPENDLOG_PASSCODE";

/// Everything a front-end needs before a user signs in.
pub(crate) struct Env<'a> {
    pub(crate) paths: &'a AppPaths,
    pub(crate) config: &'a Config,
    /// `--user` from the command line.
    pub(crate) username: Option<&'a str>,
}

impl Env<'_> {
    pub(crate) fn open_db(&self) -> Result<Database> {
        Database::open(&self.paths.db_file)
    }

    pub(crate) fn brands(&self) -> Result<BrandResolver> {
        BrandResolver::load(self.config.brand_file.as_deref())
    }

    fn username(&self) -> Result<&str> {
        self.username
            .or(self.config.default_user.as_deref())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No user selected. Pass --user <name> or set default_user in {}",
                    self.paths.config_file.display()
                )
            })
    }

    /// Authenticate and open a ledger session.
    pub(crate) fn sign_in(&self) -> Result<Ledger> {
        let username = self.username()?;
        let db = self.open_db()?;
        let passcode = read_passcode(&format!("Passcode for {username}: "))?;
        let user = auth::authenticate(&db, username, &passcode)?;
        tracing::info!(username, "signed in");
        Ok(Ledger::new(
            db,
            self.brands()?,
            user,
            self.config.notification_capacity,
        )?)
    }
}

/// Read a passcode from the environment or, failing that, from stdin.
pub(crate) fn read_passcode(prompt: &str) -> Result<String> {
    if let Ok(passcode) = std::env::var(PASSCODE_ENV) {
        return Ok(passcode);
    }
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read passcode")?;
    Ok(line.trim().to_string())
}

/// Value following `flag`, e.g. `--date 2024-01-31`.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
pub(crate) fn positional<'a>(args: &'a [String], value_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if value_flags.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
