//! Flat configuration rows maintained from the admin commands.

use rust_decimal::Decimal;

/// Spending rule for a category. A rule with `max_amount` flags any single
/// expense above it.
#[derive(Debug, Clone)]
pub struct PolicyRule {
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub max_amount: Option<Decimal>,
    pub requires_receipt: bool,
    pub active: bool,
}

impl PolicyRule {
    pub fn new(name: String, category: String, max_amount: Option<Decimal>) -> Self {
        Self {
            id: None,
            name,
            category,
            max_amount,
            requires_receipt: false,
            active: true,
        }
    }

    /// Whether `amount` in `category` breaks this rule.
    pub fn is_violated_by(&self, category: &str, amount: Decimal) -> bool {
        self.active
            && self.category.eq_ignore_ascii_case(category)
            && self.max_amount.is_some_and(|max| amount > max)
    }
}

/// Units of `code` per one US dollar.
#[derive(Debug, Clone)]
pub struct CurrencyRate {
    pub id: Option<i64>,
    pub code: String,
    pub rate_per_usd: Decimal,
    pub updated_at: String,
}

impl CurrencyRate {
    pub fn new(code: String, rate_per_usd: Decimal) -> Self {
        Self {
            id: None,
            code: code.to_uppercase(),
            rate_per_usd,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Credentials for an external accounting package.
#[derive(Debug, Clone)]
pub struct Integration {
    pub id: Option<i64>,
    pub provider: String,
    pub api_key: String,
    pub endpoint: String,
    pub enabled: bool,
    pub last_synced: Option<String>,
}

impl Integration {
    pub fn new(provider: String, api_key: String, endpoint: String) -> Self {
        Self {
            id: None,
            provider,
            api_key,
            endpoint,
            enabled: true,
            last_synced: None,
        }
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let count = self.api_key.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = self.api_key.chars().skip(count - 4).collect();
        format!("{}{tail}", "*".repeat(count - 4))
    }
}

#[derive(Debug, Clone)]
pub struct Announcement {
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub active: bool,
    pub created_at: String,
}

impl Announcement {
    pub fn new(title: String, body: String) -> Self {
        Self {
            id: None,
            title,
            body,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
