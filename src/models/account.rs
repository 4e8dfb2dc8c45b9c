use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Cash,
    Bank,
    EWallet,
    CreditCard,
    Savings,
    Investment,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::EWallet => "E-Wallet",
            Self::CreditCard => "Credit Card",
            Self::Savings => "Savings",
            Self::Investment => "Investment",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cash" => Self::Cash,
            "bank" | "checking" => Self::Bank,
            "e-wallet" | "ewallet" | "wallet" => Self::EWallet,
            "credit card" | "creditcard" | "credit" => Self::CreditCard,
            "savings" => Self::Savings,
            "investment" => Self::Investment,
            _ => Self::Other,
        }
    }

    pub fn all() -> &'static [AccountType] {
        &[
            Self::Cash,
            Self::Bank,
            Self::EWallet,
            Self::CreditCard,
            Self::Savings,
            Self::Investment,
            Self::Other,
        ]
    }

    /// Default swatch used when an account is created without a color.
    pub fn default_color(&self) -> &'static str {
        match self {
            Self::Cash => "#4CAF50",
            Self::Bank => "#2196F3",
            Self::EWallet => "#00BCD4",
            Self::CreditCard => "#F44336",
            Self::Savings => "#FFC107",
            Self::Investment => "#9C27B0",
            Self::Other => "#9E9E9E",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Archived,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("archived") {
            Self::Archived
        } else {
            Self::Active
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub balance: Decimal,
    pub color: String,
    pub is_primary: bool,
    pub status: AccountStatus,
    pub created_at: String,
}

impl Account {
    pub fn new(user_id: i64, name: String, account_type: AccountType, currency: String) -> Self {
        Self {
            id: None,
            user_id,
            name,
            account_type,
            currency,
            balance: Decimal::ZERO,
            color: account_type.default_color().to_string(),
            is_primary: false,
            status: AccountStatus::Active,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The cash account every user starts with. It cannot be deleted.
    pub fn primary(user_id: i64, currency: String) -> Self {
        let mut account = Self::new(user_id, "Cash".into(), AccountType::Cash, currency);
        account.is_primary = true;
        account
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
