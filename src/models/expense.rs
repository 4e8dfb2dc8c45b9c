use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    /// Always non-negative; an expense is money leaving the account.
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub account_id: Option<i64>,
    /// What the account was charged, in the account's currency. `None` when
    /// that equals `amount`.
    pub account_amount: Option<Decimal>,
    pub created_at: String,
}

impl Expense {
    pub fn new(
        user_id: i64,
        amount: Decimal,
        category: String,
        description: String,
        date: NaiveDate,
        account_id: Option<i64>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            amount,
            category,
            description,
            date,
            account_id,
            account_amount: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The balance change this expense causes on its account.
    pub fn charged(&self) -> Decimal {
        self.account_amount.unwrap_or(self.amount)
    }
}
