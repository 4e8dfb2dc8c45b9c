mod account;
mod admin;
mod expense;
mod notification;
mod user;

pub use account::{Account, AccountStatus, AccountType};
pub use admin::{Announcement, CurrencyRate, Integration, PolicyRule};
pub use expense::Expense;
pub use notification::{Notification, NotificationKind};
pub use user::{ProfileUpdate, User};
