#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub passcode_hash: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub currency: String,
    pub timezone: String,
    /// Either an emoji/initials descriptor or a path to a photo on disk.
    pub avatar: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl User {
    pub fn new(username: String, passcode_hash: String, currency: String) -> Self {
        Self {
            id: None,
            name: username.clone(),
            username,
            passcode_hash,
            email: String::new(),
            phone: String::new(),
            currency,
            timezone: "UTC".into(),
            avatar: String::new(),
            is_admin: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Initials shown when no avatar is set.
    pub fn initials(&self) -> String {
        let source = if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        };
        source
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

/// Editable profile fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub avatar: Option<String>,
}
