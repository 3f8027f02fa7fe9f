use serde::{Deserialize, Serialize};

/// Request body for registration and login. Fields are optional so that a
/// missing field is reported the same way as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Trimmed, lower-cased email and the raw password; empty strings for missing fields.
    pub fn normalised(self) -> (String, String) {
        let email = self.email.unwrap_or_default().trim().to_lowercase();
        (email, self.password.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub token: String,
}
