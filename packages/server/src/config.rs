use std::env;

#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Lowercase hex SHA-256 digest of the admin password.
    pub password_sha256: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub admin: Option<AdminConfig>,
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let admin = env::var("ADMIN_USERNAME").ok().and_then(|username| {
            let password_sha256 = env::var("ADMIN_PASSWORD_SHA256")
                .unwrap_or_default()
                .to_lowercase();

            if password_sha256.len() != 64
                || !password_sha256.bytes().all(|b| b.is_ascii_hexdigit())
            {
                tracing::warn!(
                    "ADMIN_USERNAME is set but ADMIN_PASSWORD_SHA256 is missing or not a \
                     hex SHA-256 digest. Falling back to dev mode."
                );
                return None;
            }

            Some(AdminConfig {
                username,
                password_sha256,
            })
        });

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        if admin.is_some() {
            tracing::info!("admin authentication is enabled");
        } else {
            tracing::info!("admin authentication is disabled (dev mode)");
        }

        Self { admin, base_url }
    }

    pub fn is_auth_enabled(&self) -> bool {
        self.admin.is_some()
    }

    pub fn openrouter_callback_url(&self) -> String {
        format!("{}/auth/openrouter/callback", self.base_url)
    }
}
