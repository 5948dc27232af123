use std::env;

/// One admin principal allowed through the bearer-key check.
#[derive(Debug, Clone)]
pub struct AdminKey {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Transactional-email HTTP API settings. Absent when email is disabled.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub admin_api_keys: Vec<AdminKey>,
    pub email: Option<EmailConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let admin_api_keys = Self::parse_admin_keys(&env::var("ADMIN_API_KEYS")?)?;

        if admin_api_keys.is_empty() {
            return Err("No admin API keys configured. Set ADMIN_API_KEYS.".into());
        }

        // Email is optional; the notifier degrades to log-and-drop without it.
        let email = match env::var("EMAIL_API_URL") {
            Ok(api_url) => Some(EmailConfig {
                api_url,
                api_key: env::var("EMAIL_API_KEY")?,
                from_address: env::var("EMAIL_FROM")?,
            }),
            Err(_) => None,
        };

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            admin_api_keys,
            email,
        })
    }

    /// Parse `ADMIN_API_KEYS`: comma-separated `id:email:token` entries.
    fn parse_admin_keys(raw: &str) -> Result<Vec<AdminKey>, Box<dyn std::error::Error>> {
        let mut keys = Vec::new();

        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let mut parts = entry.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(email), Some(token))
                    if !id.is_empty() && !email.is_empty() && !token.is_empty() =>
                {
                    keys.push(AdminKey {
                        id: id.to_string(),
                        email: email.to_string(),
                        token: token.to_string(),
                    });
                }
                _ => {
                    return Err(
                        format!("Invalid ADMIN_API_KEYS entry '{}', expected id:email:token", entry).into()
                    );
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_key_entries() {
        let keys = Config::parse_admin_keys(
            "ops-1:alice@example.com:s3cret, ops-2:bob@example.com:t0ken"
        ).unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, "ops-1");
        assert_eq!(keys[0].email, "alice@example.com");
        assert_eq!(keys[0].token, "s3cret");
        assert_eq!(keys[1].email, "bob@example.com");
    }

    #[test]
    fn rejects_malformed_admin_key_entry() {
        assert!(Config::parse_admin_keys("ops-1:missing-token").is_err());
        assert!(Config::parse_admin_keys("::").is_err());
    }
}
