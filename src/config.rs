use std::net::IpAddr;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub app_url: String,
    pub jwt_secret: Vec<u8>,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
    pub bootstrap_admin: Option<AdminCredentials>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("STOREFRONT_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STOREFRONT_HOST: {e}"))?;

        let port: u16 = env_or("STOREFRONT_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid STOREFRONT_PORT: {e}"))?;

        let app_url = env_or("STOREFRONT_APP_URL", &format!("http://{host}:{port}"));

        let secret_path = env_or("STOREFRONT_JWT_SECRET_PATH", "data/jwt_secret.key");
        let jwt_secret = load_or_generate_jwt_secret(Path::new(&secret_path))?;

        let log_level = env_or("STOREFRONT_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("STOREFRONT_SMTP_HOST").ok(),
            std::env::var("STOREFRONT_SMTP_PORT").ok(),
            std::env::var("STOREFRONT_SMTP_USER").ok(),
            std::env::var("STOREFRONT_SMTP_PASS").ok(),
            std::env::var("STOREFRONT_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid STOREFRONT_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let bootstrap_admin = match (
            std::env::var("STOREFRONT_ADMIN_EMAIL").ok(),
            std::env::var("STOREFRONT_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            app_url,
            jwt_secret,
            log_level,
            smtp,
            bootstrap_admin,
        })
    }
}

/// Read the signing secret from `path`, generating and persisting a fresh
/// one on first boot. The file holds the secret hex-encoded.
pub fn load_or_generate_jwt_secret(path: &Path) -> Result<Vec<u8>, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let secret = hex::decode(contents.trim())
                .map_err(|e| format!("Invalid JWT secret file {}: {e}", path.display()))?;
            if secret.len() < 32 {
                return Err(format!(
                    "JWT secret file {} holds fewer than 32 bytes",
                    path.display()
                ));
            }
            Ok(secret)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let secret: [u8; 64] = rand::random();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        format!("Failed to create {}: {e}", parent.display())
                    })?;
                }
            }
            std::fs::write(path, hex::encode(secret))
                .map_err(|e| format!("Failed to write JWT secret file {}: {e}", path.display()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                    .map_err(|e| format!("Failed to chmod JWT secret file: {e}"))?;
            }
            Ok(secret.to_vec())
        }
        Err(err) => Err(format!(
            "Failed to read JWT secret file {}: {err}",
            path.display()
        )),
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
