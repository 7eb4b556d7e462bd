use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Env var consulted for the expected write identity when the file leaves it empty.
pub const EXPECTED_USER_ENV: &str = "GRADE_STORE_USER";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default = "ListenerConfig::default_write")]
    pub write: ListenerConfig,
    #[serde(default = "ListenerConfig::default_read")]
    pub read: ListenerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::default_write()
    }
}

impl ListenerConfig {
    fn default_write() -> Self {
        Self { host: "127.0.0.1".into(), port: 8090 }
    }

    fn default_read() -> Self {
        Self { host: "127.0.0.1".into(), port: 8091 }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn normalize(&mut self, name: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("{name}.port must be in 1..=65535"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_admin_host")]
    pub host: String,
    #[serde(default = "default_admin_port")]
    pub port: u16,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { enabled: false, host: default_admin_host(), port: default_admin_port() }
    }
}

impl AdminConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_admin_host() -> String { "127.0.0.1".into() }
fn default_admin_port() -> u16 { 9090 }

/// Identity admitted on the write listener. Only the Basic-auth username is compared.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub expected_user: String,
}

impl AuthConfig {
    /// Fill an empty `expected_user` from `GRADE_STORE_USER`, then `USER`.
    pub fn normalize_from_env(&mut self) {
        if self.expected_user.trim().is_empty() {
            if let Some(user) = [EXPECTED_USER_ENV, "USER"]
                .iter()
                .find_map(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
            {
                self.expected_user = user;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        // An empty identity would admit requests that carry no credentials at all.
        if self.expected_user.trim().is_empty() {
            return Err(anyhow!(
                "auth.expected_user is empty; set it in config.toml or via {EXPECTED_USER_ENV}/USER"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".into() }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Config built only from environment variables, used when no file is present.
/// `WRITE_ADDR` / `READ_ADDR` take the `host:port` form.
pub fn from_env() -> Result<AppConfig> {
    from_vars(|k| std::env::var(k).ok())
}

fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let mut cfg = AppConfig {
        write: ListenerConfig::default_write(),
        read: ListenerConfig::default_read(),
        ..AppConfig::default()
    };
    if let Some(addr) = var("WRITE_ADDR") {
        cfg.write = parse_listener(&addr)?;
    }
    if let Some(addr) = var("READ_ADDR") {
        cfg.read = parse_listener(&addr)?;
    }
    if let Some(format) = var("LOG_FORMAT") {
        cfg.log.format = format;
    }
    cfg.runtime.worker_threads = var("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok());
    Ok(cfg)
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn parse_listener(addr: &str) -> Result<ListenerConfig> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("listener address {addr:?} must be host:port"))?;
    let port = port
        .parse::<u16>()
        .map_err(|e| anyhow!("listener address {addr:?} has a bad port: {e}"))?;
    Ok(ListenerConfig { host: host.to_string(), port })
}

impl AppConfig {
    /// File first, environment as fallback, then normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    /// Only a missing file falls back to the environment; unreadable or
    /// malformed files are errors.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => from_env()?,
            Err(e) => return Err(e.context(format!("failed to load config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.write.normalize("write")?;
        self.read.normalize("read")?;
        if self.write == self.read {
            return Err(anyhow!("write and read listeners must use different addresses"));
        }
        self.auth.normalize_from_env();
        self.auth.validate()?;
        if let Some(0) = self.runtime.worker_threads {
            self.runtime.worker_threads = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [write]
            host = "0.0.0.0"
            port = 7000

            [read]
            host = "0.0.0.0"
            port = 7001

            [admin]
            enabled = true
            port = 9100

            [auth]
            expected_user = "grader"

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.write.addr(), "0.0.0.0:7000");
        assert_eq!(cfg.read.addr(), "0.0.0.0:7001");
        assert!(cfg.admin.enabled);
        assert_eq!(cfg.admin.addr(), "127.0.0.1:9100");
        assert_eq!(cfg.auth.expected_user, "grader");
        assert_eq!(cfg.log.format, "json");
    }

    #[test]
    fn empty_file_takes_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.write.port, 8090);
        assert_eq!(cfg.read.port, 8091);
        assert!(!cfg.admin.enabled);
        assert_eq!(cfg.log.format, "compact");
    }

    #[test]
    fn same_address_for_both_listeners_is_rejected() {
        let mut cfg = parse(
            r#"
            [write]
            host = "127.0.0.1"
            port = 7000
            [read]
            host = "127.0.0.1"
            port = 7000
            [auth]
            expected_user = "grader"
            "#,
        )
        .unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = parse(
            r#"
            [write]
            host = "127.0.0.1"
            port = 0
            [auth]
            expected_user = "grader"
            "#,
        )
        .unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_expected_user_fails_validation() {
        let auth = AuthConfig { expected_user: "  ".into() };
        assert!(auth.validate().is_err());
        let auth = AuthConfig { expected_user: "grader".into() };
        assert!(auth.validate().is_ok());
    }

    fn temp_config(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("grade_store_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn malformed_file_is_an_error_not_an_env_fallback() {
        let path = temp_config("malformed", "[auth]\nexpected_user = \"admin\"\n[write\n");
        let res = AppConfig::load_and_validate_from(&path);
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
    }

    #[test]
    fn file_identity_is_kept() {
        let path = temp_config("valid", "[auth]\nexpected_user = \"admin\"\n");
        let res = AppConfig::load_and_validate_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(res.unwrap().auth.expected_user, "admin");
    }

    #[test]
    fn missing_file_is_recognised() {
        let err = load_from_file("/nonexistent/grade_store/config.toml").unwrap_err();
        assert!(is_not_found(&err));
        let err = parse("[write").unwrap_err();
        assert!(!is_not_found(&err));
    }

    #[test]
    fn env_vars_override_listener_defaults() {
        let cfg = from_vars(|k| match k {
            "WRITE_ADDR" => Some("0.0.0.0:7100".to_string()),
            "READ_ADDR" => Some("0.0.0.0:7101".to_string()),
            "TOKIO_WORKER_THREADS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.write.addr(), "0.0.0.0:7100");
        assert_eq!(cfg.read.addr(), "0.0.0.0:7101");
        assert_eq!(cfg.runtime.worker_threads, Some(2));
        assert_eq!(cfg.log.format, "compact");

        let cfg = from_vars(|_| None).unwrap();
        assert_eq!(cfg.write.port, 8090);
        assert_eq!(cfg.read.port, 8091);

        assert!(from_vars(|k| (k == "WRITE_ADDR").then(|| "bad".to_string())).is_err());
    }

    #[test]
    fn listener_address_parsing() {
        let l = parse_listener("0.0.0.0:8123").unwrap();
        assert_eq!(l.host, "0.0.0.0");
        assert_eq!(l.port, 8123);
        assert!(parse_listener("no-port").is_err());
        assert!(parse_listener("host:notaport").is_err());
    }
}
