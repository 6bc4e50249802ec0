use std::path::{Path, PathBuf};

use crate::client::ClientConfig;
use crate::error::{Error, Result};

/// Values that win over the environment and the rc file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub custid: Option<String>,
    pub key: Option<String>,
    pub secret_key: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub use_ssl: Option<bool>,
}

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    custid: Option<String>,
    key: Option<String>,
    secret_key: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    use_ssl: Option<bool>,
}

pub(crate) fn load_config(overrides: Overrides) -> Result<ClientConfig> {
    load_config_with(overrides, |name| std::env::var(name).ok())
}

/// `lookup` stands in for the process environment.
fn load_config_with(
    overrides: Overrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let mut custid = overrides.custid.or_else(|| env("LX_CUSTID"));
    let mut key = overrides.key.or_else(|| env("LX_KEY"));
    let mut secret_key = overrides.secret_key.or_else(|| env("LX_SECRET_KEY"));
    let mut host = overrides.host.or_else(|| env("LX_HOST"));
    let mut port = match overrides.port {
        Some(p) => Some(p),
        None => env("LX_PORT").map(|v| parse_port(&v)).transpose()?,
    };
    let mut use_ssl = overrides
        .use_ssl
        .or_else(|| env("LX_USE_SSL").map(|v| parse_bool(&v)));

    let rc_candidates = rc_candidates(env("LX_RC"));
    for rc_path in &rc_candidates {
        if rc_path.exists() {
            let cfg = read_rc(rc_path).map_err(|e| {
                Error::Config(format!(
                    "failed to read configuration file {}: {e}",
                    rc_path.display()
                ))
            })?;
            custid = custid.or(cfg.custid);
            key = key.or(cfg.key);
            secret_key = secret_key.or(cfg.secret_key);
            host = host.or(cfg.host);
            port = port.or(cfg.port);
            use_ssl = use_ssl.or(cfg.use_ssl);
            break;
        }
    }

    let custid = required(custid, "custid", "LX_CUSTID", &rc_candidates)?;
    let key = required(key, "key", "LX_KEY", &rc_candidates)?;
    let secret_key = required(secret_key, "secret_key", "LX_SECRET_KEY", &rc_candidates)?;

    let mut cfg = ClientConfig::new(custid, key, secret_key).with_ssl(use_ssl.unwrap_or(true));
    if let Some(host) = host {
        cfg = cfg.with_host(host);
    }
    cfg.port = port;
    Ok(cfg)
}

fn required(
    value: Option<String>,
    name: &str,
    env_var: &str,
    rc_candidates: &[PathBuf],
) -> Result<String> {
    value.ok_or_else(|| {
        let searched = if rc_candidates.is_empty() {
            ".lxrc".to_string()
        } else {
            rc_candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Error::Config(format!(
            "missing {name} (set {env_var} or put `{name} = ...` in one of: {searched})"
        ))
    })
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid port `{value}`")))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}

fn read_rc(path: &Path) -> std::result::Result<RcConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse_rc(&text)
}

fn parse_rc(text: &str) -> std::result::Result<RcConfig, String> {
    let mut cfg = RcConfig::default();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = split_setting(line) else {
            continue;
        };
        let value = strip_quotes(value);
        if value.is_empty() {
            continue;
        }
        match name {
            "custid" => cfg.custid = Some(value.to_string()),
            "key" => cfg.key = Some(value.to_string()),
            "secret_key" => cfg.secret_key = Some(value.to_string()),
            "host" => cfg.host = Some(value.to_string()),
            "port" => {
                let port = value
                    .parse()
                    .map_err(|_| format!("line {}: invalid port `{value}`", lineno + 1))?;
                cfg.port = Some(port);
            }
            "use_ssl" => cfg.use_ssl = Some(parse_bool(value)),
            _ => {}
        }
    }

    Ok(cfg)
}

/// Accepts `name = value`, `name: value` and `name=value`.
fn split_setting(line: &str) -> Option<(&str, &str)> {
    let at = line.find(['=', ':'])?;
    let name = line[..at].trim();
    let value = line[at + 1..].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value))
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates(explicit: Option<String>) -> Vec<PathBuf> {
    if let Some(p) = explicit {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".lxrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".lxrc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn load(overrides: Overrides, vars: &[(&str, &str)]) -> Result<ClientConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_with(overrides, |name| vars.get(name).cloned())
    }

    #[test]
    fn parses_every_separator_style() {
        let cfg = parse_rc(
            "# credentials\n\
             custid = 1234\n\
             key: \"abcd\"\n\
             secret_key='s3cr3t'\n\
             host = api.example.com\n\
             port = 8080\n\
             use_ssl = no\n\
             unknown = whatever\n",
        )
        .unwrap();

        assert_eq!(
            cfg,
            RcConfig {
                custid: Some("1234".into()),
                key: Some("abcd".into()),
                secret_key: Some("s3cr3t".into()),
                host: Some("api.example.com".into()),
                port: Some(8080),
                use_ssl: Some(false),
            }
        );
    }

    #[test]
    fn bad_port_in_rc_is_an_error() {
        let err = parse_rc("port = eighty\n").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn bool_spellings() {
        assert!(parse_bool("yes"));
        assert!(parse_bool("True"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool("maybe"));
    }

    #[test]
    fn precedence_explicit_env_rc() {
        let mut rc = tempfile::NamedTempFile::new().unwrap();
        writeln!(rc, "custid = from-rc").unwrap();
        writeln!(rc, "key = rc-key").unwrap();
        writeln!(rc, "secret_key = rc-secret").unwrap();
        writeln!(rc, "host = rc.example.com").unwrap();
        writeln!(rc, "use_ssl = false").unwrap();
        let rc_path = rc.path().to_str().unwrap().to_string();

        let cfg = load(
            Overrides {
                custid: Some("explicit".into()),
                ..Default::default()
            },
            &[("LX_RC", &rc_path), ("LX_KEY", "env-key")],
        )
        .unwrap();

        assert_eq!(cfg.custid, "explicit");
        assert_eq!(cfg.key, "env-key");
        assert_eq!(cfg.secret_key, "rc-secret");
        assert_eq!(cfg.host, "rc.example.com");
        assert!(!cfg.use_ssl);
        assert_eq!(cfg.port(), 80);
    }

    #[test]
    fn env_alone_is_enough() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = load(
            Overrides::default(),
            &[
                ("LX_RC", missing.to_str().unwrap()),
                ("LX_CUSTID", "c"),
                ("LX_KEY", "k"),
                ("LX_SECRET_KEY", "s"),
                ("LX_PORT", "8443"),
            ],
        )
        .unwrap();
        assert_eq!(cfg.host, "api.locomatix.com");
        assert!(cfg.use_ssl);
        assert_eq!(cfg.base_url(), "https://api.locomatix.com:8443");
    }

    #[test]
    fn missing_credentials_name_the_env_var_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-lxrc");

        let err = load(Overrides::default(), &[("LX_RC", missing.to_str().unwrap())])
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("LX_CUSTID"), "{msg}");
        assert!(msg.contains("no-such-lxrc"), "{msg}");
    }

    #[test]
    fn env_port_must_be_numeric() {
        let err = load(
            Overrides::default(),
            &[
                ("LX_CUSTID", "c"),
                ("LX_KEY", "k"),
                ("LX_SECRET_KEY", "s"),
                ("LX_PORT", "http"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
