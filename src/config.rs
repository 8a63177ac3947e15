use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// Default OpenCage geocoding endpoint; requests go to `<endpoint>json`.
pub const DEFAULT_ENDPOINT: &str = "https://api.opencagedata.com/geocode/v1/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientConfig {
    /// API key from the OpenCage developer dashboard.
    pub(crate) key: String,
    /// Geocoding endpoint, [`DEFAULT_ENDPOINT`] unless overridden.
    pub(crate) url: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
}

pub(crate) fn load_config(key: Option<String>, url: Option<String>) -> Result<ClientConfig> {
    let key = key.or_else(|| std::env::var("OPENCAGE_API_KEY").ok());
    let url = url.or_else(|| std::env::var("OPENCAGE_URL").ok());
    resolve(key, url, &rc_candidates())
}

fn resolve(
    mut key: Option<String>,
    mut url: Option<String>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    if key.is_none() || url.is_none() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            let text = std::fs::read_to_string(rc_path).with_context(|| {
                format!("failed to read configuration file {}", rc_path.display())
            })?;
            let cfg = parse_rc(&text);
            key = key.or(cfg.key);
            url = url.or(cfg.url);
        }
    }

    let key = match key.filter(|k| !k.trim().is_empty()) {
        Some(v) => v.trim().to_string(),
        None => {
            if !rc_candidates.is_empty() {
                bail!(
                    "Missing configuration: key (set OPENCAGE_API_KEY or put `key:` in one of: {})",
                    display_paths(rc_candidates)
                );
            }
            bail!("Missing configuration: key (set OPENCAGE_API_KEY or create .opencagerc)");
        }
    };

    let url = url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    Ok(ClientConfig { key, url })
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((k, v)) = line.split_once(':') {
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                continue;
            }
            match k.trim() {
                "url" => cfg.url = Some(v.to_string()),
                "key" => cfg.key = Some(v.to_string()),
                _ => {}
            }
        }
    }

    cfg
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

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) OPENCAGE_RC (explicit)
    // 2) ./.opencagerc
    // 3) ~/.opencagerc
    if let Ok(p) = std::env::var("OPENCAGE_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".opencagerc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".opencagerc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rc_lines() {
        let cfg = parse_rc(
            "# OpenCage credentials\n\nkey: \"abc123\"\nurl: http://localhost:9000/geocode/v1/\nverify: 0\n",
        );
        assert_eq!(cfg.key.as_deref(), Some("abc123"));
        assert_eq!(cfg.url.as_deref(), Some("http://localhost:9000/geocode/v1/"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = parse_rc("key:\nurl: ''\n");
        assert_eq!(cfg, RcConfig::default());
    }

    #[test]
    fn explicit_values_win_and_url_defaults() {
        let cfg = resolve(Some(" k ".into()), None, &[]).unwrap();
        assert_eq!(cfg.key, "k");
        assert_eq!(cfg.url, DEFAULT_ENDPOINT);
    }

    #[test]
    fn missing_key_lists_searched_files() {
        let paths = vec![PathBuf::from("/nonexistent/.opencagerc")];
        let err = resolve(None, None, &paths).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OPENCAGE_API_KEY"));
        assert!(msg.contains("/nonexistent/.opencagerc"));
    }

    #[test]
    fn rc_file_fills_missing_values() {
        let path = std::env::temp_dir().join(format!("opencagerc-{}", std::process::id()));
        std::fs::write(&path, "key: from-file\nurl: http://localhost:9000/v1/\n").unwrap();

        let cfg = resolve(None, None, &[path.clone()]).unwrap();
        assert_eq!(cfg.key, "from-file");
        assert_eq!(cfg.url, "http://localhost:9000/v1/");

        let cfg = resolve(Some("explicit".into()), None, &[path.clone()]).unwrap();
        assert_eq!(cfg.key, "explicit");
        assert_eq!(cfg.url, "http://localhost:9000/v1/");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn blank_key_is_missing() {
        assert!(resolve(Some("   ".into()), None, &[]).is_err());
    }
}
