use std::env;
use std::path::{Path, PathBuf};

pub(crate) fn normalize_env_path(value: Option<String>) -> Option<PathBuf> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "undefined" || lowered == "null" {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn resolve_home_dir() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

fn resolve_xdg_state_dir() -> Option<PathBuf> {
    if let Some(path) = normalize_env_path(env::var("XDG_STATE_HOME").ok()) {
        return Some(path);
    }
    resolve_home_dir().map(|home| home.join(".local").join("state"))
}

fn resolve_xdg_data_dir() -> Option<PathBuf> {
    if let Some(path) = normalize_env_path(env::var("XDG_DATA_HOME").ok()) {
        return Some(path);
    }
    resolve_home_dir().map(|home| home.join(".local").join("share"))
}

pub fn resolve_state_dir() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("GEOQUIZ_STATE_DIR").ok()) {
        return path;
    }
    if let Some(path) = resolve_xdg_state_dir() {
        return path.join("geoquiz");
    }
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn resolve_state_path() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("GEOQUIZ_STATE_PATH").ok()) {
        return path;
    }
    resolve_state_dir().join("state.json")
}

/// Explicit env path first, then `catalog.json` under the XDG data dir, then the bundled sample.
pub fn resolve_catalog_path() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("GEOQUIZ_CATALOG_PATH").ok()) {
        return path;
    }
    let mut candidates = Vec::new();
    if let Some(data) = resolve_xdg_data_dir() {
        candidates.push(data.join("geoquiz").join("catalog.json"));
    }
    candidates.push(PathBuf::from("data").join("countries.json"));
    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }
    PathBuf::from("data").join("countries.json")
}

/// Expands a leading `~` so CLI flags behave like shell paths.
pub fn expand_home_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    match (raw.strip_prefix("~/"), resolve_home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        (None, Some(home)) if raw == "~" => home,
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::{expand_home_path, normalize_env_path};
    use std::path::PathBuf;

    #[test]
    fn normalize_env_path_rejects_placeholders() {
        assert_eq!(normalize_env_path(None), None);
        assert_eq!(normalize_env_path(Some("  ".into())), None);
        assert_eq!(normalize_env_path(Some("undefined".into())), None);
        assert_eq!(normalize_env_path(Some("NULL".into())), None);
        assert_eq!(
            normalize_env_path(Some(" /tmp/quiz.json ".into())),
            Some(PathBuf::from("/tmp/quiz.json"))
        );
    }

    #[test]
    fn expand_home_path_leaves_plain_paths() {
        assert_eq!(
            expand_home_path("data/countries.json"),
            PathBuf::from("data/countries.json")
        );
        assert_eq!(expand_home_path("/abs/~/x"), PathBuf::from("/abs/~/x"));
    }
}
