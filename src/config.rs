use std::fs::{self, OpenOptions};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Reads `DATABASE_URL` and `BIND_ADDR`, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::var("DATABASE_URL").ok(), std::env::var("BIND_ADDR").ok())
    }

    pub fn from_vars(database_url: Option<String>, bind_addr: Option<String>) -> anyhow::Result<Self> {
        let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr.parse().with_context(|| format!("invalid BIND_ADDR {bind_addr:?}"))?;
        Ok(Self { database_url, bind_addr })
    }
}

/// File behind a SQLite URL, or `None` for in-memory and non-SQLite URLs.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") { return None; }
    let rest = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    if path.is_empty() { return None; }
    let path = if cfg!(windows) { without_drive_slash(path) } else { path };
    Some(PathBuf::from(path))
}

/// `/C:/data/todos.db` names a drive path; drop the leading slash.
fn without_drive_slash(path: &str) -> &str {
    match path.as_bytes() {
        [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() => &path[1..],
        _ => path,
    }
}

/// Creates the database file and its directory ahead of connecting.
pub fn prepare_sqlite_file(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(database_url) else { return Ok(()) };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_vars(None, None).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_addr.port(), 3000);
    }

    #[test]
    fn rejects_bad_bind_addr() {
        assert!(Settings::from_vars(None, Some("nowhere".into())).is_err());
    }

    #[test]
    fn memory_urls_touch_nothing() {
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://db/todos"), None);
        prepare_sqlite_file("sqlite::memory:").unwrap();
    }

    #[test]
    fn file_path_drops_query_options() {
        assert_eq!(sqlite_file_path("sqlite://data/todos.db?mode=rwc"), Some(PathBuf::from("data/todos.db")));
        assert_eq!(sqlite_file_path("sqlite:todos.db"), Some(PathBuf::from("todos.db")));
        assert_eq!(sqlite_file_path("sqlite://"), None);
    }

    #[test]
    fn drive_paths_lose_their_leading_slash() {
        assert_eq!(without_drive_slash("/C:/data/todos.db"), "C:/data/todos.db");
        assert_eq!(without_drive_slash("/data/todos.db"), "/data/todos.db");
        assert_eq!(without_drive_slash("/1:/x"), "/1:/x");
    }

    #[test]
    fn creates_file_and_parents() {
        let dir = std::env::temp_dir().join(format!("todo-api-{}", uuid::Uuid::new_v4()));
        let file = dir.join("nested").join("todos.db");
        prepare_sqlite_file(&format!("sqlite://{}?mode=rwc", file.display())).unwrap();
        assert!(file.exists());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
