use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use super::{KeyValueStore, StorageError, StorageResult};

pub const COOKIE_MAX_AGE_DAYS: i64 = 365;
const COOKIE_STORE_NAME: &str = "cookie store";
const COOKIE_ROOT_PATH: &str = "/";
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// `None` for session cookies read back from a request header.
    pub expires: Option<DateTime<Utc>>,
    pub path: String,
    pub same_site: SameSite,
}

impl Cookie {
    /// Cookie written by the engine: one year, root path, strict same-site.
    pub fn persistent(name: &str, value: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            expires: Some(now + Duration::days(COOKIE_MAX_AGE_DAYS)),
            path: COOKIE_ROOT_PATH.to_string(),
            same_site: SameSite::Strict,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    pub fn to_set_cookie_header(&self) -> String {
        let mut header = format!("{}={}", self.name, urlencoding::encode(&self.value));
        if let Some(expires) = self.expires {
            header.push_str(&format!("; expires={}", expires.format(HTTP_DATE_FORMAT)));
        }
        header.push_str(&format!("; path={}; SameSite={}", self.path, self.same_site));
        header
    }

    pub fn parse_set_cookie_header(line: &str) -> Option<Self> {
        let mut parts = line.split(';');
        let (name, raw_value) = parts.next()?.trim().split_once('=')?;
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie {
            name: name.to_string(),
            value: decode_value(raw_value)?,
            expires: None,
            path: COOKIE_ROOT_PATH.to_string(),
            same_site: SameSite::default(),
        };

        for attribute in parts {
            let (key, value) = attribute.trim().split_once('=').unwrap_or((attribute.trim(), ""));
            match key.to_ascii_lowercase().as_str() {
                "expires" => {
                    cookie.expires = DateTime::parse_from_rfc2822(value.trim())
                        .ok()
                        .map(|parsed| parsed.with_timezone(&Utc));
                }
                "path" => cookie.path = value.trim().to_string(),
                "samesite" => cookie.same_site = SameSite::parse(value).unwrap_or_default(),
                _ => {}
            }
        }
        Some(cookie)
    }
}

fn decode_value(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|value| value.into_owned())
}

/// Cookie jar adapter.
///
/// Holds cookies in memory; when opened on a file every write is flushed as
/// one `Set-Cookie` line per cookie.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RefCell<BTreeMap<String, Cookie>>,
    path: Option<PathBuf>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a jar from a `name=value; name2=value2` request cookie string.
    pub fn from_cookie_header(header: &str) -> Self {
        let jar = Self::new();
        for pair in header.split(';') {
            let Some((name, raw_value)) = pair.trim().split_once('=') else {
                continue;
            };
            let Some(value) = decode_value(raw_value) else {
                tracing::warn!(cookie = name, "skipping cookie with undecodable value");
                continue;
            };
            jar.insert(Cookie {
                name: name.to_string(),
                value,
                expires: None,
                path: COOKIE_ROOT_PATH.to_string(),
                same_site: SameSite::default(),
            });
        }
        jar
    }

    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let jar = Self {
            cookies: RefCell::new(BTreeMap::new()),
            path: Some(path.clone()),
        };
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(jar),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            match Cookie::parse_set_cookie_header(line) {
                Some(cookie) => jar.insert(cookie),
                None => tracing::warn!(path = %path.display(), line, "skipping malformed cookie line"),
            }
        }
        Ok(jar)
    }

    pub fn insert(&self, cookie: Cookie) {
        self.cookies.borrow_mut().insert(cookie.name.clone(), cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.borrow().get(name).cloned()
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies
            .borrow()
            .values()
            .map(Cookie::to_set_cookie_header)
            .collect()
    }

    fn flush(&self) -> StorageResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        write_lines(path, &self.set_cookie_headers())
    }
}

fn write_lines(path: &Path, lines: &[String]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let mut serialized = lines.join("\n");
    serialized.push('\n');
    fs::write(path, serialized).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl KeyValueStore for CookieJar {
    fn name(&self) -> &'static str {
        COOKIE_STORE_NAME
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let now = Utc::now();
        Ok(self
            .cookies
            .borrow()
            .get(key)
            .filter(|cookie| !cookie.is_expired(now))
            .map(|cookie| cookie.value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.insert(Cookie::persistent(key, value, Utc::now()));
        self.flush()
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.cookies.borrow_mut().remove(key);
        self.flush()
    }
}
