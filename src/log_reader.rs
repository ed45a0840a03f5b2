use crate::error::{Result, StatsError};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://logs.tf/json/";
const USER_AGENT: &str = concat!("logs-stats/", env!("CARGO_PKG_VERSION"));

/// One parsed match log. Every field is optional in the source json; a field
/// with the wrong shape is treated as missing instead of failing the document.
#[derive(Clone, Deserialize, Debug, Default)]
pub struct MatchLog {
    #[serde(default, deserialize_with = "lenient_names")]
    pub names: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub players: BTreeMap<String, PlayerLog>,
    #[serde(default, deserialize_with = "lenient_healspread")]
    pub healspread: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Clone, Deserialize, Debug, Default)]
pub struct PlayerLog {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub class_stats: Vec<ClassStatRecord>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub dmg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub dapm: Option<f64>,
    #[serde(default, rename = "as", deserialize_with = "lenient_number")]
    pub airshots: Option<f64>,
}

impl PlayerLog {
    /// Whole-player value for one of the scalar fields, by its json name.
    pub fn scalar(&self, key: &str) -> Option<f64> {
        match key {
            "dmg" => self.dmg,
            "dapm" => self.dapm,
            "as" => self.airshots,
            _ => None,
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct ClassStatRecord {
    #[serde(rename = "type")]
    pub class: String,
    #[serde(flatten)]
    pub stats: HashMap<String, Value>,
}

impl ClassStatRecord {
    /// Counter value for `key`, truncated to a whole number. Negative or
    /// non-numeric values count as missing.
    pub fn counter(&self, key: &str) -> Option<u64> {
        let value = self.stats.get(key).and_then(number_from_value)?;
        (value >= 0.0).then(|| value as u64)
    }
}

pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn lenient_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_names<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(raw
        .into_iter()
        .map(|(steamid, name)| match name {
            Value::String(name) => (steamid, name),
            _ => (steamid, String::new()),
        })
        .collect())
}

fn lenient_map<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(parsed) => Some((key, parsed)),
            Err(err) => {
                debug!("Skipping malformed entry {}: {}", key, err);
                None
            }
        })
        .collect())
}

fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(raw
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_healspread<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, BTreeMap<String, f64>>, D::Error> {
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(raw
        .into_iter()
        .filter_map(|(healer, targets)| match targets {
            Value::Object(targets) => Some((
                healer,
                targets
                    .into_iter()
                    .filter_map(|(target, heals)| Some((target, number_from_value(&heals)?)))
                    .collect(),
            )),
            _ => None,
        })
        .collect())
}

/// Numeric id of a log. Accepts either the bare id or a log url such as
/// `https://logs.tf/123456#76561198000000000`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LogId(String);

impl LogId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LogId {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let without_suffix = trimmed
            .split(['#', '?'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let id = without_suffix.rsplit('/').next().unwrap_or_default();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(StatsError::InvalidLogId(trimmed.to_string()));
        }
        Ok(LogId(id.to_string()))
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Somewhere match logs can be read from.
pub trait LogSource {
    fn fetch(&self, id: &LogId) -> Result<MatchLog>;
}

pub struct HttpLogSource {
    client: Client,
    base_url: String,
}

impl HttpLogSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(StatsError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl LogSource for HttpLogSource {
    fn fetch(&self, id: &LogId) -> Result<MatchLog> {
        let url = format!("{}{}", self.base_url, id);
        debug!("GET {}", url);
        let http_err = |source| StatsError::Http {
            id: id.to_string(),
            source,
        };
        let resp = self.client.get(&url).send().map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StatsError::HttpStatus {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(http_err)?;
        parse_match_log(id, &body)
    }
}

/// Reads `<dir>/<id>.json` instead of going over the network.
pub struct FileLogSource {
    dir: PathBuf,
}

impl FileLogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogSource for FileLogSource {
    fn fetch(&self, id: &LogId) -> Result<MatchLog> {
        let path = self.dir.join(format!("{}.json", id));
        let body = fs::read_to_string(&path).map_err(|source| StatsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_match_log(id, &body)
    }
}

pub fn parse_match_log(id: &LogId, body: &str) -> Result<MatchLog> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(StatsError::EmptyResponse(id.to_string()));
    }
    serde_json::from_str(trimmed).map_err(|source| StatsError::Parse {
        id: id.to_string(),
        source,
    })
}

/// Fetches logs one at a time in the order the ids were given.
pub struct MatchIterator<'a, S: LogSource + ?Sized> {
    source: &'a S,
    ids: std::slice::Iter<'a, LogId>,
}

impl<'a, S: LogSource + ?Sized> MatchIterator<'a, S> {
    pub fn new(source: &'a S, ids: &'a [LogId]) -> Self {
        MatchIterator {
            source,
            ids: ids.iter(),
        }
    }
}

impl<S: LogSource + ?Sized> Iterator for MatchIterator<'_, S> {
    type Item = Result<(LogId, MatchLog)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.source.fetch(id).map(|match_log| {
            info!("Fetched log {} ({} players)", id, match_log.names.len());
            (id.clone(), match_log)
        }))
    }
}

/// Fetches every log, stopping at the first failure so no report is ever
/// built from a subset of the requested matches.
pub fn fetch_all<S: LogSource + ?Sized>(
    source: &S,
    ids: &[LogId],
) -> Result<Vec<(LogId, MatchLog)>> {
    MatchIterator::new(source, ids).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn id(raw: &str) -> LogId {
        raw.parse().unwrap()
    }

    #[test]
    fn log_ids_parse_from_urls_and_bare_ids() {
        assert_eq!(id("123456").as_str(), "123456");
        assert_eq!(id("http://logs.tf/123456").as_str(), "123456");
        assert_eq!(id("https://logs.tf/123456#76561198012345678").as_str(), "123456");
        assert_eq!(id(" https://logs.tf/123456/ ").as_str(), "123456");
        assert!("https://logs.tf/".parse::<LogId>().is_err());
        assert!("abc".parse::<LogId>().is_err());
    }

    #[test]
    fn parses_logs_tf_layout() {
        let body = json!({
            "version": 3,
            "names": { "[U:1:1]": "alpha", "[U:1:2]": "bravo" },
            "players": {
                "[U:1:1]": {
                    "team": "Red",
                    "kpd": "1.5",
                    "dmg": 4200,
                    "dapm": 280,
                    "as": 3,
                    "class_stats": [
                        { "type": "soldier", "kills": 12, "dmg": 4000, "weapon": {} },
                        { "type": "scout", "kills": 1, "dmg": 200 }
                    ]
                },
                "[U:1:2]": { "dapm": "310.5", "class_stats": [] }
            },
            "healspread": { "[U:1:3]": { "[U:1:1]": 1500, "[U:1:2]": 0 } }
        })
        .to_string();

        let log = parse_match_log(&id("1"), &body).unwrap();
        assert_eq!(log.names["[U:1:2]"], "bravo");
        let alpha = &log.players["[U:1:1]"];
        assert_eq!(alpha.class_stats.len(), 2);
        assert_eq!(alpha.class_stats[0].class, "soldier");
        assert_eq!(alpha.class_stats[0].counter("kills"), Some(12));
        assert_eq!(alpha.scalar("as"), Some(3.0));
        assert_eq!(log.players["[U:1:2]"].scalar("dapm"), Some(310.5));
        assert_eq!(log.healspread["[U:1:3]"]["[U:1:1]"], 1500.0);
    }

    #[test]
    fn malformed_fields_become_missing() {
        let body = json!({
            "names": { "[U:1:1]": "alpha", "[U:1:2]": 7 },
            "players": {
                "[U:1:1]": {
                    "dapm": { "oops": true },
                    "class_stats": [ { "kills": 3 }, { "type": "scout", "kills": "x" } ]
                },
                "[U:1:2]": "not an object"
            },
            "healspread": []
        })
        .to_string();

        let log = parse_match_log(&id("1"), &body).unwrap();
        assert_eq!(log.names["[U:1:2]"], "");
        let alpha = &log.players["[U:1:1]"];
        assert_eq!(alpha.dapm, None);
        assert_eq!(alpha.class_stats.len(), 1);
        assert_eq!(alpha.class_stats[0].counter("kills"), None);
        assert!(!log.players.contains_key("[U:1:2]"));
        assert!(log.healspread.is_empty());
    }

    #[test]
    fn empty_and_invalid_bodies_are_errors() {
        assert!(matches!(parse_match_log(&id("9"), "  "), Err(StatsError::EmptyResponse(_))));
        assert!(matches!(parse_match_log(&id("9"), "null"), Err(StatsError::EmptyResponse(_))));
        assert!(matches!(parse_match_log(&id("9"), "{ nope"), Err(StatsError::Parse { .. })));
    }

    struct FakeSource {
        failing: &'static str,
        calls: RefCell<Vec<String>>,
    }

    impl LogSource for FakeSource {
        fn fetch(&self, id: &LogId) -> Result<MatchLog> {
            self.calls.borrow_mut().push(id.to_string());
            if id.as_str() == self.failing {
                Err(StatsError::EmptyResponse(id.to_string()))
            } else {
                Ok(MatchLog::default())
            }
        }
    }

    #[test]
    fn fetch_all_stops_at_first_failure() {
        let source = FakeSource {
            failing: "2",
            calls: RefCell::new(Vec::new()),
        };
        let ids = vec![id("1"), id("2"), id("3")];
        assert!(fetch_all(&source, &ids).is_err());
        assert_eq!(*source.calls.borrow(), vec!["1", "2"]);
    }

    #[test]
    fn fetch_all_keeps_caller_order() {
        let source = FakeSource {
            failing: "",
            calls: RefCell::new(Vec::new()),
        };
        let ids = vec![id("3"), id("1"), id("2")];
        let logs = fetch_all(&source, &ids).unwrap();
        let order: Vec<&str> = logs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }
}
