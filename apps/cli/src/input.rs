use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventSpec {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

/// Parses `name` or `name=<json>`.
pub fn parse_event_arg(arg: &str) -> Result<EventSpec> {
    let (name, data) = match arg.split_once('=') {
        Some((name, raw)) => {
            let data = serde_json::from_str(raw)
                .with_context(|| format!("invalid JSON data for event {name}"))?;
            (name, data)
        }
        None => (arg, Value::Object(Default::default())),
    };

    anyhow::ensure!(!name.trim().is_empty(), "empty event name in {arg:?}");
    Ok(EventSpec {
        name: name.trim().to_string(),
        data,
    })
}

/// One `{"name": ..., "data": ...}` object per line; blank lines are skipped.
pub async fn load_events_file(path: &Path) -> Result<Vec<EventSpec>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid event", path.display(), i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_name_gets_empty_object() {
        let spec = parse_event_arg("feature_used").unwrap();
        assert_eq!(spec.name, "feature_used");
        assert_eq!(spec.data, json!({}));
    }

    #[test]
    fn name_with_json_payload() {
        let spec = parse_event_arg(r#"api_call={"status":200}"#).unwrap();
        assert_eq!(spec.name, "api_call");
        assert_eq!(spec.data["status"], 200);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_event_arg("api_call={oops").is_err());
        assert!(parse_event_arg("={}").is_err());
    }

    #[tokio::test]
    async fn reads_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"name\":\"ui_interaction\",\"data\":{\"button\":\"ok\"}}\n\n{\"name\":\"feature_used\"}\n",
        )
        .unwrap();

        let events = load_events_file(&path).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data["button"], "ok");
        assert_eq!(events[1].data, Value::Null);
    }
}
