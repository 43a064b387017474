//! Export the ranked queue as a JSON array.

use std::path::Path;

use super::check_output_path;
use crate::model::email::EnrichedEmail;

/// Pretty-printed JSON array with every field of every email.
pub fn to_json(emails: &[EnrichedEmail]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(emails)?)
}

/// Write [`to_json`] output to a file.
pub fn export_json(emails: &[EnrichedEmail], output_path: &Path) -> anyhow::Result<()> {
    check_output_path(output_path)?;
    let mut json = to_json(emails)?;
    json.push('\n');
    std::fs::write(output_path, json)?;
    tracing::info!(path = %output_path.display(), count = emails.len(), "Exported JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::email::RawEmail;
    use crate::triage::pipeline::enrich_batch;

    #[test]
    fn test_to_json_fields() {
        let emails = enrich_batch(&[RawEmail::new(
            "jane.doe@x.com",
            "Urgent: cannot log in",
            "Please help. Reach me at jane.doe@x.com.",
            Some("2024-01-04 10:00".into()),
        )]);
        let json = to_json(&emails).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["sender"], "jane.doe@x.com");
        assert_eq!(first["priority"], "Urgent");
        assert_eq!(first["emails"][0], "jane.doe@x.com");
        assert!(first["draft_reply"].as_str().unwrap().starts_with("Hi Jane Doe,"));
        assert!(first.get("rank_key").is_some());
    }

    #[test]
    fn test_json_parses_back() {
        let emails = enrich_batch(&[RawEmail::new("a@b.com", "Help", "Thanks!", None)]);
        let parsed: Vec<EnrichedEmail> = serde_json::from_str(&to_json(&emails).unwrap()).unwrap();
        assert_eq!(parsed, emails);
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_export_json_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        export_json(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
