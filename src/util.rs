use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

pub fn age(duration: &Duration) -> String {
    let seconds = duration.num_seconds().max(0);

    let days = seconds / (60 * 60 * 24);
    let hours = seconds / (60 * 60);
    let minutes = seconds / 60;

    if 0 < days {
        return format!("{}d", days);
    }
    if 0 < hours {
        return format!("{}h", hours);
    }
    if 0 < minutes {
        return format!("{}m", minutes);
    }

    format!("{}s", seconds)
}

/// `metadata.creationTimestamp` からの経過時間
pub fn creation_age(resource: &Value, now: DateTime<Utc>) -> Option<String> {
    let timestamp = resource
        .pointer("/metadata/creationTimestamp")
        .and_then(Value::as_str)?;

    let created = DateTime::parse_from_rfc3339(timestamp).ok()?;

    Some(age(&(now - created.with_timezone(&Utc))))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::seconds(Duration::seconds(6), "6s")]
    #[case::minutes(Duration::seconds(125), "2m")]
    #[case::hours(Duration::hours(5), "5h")]
    #[case::days(Duration::days(3) + Duration::hours(4), "3d")]
    #[case::negative(Duration::seconds(-10), "0s")]
    fn age_uses_largest_unit(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(age(&duration), expected)
    }

    #[test]
    fn creation_age_reads_metadata() {
        let now = DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let resource = json!({"metadata": {"creationTimestamp": "2024-01-01T00:00:00Z"}});

        assert_eq!(creation_age(&resource, now), Some("1d".to_string()));
        assert_eq!(creation_age(&json!({}), now), None);
    }
}
