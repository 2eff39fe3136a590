//! Date and text formatting.

use chrono::{TimeZone, Utc};

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Escapes text for safe insertion into HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Formats a note timestamp relative to `now_ms` (both epoch milliseconds).
///
/// Within a day: "Just now", "N minute(s) ago", "N hour(s) ago". Then
/// "Yesterday", "N days ago" below a week, and "Mon D, YYYY" (UTC) beyond.
/// Future timestamps read as "Just now".
pub fn format_note_date(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms).max(0);
    let days = diff / DAY_MS;

    match days {
        0 => {
            let hours = diff / HOUR_MS;
            if hours > 0 {
                return format!("{hours} hour{} ago", plural(hours));
            }
            let minutes = diff / MINUTE_MS;
            if minutes > 0 {
                return format!("{minutes} minute{} ago", plural(minutes));
            }
            "Just now".to_string()
        }
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => match Utc.timestamp_millis_opt(timestamp_ms).single() {
            Some(date) => date.format("%b %-d, %Y").to_string(),
            None => "Unknown date".to_string(),
        },
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_html, format_note_date, DAY_MS, HOUR_MS, MINUTE_MS};
    use chrono::{TimeZone, Utc};

    const NOW: i64 = 1_800_000_000_000;

    #[test]
    fn escape_html_replaces_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn recent_timestamps_use_relative_units() {
        assert_eq!(format_note_date(NOW, NOW), "Just now");
        assert_eq!(format_note_date(NOW - 59 * 1000, NOW), "Just now");
        assert_eq!(format_note_date(NOW - MINUTE_MS, NOW), "1 minute ago");
        assert_eq!(format_note_date(NOW - 5 * MINUTE_MS, NOW), "5 minutes ago");
        assert_eq!(format_note_date(NOW - HOUR_MS, NOW), "1 hour ago");
        assert_eq!(format_note_date(NOW - 23 * HOUR_MS, NOW), "23 hours ago");
    }

    #[test]
    fn older_timestamps_use_days_then_calendar_date() {
        assert_eq!(format_note_date(NOW - DAY_MS, NOW), "Yesterday");
        assert_eq!(format_note_date(NOW - 6 * DAY_MS, NOW), "6 days ago");

        let created = Utc
            .with_ymd_and_hms(2026, 10, 7, 12, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(format_note_date(created, created + 10 * DAY_MS), "Oct 7, 2026");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(format_note_date(NOW + HOUR_MS, NOW), "Just now");
    }
}
