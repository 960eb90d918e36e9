//! Report formatter - Telegram HTML message
//!
//! Output is a pure function of (report, geo record, timestamp). Every
//! interpolated value is HTML-escaped; Telegram rejects unbalanced markup.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::types::{ClientReport, GeoRecord};
use crate::utils::constants::REPORT_TIME_FORMAT;

/// Renders client reports for the chat
#[derive(Debug, Clone, Copy)]
pub struct MessageFormatter {
    timezone: Tz,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Moscow)
    }
}

impl MessageFormatter {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Format using the current time
    pub fn format(&self, report: &ClientReport, geo: &GeoRecord) -> String {
        self.format_at(report, geo, Utc::now())
    }

    /// Format with an explicit timestamp
    pub fn format_at(&self, report: &ClientReport, geo: &GeoRecord, at: DateTime<Utc>) -> String {
        let time = at.with_timezone(&self.timezone).format(REPORT_TIME_FORMAT).to_string();

        let fields: [(&str, &str); 11] = [
            ("Time", time.as_str()),
            ("IP", report.ip.as_str()),
            ("Country", geo.country.as_str()),
            ("Country code", geo.country_code.as_str()),
            ("Region", geo.region.as_str()),
            ("City", geo.city.as_str()),
            ("ISP", geo.isp.as_str()),
            ("User Agent", report.user_agent.as_str()),
            ("Screen", report.screen_resolution.as_str()),
            ("Timezone", report.timezone.as_str()),
            ("Source", geo.provider.as_str()),
        ];

        let lines: Vec<String> = fields
            .iter()
            .map(|(label, value)| format!("<b>{}:</b> <code>{}</code>", label, escape_html(value)))
            .collect();

        format!("<b>🔍 New visitor</b>\n\n{}", lines.join("\n"))
    }
}

/// Escape the three characters Telegram's HTML parser treats specially
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{NOT_AVAILABLE, NO_PROVIDER};
    use chrono::TimeZone;

    fn sample_geo() -> GeoRecord {
        GeoRecord::located(
            "United States".into(),
            "US".into(),
            "California".into(),
            "Mountain View".into(),
            "Google LLC".into(),
        )
        .with_provider("ipapi.co")
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap()
    }

    #[test]
    fn test_format_is_deterministic() {
        let formatter = MessageFormatter::default();
        let report = ClientReport::from_ip("8.8.8.8");
        let a = formatter.format_at(&report, &sample_geo(), fixed_time());
        let b = formatter.format_at(&report, &sample_geo(), fixed_time());
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_contains_every_field() {
        let report = ClientReport {
            ip: "8.8.8.8".into(),
            user_agent: "Mozilla/5.0 (X11)".into(),
            screen_resolution: "1920x1080".into(),
            timezone: "America/Los_Angeles".into(),
        };
        let text = MessageFormatter::default().format_at(&report, &sample_geo(), fixed_time());

        for expected in [
            "<b>IP:</b> <code>8.8.8.8</code>",
            "<b>Country:</b> <code>United States</code>",
            "<b>Country code:</b> <code>US</code>",
            "<b>Region:</b> <code>California</code>",
            "<b>City:</b> <code>Mountain View</code>",
            "<b>ISP:</b> <code>Google LLC</code>",
            "<b>User Agent:</b> <code>Mozilla/5.0 (X11)</code>",
            "<b>Screen:</b> <code>1920x1080</code>",
            "<b>Timezone:</b> <code>America/Los_Angeles</code>",
            "<b>Source:</b> <code>ipapi.co</code>",
        ] {
            assert!(text.contains(expected), "missing {:?} in {}", expected, text);
        }
    }

    #[test]
    fn test_format_layout() {
        let report = ClientReport::from_ip("8.8.8.8");
        let text = MessageFormatter::default().format_at(&report, &sample_geo(), fixed_time());

        assert!(text.starts_with("<b>🔍 New visitor</b>\n\n<b>Time:</b> <code>01.03.2024, 12:30:15</code>\n"));
        assert!(text.ends_with("<b>Source:</b> <code>ipapi.co</code>"));
        assert_eq!(text.lines().count(), 13);
    }

    #[test]
    fn test_timestamp_rendered_in_display_timezone() {
        let report = ClientReport::from_ip("8.8.8.8");
        let moscow = MessageFormatter::default().format_at(&report, &sample_geo(), fixed_time());
        assert!(moscow.contains("<code>01.03.2024, 12:30:15</code>"));

        let utc = MessageFormatter::new(chrono_tz::UTC).format_at(&report, &sample_geo(), fixed_time());
        assert!(utc.contains("<code>01.03.2024, 09:30:15</code>"));
    }

    #[test]
    fn test_missing_fields_show_sentinel() {
        let report = ClientReport::from_ip("8.8.8.8");
        let text = MessageFormatter::default().format_at(&report, &GeoRecord::unavailable(), fixed_time());
        assert!(text.contains(&format!("<b>User Agent:</b> <code>{}</code>", NOT_AVAILABLE)));
        assert!(text.contains(&format!("<b>Source:</b> <code>{}</code>", NO_PROVIDER)));
        assert!(!text.contains("undefined"));
    }

    #[test]
    fn test_client_values_are_escaped() {
        let mut report = ClientReport::from_ip("8.8.8.8");
        report.user_agent = "<script>a&b</script>".into();
        let text = MessageFormatter::default().format_at(&report, &sample_geo(), fixed_time());
        assert!(text.contains("&lt;script&gt;a&amp;b&lt;/script&gt;"));
        assert!(!text.contains("<script>"));
    }
}
