use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::frontmatter::Frontmatter;

pub const DEFAULT_TIME: &str = "2:00 PM – 4:00 PM";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    #[default]
    InPerson,
    Virtual,
    Hybrid,
}

impl EventType {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in-person" => Some(Self::InPerson),
            "virtual" => Some(Self::Virtual),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Boundary parse: blank means the default, unknown text is logged and
    /// also defaults.
    pub fn from_keyword_or_default(value: Option<&str>) -> Self {
        let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) else {
            return Self::default();
        };
        Self::from_keyword(raw).unwrap_or_else(|| {
            warn!(event_type = raw, "unknown event type, using in-person");
            Self::default()
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::InPerson => "in-person",
            Self::Virtual => "virtual",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn badge_label(self) -> &'static str {
        match self {
            Self::InPerson => "IN-PERSON",
            Self::Virtual => "VIRTUAL",
            Self::Hybrid => "HYBRID",
        }
    }
}

/// Event date as written in the source, plus its calendar value when the
/// leading `YYYY-MM-DD` parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    raw: String,
    parsed: Option<NaiveDate>,
}

impl EventDate {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parsed = raw
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, ISO_DATE_FORMAT).ok());
        Self {
            raw: raw.to_owned(),
            parsed,
        }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            raw: date.format(ISO_DATE_FORMAT).to_string(),
            parsed: Some(date),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed
    }

    /// `Feb 27, 2026`; unparseable input is shown as written.
    pub fn display(&self) -> String {
        match self.parsed {
            Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
            None => self.raw.clone(),
        }
    }
}

/// Untyped event fields as they arrive from flags or frontmatter.
#[derive(Debug, Clone, Default)]
pub struct RawEventFields {
    pub title: String,
    pub date: Option<String>,
    pub event_type: Option<String>,
    pub tags: Vec<String>,
    pub meeting_link: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
}

impl RawEventFields {
    /// Reads the event subset of the content schema. `fallback_title` is used
    /// when the header carries no title (usually the file stem).
    pub fn from_frontmatter(frontmatter: &Frontmatter, fallback_title: &str) -> Self {
        Self {
            title: frontmatter
                .get("title")
                .unwrap_or(fallback_title)
                .to_owned(),
            date: frontmatter.get("date").map(str::to_owned),
            event_type: frontmatter.get("eventType").map(str::to_owned),
            tags: frontmatter.list("tags"),
            meeting_link: frontmatter.get("meetingLink").map(str::to_owned),
            time: frontmatter.get("time").map(str::to_owned),
            location: frontmatter.get("location").map(str::to_owned),
        }
    }
}

/// Everything the thumbnail core needs for one render. Built once, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub title: String,
    pub event_type: EventType,
    pub date: EventDate,
    pub time: String,
    pub tags: Vec<String>,
    pub meeting_link: Option<Url>,
    pub location: Option<String>,
}

impl EventDescriptor {
    /// Parses raw fields into their typed form. `today` only fills in a
    /// missing date.
    pub fn from_raw(raw: RawEventFields, today: NaiveDate) -> Self {
        let date = non_blank(raw.date)
            .map(|value| EventDate::parse(&value))
            .unwrap_or_else(|| EventDate::from_naive(today));
        let meeting_link = non_blank(raw.meeting_link).and_then(|link| {
            Url::parse(link.trim())
                .map_err(|error| {
                    warn!(link = %link, %error, "ignoring meeting link that is not a valid URL");
                })
                .ok()
        });

        Self {
            title: raw.title.trim().to_owned(),
            event_type: EventType::from_keyword_or_default(raw.event_type.as_deref()),
            date,
            time: non_blank(raw.time).unwrap_or_else(|| DEFAULT_TIME.to_owned()),
            tags: raw
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty())
                .collect(),
            meeting_link,
            location: non_blank(raw.location).map(|value| value.trim().to_owned()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{EventDate, EventDescriptor, EventType, RawEventFields, DEFAULT_TIME};
    use crate::frontmatter::parse_frontmatter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 6).expect("valid date")
    }

    #[test]
    fn event_type_keywords_are_case_insensitive() {
        assert_eq!(EventType::from_keyword(" Virtual "), Some(EventType::Virtual));
        assert_eq!(EventType::from_keyword("HYBRID"), Some(EventType::Hybrid));
        assert_eq!(EventType::from_keyword("onsite"), None);
        assert_eq!(
            EventType::from_keyword_or_default(Some("onsite")),
            EventType::InPerson
        );
        assert_eq!(EventType::from_keyword_or_default(None), EventType::InPerson);
    }

    #[test]
    fn dates_display_in_short_month_form() {
        assert_eq!(EventDate::parse("2026-02-27").display(), "Feb 27, 2026");
        assert_eq!(
            EventDate::parse("2026-03-06T19:00:00.000Z").display(),
            "Mar 6, 2026"
        );
        assert_eq!(EventDate::parse("next week").display(), "next week");
        assert!(EventDate::parse("soon").date().is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let descriptor = EventDescriptor::from_raw(
            RawEventFields {
                title: "  GPU Programming Model ".to_owned(),
                ..RawEventFields::default()
            },
            today(),
        );
        assert_eq!(descriptor.title, "GPU Programming Model");
        assert_eq!(descriptor.event_type, EventType::InPerson);
        assert_eq!(descriptor.date.raw(), "2026-03-06");
        assert_eq!(descriptor.time, DEFAULT_TIME);
        assert!(descriptor.tags.is_empty());
        assert!(descriptor.meeting_link.is_none());
        assert!(descriptor.location.is_none());
    }

    #[test]
    fn invalid_meeting_link_is_dropped() {
        let descriptor = EventDescriptor::from_raw(
            RawEventFields {
                title: "Remote session".to_owned(),
                meeting_link: Some("not a url".to_owned()),
                ..RawEventFields::default()
            },
            today(),
        );
        assert!(descriptor.meeting_link.is_none());
    }

    #[test]
    fn frontmatter_fields_map_onto_descriptor() {
        let fm = parse_frontmatter(
            "---\ntitle: \"Diffusion Models for Medical Imaging\"\ndate: 2026-04-10\neventType: \"virtual\"\nmeetingLink: \"https://meet.google.com/abc-defg-hij\"\ntags: [\"neural\", \"diffusion\"]\n---\n",
        )
        .expect("frontmatter");
        let descriptor =
            EventDescriptor::from_raw(RawEventFields::from_frontmatter(&fm, "fallback"), today());
        assert_eq!(descriptor.title, "Diffusion Models for Medical Imaging");
        assert_eq!(descriptor.event_type, EventType::Virtual);
        assert_eq!(descriptor.tags, vec!["neural", "diffusion"]);
        assert_eq!(
            descriptor
                .meeting_link
                .as_ref()
                .and_then(|link| link.host_str()),
            Some("meet.google.com")
        );
    }

    #[test]
    fn missing_title_uses_fallback() {
        let fm = parse_frontmatter("---\ndate: 2026-04-10\n---\n").expect("frontmatter");
        let raw = RawEventFields::from_frontmatter(&fm, "gpu-intro");
        assert_eq!(raw.title, "gpu-intro");
    }
}
