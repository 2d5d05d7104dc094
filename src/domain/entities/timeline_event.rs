use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "timeline_event_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TimelineEventKind {
    Education,
    Achievement,
    Work,
}

impl FromStr for TimelineEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EDUCATION" => Ok(TimelineEventKind::Education),
            "ACHIEVEMENT" => Ok(TimelineEventKind::Achievement),
            "WORK" => Ok(TimelineEventKind::Work),
            _ => Err(format!(
                "Invalid timeline event type: {}. Valid values are: EDUCATION, ACHIEVEMENT, WORK",
                s
            )),
        }
    }
}

// Accepts any casing on input, always serializes upper case.
impl<'de> Deserialize<'de> for TimelineEventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TimelineEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimelineEventKind::Education => "EDUCATION",
            TimelineEventKind::Achievement => "ACHIEVEMENT",
            TimelineEventKind::Work => "WORK",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    pub location: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventRequest {
    pub occurred_at: DateTime<Utc>,

    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[serde(rename = "type")]
    pub kind: TimelineEventKind,

    #[validate(length(max = 255, message = "Location cannot exceed 255 characters"))]
    pub location: Option<String>,

    #[validate(length(min = 1, message = "Image URL cannot be empty"))]
    pub image: String,
}

impl TimelineEventRequest {
    pub fn prepare_for_insert(self) -> TimelineEvent {
        TimelineEvent {
            id: Uuid::new_v4(),
            occurred_at: self.occurred_at,
            title: self.title,
            description: self.description,
            kind: self.kind,
            location: self.location,
            image: self.image,
            created_at: Utc::now(),
        }
    }

    /// Overwrites every editable field of `event`, keeping id and creation time.
    pub fn apply(self, event: &mut TimelineEvent) {
        event.occurred_at = self.occurred_at;
        event.title = self.title;
        event.description = self.description;
        event.kind = self.kind;
        event.location = self.location;
        event.image = self.image;
    }
}
