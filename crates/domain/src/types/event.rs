//! Extracted event candidates
//!
//! The inference oracle returns a [`MessageExtract`] per aggregated message:
//! zero or more [`EventCandidate`]s. Candidates form a closed union of four
//! shapes, discriminated on the wire by a `kind` field:
//!
//! | kind             | speaker | place        | recurrence |
//! |------------------|---------|--------------|------------|
//! | `physical_talk`  | yes     | location     | never      |
//! | `virtual_talk`   | yes     | virtual link | never      |
//! | `physical_event` | no      | location     | yes        |
//! | `virtual_event`  | no      | virtual link | yes        |

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Research area of a talk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TalkCategory {
    Vision,
    Robotics,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Reinforcement Learning")]
    ReinforcementLearning,
    Unrecognized,
}

impl TalkCategory {
    pub const ALL: [TalkCategory; 5] = [
        Self::Vision,
        Self::Robotics,
        Self::MachineLearning,
        Self::ReinforcementLearning,
        Self::Unrecognized,
    ];

    /// Human-readable label, identical to the wire value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Vision => "Vision",
            Self::Robotics => "Robotics",
            Self::MachineLearning => "Machine Learning",
            Self::ReinforcementLearning => "Reinforcement Learning",
            Self::Unrecognized => "Unrecognized",
        }
    }
}

impl std::fmt::Display for TalkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How often an event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Weekly,
    Biweekly,
    Monthly,
    /// Announced as repeating, cadence not stated
    Unknown,
    #[default]
    #[serde(rename = "none")]
    NotRecurring,
}

impl_domain_status_conversions!(Recurrence {
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
    Unknown => "unknown",
    NotRecurring => "none",
});

impl Recurrence {
    pub const ALL: [Recurrence; 5] =
        [Self::Weekly, Self::Biweekly, Self::Monthly, Self::Unknown, Self::NotRecurring];

    /// RFC 5545 recurrence line for cadences a calendar can express.
    pub fn rrule(self) -> Option<&'static str> {
        match self {
            Self::Weekly => Some("RRULE:FREQ=WEEKLY"),
            Self::Biweekly => Some("RRULE:FREQ=WEEKLY;INTERVAL=2"),
            Self::Monthly => Some("RRULE:FREQ=MONTHLY"),
            Self::Unknown | Self::NotRecurring => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        self != Self::NotRecurring
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalTalk {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub talk_date: String,
    pub location: String,
    pub short_description: String,
    #[serde(default)]
    pub lunch_provided: bool,
    pub category: TalkCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualTalk {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub talk_date: String,
    pub virtual_link: String,
    pub short_description: String,
    pub category: TalkCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalEvent {
    pub simple_event_name: String,
    pub event_date: String,
    pub location: String,
    pub short_description: String,
    #[serde(default)]
    pub lunch_provided: bool,
    pub is_academic: bool,
    #[serde(default)]
    pub is_recurring: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualEvent {
    pub simple_event_name: String,
    pub event_date: String,
    pub virtual_link: String,
    pub short_description: String,
    pub is_academic: bool,
    #[serde(default)]
    pub is_recurring: Recurrence,
}

/// One structured interpretation of an announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventCandidate {
    PhysicalTalk(PhysicalTalk),
    VirtualTalk(VirtualTalk),
    PhysicalEvent(PhysicalEvent),
    VirtualEvent(VirtualEvent),
}

/// A single field of a candidate, viewed for information-density scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    /// Booleans and enumerations always carry information
    Scalar,
    /// Optional field left empty
    Absent,
}

impl EventCandidate {
    pub fn is_talk(&self) -> bool {
        matches!(self, Self::PhysicalTalk(_) | Self::VirtualTalk(_))
    }

    /// `YYYY-MM-DDTHH:MM` with `_` in unknown positions.
    pub fn date_expression(&self) -> &str {
        match self {
            Self::PhysicalTalk(t) => &t.talk_date,
            Self::VirtualTalk(t) => &t.talk_date,
            Self::PhysicalEvent(e) => &e.event_date,
            Self::VirtualEvent(e) => &e.event_date,
        }
    }

    /// Calendar title: `"<first name>'s Talk"` for talks, the event name
    /// otherwise.
    pub fn title(&self) -> String {
        match self {
            Self::PhysicalTalk(t) => format!("{}'s Talk", t.first_name),
            Self::VirtualTalk(t) => format!("{}'s Talk", t.first_name),
            Self::PhysicalEvent(e) => e.simple_event_name.clone(),
            Self::VirtualEvent(e) => e.simple_event_name.clone(),
        }
    }

    pub fn short_description(&self) -> &str {
        match self {
            Self::PhysicalTalk(t) => &t.short_description,
            Self::VirtualTalk(t) => &t.short_description,
            Self::PhysicalEvent(e) => &e.short_description,
            Self::VirtualEvent(e) => &e.short_description,
        }
    }

    /// Physical location, present only for physical variants.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::PhysicalTalk(t) => Some(&t.location),
            Self::PhysicalEvent(e) => Some(&e.location),
            Self::VirtualTalk(_) | Self::VirtualEvent(_) => None,
        }
    }

    /// Meeting link, present only for virtual variants.
    pub fn virtual_link(&self) -> Option<&str> {
        match self {
            Self::VirtualTalk(t) => Some(&t.virtual_link),
            Self::VirtualEvent(e) => Some(&e.virtual_link),
            Self::PhysicalTalk(_) | Self::PhysicalEvent(_) => None,
        }
    }

    /// Talks never recur.
    pub fn recurrence(&self) -> Recurrence {
        match self {
            Self::PhysicalEvent(e) => e.is_recurring,
            Self::VirtualEvent(e) => e.is_recurring,
            Self::PhysicalTalk(_) | Self::VirtualTalk(_) => Recurrence::NotRecurring,
        }
    }

    pub fn category(&self) -> Option<TalkCategory> {
        match self {
            Self::PhysicalTalk(t) => Some(t.category),
            Self::VirtualTalk(t) => Some(t.category),
            Self::PhysicalEvent(_) | Self::VirtualEvent(_) => None,
        }
    }

    pub fn is_academic(&self) -> Option<bool> {
        match self {
            Self::PhysicalEvent(e) => Some(e.is_academic),
            Self::VirtualEvent(e) => Some(e.is_academic),
            Self::PhysicalTalk(_) | Self::VirtualTalk(_) => None,
        }
    }

    pub fn lunch_provided(&self) -> bool {
        match self {
            Self::PhysicalTalk(t) => t.lunch_provided,
            Self::PhysicalEvent(e) => e.lunch_provided,
            Self::VirtualTalk(_) | Self::VirtualEvent(_) => false,
        }
    }

    /// Every field of the variant, excluding the `kind` discriminator.
    pub fn field_values(&self) -> Vec<FieldValue<'_>> {
        fn optional(value: Option<&String>) -> FieldValue<'_> {
            value.map_or(FieldValue::Absent, |v| FieldValue::Text(v))
        }

        match self {
            Self::PhysicalTalk(t) => vec![
                FieldValue::Text(&t.first_name),
                optional(t.last_name.as_ref()),
                FieldValue::Text(&t.talk_date),
                FieldValue::Text(&t.location),
                FieldValue::Text(&t.short_description),
                FieldValue::Scalar,
                FieldValue::Scalar,
            ],
            Self::VirtualTalk(t) => vec![
                FieldValue::Text(&t.first_name),
                optional(t.last_name.as_ref()),
                FieldValue::Text(&t.talk_date),
                FieldValue::Text(&t.virtual_link),
                FieldValue::Text(&t.short_description),
                FieldValue::Scalar,
            ],
            Self::PhysicalEvent(e) => vec![
                FieldValue::Text(&e.simple_event_name),
                FieldValue::Text(&e.event_date),
                FieldValue::Text(&e.location),
                FieldValue::Text(&e.short_description),
                FieldValue::Scalar,
                FieldValue::Scalar,
                FieldValue::Scalar,
            ],
            Self::VirtualEvent(e) => vec![
                FieldValue::Text(&e.simple_event_name),
                FieldValue::Text(&e.event_date),
                FieldValue::Text(&e.virtual_link),
                FieldValue::Text(&e.short_description),
                FieldValue::Scalar,
                FieldValue::Scalar,
            ],
        }
    }
}

/// Zero or more candidates extracted from one aggregated message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExtract {
    #[serde(default)]
    pub events: Vec<EventCandidate>,
}

impl MessageExtract {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
