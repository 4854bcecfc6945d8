//! JSON schema for `MessageExtract` candidates
//!
//! The schema is written for strict structured-output mode: every object
//! lists all of its properties as required, forbids extra keys, and models
//! optional values as nullable.

use calbot_domain::{Recurrence, TalkCategory};
use serde_json::{json, Map, Value};

pub const SCHEMA_NAME: &str = "message_extract";

fn string() -> Value {
    json!({ "type": "string" })
}

fn boolean() -> Value {
    json!({ "type": "boolean" })
}

fn categories() -> Value {
    let labels: Vec<&str> = TalkCategory::ALL.iter().map(|c| c.label()).collect();
    json!({ "type": "string", "enum": labels })
}

fn recurrences() -> Value {
    let labels: Vec<String> = Recurrence::ALL.iter().map(ToString::to_string).collect();
    json!({ "type": "string", "enum": labels })
}

fn variant(kind: &str, fields: Vec<(&str, Value)>) -> Value {
    let mut properties = Map::new();
    properties.insert("kind".to_string(), json!({ "type": "string", "enum": [kind] }));
    for (name, schema) in fields {
        properties.insert(name.to_string(), schema);
    }
    let required: Vec<String> = properties.keys().cloned().collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

/// Schema for one extraction result: `{"events": [candidate, ...]}`.
pub fn message_extract_schema() -> Value {
    let nullable_string = json!({ "type": ["string", "null"] });

    let physical_talk = variant(
        "physical_talk",
        vec![
            ("first_name", string()),
            ("last_name", nullable_string.clone()),
            ("talk_date", string()),
            ("location", string()),
            ("short_description", string()),
            ("lunch_provided", boolean()),
            ("category", categories()),
        ],
    );
    let virtual_talk = variant(
        "virtual_talk",
        vec![
            ("first_name", string()),
            ("last_name", nullable_string),
            ("talk_date", string()),
            ("virtual_link", string()),
            ("short_description", string()),
            ("category", categories()),
        ],
    );
    let physical_event = variant(
        "physical_event",
        vec![
            ("simple_event_name", string()),
            ("event_date", string()),
            ("location", string()),
            ("short_description", string()),
            ("lunch_provided", boolean()),
            ("is_academic", boolean()),
            ("is_recurring", recurrences()),
        ],
    );
    let virtual_event = variant(
        "virtual_event",
        vec![
            ("simple_event_name", string()),
            ("event_date", string()),
            ("virtual_link", string()),
            ("short_description", string()),
            ("is_academic", boolean()),
            ("is_recurring", recurrences()),
        ],
    );

    json!({
        "type": "object",
        "properties": {
            "events": {
                "type": "array",
                "items": { "anyOf": [physical_talk, virtual_talk, physical_event, virtual_event] }
            }
        },
        "required": ["events"],
        "additionalProperties": false
    })
}
