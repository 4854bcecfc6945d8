//! Extraction prompt construction

use calbot_domain::utils::time_format::readable_timestamp;
use calbot_domain::AggregatedMessage;
use chrono::NaiveDateTime;

const INSTRUCTIONS: &str = r#"TASK:
List every talk and event announced in the message. Classify each one as exactly one kind:
- physical_talk: a named speaker presenting in person
- virtual_talk: a named speaker presenting online
- physical_event: an in-person gathering without a single featured speaker (reading group, workshop, social)
- virtual_event: an online gathering without a single featured speaker

RULES:
1. Dates use the form YYYY-MM-DDTHH:MM on a 24-hour clock. Write '_' in every digit position the message does not give and that cannot be inferred, e.g. "2025-10-27T__:__" when only the day is known.
2. Resolve relative dates ("today", "tomorrow", "this Friday", "next Monday") against the send time above, taking its day of week into account. A bare weekday means its next occurrence, or the send day itself when the weekdays match.
3. Lunch: if lunch is mentioned with no other time for the gathering, it starts at 11:45 and lunch_provided is true. A "pixl lunch" always starts Friday at 11:45 and runs one hour unless the message says otherwise.
4. When only an end time is given, the start is three hours earlier.
5. A meeting link (Zoom, Meet, Teams) makes it virtual. A room, building or street address makes it physical. When unclear, choose physical.
6. A specific speaker makes it a talk. Talks record first_name as written and last_name when given, otherwise null.
7. Events record how often they repeat in is_recurring: "weekly" (every week), "biweekly" (every other week, twice a month), "monthly" (every month), "unknown" (repeats with no stated cadence) or "none". Talks never repeat.
8. The marker [ADDITIONAL MESSAGE] separates posts merged from the same sender. Repeated information describes the same gathering; list it once.
9. short_description: at most three sentences about the content, not the logistics.
10. Talk category is one of: Vision, Robotics, Machine Learning, Reinforcement Learning, Unrecognized.
11. If nothing is announced, return an empty events array.

EXAMPLES:
Sent Thursday, October 23, 2025 at 9:00 AM: "Prof. John Smith from MIT presents deep learning for perception tomorrow at 2pm in Room 105"
{"events":[{"kind":"physical_talk","first_name":"John","last_name":"Smith","talk_date":"2025-10-24T14:00","location":"Room 105","short_description":"Deep learning for perception.","lunch_provided":false,"category":"Machine Learning"}]}

Sent Monday, October 20, 2025 at 2:00 PM: "Our reading group meets every Friday at 3pm on Zoom: https://zoom.us/j/456"
{"events":[{"kind":"virtual_event","simple_event_name":"Reading Group","event_date":"2025-10-24T15:00","virtual_link":"https://zoom.us/j/456","short_description":"Weekly paper discussion.","is_academic":true,"is_recurring":"weekly"}]}

Sent Friday, October 24, 2025 at 10:00 AM: "Talks from Siyang and Xindi today at 12:10pm in Room 101 [ADDITIONAL MESSAGE] Talks from Siyang and Xindi today at 12:10pm in Room 101"
{"events":[{"kind":"physical_talk","first_name":"Siyang","last_name":null,"talk_date":"2025-10-24T12:10","location":"Room 101","short_description":"Talk by Siyang.","lunch_provided":false,"category":"Unrecognized"},{"kind":"physical_talk","first_name":"Xindi","last_name":null,"talk_date":"2025-10-24T12:10","location":"Room 101","short_description":"Talk by Xindi.","lunch_provided":false,"category":"Unrecognized"}]}
"#;

/// Build the extraction prompt for one aggregated message.
///
/// `sent_at` is the parsed send time; when it is unavailable only the raw
/// timestamp is shown.
pub fn build_prompt(message: &AggregatedMessage, sent_at: Option<NaiveDateTime>) -> String {
    let sent = match sent_at {
        Some(at) => format!("{} ({})", message.timestamp, readable_timestamp(at)),
        None => message.timestamp.clone(),
    };

    format!(
        "You extract academic talks and events from chat announcements.\n\n\
         MESSAGE CONTEXT:\n\
         - Channel: #{channel} ({channel_type})\n\
         - Workspace: {workspace}\n\
         - Sent by: {sender}\n\
         - Sent at: {sent}\n\n\
         MESSAGE TEXT:\n{text}\n\n{INSTRUCTIONS}",
        channel = message.channel,
        channel_type = message.channel_type,
        workspace = message.workspace,
        sender = message.sender,
        text = message.text,
    )
}
