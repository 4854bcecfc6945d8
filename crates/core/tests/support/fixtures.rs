use calbot_domain::{
    ChannelType, EventCandidate, Message, MessageExtract, PhysicalEvent, PhysicalTalk,
    Recurrence, TalkCategory, VirtualEvent,
};

/// A public-channel record with no links.
pub fn message(sender: &str, timestamp: &str, text: &str) -> Message {
    Message {
        workspace: "lab".into(),
        channel: "seminars".into(),
        channel_type: ChannelType::Public,
        sender: sender.into(),
        timestamp: timestamp.into(),
        text: text.into(),
        urls: vec![],
        file_paths: vec![],
        permalinks: vec![],
        original_indices: vec![],
    }
}

pub fn in_channel(mut message: Message, channel: &str) -> Message {
    message.channel = channel.into();
    message
}

pub fn with_links(mut message: Message, urls: &[&str], permalinks: &[&str]) -> Message {
    message.urls = urls.iter().map(|u| u.to_string()).collect();
    message.permalinks = permalinks.iter().map(|p| p.to_string()).collect();
    message
}

pub fn talk(first_name: &str, date: &str) -> EventCandidate {
    EventCandidate::PhysicalTalk(PhysicalTalk {
        first_name: first_name.into(),
        last_name: None,
        talk_date: date.into(),
        location: "Gates 104".into(),
        short_description: "A talk.".into(),
        lunch_provided: false,
        category: TalkCategory::Unrecognized,
    })
}

pub fn social(name: &str, date: &str) -> EventCandidate {
    EventCandidate::PhysicalEvent(PhysicalEvent {
        simple_event_name: name.into(),
        event_date: date.into(),
        location: "Courtyard".into(),
        short_description: "Snacks and games.".into(),
        lunch_provided: false,
        is_academic: false,
        is_recurring: Recurrence::NotRecurring,
    })
}

pub fn reading_group(date: &str, recurrence: Recurrence) -> EventCandidate {
    EventCandidate::VirtualEvent(VirtualEvent {
        simple_event_name: "Reading Group".into(),
        event_date: date.into(),
        virtual_link: "https://zoom.example/j/42".into(),
        short_description: "Weekly papers.".into(),
        is_academic: true,
        is_recurring: recurrence,
    })
}

pub fn extract(events: Vec<EventCandidate>) -> MessageExtract {
    MessageExtract { events }
}

/// Serialize an extract the way the oracle returns it.
pub fn payload(events: Vec<EventCandidate>) -> String {
    serde_json::to_string(&extract(events)).unwrap()
}
