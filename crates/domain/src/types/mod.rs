//! Domain types and models

pub mod calendar;
pub mod event;
pub mod message;

pub use calendar::{
    CalendarEntry, CalendarEntryDraft, EventTime, Reminder, ReminderMethod, SyncSummary,
};
pub use event::{
    EventCandidate, FieldValue, MessageExtract, PhysicalEvent, PhysicalTalk, Recurrence,
    TalkCategory, VirtualEvent, VirtualTalk,
};
pub use message::{parse_timestamp, AggregatedMessage, ChannelType, Message, SenderKey};
