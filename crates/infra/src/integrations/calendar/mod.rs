//! Google Calendar integration
//!
//! [`GoogleCalendarStore`] implements the core `CalendarStore` port over the
//! Calendar v3 REST API. Access tokens come from a [`TokenSource`]: either a
//! fixed bearer token or a refresh token exchanged (and cached) on demand.

pub mod auth;
pub mod google;
mod types;

pub use auth::TokenSource;
pub use google::GoogleCalendarStore;
