//! Maneuver announcements and prioritized speech scheduling

pub mod announcer;
pub mod queue;

pub use announcer::{ManeuverAnnouncer, compose_instruction, format_spoken_distance};
pub use queue::{AnnouncementQueue, Priority, SpeechOutput};
