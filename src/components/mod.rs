//! External collaborators of the skill.

pub mod google_calendar;
