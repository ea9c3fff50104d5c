//! Intent routing and the handlers behind each route.

mod builtin;
mod calendar;
pub mod dispatch;
pub mod request;
pub mod response;

pub use dispatch::{handle_request, Route};
pub use request::{Intent, RequestEnvelope, RequestKind, SkillRequest, Slots};
pub use response::{ResponseEnvelope, SkillResponse};

use crate::components::google_calendar::CalendarService;
use crate::config::Config;
use std::sync::Arc;

/// Everything a handler needs, built once at startup
#[derive(Clone)]
pub struct SkillContext {
    pub config: Arc<Config>,
    pub calendar: Arc<dyn CalendarService>,
}

impl SkillContext {
    pub fn new(config: Arc<Config>, calendar: Arc<dyn CalendarService>) -> Self {
        Self { config, calendar }
    }
}
