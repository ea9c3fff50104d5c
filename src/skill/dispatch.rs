use super::request::{RequestKind, SkillRequest, Slots};
use super::response::SkillResponse;
use super::{builtin, calendar, SkillContext};
use crate::error::{Error, SkillResult};
use tracing::{error, info, warn};

pub const CREATE_EVENT_INTENT: &str = "CreateEventIntent";
pub const ENTIRE_SCHEDULE_INTENT: &str = "EntireScheduleIntent";
pub const DAY_SCHEDULE_INTENT: &str = "DayScheduleIntent";
pub const DELETE_EVENT_INTENT: &str = "DeleteEventIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

/// Every intent with its own handler, in dispatch order
pub const SPECIFIC_INTENTS: &[&str] = &[
    CREATE_EVENT_INTENT,
    ENTIRE_SCHEDULE_INTENT,
    DAY_SCHEDULE_INTENT,
    DELETE_EVENT_INTENT,
    HELP_INTENT,
    CANCEL_INTENT,
    STOP_INTENT,
    FALLBACK_INTENT,
];

/// The handler chosen for a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route<'a> {
    Launch,
    CreateEvent(&'a Slots),
    DaySchedule(&'a Slots),
    DeleteEvent(&'a Slots),
    Help,
    CancelStop,
    Fallback,
    SessionEnded,
    /// Any other intent, echoed back by name
    Reflector(&'a str),
}

impl<'a> Route<'a> {
    /// Pick the handler for a request, `None` when nothing handles it
    pub fn select(kind: &'a RequestKind) -> Option<Self> {
        let route = match kind {
            RequestKind::Launch => Route::Launch,
            RequestKind::Intent(intent) => match intent.name.as_str() {
                CREATE_EVENT_INTENT => Route::CreateEvent(&intent.slots),
                ENTIRE_SCHEDULE_INTENT | DAY_SCHEDULE_INTENT => Route::DaySchedule(&intent.slots),
                DELETE_EVENT_INTENT => Route::DeleteEvent(&intent.slots),
                HELP_INTENT => Route::Help,
                CANCEL_INTENT | STOP_INTENT => Route::CancelStop,
                FALLBACK_INTENT => Route::Fallback,
                // Must stay the last intent arm
                other => Route::Reflector(other),
            },
            RequestKind::SessionEnded { .. } => Route::SessionEnded,
            RequestKind::Unsupported(_) => return None,
        };
        Some(route)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Launch => "launch",
            Route::CreateEvent(_) => "create_event",
            Route::DaySchedule(_) => "day_schedule",
            Route::DeleteEvent(_) => "delete_event",
            Route::Help => "help",
            Route::CancelStop => "cancel_stop",
            Route::Fallback => "fallback",
            Route::SessionEnded => "session_ended",
            Route::Reflector(_) => "reflector",
        }
    }

    async fn run(self, ctx: &SkillContext) -> SkillResult<SkillResponse> {
        match self {
            Route::Launch => Ok(builtin::launch()),
            Route::CreateEvent(slots) => calendar::create_event(ctx, slots).await,
            Route::DaySchedule(slots) => calendar::day_schedule(ctx, slots).await,
            Route::DeleteEvent(slots) => calendar::delete_event(ctx, slots).await,
            Route::Help => Ok(builtin::help()),
            Route::CancelStop => Ok(builtin::cancel_stop()),
            Route::Fallback => Ok(builtin::fallback()),
            Route::SessionEnded => Ok(builtin::session_ended()),
            Route::Reflector(intent_name) => Ok(builtin::reflector(intent_name)),
        }
    }
}

/// Produce the single response for a request, failures included
pub async fn handle_request(ctx: &SkillContext, request: &SkillRequest) -> SkillResponse {
    let result = match Route::select(&request.kind) {
        Some(route) => {
            info!(
                "Handling {} (request {})",
                route.name(),
                request.request_id.as_deref().unwrap_or("-")
            );
            route.run(ctx).await
        }
        None => Err(Error::Unhandled(format!("{:?}", request.kind))),
    };

    result.unwrap_or_else(recover)
}

/// Turn a handler failure into something the user can hear
fn recover(err: Error) -> SkillResponse {
    if let Some(slot) = err.slot() {
        warn!("Asking to rephrase slot '{}': {}", slot, err);
        return builtin::rephrase(slot);
    }

    error!("Error handling request: {:?}", err);
    builtin::apology()
}
