use super::request::Slots;
use super::response::SkillResponse;
use super::SkillContext;
use crate::components::google_calendar::models::{EVENT_DESCRIPTION, REMINDER_MINUTES_BEFORE};
use crate::components::google_calendar::pager::{collect_events, events};
use crate::components::google_calendar::time::{busy_window, start_label};
use crate::components::google_calendar::{CalendarEvent, EventQuery, NewEvent};
use crate::error::SkillResult;
use crate::utils::time::{day_bounds, parse_slot_date, parse_slot_time, spoken_clock, EventWindow};
use futures::TryStreamExt;
use rust_i18n::t;
use tracing::{debug, info};

/// Book a one-hour event unless the calendar is busy at that time
pub async fn create_event(ctx: &SkillContext, slots: &Slots) -> SkillResult<SkillResponse> {
    let date_value = slots.require("date")?;
    let date = parse_slot_date(date_value)?;
    let time = parse_slot_time(slots.require("time")?)?;
    let name = slots.require("eventName")?;

    let config = &ctx.config;
    let window = EventWindow::starting_at(config.timezone, date.and_time(time))?;
    let (time_min, time_max) = window.to_utc();

    let busy = ctx
        .calendar
        .query_free_busy(&config.google_calendar_id, time_min, time_max)
        .await?;

    if let Some(conflict) = busy.first() {
        let (start, end) = busy_window(conflict, config.timezone);
        info!("Not booking '{}', calendar busy {} - {}", name, start, end);
        return Ok(SkillResponse::tell(t!(
            "event_busy",
            name = name,
            date = date_value.trim(),
            start = start,
            end = end
        )));
    }

    let event = NewEvent {
        summary: name.to_string(),
        description: EVENT_DESCRIPTION.to_string(),
        start: window.start,
        end: window.end,
        time_zone: config.timezone,
        reminder_minutes_before: REMINDER_MINUTES_BEFORE,
    };
    let created = ctx
        .calendar
        .insert_event(&config.google_calendar_id, &event)
        .await?;

    info!(
        "Event created: {}",
        created.html_link.as_deref().unwrap_or(created.id.as_str())
    );

    Ok(SkillResponse::tell(t!(
        "event_booked",
        name = name,
        date = date_value.trim(),
        start = spoken_clock(&window.start.naive_local()),
        end = spoken_clock(&window.end.naive_local())
    )))
}

/// Read out every event of one local day
pub async fn day_schedule(ctx: &SkillContext, slots: &Slots) -> SkillResult<SkillResponse> {
    let date_value = slots.require("date")?;
    let date = parse_slot_date(date_value)?;

    let config = &ctx.config;
    let (time_min, time_max) = day_bounds(config.timezone, date)?;

    // All pages are read before anything is spoken
    let day_events = collect_events(
        ctx.calendar.as_ref(),
        &config.google_calendar_id,
        EventQuery::between(time_min, time_max),
        config.max_list_pages,
    )
    .await?;

    debug!("Found {} events on {}", day_events.len(), date);

    if day_events.is_empty() {
        return Ok(SkillResponse::tell(t!("schedule_empty", date = date_value.trim())));
    }

    let entries = day_events
        .iter()
        .map(|event| schedule_entry(event, ctx))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(SkillResponse::tell(t!(
        "schedule_list",
        date = date_value.trim(),
        events = entries
    )))
}

fn schedule_entry(event: &CalendarEvent, ctx: &SkillContext) -> String {
    match start_label(event, ctx.config.timezone) {
        Some(time) => t!("schedule_entry_timed", summary = event.summary, time = time).to_string(),
        None => t!("schedule_entry_all_day", summary = event.summary).to_string(),
    }
}

/// Delete the first event whose title matches exactly
pub async fn delete_event(ctx: &SkillContext, slots: &Slots) -> SkillResult<SkillResponse> {
    let name = slots.require("eventName")?;
    let config = &ctx.config;

    let matches = events(
        ctx.calendar.as_ref(),
        &config.google_calendar_id,
        EventQuery::series(),
        config.max_list_pages,
    )
    .try_filter(|event| futures::future::ready(event.summary == name));
    let mut matches = std::pin::pin!(matches);

    // Paging stops at the first match
    let Some(event) = matches.try_next().await? else {
        info!("No event named '{}' to delete", name);
        return Ok(SkillResponse::tell(t!("event_not_found", name = name)));
    };

    ctx.calendar
        .delete_event(&config.google_calendar_id, &event.id)
        .await?;
    info!("Deleted event {} ('{}')", event.id, name);

    Ok(SkillResponse::tell(t!("event_deleted", name = name)))
}
