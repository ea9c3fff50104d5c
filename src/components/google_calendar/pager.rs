//! Lazy paging over event listings.
//!
//! A listing is pulled one page at a time and flattened into a stream of
//! events. Dropping the stream stops paging, so callers that only need the
//! first match never fetch the remaining pages. Calling [`events`] again
//! starts over from the first page.

use super::models::{CalendarEvent, EventQuery};
use super::CalendarService;
use crate::error::{google_calendar_error, Error, SkillResult};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

enum Cursor {
    Start,
    Next { token: String, fetched: usize },
    Done,
}

/// Stream every event matching `query`, following continuation tokens.
///
/// Fails once more than `max_pages` pages would be needed.
pub fn events<'a>(
    calendar: &'a dyn CalendarService,
    calendar_id: &'a str,
    query: EventQuery,
    max_pages: usize,
) -> impl Stream<Item = SkillResult<CalendarEvent>> + Send + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| {
        next_page(calendar, calendar_id, query.clone(), cursor, max_pages)
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, Error>)))
    .try_flatten()
}

/// Fetch the page `cursor` points at and move the cursor past it
async fn next_page(
    calendar: &dyn CalendarService,
    calendar_id: &str,
    query: EventQuery,
    cursor: Cursor,
    max_pages: usize,
) -> SkillResult<Option<(Vec<CalendarEvent>, Cursor)>> {
    let (token, fetched) = match cursor {
        Cursor::Start => (None, 0),
        Cursor::Next { token, fetched } => (Some(token), fetched),
        Cursor::Done => return Ok(None),
    };

    if fetched >= max_pages {
        return Err(google_calendar_error(&format!(
            "Event listing still had more results after {} pages",
            max_pages
        )));
    }

    let page = calendar
        .list_events(calendar_id, &query, token.as_deref())
        .await?;
    debug!("Fetched page {} with {} events", fetched + 1, page.items.len());

    let next = match page.next_page_token {
        Some(token) => Cursor::Next {
            token,
            fetched: fetched + 1,
        },
        None => Cursor::Done,
    };
    Ok(Some((page.items, next)))
}

/// Collect a whole listing, all pages or nothing
pub async fn collect_events(
    calendar: &dyn CalendarService,
    calendar_id: &str,
    query: EventQuery,
    max_pages: usize,
) -> SkillResult<Vec<CalendarEvent>> {
    events(calendar, calendar_id, query, max_pages)
        .try_collect()
        .await
}
