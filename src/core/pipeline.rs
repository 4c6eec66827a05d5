//! The collection pipeline — captured requests in, locustfile source out.

use super::blacklist::Blacklist;
use super::error::Error;
use super::request::Request;
use super::task::{LegacyTask, Task};
use crate::locust;

/// Convert captured requests into locustfile source.
///
/// Ordering and filtering happen once, in the legacy constructor; every
/// surviving task is migrated to the target model before rendering, so
/// the placeholder direct path is never hit here.
pub fn transform<F>(requests: Vec<Request>, on_blacklist: F) -> Result<String, Error>
where
    F: Fn(&str) -> bool,
{
    let legacy = LegacyTask::from_requests(requests, on_blacklist);
    tracing::info!(tasks = legacy.len(), "building task sequence");
    let tasks: Vec<Task> = legacy.iter().map(Task::from_legacy).collect();
    locust::render_locustfile(&tasks)
}

/// [`transform`] with a loaded blacklist as the predicate.
pub fn transform_with_blacklist(
    requests: Vec<Request>,
    blacklist: &Blacklist,
) -> Result<String, Error> {
    transform(requests, |host| blacklist.on_blacklist(host))
}
