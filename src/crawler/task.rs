//! Per-resource crawl task
//!
//! One task runs for every URL handed to [`spawn_task`]. The task registers
//! its URL and continues only if it created the resource, so every distinct
//! URL is processed at most once no matter how often it is discovered.
//! Only the fetch phase holds a request slot.

use crate::crawler::fetcher::{status_line, Transport};
use crate::crawler::links::LinkSet;
use crate::crawler::parser::extract_html_links;
use crate::crawler::retry::{FailureClass, RetryDecision, RetryPolicy};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::sniff::{sniff, ContentType};
use crate::crawler::tasks::TaskCounter;
use crate::crawler::text::extract_text_links;
use crate::registry::{Registry, Resource};
use crate::state::ResourceState;
use crate::storage::PathSafeWriter;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use url::Url;

/// Longest URL prefix quoted in skip diagnostics
const URL_LOG_PREFIX: usize = 80;

/// Everything a crawl task needs, shared by all tasks of a run
pub(crate) struct RunContext {
    pub seed: Url,
    pub registry: Arc<Registry>,
    pub scheduler: Scheduler,
    pub tasks: TaskCounter,
    pub retry: RetryPolicy,
    pub max_url_length: usize,
    pub writer: PathSafeWriter,
    pub transport: Arc<dyn Transport>,
}

/// Spawns the task for `url`
///
/// The task is counted before it is scheduled, so a waiter can never observe
/// an idle run while this child is pending.
pub(crate) fn spawn_task(ctx: &Arc<RunContext>, url: Url) {
    let guard = ctx.tasks.enter();
    let future = process(Arc::clone(ctx), url);
    tokio::spawn(async move {
        future.await;
        drop(guard);
    });
}

// Boxed so the task future can spawn further tasks of its own type
fn process(ctx: Arc<RunContext>, url: Url) -> BoxFuture<'static, ()> {
    async move {
        let (resource, created) = ctx.registry.register_or_get(url);
        if !created {
            return;
        }
        tracing::debug!("New link: {}", resource.url());

        if let Some(reason) = skip_reason(&ctx, &resource) {
            tracing::debug!("Skip: {}", reason);
            resource.set_state(ResourceState::Skip);
            return;
        }

        let body = match fetch(&ctx, &resource).await {
            Some(body) => body,
            None => return,
        };

        resource.set_state(ResourceState::Read);
        let content_type = sniff(&body);
        resource.set_mime(content_type.mime.as_str());

        let links = extract_links(&body, &content_type, &ctx.seed);
        if let Some(error) = links.last_error() {
            resource.set_read_error(error);
        }
        for link in links.links {
            spawn_task(&ctx, link);
        }

        resource.set_state(ResourceState::Save);
        match ctx
            .writer
            .write(resource.url(), content_type.extension, &body)
            .await
        {
            Ok(_) => resource.set_state(ResourceState::Complete),
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", resource.url(), e);
                resource.set_state_with_error(ResourceState::SaveError, e.to_string());
            }
        }
    }
    .boxed()
}

/// Returns why a resource must not be fetched, checked in a fixed order
fn skip_reason(ctx: &RunContext, resource: &Resource) -> Option<String> {
    let url = resource.url().as_str();

    if url.len() > ctx.max_url_length {
        let prefix: String = url.chars().take(URL_LOG_PREFIX).collect();
        return Some(format!(
            "URL is longer than {} characters: {}...",
            ctx.max_url_length, prefix
        ));
    }
    if !resource.is_interesting() {
        return Some(format!("unsupported scheme: {}", url));
    }
    if resource.is_external() {
        return Some(format!("foreign host: {}", url));
    }
    None
}

/// Fetches the body, retrying as the policy allows
///
/// The request slot is held across retries and backoff sleeps and released
/// on return. `None` means the resource ended in an error state.
async fn fetch(ctx: &RunContext, resource: &Resource) -> Option<Vec<u8>> {
    let _slot = match ctx.scheduler.acquire().await {
        Ok(slot) => slot,
        Err(e) => {
            resource.set_state_with_error(ResourceState::RequestError, e.to_string());
            return None;
        }
    };

    loop {
        resource.set_state(ResourceState::Request);

        let (class, message) = match ctx.transport.send(resource.url()).await {
            Err(e) => (FailureClass::Transport, e.to_string()),
            Ok(response) if response.status() >= 400 => {
                let status = response.status();
                (FailureClass::Status(status), status_line(status))
            }
            Ok(response) => {
                if let Some(length) = response.content_length() {
                    resource.set_size(length);
                }
                resource.set_state(ResourceState::Download);

                match response.bytes().await {
                    Ok(body) => {
                        resource.set_size(body.len() as u64);
                        return Some(body);
                    }
                    Err(e) => (FailureClass::Body, e.to_string()),
                }
            }
        };

        let attempts = resource.repeats() + 1;
        match ctx.retry.decide(class, attempts) {
            RetryDecision::RetryNow => {
                resource.record_failure(message);
                if class != FailureClass::Body {
                    resource.set_state(ResourceState::RequestWaitRepeat);
                }
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!("{}: {}, retrying in {:?}", resource.url(), message, delay);
                resource.record_failure(message);
                resource.set_state(ResourceState::RequestWaitRepeat);
                tokio::time::sleep(delay).await;
            }
            RetryDecision::GiveUp => {
                let state = match class {
                    FailureClass::Body => ResourceState::DownloadError,
                    _ => ResourceState::RequestError,
                };
                tracing::warn!("{} failed: {}", resource.url(), message);
                resource.set_state_with_error(state, message);
                return None;
            }
        }
    }
}

/// Runs the extractors that apply to the sniffed content type
pub(crate) fn extract_links(body: &[u8], content_type: &ContentType, seed: &Url) -> LinkSet {
    if content_type.is_html() {
        let mut links = extract_html_links(body, seed);
        links.extend(extract_text_links(body, seed));
        links
    } else if content_type.is_binary_leaf() {
        LinkSet::new()
    } else {
        extract_text_links(body, seed)
    }
}
