//! Two-phase extraction pipeline.
//!
//! The pipeline advances through an explicit stage machine: fetch the
//! static page, walk the static strategy ladder, escalate to a rendered
//! browser capture, walk the rendered ladder. Phase failures (a blocked
//! fetch, a browser that cannot launch) are warned and skipped, never
//! fatal; the only error surface is [`Error::NoMessages`] when every stage
//! has run dry, plus the terminal exhaustion cases.
//!
//! Stage state holds captured markup as plain strings. Parsing happens
//! inside each strategy stage, so nothing unsendable lives across awaits.

use tracing::{debug, warn};

use crate::dedup::SeenMessages;
use crate::error::{Error, Result};
use crate::extract::{self, StrategyKind};
use crate::fetch::DocumentSource;
use crate::message::{Conversation, Message};
use crate::options::Options;
use crate::share_url::ShareUrl;

/// Pipeline stages, in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    FetchStatic,
    TryStructured,
    TryDomPrimary,
    TryDomFallback,
    FetchRendered,
    TryDomOnRendered,
    TryDomFallbackOnRendered,
    TryStructuredOnRendered,
    TryHeuristic,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Self::FetchStatic => "fetch-static",
            Self::TryStructured => "try-structured",
            Self::TryDomPrimary => "try-dom-primary",
            Self::TryDomFallback => "try-dom-fallback",
            Self::FetchRendered => "fetch-rendered",
            Self::TryDomOnRendered => "try-dom-on-rendered",
            Self::TryDomFallbackOnRendered => "try-dom-fallback-on-rendered",
            Self::TryStructuredOnRendered => "try-structured-on-rendered",
            Self::TryHeuristic => "try-heuristic",
        }
    }
}

/// Runs the full extraction pipeline for one share URL.
///
/// Returns the conversation produced by the first stage that yields
/// messages. `Err(NoMessages)` means the page was reachable in at least
/// one phase but no strategy found a conversation, which is the normal
/// outcome for deleted or private shares.
pub async fn parse_share(
    source: &dyn DocumentSource,
    url: &ShareUrl,
    options: &Options,
) -> Result<Conversation> {
    let mut stage = Stage::FetchStatic;
    let mut static_html: Option<String> = None;
    let mut rendered_html: Option<String> = None;
    let mut seen = SeenMessages::new();

    let messages = 'run: loop {
        debug!(stage = stage.name(), "pipeline stage");
        stage = match stage {
            Stage::FetchStatic => match source.fetch_static(url.as_str()).await {
                Ok(html) => {
                    static_html = Some(html);
                    Stage::TryStructured
                }
                Err(err) => {
                    warn!(%err, "static fetch failed, escalating to rendered phase");
                    Stage::FetchRendered
                }
            },

            Stage::TryStructured => {
                let found = try_stage(
                    StrategyKind::Structured,
                    static_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::TryDomPrimary
                } else {
                    break 'run found;
                }
            }

            Stage::TryDomPrimary => {
                let found = try_stage(
                    StrategyKind::DomPrimary,
                    static_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::TryDomFallback
                } else {
                    break 'run found;
                }
            }

            Stage::TryDomFallback => {
                let found = try_stage(
                    StrategyKind::DomFallback,
                    static_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::FetchRendered
                } else {
                    break 'run found;
                }
            }

            Stage::FetchRendered => {
                if options.static_only {
                    debug!("static-only run, not escalating to a browser");
                    return Err(Error::NoMessages);
                }
                match source.fetch_rendered(url.as_str(), options).await {
                    Ok(html) => {
                        rendered_html = Some(html);
                        Stage::TryDomOnRendered
                    }
                    Err(err) => {
                        warn!(%err, "rendered phase failed");
                        return Err(Error::NoMessages);
                    }
                }
            }

            Stage::TryDomOnRendered => {
                let found = try_stage(
                    StrategyKind::DomPrimary,
                    rendered_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::TryDomFallbackOnRendered
                } else {
                    break 'run found;
                }
            }

            Stage::TryDomFallbackOnRendered => {
                let found = try_stage(
                    StrategyKind::DomFallback,
                    rendered_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::TryStructuredOnRendered
                } else {
                    break 'run found;
                }
            }

            Stage::TryStructuredOnRendered => {
                let found = try_stage(
                    StrategyKind::Structured,
                    rendered_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    Stage::TryHeuristic
                } else {
                    break 'run found;
                }
            }

            Stage::TryHeuristic => {
                let found = try_stage(
                    StrategyKind::Heuristic,
                    rendered_html.as_deref(),
                    options,
                    &mut seen,
                );
                if found.is_empty() {
                    return Err(Error::NoMessages);
                }
                break 'run found;
            }
        };
    };

    let title = rendered_html
        .as_deref()
        .and_then(extract::page_title)
        .or_else(|| static_html.as_deref().and_then(extract::page_title));

    debug!(count = messages.len(), title = ?title, "conversation extracted");
    Ok(Conversation {
        title,
        source: url.as_str().to_string(),
        messages,
    })
}

fn try_stage(
    kind: StrategyKind,
    html: Option<&str>,
    options: &Options,
    seen: &mut SeenMessages,
) -> Vec<Message> {
    html.map_or_else(Vec::new, |html| {
        extract::run_strategy(kind, html, options, seen)
    })
}
