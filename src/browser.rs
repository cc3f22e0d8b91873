//! Headless-browser rendering and PDF printing.
//!
//! Each operation runs a one-shot browser session: launch, drive one page,
//! close. The CDP event handler runs on a spawned task for the lifetime of
//! the session, and the browser is closed on every exit path, including
//! failures between launch and result.

use chromiumoxide::browser::{Browser, BrowserConfig, BrowserConfigBuilder};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures_util::StreamExt;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::Options;
use crate::patterns::ROLE_TAGGED_SELECTOR;

// A4 in inches, with 20mm top/bottom and 15mm side margins.
const PAGE_WIDTH_IN: f64 = 8.27;
const PAGE_HEIGHT_IN: f64 = 11.69;
const MARGIN_VERTICAL_IN: f64 = 0.79;
const MARGIN_HORIZONTAL_IN: f64 = 0.59;

/// Renders the page behind `url` and returns its post-hydration markup.
///
/// Navigation is bounded by `navigation_timeout`. After load the session
/// polls for a role-tagged turn element up to `selector_wait`; if none
/// appears it applies `settle_wait` once and captures whatever the page
/// holds. Selector absence is not an error here, only an earlier capture
/// of weaker evidence.
pub async fn render(url: &str, options: &Options) -> Result<String> {
    let (browser, handler_task) = launch(options).await?;
    let outcome = render_on(&browser, url, options).await;
    shutdown(browser, handler_task).await;
    outcome
}

/// Prints an HTML document to PDF bytes through a blank page.
pub async fn print_pdf(html: &str, options: &Options) -> Result<Vec<u8>> {
    let (browser, handler_task) = launch(options).await?;
    let outcome = print_on(&browser, html).await;
    shutdown(browser, handler_task).await;
    outcome
}

async fn render_on(browser: &Browser, url: &str, options: &Options) -> Result<String> {
    debug!(url, "navigating rendered session");
    let page = browser.new_page(url).await.map_err(render_err)?;

    match timeout(options.navigation_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => return Err(Error::Render(format!("navigation failed: {err}"))),
        Err(_) => {
            return Err(Error::Render(format!(
                "navigation timed out after {:?}",
                options.navigation_timeout
            )))
        }
    }

    let deadline = Instant::now() + options.selector_wait;
    let mut tagged = false;
    while Instant::now() < deadline {
        if page.find_element(ROLE_TAGGED_SELECTOR).await.is_ok() {
            tagged = true;
            break;
        }
        sleep(options.poll_interval).await;
    }
    if tagged {
        debug!("turn selector appeared");
    } else {
        debug!(
            settle = ?options.settle_wait,
            "turn selector never appeared, settling before capture"
        );
        sleep(options.settle_wait).await;
    }

    page.content().await.map_err(render_err)
}

async fn print_on(browser: &Browser, html: &str) -> Result<Vec<u8>> {
    let page = browser.new_page("about:blank").await.map_err(render_err)?;
    page.set_content(html).await.map_err(render_err)?;
    page.pdf(pdf_params()).await.map_err(render_err)
}

fn pdf_params() -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(PAGE_WIDTH_IN),
        paper_height: Some(PAGE_HEIGHT_IN),
        margin_top: Some(MARGIN_VERTICAL_IN),
        margin_bottom: Some(MARGIN_VERTICAL_IN),
        margin_left: Some(MARGIN_HORIZONTAL_IN),
        margin_right: Some(MARGIN_HORIZONTAL_IN),
        ..PrintToPdfParams::default()
    }
}

fn config_builder(options: &Options) -> BrowserConfigBuilder {
    BrowserConfig::builder()
        .arg(format!("--user-agent={}", options.user_agent))
        .args(vec![
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-features=VizDisplayCompositor",
        ])
}

fn browser_config(options: &Options) -> Result<BrowserConfig> {
    config_builder(options).build().map_err(Error::Render)
}

async fn launch(options: &Options) -> Result<(Browser, JoinHandle<()>)> {
    let config = browser_config(options)?;
    let (browser, mut handler) = Browser::launch(config).await.map_err(render_err)?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    Ok((browser, handler_task))
}

async fn shutdown(mut browser: Browser, handler_task: JoinHandle<()>) {
    if let Err(err) = browser.close().await {
        debug!(%err, "browser close reported an error");
    }
    handler_task.abort();
}

fn render_err(err: impl std::fmt::Display) -> Error {
    Error::Render(err.to_string())
}
