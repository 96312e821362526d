//! vq-demo - Main Entry Point
//!
//! Builds a small page in memory, wires it up with vega-query the way a
//! page script would, simulates a few user interactions, then prints the
//! resulting body markup.

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use vega_query::prelude::*;
use vega_query::vq_dom::{Document, Event, EventListener};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>vega-query</title></head>
<body>
<h1>vega-query</h1>
<p>A paragraph.</p>
<p>Another paragraph.</p>
<a href="/first">first link</a>
<a href="/second">second link</a>
<textarea></textarea>
<button id="btnClickMe">Click me</button>
</body>
</html>"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting vq-demo...");

    let q = Query::parse(PAGE);
    wire_up(&q)?;
    interact(&q)?;

    let body = q.select("body")?.context("page has no body")?;
    let markup = body.html(None)?.value().unwrap_or_default();
    println!("{markup}");
    Ok(())
}

/// Page script: bind handlers and decorate the page
fn wire_up(q: &Query<Document>) -> anyhow::Result<()> {
    // The listener lives in the document, so it must not own it
    let page = q.document().downgrade();
    let toggle = EventListener::new(move |event| {
        event.prevent_default();
        let Some(document) = page.upgrade() else {
            return;
        };
        let handler = Query::new(document);
        if let Ok(Some(body)) = handler.select("body") {
            if let Err(err) = body.toggle_class("red", None) {
                tracing::warn!(?err, "toggle failed");
            }
        }
        match handler.select_all("p").map(|p| p.toggle_class("par", None)) {
            Ok(Ok(all)) => tracing::info!(all, "paragraphs toggled"),
            Ok(Err(err)) | Err(err) => tracing::warn!(?err, "toggle failed"),
        }
    });
    q.select_all("a")?.on("click", &toggle, false)?;

    let body = q.select("body")?.context("page has no body")?;
    body.append([q.create_svg("svg", Some(&json!({ "width": 100, "height": 100 })))?])?;
    let link = q.create("a", Some(&json!({ "href": "#" })), None)?;
    link.text(Some("a"));
    body.append([link])?;

    let button = q.by_id("btnClickMe").context("missing #btnClickMe")?;
    button.on(
        "click",
        &EventListener::new(|_| tracing::info!("button clicked")),
        false,
    )?;

    q.select_all("a")?
        .style(&json!({ "color": "red" }))?
        .attr(&json!({ "style": { "textDecoration": "none" } }))?;

    let log = EventListener::new(|event| tracing::info!(kind = %event.kind, target = ?event.target, "event"));
    q.select_all("a")?.on("click keydown", &log, false)?;

    let headings = q.select_all("h1, p, a")?;
    tracing::info!(count = headings.len(), "h1, p, a");

    q.select_all("textarea")?.text(Some("Hello"));
    let titles = q.select_all("h1")?.html(None)?.value().unwrap_or_default();
    tracing::info!(?titles, "h1 markup");

    q.select_all("a")?.prepend(["> "])?.append([";"])?;

    let svg = q.create_svg(
        "svg",
        Some(&json!({ "width": 100, "height": 100, "style": { "scale": 2 } })),
    )?;
    svg.append([q.create_svg(
        "path",
        Some(&json!({ "d": "M 20 30 L 50 60", "stroke": "#222", "fill": "red" })),
    )?])?;
    body.append([&svg])?;

    if let Some(path) = q.select("path")? {
        path.attr(&json!({ "d": "M 10 10 L 30 30 L 20 40 Z" }))?;
    }
    Ok(())
}

/// Simulated user input
fn interact(q: &Query<Document>) -> anyhow::Result<()> {
    q.by_id("btnClickMe").context("missing #btnClickMe")?.click()?;

    if let Some(first) = q.select("a")? {
        first.click()?;
        first.element().dispatch_event(&mut Event::new("keydown", true, true));
    }

    let body = q.select("body")?.context("page has no body")?;
    tracing::info!(red = body.has_class("red"), "body state");
    Ok(())
}
