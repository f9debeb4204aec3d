//! HTTP server for interactive exploration
//!
//! `aqmap serve ./data` → loads the data, starts the server, opens the
//! browser. Slider changes arrive as `GET /api/scenario?res=..&ind=..` and
//! are handled by the scenario selector in this process. Requests are served
//! one at a time from a single loop, so selector events never overlap.

use crate::dashboard::Dashboard;
use crate::error::Error;
use crate::outcome::{OutcomeKind, OutcomeSpec};
use crate::report::{html, svg, Snapshot};
use crate::scenario::ScenarioKey;
use crate::selector::{ControlValues, SelectionUpdate};
use serde::Serialize;
use std::io;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

// Embed the update script directly in the binary
const UI_SCRIPT: &str = include_str!("ui.js");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub key: ScenarioKey,
    pub controls: ControlValues,
    pub panels: Vec<PanelResponse>,
    pub notices: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub outcome: OutcomeKind,
    pub title: String,
    pub bound_key: Option<ScenarioKey>,
    pub colors: Vec<String>,
    /// Hover text per region, same order as the SVG paths
    pub hover: Vec<String>,
}

impl ScenarioResponse {
    fn new(update: SelectionUpdate, dashboard: &Dashboard) -> Self {
        let panels = update
            .panels
            .into_iter()
            .map(|panel| {
                let hover = match dashboard.plot(panel.outcome) {
                    Ok((plot, source)) => source
                        .table()
                        .regions()
                        .iter()
                        .zip(source.values())
                        .map(|(region, value)| {
                            plot.tooltip(&region.location, value)
                                .iter()
                                .map(|row| format!("{}: {}", row.label, row.value))
                                .collect::<Vec<_>>()
                                .join("\n")
                        })
                        .collect(),
                    Err(_) => vec![],
                };
                PanelResponse {
                    outcome: panel.outcome,
                    title: panel.title,
                    bound_key: panel.bound_key,
                    colors: panel.colors.iter().map(|c| c.hex()).collect(),
                    hover,
                }
            })
            .collect();

        Self {
            key: update.key,
            controls: update.controls,
            panels,
            notices: update.notices,
        }
    }
}

/// A response before it is handed to tiny_http
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: String) -> Self {
        Self { status, content_type, body }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::new(status, "application/json", body),
            Err(e) => Self::new(500, "text/plain", format!("serialization failed: {}", e)),
        }
    }

    fn not_found() -> Self {
        Self::new(404, "text/plain", "Not found".to_string())
    }
}

/// Start server, open browser, serve UI
pub fn start(port: u16, mut dashboard: Dashboard, open_browser: bool) -> io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n\x1b[1;31maqmap\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Pollutant: {}\n", dashboard.pollutant());
    info!(%addr, "listening");

    if open_browser {
        let _ = open::that(&url);
    }

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut dashboard) {
            error!("request failed: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, dashboard: &mut Dashboard) -> io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();
    debug!(%method, %url, "request");

    let reply = route(&method, &url, dashboard);
    let header = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid content type"))?;
    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(header);
    request.respond(response)
}

fn route(method: &Method, url: &str, dashboard: &mut Dashboard) -> Reply {
    let path = url.split('?').next().unwrap_or("/");
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");

    match (method, path) {
        // Serve the page with live controls
        (&Method::Get, "/") => match html::page(dashboard, true, UI_SCRIPT) {
            Ok(page) => Reply::new(200, "text/html; charset=utf-8", page),
            Err(e) => Reply::new(500, "text/plain", e.to_string()),
        },

        // API: selector event
        (&Method::Get, "/api/scenario") => {
            let controls = match serde_urlencoded::from_str::<ControlValues>(query) {
                Ok(controls) => controls,
                Err(e) => return Reply::json(400, &ApiResponse::failure(format!("bad controls: {}", e))),
            };
            match dashboard.apply(controls) {
                Ok(update) => {
                    info!(key = %update.key, notices = update.notices.len(), "scenario selected");
                    let response = ScenarioResponse::new(update, dashboard);
                    Reply::json(200, &ApiResponse::success(response))
                }
                Err(e @ Error::InvalidMultiplier(_)) => Reply::json(400, &ApiResponse::failure(e.to_string())),
                Err(e) => {
                    warn!("selector failed: {}", e);
                    Reply::json(500, &ApiResponse::failure(e.to_string()))
                }
            }
        }

        // API: full snapshot of the current state
        (&Method::Get, "/api/state") => match Snapshot::from_dashboard(dashboard) {
            Ok(snapshot) => Reply::json(200, &ApiResponse::success(snapshot)),
            Err(e) => Reply::json(500, &ApiResponse::failure(e.to_string())),
        },

        // API: upstream options, passed through untouched
        (&Method::Get, "/api/options") => Reply::json(200, &ApiResponse::success(dashboard.options())),

        // Single panel as SVG
        (&Method::Get, p) if p.starts_with("/panel/") && p.ends_with(".svg") => {
            let name = &p["/panel/".len()..p.len() - ".svg".len()];
            let panel = OutcomeSpec::lookup_str(dashboard.pollutant().as_str(), name)
                .and_then(|_| name.parse::<OutcomeKind>())
                .and_then(|outcome| dashboard.plot(outcome));
            match panel {
                Ok((plot, source)) => Reply::new(200, "image/svg+xml", svg::panel(plot, source)),
                Err(e) => {
                    debug!(panel = name, "{}", e);
                    Reply::new(404, "text/plain", e.to_string())
                }
            }
        }

        // 404
        _ => Reply::not_found(),
    }
}
