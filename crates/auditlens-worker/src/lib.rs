//! Cloudflare Worker for auditlens
//!
//! Pure Rust implementation that proxies the analysis service and returns
//! normalized reports using auditlens-core

use auditlens_core::{
    AnalyzeRequest, CanonicalReport, DEFAULT_ENDPOINT, PageType, RawReportPayload, classify,
    normalize_target_url, parse_report,
};
use serde::Serialize;
use worker::wasm_bindgen::JsValue;
use worker::*;


/// Worker var overriding the analysis service endpoint
const ENDPOINT_VAR: &str = "ANALYZER_ENDPOINT";

#[derive(Serialize)]
struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "pageType", skip_serializing_if = "Option::is_none")]
    page_type: Option<PageType>,
    report: CanonicalReport,
    meta: MetaData,
}

#[derive(Serialize)]
struct MetaData {
    #[serde(rename = "payloadKind")]
    payload_kind: String,
    #[serde(rename = "payloadBytes")]
    payload_bytes: usize,
}

/// Target URL and page type from an `/analyze` query string
fn parse_analyze_query(query: &str) -> std::result::Result<(Url, PageType), String> {
    let mut target = None;
    let mut page_type = PageType::default();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(&raw_value.replace('+', " "))
            .map_err(|e| format!("Invalid query encoding: {}", e))?
            .into_owned();

        match key {
            "url" => target = Some(value),
            "pageType" | "page_type" => {
                page_type = value.parse().map_err(|e: anyhow::Error| e.to_string())?;
            }
            _ => {}
        }
    }

    let target = target.ok_or_else(|| "Missing 'url' query parameter".to_string())?;
    let url = normalize_target_url(&target).map_err(|e| e.to_string())?;
    Ok((url, page_type))
}

fn build_api_response(
    target: Option<&Url>,
    page_type: Option<PageType>,
    payload: &RawReportPayload,
    payload_bytes: usize,
) -> ApiResponse {
    ApiResponse {
        url: target.map(|url| url.to_string()),
        page_type,
        report: parse_report(payload),
        meta: MetaData {
            payload_kind: format!("{:?}", classify(payload).kind()),
            payload_bytes,
        },
    }
}

/// Report for a `/parse` body; `Err` when the body is JSON that does not decode
fn parse_body_response(body: &str) -> std::result::Result<ApiResponse, String> {
    let payload = RawReportPayload::from_body(body).map_err(|e| format!("{:#}", e))?;
    Ok(build_api_response(None, None, &payload, body.len()))
}

fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn json_response(body: String, headers: Headers, status: u16) -> Result<Response> {
    headers.set("Content-Type", "application/json")?;
    Response::ok(body).map(|r| r.with_headers(headers).with_status(status))
}

/// POST the analysis request upstream; `Err` carries a message for the client
async fn fetch_analysis(
    endpoint: &str,
    target: &Url,
    page_type: PageType,
) -> std::result::Result<(RawReportPayload, usize), String> {
    let body = serde_json::to_string(&AnalyzeRequest::new(target.as_str(), page_type))
        .map_err(|e| format!("Failed to encode request: {}", e))?;

    let upstream_headers = Headers::new();
    upstream_headers
        .set("Content-Type", "application/json")
        .map_err(|e| e.to_string())?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post)
        .with_headers(upstream_headers)
        .with_body(Some(JsValue::from_str(&body)));

    let request = Request::new_with_init(endpoint, &init).map_err(|e| e.to_string())?;
    let mut response = Fetch::Request(request)
        .send()
        .await
        .map_err(|e| format!("Failed to reach analysis service: {}", e))?;

    let status = response.status_code();
    let text = response
        .text()
        .await
        .map_err(|e| format!("Failed to read analysis response: {}", e))?;

    if !(200..300).contains(&status) {
        return Err(format!("Analysis service returned status {}", status));
    }

    let payload = RawReportPayload::from_json_str(&text).map_err(|e| e.to_string())?;
    Ok((payload, text.len()))
}

#[event(fetch)]
async fn main(mut req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let url = req.url()?;
    console_log!("[Worker] {} {}", req.method(), url.path());

    // CORS headers
    let headers = Headers::new();
    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set("Access-Control-Allow-Methods", "GET, POST, OPTIONS")?;
    headers.set("Access-Control-Allow-Headers", "Content-Type")?;

    // Handle CORS preflight
    if req.method() == Method::Options {
        return Response::empty().map(|r| r.with_headers(headers));
    }

    match (req.method(), url.path()) {
        (Method::Get, "/analyze") => {
            let (target, page_type) = match parse_analyze_query(url.query().unwrap_or("")) {
                Ok(parsed) => parsed,
                Err(message) => return json_response(error_body(&message), headers, 400),
            };

            let endpoint = env
                .var(ENDPOINT_VAR)
                .map(|value| value.to_string())
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
            console_log!("[Worker] Analyzing {} ({}) via {}", target, page_type, endpoint);

            let (payload, bytes) = match fetch_analysis(&endpoint, &target, page_type).await {
                Ok(fetched) => fetched,
                Err(message) => {
                    console_log!("[Worker] Upstream failure: {}", message);
                    return json_response(error_body(&message), headers, 502);
                }
            };

            let response = build_api_response(Some(&target), Some(page_type), &payload, bytes);
            json_response(serde_json::to_string_pretty(&response)?, headers, 200)
        }

        (Method::Post, "/parse") => {
            let body = req.text().await?;
            console_log!("[Worker] Parsing {} byte payload", body.len());

            match parse_body_response(&body) {
                Ok(response) => {
                    json_response(serde_json::to_string_pretty(&response)?, headers, 200)
                }
                Err(message) => {
                    console_log!("[Worker] Rejected payload: {}", message);
                    json_response(error_body(&message), headers, 400)
                }
            }
        }

        (Method::Get, "/health") => {
            let health = serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION")
            });
            json_response(health.to_string(), headers, 200)
        }

        (Method::Get, "/") => {
            let index = serde_json::json!({
                "service": "auditlens",
                "endpoints": {
                    "GET /analyze?url=<url>&pageType=<Homepage|PLP|PDP|Blog>": "Run and normalize an audit",
                    "POST /parse": "Normalize a saved analysis response",
                    "GET /health": "Health check"
                }
            });
            json_response(index.to_string(), headers, 200)
        }

        _ => Response::error("Not Found", 404),
    }
}
