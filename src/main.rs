mod render;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use auditlens_core::{
    AnalysisClient, ClientConfig, PageType, RawReportPayload, normalize_target_url, parse_report,
};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::render::{RenderContext, render_markdown};

const APP_NAME: &str = "auditlens";
const VERSION: &str = env!("CARGO_PKG_VERSION");

struct CliOptions {
    url: Option<String>,
    page_type: PageType,
    input: Option<String>,
    json: bool,
    save_target: Option<PathBuf>,
}

enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut url: Option<String> = None;
    let mut page_type: Option<PageType> = None;
    let mut input: Option<String> = None;
    let mut json = false;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            json = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-p" | "--page-type") {
            if page_type.is_some() {
                return Err(anyhow!("--page-type specified multiple times"));
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--page-type requires a value"))?;
            page_type = Some(value.parse()?);
            i += 2;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--page-type=") {
            if page_type.is_some() {
                return Err(anyhow!("--page-type specified multiple times"));
            }
            page_type = Some(value.parse()?);
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-i" | "--input") {
            if input.is_some() {
                return Err(anyhow!("--input specified multiple times"));
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--input requires a file path or '-'"))?;
            input = Some(value.clone());
            i += 2;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--save=").or_else(|| arg.strip_prefix("-s=")) {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let path = if value.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(value)
            };
            save_target = Some(path);
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let next_is_path = (url.is_some() || input.is_some())
                && args
                    .get(i + 1)
                    .map(|next| !next.starts_with('-'))
                    .unwrap_or(false);

            if next_is_path {
                save_target = Some(PathBuf::from(args[i + 1].clone()));
                i += 2;
            } else {
                save_target = Some(PathBuf::from("."));
                i += 1;
            }

            continue;
        }

        // A lone '-' is only meaningful as the value of --input
        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        if url.is_none() {
            url = Some(arg.clone());
        } else {
            return Err(anyhow!("unexpected additional argument: {}", arg));
        }

        i += 1;
    }

    if url.is_none() && input.is_none() {
        return Err(anyhow!("missing <url> argument (or --input <FILE>)"));
    }

    Ok(CliCommand::Run(CliOptions {
        url,
        page_type: page_type.unwrap_or_default(),
        input,
        json,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} — design audit reports, normalized");
    println!("Usage: {APP_NAME} [OPTIONS] <URL>");
    println!("       {APP_NAME} [OPTIONS] --input <FILE|->\n");
    println!("Options:");
    println!("  -p, --page-type <TYPE>  Page type hint: Homepage, PLP, PDP, Blog (default Homepage)");
    println!("  -i, --input <FILE|->    Parse a saved analysis response instead of calling the service");
    println!("  -j, --json              Print the normalized report as JSON");
    println!("  -s, --save [PATH]       Save output to file");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
    println!("\nEnvironment:");
    println!("  AUDITLENS_ENDPOINT      Analysis service URL");
    println!("  AUDITLENS_TIMEOUT_SECS  Request timeout in seconds");
    println!("  RUST_LOG                Log filter (default: warn)");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_arguments(&raw_args)? {
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            print_version();
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };

    let target = options
        .url
        .as_deref()
        .map(normalize_target_url)
        .transpose()?;

    let payload = match (options.input.as_deref(), target.as_ref()) {
        (Some(source), _) => read_payload(source)?,
        (None, Some(target)) => {
            let client = AnalysisClient::new(ClientConfig::from_env()?)?;
            eprintln!("Analyzing {target} ... this may take up to a minute.");
            client.analyze(target, options.page_type).await?
        }
        (None, None) => return Err(anyhow!("missing <url> argument")),
    };

    let report = parse_report(&payload);

    let output = if options.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        json
    } else {
        let page_type = options.page_type.to_string();
        let context = RenderContext {
            target: target.as_ref().map(Url::as_str),
            page_type: target.as_ref().map(|_| page_type.as_str()),
        };
        render_markdown(&report, &context)
    };

    print!("{}", output);

    if let Some(save_base) = options.save_target {
        let extension = if options.json { "json" } else { "md" };
        let stem = output_stem(target.as_ref(), options.input.as_deref());
        let output_path = build_output_path(&save_base, &stem, extension);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }

        fs::write(&output_path, output.as_bytes())
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;

        println!("\nWrote output to {}", output_path.display());
    }

    Ok(())
}

/// Load a saved response from a file or stdin (`-`).
///
/// Bodies that look like JSON must be valid JSON; anything else is report text.
fn read_payload(source: &str) -> Result<RawReportPayload> {
    let body = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };

    tracing::debug!(source, bytes = body.len(), "loaded saved payload");

    let json_file = Path::new(source)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let payload = if json_file {
        RawReportPayload::from_json_str(&body)
    } else {
        RawReportPayload::from_body(&body)
    };
    payload.with_context(|| format!("in {source}"))
}

fn build_output_path(base: &Path, stem: &str, extension: &str) -> PathBuf {
    let has_extension = base
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false);

    if has_extension {
        base.to_path_buf()
    } else {
        base.join(format!("{stem}.{extension}"))
    }
}

fn output_stem(target: Option<&Url>, input: Option<&str>) -> String {
    if let Some(url) = target {
        return derive_output_stem(url);
    }

    input
        .filter(|source| *source != "-")
        .and_then(|source| Path::new(source).file_stem())
        .map(|stem| sanitize_for_filename(&stem.to_string_lossy()))
        .unwrap_or_else(|| "report".to_string())
}

fn derive_output_stem(url: &Url) -> String {
    let host = url.host_str().unwrap_or("page");
    let mut path_component = url.path().trim_matches('/').replace('/', "_");
    if path_component.is_empty() {
        path_component = "index".to_string();
    }

    let mut parts = vec![sanitize_for_filename(host), sanitize_for_filename(&path_component)];

    if let Some(query) = url.query()
        && !query.is_empty()
    {
        parts.push(sanitize_for_filename(query));
    }

    format!("{}__audit", parts.join("__"))
}

fn sanitize_for_filename(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
