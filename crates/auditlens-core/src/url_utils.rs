use anyhow::{Context, Result, anyhow};
use url::Url;

/// Turn user input into an absolute http(s) URL for the analysis service.
///
/// Adds `https://` when no scheme is given; any other scheme, or a URL
/// without a host, is rejected.
pub fn normalize_target_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("missing target URL"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).with_context(|| format!("invalid URL: {trimmed}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("unsupported URL scheme: {}", parsed.scheme()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("URL has no host: {trimmed}"));
    }

    Ok(parsed)
}
