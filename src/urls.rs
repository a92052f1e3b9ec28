//! Link title lookup.
//!
//! The fetch runs on its own task; the title comes back as a `NOTICE`
//! through the client's send queue.

use std::time::Duration;

use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use slirc_client::Irc;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_TITLE_CHARS: usize = 300;
/// Only this much of a page is read; `<title>` sits in the head.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct TitleFetcher {
    client: reqwest::Client,
    url: Regex,
    title: Regex,
}

impl TitleFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("slircbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: Regex::new(r"https?://[A-Za-z0-9._~:/?#\[\]@!$&'()*+,;=%-]+")?,
            title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?,
        })
    }

    /// First link in `text`, without trailing punctuation or the closing
    /// paren of `(http://...)`.
    pub fn find_url<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut url = self
            .url
            .find(text)?
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', '\'']);
        while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
            url = &url[..url.len() - 1];
        }
        (url.len() > "https://".len()).then_some(url)
    }

    /// Fetch `url` in the background and post its title to `target`.
    pub fn spawn_lookup(&self, irc: &Irc, target: &str, url: &str) {
        let client = self.client.clone();
        let title_re = self.title.clone();
        let target = target.to_string();
        let url = url.to_string();

        irc.spawn(move |irc| async move {
            if let Some(title) = fetch_title(&client, &title_re, &url).await? {
                irc.notice(&target, &format!("{title} <{url}>"));
            }
            Ok(())
        });
    }
}

async fn fetch_title(
    client: &reqwest::Client,
    title_re: &Regex,
    url: &str,
) -> anyhow::Result<Option<String>> {
    let mut response = client.get(url).send().await?.error_for_status()?;

    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if !matches!(
        mime.as_str(),
        "text/html" | "text/xml" | "application/xhtml+xml"
    ) {
        debug!(url, mime = %mime, "Not a document, skipping title");
        return Ok(None);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() >= MAX_BODY_BYTES {
            body.truncate(MAX_BODY_BYTES);
            break;
        }
    }
    Ok(extract_title(title_re, &String::from_utf8_lossy(&body)))
}

/// Title text with whitespace collapsed and common entities decoded.
fn extract_title(title_re: &Regex, html: &str) -> Option<String> {
    let raw = title_re.captures(html)?.get(1)?.as_str();
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = decode_entities(&title);
    if title.is_empty() {
        return None;
    }
    Some(title.chars().take(MAX_TITLE_CHARS).collect())
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
