//! Content extraction for fetched wiki pages
//!
//! This module turns a raw page payload into:
//! - One plain-text line (the article body with all markup removed)
//! - Zero or more discovered in-wiki links, one hop deeper than the source
//!
//! Missing markers or malformed markup degrade to empty output, never to an
//! error.

use crate::config::SiteConfig;
use crate::crawler::frontier::PageTask;
use regex::Regex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// A wiki path found in a page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Path including the content prefix, e.g. `/wiki/World`
    pub path: String,

    /// Depth of the page the link points to
    pub depth: u32,
}

/// Messages on the link stream from extractor to router
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A candidate link to route
    Discovered(DiscoveredLink),

    /// Every link of one source page has been sent
    SourceDone,
}

/// Output of extracting a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Body text with all markup removed
    pub text: String,

    /// Links in document order
    pub links: Vec<DiscoveredLink>,
}

/// Counters for the extract stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Pages processed
    pub pages: usize,

    /// Pages whose isolated body was empty
    pub empty_bodies: usize,

    /// Links forwarded to the router
    pub links: usize,
}

/// Extracts body text and links from fetched pages
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    start_marker: String,
    end_marker: String,
    link_pattern: Regex,
}

impl ContentExtractor {
    /// Creates an extractor for the given site layout
    ///
    /// The link pattern matches `<a ... href="PREFIX...">` where the captured
    /// path carries no query string.
    pub fn new(site: &SiteConfig) -> Result<Self, regex::Error> {
        let link_pattern = Regex::new(&format!(
            r#"<a[^>]*href="({}[^?"]+)"[^>]*>"#,
            regex::escape(&site.content_prefix)
        ))?;

        Ok(Self {
            start_marker: site.body_start_marker.clone(),
            end_marker: site.body_end_marker.clone(),
            link_pattern,
        })
    }

    /// Extracts one page, consuming its task
    pub fn extract(&self, mut task: PageTask) -> ExtractedPage {
        task.content = isolate_body(&task.content, &self.start_marker, &self.end_marker);
        task.content = strip_tags_except_anchors(&task.content);

        let text = collapse_whitespace(&strip_all_tags(&task.content));
        let links = self
            .scan_links(&task.content)
            .into_iter()
            .map(|path| DiscoveredLink {
                path,
                depth: task.depth + 1,
            })
            .collect();

        ExtractedPage { text, links }
    }

    /// Finds every content-path anchor target in document order
    pub fn scan_links(&self, content: &str) -> Vec<String> {
        self.link_pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Runs the extract stage until the page stream closes
    ///
    /// Each page yields one text line and its links followed by a
    /// `SourceDone` marker. Both output streams close when this returns.
    pub async fn run(
        self,
        mut pages: UnboundedReceiver<PageTask>,
        lines: UnboundedSender<String>,
        links: UnboundedSender<LinkEvent>,
    ) -> ExtractStats {
        let mut stats = ExtractStats::default();

        while let Some(task) = pages.recv().await {
            let source = task.target.clone();
            let page = self.extract(task);

            stats.pages += 1;
            if page.text.is_empty() {
                stats.empty_bodies += 1;
                tracing::debug!("No body text in {}", source);
            }
            tracing::debug!("Extracted {} links from {}", page.links.len(), source);

            if lines.send(page.text).is_err() {
                tracing::trace!("Text stream has no consumer");
            }

            for link in page.links {
                stats.links += 1;
                if links.send(LinkEvent::Discovered(link)).is_err() {
                    tracing::warn!("Link router stopped, discarding links from {}", source);
                    break;
                }
            }
            let _ = links.send(LinkEvent::SourceDone);
        }

        stats
    }
}

/// Isolates the article body between the start and end marker lines
///
/// Everything up to and including the first line containing `start_marker`
/// is dropped, as is everything from the first following line containing
/// `end_marker`. Without a start marker the body is empty; without an end
/// marker it runs to the end of input.
pub fn isolate_body(content: &str, start_marker: &str, end_marker: &str) -> String {
    let mut body = String::new();
    let mut in_body = false;

    for line in content.split_inclusive('\n') {
        if !in_body {
            in_body = line.contains(start_marker);
            continue;
        }
        if line.contains(end_marker) {
            break;
        }
        body.push_str(line);
    }

    body
}

/// Removes every tag except opening anchor tags
pub fn strip_tags_except_anchors(content: &str) -> String {
    scan_tags(content, is_anchor_open)
}

/// Removes every tag, anchors included
pub fn strip_all_tags(content: &str) -> String {
    scan_tags(content, |_| false)
}

/// Collapses whitespace runs to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// How a `<` was resolved by [`tag_len`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagEnd {
    /// A tag of this many bytes
    Tag(usize),
    /// The `<` is plain text
    Text,
    /// A quote or comment ran to the end of the input without closing
    Unterminated,
}

/// Copies `input`, keeping only the tags accepted by `keep`
///
/// A `<` that does not open a tag is kept as text. A tag whose quoted value
/// or comment never closes ends at its first `>` instead, and quotes are
/// ignored from then on, so every byte is scanned a bounded number of times.
fn scan_tags(input: &str, keep: impl Fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut honor_quotes = true;
    let mut comment_end_absent = false;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        let end = if candidate.starts_with("<!--") {
            if comment_end_absent {
                TagEnd::Unterminated
            } else {
                match candidate[4..].find("-->") {
                    Some(close) => TagEnd::Tag(close + 4 + 3),
                    None => {
                        comment_end_absent = true;
                        TagEnd::Unterminated
                    }
                }
            }
        } else {
            tag_len(candidate, honor_quotes)
        };

        let len = match end {
            TagEnd::Tag(len) => len,
            TagEnd::Text => {
                out.push('<');
                rest = &candidate[1..];
                continue;
            }
            TagEnd::Unterminated => {
                honor_quotes = false;
                match candidate.find('>') {
                    Some(gt) => gt + 1,
                    None => {
                        // No `>` left, so nothing after this point closes a tag.
                        out.push_str(candidate);
                        rest = "";
                        break;
                    }
                }
            }
        };

        let tag = &candidate[..len];
        if keep(tag) {
            out.push_str(tag);
        }
        rest = &candidate[len..];
    }

    out.push_str(rest);
    out
}

/// Resolves the tag `s` starts with
///
/// With `honor_quotes`, quoted attribute values may contain `>`.
fn tag_len(s: &str, honor_quotes: bool) -> TagEnd {
    let bytes = s.as_bytes();
    let Some(&first) = bytes.get(1) else {
        return TagEnd::Text;
    };
    if !(first.is_ascii_alphabetic() || matches!(first, b'/' | b'!' | b'?')) {
        return TagEnd::Text;
    }

    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'>' => return TagEnd::Tag(i + 1),
                b'"' | b'\'' if after_equals && honor_quotes => quote = Some(b),
                b'=' => {
                    after_equals = true;
                    continue;
                }
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_equals = false;
        }
    }

    TagEnd::Unterminated
}

/// Whether `tag` is an opening `<a ...>` tag
fn is_anchor_open(tag: &str) -> bool {
    let name_len = tag[1..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    tag[1..1 + name_len].eq_ignore_ascii_case("a")
}
