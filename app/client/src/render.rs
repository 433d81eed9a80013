//! Message rendering to HTML.
//!
//! Human text is shown verbatim (escaped). Answers are GitHub-flavoured
//! markdown; links open in a new tab and fenced code keeps its
//! `language-*` class for highlighting.

use protocol::{Message, Role};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::escape_href;

/// URL schemes a rendered link or image may use. Relative URLs are
/// always kept.
const SAFE_SCHEMES: [&str; 5] = ["http", "https", "mailto", "ircs", "xmpp"];

/// Render one conversation entry.
pub fn render(message: &Message) -> String {
    match message.name {
        Role::Ai => render_markdown(&message.text),
        Role::Human | Role::System => escape_html(&message.text),
    }
}

/// Render markdown with tables, strikethrough and task lists.
///
/// Raw HTML in the source is shown as text, never passed through.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => Event::InlineHtml(CowStr::from(open_link(&dest_url, &title))),
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::from(safe_url(&dest_url).to_owned()),
            title,
            id,
        }),
        event => event,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

/// Opening anchor tag that opens in a new tab.
fn open_link(dest_url: &str, title: &str) -> String {
    let mut open = String::from("<a href=\"");
    let _ = escape_href(&mut open, safe_url(dest_url));
    open.push('"');
    if !title.is_empty() {
        open.push_str(" title=\"");
        open.push_str(&escape_html(title));
        open.push('"');
    }
    open.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
    open
}

/// `url` if it is relative or uses a safe scheme, empty otherwise.
fn safe_url(url: &str) -> &str {
    let scheme_end = url.find(':');
    let path_start = url.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => url,
        (Some(colon), _) => {
            let scheme = &url[..colon];
            if SAFE_SCHEMES
                .iter()
                .any(|safe| scheme.eq_ignore_ascii_case(safe))
            {
                url
            } else {
                ""
            }
        }
        (None, _) => url,
    }
}
