//! Digest rendering.
//!
//! Turns the run's summaries into the two bodies of the outgoing email: a
//! plain-text version and an inline-styled HTML version with one card per
//! article. Both renderings list articles in the order they were fetched and
//! label them `Article 1..n` from their compacted index.
//!
//! Article text comes from third parties, so every interpolated value is
//! HTML-escaped before it lands in the HTML body.

use crate::models::{Digest, Summary};

/// Heading and default subject of the digest.
pub const DEFAULT_TITLE: &str = "Daily News Summary";

/// Render `summaries` under `title`.
pub fn compose(title: &str, summaries: &[Summary]) -> Digest {
    Digest {
        plain: render_plain(title, summaries),
        html: render_html(title, summaries),
    }
}

fn render_plain(title: &str, summaries: &[Summary]) -> String {
    let mut out = format!("{title}\n\n");
    for summary in summaries {
        out.push_str(&format!(
            "Article {}:\nTitle: {}\nSource: {}\nSummary: {}\n\n",
            summary.index + 1,
            summary.title,
            summary.source_name,
            summary.text,
        ));
    }
    out
}

fn render_html(title: &str, summaries: &[Summary]) -> String {
    let mut cards = String::new();
    for summary in summaries {
        cards.push_str(&format!(
            r#"
      <div style="border: 1px solid #ddd; margin: 20px 0; padding: 15px; border-radius: 8px; background-color: #f9f9f9;">
        <h3 style="color: #34495e; margin-top: 0;">Article {number}</h3>
        <h4 style="color: #2980b9;">{title}</h4>
        <p style="color: #7f8c8d; font-size: 14px;"><strong>Source:</strong> {source}</p>
        <p style="color: #2c3e50; line-height: 1.6;">{text}</p>
      </div>"#,
            number = summary.index + 1,
            title = html_escape(&summary.title),
            source = html_escape(&summary.source_name),
            text = html_escape(&summary.text),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <h2 style="color: #2c3e50;">{title}</h2>
    <div style="font-family: Arial, sans-serif; max-width: 800px;">{cards}
    </div>
  </body>
</html>
"#,
        title = html_escape(title),
        cards = cards,
    )
}

/// Escape the five HTML-significant characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
