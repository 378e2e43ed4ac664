//! Server-rendered HTML pages.
//!
//! Each page is a plain struct holding what the template needs; `render`
//! turns it into a complete document. Every dynamic value goes through
//! `escape`.

use cobj_core::{ObjectType, Record, PROPERTY_SET};

pub const HOME_TITLE: &str = "Custom Objects | Integrating With HubSpot I Practicum";
pub const FORM_TITLE: &str = "Update Custom Object Form | Integrating With HubSpot I Practicum";

/// Model of the record list page.
#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub title: &'static str,
    pub records: Vec<Record>,
    pub object_type: ObjectType,
    pub error: Option<&'static str>,
}

impl HomePage {
    pub fn render(&self) -> String {
        let mut body = format!(
            r#"<h1>Custom Object Records</h1>
<p class="subtitle">Object type: <code>{}</code></p>
"#,
            escape(self.object_type.as_str())
        );
        if let Some(error) = self.error {
            body.push_str(&error_banner(error));
        }

        if self.records.is_empty() {
            body.push_str(r#"<p class="empty">No records found.</p>"#);
        } else {
            body.push_str("<table class=\"records\">\n<thead><tr>");
            for name in PROPERTY_SET {
                body.push_str(&format!("<th>{}</th>", escape(&capitalize(name))));
            }
            body.push_str("</tr></thead>\n<tbody>\n");
            for record in &self.records {
                body.push_str(&record_row(record));
            }
            body.push_str("</tbody>\n</table>");
        }

        body.push_str(
            r#"
<p><a class="button" href="/update-cobj">Add a record to this table</a></p>"#,
        );
        layout(self.title, &body)
    }
}

/// Model of the record creation form.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateForm {
    pub title: &'static str,
    pub error: Option<&'static str>,
}

impl UpdateForm {
    pub fn render(&self) -> String {
        let mut body = String::from("<h1>Update Custom Object Form</h1>\n");
        if let Some(error) = self.error {
            body.push_str(&error_banner(error));
        }
        body.push_str(
            r#"<form method="POST" action="/update-cobj">
  <label for="name">Name</label>
  <input type="text" id="name" name="name" required>
  <label for="movie">Movie</label>
  <input type="text" id="movie" name="movie">
  <label for="actor">Actor</label>
  <input type="text" id="actor" name="actor">
  <button type="submit">Create record</button>
</form>
<p><a href="/">Return to the homepage</a></p>"#,
        );
        layout(self.title, &body)
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/css/style.css">
</head>
<body>
<nav><a href="/">Records</a><a href="/update-cobj">New record</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn error_banner(message: &str) -> String {
    format!("<div class=\"error\" role=\"alert\">{}</div>\n", escape(message))
}

fn record_row(record: &Record) -> String {
    let cells: String = PROPERTY_SET
        .iter()
        .map(|name| format!("<td>{}</td>", escape(&record.display_property(name))))
        .collect();
    format!("<tr data-id=\"{}\">{cells}</tr>\n", escape(&record.id))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
