//! Server-rendered HTML. Every interpolated value goes through [`esc`] or [`attr`].

use axum::http::StatusCode;
use std::borrow::Cow;
use std::fmt::Write;

use super::flash::Flash;
use super::validation::FormErrors;

pub mod accounts;
pub mod tasks;

const STYLE: &str = "body{font-family:sans-serif;max-width:42rem;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem}.flash{padding:.5rem;margin:.5rem 0;border-radius:4px}\
.success{background:#e6f4ea}.info{background:#e8f0fe}.warning{background:#fef7e0}\
.danger{background:#fce8e6}.error{color:#b3261e;font-size:.9rem}\
.done{text-decoration:line-through;color:#777}img.avatar{width:64px;height:64px;border-radius:50%}\
.placeholder{display:inline-block;width:64px;height:64px;line-height:64px;text-align:center;border-radius:50%;background:#ddd}\
form.inline{display:inline}";

pub(crate) fn esc(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

pub(crate) fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

pub(crate) fn layout(title: &str, nav: &str, flashes: &[Flash], body: &str) -> String {
    let mut notices = String::new();
    for flash in flashes {
        let _ = write!(
            notices,
            r#"<div class="flash {}">{}</div>"#,
            flash.category.as_str(),
            esc(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav>{nav}</nav>
{notices}
<main>
{body}
</main>
</body>
</html>
"#,
        title = esc(title),
    )
}

/// Inline messages for one field.
pub(crate) fn field_errors(errors: &FormErrors, field: &str) -> String {
    errors.for_field(field).fold(String::new(), |mut out, msg| {
        let _ = write!(out, r#"<div class="error">{}</div>"#, esc(msg));
        out
    })
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    layout(
        reason,
        r#"<a href="/">Home</a>"#,
        &[],
        &format!(
            "<h1>{} {}</h1>\n<p>{}</p>",
            status.as_u16(),
            esc(reason),
            esc(message)
        ),
    )
}
