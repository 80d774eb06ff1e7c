//! HTML rendering for the memoir page
//!
//! Plain string building; every piece of user or API text goes through
//! [`escape_html`].

use super::{Notification, PageController, PanelState};
use crate::models::{Draft, Record};
use std::fmt::Write;
use uuid::Uuid;

const STYLE: &str = r#"
body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f0f2f5; color: #000000d9; }
header { height: 64px; background: #001529; }
main { padding: 0 50px; }
.content { min-height: 280px; padding: 24px; margin-top: 24px; background: #fff; }
.toolbar { display: flex; justify-content: flex-end; margin-bottom: 16px; }
button { cursor: pointer; border: 1px solid #d9d9d9; background: #fff; padding: 4px 15px; border-radius: 2px; }
button.primary { background: #1890ff; border-color: #1890ff; color: #fff; }
button[disabled] { cursor: not-allowed; opacity: .6; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 16px; border-bottom: 1px solid #f0f0f0; }
th { background: #fafafa; }
.inert { color: #00000040; margin-right: 16px; }
.empty { text-align: center; color: #00000040; }
aside { position: fixed; top: 0; right: 0; width: 320px; height: 100%; background: #fff; box-shadow: -6px 0 16px #00000014; padding: 24px; box-sizing: border-box; }
aside h2 { display: flex; justify-content: space-between; font-size: 16px; margin-top: 0; }
label { display: block; margin: 16px 0 8px; }
input { width: 100%; box-sizing: border-box; padding: 4px 11px; border: 1px solid #d9d9d9; }
input.invalid { border-color: #ff4d4f; }
.field-error { color: #ff4d4f; font-size: 14px; }
form.save button { width: 100%; margin-top: 24px; }
.notification { position: fixed; top: 24px; right: 24px; width: 360px; padding: 16px 24px; background: #fff; border-left: 4px solid #ff4d4f; box-shadow: 0 3px 6px #0000001f; }
.notification strong { display: block; margin-bottom: 8px; }
footer { text-align: center; padding: 24px 50px; }
"#;

/// Render the full page for `page_id`.
///
/// `notification` is passed separately because it is consumed by the caller
/// so it shows exactly once.
pub fn render_page(
    page_id: &Uuid,
    page: &PageController,
    notification: Option<&Notification>,
) -> String {
    let base = format!("/pages/{}", page_id);
    let mut body = String::new();

    body.push_str("<div class=\"content\">");
    let _ = write!(
        body,
        "<div class=\"toolbar\"><form method=\"post\" action=\"{}/panel/open\">\
         <button type=\"submit\" class=\"primary\">+ Create</button></form></div>",
        base
    );
    body.push_str(&render_table(page.records()));
    body.push_str("</div>");

    if page.panel().is_visible() {
        body.push_str(&render_panel(&base, page.panel()));
    }
    if let Some(notification) = notification {
        body.push_str(&render_notification(notification));
    }

    // Poll while a submission from another tab or request is still running
    let head_extra = if page.panel().is_submitting() {
        "<meta http-equiv=\"refresh\" content=\"1\">"
    } else {
        ""
    };

    layout("Memoirs", head_extra, &body)
}

/// Standalone error page used by the page-level error handler
pub fn render_error_page(title: &str, detail: &str) -> String {
    let body = format!(
        "<div class=\"content\"><h1>{}</h1><p>{}</p><p><a href=\"/\">Back to the list</a></p></div>",
        escape_html(title),
        escape_html(detail)
    );
    layout(title, "", &body)
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         {head_extra}<title>{title}</title>\n<style>{style}</style>\n</head>\n\
         <body>\n<header></header>\n<main>{body}</main>\n\
         <footer>Memoirs {version}</footer>\n</body>\n</html>\n",
        head_extra = head_extra,
        style = STYLE,
        title = escape_html(title),
        body = body,
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn render_table(records: &[Record]) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Name</th><th>Value</th><th>Actions</th></tr></thead><tbody>",
    );

    if records.is_empty() {
        html.push_str("<tr><td colspan=\"3\" class=\"empty\">No memoirs yet</td></tr>");
    }

    for record in records {
        // Copy/Edit have no behavior behind them; rendered as disabled labels only
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>\
             <span class=\"inert\" aria-disabled=\"true\">Copy</span>\
             <span class=\"inert\" aria-disabled=\"true\">Edit</span></td></tr>",
            escape_html(&record.label),
            escape_html(&record.value)
        );
    }

    html.push_str("</tbody></table>");
    html
}

fn render_panel(base: &str, panel: &PanelState) -> String {
    let empty = Draft::default();
    let draft = panel.draft().unwrap_or(&empty);
    let errors = panel.field_errors();
    let busy = panel.is_submitting();
    let disabled = if busy { " disabled" } else { "" };

    let mut html = String::from("<aside aria-label=\"Create a new memoir\">");
    let _ = write!(
        html,
        "<h2>Create a new memoir<form method=\"post\" action=\"{}/panel/close\">\
         <button type=\"submit\" aria-label=\"Close\"{}>&times;</button></form></h2>",
        base, disabled
    );

    let _ = write!(
        html,
        "<form class=\"save\" method=\"post\" action=\"{}/records\">",
        base
    );
    html.push_str(&render_field("label", "Name", &draft.label, errors.label, busy));
    html.push_str(&render_field("value", "Value", &draft.value, errors.value, busy));
    let _ = write!(
        html,
        "<button type=\"submit\" class=\"primary\"{}>{}</button></form></aside>",
        disabled,
        if busy { "Saving&hellip;" } else { "Save" }
    );

    html
}

fn render_field(
    name: &str,
    label: &str,
    value: &str,
    error: Option<&str>,
    disabled: bool,
) -> String {
    let placeholder = format!("Please enter the {}", label.to_lowercase());
    let mut html = format!(
        "<label for=\"{name}\">{label}</label>\
         <input id=\"{name}\" name=\"{name}\" value=\"{value}\" placeholder=\"{placeholder}\" required{class}{disabled}>",
        name = name,
        label = label,
        value = escape_html(value),
        placeholder = placeholder,
        class = if error.is_some() { " class=\"invalid\"" } else { "" },
        disabled = if disabled { " disabled" } else { "" },
    );
    if let Some(message) = error {
        let _ = write!(
            html,
            "<div class=\"field-error\" role=\"alert\">{}</div>",
            escape_html(message)
        );
    }
    html
}

fn render_notification(notification: &Notification) -> String {
    format!(
        "<div class=\"notification\" role=\"status\"><strong>{}</strong>{}</div>",
        escape_html(&notification.message),
        escape_html(&notification.description)
    )
}

/// Escape text for HTML element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
