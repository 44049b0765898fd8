use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

use super::RenderedEmail;
use crate::markup::is_web_url;

const BRAND: &str = "NaviLead";
const BRAND_COLOR: &str = "#1f6feb";

/// Builds the HTML and plain-text versions of an email side by side
pub(super) struct EmailBody {
    heading: String,
    html: String,
    text: String,
}

impl EmailBody {
    pub(super) fn new(heading: &str) -> Self {
        EmailBody {
            heading: heading.to_string(),
            html: String::new(),
            text: format!("{}\n\n", heading),
        }
    }

    pub(super) fn paragraph(mut self, text: &str) -> Self {
        self.html.push_str(&format!(
            r#"<p style="margin:0 0 16px 0;font-size:15px;line-height:1.6;color:#333333;">{}</p>"#,
            encode_text(text).replace('\n', "<br>")
        ));
        self.text.push_str(text);
        self.text.push_str("\n\n");
        self
    }

    /// Call-to-action link. Anything but an http(s) URL is dropped.
    pub(super) fn button(mut self, label: &str, url: &str) -> Self {
        if !is_web_url(url) {
            warn!(label, "dropping email button with a non-web URL");
            return self;
        }
        self.html.push_str(&format!(
            r#"<p style="margin:24px 0;text-align:center;"><a href="{url}" style="display:inline-block;padding:12px 24px;background-color:{color};color:#ffffff;text-decoration:none;border-radius:4px;font-weight:bold;">{label}</a></p>"#,
            url = encode_double_quoted_attribute(url),
            color = BRAND_COLOR,
            label = encode_text(label),
        ));
        self.text.push_str(&format!("{}: {}\n\n", label, url));
        self
    }

    /// Label/value rows; rows with an empty value are skipped
    pub(super) fn details(mut self, rows: &[(&str, Option<String>)]) -> Self {
        let rows: Vec<(&str, &str)> = rows
            .iter()
            .filter_map(|(label, value)| match value.as_deref() {
                Some(v) if !v.trim().is_empty() => Some((*label, v)),
                _ => None,
            })
            .collect();
        if rows.is_empty() {
            return self;
        }

        self.html.push_str(
            r#"<table role="presentation" style="width:100%;border-collapse:collapse;margin:0 0 16px 0;">"#,
        );
        for (label, value) in &rows {
            self.html.push_str(&format!(
                r#"<tr><td style="padding:8px;border-bottom:1px solid #eeeeee;font-weight:bold;color:#555555;width:35%;">{}</td><td style="padding:8px;border-bottom:1px solid #eeeeee;color:#333333;">{}</td></tr>"#,
                encode_text(label),
                encode_text(value).replace('\n', "<br>"),
            ));
            self.text.push_str(&format!("{}: {}\n", label, value));
        }
        self.html.push_str("</table>");
        self.text.push('\n');
        self
    }

    pub(super) fn notice(mut self, text: &str) -> Self {
        self.html.push_str(&format!(
            r#"<div style="margin:16px 0;padding:12px 16px;background-color:#fff3cd;border:1px solid #ffeaa7;border-radius:4px;color:#856404;font-size:14px;">{}</div>"#,
            encode_text(text)
        ));
        self.text.push_str(text);
        self.text.push_str("\n\n");
        self
    }

    pub(super) fn finish(self, subject: String) -> RenderedEmail {
        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
</head>
<body style="margin:0;padding:0;background-color:#f4f5f7;font-family:Arial,Helvetica,sans-serif;">
<table role="presentation" style="width:100%;border-collapse:collapse;background-color:#f4f5f7;">
<tr><td style="padding:24px 0;">
<table role="presentation" style="max-width:600px;width:100%;margin:0 auto;border-collapse:collapse;background-color:#ffffff;border-radius:8px;">
<tr><td style="padding:20px 32px;background-color:{color};border-radius:8px 8px 0 0;color:#ffffff;font-size:20px;font-weight:bold;">{brand}</td></tr>
<tr><td style="padding:32px;">
<h1 style="margin:0 0 24px 0;font-size:22px;color:#111111;">{heading}</h1>
{content}
</td></tr>
<tr><td style="padding:16px 32px;background-color:#f8f9fa;border-radius:0 0 8px 8px;font-size:12px;color:#6c757d;text-align:center;">This is an automated message from {brand}. Please do not reply to this email.</td></tr>
</table>
</td></tr>
</table>
</body>
</html>"#,
            title = encode_text(&subject),
            color = BRAND_COLOR,
            brand = BRAND,
            heading = encode_text(&self.heading),
            content = self.html,
        );

        let mut text = self.text;
        text.push_str(&format!("-- \n{}", BRAND));

        RenderedEmail {
            subject,
            html,
            text,
        }
    }
}
