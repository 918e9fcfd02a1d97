//! Markup builders for the report
//!
//! Every function here is pure: the output depends only on the arguments and
//! on the `single_page` flag (self-contained report, media embedded as data
//! URIs instead of linked files).

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::attachment::{Attachment, Body};
use crate::mime::{Mime, MimeType};

const LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer""#;

/// Default CSS classes of a step comment
pub const COMMENT_CLASS: &str = "extras_font extras_color_comment";

/// Escape `&`, `<` and `>`
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape `&`, `<`, `>` and both quote characters
pub fn escape_html_quoted(text: &str) -> String {
    escape_html(text)
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape plain text and wrap it in a preformatted block
pub fn render_text(text: &str) -> String {
    render_preformatted(&escape_html(text))
}

/// Wrap an already built fragment in a preformatted block
pub fn render_preformatted(inner_html: &str) -> String {
    format!(r#"<pre class="extras_pre">{}</pre>"#, inner_html)
}

/// Anchor for a single URI.
///
/// Files under `downloads` only show their file name.
pub fn render_uri(uri: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    let label = if uri.starts_with("downloads") {
        Path::new(uri)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| uri.to_string())
    } else {
        uri.to_string()
    };
    format!(
        r#"<a href="{}" {}>{}</a>"#,
        escape_html_quoted(uri),
        LINK_ATTRS,
        escape_html(&label)
    )
}

/// One anchor per non-blank entry, each followed by a line break
pub fn render_uri_list<'a>(uris: impl IntoIterator<Item = &'a str>) -> String {
    uris.into_iter()
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(|uri| format!("{}<br>", render_uri(uri)))
        .collect()
}

/// HTML table where the first row holds the header cells
pub fn render_table(rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table>");
    for (index, row) in rows.iter().enumerate() {
        let tag = if index == 0 { "th" } else { "td" };
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

/// Image from a file reference (clickable) or a data URI (inline)
pub fn render_image(uri: &str, single_page: bool) -> String {
    if uri.is_empty() {
        return String::new();
    }
    let uri = escape_html_quoted(uri);
    if single_page {
        format!(r#"<img src="{}" class="extras_image">"#, uri)
    } else {
        format!(
            r#"<a href="{uri}" {}><img src="{uri}" class="extras_image"></a>"#,
            LINK_ATTRS
        )
    }
}

/// Inline SVG markup, linked to its file unless the report is self-contained
pub fn render_svg(uri: &str, markup: &str, single_page: bool) -> String {
    if uri.is_empty() || markup.is_empty() {
        return String::new();
    }
    if single_page {
        markup.to_string()
    } else {
        format!(r#"<a href="{}" {}>{}</a>"#, escape_html_quoted(uri), LINK_ATTRS, markup)
    }
}

pub fn render_video(uri: &str, mime: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    format!(
        r#"<video controls class="extras_video"><source src="{}" type="{}">Your browser does not support the video tag.</video>"#,
        escape_html_quoted(uri),
        mime
    )
}

pub fn render_audio(uri: &str, mime: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    format!(
        r#"<audio controls class="extras_audio"><source src="{}" type="{}">Your browser does not support the audio tag.</audio>"#,
        escape_html_quoted(uri),
        mime
    )
}

pub fn render_page_source(uri: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    format!(
        r#"<a href="{}" {} class="extras_page_src">[page source]</a>"#,
        escape_html_quoted(uri),
        LINK_ATTRS
    )
}

pub fn render_comment(comment: &str, class: &str) -> String {
    if comment.is_empty() {
        return String::new();
    }
    format!(r#"<span class="{}">{}</span>"#, class, comment)
}

/// Markup of an attachment shown below a step comment
pub fn render_attachment(attachment: Option<&Attachment>) -> String {
    let Some(attachment) = attachment else {
        return String::new();
    };
    if attachment.is_blank() {
        return String::new();
    }

    match (attachment.inner_html(), attachment.mime()) {
        (Some(inner), None) => format!(" {}", inner),
        (Some(inner), Some(mime)) if mime.known() == Some(Mime::Html) => {
            format!(r#"<br><iframe class="extras_iframe" src="{}"></iframe>"#, inner)
        }
        (Some(inner), Some(mime)) if mime.known() == Some(Mime::Svg) => inner.to_string(),
        (Some(inner), Some(_)) => render_preformatted(inner),
        (None, mime) => match attachment.body() {
            Some(Body::Bytes(bytes)) => render_embedded_media(bytes, mime),
            _ => render_text(attachment.text_body().unwrap_or_default()),
        },
    }
}

/// Binary body embedded as a data URI; empty for non-media kinds
fn render_embedded_media(bytes: &[u8], mime: Option<&MimeType>) -> String {
    let Some(mime) = mime.filter(|m| m.is_multimedia() || m.is_audio()) else {
        return String::new();
    };
    let uri = format!("data:{};base64,{}", mime.as_str(), STANDARD.encode(bytes));
    if mime.is_video() {
        render_video(&uri, mime.as_str())
    } else if mime.is_audio() {
        render_audio(&uri, mime.as_str())
    } else {
        render_image(&uri, true)
    }
}

/// Table row of a test step.
///
/// With multimedia the row has two cells (comment, media plus optional page
/// source link); without it a single cell spans both columns and carries the
/// attachment markup.
pub fn render_step_row(
    comment: &str,
    multimedia: Option<&str>,
    source: Option<&str>,
    attachment: Option<&Attachment>,
    single_page: bool,
    class: &str,
) -> String {
    let comment = render_comment(comment, class);

    let Some(uri) = multimedia.filter(|uri| !uri.is_empty()) else {
        return format!(
            r#"<tr><td colspan="2">{}{}</td></tr>"#,
            comment,
            render_attachment(attachment)
        );
    };

    let media = match attachment.and_then(Attachment::mime) {
        Some(mime) if mime.as_str().starts_with("image/svg") => {
            render_svg(uri, attachment.and_then(Attachment::inner_html).unwrap_or_default(), single_page)
        }
        Some(mime) if mime.is_video() => render_video(uri, mime.as_str()),
        Some(mime) if mime.is_audio() => render_audio(uri, mime.as_str()),
        _ => render_image(uri, single_page),
    };

    let cell = match source.filter(|s| !s.is_empty()) {
        Some(source) => format!("{}<br>{}", media, render_page_source(source)),
        None => media,
    };
    format!(
        r#"<tr><td>{}</td><td class="extras_td"><div class="extras_td_div">{}</div></td></tr>"#,
        comment, cell
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::MimeType;

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=\"x\"&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html_quoted("\"'"), "&quot;&#x27;");
    }

    #[test]
    fn test_render_uri_downloads_label() {
        let html = render_uri("downloads/4f2a.pdf");
        assert!(html.contains(r#"href="downloads/4f2a.pdf""#));
        assert!(html.ends_with(">4f2a.pdf</a>"));

        let html = render_uri("https://example.com/a");
        assert!(html.ends_with(">https://example.com/a</a>"));
        assert_eq!(render_uri(""), "");
    }

    #[test]
    fn test_render_uri_list_skips_blank() {
        let html = render_uri_list(["http://a", "", "  ", "http://b"]);
        assert_eq!(html.matches("<a ").count(), 2);
        assert_eq!(html.matches("<br>").count(), 2);
    }

    #[test]
    fn test_render_table_header_row() {
        let rows = vec![vec!["h1".to_string(), "h2".to_string()], vec!["1".to_string(), "<2>".to_string()]];
        assert_eq!(
            render_table(&rows),
            "<table><tr><th>h1</th><th>h2</th></tr><tr><td>1</td><td>&lt;2&gt;</td></tr></table>"
        );
    }

    #[test]
    fn test_render_image_modes() {
        assert_eq!(
            render_image("data:image/png;base64,AAAA", true),
            r#"<img src="data:image/png;base64,AAAA" class="extras_image">"#
        );
        let linked = render_image("images/x.png", false);
        assert!(linked.starts_with(r#"<a href="images/x.png""#));
        assert!(linked.contains(r#"<img src="images/x.png" class="extras_image">"#));
        assert_eq!(render_image("", false), "");
    }

    #[test]
    fn test_render_svg_modes() {
        assert_eq!(render_svg("images/a.svg", "<svg/>", true), "<svg/>");
        assert!(render_svg("images/a.svg", "<svg/>", false).starts_with("<a href="));
        assert_eq!(render_svg("images/a.svg", "", false), "");
    }

    #[test]
    fn test_render_video_type() {
        let html = render_video("videos/a.webm", "video/webm");
        assert!(html.contains(r#"type="video/webm""#));
        assert!(html.starts_with("<video controls"));
    }

    #[test]
    fn test_render_attachment_variants() {
        assert_eq!(render_attachment(None), "");
        assert_eq!(
            render_attachment(Some(&Attachment::text("a < b"))),
            r#"<pre class="extras_pre">a &lt; b</pre>"#
        );

        let html = Attachment::with_markup(Mime::Html, "<p/>".into(), "data:text/html;base64,PHAvPg==".into());
        assert!(render_attachment(Some(&html)).contains("<iframe"));

        let csv = Attachment::with_markup(Mime::Csv, "a".into(), "<table></table>".into());
        assert_eq!(render_attachment(Some(&csv)), r#"<pre class="extras_pre"><table></table></pre>"#);

        let download = Attachment::download(None, "<a>f</a>".into());
        assert_eq!(render_attachment(Some(&download)), " <a>f</a>");
    }

    #[test]
    fn test_render_attachment_bytes_never_shown_as_text() {
        let png = Attachment::with_bytes(Mime::Png.into(), vec![0, 0, 0, 0x18]);
        assert_eq!(
            render_attachment(Some(&png)),
            r#"<img src="data:image/png;base64,AAAAGA==" class="extras_image">"#
        );

        let clip = Attachment::with_bytes(Mime::Mp4.into(), vec![1]);
        assert!(render_attachment(Some(&clip)).starts_with("<video controls"));

        let blob = Attachment::with_bytes(MimeType::Custom("application/zip".into()), vec![1, 2]);
        assert_eq!(render_attachment(Some(&blob)), "");
    }

    #[test]
    fn test_step_row_comment_only() {
        let row = render_step_row("Open page", None, None, None, false, COMMENT_CLASS);
        assert_eq!(
            row,
            r#"<tr><td colspan="2"><span class="extras_font extras_color_comment">Open page</span></td></tr>"#
        );
    }

    #[test]
    fn test_step_row_with_media_and_source() {
        let row = render_step_row(
            "Login",
            Some("images/a.png"),
            Some("sources/a.txt"),
            None,
            false,
            COMMENT_CLASS,
        );
        assert!(row.contains(r#"<td class="extras_td">"#));
        assert!(row.contains("[page source]"));
        assert!(row.contains("<img src=\"images/a.png\""));
    }

    #[test]
    fn test_step_row_video() {
        let video = Attachment::with_bytes(MimeType::Known(Mime::Mp4), vec![1, 2, 3]);
        let row = render_step_row("Clip", Some("videos/a.mp4"), None, Some(&video), false, COMMENT_CLASS);
        assert!(row.contains("<video controls"));
        assert!(row.contains(r#"type="video/mp4""#));
    }
}
