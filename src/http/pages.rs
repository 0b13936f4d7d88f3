//! Minimal HTML pages sent with error and redirect responses.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::http::response::StatusCode;

/// Everything except RFC 3986 unreserved characters is encoded in hrefs.
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

fn description(status: StatusCode) -> &'static str {
    match status {
        StatusCode::Ok => "OK",
        StatusCode::Created => "Created",
        StatusCode::MovedPermanently => "Resource moved permanently",
        StatusCode::NotModified => "Not modified",
        StatusCode::BadRequest => "Bad request",
        StatusCode::Unauthorized => "Authorization required",
        StatusCode::Forbidden => "Access forbidden",
        StatusCode::NotFound => "Page not found",
        StatusCode::InternalServerError => "Internal server error",
        StatusCode::NotImplemented => "Not implemented",
    }
}

/// Renders the page naming `status` and a one-line description.
pub fn error_page(status: StatusCode) -> Vec<u8> {
    format!(
        "<html>\n\
         \t<head>\n\
         \t\t<meta http-equiv=\"Content-Type\" content=\"{}\"/>\n\
         \t\t<title>{} {}</title>\n\
         \t</head>\n\
         \t<body>\n\
         \tError {}<br />{}\n\
         \t</body>\n\
         </html>\n",
        HTML_CONTENT_TYPE,
        status.as_u16(),
        status.reason_phrase(),
        status.as_u16(),
        description(status),
    )
    .into_bytes()
}

/// Escapes the characters that are significant inside HTML text and attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders a directory listing: one anchor per entry, in the given order.
///
/// `entries` holds `(name, is_dir)`; directories get a trailing slash.
/// Hrefs are percent-encoded, link texts HTML-escaped.
pub fn listing_page(uri: &str, entries: &[(String, bool)]) -> Vec<u8> {
    let title = html_escape(uri);
    let mut page = format!(
        "<html>\n<head>\n<meta http-equiv=\"Content-Type\" content=\"{}\"/>\n\
         <title>Index of {}</title>\n</head>\n<body>\n<h1>Index of {}</h1>\n<ul>\n",
        HTML_CONTENT_TYPE, title, title
    );

    for (name, is_dir) in entries {
        let suffix = if *is_dir { "/" } else { "" };
        let href = utf8_percent_encode(name, HREF_ENCODE_SET);
        page.push_str(&format!(
            "<li><a href=\"{}{}\">{}{}</a></li>\n",
            href,
            suffix,
            html_escape(name),
            suffix
        ));
    }

    page.push_str("</ul>\n</body>\n</html>\n");
    page.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_names_status() {
        let page = String::from_utf8(error_page(StatusCode::NotFound)).unwrap();
        assert!(page.contains("Error 404<br />Page not found"));
    }

    #[test]
    fn listing_encodes_hrefs() {
        let entries = vec![("a b.txt".to_string(), false), ("c#d".to_string(), true)];
        let page = String::from_utf8(listing_page("/", &entries)).unwrap();

        assert!(page.contains("<a href=\"a%20b.txt\">a b.txt</a>"));
        assert!(page.contains("<a href=\"c%23d/\">c#d/</a>"));
    }

    #[test]
    fn escape() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
