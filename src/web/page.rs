//! HTML rendering for the browser gateway.

use crate::service::ListFilesResponse;

/// Render the index page: upload form plus one link per stored file.
pub fn render_index(listing: &ListFilesResponse) -> String {
    let mut items = String::new();
    for file in &listing.files {
        items.push_str(&format!(
            "            <li>\n                <a href=\"/download?filename={}\">{}</a>\n                (Created: {})\n            </li>\n",
            urlencoding::encode(&file.name),
            escape_html(&file.name),
            escape_html(&file.created_at),
        ));
    }
    if listing.files.is_empty() {
        items.push_str("            <p>No files found</p>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>File Management</title>
</head>
<body>
    <h1>File Management</h1>
    <h2>Upload File</h2>
    <form action="/upload" method="POST" enctype="multipart/form-data">
        <input type="file" name="file">
        <button type="submit">Upload</button>
    </form>
    <h2>Files</h2>
    <ul>
{}    </ul>
</body>
</html>
"#,
        items
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `Content-Disposition` value for a download. The quoted fallback keeps to
/// printable ASCII; the exact name travels in `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FileMetadata;

    #[test]
    fn empty_listing_says_so() {
        let page = render_index(&ListFilesResponse { files: vec![] });
        assert!(page.contains("No files found"));
        assert!(page.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn names_are_escaped_and_linked() {
        let page = render_index(&ListFilesResponse {
            files: vec![FileMetadata {
                name: "<b>&x y.txt".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
                updated_at: "2024-01-01T00:00:00Z".into(),
            }],
        });
        assert!(page.contains("&lt;b&gt;&amp;x y.txt"));
        assert!(page.contains("/download?filename=%3Cb%3E%26x%20y.txt"));
        assert!(!page.contains("No files found"));
    }

    #[test]
    fn disposition_is_header_safe() {
        assert_eq!(
            content_disposition("a.txt"),
            "attachment; filename=\"a.txt\"; filename*=UTF-8''a.txt"
        );
        let value = content_disposition("na\"me ü.txt");
        assert!(value.is_ascii());
        assert!(value.starts_with("attachment; filename=\"na_me _.txt\""));
    }
}
