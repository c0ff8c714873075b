//! HTML page rendering
//!
//! Pages are plain `format!` templates sharing one inline stylesheet.
//! Everything that originates from a user (names, filenames) or from the
//! analyzer goes through [`escape_html`].

use moodlog_common::AnalysisRecord;

/// URL prefix under which stored uploads are served
pub const UPLOADS_URL_PREFIX: &str = "/static/uploads";

const STYLE: &str = r#"
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
        }
        h1 { font-size: 26px; color: #4a9eff; }
        .subtitle { color: #888; font-size: 16px; }
        .content { padding: 0 20px; }
        label { display: block; margin: 12px 0 4px; }
        input[type=text] { padding: 6px; width: 280px; }
        .button {
            display: inline-block;
            padding: 10px 20px;
            background: #4a9eff;
            color: white;
            border: none;
            text-decoration: none;
            border-radius: 4px;
            margin: 16px 5px 0 0;
            font-weight: 600;
            cursor: pointer;
        }
        .button:hover { background: #3a8eef; }
        .result { font-size: 32px; color: #10b981; margin: 10px 0 20px; }
        .preview { max-width: 480px; border: 1px solid #3a3a3a; border-radius: 4px; }
        table { border-collapse: collapse; margin-top: 10px; }
        th, td { border: 1px solid #3a3a3a; padding: 6px 12px; text-align: left; }
        th { background: #2a2a2a; color: #4a9eff; }
        td img { max-height: 64px; }
    </style>"#;

/// Escape text for inclusion in HTML element content or quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Public URL of a stored upload
pub fn upload_url(image_filename: &str) -> String {
    format!("{}/{}", UPLOADS_URL_PREFIX, image_filename)
}

fn page(title: &str, subtitle: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>{STYLE}
</head>
<body>
    <header>
        <h1>{title}</h1>
        <div class="subtitle">{subtitle}</div>
    </header>
    <div class="content">
{body}
    </div>
</body>
</html>
"#
    )
}

/// Landing page with the upload form
pub fn index_page() -> String {
    page(
        "Moodlog",
        "Upload a photo of a face to detect its emotion",
        r#"        <form action="/analyze" method="post" enctype="multipart/form-data">
            <label for="user_name">Your name</label>
            <input type="text" id="user_name" name="user_name" maxlength="100" placeholder="Anonymous">
            <label for="image_file">Image</label>
            <input type="file" id="image_file" name="image_file" accept="image/*" required>
            <div><button type="submit" class="button">Analyze</button></div>
        </form>"#,
    )
}

/// Result page for one analysis
pub fn result_page(emotion_result: &str, image_filename: &str) -> String {
    let body = format!(
        r#"        <h2>Result</h2>
        <div class="result">{result}</div>
        <img class="preview" src="{src}" alt="Uploaded image">
        <div><a class="button" href="/">Analyze another image</a></div>"#,
        result = escape_html(emotion_result),
        src = escape_html(&upload_url(image_filename)),
    );
    page("Moodlog", "Analysis complete", &body)
}

/// Table of every stored analysis, in the order given
pub fn logs_page(records: &[AnalysisRecord]) -> String {
    let rows = if records.is_empty() {
        r#"            <tr><td colspan="4">No analyses recorded yet.</td></tr>"#.to_string()
    } else {
        records
            .iter()
            .map(|record| {
                let filename = escape_html(&record.image_filename);
                format!(
                    r#"            <tr><td>{id}</td><td>{name}</td><td><a href="{src}"><img src="{src}" alt="{filename}"></a> {filename}</td><td>{result}</td></tr>"#,
                    id = record.id,
                    name = escape_html(&record.name),
                    src = escape_html(&upload_url(&record.image_filename)),
                    filename = filename,
                    result = escape_html(&record.result),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        r#"        <table>
            <tr><th>ID</th><th>Name</th><th>Image</th><th>Result</th></tr>
{rows}
        </table>"#
    );
    page("Moodlog", &format!("{} analyses", records.len()), &body)
}
