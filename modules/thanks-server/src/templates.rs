use thanks_store::ThankRecord;

/// Render the full thanks log.
pub fn render_thanks(records: &[ThankRecord]) -> String {
    if records.is_empty() {
        return build_page(
            "Thanks",
            r#"<div class="container"><p class="empty">No thanks recorded yet.</p></div>"#,
        );
    }

    let rows: String = records
        .iter()
        .map(|r| {
            let manager = if r.manager.is_empty() {
                r#"<span class="muted">-</span>"#.to_string()
            } else {
                html_escape(&r.manager)
            };
            format!(
                "<tr><td>{date}</td><td>{sender}</td><td>{recipient}</td><td>{manager}</td><td>{message}</td><td><a href=\"{link}\" target=\"_blank\" rel=\"noopener\">View</a></td></tr>",
                date = r.create_date.format("%Y-%m-%d %H:%M"),
                sender = html_escape(&r.sender),
                recipient = html_escape(&r.recipient),
                message = html_escape(&r.message),
                link = html_escape(&r.permalink_url),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let count = records.len();
    let content = format!(
        r#"<div class="container">
    <h2>{count} thanks recorded</h2>
    <table>
        <thead><tr><th>Date</th><th>Sender</th><th>Recipient</th><th>Manager</th><th>Message</th><th>Link</th></tr></thead>
        <tbody>
{rows}
        </tbody>
    </table>
</div>"#
    );

    build_page("Thanks", &content)
}

// --- Helpers ---

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.container{{max-width:1100px;margin:0 auto;padding:24px;}}
.container h2{{font-size:16px;margin-bottom:16px;}}
table{{width:100%;border-collapse:collapse;background:#fff;font-size:14px;}}
th,td{{text-align:left;padding:8px 10px;border-bottom:1px solid #e0e0e0;vertical-align:top;}}
th{{color:#666;font-weight:600;}}
td a{{color:#0066cc;}}
.muted{{color:#aaa;}}
.empty{{color:#888;text-align:center;padding:40px;}}
</style>
</head>
<body>
<div class="header"><h1>Obrigados</h1></div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
