//! Landing page

use axum::response::Html;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Churnwatch</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 640px; margin: 3rem auto; color: #1f2937; }
    code { background: #f3f4f6; padding: 0.15rem 0.35rem; border-radius: 4px; }
    li { margin: 0.5rem 0; }
  </style>
</head>
<body>
  <h1>Churnwatch</h1>
  <p>Silent customer churn prediction service.</p>
  <ul>
    <li><code>POST /train</code> &mdash; retrain from the configured dataset</li>
    <li><code>POST /predict</code> &mdash; score a customer feature record</li>
    <li><code>GET /analyze_dataset?limit=50</code> &mdash; batch-score dataset rows</li>
    <li><code>GET /health</code> &mdash; service status</li>
  </ul>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
