// src/web/page.rs
// Upload form served at /

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Message triage</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }
    textarea { width: 100%; min-height: 10rem; }
    pre { background: #f4f4f4; padding: 1rem; white-space: pre-wrap; }
    .hint { color: #666; font-size: 0.9rem; }
  </style>
</head>
<body>
  <h1>Message triage</h1>

  <form id="text-form">
    <textarea name="text" placeholder="Paste an email or message"></textarea>
    <p class="hint">Up to {{MAX_CHARS}} characters are classified.</p>
    <button type="submit">Classify text</button>
  </form>

  <form id="file-form">
    <input type="file" name="file" accept=".txt,.pdf">
    <p class="hint">.txt or .pdf, at most {{MAX_UPLOAD_MB}} MB.</p>
    <button type="submit">Classify file</button>
  </form>

  <pre id="out"></pre>

  <script>
    const out = document.getElementById("out");
    async function send(url, body) {
      out.textContent = "...";
      const res = await fetch(url, { method: "POST", body });
      out.textContent = JSON.stringify(await res.json(), null, 2);
    }
    document.getElementById("text-form").addEventListener("submit", (e) => {
      e.preventDefault();
      send("/classify-text", new URLSearchParams(new FormData(e.target)));
    });
    document.getElementById("file-form").addEventListener("submit", (e) => {
      e.preventDefault();
      send("/classify-file", new FormData(e.target));
    });
  </script>
</body>
</html>
"#;

/// Render the index page with the configured limits
pub fn render_index(max_upload_mb: u64, max_chars: usize) -> String {
    TEMPLATE
        .replace("{{MAX_UPLOAD_MB}}", &max_upload_mb.to_string())
        .replace("{{MAX_CHARS}}", &max_chars.to_string())
}
