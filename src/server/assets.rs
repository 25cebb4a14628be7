use html_escape::encode_text;

pub const FLAG_SVG: &str = r#"<svg viewBox="0 0 32 32" version="1.1" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <radialGradient id="g1" cx="50%" cy="50%" r="70%" fx="20%" fy="90%">
      <stop offset="0%" stop-color="tomato" />
      <stop offset="100%" stop-color="cornflowerblue" />
    </radialGradient>
  </defs>
  <rect width="32" height="32" fill="url(#g1)"/>
</svg>"#;

pub fn index_page(feed_url: &str) -> String {
    let feed_url = encode_text(feed_url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>The Risks Digest as a Federated Wiki</title>
  <link rel="icon" href="/favicon.png">
</head>
<body>
  <h1>The Risks Digest as a Federated Wiki</h1>
  <p>This is a read-only federated wiki site generated from the feed at
  <a href="{feed_url}">{feed_url}</a>.</p>
  <p>Open it from a wiki client: add this host as a remote site and start
  at <code>welcome-visitors</code>. The sitemap is at
  <a href="/system/sitemap.json">/system/sitemap.json</a>.</p>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_escapes_feed_url() {
        let html = index_page("http://x/?a=1&b=<2>");
        assert!(html.contains("http://x/?a=1&amp;b=&lt;2&gt;"));
        assert!(!html.contains("<2>"));
    }
}
