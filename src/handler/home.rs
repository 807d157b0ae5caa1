//! Home page
//!
//! One `<video>` player per registered video, each pointing at its
//! `/stream/{id}` route so the browser drives playback with range requests.

use crate::storage::Video;

/// Render the home page for the given videos
pub fn render_homepage(videos: &[Video], has_default: bool) -> String {
    let mut players = String::new();

    if has_default {
        players.push_str(&player("/stream", "Featured video"));
    }
    for video in videos {
        players.push_str(&player(&format!("/stream/{}", video.id), &video.title));
    }
    if players.is_empty() {
        players.push_str(
            r#"        <p class="empty">No videos yet. <code>POST /upload</code> to add one.</p>
"#,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Kiach</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: #111;
            color: #eee;
            margin: 0;
            padding: 40px;
        }}
        h1 {{ font-weight: 700; margin-bottom: 30px; }}
        .video {{ margin-bottom: 40px; max-width: 960px; }}
        .video h2 {{ font-size: 1.1em; opacity: 0.8; }}
        video {{ width: 100%; background: #000; border-radius: 8px; }}
        .empty {{ opacity: 0.7; }}
    </style>
</head>
<body>
    <h1>Kiach</h1>
{players}</body>
</html>
"#
    )
}

fn player(src: &str, title: &str) -> String {
    format!(
        r#"    <div class="video">
        <h2>{title}</h2>
        <video controls preload="metadata" src="{src}"></video>
    </div>
"#,
        title = escape_html(title),
        src = escape_html(src),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_players_link_to_stream_routes() {
        let video = Video::new("intro.mp4", "https://cdn.example.com/intro.mp4");
        let html = render_homepage(std::slice::from_ref(&video), true);
        assert!(html.contains(r#"src="/stream""#));
        assert!(html.contains(&format!(r#"src="/stream/{}""#, video.id)));
        assert!(html.contains("<h2>intro.mp4</h2>"));
        // The upstream URL is never exposed to the browser
        assert!(!html.contains("cdn.example.com"));
    }

    #[test]
    fn test_empty_page() {
        let html = render_homepage(&[], false);
        assert!(html.contains("No videos yet"));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let video = Video::new("<script>x</script>", "file:///tmp/x.mp4");
        let html = render_homepage(&[video], false);
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
