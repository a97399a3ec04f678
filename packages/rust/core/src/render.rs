//! Listing page and redirect rendering.
//!
//! Rendering is pure: the same page and config always produce the same bytes.
//! All text taken from episode documents or config is HTML-escaped here.

use castindex_shared::{AccessTier, EpisodeRecord, NavLink, SiteConfig};

use crate::paginate::Page;

/// Thumbnail shown on public episode cards.
pub const PUBLIC_THUMB: &str = "/assets/public.png";

const STYLE: &str = r#"<style>
:root {
  --accent:#d7522f;
  --white:#ffffff;
}

*{box-sizing:border-box}

body {
  margin:0;
  padding:32px 24px 48px;
  font-family:Inter,system-ui,-apple-system,Segoe UI,Roboto,sans-serif;
  color:var(--white);
  background:
    radial-gradient(1200px 700px at 70% -20%, rgba(215,82,47,.25), transparent 60%),
    radial-gradient(900px 600px at -20% 120%, rgba(35,46,65,.6), transparent 60%),
    linear-gradient(160deg,#121826,#0b0f16);
}

.hero{margin-bottom:48px}
.hero-grid{display:grid;grid-template-columns:repeat(2,1fr);gap:18px}
.hero-text{padding-left:8px}
.listen-on{align-self:center;text-align:center}
@media(max-width:860px){.hero-grid{grid-template-columns:1fr}.listen-on{text-align:left;margin-top:24px}}

.grid{display:grid;grid-template-columns:repeat(2,1fr);gap:18px}
@media(max-width:720px){.grid{grid-template-columns:1fr}}

.card{display:flex;gap:14px;padding:18px;border-radius:18px;background:rgba(255,255,255,.06);color:inherit;text-decoration:none}
.card:hover{background:rgba(255,255,255,.1);transform:translateY(-2px)}
.card.restricted{box-shadow:0 0 0 1px rgba(215,82,47,.35),0 0 18px rgba(215,82,47,.15)}
.thumb{width:64px;height:64px;border-radius:12px;overflow:hidden;flex:none}
.thumb img{width:100%;height:100%;object-fit:cover}
.meta{opacity:.6;font-size:13px;margin-top:4px}
.desc{opacity:.8;font-size:14px;margin-top:6px}
.empty{opacity:.7}

.pager{display:grid;grid-template-columns:1fr auto 1fr;margin:48px 0}
.pager a{color:#fff;opacity:.75;text-decoration:none}
.pager a:hover{opacity:1}
.pager .older{text-align:right}
.page-num{opacity:.6;text-align:center}

.site-footer{margin-top:64px;text-align:center;font-size:13px;opacity:.55}
.footer-links a{margin:0 8px}
.site-footer a{color:var(--accent);font-weight:600;text-decoration:none}
</style>"#;

/// Render one listing page as a complete HTML document.
pub fn render_listing(page: &Page<'_>, site: &SiteConfig) -> String {
    let site_name = escape_html(&site.site_name);

    let (page_title, page_desc) = if page.is_first() {
        let desc = if site.tagline.trim().is_empty() {
            format!("{} podcast transcripts.", site.site_name)
        } else {
            site.tagline.clone()
        };
        (format!("{site_name} – Podcast Transcripts"), escape_html(&desc))
    } else {
        (
            format!("{site_name} – Page {} of {}", page.number, page.total_pages),
            format!(
                "{site_name} podcast transcripts – page {} of {}.",
                page.number, page.total_pages
            ),
        )
    };

    let mut head_links = vec![format!(r#"<link rel="canonical" href="{}">"#, page.path())];
    if let Some(prev) = page.prev_path() {
        head_links.push(format!(r#"<link rel="prev" href="{prev}">"#));
    }
    if let Some(next) = page.next_path() {
        head_links.push(format!(r#"<link rel="next" href="{next}">"#));
    }

    let hero = if page.is_first() {
        render_hero(site)
    } else {
        String::new()
    };

    let pager = render_pager(page);

    let main = if page.episodes.is_empty() {
        r#"<main class="grid"><p class="empty">No episodes yet.</p></main>"#.to_string()
    } else {
        let cards: Vec<String> = page
            .episodes
            .iter()
            .map(|ep| render_card(ep, &site.extract.restricted_marker))
            .collect();
        format!("<main class=\"grid\">\n{}\n</main>", cards.join("\n"))
    };

    let body_parts: Vec<&str> = [hero.as_str(), pager.as_str(), main.as_str(), pager.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{page_title}</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="{page_desc}">
{head_links}

{STYLE}
</head>
<body>

{body}

{footer}

</body>
</html>
"#,
        head_links = head_links.join("\n"),
        body = body_parts.join("\n"),
        footer = render_footer(&site.footer_links),
    )
}

/// Render the `newest/` redirect stub pointing at `episode`.
pub fn render_newest(episode: &EpisodeRecord) -> String {
    let url = escape_html(&episode.url());
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="0;url={url}">
<link rel="canonical" href="{url}">
<title>{title}</title>
</head>
<body>
<p><a href="{url}">{title}</a></p>
</body>
</html>
"#,
        title = escape_html(&episode.title),
    )
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
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

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

fn render_card(ep: &EpisodeRecord, restricted_thumb: &str) -> String {
    let (class, thumb) = match ep.access_tier {
        AccessTier::Restricted if !restricted_thumb.is_empty() => ("card restricted", restricted_thumb),
        AccessTier::Restricted => ("card restricted", PUBLIC_THUMB),
        AccessTier::Public => ("card", PUBLIC_THUMB),
    };

    let mut meta_parts: Vec<String> = Vec::new();
    if let Some(n) = ep.episode_number {
        meta_parts.push(format!(r#"<span class="ep-num">#{n}</span>"#));
    }
    if let Some(date) = ep.display_date() {
        meta_parts.push(format!("<time>{}</time>", escape_html(date)));
    }

    let mut body = vec![format!(r#"    <div class="title">{}</div>"#, escape_html(&ep.title))];
    if !meta_parts.is_empty() {
        body.push(format!(r#"    <div class="meta">{}</div>"#, meta_parts.join(" · ")));
    }
    if !ep.description.is_empty() {
        body.push(format!(r#"    <div class="desc">{}</div>"#, escape_html(&ep.description)));
    }

    format!(
        r#"<a class="{class}" href="{href}">
  <div class="thumb">
    <img src="{thumb}" alt="" loading="lazy">
  </div>
  <div class="card-body">
{body}
  </div>
</a>"#,
        href = escape_html(&ep.url()),
        thumb = escape_html(thumb),
        body = body.join("\n"),
    )
}

fn render_pager(page: &Page<'_>) -> String {
    if page.total_pages <= 1 {
        return String::new();
    }

    let newer = page.prev_path().map_or_else(
        || "<span></span>".to_string(),
        |path| format!(r#"<a class="newer" href="{path}">← Newer</a>"#),
    );
    let older = page.next_path().map_or_else(
        || "<span></span>".to_string(),
        |path| format!(r#"<a class="older" href="{path}">Older →</a>"#),
    );

    format!(
        r#"<nav class="pager">
  {newer}
  <div class="page-num">Page {} of {}</div>
  {older}
</nav>"#,
        page.number, page.total_pages
    )
}

fn render_hero(site: &SiteConfig) -> String {
    let tagline = if site.tagline.trim().is_empty() {
        String::new()
    } else {
        format!("\n      <p class=\"tagline\">{}</p>", escape_html(&site.tagline))
    };

    let listen = if site.listen_links.is_empty() {
        String::new()
    } else {
        format!(
            r#"
    <aside class="listen-on">
      <div class="listen-label">Listen to the show</div>
      <div class="listen-links">
        {}
      </div>
    </aside>"#,
            render_links(&site.listen_links, "\n        <span>·</span>\n        ")
        )
    };

    format!(
        r#"<header class="hero">
  <div class="hero-grid">
    <div class="hero-text">
      <h1>{name}</h1>{tagline}
    </div>{listen}
  </div>
</header>"#,
        name = escape_html(&site.site_name),
    )
}

fn render_footer(links: &[NavLink]) -> String {
    if links.is_empty() {
        return r#"<footer class="site-footer"></footer>"#.to_string();
    }
    format!(
        r#"<footer class="site-footer">
  <nav class="footer-links">
    {}
  </nav>
</footer>"#,
        render_links(links, "\n    ")
    )
}

fn render_links(links: &[NavLink], separator: &str) -> String {
    links
        .iter()
        .map(|link| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                escape_html(&link.url),
                escape_html(&link.label)
            )
        })
        .collect::<Vec<_>>()
        .join(separator)
}
