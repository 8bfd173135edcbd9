use chrono::{DateTime, Duration, Utc};

use crate::entities::github::RepoSummary;

pub const GRID_CARD_LIMIT: usize = 6;
const DEFAULT_DESCRIPTION: &str = "A software project showcasing my development skills";

/// Escapes text for interpolation into HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    ammonia::clean_text(text)
}

/// What the projects grid shows.
#[derive(Debug, Clone, PartialEq)]
pub enum GridState {
    Loading,
    Loaded(Vec<RepoSummary>),
    Empty,
    /// Shown as a static message; the page does not retry on its own.
    Failed,
}

impl GridState {
    pub fn from_repos(repos: Vec<RepoSummary>) -> Self {
        if repos.is_empty() {
            GridState::Empty
        } else {
            GridState::Loaded(repos)
        }
    }
}

pub fn language_emoji(language: Option<&str>) -> &'static str {
    match language.unwrap_or_default() {
        "JavaScript" => "🟨",
        "TypeScript" | "C#" => "🔷",
        "Python" => "🐍",
        "Java" => "☕",
        "C++" => "⚡",
        "PHP" => "🐘",
        "Ruby" => "💎",
        "Go" => "🐹",
        "Rust" => "🦀",
        "Swift" => "🍎",
        "Kotlin" => "🎯",
        "HTML" => "🌐",
        "CSS" => "🎨",
        "Shell" => "🐚",
        "Dockerfile" => "🐳",
        "Vue" => "💚",
        "React" => "⚛️",
        _ => "📁",
    }
}

/// A repository pushed within the last day gets the "New" badge.
pub fn is_recently_updated(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(updated_at) < Duration::hours(24)
}

/// Only http(s) links make it into an `href`. The parsed URL is already
/// percent-encoded, so only attribute delimiters need escaping.
fn safe_href(link: &str) -> Option<String> {
    url::Url::parse(link)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| escape_attribute(u.as_str()))
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_card(repo: &RepoSummary, now: DateTime<Utc>) -> String {
    let title = escape_html(&repo.name);
    let description = escape_html(repo.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION));
    let badge = if is_recently_updated(repo.updated_at, now) {
        r#"<span class="project-badge">New</span>"#
    } else {
        ""
    };
    let language = repo
        .language
        .as_deref()
        .map(|l| format!(r#"<span class="project-language">📝 {}</span>"#, escape_html(l)))
        .unwrap_or_default();
    let tags = if repo.topics.is_empty() {
        String::new()
    } else {
        let spans: String = repo
            .topics
            .iter()
            .map(|t| format!(r#"<span class="project-tag">{}</span>"#, escape_html(t)))
            .collect();
        format!(r#"<div class="project-tags">{spans}</div>"#)
    };
    let code_link = safe_href(&repo.html_url)
        .map(|href| format!(r#"<a href="{href}" target="_blank" rel="noopener" class="project-link">💻 View Code</a>"#))
        .unwrap_or_default();
    let live_link = repo
        .homepage
        .as_deref()
        .and_then(safe_href)
        .map(|href| format!(r#"<a href="{href}" target="_blank" rel="noopener" class="project-link">🚀 Live Demo</a>"#))
        .unwrap_or_default();

    format!(
        r#"<div class="project-card">
  <div class="project-image">{emoji}</div>
  <div class="project-content">
    <h3 class="project-title">{title}{badge}</h3>
    <p class="project-description">{description}</p>
    <div class="project-meta">{language}<span class="project-stars">⭐ {stars}</span></div>
    {tags}
    <div class="project-links">{code_link}{live_link}<span class="project-updated">Updated: {updated}</span></div>
  </div>
</div>"#,
        emoji = language_emoji(repo.language.as_deref()),
        stars = repo.stargazers_count,
        updated = repo.updated_at.format("%Y-%m-%d"),
    )
}

/// Renders the grid as an HTML fragment. Loaded grids show at most
/// `GRID_CARD_LIMIT` cards, in the order given.
pub fn render_grid(state: &GridState, now: DateTime<Utc>) -> String {
    match state {
        GridState::Loading => r#"<p class="loading">Loading GitHub repositories...</p>"#.to_string(),
        GridState::Empty => r#"<p class="loading">No repositories found on GitHub.</p>"#.to_string(),
        GridState::Failed => {
            r#"<p class="loading">Failed to load GitHub repositories. Please try refreshing.</p>"#.to_string()
        }
        GridState::Loaded(repos) => repos
            .iter()
            .take(GRID_CARD_LIMIT)
            .map(|repo| render_card(repo, now))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
