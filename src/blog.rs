//! Blog posts with an automatically extracted plain-text summary.
use std::sync::LazyLock;

use chrono::NaiveDate;
use log::{debug, error, info};
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    clock_id, load_records, now_millis, save_collection, today, KeyValueStore, Result, Stored,
    WorkdeskError, BLOGS_KEY,
};

/// Summaries longer than this many characters are cut and get an ellipsis
pub const SUMMARY_CHARS: usize = 60;

/// Title given to freshly created posts
pub const UNTITLED: &str = "Untitled post";

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

const WELCOME_TITLE: &str = "First post: a plain place to write";
const WELCOME_CONTENT: &str = "<p>Welcome to the blog. Some writing belongs neither to a project nor to a single journal day, so it lives here.</p><p>Use it for longer thoughts, study notes or essays. The summary shown in the list is extracted automatically whenever a post is saved.</p>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Body as HTML
    #[serde(default)]
    pub content: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub summary: String,
}

/// Plain-text preview of an HTML body
pub fn generate_summary(html_content: &str) -> String {
    let plain = TAG_PATTERN.replace_all(html_content, "");
    let plain = plain.trim();
    if plain.chars().count() > SUMMARY_CHARS {
        let cut: String = plain.chars().take(SUMMARY_CHARS).collect();
        format!("{}...", cut)
    } else {
        plain.to_string()
    }
}

/// Renders Markdown to the HTML form posts are stored in
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub struct BlogStore<S: KeyValueStore> {
    backend: S,
    /// Newest first
    blogs: Vec<BlogPost>,
}

impl<S: KeyValueStore> BlogStore<S> {
    /// Loads the posts. On the very first run a welcome post is seeded.
    pub fn open(backend: S) -> Self {
        match load_records::<BlogPost, S>(&backend, BLOGS_KEY) {
            Stored::Present(blogs) => {
                debug!("Loaded {} blog posts", blogs.len());
                Self { backend, blogs }
            }
            Stored::Unreadable => Self {
                backend,
                blogs: Vec::new(),
            },
            Stored::Missing => {
                info!("No blog posts stored yet, seeding welcome post");
                let mut store = Self {
                    backend,
                    blogs: vec![BlogPost {
                        id: clock_id(now_millis(), std::iter::empty()),
                        title: WELCOME_TITLE.to_string(),
                        content: WELCOME_CONTENT.to_string(),
                        date: today(),
                        summary: generate_summary(WELCOME_CONTENT),
                    }],
                };
                store.persist();
                store
            }
        }
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.blogs
    }

    pub fn post(&self, id: u64) -> Option<&BlogPost> {
        self.blogs.iter().find(|b| b.id == id)
    }

    /// Creates an empty untitled post at the top of the list
    pub fn add_blog(&mut self) -> u64 {
        self.add_blog_at(now_millis(), today())
    }

    pub fn add_blog_at(&mut self, now_ms: i64, date: NaiveDate) -> u64 {
        let id = clock_id(now_ms, self.blogs.iter().map(|b| b.id));
        self.blogs.insert(
            0,
            BlogPost {
                id,
                title: UNTITLED.to_string(),
                content: String::new(),
                date,
                summary: String::new(),
            },
        );
        info!("Created blog post {}", id);
        self.persist();
        id
    }

    /// Replaces title and body and regenerates the summary
    pub fn update_blog(
        &mut self,
        id: u64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let post = self
            .blogs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(WorkdeskError::BlogNotFound { id })?;
        post.title = title.into();
        post.content = content.into();
        post.summary = generate_summary(&post.content);
        self.persist();
        Ok(())
    }

    pub fn delete_blog(&mut self, id: u64) -> bool {
        let before = self.blogs.len();
        self.blogs.retain(|b| b.id != id);
        if self.blogs.len() == before {
            return false;
        }
        info!("Deleted blog post {}", id);
        self.persist();
        true
    }

    pub fn save(&mut self) -> Result<()> {
        save_collection(&mut self.backend, BLOGS_KEY, &self.blogs)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Failed to save blog posts: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{persistence::FailingStore, MemoryStore};

    fn empty_store() -> BlogStore<MemoryStore> {
        BlogStore::open(MemoryStore::with_entry(BLOGS_KEY, "[]"))
    }

    #[test]
    fn summary_strips_tags_and_trims() {
        assert_eq!(generate_summary("  <p>Hello <b>world</b></p>\n"), "Hello world");
    }

    #[test]
    fn summary_truncates_by_characters() {
        let long = "a".repeat(61);
        assert_eq!(generate_summary(&long), format!("{}...", "a".repeat(60)));
        assert_eq!(generate_summary(&"b".repeat(60)), "b".repeat(60));

        let wide = "字".repeat(70);
        assert_eq!(generate_summary(&wide), format!("{}...", "字".repeat(60)));
    }

    #[test]
    fn markdown_renders_to_html() {
        assert_eq!(render_markdown("**hi**"), "<p><strong>hi</strong></p>\n");
    }

    #[test]
    fn first_run_seeds_one_post() {
        let backend = MemoryStore::new();
        let store = BlogStore::open(backend.clone());
        assert_eq!(store.posts().len(), 1);
        assert!(!store.posts()[0].summary.is_empty());

        let reopened = BlogStore::open(backend);
        assert_eq!(reopened.posts(), store.posts());
    }

    #[test]
    fn new_posts_go_first_and_updates_refresh_summary() {
        let mut store = empty_store();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let older = store.add_blog_at(100, date);
        let newer = store.add_blog_at(100, date);
        assert_eq!(newer, 101);
        assert_eq!(store.posts()[0].id, newer);
        assert_eq!(store.post(older).unwrap().title, UNTITLED);

        store.update_blog(older, "Notes", "<h1>Rust</h1><p>ownership</p>").unwrap();
        assert_eq!(store.post(older).unwrap().summary, "Rustownership");
        assert!(store.update_blog(5, "x", "y").is_err());

        assert!(store.delete_blog(older));
        assert!(!store.delete_blog(older));
    }

    #[test]
    fn write_failures_keep_posts_in_memory() {
        let mut store = BlogStore::open(FailingStore);
        assert_eq!(store.posts().len(), 1);

        let id = store.add_blog_at(1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        store.update_blog(id, "Offline", "<p>draft</p>").unwrap();
        assert_eq!(store.post(id).unwrap().summary, "draft");
        assert!(store.delete_blog(id));
        assert!(store.save().is_err());
    }
}
