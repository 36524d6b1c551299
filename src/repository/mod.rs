//! Post repository - loads documents once and serves cached posts
//!
//! The repository moves through three states: `Empty` (nothing cached),
//! `Loading` (one load in flight, shared by every caller that arrives while
//! it runs) and `Ready` (posts cached until [`PostRepository::invalidate`]).
//! A failed or abandoned load leaves the repository `Empty` so the next
//! query retries.

mod store;

pub use store::{Document, DocumentStore, FsStore, MemoryStore};

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use crate::config::{SiteConfig, SlugCollisionPolicy};
use crate::content::{Post, PostAssembler};

/// Errors surfaced by repository queries
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("no post with slug `{0}`")]
    NotFound(String),

    #[error("failed to load documents from {location}: {source}")]
    LoadFailure {
        location: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("invalid document pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("slug `{slug}` is claimed by both {first} and {second}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },
}

impl RepositoryError {
    pub(crate) fn load_failure(location: impl Into<String>, source: io::Error) -> Self {
        Self::LoadFailure {
            location: location.into(),
            source: Arc::new(source),
        }
    }
}

/// Observable lifecycle state of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    Empty,
    Loading,
    Ready,
}

/// One page of the post listing
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Arc<Post>>,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
}

impl PostPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

type LoadOutcome = Result<Arc<Catalog>, RepositoryError>;

enum State {
    Empty,
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Ready(Arc<Catalog>),
}

struct Inner {
    state: State,
    /// Bumped by `invalidate` so a load started earlier cannot repopulate the cache
    generation: u64,
}

/// Posts sorted newest first, indexed by slug
struct Catalog {
    posts: Vec<Arc<Post>>,
    by_slug: HashMap<String, Arc<Post>>,
}

impl Catalog {
    fn new(mut posts: Vec<Post>) -> Self {
        // Undated posts compare as `None` and land after every dated post
        posts.sort_by_cached_key(|post| (Reverse(post.date()), post.slug.clone()));

        let posts: Vec<Arc<Post>> = posts.into_iter().map(Arc::new).collect();
        let by_slug = posts
            .iter()
            .map(|post| (post.slug.clone(), Arc::clone(post)))
            .collect();

        Self { posts, by_slug }
    }
}

/// In-memory cache and query surface over assembled posts
pub struct PostRepository<S> {
    store: S,
    assembler: PostAssembler,
    collision_policy: SlugCollisionPolicy,
    inner: Mutex<Inner>,
}

impl<S: DocumentStore> PostRepository<S> {
    /// Create an empty repository over `store`
    pub fn new(store: S, assembler: PostAssembler) -> Self {
        Self {
            store,
            assembler,
            collision_policy: SlugCollisionPolicy::default(),
            inner: Mutex::new(Inner {
                state: State::Empty,
                generation: 0,
            }),
        }
    }

    /// Create a repository using the site's rendering and collision settings
    pub fn from_config(store: S, config: &SiteConfig) -> Self {
        Self::new(store, PostAssembler::from_config(config))
            .with_collision_policy(config.slug_collision)
    }

    pub fn with_collision_policy(mut self, policy: SlugCollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// All posts, newest first; posts sharing a date are ordered by slug
    pub async fn list_all(&self) -> Result<Vec<Arc<Post>>, RepositoryError> {
        Ok(self.catalog().await?.posts.clone())
    }

    /// Look up one post by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Arc<Post>, RepositoryError> {
        self.catalog()
            .await?
            .by_slug
            .get(slug)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(slug.to_string()))
    }

    /// One page of the listing; pages are 1-based and out-of-range pages are empty
    pub async fn list_page(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<PostPage, RepositoryError> {
        let catalog = self.catalog().await?;
        let per_page = per_page.max(1);
        let total_posts = catalog.posts.len();
        let total_pages = total_posts.div_ceil(per_page).max(1);

        let posts = match page.checked_sub(1) {
            Some(index) => catalog
                .posts
                .iter()
                .skip(index.saturating_mul(per_page))
                .take(per_page)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(PostPage {
            posts,
            page,
            per_page,
            total_pages,
            total_posts,
        })
    }

    /// Tag usage counts, most used first, then by name
    pub async fn tags(&self) -> Result<Vec<(String, usize)>, RepositoryError> {
        let catalog = self.catalog().await?;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for post in &catalog.posts {
            for tag in post.tags() {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<_> = counts.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(tags)
    }

    /// Drop the cache; the next query reloads every document
    pub fn invalidate(&self) {
        let mut inner = self.lock_inner();
        inner.generation += 1;
        inner.state = State::Empty;
        tracing::debug!("Post cache invalidated");
    }

    pub fn state(&self) -> RepositoryState {
        match self.lock_inner().state {
            State::Empty => RepositoryState::Empty,
            State::Loading(_) => RepositoryState::Loading,
            State::Ready(_) => RepositoryState::Ready,
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // State is only ever replaced wholesale, never left half-written
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached catalog, loading it if needed
    async fn catalog(&self) -> LoadOutcome {
        loop {
            let mut receiver = match self.next_step() {
                Step::Cached(catalog) => return Ok(catalog),
                Step::Load(guard) => return self.load(guard).await,
                Step::Wait(receiver) => receiver,
            };

            let shared = receiver
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|outcome| outcome.clone());
            match shared {
                Some(outcome) => return outcome,
                None => tracing::debug!("In-flight load was abandoned, retrying"),
            }
        }
    }

    /// Decide, under the lock, whether to use the cache, wait, or load
    fn next_step(&self) -> Step<'_> {
        let mut inner = self.lock_inner();
        match &inner.state {
            State::Ready(catalog) => return Step::Cached(Arc::clone(catalog)),
            State::Loading(receiver) => return Step::Wait(receiver.clone()),
            State::Empty => {}
        }

        let (sender, receiver) = watch::channel(None);
        inner.state = State::Loading(receiver);
        Step::Load(LoadGuard {
            inner: &self.inner,
            generation: inner.generation,
            sender: Some(sender),
        })
    }

    async fn load(&self, mut guard: LoadGuard<'_>) -> LoadOutcome {
        tracing::debug!("Loading posts");
        let outcome = self.build_catalog().await.map(Arc::new);

        {
            let mut inner = self.lock_inner();
            if inner.generation == guard.generation {
                inner.state = match &outcome {
                    Ok(catalog) => State::Ready(Arc::clone(catalog)),
                    Err(_) => State::Empty,
                };
            } else {
                tracing::debug!("Cache was invalidated during load, not caching result");
            }
        }

        match &outcome {
            Ok(catalog) => tracing::info!("Loaded {} posts", catalog.posts.len()),
            Err(e) => tracing::warn!("Failed to load posts: {}", e),
        }

        guard.finish(outcome.clone());
        outcome
    }

    async fn build_catalog(&self) -> Result<Catalog, RepositoryError> {
        let mut documents = self.store.load_documents().await?;
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        let mut posts = Vec::with_capacity(documents.len());
        for document in documents {
            let mut post = self.assembler.assemble(&document.file_slug(), &document.text);
            if post.slug.is_empty() {
                tracing::warn!("Skipping {}: no usable slug", document.id);
                continue;
            }
            post.source = Some(document.id);
            posts.push(post);
        }

        let posts = assign_unique_slugs(posts, self.collision_policy)?;
        Ok(Catalog::new(posts))
    }
}

enum Step<'a> {
    Cached(Arc<Catalog>),
    Wait(watch::Receiver<Option<LoadOutcome>>),
    Load(LoadGuard<'a>),
}

/// Publishes the outcome of a load to its waiters
///
/// If the load future is dropped before finishing, the repository is reset
/// to `Empty` before the channel closes, so waiters retry cleanly.
struct LoadGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
    sender: Option<watch::Sender<Option<LoadOutcome>>>,
}

impl LoadGuard<'_> {
    fn finish(&mut self, outcome: LoadOutcome) {
        if let Some(sender) = self.sender.take() {
            sender.send_replace(Some(outcome));
        }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.sender.is_none() {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.generation == self.generation && matches!(inner.state, State::Loading(_)) {
            inner.state = State::Empty;
        }
    }
}

/// Make slugs unique across `posts`, which must be ordered by source id
///
/// Every natural slug is claimed first, in order; later claimants of a taken
/// slug get the smallest free `-2`, `-3`, ... suffix.
fn assign_unique_slugs(
    mut posts: Vec<Post>,
    policy: SlugCollisionPolicy,
) -> Result<Vec<Post>, RepositoryError> {
    let mut claimed: HashMap<String, usize> = HashMap::new();
    let mut losers = Vec::new();

    for (index, post) in posts.iter().enumerate() {
        match claimed.entry(post.slug.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
            Entry::Occupied(entry) => {
                let first = &posts[*entry.get()];
                if policy == SlugCollisionPolicy::Reject {
                    return Err(RepositoryError::SlugCollision {
                        slug: post.slug.clone(),
                        first: first.source.clone().unwrap_or_default(),
                        second: post.source.clone().unwrap_or_default(),
                    });
                }
                losers.push(index);
            }
        }
    }

    for index in losers {
        let base = posts[index].slug.clone();
        let unique = (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !claimed.contains_key(candidate))
            .unwrap_or_default();

        tracing::warn!(
            "Slug `{}` of {} is already taken, using `{}`",
            base,
            posts[index].source.as_deref().unwrap_or("<unknown>"),
            unique
        );
        claimed.insert(unique.clone(), index);
        posts[index].slug = unique;
    }

    Ok(posts)
}
