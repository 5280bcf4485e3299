use super::{
    pages, BackendResult, NewPage, NewSection, PageBackend, PageUpdate, PreviewLink, PublishAck,
    UpdateAck,
};
use crate::errors::BackendError;
use async_trait::async_trait;
use pagebuilder_model::{PageDocument, PageId, Section, SectionId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Backend operations, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    FetchPage,
    CreatePage,
    UpdatePage,
    PublishPage,
    PreviewLink,
    CreateSection,
    DeleteSection,
}

#[derive(Default)]
struct MemoryState {
    /// Pages keyed by slug
    pages: HashMap<String, PageDocument>,
    /// Preview token → slug
    previews: HashMap<String, String>,
    failures: HashMap<BackendOp, VecDeque<BackendError>>,
    calls: HashMap<BackendOp, usize>,
}

/// In-process backend
///
/// Behaves like a real backend (assigns ids, validates content, appends
/// versions) and lets tests queue failures and count calls.
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
    preview_base: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            latency: None,
            preview_base: "https://preview.local".to_string(),
        }
    }

    /// Delay every response, to hold requests in flight
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store a page as-is, assigning an id if it has none. Returns the id.
    pub fn seed(&self, mut page: PageDocument) -> PageId {
        let id = page
            .id
            .get_or_insert_with(|| PageId::new(pages::new_id()))
            .clone();
        self.lock().pages.insert(page.slug.clone(), page);
        id
    }

    /// Current stored copy of a page
    pub fn page(&self, slug: &str) -> Option<PageDocument> {
        self.lock().pages.get(slug).cloned()
    }

    /// Queue an error for the next call of `op`
    pub fn fail_next(&self, op: BackendOp, error: BackendError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    pub fn calls(&self, op: BackendOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Page exposed by a preview token
    pub fn resolve_preview(&self, token: &str) -> Option<PageDocument> {
        let state = self.lock();
        let slug = state.previews.get(token)?;
        state.pages.get(slug).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait out the latency, then pop any queued failure
    async fn begin(&self, op: BackendOp) -> BackendResult<()> {
        *self.lock().calls.entry(op).or_default() += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.lock().failures.get_mut(&op).and_then(|q| q.pop_front()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_page<T>(
        &self,
        id: &PageId,
        f: impl FnOnce(&mut PageDocument) -> BackendResult<T>,
    ) -> BackendResult<T> {
        let mut state = self.lock();
        let page = state
            .pages
            .values_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .ok_or_else(|| BackendError::NotFound(format!("page {}", id)))?;
        f(page)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageBackend for MemoryBackend {
    async fn fetch_page(&self, slug: &str) -> BackendResult<PageDocument> {
        self.begin(BackendOp::FetchPage).await?;
        self.lock()
            .pages
            .get(slug)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(slug.to_string()))
    }

    async fn create_page(&self, page: NewPage) -> BackendResult<PageDocument> {
        self.begin(BackendOp::CreatePage).await?;
        let mut state = self.lock();
        if state.pages.contains_key(&page.slug) {
            return Err(BackendError::Conflict(format!("slug `{}` is taken", page.slug)));
        }

        let document = pages::create_page(page)?;
        state.pages.insert(document.slug.clone(), document.clone());
        Ok(document)
    }

    async fn update_page(&self, id: &PageId, update: PageUpdate) -> BackendResult<UpdateAck> {
        self.begin(BackendOp::UpdatePage).await?;
        self.with_page(id, |page| pages::apply_update(page, update))
    }

    async fn publish_page(&self, id: &PageId) -> BackendResult<PublishAck> {
        self.begin(BackendOp::PublishPage).await?;
        self.with_page(id, |page| Ok(pages::publish(page)))
    }

    async fn generate_preview_link(&self, id: &PageId) -> BackendResult<PreviewLink> {
        self.begin(BackendOp::PreviewLink).await?;
        let slug = self.with_page(id, |page| Ok(page.slug.clone()))?;

        let token = pages::new_id();
        self.lock().previews.insert(token.clone(), slug.clone());
        Ok(PreviewLink {
            url: format!("{}/{}?token={}", self.preview_base, slug, token),
            token,
        })
    }

    async fn create_section(&self, page_id: &PageId, request: NewSection) -> BackendResult<Section> {
        self.begin(BackendOp::CreateSection).await?;
        self.with_page(page_id, |page| pages::insert_section(page, request))
    }

    async fn delete_section(&self, page_id: &PageId, section_id: &SectionId) -> BackendResult<()> {
        self.begin(BackendOp::DeleteSection).await?;
        self.with_page(page_id, |page| pages::remove_section(page, section_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebuilder_model::SectionType;

    #[tokio::test]
    async fn test_fetch_missing_page() {
        let backend = MemoryBackend::new();
        let err = backend.fetch_page("nope").await.unwrap_err();
        assert_eq!(err, BackendError::NotFound("nope".to_string()));
        assert_eq!(backend.calls(BackendOp::FetchPage), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let backend = MemoryBackend::new();
        let id = backend.seed(PageDocument::draft("home", "Home"));
        backend.fail_next(BackendOp::CreateSection, BackendError::Timeout);

        let request = NewSection::new(SectionType::Hero, None, 0);
        assert_eq!(
            backend.create_section(&id, request.clone()).await,
            Err(BackendError::Timeout)
        );

        let section = backend.create_section(&id, request).await.unwrap();
        assert_eq!(backend.page("home").unwrap().sections[0].id, section.id);
    }

    #[tokio::test]
    async fn test_preview_does_not_touch_page() {
        let backend = MemoryBackend::new();
        let id = backend.seed(PageDocument::draft("home", "Home"));
        let before = backend.page("home").unwrap();

        let link = backend.generate_preview_link(&id).await.unwrap();
        assert!(link.url.contains(&link.token));
        assert_eq!(backend.resolve_preview(&link.token), Some(before.clone()));
        assert_eq!(backend.page("home").unwrap(), before);
    }
}
