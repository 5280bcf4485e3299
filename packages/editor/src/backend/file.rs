use super::{
    pages, BackendResult, NewPage, NewSection, PageBackend, PageUpdate, PreviewLink, PublishAck,
    UpdateAck,
};
use crate::errors::BackendError;
use async_trait::async_trait;
use pagebuilder_model::{PageDocument, PageId, Section, SectionId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Backend storing each page as `<root>/<slug>.json`
///
/// Preview tokens are written to `<root>/previews/<token>` and hold the slug.
/// All writes go through one lock, so concurrent calls from one process never
/// interleave a read-modify-write.
pub struct FileBackend {
    root: PathBuf,
    preview_base: String,
    write_lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            preview_base: "http://localhost:3000/preview".to_string(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_preview_base(mut self, base: impl Into<String>) -> Self {
        self.preview_base = base.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Page exposed by a preview token
    pub async fn resolve_preview(&self, token: &str) -> BackendResult<PageDocument> {
        pages::validate_slug(token)?;
        let path = self.root.join("previews").join(token);
        let slug = match tokio::fs::read_to_string(&path).await {
            Ok(slug) => slug,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound(format!("preview {}", token)))
            }
            Err(e) => return Err(io_error(e)),
        };
        self.read(slug.trim()).await
    }

    fn page_path(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}.json", slug))
    }

    async fn read(&self, slug: &str) -> BackendResult<PageDocument> {
        pages::validate_slug(slug)?;
        let json = match tokio::fs::read_to_string(self.page_path(slug)).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound(slug.to_string()))
            }
            Err(e) => return Err(io_error(e)),
        };

        serde_json::from_str(&json)
            .map_err(|e| BackendError::Validation(format!("corrupt page file {}: {}", slug, e)))
    }

    async fn write(&self, page: &PageDocument) -> BackendResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(io_error)?;
        let json = serde_json::to_string_pretty(page)
            .map_err(|e| BackendError::Validation(e.to_string()))?;

        // Write-then-rename so a crash never leaves a half-written page
        let path = self.page_path(&page.slug);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_error)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_error)
    }

    /// Locate a page file by id
    async fn find(&self, id: &PageId) -> BackendResult<PageDocument> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound(format!("page {}", id)))
            }
            Err(e) => return Err(io_error(e)),
        };

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if let Ok(page) = self.read(slug).await {
                    if page.id.as_ref() == Some(id) {
                        return Ok(page);
                    }
                }
            }
        }

        Err(BackendError::NotFound(format!("page {}", id)))
    }

    async fn modify<T>(
        &self,
        id: &PageId,
        f: impl FnOnce(&mut PageDocument) -> BackendResult<T> + Send,
    ) -> BackendResult<T>
    where
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut page = self.find(id).await?;
        let result = f(&mut page)?;
        self.write(&page).await?;
        Ok(result)
    }
}

fn io_error(e: std::io::Error) -> BackendError {
    BackendError::Network(format!("storage: {}", e))
}

#[async_trait]
impl PageBackend for FileBackend {
    async fn fetch_page(&self, slug: &str) -> BackendResult<PageDocument> {
        self.read(slug).await
    }

    async fn create_page(&self, page: NewPage) -> BackendResult<PageDocument> {
        let _guard = self.write_lock.lock().await;
        pages::validate_slug(&page.slug)?;
        if tokio::fs::try_exists(self.page_path(&page.slug))
            .await
            .map_err(io_error)?
        {
            return Err(BackendError::Conflict(format!("slug `{}` is taken", page.slug)));
        }

        let document = pages::create_page(page)?;
        self.write(&document).await?;
        Ok(document)
    }

    async fn update_page(&self, id: &PageId, update: PageUpdate) -> BackendResult<UpdateAck> {
        self.modify(id, |page| pages::apply_update(page, update)).await
    }

    async fn publish_page(&self, id: &PageId) -> BackendResult<PublishAck> {
        self.modify(id, |page| Ok(pages::publish(page))).await
    }

    async fn generate_preview_link(&self, id: &PageId) -> BackendResult<PreviewLink> {
        let page = self.find(id).await?;
        let token = pages::new_id();

        let dir = self.root.join("previews");
        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
        tokio::fs::write(dir.join(&token), &page.slug)
            .await
            .map_err(io_error)?;

        Ok(PreviewLink {
            url: format!("{}/{}?token={}", self.preview_base, page.slug, token),
            token,
        })
    }

    async fn create_section(&self, page_id: &PageId, request: NewSection) -> BackendResult<Section> {
        self.modify(page_id, |page| pages::insert_section(page, request))
            .await
    }

    async fn delete_section(&self, page_id: &PageId, section_id: &SectionId) -> BackendResult<()> {
        self.modify(page_id, |page| pages::remove_section(page, section_id))
            .await
    }
}
