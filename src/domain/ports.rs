use crate::domain::model::Selector;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where `path` lands on disk.
    fn resolve(&self, path: &str) -> std::path::PathBuf;
}

/// A live DOM element.
///
/// Lookups return an empty list when nothing matches; `Err` is reserved for
/// failures of the element itself (detached, not interactable).
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    async fn text(&self) -> Result<String>;
    async fn attribute(&self, name: &str) -> Result<Option<String>>;
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>>;
    async fn click(&self) -> Result<()>;

    /// Make this `<option>` the selected one of its `<select>`.
    async fn choose(&self) -> Result<()> {
        self.click().await
    }
}

/// One browser tab the pipeline drives.
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: PageElement;

    async fn goto(&self, url: &str) -> Result<()>;

    /// Single lookup, no waiting. `Ok(None)` when the element is absent.
    async fn find(&self, selector: &Selector) -> Result<Option<Self::Element>>;

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>>;
}

/// Hands out browser sessions and takes them back.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Browser;

    async fn acquire(&self) -> Result<Self::Session>;

    /// Best effort; never fails.
    async fn release(&self, session: Self::Session);
}
