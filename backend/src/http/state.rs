//! Application state for the HTTP server.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::ProgrammeConfig;
use crate::error::ProgrammeResult;
use crate::feed::ScheduleFeed;
use crate::services::RenderContext;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProgrammeConfig>,
    /// Source of the schedule and talk details
    pub feed: Arc<dyn ScheduleFeed>,
    /// Loaded on the first document request, never refreshed
    context: Arc<OnceCell<Arc<RenderContext>>>,
}

impl AppState {
    /// Create a new application state reading from `feed`.
    pub fn new(config: ProgrammeConfig, feed: Arc<dyn ScheduleFeed>) -> Self {
        Self {
            config: Arc::new(config),
            feed,
            context: Arc::new(OnceCell::new()),
        }
    }

    /// Render context, fetching the feed on first use.
    ///
    /// A failed fetch leaves the cell empty so the next request tries again.
    pub async fn context(&self) -> ProgrammeResult<Arc<RenderContext>> {
        let ctx = self
            .context
            .get_or_try_init(|| async {
                let ctx =
                    RenderContext::load(self.feed.as_ref(), self.config.as_ref().clone()).await?;
                Ok::<_, crate::error::ProgrammeError>(Arc::new(ctx))
            })
            .await?;
        Ok(Arc::clone(ctx))
    }

    /// Whether the feed has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.context.initialized()
    }
}
