//! The batch/streaming engine: lazy, single-pass XML chunk production.
//!
//! A [`FeedStream`] walks the eligible product list in fixed-size
//! batches and yields one XML chunk per pull: first the document
//! header, then one chunk per batch, then a footer carrying generation
//! statistics. Peak memory is bounded by one batch of formatted items
//! regardless of catalog size.
//!
//! The iterator is pull-based and non-restartable. Served through
//! `tokio_stream::iter` as an HTTP body, hyper only pulls the next
//! chunk when the client is ready for more bytes, so a slow consumer
//! pauses generation for free. Dropping the stream before the footer
//! is the cancellation path: it is logged and nothing else needs
//! cleaning up.

use std::time::Duration;

use crate::catalog::Product;
use crate::feed::format::{process_product_variants, FeedContext};
use crate::feed::progress::FeedProgress;
use crate::feed::publisher::Publisher;

/// Default number of products formatted per chunk.
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Header,
    Batches,
    Footer,
    Closed,
}

/// Aggregate counts for one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub products: usize,
    pub items: usize,
    pub errors: usize,
    pub elapsed_ms: u128,
}

/// Pull-based XML chunk producer over an already-filtered product list.
pub struct FeedStream {
    products: Vec<Product>,
    cursor: usize,
    batch_size: usize,
    publisher: Publisher,
    ctx: FeedContext,
    state: StreamState,
    progress: FeedProgress,
    item_count: usize,
    error_count: usize,
}

impl FeedStream {
    pub fn new(
        products: Vec<Product>,
        publisher: Publisher,
        ctx: FeedContext,
        batch_size: usize,
        log_interval: Duration,
    ) -> Self {
        let total = products.len();
        Self {
            products,
            cursor: 0,
            batch_size: batch_size.max(1),
            publisher,
            ctx,
            state: StreamState::Header,
            progress: FeedProgress::new(total, log_interval),
            item_count: 0,
            error_count: 0,
        }
    }

    /// Drains the whole stream into one document. Used by the paged
    /// endpoints, where a page slice is already memory-bounded and the
    /// caller wants the stats up front for response headers.
    pub fn render_buffered(mut self) -> (String, FeedStats) {
        let mut xml = String::new();
        for chunk in &mut self {
            xml.push_str(&chunk);
        }
        let stats = FeedStats {
            products: self.products.len(),
            items: self.item_count,
            errors: self.error_count,
            elapsed_ms: self.progress.snapshot().elapsed.as_millis(),
        };
        (xml, stats)
    }

    fn header_chunk(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<rss version=\"2.0\" xmlns:{prefix}=\"{uri}\">\n",
                "  <channel>\n",
                "    <title>{title}</title>\n",
                "    <link>{link}</link>\n",
                "    <description>{title} product feed</description>\n",
            ),
            prefix = self.publisher.namespace_prefix(),
            uri = self.publisher.namespace_uri(),
            title = quick_xml::escape::escape(&self.ctx.site_name),
            link = quick_xml::escape::escape(&self.ctx.site_url),
        )
    }

    fn batch_chunk(&mut self) -> String {
        let end = (self.cursor + self.batch_size).min(self.products.len());
        let batch = &self.products[self.cursor..end];

        let mut chunk = String::new();
        for product in batch {
            let formatted = process_product_variants(product, self.publisher, &self.ctx);
            self.item_count += formatted.items.len();
            self.error_count += formatted.errors.len();
            for item in formatted.items {
                chunk.push_str(&item);
            }
        }

        let processed = end - self.cursor;
        self.cursor = end;
        self.progress.increment(processed);

        if self.progress.should_log() {
            let snap = self.progress.snapshot();
            tracing::info!(
                processed = snap.processed,
                total = snap.total,
                items = self.item_count,
                errors = self.error_count,
                elapsed_ms = snap.elapsed.as_millis() as u64,
                remaining_ms = snap
                    .estimated_remaining
                    .map(|d| d.as_millis() as u64),
                "Feed generation progress"
            );
        }

        chunk
    }

    fn footer_chunk(&self) -> String {
        let snap = self.progress.snapshot();
        format!(
            "  </channel>\n</rss>\n<!-- products: {} items: {} errors: {} elapsed_ms: {} -->\n",
            self.products.len(),
            self.item_count,
            self.error_count,
            snap.elapsed.as_millis(),
        )
    }
}

impl Iterator for FeedStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.state {
            StreamState::Header => {
                self.state = StreamState::Batches;
                Some(self.header_chunk())
            }
            StreamState::Batches => {
                if self.cursor < self.products.len() {
                    Some(self.batch_chunk())
                } else {
                    self.state = StreamState::Footer;
                    Some(self.footer_chunk())
                }
            }
            StreamState::Footer => {
                let snap = self.progress.snapshot();
                tracing::debug!(
                    products = self.products.len(),
                    items = self.item_count,
                    errors = self.error_count,
                    elapsed_ms = snap.elapsed.as_millis() as u64,
                    publisher = %self.publisher,
                    "Feed stream complete"
                );
                self.state = StreamState::Closed;
                None
            }
            StreamState::Closed => None,
        }
    }
}

/// Consumer cancellation is observed here: an aborted HTTP response
/// drops the body stream before the footer was emitted. Logging is the
/// only cleanup — there are no partial writes to undo.
impl Drop for FeedStream {
    fn drop(&mut self) {
        if !matches!(self.state, StreamState::Footer | StreamState::Closed) {
            tracing::info!(
                processed = self.progress.processed(),
                total = self.progress.total(),
                publisher = %self.publisher,
                "Feed stream cancelled before completion"
            );
        }
    }
}
