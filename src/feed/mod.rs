//! Merchant feed generation: formatting, batching, pagination, progress.

mod format;
mod pagination;
mod progress;
mod publisher;
mod stream;

pub use format::{format_variant_item, process_product_variants, FeedContext, FormattedProduct};
pub use pagination::{
    calculate_pagination_metadata, page_slice, validate_page_number, PageError,
    PaginationMetadata,
};
pub use progress::{FeedProgress, ProgressSnapshot};
pub use publisher::{Publisher, PublisherError};
pub use stream::{FeedStats, FeedStream, DEFAULT_BATCH_SIZE};
