//! Boundary to the fetcher collaborator that enriches preparsed items with
//! art and remote metadata.

use std::sync::Arc;

use async_trait::async_trait;

use crate::item::{Item, PreparseStatus};
use crate::preparser::PreparseOptions;

/// Secondary enrichment collaborator, invoked after a preparse run ends.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Offer `item` for enrichment, with the preparse status that led here.
    ///
    /// Returns true when the fetcher accepts the item; from then on the
    /// fetcher owns signaling the item's end-of-preparse. On false the
    /// preparser emits the final signal itself.
    async fn push(&self, item: Arc<Item>, options: PreparseOptions, status: PreparseStatus)
        -> bool;
}
