//! Search pipeline.
//!
//! Input changes are debounced into settled terms. Each settled term starts
//! a catalog fetch whose outcome becomes the render state, unless a newer
//! fetch started meanwhile. Successful non-empty searches are counted by the
//! trending aggregator.
//!
//! # Example
//!
//! ```ignore
//! use moviefinder_core::pipeline::{SearchController, SearchPipeline};
//!
//! let controller = Arc::new(SearchController::new(catalog, Some(aggregator)));
//! let pipeline = SearchPipeline::start(controller.clone(), Duration::from_millis(500)).await;
//!
//! pipeline.input("batman").await;
//! let mut views = controller.subscribe();
//! while views.changed().await.is_ok() {
//!     println!("{:?}", views.borrow().state);
//! }
//! ```

mod controller;
mod runtime;
mod state;

pub use controller::{FetchTicket, Resolution, SearchController};
pub use runtime::SearchPipeline;
pub use state::{
    FetchState, FetchStateTag, SearchView, FETCH_ERROR_MESSAGE, UPSTREAM_FALLBACK_MESSAGE,
};
