//! Lectern Core Library
//!
//! Platform-agnostic document viewport and region capture engine: renders a
//! paged document at a fitted zoom level, keeps a selectable text overlay
//! registered with the raster, turns pointer drags into page snapshots and
//! remembers the most recent ones across sessions.

pub mod attachment;
pub mod config;
pub mod coords;
pub mod document;
pub mod error;
pub mod memory;
pub mod overlay;
pub mod raster;
pub mod selector;
pub mod snapshot;
pub mod storage;
pub mod viewer;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_util;

pub use attachment::{AttachmentSlot, ChatRequest, ChatRequestError, ChatResponse};
pub use config::ViewerConfig;
pub use coords::{
    CanvasGeometry, CanvasPoint, CanvasRect, ContainerPoint, ContainerRect, MappingError,
    PagePoint, PageRect, SelectionRect,
};
pub use document::{DocumentSource, PagedDocument, TextItem, canvas_size_for};
pub use error::{CaptureError, LoadError, PersistenceError, RenderError, SelectionRejected, TextLayerError};
pub use memory::{RecentRegions, RegionMemory};
pub use overlay::{OverlayDescriptor, OverlayStyle, TextOverlay, TextOverlayContent, TextSpan};
pub use raster::{EmbeddedImage, ImageFormat, RasterSurface, encode_png};
pub use selector::{RegionSelector, SelectionOutcome, SelectorState};
pub use snapshot::{CapturedRegion, PendingRegion, RegionSnapshot, capture};
pub use storage::{MemoryStorage, PlatformStorage, Storage, StorageError, create_default_storage};
pub use viewer::{OpenCompletion, PendingOpen, Viewer, ViewerEvent};
pub use viewport::{
    LoadOutcome, LoadTicket, RenderCompletion, RenderOutcome, RenderRequest, RenderedPage,
    ViewportController,
};
