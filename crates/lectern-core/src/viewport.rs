//! Viewport controller: active document, page and scale.
//!
//! Rendering is split in three steps so the asynchronous part never borrows the
//! controller:
//!
//! 1. [`ViewportController::request_render`] snapshots the document handle, page
//!    and scale under a fresh generation token.
//! 2. [`RenderRequest::execute`] rasterizes and then builds the text overlay.
//! 3. [`ViewportController::apply_render`] commits the result only if no newer
//!    request or load happened in the meantime.

use crate::config::ViewerConfig;
use crate::coords::{CanvasGeometry, ContainerPoint};
use crate::document::{DocumentSource, PagedDocument, canvas_size_for};
use crate::error::{LoadError, RenderError};
use crate::overlay::TextOverlay;
use crate::raster::RasterSurface;
use kurbo::Size;
use std::rc::Rc;

/// The document currently owned by the viewport.
struct LoadedDocument {
    id: String,
    handle: Rc<dyn PagedDocument>,
    page_count: usize,
}

/// A page that has been rasterized and is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub document_id: String,
    pub page: usize,
    /// Scale the surface was rendered at.
    pub scale: f64,
    pub surface: RasterSurface,
    /// Always the same intrinsic size as `surface`.
    pub overlay: TextOverlay,
}

/// Proof that a load was started, checked again when it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    id: String,
}

impl LoadTicket {
    pub fn document_id(&self) -> &str {
        &self.id
    }
}

/// How a finished load was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document is now active.
    Loaded,
    /// A newer load or close superseded this one; the handle was released.
    Stale,
}

/// A self-contained render job.
pub struct RenderRequest {
    generation: u64,
    document: Rc<dyn PagedDocument>,
    page: usize,
    scale: f64,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRequest")
            .field("generation", &self.generation)
            .field("document", &self.document.id())
            .field("page", &self.page)
            .field("scale", &self.scale)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl RenderRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Canvas intrinsic size this request renders into.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Rasterize the page, then build its text overlay at the same scale.
    pub async fn execute(self) -> RenderCompletion {
        let result = self.produce().await;
        RenderCompletion {
            generation: self.generation,
            document_id: self.document.id().to_string(),
            page: self.page,
            scale: self.scale,
            result,
        }
    }

    async fn produce(&self) -> Result<(RasterSurface, TextOverlay), RenderError> {
        let surface = self
            .document
            .rasterize(self.page, self.scale, self.width, self.height)
            .await?;
        if surface.width() != self.width || surface.height() != self.height {
            return Err(RenderError::SizeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: surface.width(),
                height: surface.height(),
            });
        }

        // The overlay is only built once the raster exists
        let overlay = match self.document.text_content(self.page).await {
            Ok(items) => TextOverlay::from_items(items, self.scale, self.width, self.height),
            Err(e) => {
                log::warn!("{}; using fallback text layer", e);
                TextOverlay::fallback(self.scale, self.width, self.height)
            }
        };
        Ok((surface, overlay))
    }
}

/// Result of an executed [`RenderRequest`], waiting to be applied.
#[derive(Debug)]
pub struct RenderCompletion {
    generation: u64,
    document_id: String,
    page: usize,
    scale: f64,
    result: Result<(RasterSurface, TextOverlay), RenderError>,
}

impl RenderCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// How an applied render affected the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The new page is on screen.
    Displayed,
    /// A newer request or load superseded this render; nothing changed.
    Stale,
}

/// Owns the active document and decides what is rendered at which scale.
pub struct ViewportController {
    config: ViewerConfig,
    document: Option<LoadedDocument>,
    /// 1-based; 0 when no document is loaded.
    page: usize,
    /// Target scale for the next render.
    scale: f64,
    generation: u64,
    container_size: Size,
    canvas_origin: ContainerPoint,
    /// Displayed size reported by the presentation layer, if it differs from
    /// the intrinsic size.
    canvas_display_size: Option<Size>,
    displayed: Option<RenderedPage>,
}

impl ViewportController {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            document: None,
            page: 0,
            scale: 1.0,
            generation: 0,
            container_size: Size::ZERO,
            canvas_origin: ContainerPoint::new(0.0, 0.0),
            canvas_display_size: None,
            displayed: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.id.as_str())
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.page_count)
    }

    /// Scale the next render will use.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// The page currently on screen.
    pub fn displayed(&self) -> Option<&RenderedPage> {
        self.displayed.as_ref()
    }

    /// Release the active document and forget what is on screen.
    fn teardown(&mut self) {
        if let Some(document) = self.document.take() {
            log::debug!("Tearing down document {}", document.id);
            document.handle.close();
        }
        self.displayed = None;
        self.canvas_display_size = None;
    }

    /// Start loading a document. The previous one is torn down immediately.
    pub fn begin_load(&mut self, id: &str) -> LoadTicket {
        self.teardown();
        self.generation += 1;
        self.scale = 1.0;
        self.page = 1;
        LoadTicket {
            generation: self.generation,
            id: id.to_string(),
        }
    }

    /// Finish a load started with [`ViewportController::begin_load`].
    ///
    /// On success the document becomes active and is fitted to the container.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Rc<dyn PagedDocument>, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        if ticket.generation != self.generation {
            log::debug!("Discarding superseded load of {}", ticket.id);
            if let Ok(handle) = result {
                handle.close();
            }
            return Ok(LoadOutcome::Stale);
        }

        let handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                self.page = 0;
                return Err(e);
            }
        };
        let page_count = handle.page_count();
        if page_count == 0 {
            handle.close();
            self.page = 0;
            return Err(LoadError::Empty(ticket.id));
        }

        log::info!("Loaded document {} ({} pages)", ticket.id, page_count);
        self.document = Some(LoadedDocument {
            id: ticket.id,
            handle,
            page_count,
        });
        self.page = 1;
        self.fit_to_container();
        Ok(LoadOutcome::Loaded)
    }

    /// Open a document from `source` and make it active.
    pub async fn load_document(
        &mut self,
        source: &dyn DocumentSource,
        id: &str,
    ) -> Result<LoadOutcome, LoadError> {
        let ticket = self.begin_load(id);
        let result = source.open(id).await;
        self.finish_load(ticket, result)
    }

    /// Tear down the active document without loading another.
    pub fn close(&mut self) {
        self.teardown();
        self.generation += 1;
        self.page = 0;
        self.scale = 1.0;
    }

    /// Capture everything needed to render the current page.
    ///
    /// Every request supersedes all earlier ones.
    pub fn request_render(&mut self) -> Result<RenderRequest, RenderError> {
        let document = self.document.as_ref().ok_or(RenderError::NoDocument)?;
        let page_size = document
            .handle
            .page_size(self.page)
            .ok_or(RenderError::PageOutOfRange {
                page: self.page,
                total: document.page_count,
            })?;
        let (width, height) = canvas_size_for(page_size, self.scale);

        self.generation += 1;
        Ok(RenderRequest {
            generation: self.generation,
            document: document.handle.clone(),
            page: self.page,
            scale: self.scale,
            width,
            height,
        })
    }

    /// Commit a finished render if it is still current.
    ///
    /// A failed render leaves the previously displayed page in place.
    pub fn apply_render(&mut self, completion: RenderCompletion) -> Result<RenderOutcome, RenderError> {
        if completion.generation != self.generation {
            log::debug!(
                "Discarding stale render of {} page {} (generation {} < {})",
                completion.document_id,
                completion.page,
                completion.generation,
                self.generation
            );
            return Ok(RenderOutcome::Stale);
        }

        let (surface, overlay) = completion.result.inspect_err(|e| {
            log::error!("Error rendering page {}: {}", completion.page, e);
        })?;

        log::info!(
            "Rendered page {} at scale {:.2} ({}%) - Canvas: {}x{}",
            completion.page,
            completion.scale,
            (completion.scale * 100.0).round(),
            surface.width(),
            surface.height()
        );
        self.canvas_display_size = None;
        self.displayed = Some(RenderedPage {
            document_id: completion.document_id,
            page: completion.page,
            scale: completion.scale,
            surface,
            overlay,
        });
        Ok(RenderOutcome::Displayed)
    }

    /// Request, execute and apply a render of the current page.
    pub async fn render(&mut self) -> Result<RenderOutcome, RenderError> {
        let request = self.request_render()?;
        let completion = request.execute().await;
        self.apply_render(completion)
    }

    /// Scale the current page to fit the container, with a margin.
    ///
    /// Keeps the current scale when there is no document or no container size.
    pub fn fit_to_container(&mut self) -> f64 {
        let Some(page_size) = self
            .document
            .as_ref()
            .and_then(|d| d.handle.page_size(self.page))
        else {
            return self.scale;
        };
        let container = self.container_size;
        if !(container.width > 0.0 && container.height > 0.0)
            || !(page_size.width > 0.0 && page_size.height > 0.0)
        {
            return self.scale;
        }

        let fit = (container.width / page_size.width).min(container.height / page_size.height);
        self.scale = self.config.clamp_scale(fit * self.config.fit_margin);
        log::debug!("Fitted to container at scale {:.3}", self.scale);
        self.scale
    }

    /// Multiply the scale by one zoom step. Returns true if it changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.scale * self.config.zoom_step)
    }

    /// Divide the scale by one zoom step. Returns true if it changed.
    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.scale / self.config.zoom_step)
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        if self.document.is_none() {
            return false;
        }
        let scale = self.config.clamp_scale(scale);
        if (scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = scale;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    /// Switch to page `page`. Out-of-range pages and the current page are no-ops.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Record the container's current content size.
    pub fn resize_container(&mut self, size: Size) {
        self.container_size = size;
    }

    /// Record where and how large the canvas is displayed inside the container.
    ///
    /// The display size resets to the intrinsic size whenever a new page is
    /// displayed.
    pub fn set_canvas_display(&mut self, origin: ContainerPoint, size: Size) {
        self.canvas_origin = origin;
        self.canvas_display_size = Some(size);
    }

    /// Live geometry of the displayed canvas.
    pub fn canvas_geometry(&self) -> Option<CanvasGeometry> {
        let displayed = self.displayed.as_ref()?;
        let intrinsic_size = displayed.surface.size();
        Some(CanvasGeometry {
            origin: self.canvas_origin,
            display_size: self.canvas_display_size.unwrap_or(intrinsic_size),
            intrinsic_size,
        })
    }
}
