//! The viewer context.
//!
//! [`Viewer`] owns every subsystem and is the only entry point the
//! presentation layer talks to. Notifications are queued and drained with
//! [`Viewer::poll_events`].
//!
//! [`Viewer::open_document`] and [`Viewer::render`] hold the viewer for the
//! whole await. A presentation layer that must keep handling input meanwhile
//! uses the split forms instead: [`Viewer::begin_open`] / [`PendingOpen::fetch`]
//! / [`Viewer::finish_open`] and [`Viewer::request_render`] /
//! [`RenderRequest::execute`] / [`Viewer::apply_render`]. Only the async middle
//! step runs without the viewer; late completions are discarded.

use crate::attachment::{AttachmentSlot, ChatRequest, ChatRequestError};
use crate::config::ViewerConfig;
use crate::coords::{ContainerPoint, ContainerRect, rect_to_canvas_intrinsic};
use crate::document::{DocumentSource, PagedDocument};
use crate::error::{CaptureError, LoadError, PersistenceError, RenderError};
use crate::memory::{RecentRegions, RegionMemory};
use crate::overlay::OverlayDescriptor;
use crate::selector::{RegionSelector, SelectionOutcome};
use crate::snapshot::{RegionSnapshot, capture};
use crate::storage::Storage;
use crate::viewport::{
    LoadOutcome, LoadTicket, RenderCompletion, RenderOutcome, RenderRequest, RenderedPage,
    ViewportController,
};
use kurbo::Size;
use std::rc::Rc;
use std::sync::Arc;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// A selection was captured, recorded and armed for the next message.
    RegionCommitted(RegionSnapshot),
    /// A remembered region was armed for the next message.
    RegionReused(RegionSnapshot),
    /// A page is on screen. The canvas display size is back to the intrinsic
    /// size; see [`Viewer::set_canvas_display`].
    PageRendered { document_id: String, page: usize, scale: f64 },
    /// The target scale changed.
    ScaleChanged { scale: f64 },
    /// A document could not be opened.
    LoadFailed { document_id: String, message: String },
    /// A committed selection could not be captured.
    CaptureFailed { message: String },
    /// A drag was discarded without a snapshot.
    SelectionCancelled,
}

/// A document open started with [`Viewer::begin_open`].
pub struct PendingOpen {
    ticket: LoadTicket,
    source: Rc<dyn DocumentSource>,
}

impl PendingOpen {
    pub fn document_id(&self) -> &str {
        self.ticket.document_id()
    }

    /// Fetch and decode the document without touching the viewer.
    pub async fn fetch(self) -> OpenCompletion {
        let result = self.source.open(self.ticket.document_id()).await;
        OpenCompletion {
            ticket: self.ticket,
            result,
        }
    }
}

/// A fetched document waiting for [`Viewer::finish_open`].
pub struct OpenCompletion {
    ticket: LoadTicket,
    result: Result<Rc<dyn PagedDocument>, LoadError>,
}

impl OpenCompletion {
    pub fn document_id(&self) -> &str {
        self.ticket.document_id()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Document viewport with region capture.
pub struct Viewer<S: Storage> {
    source: Rc<dyn DocumentSource>,
    viewport: ViewportController,
    selector: RegionSelector,
    memory: RegionMemory<S>,
    attachment: AttachmentSlot,
    events: Vec<ViewerEvent>,
    /// Last scale sent with [`ViewerEvent::ScaleChanged`].
    announced_scale: f64,
}

impl<S: Storage> Viewer<S> {
    pub fn new(config: ViewerConfig, source: Box<dyn DocumentSource>, storage: Arc<S>) -> Self {
        let config = config.sanitized();
        let viewport = ViewportController::new(config.clone());
        Self {
            source: Rc::from(source),
            announced_scale: viewport.scale(),
            selector: RegionSelector::new(config.min_selection_size),
            memory: RegionMemory::new(storage, &config),
            viewport,
            attachment: AttachmentSlot::new(),
            events: Vec::new(),
        }
    }

    /// Load remembered regions from storage.
    ///
    /// On failure the regions already in memory are kept as they are.
    pub async fn restore_regions(&mut self) -> Result<usize, PersistenceError> {
        match self.memory.load().await.map(|entries| entries.len()) {
            Ok(count) => Ok(count),
            Err(e) => {
                log::warn!("{}; keeping {} region(s) in memory", e, self.memory.len());
                Err(e)
            }
        }
    }

    // --- Observables ---

    pub fn current_page(&self) -> usize {
        self.viewport.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.viewport.total_pages()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.viewport.document_id()
    }

    pub fn displayed(&self) -> Option<&RenderedPage> {
        self.viewport.displayed()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    pub fn memory(&self) -> &RegionMemory<S> {
        &self.memory
    }

    pub fn attachment(&self) -> &AttachmentSlot {
        &self.attachment
    }

    /// Rubber-band overlay to draw, if a drag is in progress.
    pub fn overlay(&self) -> Option<OverlayDescriptor> {
        self.selector.overlay()
    }

    /// Drain pending notifications.
    pub fn poll_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Documents and navigation ---

    /// Open a document, fit it to the container and render its first page.
    pub async fn open_document(&mut self, id: &str) -> Result<(), LoadError> {
        let completion = self.begin_open(id).fetch().await;
        if self.finish_open(completion)? == LoadOutcome::Loaded {
            self.render().await;
        }
        Ok(())
    }

    /// Tear down the current document and start opening `id`.
    ///
    /// Any open or render still in flight becomes stale.
    pub fn begin_open(&mut self, id: &str) -> PendingOpen {
        self.cancel_drag();
        PendingOpen {
            ticket: self.viewport.begin_load(id),
            source: self.source.clone(),
        }
    }

    /// Activate a fetched document and fit it. Does not render.
    pub fn finish_open(&mut self, completion: OpenCompletion) -> Result<LoadOutcome, LoadError> {
        let id = completion.ticket.document_id().to_string();
        match self.viewport.finish_load(completion.ticket, completion.result) {
            Ok(LoadOutcome::Loaded) => {
                self.announce_scale();
                Ok(LoadOutcome::Loaded)
            }
            Ok(LoadOutcome::Stale) => Ok(LoadOutcome::Stale),
            Err(e) => {
                log::error!("Failed to load document: {}", e);
                self.events.push(ViewerEvent::LoadFailed {
                    document_id: id,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn close_document(&mut self) {
        self.cancel_drag();
        self.viewport.close();
    }

    pub async fn next_page(&mut self) -> bool {
        self.switch_page(self.viewport.current_page() + 1).await
    }

    pub async fn previous_page(&mut self) -> bool {
        match self.viewport.current_page().checked_sub(1) {
            Some(page) => self.switch_page(page).await,
            None => false,
        }
    }

    pub async fn go_to_page(&mut self, page: usize) -> bool {
        self.switch_page(page).await
    }

    async fn switch_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.viewport.total_pages() || page == self.viewport.current_page() {
            return false;
        }
        self.cancel_drag();
        self.viewport.go_to_page(page);
        self.render().await;
        true
    }

    pub async fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in();
        self.after_scale_change(changed).await
    }

    pub async fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out();
        self.after_scale_change(changed).await
    }

    pub async fn fit_to_container(&mut self) -> bool {
        let before = self.viewport.scale();
        let changed = (self.viewport.fit_to_container() - before).abs() > f64::EPSILON;
        self.after_scale_change(changed).await
    }

    async fn after_scale_change(&mut self, changed: bool) -> bool {
        if changed {
            self.announce_scale();
            self.render().await;
        }
        changed
    }

    fn announce_scale(&mut self) {
        let scale = self.viewport.scale();
        if (scale - self.announced_scale).abs() > f64::EPSILON {
            self.announced_scale = scale;
            self.events.push(ViewerEvent::ScaleChanged { scale });
        }
    }

    /// Re-render the current page.
    pub async fn render(&mut self) -> Option<RenderOutcome> {
        let request = self.request_render()?;
        let completion = request.execute().await;
        self.apply_render(completion)
    }

    /// Snapshot what the current page needs for rendering.
    ///
    /// `None` when there is no document or the page cannot be rendered.
    pub fn request_render(&mut self) -> Option<RenderRequest> {
        match self.viewport.request_render() {
            Ok(request) => Some(request),
            Err(RenderError::NoDocument) => None,
            Err(e) => {
                log::warn!("Keeping previous page, cannot render: {}", e);
                None
            }
        }
    }

    /// Commit an executed render. Stale completions change nothing and emit
    /// no event; failures keep the previous page.
    pub fn apply_render(&mut self, completion: RenderCompletion) -> Option<RenderOutcome> {
        match self.viewport.apply_render(completion) {
            Ok(RenderOutcome::Displayed) => {
                if let Some(page) = self.viewport.displayed() {
                    self.events.push(ViewerEvent::PageRendered {
                        document_id: page.document_id.clone(),
                        page: page.page,
                        scale: page.scale,
                    });
                }
                Some(RenderOutcome::Displayed)
            }
            Ok(RenderOutcome::Stale) => Some(RenderOutcome::Stale),
            // Already logged by the controller
            Err(_) => None,
        }
    }

    /// Record the container's content size.
    pub fn resize(&mut self, size: Size) {
        self.viewport.resize_container(size);
    }

    /// Record where the canvas is displayed inside the container.
    ///
    /// The origin persists. The display size applies to the page currently on
    /// screen only: every [`ViewerEvent::PageRendered`] resets it to the new
    /// intrinsic size, so a layout that scales the canvas must send it again.
    pub fn set_canvas_display(&mut self, origin: ContainerPoint, size: Size) {
        self.viewport.set_canvas_display(origin, size);
    }

    /// Selectable text under a container-space rectangle of the displayed page.
    pub fn text_under(&self, rect: ContainerRect) -> Option<String> {
        let page = self.viewport.displayed()?;
        let geometry = self.viewport.canvas_geometry()?;
        let canvas = rect_to_canvas_intrinsic(rect, &geometry).ok()?;
        Some(page.overlay.text_in(canvas))
    }

    // --- Selection ---

    pub fn enter_selection_mode(&mut self) {
        self.selector.enter_selection_mode();
    }

    pub fn exit_selection_mode(&mut self) {
        if self.selector.exit_selection_mode() {
            self.events.push(ViewerEvent::SelectionCancelled);
        }
    }

    /// Abandon the current drag and drop any armed attachment.
    pub fn cancel(&mut self) {
        self.cancel_drag();
        self.attachment.disarm();
    }

    fn cancel_drag(&mut self) {
        if self.selector.cancel() {
            self.events.push(ViewerEvent::SelectionCancelled);
        }
    }

    pub fn pointer_down(&mut self, position: ContainerPoint) -> bool {
        self.selector.pointer_down(position)
    }

    pub fn pointer_move(&mut self, position: ContainerPoint) -> Option<OverlayDescriptor> {
        self.selector.pointer_move(position)
    }

    /// Finish a drag. A committed selection is captured, remembered and armed.
    pub async fn pointer_up(&mut self, position: ContainerPoint) -> Option<RegionSnapshot> {
        match self.selector.pointer_up(position) {
            SelectionOutcome::Ignored => None,
            SelectionOutcome::Cancelled(_) => {
                self.events.push(ViewerEvent::SelectionCancelled);
                None
            }
            SelectionOutcome::Committed(rect) => match self.capture_region(rect).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    log::warn!("Failed to capture selected area: {}", e);
                    self.events.push(ViewerEvent::CaptureFailed {
                        message: e.to_string(),
                    });
                    None
                }
            },
        }
    }

    /// Capture a container-space rectangle of the displayed page.
    pub async fn capture_region(&mut self, rect: ContainerRect) -> Result<RegionSnapshot, CaptureError> {
        let page = self.viewport.displayed().ok_or(CaptureError::NothingRendered)?;
        let geometry = self
            .viewport
            .canvas_geometry()
            .ok_or(CaptureError::NothingRendered)?;
        let pending = capture(rect, &page.surface, &geometry, page.scale)?
            .into_pending(page.document_id.clone(), page.page);

        let snapshot = self.memory.record(pending).await;
        log::info!(
            "Captured region {} from page {} of {}",
            snapshot.id,
            snapshot.page_number,
            snapshot.document_id
        );
        self.attachment.arm(snapshot.clone());
        self.events.push(ViewerEvent::RegionCommitted(snapshot.clone()));
        Ok(snapshot)
    }

    // --- Region memory ---

    pub fn recent_regions(&self) -> RecentRegions<'_> {
        self.memory.list()
    }

    /// Arm a remembered region. Unknown ids are ignored.
    pub fn reuse_region(&mut self, id: &str) -> Option<RegionSnapshot> {
        let snapshot = self.memory.reuse(id)?.clone();
        self.attachment.arm(snapshot.clone());
        self.events.push(ViewerEvent::RegionReused(snapshot.clone()));
        Some(snapshot)
    }

    pub async fn clear_regions(&mut self) {
        self.memory.clear().await;
        self.attachment.disarm();
    }

    // --- Chat ---

    /// Build the next chat request, consuming the armed region if any.
    pub fn compose_chat_request(
        &mut self,
        message: &str,
        response_language: &str,
    ) -> Result<ChatRequest, ChatRequestError> {
        ChatRequest::compose(message, response_language, &mut self.attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PageRect;
    use crate::storage::MemoryStorage;
    use crate::test_util::{StubDocument, StubSource, block_on};

    fn p(x: f64, y: f64) -> ContainerPoint {
        ContainerPoint::new(x, y)
    }

    fn source() -> StubSource {
        StubSource::new()
            .with(StubDocument::new("a", 3, Size::new(400.0, 300.0), [255, 0, 0, 255]))
            .with(StubDocument::new("b", 1, Size::new(400.0, 300.0), [0, 255, 0, 255]))
    }

    fn viewer_with(source: StubSource, storage: Arc<MemoryStorage>) -> Viewer<MemoryStorage> {
        let mut viewer = Viewer::new(ViewerConfig::default(), Box::new(source), storage);
        viewer.resize(Size::new(800.0, 600.0));
        viewer
    }

    fn opened() -> Viewer<MemoryStorage> {
        let mut viewer = viewer_with(source(), Arc::new(MemoryStorage::new()));
        block_on(viewer.open_document("a")).unwrap();
        viewer.enter_selection_mode();
        viewer.poll_events();
        viewer
    }

    fn drag(viewer: &mut Viewer<MemoryStorage>, from: ContainerPoint, to: ContainerPoint) -> Option<RegionSnapshot> {
        viewer.pointer_down(from);
        viewer.pointer_move(to);
        block_on(viewer.pointer_up(to))
    }

    #[test]
    fn test_open_emits_scale_and_page() {
        let mut viewer = viewer_with(source(), Arc::new(MemoryStorage::new()));
        block_on(viewer.open_document("a")).unwrap();

        assert_eq!(viewer.current_page(), 1);
        assert_eq!(viewer.total_pages(), 3);
        assert!((viewer.scale() - 1.8).abs() < 1e-9);

        let events = viewer.poll_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ViewerEvent::ScaleChanged { .. }));
        assert!(matches!(&events[1], ViewerEvent::PageRendered { page: 1, .. }));
        assert!(viewer.poll_events().is_empty());
    }

    #[test]
    fn test_load_failure_event() {
        let mut viewer = viewer_with(source(), Arc::new(MemoryStorage::new()));
        assert!(block_on(viewer.open_document("missing")).is_err());
        assert!(matches!(
            viewer.poll_events().as_slice(),
            [ViewerEvent::LoadFailed { document_id, .. }] if document_id == "missing"
        ));
    }

    #[test]
    fn test_selection_captured_recorded_and_armed() {
        let mut viewer = opened();
        let snapshot = drag(&mut viewer, p(10.0, 10.0), p(120.0, 80.0)).unwrap();

        assert_eq!(snapshot.document_id, "a");
        assert_eq!(snapshot.page_number, 1);
        assert_eq!((snapshot.image.width, snapshot.image.height), (110, 70));
        let expected = PageRect::new(10.0 / 1.8, 10.0 / 1.8, 110.0 / 1.8, 70.0 / 1.8);
        assert!((snapshot.rect.left - expected.left).abs() < 1e-9);
        assert!((snapshot.rect.width - expected.width).abs() < 1e-9);

        assert_eq!(viewer.memory().len(), 1);
        assert_eq!(viewer.attachment().armed(), Some(&snapshot));
        assert_eq!(
            viewer.poll_events(),
            vec![ViewerEvent::RegionCommitted(snapshot.clone())]
        );
        assert!(viewer.overlay().is_none());

        let request = viewer.compose_chat_request("What is this?", "English").unwrap();
        assert_eq!(request.image, Some(snapshot.image.to_data_url()));
        let request = viewer.compose_chat_request("And this?", "English").unwrap();
        assert!(request.image.is_none());
    }

    #[test]
    fn test_small_drag_cancelled() {
        let mut viewer = opened();
        assert!(drag(&mut viewer, p(10.0, 10.0), p(15.0, 12.0)).is_none());
        assert_eq!(viewer.poll_events(), vec![ViewerEvent::SelectionCancelled]);
        assert!(viewer.memory().is_empty());
        assert!(!viewer.attachment().is_armed());
    }

    #[test]
    fn test_page_switch_cancels_drag() {
        let mut viewer = opened();
        viewer.pointer_down(p(10.0, 10.0));
        viewer.pointer_move(p(100.0, 100.0));
        assert!(viewer.overlay().is_some());

        assert!(block_on(viewer.next_page()));
        assert!(viewer.overlay().is_none());
        assert!(block_on(viewer.pointer_up(p(100.0, 100.0))).is_none());

        let events = viewer.poll_events();
        assert_eq!(events[0], ViewerEvent::SelectionCancelled);
        assert!(matches!(&events[1], ViewerEvent::PageRendered { page: 2, .. }));
        assert!(viewer.memory().is_empty());
    }

    #[test]
    fn test_document_switch_cancels_drag() {
        let mut viewer = opened();
        viewer.pointer_down(p(10.0, 10.0));
        block_on(viewer.open_document("b")).unwrap();
        assert!(!viewer.selector().is_dragging());
        assert_eq!(viewer.poll_events()[0], ViewerEvent::SelectionCancelled);
        assert_eq!(viewer.document_id(), Some("b"));
    }

    #[test]
    fn test_capture_without_rendered_page_fails() {
        let source = source();
        source.get("a").fail_raster.set(true);
        let mut viewer = viewer_with(source, Arc::new(MemoryStorage::new()));
        block_on(viewer.open_document("a")).unwrap();
        viewer.enter_selection_mode();
        viewer.poll_events();

        assert!(drag(&mut viewer, p(10.0, 10.0), p(120.0, 80.0)).is_none());
        assert!(matches!(
            viewer.poll_events().as_slice(),
            [ViewerEvent::CaptureFailed { .. }]
        ));
        assert!(viewer.memory().is_empty());
        assert!(!viewer.attachment().is_armed());
    }

    #[test]
    fn test_capture_follows_canvas_display() {
        let mut viewer = opened();
        // Canvas shown at half size, offset inside the container
        viewer.set_canvas_display(p(15.0, 15.0), Size::new(360.0, 270.0));
        let snapshot = drag(&mut viewer, p(25.0, 25.0), p(75.0, 50.0)).unwrap();
        assert_eq!((snapshot.image.width, snapshot.image.height), (100, 50));
    }

    #[test]
    fn test_cancel_disarms() {
        let mut viewer = opened();
        drag(&mut viewer, p(10.0, 10.0), p(120.0, 80.0)).unwrap();
        viewer.cancel();
        assert!(!viewer.attachment().is_armed());
        // The region stays remembered
        assert_eq!(viewer.memory().len(), 1);
    }

    #[test]
    fn test_reuse_and_clear() {
        let mut viewer = opened();
        let snapshot = drag(&mut viewer, p(10.0, 10.0), p(120.0, 80.0)).unwrap();
        viewer.cancel();
        viewer.poll_events();

        assert!(viewer.reuse_region("region_unknown").is_none());
        assert!(!viewer.attachment().is_armed());

        assert_eq!(viewer.reuse_region(&snapshot.id), Some(snapshot.clone()));
        assert!(viewer.attachment().is_armed());
        assert_eq!(viewer.poll_events(), vec![ViewerEvent::RegionReused(snapshot)]);

        block_on(viewer.clear_regions());
        assert!(viewer.memory().is_empty());
        assert!(!viewer.attachment().is_armed());
        assert_eq!(viewer.recent_regions().remaining, 0);
    }

    #[test]
    fn test_regions_shared_across_viewers() {
        let storage = Arc::new(MemoryStorage::new());
        let mut first = viewer_with(source(), storage.clone());
        block_on(first.open_document("a")).unwrap();
        first.enter_selection_mode();
        let snapshot = drag(&mut first, p(10.0, 10.0), p(120.0, 80.0)).unwrap();

        let mut second = viewer_with(source(), storage);
        assert_eq!(block_on(second.restore_regions()).unwrap(), 1);
        assert_eq!(second.recent_regions().recent, &[snapshot]);
    }

    #[test]
    fn test_zoom_events() {
        let mut viewer = opened();
        assert!(block_on(viewer.zoom_in()));
        let events = viewer.poll_events();
        assert!(matches!(events[0], ViewerEvent::ScaleChanged { scale } if (scale - 2.16).abs() < 1e-9));
        assert!(matches!(&events[1], ViewerEvent::PageRendered { scale, .. } if (*scale - 2.16).abs() < 1e-9));

        assert!(block_on(viewer.fit_to_container()));
        assert_eq!(viewer.poll_events().len(), 2);
        // Already fitted
        assert!(!block_on(viewer.fit_to_container()));
        assert!(viewer.poll_events().is_empty());
    }

    #[test]
    fn test_late_render_after_document_switch_discarded() {
        let mut viewer = opened();
        let late = viewer.request_render().unwrap();

        let fetched = block_on(viewer.begin_open("b").fetch());
        assert_eq!(viewer.finish_open(fetched).unwrap(), LoadOutcome::Loaded);
        let fresh = block_on(viewer.request_render().unwrap().execute());
        assert_eq!(viewer.apply_render(fresh), Some(RenderOutcome::Displayed));
        viewer.poll_events();

        let late = block_on(late.execute());
        assert!(late.is_ok());
        assert_eq!(viewer.apply_render(late), Some(RenderOutcome::Stale));
        assert!(viewer.poll_events().is_empty());

        let page = viewer.displayed().unwrap();
        assert_eq!(page.document_id, "b");
        assert_eq!(page.surface.pixel(0, 0), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_late_render_before_new_document_renders() {
        let mut viewer = opened();
        let late = viewer.request_render().unwrap();
        let opening = viewer.begin_open("b");

        let late = block_on(late.execute());
        assert_eq!(viewer.apply_render(late), Some(RenderOutcome::Stale));
        assert!(viewer.displayed().is_none());

        let fetched = block_on(opening.fetch());
        viewer.finish_open(fetched).unwrap();
        assert_eq!(viewer.document_id(), Some("b"));
        assert!(viewer.poll_events().is_empty());
    }

    #[test]
    fn test_superseded_open_is_stale() {
        let source = source();
        let a = source.get("a");
        let mut viewer = viewer_with(source, Arc::new(MemoryStorage::new()));

        let first = viewer.begin_open("a");
        let second = viewer.begin_open("b");
        let second = block_on(second.fetch());
        assert_eq!(viewer.finish_open(second).unwrap(), LoadOutcome::Loaded);

        let first = block_on(first.fetch());
        assert!(first.is_ok());
        assert_eq!(viewer.finish_open(first).unwrap(), LoadOutcome::Stale);
        assert_eq!(viewer.document_id(), Some("b"));
        assert!(a.closed.get());
        assert!(matches!(viewer.poll_events().as_slice(), [ViewerEvent::ScaleChanged { .. }]));
    }

    #[test]
    fn test_canvas_display_resent_after_render() {
        let mut viewer = opened();
        viewer.set_canvas_display(p(0.0, 0.0), Size::new(360.0, 270.0));
        let geo = viewer.viewport().canvas_geometry().unwrap();
        assert_eq!(geo.ratio().unwrap(), (2.0, 2.0));

        assert!(block_on(viewer.zoom_in()));
        let geo = viewer.viewport().canvas_geometry().unwrap();
        assert_eq!(geo.display_size, geo.intrinsic_size);

        viewer.set_canvas_display(p(0.0, 0.0), Size::new(432.0, 324.0));
        let geo = viewer.viewport().canvas_geometry().unwrap();
        assert_eq!(geo.ratio().unwrap(), (2.0, 2.0));
    }

    #[test]
    fn test_text_under_selection() {
        let mut viewer = opened();
        // Stub text sits at page (10, 10) to (110, 22), canvas x1.8
        assert_eq!(
            viewer.text_under(ContainerRect::new(0.0, 0.0, 50.0, 50.0)).as_deref(),
            Some("a page 1")
        );
        assert_eq!(
            viewer.text_under(ContainerRect::new(300.0, 300.0, 50.0, 50.0)).as_deref(),
            Some("")
        );
        viewer.close_document();
        assert!(viewer.text_under(ContainerRect::new(0.0, 0.0, 50.0, 50.0)).is_none());
    }

    #[test]
    fn test_page_edges() {
        let mut viewer = opened();
        assert!(!block_on(viewer.previous_page()));
        assert!(block_on(viewer.go_to_page(3)));
        assert!(!block_on(viewer.next_page()));
        assert_eq!(viewer.current_page(), 3);
    }
}
