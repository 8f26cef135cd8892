//! Shared helpers for unit tests.

use crate::coords::PageRect;
use crate::document::{DocumentSource, PagedDocument, TextItem};
use crate::error::{LoadError, RenderError, TextLayerError};
use crate::raster::RasterSurface;
use crate::storage::BoxFuture;
use kurbo::Size;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Simple blocking executor for tests.
pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

/// An in-memory document whose pages rasterize to a solid color.
pub struct StubDocument {
    id: String,
    page_size: Size,
    pages: usize,
    color: [u8; 4],
    /// Pages whose text extraction fails.
    pub textless_pages: Vec<usize>,
    /// Fail every rasterization when set.
    pub fail_raster: Cell<bool>,
    pub closed: Cell<bool>,
}

impl StubDocument {
    pub fn new(id: &str, pages: usize, page_size: Size, color: [u8; 4]) -> Self {
        Self {
            id: id.to_string(),
            page_size,
            pages,
            color,
            textless_pages: Vec::new(),
            fail_raster: Cell::new(false),
            closed: Cell::new(false),
        }
    }
}

impl PagedDocument for StubDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn page_size(&self, page: usize) -> Option<Size> {
        (1..=self.pages).contains(&page).then_some(self.page_size)
    }

    fn rasterize(
        &self,
        _page: usize,
        _scale: f64,
        width: u32,
        height: u32,
    ) -> BoxFuture<'_, Result<RasterSurface, RenderError>> {
        let result = if self.fail_raster.get() {
            Err(RenderError::Raster("stub failure".to_string()))
        } else {
            Ok(RasterSurface::filled(width, height, self.color))
        };
        Box::pin(async move { result })
    }

    fn text_content(&self, page: usize) -> BoxFuture<'_, Result<Vec<TextItem>, TextLayerError>> {
        let result = if self.textless_pages.contains(&page) {
            Err(TextLayerError::Unavailable(format!("page {page}")))
        } else {
            Ok(vec![TextItem {
                text: format!("{} page {}", self.id, page),
                rect: PageRect::new(10.0, 10.0, 100.0, 12.0),
            }])
        };
        Box::pin(async move { result })
    }

    fn close(&self) {
        self.closed.set(true);
    }
}

/// A document source over a fixed set of stub documents.
#[derive(Default)]
pub struct StubSource {
    documents: HashMap<String, Rc<StubDocument>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, document: StubDocument) -> Self {
        self.documents.insert(document.id.clone(), Rc::new(document));
        self
    }

    pub fn get(&self, id: &str) -> Rc<StubDocument> {
        self.documents[id].clone()
    }
}

impl DocumentSource for StubSource {
    fn open(&self, id: &str) -> BoxFuture<'_, Result<Rc<dyn PagedDocument>, LoadError>> {
        let result = self
            .documents
            .get(id)
            .cloned()
            .map(|doc| {
                doc.closed.set(false);
                doc as Rc<dyn PagedDocument>
            })
            .ok_or_else(|| LoadError::NotFound(id.to_string()));
        Box::pin(async move { result })
    }
}
