//! Documents stored as one image file per page.
//!
//! A document `<id>` lives in `<root>/<id>/`. Its png, jpeg and webp files,
//! sorted by file name, are the pages. A page's optional text layer is a JSON
//! array of text items in `<page stem>.text.json` next to the image.

use image::imageops::{self, FilterType};
use kurbo::Size;
use lectern_core::storage::BoxFuture;
use lectern_core::{
    DocumentSource, LoadError, PagedDocument, RasterSurface, RenderError, TextItem,
    TextLayerError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File name suffix of a page's text layer, after the page's file stem.
pub const TEXT_SIDECAR_SUFFIX: &str = ".text.json";

/// Opens image-backed documents from a library directory.
#[derive(Debug, Clone)]
pub struct ImageDocumentSource {
    root: PathBuf,
}

impl ImageDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifiers of the documents in the library, sorted.
    pub fn list_documents(&self) -> std::io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl DocumentSource for ImageDocumentSource {
    fn open(&self, id: &str) -> BoxFuture<'_, Result<Rc<dyn PagedDocument>, LoadError>> {
        let result = ImageDocument::open(&self.root, id).map(|doc| Rc::new(doc) as Rc<dyn PagedDocument>);
        Box::pin(async move { result })
    }
}

/// One page image and its native size.
#[derive(Debug, Clone)]
struct PageFile {
    path: PathBuf,
    size: Size,
}

/// An opened image-backed document.
pub struct ImageDocument {
    id: String,
    pages: Vec<PageFile>,
    /// Decoded page images, keyed by page number.
    image_cache: RefCell<HashMap<usize, Rc<image::RgbaImage>>>,
}

impl ImageDocument {
    /// Scan `<root>/<id>/` for page images. Only image headers are read.
    pub fn open(root: &Path, id: &str) -> Result<Self, LoadError> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(LoadError::NotFound(id.to_string()));
        }
        let dir = root.join(id);
        if !dir.is_dir() {
            return Err(LoadError::NotFound(id.to_string()));
        }

        let fetch_error = |e: std::io::Error| LoadError::Fetch {
            id: id.to_string(),
            reason: e.to_string(),
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(fetch_error)? {
            let path = entry.map_err(fetch_error)?.path();
            if path.is_file() && is_page_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let pages = paths
            .into_iter()
            .map(|path| {
                let (width, height) =
                    image::image_dimensions(&path).map_err(|e| LoadError::Decode {
                        id: id.to_string(),
                        reason: format!("{}: {}", path.display(), e),
                    })?;
                Ok(PageFile {
                    path,
                    size: Size::new(width as f64, height as f64),
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        if pages.is_empty() {
            return Err(LoadError::Empty(id.to_string()));
        }
        log::debug!("Opened {} with {} page image(s)", id, pages.len());

        Ok(Self {
            id: id.to_string(),
            pages,
            image_cache: RefCell::new(HashMap::new()),
        })
    }

    fn page_file(&self, page: usize) -> Result<&PageFile, RenderError> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or(RenderError::PageOutOfRange {
                page,
                total: self.pages.len(),
            })
    }

    fn decoded(&self, page: usize) -> Result<Rc<image::RgbaImage>, RenderError> {
        if let Some(cached) = self.image_cache.borrow().get(&page) {
            return Ok(cached.clone());
        }
        let file = self.page_file(page)?;
        let data = std::fs::read(&file.path)
            .map_err(|e| RenderError::Raster(format!("{}: {}", file.path.display(), e)))?;
        let decoded = image::load_from_memory(&data)
            .map_err(|e| RenderError::Raster(format!("{}: {}", file.path.display(), e)))?
            .to_rgba8();
        let decoded = Rc::new(decoded);
        self.image_cache.borrow_mut().insert(page, decoded.clone());
        Ok(decoded)
    }

    fn render_page(&self, page: usize, width: u32, height: u32) -> Result<RasterSurface, RenderError> {
        let source = self.decoded(page)?;
        let resized = if source.dimensions() == (width, height) {
            source.as_ref().clone()
        } else {
            imageops::resize(source.as_ref(), width, height, FilterType::Triangle)
        };
        RasterSurface::from_rgba(width, height, resized.into_raw())
            .ok_or_else(|| RenderError::Raster(format!("resampled page {} has the wrong size", page)))
    }

    fn read_text(&self, page: usize) -> Result<Vec<TextItem>, TextLayerError> {
        let file = self
            .page_file(page)
            .map_err(|e| TextLayerError::Unavailable(e.to_string()))?;
        let path = sidecar_path(&file.path);
        let json = std::fs::read_to_string(&path)
            .map_err(|e| TextLayerError::Unavailable(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| TextLayerError::Malformed(format!("{}: {}", path.display(), e)))
    }
}

impl PagedDocument for ImageDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Option<Size> {
        self.page_file(page).ok().map(|file| file.size)
    }

    fn rasterize(
        &self,
        page: usize,
        _scale: f64,
        width: u32,
        height: u32,
    ) -> BoxFuture<'_, Result<RasterSurface, RenderError>> {
        let result = self.render_page(page, width, height);
        Box::pin(async move { result })
    }

    fn text_content(&self, page: usize) -> BoxFuture<'_, Result<Vec<TextItem>, TextLayerError>> {
        let result = self.read_text(page);
        Box::pin(async move { result })
    }

    fn close(&self) {
        self.image_cache.borrow_mut().clear();
        log::debug!("Closed {}", self.id);
    }
}

fn is_page_image(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(TEXT_SIDECAR_SUFFIX) {
        return false;
    }
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp"))
}

fn sidecar_path(page_path: &Path) -> PathBuf {
    let stem = page_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    page_path.with_file_name(format!("{}{}", stem, TEXT_SIDECAR_SUFFIX))
}
