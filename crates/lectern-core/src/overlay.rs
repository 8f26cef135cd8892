//! Declarative overlay descriptors.
//!
//! The engine never touches a rendering toolkit. It describes what should be
//! drawn over the page and the presentation layer materializes it.

use crate::coords::{CanvasRect, ContainerRect, page_rect_to_canvas};
use crate::document::TextItem;
use serde::{Deserialize, Serialize};

/// What an overlay rectangle is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayStyle {
    /// Rubber-band box shown while dragging out a region.
    SelectionBox,
}

/// A rectangle to draw over the viewport, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayDescriptor {
    pub rect: ContainerRect,
    pub style: OverlayStyle,
}

impl OverlayDescriptor {
    pub fn selection_box(rect: ContainerRect) -> Self {
        Self {
            rect,
            style: OverlayStyle::SelectionBox,
        }
    }
}

/// A transparent, selectable text run over the raster.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub rect: CanvasRect,
}

/// Contents of the text overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOverlayContent {
    /// Text runs positioned over their glyphs.
    Spans(Vec<TextSpan>),
    /// One invisible selectable block covering the page, used when text
    /// extraction failed.
    Fallback,
}

/// Selectable text layer, sized identically to the raster it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    width: u32,
    height: u32,
    scale: f64,
    content: TextOverlayContent,
}

impl TextOverlay {
    /// Placeholder text carried by the fallback block.
    pub const FALLBACK_TEXT: &'static str = "Text selection enabled";

    /// Position page-space text items over a raster rendered at `scale`.
    pub fn from_items(items: Vec<TextItem>, scale: f64, width: u32, height: u32) -> Self {
        let spans = items
            .into_iter()
            .filter(|item| !item.text.trim().is_empty())
            .filter_map(|item| {
                page_rect_to_canvas(item.rect, scale)
                    .ok()
                    .map(|rect| TextSpan {
                        text: item.text,
                        rect,
                    })
            })
            .collect();
        Self {
            width,
            height,
            scale,
            content: TextOverlayContent::Spans(spans),
        }
    }

    pub fn fallback(scale: f64, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale,
            content: TextOverlayContent::Fallback,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn content(&self) -> &TextOverlayContent {
        &self.content
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.content, TextOverlayContent::Fallback)
    }

    /// Text covered by a canvas-space rectangle, in overlay order.
    pub fn text_in(&self, rect: CanvasRect) -> String {
        let TextOverlayContent::Spans(spans) = &self.content else {
            return String::new();
        };
        let area = rect.to_kurbo();
        spans
            .iter()
            .filter(|span| !area.intersect(span.rect.to_kurbo()).is_zero_area())
            .map(|span| span.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PageRect;

    fn item(text: &str, left: f64, top: f64) -> TextItem {
        TextItem {
            text: text.to_string(),
            rect: PageRect::new(left, top, 50.0, 10.0),
        }
    }

    #[test]
    fn test_spans_scaled_to_canvas() {
        let overlay = TextOverlay::from_items(vec![item("Hello", 10.0, 20.0)], 2.0, 800, 600);
        let TextOverlayContent::Spans(spans) = overlay.content() else {
            panic!("expected spans");
        };
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].rect, CanvasRect::new(20.0, 40.0, 100.0, 20.0));
    }

    #[test]
    fn test_blank_items_dropped() {
        let overlay = TextOverlay::from_items(vec![item("  ", 0.0, 0.0), item("x", 0.0, 0.0)], 1.0, 10, 10);
        let TextOverlayContent::Spans(spans) = overlay.content() else {
            panic!("expected spans");
        };
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_text_in_rect() {
        let overlay = TextOverlay::from_items(
            vec![item("alpha", 0.0, 0.0), item("beta", 0.0, 100.0), item("gamma", 0.0, 15.0)],
            1.0,
            200,
            200,
        );
        assert_eq!(overlay.text_in(CanvasRect::new(0.0, 0.0, 60.0, 30.0)), "alpha gamma");
        assert_eq!(TextOverlay::fallback(1.0, 10, 10).text_in(CanvasRect::new(0.0, 0.0, 5.0, 5.0)), "");
    }
}
