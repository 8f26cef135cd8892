//! Command implementations.

use crate::cli::{Commands, RegionsCommand};
use crate::error::AppError;
use crate::settings::AppSettings;
use kurbo::Size;
use lectern_core::overlay::TextOverlayContent;
use lectern_core::storage::FileStorage;
use lectern_core::{ContainerRect, RegionSnapshot, RenderedPage, SelectionRejected, Viewer, ViewerEvent};
use lectern_render::{ImageDocumentSource, save_surface};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// A viewer over the configured library and region memory.
pub struct Session {
    viewer: Viewer<FileStorage>,
    settings: AppSettings,
}

impl Session {
    pub async fn open(settings: AppSettings) -> Result<Self, AppError> {
        let storage = match &settings.storage {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        let source = ImageDocumentSource::new(settings.library.clone());
        let mut viewer = Viewer::new(settings.viewer.clone(), Box::new(source), Arc::new(storage));
        viewer.resize(settings.container_size());
        // A broken record was already reported
        viewer.restore_regions().await.ok();
        Ok(Self { viewer, settings })
    }

    pub fn viewer(&self) -> &Viewer<FileStorage> {
        &self.viewer
    }

    /// Run one subcommand, writing its report to `out`.
    pub async fn execute(&mut self, command: Commands, out: &mut dyn Write) -> Result<(), AppError> {
        let result = match command {
            Commands::Render {
                document,
                page,
                zoom_in,
                zoom_out,
                container,
                text,
                out: path,
            } => {
                self.open_page(&document, page, container).await?;
                for _ in 0..zoom_in {
                    self.viewer.zoom_in().await;
                }
                for _ in 0..zoom_out {
                    self.viewer.zoom_out().await;
                }
                self.report_render(text, path.as_deref(), out)
            }
            Commands::Capture {
                document,
                page,
                rect,
                container,
                out: path,
            } => {
                self.open_page(&document, page, container).await?;
                self.capture(rect, path.as_deref(), out).await
            }
            Commands::Documents => self.list_documents(out),
            Commands::Regions { action } => match action {
                RegionsCommand::List { all } => self.list_regions(all, out),
                RegionsCommand::Reuse { id } => {
                    let snapshot = self.reuse(&id)?;
                    write_region(out, &snapshot)?;
                    writeln!(out, "{}", snapshot.image.to_data_url())?;
                    Ok(())
                }
                RegionsCommand::Clear => {
                    self.viewer.clear_regions().await;
                    writeln!(out, "Cleared region memory")?;
                    Ok(())
                }
            },
            Commands::Ask {
                message,
                language,
                reuse,
            } => {
                if let Some(id) = reuse {
                    self.reuse(&id)?;
                }
                let language = language.unwrap_or_else(|| self.settings.response_language.clone());
                let request = self.viewer.compose_chat_request(&message, &language)?;
                writeln!(out, "{}", serde_json::to_string_pretty(&request)?)?;
                Ok(())
            }
        };

        for event in self.viewer.poll_events() {
            log::debug!("{:?}", event);
        }
        result
    }

    async fn open_page(&mut self, document: &str, page: usize, container: Option<Size>) -> Result<(), AppError> {
        if let Some(size) = container {
            self.viewer.resize(size);
        }
        self.viewer.open_document(document).await?;
        if page != self.viewer.current_page() && !self.viewer.go_to_page(page).await {
            return Err(AppError::PageOutOfRange {
                page,
                total: self.viewer.total_pages(),
            });
        }
        Ok(())
    }

    /// The page on screen, if it matches the current page and scale.
    fn current_render(&self) -> Result<&RenderedPage, AppError> {
        let page = self.viewer.current_page();
        self.viewer
            .displayed()
            .filter(|p| p.page == page && (p.scale - self.viewer.scale()).abs() < f64::EPSILON)
            .ok_or(AppError::NotRendered(page))
    }

    fn report_render(&self, text: bool, path: Option<&Path>, out: &mut dyn Write) -> Result<(), AppError> {
        let rendered = self.current_render()?;
        writeln!(
            out,
            "{} page {}/{} at {}% ({}x{})",
            rendered.document_id,
            rendered.page,
            self.viewer.total_pages(),
            (rendered.scale * 100.0).round(),
            rendered.surface.width(),
            rendered.surface.height()
        )?;

        if text {
            match rendered.overlay.content() {
                TextOverlayContent::Spans(spans) => {
                    for span in spans {
                        writeln!(out, "{}", span.text)?;
                    }
                }
                TextOverlayContent::Fallback => writeln!(out, "(no text layer)")?,
            }
        }

        if let Some(path) = path {
            save_surface(&rendered.surface, path)?;
            writeln!(out, "Saved {}", path.display())?;
        }
        Ok(())
    }

    /// Drag out `rect` over the current page.
    async fn capture(&mut self, rect: ContainerRect, path: Option<&Path>, out: &mut dyn Write) -> Result<(), AppError> {
        self.current_render()?;
        let min = self.viewer.viewport().config().min_selection_size;
        if rect.width < min || rect.height < min {
            return Err(SelectionRejected {
                width: rect.width,
                height: rect.height,
                min,
            }
            .into());
        }

        self.viewer.enter_selection_mode();
        self.viewer.pointer_down(rect.origin());
        self.viewer.pointer_move(rect.far_corner());
        let snapshot = match self.viewer.pointer_up(rect.far_corner()).await {
            Some(snapshot) => snapshot,
            None => return Err(self.capture_failure()),
        };
        self.viewer.exit_selection_mode();

        writeln!(out, "{}", snapshot.id)?;
        if let Some(text) = self.viewer.text_under(rect).filter(|t| !t.is_empty()) {
            writeln!(out, "Text: {}", text)?;
        }
        if let Some(path) = path {
            let data = snapshot
                .image
                .data()
                .ok_or_else(|| AppError::CaptureFailed("invalid image payload".to_string()))?;
            std::fs::write(path, data).map_err(|e| AppError::Write(path.to_path_buf(), e))?;
            writeln!(out, "Saved {}", path.display())?;
        }
        Ok(())
    }

    fn capture_failure(&mut self) -> AppError {
        let message = self
            .viewer
            .poll_events()
            .into_iter()
            .find_map(|event| match event {
                ViewerEvent::CaptureFailed { message } => Some(message),
                _ => None,
            })
            .unwrap_or_else(|| "selection was cancelled".to_string());
        AppError::CaptureFailed(message)
    }

    fn reuse(&mut self, id: &str) -> Result<RegionSnapshot, AppError> {
        self.viewer
            .reuse_region(id)
            .ok_or_else(|| AppError::UnknownRegion(id.to_string()))
    }

    fn list_documents(&self, out: &mut dyn Write) -> Result<(), AppError> {
        let library = &self.settings.library;
        let ids = ImageDocumentSource::new(library.clone())
            .list_documents()
            .map_err(|e| AppError::Library(library.clone(), e))?;
        if ids.is_empty() {
            writeln!(out, "No documents in {}", library.display())?;
        }
        for id in ids {
            writeln!(out, "{}", id)?;
        }
        Ok(())
    }

    fn list_regions(&self, all: bool, out: &mut dyn Write) -> Result<(), AppError> {
        let memory = self.viewer.memory();
        if memory.is_empty() {
            writeln!(out, "No remembered regions")?;
            return Ok(());
        }

        if all {
            for snapshot in memory.entries() {
                write_region(out, snapshot)?;
            }
        } else {
            let listed = memory.list();
            for snapshot in listed.recent {
                write_region(out, snapshot)?;
            }
            if listed.remaining > 0 {
                writeln!(out, "... and {} more", listed.remaining)?;
            }
        }
        Ok(())
    }
}

fn write_region(out: &mut dyn Write, snapshot: &RegionSnapshot) -> std::io::Result<()> {
    let rect = snapshot.rect;
    writeln!(
        out,
        "{}  {} p.{}  {}x{}  [{:.1}, {:.1}, {:.1}, {:.1}]",
        snapshot.id,
        snapshot.document_id,
        snapshot.page_number,
        snapshot.image.width,
        snapshot.image.height,
        rect.left,
        rect.top,
        rect.width,
        rect.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        settings: AppSettings,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("library").join("report");
        std::fs::create_dir_all(&doc).unwrap();
        for (name, color) in [("p1.png", [255, 0, 0, 255]), ("p2.png", [0, 255, 0, 255])] {
            image::RgbaImage::from_pixel(400, 300, image::Rgba(color))
                .save(doc.join(name))
                .unwrap();
        }
        std::fs::write(
            doc.join("p1.text.json"),
            r#"[{"text":"Revenue","rect":{"left":10,"top":10,"width":80,"height":12}}]"#,
        )
        .unwrap();

        let settings = AppSettings {
            library: dir.path().join("library"),
            storage: Some(dir.path().join("state")),
            ..AppSettings::default()
        };
        Fixture { _dir: dir, settings }
    }

    fn run(settings: &AppSettings, command: Commands) -> Result<String, AppError> {
        let mut session = block_on(Session::open(settings.clone()))?;
        let mut out = Vec::new();
        block_on(session.execute(command, &mut out))?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn capture(settings: &AppSettings, page: usize) -> String {
        run(
            settings,
            Commands::Capture {
                document: "report".to_string(),
                page,
                rect: ContainerRect::new(10.0, 10.0, 110.0, 70.0),
                container: None,
                out: None,
            },
        )
        .unwrap()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
    }

    #[test]
    fn test_render_with_text_and_export() {
        let fixture = fixture();
        let path: PathBuf = fixture.settings.library.join("out.png");
        let output = run(
            &fixture.settings,
            Commands::Render {
                document: "report".to_string(),
                page: 1,
                zoom_in: 1,
                zoom_out: 0,
                container: None,
                text: true,
                out: Some(path.clone()),
            },
        )
        .unwrap();

        assert!(output.starts_with("report page 1/2 at 216% (864x648)"));
        assert!(output.contains("Revenue"));
        assert_eq!(image::image_dimensions(&path).unwrap(), (864, 648));
    }

    #[test]
    fn test_render_page_out_of_range() {
        let fixture = fixture();
        let result = run(
            &fixture.settings,
            Commands::Render {
                document: "report".to_string(),
                page: 9,
                zoom_in: 0,
                zoom_out: 0,
                container: None,
                text: false,
                out: None,
            },
        );
        assert!(matches!(result, Err(AppError::PageOutOfRange { page: 9, total: 2 })));
    }

    #[test]
    fn test_missing_document() {
        let fixture = fixture();
        let result = run(
            &fixture.settings,
            Commands::Render {
                document: "nope".to_string(),
                page: 1,
                zoom_in: 0,
                zoom_out: 0,
                container: None,
                text: false,
                out: None,
            },
        );
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_capture_list_ask_clear() {
        let fixture = fixture();
        let settings = &fixture.settings;

        let first = capture(settings, 1);
        let second = capture(settings, 2);
        assert!(first.starts_with("region_"));
        assert_ne!(first, second);

        let listed = run(settings, Commands::Regions { action: RegionsCommand::List { all: false } }).unwrap();
        let lines: Vec<&str> = listed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&second));
        assert!(lines[0].contains("report p.2  110x70"));

        let request = run(
            settings,
            Commands::Ask {
                message: "What is shown here?".to_string(),
                language: Some("French".to_string()),
                reuse: Some(first.clone()),
            },
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert!(json["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert!(json["message"].as_str().unwrap().ends_with("[Please respond in French]"));

        let cleared = run(settings, Commands::Regions { action: RegionsCommand::Clear }).unwrap();
        assert_eq!(cleared.trim(), "Cleared region memory");
        let listed = run(settings, Commands::Regions { action: RegionsCommand::List { all: true } }).unwrap();
        assert_eq!(listed.trim(), "No remembered regions");
    }

    #[test]
    fn test_list_shows_remainder() {
        let fixture = fixture();
        for _ in 0..5 {
            capture(&fixture.settings, 1);
        }
        let listed = run(
            &fixture.settings,
            Commands::Regions { action: RegionsCommand::List { all: false } },
        )
        .unwrap();
        assert_eq!(listed.lines().count(), 4);
        assert!(listed.ends_with("... and 2 more\n"));
    }

    #[test]
    fn test_capture_prints_selected_text() {
        let fixture = fixture();
        let output = run(
            &fixture.settings,
            Commands::Capture {
                document: "report".to_string(),
                page: 1,
                rect: ContainerRect::new(10.0, 10.0, 110.0, 70.0),
                container: None,
                out: None,
            },
        )
        .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("region_"));
        assert_eq!(lines[1], "Text: Revenue");

        // Page 2 has no text layer
        let output = run(
            &fixture.settings,
            Commands::Capture {
                document: "report".to_string(),
                page: 2,
                rect: ContainerRect::new(10.0, 10.0, 110.0, 70.0),
                container: None,
                out: None,
            },
        )
        .unwrap();
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_documents_listed() {
        let fixture = fixture();
        std::fs::create_dir_all(fixture.settings.library.join("annual")).unwrap();
        let output = run(&fixture.settings, Commands::Documents).unwrap();
        assert_eq!(output, "annual\nreport\n");
    }

    #[test]
    fn test_documents_missing_library() {
        let fixture = fixture();
        let settings = AppSettings {
            library: fixture.settings.library.join("absent"),
            ..fixture.settings.clone()
        };
        assert!(matches!(run(&settings, Commands::Documents), Err(AppError::Library(..))));
    }

    #[test]
    fn test_small_capture_rejected() {
        let fixture = fixture();
        let result = run(
            &fixture.settings,
            Commands::Capture {
                document: "report".to_string(),
                page: 1,
                rect: ContainerRect::new(10.0, 10.0, 5.0, 2.0),
                container: None,
                out: None,
            },
        );
        assert!(matches!(result, Err(AppError::Selection(_))));
    }

    #[test]
    fn test_unknown_region() {
        let fixture = fixture();
        let result = run(
            &fixture.settings,
            Commands::Regions { action: RegionsCommand::Reuse { id: "region_x".to_string() } },
        );
        assert!(matches!(result, Err(AppError::UnknownRegion(_))));
    }

    #[test]
    fn test_ask_without_attachment() {
        let fixture = fixture();
        let request = run(
            &fixture.settings,
            Commands::Ask {
                message: "  Summarize  ".to_string(),
                language: None,
                reuse: None,
            },
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(json["message"], "Summarize");
        assert_eq!(json["response_language"], "English");
        assert!(json.get("image").is_none());
    }
}
