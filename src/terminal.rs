use std::io::Write;

use crate::ui::{Element, Page, View};

/// Renders the page to a terminal.
///
/// State lives in an inner `Page`; every change that a user would see in a
/// browser is echoed as a line of text.
pub struct TerminalView<W: Write + Send> {
    page: Page,
    out: std::sync::Mutex<W>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            page: Page::new(),
            out: std::sync::Mutex::new(out),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(err) = writeln!(out, "{text}") {
            tracing::debug!(error = %err, "terminal write failed");
        }
    }
}

impl<W: Write + Send> View for TerminalView<W> {
    fn has_element(&self, element: Element) -> bool {
        self.page.has_element(element)
    }

    fn set_visible(&self, element: Element, visible: bool) {
        let was_visible = self.page.is_visible(element);
        self.page.set_visible(element, visible);
        if !visible || was_visible {
            return;
        }
        match element {
            Element::Spinner => self.line("⏳ Processing image..."),
            Element::Result => {
                self.line(&format!("✅ {}", self.page.text(Element::Description)));
            }
            Element::Error => {
                self.line(&format!("❌ {}", self.page.text(Element::ErrorMessage)));
            }
            Element::Preview => {
                let size = self
                    .page
                    .source(Element::Preview)
                    .map_or(0, |src| src.len());
                self.line(&format!("🖼  Preview ready ({size} byte data URL)"));
            }
            _ => {}
        }
    }

    fn set_text(&self, element: Element, text: &str) {
        self.page.set_text(element, text);
    }

    fn set_disabled(&self, element: Element, disabled: bool) {
        self.page.set_disabled(element, disabled);
    }

    fn set_source(&self, element: Element, src: &str) {
        self.page.set_source(element, src);
    }
}
