//! The page contract the upload controller drives.
//!
//! Every element the controller touches has a fixed id. A `View` is anything
//! that can show/hide, label, disable or point an element at a source; `Page`
//! is the in-memory document used by tests and the terminal front-end.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    Form,
    ImageInput,
    SubmitButton,
    Spinner,
    Result,
    Description,
    Error,
    ErrorMessage,
    Preview,
}

impl Element {
    pub const ALL: [Element; 9] = [
        Element::Form,
        Element::ImageInput,
        Element::SubmitButton,
        Element::Spinner,
        Element::Result,
        Element::Description,
        Element::Error,
        Element::ErrorMessage,
        Element::Preview,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Element::Form => "upload-form",
            Element::ImageInput => "imageInput",
            Element::SubmitButton => "submit-button",
            Element::Spinner => "spinner",
            Element::Result => "result",
            Element::Description => "description",
            Element::Error => "error",
            Element::ErrorMessage => "error-message",
            Element::Preview => "preview",
        }
    }
}

/// Mutations the controller performs on the page.
///
/// Methods take `&self`: a view behaves like a document handle, shared
/// between the preview and submit handlers.
pub trait View: Send + Sync {
    fn has_element(&self, element: Element) -> bool;
    fn set_visible(&self, element: Element, visible: bool);
    fn set_text(&self, element: Element, text: &str);
    fn set_disabled(&self, element: Element, disabled: bool);
    fn set_source(&self, element: Element, src: &str);
}

impl<V: View + ?Sized> View for std::sync::Arc<V> {
    fn has_element(&self, element: Element) -> bool {
        (**self).has_element(element)
    }
    fn set_visible(&self, element: Element, visible: bool) {
        (**self).set_visible(element, visible);
    }
    fn set_text(&self, element: Element, text: &str) {
        (**self).set_text(element, text);
    }
    fn set_disabled(&self, element: Element, disabled: bool) {
        (**self).set_disabled(element, disabled);
    }
    fn set_source(&self, element: Element, src: &str) {
        (**self).set_source(element, src);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementState {
    pub visible: bool,
    pub text: String,
    pub disabled: bool,
    pub source: Option<String>,
}

/// One recorded mutation, in the order it was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Visible(Element, bool),
    Text(Element, String),
    Disabled(Element, bool),
    Source(Element, String),
}

#[derive(Default)]
struct PageInner {
    elements: HashMap<Element, ElementState>,
    log: Vec<Change>,
}

/// In-memory document holding the contract elements.
///
/// Initial state mirrors the markup: form, input and button visible,
/// everything else hidden until the controller shows it.
pub struct Page {
    inner: Mutex<PageInner>,
}

impl Page {
    pub fn new() -> Self {
        Self::without(&[])
    }

    /// A page whose markup lacks the given elements.
    pub fn without(missing: &[Element]) -> Self {
        let elements = Element::ALL
            .into_iter()
            .filter(|element| !missing.contains(element))
            .map(|element| {
                let visible = matches!(
                    element,
                    Element::Form | Element::ImageInput | Element::SubmitButton
                );
                (
                    element,
                    ElementState {
                        visible,
                        ..ElementState::default()
                    },
                )
            })
            .collect();
        Self {
            inner: Mutex::new(PageInner {
                elements,
                log: Vec::new(),
            }),
        }
    }

    pub fn element(&self, element: Element) -> Option<ElementState> {
        self.lock().elements.get(&element).cloned()
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.element(element).is_some_and(|state| state.visible)
    }

    pub fn is_disabled(&self, element: Element) -> bool {
        self.element(element).is_some_and(|state| state.disabled)
    }

    pub fn text(&self, element: Element) -> String {
        self.element(element).map(|state| state.text).unwrap_or_default()
    }

    pub fn source(&self, element: Element) -> Option<String> {
        self.element(element).and_then(|state| state.source)
    }

    /// Every change applied so far, oldest first.
    pub fn changes(&self) -> Vec<Change> {
        self.lock().log.clone()
    }

    /// Forget recorded changes; element state is kept.
    pub fn clear_changes(&self) {
        self.lock().log.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageInner> {
        // A panicking test thread must not hide the page from later asserts.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(&self, element: Element, change: Change, update: impl FnOnce(&mut ElementState)) {
        let mut inner = self.lock();
        if let Some(state) = inner.elements.get_mut(&element) {
            update(state);
            inner.log.push(change);
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl View for Page {
    fn has_element(&self, element: Element) -> bool {
        self.lock().elements.contains_key(&element)
    }

    fn set_visible(&self, element: Element, visible: bool) {
        self.apply(element, Change::Visible(element, visible), |state| {
            state.visible = visible;
        });
    }

    fn set_text(&self, element: Element, text: &str) {
        self.apply(element, Change::Text(element, text.to_string()), |state| {
            state.text = text.to_string();
        });
    }

    fn set_disabled(&self, element: Element, disabled: bool) {
        self.apply(element, Change::Disabled(element, disabled), |state| {
            state.disabled = disabled;
        });
    }

    fn set_source(&self, element: Element, src: &str) {
        self.apply(element, Change::Source(element, src.to_string()), |state| {
            state.source = Some(src.to_string());
        });
    }
}
