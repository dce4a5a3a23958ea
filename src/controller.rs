//! Upload controller: preview on selection, upload on submit.
//!
//! The controller owns no UI itself. It is bound once to a `View` exposing
//! every element of the page contract and a `Transport` that reaches
//! `/process`, then reacts to the two user events.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::error::UploadError;
use crate::preview::{DataUrlDecoder, PreviewDecoder, SelectedFile};
use crate::transport::{RequestPayload, Transport};
use crate::ui::{Element, View};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    InFlight,
    Success,
    Failure,
}

/// How a submit attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No file was selected; nothing was sent.
    Blocked,
    Described(String),
    Failed(String),
}

pub struct UploadController<V, T> {
    view: V,
    transport: T,
    decoder: Box<dyn PreviewDecoder>,
    selection: Mutex<Option<SelectedFile>>,
    // Bumped on every selection; a preview only lands if still current.
    generation: AtomicU64,
    phase: Mutex<Phase>,
    // Submissions past validation and not yet cleaned up.
    in_flight: AtomicUsize,
}

impl<V: View, T: Transport> UploadController<V, T> {
    /// Bind to a page. Fails if the page lacks any contract element.
    pub fn bind(view: V, transport: T) -> Result<Self, UploadError> {
        if let Some(missing) = Element::ALL
            .into_iter()
            .find(|element| !view.has_element(*element))
        {
            return Err(UploadError::MissingElement(missing.id()));
        }

        Ok(Self {
            view,
            transport,
            decoder: Box::new(DataUrlDecoder),
            selection: Mutex::new(None),
            generation: AtomicU64::new(0),
            phase: Mutex::new(Phase::Idle),
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Replace how selected files become preview sources.
    pub fn with_decoder(mut self, decoder: impl PreviewDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        lock(&self.selection).clone()
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    /// React to the image input changing.
    pub async fn handle_file_selected(&self, file: Option<SelectedFile>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.selection) = file.clone();

        let Some(file) = file else {
            self.view.set_visible(Element::Preview, false);
            return;
        };

        self.view.set_visible(Element::Result, false);
        self.view.set_visible(Element::Error, false);

        match self.decoder.decode(&file).await {
            Ok(src) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!(file = file.name(), "stale preview discarded");
                    return;
                }
                self.view.set_source(Element::Preview, &src);
                self.view.set_visible(Element::Preview, true);
                tracing::debug!(file = file.name(), "preview ready");
            }
            Err(err) => {
                tracing::debug!(file = file.name(), error = %err, "preview failed");
            }
        }
    }

    /// React to the form being submitted.
    ///
    /// Overlapping submissions are not prevented. `phase()` stays `InFlight`
    /// until the last of them has finished.
    pub async fn handle_submit(&self) -> Outcome {
        self.settle_phase(Phase::Validating, 0);

        let Some(file) = self.selected_file() else {
            let message = UploadError::NoFileSelected.user_message();
            self.view.set_text(Element::ErrorMessage, &message);
            self.view.set_visible(Element::Error, true);
            self.view.set_visible(Element::Result, false);
            self.settle_phase(Phase::Idle, 0);
            tracing::warn!("submit blocked: no file selected");
            return Outcome::Blocked;
        };

        let in_flight = InFlight::enter(&self.view, &self.phase, &self.in_flight);
        let started = Instant::now();

        let outcome = match self.upload(&file).await {
            Ok(description) => {
                self.view.set_text(Element::Description, &description);
                self.view.set_visible(Element::Result, true);
                self.settle_phase(Phase::Success, 1);
                tracing::info!(
                    file = file.name(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "description received"
                );
                Outcome::Described(description)
            }
            Err(err) => {
                let message = err.user_message();
                self.view.set_text(Element::ErrorMessage, &message);
                self.view.set_visible(Element::Error, true);
                self.settle_phase(Phase::Failure, 1);
                tracing::error!(
                    file = file.name(),
                    status = err.status(),
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %err,
                    "processing failed"
                );
                Outcome::Failed(message)
            }
        };

        drop(in_flight);
        outcome
    }

    async fn upload(&self, file: &SelectedFile) -> Result<String, UploadError> {
        let payload = RequestPayload::from_file(file).await?;
        let response = self.transport.submit(payload).await?;
        response.into_description()
    }

    /// Move to `phase` only when exactly `running` submissions are in
    /// flight, so a finishing request never masks one still pending.
    fn settle_phase(&self, phase: Phase, running: usize) {
        let mut current = lock(&self.phase);
        if self.in_flight.load(Ordering::SeqCst) == running {
            *current = phase;
            tracing::trace!(?phase, "phase");
        }
    }
}

/// Spinner on and button off for as long as it lives.
///
/// Dropping it, on any path including a cancelled submit future, hides the
/// spinner and re-enables the button exactly once.
struct InFlight<'a, V: View> {
    view: &'a V,
    phase: &'a Mutex<Phase>,
    count: &'a AtomicUsize,
}

impl<'a, V: View> InFlight<'a, V> {
    fn enter(view: &'a V, phase: &'a Mutex<Phase>, count: &'a AtomicUsize) -> Self {
        view.set_visible(Element::Spinner, true);
        view.set_disabled(Element::SubmitButton, true);
        view.set_visible(Element::Result, false);
        view.set_visible(Element::Error, false);
        let mut current = lock(phase);
        count.fetch_add(1, Ordering::SeqCst);
        *current = Phase::InFlight;
        drop(current);
        Self { view, phase, count }
    }
}

impl<V: View> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.view.set_visible(Element::Spinner, false);
        self.view.set_disabled(Element::SubmitButton, false);
        let mut current = lock(self.phase);
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            *current = Phase::Idle;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
