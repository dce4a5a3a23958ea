//! Client for the image2text service: preview a picture, post it to
//! `/process`, and show the returned description or error.

pub mod config;
pub mod controller;
pub mod error;
pub mod preview;
pub mod terminal;
pub mod transport;
pub mod ui;

pub use controller::{Outcome, Phase, UploadController};
pub use error::UploadError;
pub use preview::SelectedFile;
pub use transport::{HttpTransport, RawResponse, RequestPayload, Transport};
pub use ui::{Element, Page, View};
