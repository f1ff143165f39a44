/*!
 * # wabulk - WhatsApp bulk sender
 *
 * A Rust library and CLI for sending one rich-text message to a list of
 * contacts through a WhatsApp messaging backend.
 *
 * ## Features
 *
 * - Session authentication by QR code, tracked by a polling monitor
 * - Resumable session identity
 * - Conversion of editor HTML into WhatsApp inline markup
 *   (`*bold*`, `_italic_`, `~strike~`)
 * - Contact upload and bulk delivery through the backend REST API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `markup`: Rich-text trees and their translation to inline markup:
 *   - `markup::translator`: Tree to markup conversion
 *   - `markup::html`: HTML front-end producing rich-text trees
 * - `session`: Authentication state and the polling monitor
 * - `providers`: Backend contracts and clients:
 *   - `providers::http`: REST backend client
 *   - `providers::mock`: Scripted backend for tests
 * - `identity`: Persisted session identity
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod identity;
pub mod markup;
pub mod providers;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{BackendError, SendError};
pub use markup::{translate, RichTextNode};
pub use session::{SessionHandle, SessionMonitor, SessionState};
