/*!
 * Messaging session authentication.
 *
 * This module provides:
 * - Session state and backend status models
 * - The polling monitor that drives a session to the authenticated state
 */

pub mod models;
pub mod monitor;

// Re-export main types
pub use models::{MonitorEvent, SessionState, StatusResponse};
pub use monitor::{SessionHandle, SessionMonitor, DEFAULT_POLL_INTERVAL};
