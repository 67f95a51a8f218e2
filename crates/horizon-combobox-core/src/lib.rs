//! Core systems for Horizon Combobox.
//!
//! This crate provides the foundation the combobox widgets are built on:
//!
//! - **Element Tree**: Arena-backed elements with attributes, text and values
//! - **Events**: Keyboard, pointer and focus events with bubbling dispatch
//! - **Signal/Slot System**: Type-safe notifications with RAII connections
//! - **Identifiers**: Branded, process-unique element ids
//! - **Timers**: Host-polled one-shot timers for delayed widget work
//! - **Logging**: Tracing targets, tree dumps and performance spans
//!
//! # Example
//!
//! ```
//! use horizon_combobox_core::{DomEvent, EventKind, SharedDocument};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let doc = SharedDocument::new();
//! let list = doc.create_element("ul");
//! let item = doc.create_child(list, "li", [("role", "option")], "Apple").unwrap();
//!
//! let clicks = Arc::new(AtomicUsize::new(0));
//! let counter = clicks.clone();
//! doc.add_listener(list, EventKind::Click, move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })
//! .unwrap();
//!
//! // Clicks on the item bubble up to the list.
//! doc.dispatch(&mut DomEvent::click(item));
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

pub mod document;
mod error;
pub mod event;
pub mod id;
pub mod logging;
pub mod signal;
pub mod timer;

pub use document::{Document, ElementId, ListenerFn, ScrollBlock, ScrollRequest, SharedDocument};
pub use error::{DocumentError, DocumentResult};
pub use event::{DomEvent, EventKind, EventPayload, Key, KeyboardModifiers, ListenerId};
pub use id::{DEFAULT_ID_PREFIX, branded_id, branded_id_with_prefix};
pub use logging::{DocumentTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerQueue};
