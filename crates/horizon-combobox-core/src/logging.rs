//! Logging and debugging facilities for Horizon Combobox.
//!
//! This module provides:
//! - Target names for filtering `tracing` output per subsystem
//! - Debug visualization for element trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Combobox uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_combobox=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`DocumentTreeDebug`] to print an element subtree with its attributes:
//!
//! ```ignore
//! use horizon_combobox_core::logging::DocumentTreeDebug;
//!
//! let output = doc.with_read(|d| DocumentTreeDebug::new().format_subtree(d, list))?;
//! println!("{output}");
//! ```

use std::fmt::Write as FmtWrite;

use crate::document::{Document, ElementId};
use crate::error::DocumentResult;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Element tree and event dispatch.
    pub const DOCUMENT: &str = "horizon_combobox_core::document";
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_combobox_core::signal";
    /// Host-polled timers.
    pub const TIMER: &str = "horizon_combobox_core::timer";
    /// Combobox interaction engine.
    pub const COMBOBOX: &str = "horizon_combobox::combobox";
    /// Autocomplete widget and its selection variants.
    pub const AUTOCOMPLETE: &str = "horizon_combobox::autocomplete";
    /// Performance spans.
    pub const PERF: &str = "horizon_combobox::perf";
}

/// Style options for element tree visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for element tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show element IDs.
    pub show_ids: bool,
    /// Whether to show attributes.
    pub show_attributes: bool,
    /// Whether to show the text owned by each element.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_attributes: true,
            show_text: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Tags only.
    pub fn minimal() -> Self {
        Self {
            show_attributes: false,
            show_text: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing element trees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a subtree starting from `root`.
    pub fn format_subtree(&self, doc: &Document, root: ElementId) -> DocumentResult<String> {
        let mut output = String::new();
        self.format_into(doc, root, "", true, 0, &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        doc: &Document,
        id: ElementId,
        prefix: &str,
        is_last: bool,
        depth: usize,
        output: &mut String,
    ) -> DocumentResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let (tee, corner, pipe) = match self.options.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        output.push_str(prefix);
        if depth > 0 {
            output.push_str(if is_last { corner } else { tee });
        }

        let _ = write!(output, "<{}", doc.tag_name(id)?);
        if self.options.show_attributes {
            for (name, value) in doc.attributes(id)? {
                if value.is_empty() {
                    let _ = write!(output, " {name}");
                } else {
                    let _ = write!(output, " {name}=\"{value}\"");
                }
            }
        }
        output.push('>');
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_text {
            let text = doc.text_content(id)?;
            if doc.children(id)?.is_empty() && !text.is_empty() {
                let _ = write!(output, " {text:?}");
            }
        }
        output.push('\n');

        let child_prefix = if depth == 0 {
            String::new()
        } else if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}{pipe}")
        };
        let children = doc.children(id)?;
        for (i, &child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            self.format_into(doc, child, &child_prefix, last, depth + 1, output)?;
        }
        Ok(())
    }
}

/// A guard that keeps a tracing span open until dropped.
///
/// Used to measure the duration of option fetches and list rebuilds.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_combobox::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
