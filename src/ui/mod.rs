//! Chart rendering using ratatui.
//!
//! The same [`chart::ChartPanel`] is drawn into the interactive terminal and
//! into off-screen buffers for the saved text artifacts.
//!
//! ## Submodules
//!
//! - [`chart`]: Plot state for one chart and its rendering
//! - [`page`]: Vertical stack of a page's charts in the TUI
//! - [`detail`]: Modal overlay with per-series diagnostics
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`headless`]: Off-screen rendering into text files
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Charts of the current page           │
//! │ (page::render)                       │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod detail;
pub mod headless;
pub mod page;
pub mod theme;

pub use theme::Theme;
