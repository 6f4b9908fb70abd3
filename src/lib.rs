//! # siteforge
//!
//! A static-asset build pipeline for small hand-written websites. A project
//! has a working tree (`app/`) that you edit and a distribution tree
//! (`dist/`) that gets deployed.
//!
//! # Architecture: Tasks, Compositions, Develop Session
//!
//! Work is split into named [`tasks`], each a synchronous function that
//! reads sources from the working tree and writes derived files back into
//! it. Tasks never share in-memory state; the working tree is the only
//! channel between them.
//!
//! ```text
//! styles   scss/main.scss        ->  css/style.min.css
//! scripts  js/main.js            ->  js/main.min.js
//! images   images/src/*          ->  images/*.webp, optimized copies
//! fonts    fonts/src/*.ttf       ->  fonts/*.woff2
//! sprite   images/*.svg          ->  images/sprite.svg
//! pages    pages/*.html          ->  *.html (components inlined)
//! clean                          ->  dist/ removed
//! package  allow-listed files    ->  dist/
//! ```
//!
//! Tasks are combined with [`compose::Composition`]: parallel, series and
//! tolerant nodes over task leaves. Two compositions matter:
//!
//! - **develop**: the four working-tree tasks plus a dev server that serves
//!   the working tree, watches it, re-runs tasks on change and pushes
//!   live-reload events to browsers over server-sent events.
//! - **build**: clean, then package.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `siteforge.toml` loading, stock defaults, merging, validation |
//! | [`source_set`] | Ordered include/exclude glob patterns resolved against a root |
//! | [`freshness`] | Skip outputs that are newer than their source |
//! | [`artifact`] | Writing derived files and the per-task report |
//! | [`tasks`] | The eight named tasks |
//! | [`include`] | File-include directives for the pages task |
//! | [`imaging`] | Image encoding backends for the images task |
//! | [`woff2`] | TrueType to WOFF2 conversion for the fonts task |
//! | [`compose`] | Compositions and the async runner |
//! | [`reload`] | Broadcast bus for live-reload events |
//! | [`serve`] | Dev HTTP server with live-reload injection |
//! | [`watch`] | Filesystem watching and change dispatch |
//! | [`output`] | CLI output formatting for task reports |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Toolchain
//!
//! Sass compiles with `grass`, prefixing and minification go through
//! `lightningcss`, images encode with the `image` crate and fonts compress
//! with `brotli`. No Node, no libvips, no system packages: the binary is
//! self-contained.
//!
//! ## Freshness by Modification Time
//!
//! The images task compares each output's modification time with its
//! source and only re-encodes stale outputs. Other tasks are cheap enough
//! to always rewrite.

pub mod artifact;
pub mod compose;
pub mod config;
pub mod freshness;
pub mod imaging;
pub mod include;
pub mod output;
pub mod reload;
pub mod serve;
pub mod source_set;
pub mod tasks;
pub mod watch;
pub mod woff2;
