//! Report extras
//!
//! Turns the evidence a test collects (comments, screenshots, documents,
//! videos, links) into HTML fragments for a test report:
//! - Resolves loose mime hints into a closed set of content kinds
//! - Normalizes raw content into canonical attachments (pretty JSON, XML and
//!   YAML, CSV tables, URI lists, decoded media)
//! - Stores linked assets under the report folder
//! - Renders step rows and the test header
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ReportSession (config + PersistenceGateway + ReportBackend)│
//! │    └── test_report() -> TestReport                          │
//! │          ├── attach / attach_file / video                   │
//! │          ├── screenshot / final_screenshot                  │
//! │          ├── link / issue / tms / add_to_downloads          │
//! │          └── render(TestHeader) -> HTML                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Normalizer                                                 │
//! │    ├── mime::resolve(hint) -> MimeType                      │
//! │    ├── handler_for(Mime) -> json | xml | yaml | csv | ...   │
//! │    └── fallback -> text attachment naming the error         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  decorators (pure markup)      FileStore (assets on disk)   │
//! │    ├── render_step_row           ├── images/  videos/       │
//! │    ├── render_attachment         ├── audio/   sources/      │
//! │    └── render_image / _video     └── downloads/             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod attachment;
pub mod backend;
pub mod config;
pub mod decorators;
pub mod error;
pub mod extras;
pub mod formats;
pub mod header;
pub mod link;
pub mod mime;
pub mod normalize;
pub mod persistence;
pub mod steps;

pub use attachment::{Attachment, Body, Content};
pub use backend::ReportBackend;
pub use config::{ExtrasConfig, ScreenshotStrategy};
pub use error::{ExtrasError, ExtrasResult};
pub use extras::{ReportSession, ScreenshotOptions, TestReport};
pub use header::{ExceptionInfo, Status, TestHeader};
pub use link::{Link, LinkKind, LinkPatterns, LinksColumn};
pub use mime::{Mime, MimeType};
pub use normalize::{normalize, NormalizeOptions, Normalizer};
pub use persistence::{Category, FileStore, Payload, PersistenceGateway};
pub use steps::{Step, StepLog};
