//! Custom-scheme content resolution for packaged desktop shells.
//!
//! The shell registers a private URI scheme (for example `app://`) and routes
//! every request for it through [`SchemeResolver`]. Resolution is total: any
//! string maps to a renderable document, either the requested asset or the
//! application's default entry.
//!
//! # Example
//!
//! ```rust,no_run
//! use hull_protocol::{LocaleTable, ResolverOptions, SchemeResolver};
//!
//! # async fn run() -> Result<(), hull_protocol::ProtocolError> {
//! let resolver = SchemeResolver::new(ResolverOptions {
//!     scheme: "app".to_string(),
//!     asset_root: "resources/app".into(),
//!     locales: LocaleTable::builtin(),
//! })?;
//!
//! let response = resolver.resolve_url("app://dist/zh-cn/index.html?x=1", "zh-CN").await;
//! println!("{} -> {}", response.status(), response.file_url());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod guard;
pub mod locale;
pub mod request;
pub mod resolver;
pub mod response;

pub use error::{ProtocolError, Result};
pub use guard::RemoteGuard;
pub use locale::LocaleTable;
pub use request::{candidate_path, strip_traversal, SchemeRequest};
pub use resolver::{Resolution, ResolvedPath, ResolverOptions, SchemeResolver, DEFAULT_ENTRY};
pub use response::{content_type_for, FallbackReason, ResponseDescriptor};
