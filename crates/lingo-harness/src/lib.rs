#![forbid(unsafe_code)]

//! Headless host for exercising Lingo directives.
//!
//! - [`dom`]: an in-memory element tree with text and markup assignment.
//! - [`app`]: [`HeadlessApp`], a [`lingo_runtime::Host`] with batched
//!   update cycles and an error channel.
//!
//! ```
//! use lingo_harness::HeadlessApp;
//! use lingo_runtime::{DirectiveBinding, InstallOptions};
//!
//! let app = HeadlessApp::new();
//! let ctx = app
//!     .install(
//!         InstallOptions::default()
//!             .with_messages("en", [("hello_world", "Hello world")])
//!             .with_messages("ml", [("hello_world", "എല്ലാവർക്കും നമസ്കാരം")]),
//!     )
//!     .unwrap();
//!
//! let id = app
//!     .mount("span", "i18n", DirectiveBinding::new("v-i18n", "hello_world"))
//!     .unwrap();
//! let span = app.element(id).unwrap();
//! assert_eq!(span.text_content(), "Hello world");
//!
//! ctx.set_locale("ml");
//! app.next_tick();
//! assert_eq!(span.text_content(), "എല്ലാവർക്കും നമസ്കാരം");
//! ```

pub mod app;
pub mod dom;

pub use app::{HarnessError, HeadlessApp, HostError, MountId, TickReport};
pub use dom::{DomElement, ElementNode, Node};
