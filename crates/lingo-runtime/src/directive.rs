#![forbid(unsafe_code)]

//! Directive lifecycle controller.
//!
//! One [`DirectiveController`] exists per element using an `i18n` or
//! `i18n-html` directive. The host drives it through mount, update and
//! unmount; the controller decides whether the element needs a new write.
//!
//! # State machine
//!
//! ```text
//!            mount                update
//! Unbound ─────────▶ Bound ◀──────────────┐
//!    ▲                 │  └───────────────┘
//!    └─────────────────┘
//!          unmount
//! ```
//!
//! # Invariants
//!
//! 1. After a successful render the recorded locale equals the context's
//!    locale at render time.
//! 2. An update whose `(locale, revision, key, params, mode)` tuple equals
//!    the last rendered one performs no write.
//! 3. Text mode only ever assigns text content; markup mode only ever
//!    assigns the engine's sanitized markup.
//! 4. A failed parse leaves the element and the recorded snapshot untouched.
//! 5. Unmount releases the element handle. No hook writes afterwards; a
//!    later mount reports [`RenderOutcome::Detached`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `MissingMessageKey` | No key derivable | Returned to the host, logged at `warn` |
//! | Element gone | Host dropped the node | [`RenderOutcome::Detached`], nothing written |

use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::host::{DirectiveBinding, DirectiveDefinition, DirectiveHooks, Element};
use crate::locale::{LocaleContext, LocaleSnapshot};
use crate::parse::{
    BindingDescriptor, BindingError, DirectiveKind, OutputMode, RawBinding, parse,
};

/// What a lifecycle hook did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    /// The element was written.
    Rendered,
    /// Nothing the element depends on changed.
    Skipped,
    /// The element no longer exists; nothing was written.
    Detached,
    /// The controller is not bound (never mounted, or unmounted).
    Unbound,
}

/// Everything one render depended on.
#[derive(Debug, Clone, PartialEq)]
struct RenderSnapshot {
    locale: LocaleSnapshot,
    descriptor: BindingDescriptor,
}

#[derive(Debug, Default)]
struct BindingState {
    last: Option<RenderSnapshot>,
}

/// Per-element lifecycle controller.
pub struct DirectiveController {
    context: LocaleContext,
    kind: DirectiveKind,
    /// `None` once unmounted.
    element: Option<Weak<dyn Element>>,
    state: Option<BindingState>,
}

impl DirectiveController {
    /// Create an unbound controller for `element`.
    #[must_use]
    pub fn new(context: LocaleContext, kind: DirectiveKind, element: &Rc<dyn Element>) -> Self {
        Self {
            context,
            kind,
            element: Some(Rc::downgrade(element)),
            state: None,
        }
    }

    /// Bind and render.
    ///
    /// Mounting an already bound controller starts over with a fresh
    /// snapshot. On a parse error the controller stays bound with no
    /// snapshot, so the next successful update renders.
    pub fn mount(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError> {
        self.state = Some(BindingState::default());
        self.render(binding)
    }

    /// Re-render if anything the element depends on changed.
    pub fn update(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError> {
        self.render(binding)
    }

    /// Drop the binding state and the element handle. Later updates report
    /// [`RenderOutcome::Unbound`].
    pub fn unmount(&mut self) -> RenderOutcome {
        self.element = None;
        if self.state.take().is_some() {
            debug!(directive = self.kind.name(), "directive unbound");
        }
        RenderOutcome::Unbound
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.is_some()
    }

    /// Locale of the last successful render, if any.
    #[must_use]
    pub fn last_locale(&self) -> Option<&str> {
        self.state
            .as_ref()?
            .last
            .as_ref()
            .map(|last| last.locale.locale.as_str())
    }

    fn render(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(RenderOutcome::Unbound);
        };

        let raw = RawBinding {
            raw_name: &binding.raw_name,
            value: &binding.value,
            arg: binding.arg.as_deref(),
            modifiers: &binding.modifiers,
        };
        let descriptor = parse(raw, self.kind).inspect_err(|err| {
            warn!(directive = %binding.raw_name, error = %err, "directive binding failed");
        })?;

        let snapshot = RenderSnapshot {
            locale: self.context.snapshot(),
            descriptor,
        };
        if state.last.as_ref() == Some(&snapshot) {
            return Ok(RenderOutcome::Skipped);
        }

        let Some(element) = self.element.as_ref().and_then(Weak::upgrade) else {
            debug!(
                directive = %binding.raw_name,
                key = %snapshot.descriptor.key,
                "element dropped; render skipped"
            );
            return Ok(RenderOutcome::Detached);
        };

        let BindingDescriptor { key, params, mode } = &snapshot.descriptor;
        match mode {
            OutputMode::Text => element.set_text_content(&self.context.translate(key, params)),
            OutputMode::Markup => {
                element.set_inner_html(&self.context.translate_markup(key, params));
            }
        }
        debug!(
            directive = %binding.raw_name,
            key = %key,
            locale = %snapshot.locale.locale,
            revision = snapshot.locale.revision,
            "directive rendered"
        );
        state.last = Some(snapshot);
        Ok(RenderOutcome::Rendered)
    }
}

impl std::fmt::Debug for DirectiveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveController")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DirectiveHooks for DirectiveController {
    fn mounted(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError> {
        self.mount(binding)
    }

    fn updated(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError> {
        self.update(binding)
    }

    fn unmounted(&mut self, _binding: &DirectiveBinding) -> RenderOutcome {
        self.unmount()
    }
}

/// Directive definition registered by the installer; hands each element
/// its own controller sharing the application's context.
#[derive(Debug, Clone)]
pub struct I18nDirective {
    context: LocaleContext,
    kind: DirectiveKind,
}

impl I18nDirective {
    #[must_use]
    pub fn new(context: LocaleContext, kind: DirectiveKind) -> Self {
        Self { context, kind }
    }

    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }
}

impl DirectiveDefinition for I18nDirective {
    fn instantiate(&self, element: &Rc<dyn Element>) -> Box<dyn DirectiveHooks> {
        Box::new(DirectiveController::new(
            self.context.clone(),
            self.kind,
            element,
        ))
    }
}
