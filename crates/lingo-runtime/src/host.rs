#![forbid(unsafe_code)]

//! What the binding layer needs from a host UI framework.
//!
//! A host owns element lifetimes, a per-application injection registry and
//! a directive registry. It calls directive hooks as elements are mounted,
//! updated and unmounted. Everything here is single-threaded: handles are
//! `Rc`, and mutation goes through `&self` with interior mutability on the
//! host side.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::directive::RenderOutcome;
use crate::parse::{BindingError, Modifiers};
use crate::value::BindingValue;

/// A key in a host's injection registry.
///
/// Two keys are equal only when both the name and the owning type match,
/// so a key built from a private marker type cannot be forged by another
/// crate that happens to use the same name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectionKey {
    name: &'static str,
    owner: TypeId,
}

impl InjectionKey {
    /// Create a key owned by the marker type `T`.
    #[must_use]
    pub fn new<T: Any>(name: &'static str) -> Self {
        Self {
            name,
            owner: TypeId::of::<T>(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for InjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InjectionKey").field(&self.name).finish()
    }
}

/// An application instance as seen by the binding layer.
pub trait Host {
    /// Store `value` under `key`, replacing any previous value.
    fn provide(&self, key: InjectionKey, value: Rc<dyn Any>);

    /// Look up the value stored under `key`.
    fn inject(&self, key: &InjectionKey) -> Option<Rc<dyn Any>>;

    /// Make a directive available to templates under `name` (without the
    /// `v-` prefix).
    fn register_directive(&self, name: &str, definition: Rc<dyn DirectiveDefinition>);
}

/// Typed lookup over [`Host::inject`].
///
/// Returns `None` when nothing is stored under `key` or the stored value
/// has a different type.
pub fn inject_typed<T: Any>(host: &(impl Host + ?Sized), key: &InjectionKey) -> Option<Rc<T>> {
    host.inject(key)?.downcast::<T>().ok()
}

/// A mounted element that a directive can write to.
pub trait Element {
    /// Replace the element's children with a single text node.
    fn set_text_content(&self, text: &str);

    /// Replace the element's children with parsed markup.
    fn set_inner_html(&self, html: &str);
}

/// A directive use as the host sees it on each hook call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectiveBinding {
    /// Name as written in the template, e.g. `v-i18n:search_results.html`.
    pub raw_name: String,
    pub value: BindingValue,
    pub arg: Option<String>,
    pub modifiers: Modifiers,
}

impl DirectiveBinding {
    /// A binding with only a value.
    #[must_use]
    pub fn new(raw_name: impl Into<String>, value: impl Into<BindingValue>) -> Self {
        Self {
            raw_name: raw_name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Set the directive argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    /// Add a modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers = self.modifiers.with(modifier);
        self
    }
}

/// Lifecycle hooks of one directive instance, bound to one element.
pub trait DirectiveHooks {
    /// The element was inserted.
    fn mounted(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError>;

    /// The owning component re-rendered.
    fn updated(&mut self, binding: &DirectiveBinding) -> Result<RenderOutcome, BindingError>;

    /// The element is being removed.
    fn unmounted(&mut self, binding: &DirectiveBinding) -> RenderOutcome;
}

/// A registered directive: creates hook instances per element.
pub trait DirectiveDefinition {
    fn instantiate(&self, element: &Rc<dyn Element>) -> Box<dyn DirectiveHooks>;
}
