#![forbid(unsafe_code)]

//! Headless application host.
//!
//! [`HeadlessApp`] implements [`Host`] over the in-memory DOM. It keeps
//! the injection registry, the directive registry and the set of mounted
//! directive instances, and batches updates the way a UI framework does:
//! locale changes, catalog loads and binding changes mark the app dirty,
//! and the next [`HeadlessApp::next_tick`] runs every mounted instance's
//! `updated` hook once.
//!
//! Hook errors never abort a tick. They are collected in an error log
//! that tests read with [`HeadlessApp::errors`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use lingo_i18n::I18nError;
use lingo_runtime::{
    BindingError, DirectiveBinding, DirectiveDefinition, DirectiveHooks, Element, Host,
    InjectionKey, InstallOptions, LocaleContext, RenderOutcome, Subscription,
};
use tracing::{debug, warn};

use crate::dom::DomElement;

/// Identifies a mounted directive instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u64);

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Harness misuse, as opposed to errors raised by directive hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    #[error("unknown directive: v-{0}")]
    UnknownDirective(String),
    /// The mount was never created or is already unmounted.
    #[error("unknown mount: {0}")]
    UnknownMount(MountId),
}

/// A hook error delivered to the host's error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub mount: MountId,
    pub error: BindingError,
}

/// Counts from one update cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rendered: usize,
    pub skipped: usize,
    pub detached: usize,
    pub errors: usize,
}

impl TickReport {
    fn record(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Rendered => self.rendered += 1,
            RenderOutcome::Skipped | RenderOutcome::Unbound => self.skipped += 1,
            RenderOutcome::Detached => self.detached += 1,
        }
    }
}

struct Mount {
    id: MountId,
    /// `None` once the harness destroyed the node.
    element: Option<Rc<DomElement>>,
    hooks: Box<dyn DirectiveHooks>,
    binding: DirectiveBinding,
}

/// A headless application instance.
pub struct HeadlessApp {
    provided: RefCell<AHashMap<InjectionKey, Rc<dyn Any>>>,
    directives: RefCell<AHashMap<String, Rc<dyn DirectiveDefinition>>>,
    mounts: RefCell<Vec<Mount>>,
    next_id: Cell<u64>,
    dirty: Rc<Cell<bool>>,
    errors: RefCell<Vec<HostError>>,
    watches: RefCell<Vec<Subscription>>,
}

impl Default for HeadlessApp {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessApp")
            .field("provided", &self.provided.borrow().len())
            .field("directives", &self.directives.borrow().len())
            .field("mounts", &self.mounts.borrow().len())
            .field("dirty", &self.dirty.get())
            .field("errors", &self.errors.borrow().len())
            .finish()
    }
}

impl HeadlessApp {
    #[must_use]
    pub fn new() -> Self {
        Self {
            provided: RefCell::new(AHashMap::new()),
            directives: RefCell::new(AHashMap::new()),
            mounts: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            dirty: Rc::new(Cell::new(false)),
            errors: RefCell::new(Vec::new()),
            watches: RefCell::new(Vec::new()),
        }
    }

    /// Install localization and schedule a tick on every locale change or
    /// catalog load.
    pub fn install(&self, options: InstallOptions) -> Result<LocaleContext, I18nError> {
        let context = lingo_runtime::install(self, options)?;
        let mut watches = self.watches.borrow_mut();
        if watches.is_empty() {
            let dirty = Rc::clone(&self.dirty);
            watches.push(context.subscribe(move |_| dirty.set(true)));
            let dirty = Rc::clone(&self.dirty);
            watches.push(context.subscribe_revision(move |_| dirty.set(true)));
        }
        Ok(context)
    }

    /// Create a `<tag>` element using directive `v-{directive}` and run its
    /// `mounted` hook.
    ///
    /// A hook error goes to the error log; the mount still exists.
    pub fn mount(
        &self,
        tag: &str,
        directive: &str,
        binding: DirectiveBinding,
    ) -> Result<MountId, HarnessError> {
        let definition = self
            .directives
            .borrow()
            .get(directive)
            .cloned()
            .ok_or_else(|| HarnessError::UnknownDirective(directive.to_owned()))?;

        let element = Rc::new(DomElement::new(tag));
        let handle: Rc<dyn Element> = element.clone();
        let mut hooks = definition.instantiate(&handle);

        let id = MountId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let result = hooks.mounted(&binding);
        self.deliver(id, result);

        self.mounts.borrow_mut().push(Mount {
            id,
            element: Some(element),
            hooks,
            binding,
        });
        Ok(id)
    }

    /// Replace a mount's binding; takes effect on the next tick.
    pub fn set_binding(&self, id: MountId, binding: DirectiveBinding) -> Result<(), HarnessError> {
        let mut mounts = self.mounts.borrow_mut();
        let mount = mounts
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(HarnessError::UnknownMount(id))?;
        mount.binding = binding;
        self.dirty.set(true);
        Ok(())
    }

    /// Run the `unmounted` hook and forget the mount.
    ///
    /// The element is returned so tests can check it is no longer written.
    pub fn unmount(&self, id: MountId) -> Result<Option<Rc<DomElement>>, HarnessError> {
        let mut mount = {
            let mut mounts = self.mounts.borrow_mut();
            let index = mounts
                .iter()
                .position(|m| m.id == id)
                .ok_or(HarnessError::UnknownMount(id))?;
            mounts.remove(index)
        };
        mount.hooks.unmounted(&mount.binding);
        Ok(mount.element)
    }

    /// Drop the harness's reference to the element without unmounting.
    ///
    /// Models a host that destroyed the node before notifying the
    /// directive.
    pub fn destroy_element(&self, id: MountId) -> Result<(), HarnessError> {
        let mut mounts = self.mounts.borrow_mut();
        let mount = mounts
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(HarnessError::UnknownMount(id))?;
        mount.element = None;
        Ok(())
    }

    #[must_use]
    pub fn element(&self, id: MountId) -> Option<Rc<DomElement>> {
        self.mounts
            .borrow()
            .iter()
            .find(|m| m.id == id)
            .and_then(|m| m.element.clone())
    }

    /// Whether something changed since the last tick.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Run one update cycle if anything changed.
    pub fn next_tick(&self) -> TickReport {
        if !self.dirty.replace(false) {
            return TickReport::default();
        }
        self.update_all()
    }

    /// Run one update cycle unconditionally.
    pub fn force_update(&self) -> TickReport {
        self.dirty.set(false);
        self.update_all()
    }

    fn update_all(&self) -> TickReport {
        let mut report = TickReport::default();
        let results: Vec<_> = self
            .mounts
            .borrow_mut()
            .iter_mut()
            .map(|mount| (mount.id, mount.hooks.updated(&mount.binding)))
            .collect();
        for (id, result) in results {
            match &result {
                Ok(outcome) => report.record(*outcome),
                Err(_) => report.errors += 1,
            }
            self.deliver(id, result);
        }
        debug!(
            rendered = report.rendered,
            skipped = report.skipped,
            detached = report.detached,
            errors = report.errors,
            "update cycle complete"
        );
        report
    }

    fn deliver(&self, mount: MountId, result: Result<RenderOutcome, BindingError>) {
        if let Err(error) = result {
            warn!(mount = mount.0, %error, "directive hook failed");
            self.errors.borrow_mut().push(HostError { mount, error });
        }
    }

    /// Errors delivered so far.
    #[must_use]
    pub fn errors(&self) -> Vec<HostError> {
        self.errors.borrow().clone()
    }

    /// Drain the error log.
    pub fn take_errors(&self) -> Vec<HostError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }

    /// Names of registered directives, sorted.
    #[must_use]
    pub fn directive_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.directives.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Host for HeadlessApp {
    fn provide(&self, key: InjectionKey, value: Rc<dyn Any>) {
        self.provided.borrow_mut().insert(key, value);
    }

    fn inject(&self, key: &InjectionKey) -> Option<Rc<dyn Any>> {
        self.provided.borrow().get(key).cloned()
    }

    fn register_directive(&self, name: &str, definition: Rc<dyn DirectiveDefinition>) {
        self.directives
            .borrow_mut()
            .insert(name.to_owned(), definition);
    }
}
