#![forbid(unsafe_code)]

//! Structured log events emitted while directives render.
//!
//! Verifies:
//! 1. Every render logs `directive rendered` with key and locale fields
//! 2. Skipped updates log nothing at render level
//! 3. Binding errors log at WARN
//! 4. Locale propagation runs inside the `lingo.observable.notify` span
//!
//! Run:
//!   cargo test -p lingo-harness --test tracing_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lingo_harness::HeadlessApp;
use lingo_runtime::{BindingValue, DirectiveBinding, InstallOptions};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

#[derive(Default, Clone)]
struct Capture {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Capture {
    fn events(&self, message: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.message() == message)
            .cloned()
            .collect()
    }

    fn spans(&self) -> Vec<String> {
        self.spans.lock().unwrap().clone()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<R>(f: impl FnOnce() -> R) -> (R, Capture) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}

fn app() -> HeadlessApp {
    let app = HeadlessApp::new();
    app.install(
        InstallOptions::default()
            .with_messages("en", [("hello_world", "Hello world")])
            .with_messages("ml", [("hello_world", "എല്ലാവർക്കും നമസ്കാരം")]),
    )
    .unwrap();
    app
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn render_events_carry_key_and_locale() {
    let ((), capture) = with_captured_tracing(|| {
        let app = app();
        app.mount(
            "span",
            "i18n",
            DirectiveBinding::new("v-i18n", "hello_world"),
        )
        .unwrap();
        app.force_update();
        app.install(InstallOptions::default()).unwrap().set_locale("ml");
        app.next_tick();
    });

    let renders = capture.events("directive rendered");
    assert_eq!(renders.len(), 2, "mount and one locale change");
    assert_eq!(renders[0].fields["key"], "hello_world");
    assert_eq!(renders[0].fields["locale"], "en");
    assert_eq!(renders[1].fields["locale"], "ml");
    assert!(renders.iter().all(|e| e.level == Level::DEBUG));

    assert_eq!(capture.events("i18n already installed; ignoring").len(), 1);
    assert!(
        capture
            .spans()
            .iter()
            .any(|name| name == "lingo.observable.notify")
    );
}

#[test]
fn binding_errors_warn() {
    let ((), capture) = with_captured_tracing(|| {
        let app = app();
        app.mount(
            "span",
            "i18n",
            DirectiveBinding::new("v-i18n", BindingValue::Null),
        )
        .unwrap();
    });

    let failures = capture.events("directive binding failed");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].level, Level::WARN);
    assert_eq!(failures[0].fields["directive"], "v-i18n");

    let delivered = capture.events("directive hook failed");
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].level, Level::WARN);
}

#[test]
fn update_cycle_summary() {
    let ((), capture) = with_captured_tracing(|| {
        let app = app();
        app.mount(
            "span",
            "i18n",
            DirectiveBinding::new("v-i18n", "hello_world"),
        )
        .unwrap();
        app.force_update();
    });

    let cycles = capture.events("update cycle complete");
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].fields["rendered"], "0");
    assert_eq!(cycles[0].fields["skipped"], "1");
}
