#![forbid(unsafe_code)]

//! The runtime reports generation resets and page traffic through `tracing`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use roster::prelude::*;
use time::macros::datetime;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Default)]
struct Messages(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Messages {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

fn count(messages: &[String], needle: &str) -> usize {
    messages.iter().filter(|m| m.contains(needle)).count()
}

#[test]
fn resets_and_pages_are_logged() {
    let capture = Messages::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let src = generate_source(
            GeneratorConfig::default()
                .with_count(120)
                .with_reference_time(datetime!(2025-01-01 0:00 UTC)),
        );
        let t0 = Instant::now();
        let mut program = open(&src, ListConfig::default(), t0).unwrap();
        program.send(ListMsg::SortBy(SortKey::Score));
        program.advance_by(Duration::from_millis(500));
    });

    let messages = capture.0.lock().unwrap().clone();
    assert_eq!(count(&messages, "view re-derived"), 2, "{messages:?}");
    assert_eq!(count(&messages, "page appended"), 1, "{messages:?}");
}

#[test]
fn stale_page_is_logged() {
    let capture = Messages::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let src = generate_source(
            GeneratorConfig::default()
                .with_count(60)
                .with_reference_time(datetime!(2025-01-01 0:00 UTC)),
        );
        let mut list = CustomerList::new(&src, ListConfig::default());
        let stale = page_request(list.init());
        list.update(ListMsg::SortBy(SortKey::Name));
        list.update(ListMsg::PageArrived(stale));
    });

    let messages = capture.0.lock().unwrap().clone();
    assert_eq!(count(&messages, "stale page discarded"), 1, "{messages:?}");
}

fn page_request(cmd: Cmd<ListMsg>) -> roster::PageRequest {
    let cmds = match cmd {
        Cmd::Batch(cmds) => cmds,
        other => panic!("expected a batch, got {other:?}"),
    };
    cmds.into_iter()
        .find_map(|cmd| match cmd {
            Cmd::Schedule {
                msg: ListMsg::PageArrived(request),
                ..
            } => Some(request),
            _ => None,
        })
        .expect("a page fetch")
}
