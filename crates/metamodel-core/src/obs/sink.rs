//! Metrics sink boundary.
//!
//! Model and query code MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between metamodel logic
//! and the thread-local metrics state.
use crate::{model::types::ElementKind, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    AttributeBuilt {
        kind: ElementKind,
        plural: bool,
    },
    BootstrapFinished {
        managed_types: u64,
        attributes: u64,
    },
    BootstrapFailed,
    PathCreated {
        plural: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::AttributeBuilt { kind, plural } => {
                metrics::with_state_mut(|m| {
                    m.ops.attributes_built = m.ops.attributes_built.saturating_add(1);
                    if plural {
                        m.ops.plural_attributes_built =
                            m.ops.plural_attributes_built.saturating_add(1);
                        let entry = m.plural_elements.entry(kind).or_default();
                        *entry = entry.saturating_add(1);
                    }
                });
            }

            MetricsEvent::BootstrapFinished {
                managed_types,
                attributes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.bootstrap_runs = m.ops.bootstrap_runs.saturating_add(1);
                    m.last_managed_types = managed_types;
                    m.last_attributes = attributes;
                });
            }

            MetricsEvent::BootstrapFailed => {
                metrics::with_state_mut(|m| {
                    m.ops.bootstrap_failures = m.ops.bootstrap_failures.saturating_add(1);
                });
            }

            MetricsEvent::PathCreated { plural } => {
                metrics::with_state_mut(|m| {
                    m.ops.paths_created = m.ops.paths_created.saturating_add(1);
                    if plural {
                        m.ops.plural_paths_created = m.ops.plural_paths_created.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CaptureSink {
        events: RefCell<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_captures_events_and_restores_global() {
        metrics_reset_all();
        let capture = Rc::new(CaptureSink::default());

        with_metrics_sink(capture.clone(), || {
            record(MetricsEvent::PathCreated { plural: true });
        });
        record(MetricsEvent::PathCreated { plural: false });

        assert_eq!(
            capture.events.borrow().as_slice(),
            &[MetricsEvent::PathCreated { plural: true }]
        );

        let ops = metrics_report().counters.expect("counters").ops;
        assert_eq!(ops.paths_created, 1);
        assert_eq!(ops.plural_paths_created, 0);
    }

    #[test]
    fn nested_overrides_unwind_in_order() {
        let outer = Rc::new(CaptureSink::default());
        let inner = Rc::new(CaptureSink::default());

        with_metrics_sink(outer.clone(), || {
            with_metrics_sink(inner.clone(), || {
                record(MetricsEvent::BootstrapFailed);
            });
            record(MetricsEvent::BootstrapFailed);
        });

        assert_eq!(inner.events.borrow().len(), 1);
        assert_eq!(outer.events.borrow().len(), 1);
    }

    #[test]
    fn override_is_restored_after_panic() {
        metrics_reset_all();
        let capture = Rc::new(CaptureSink::default());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            with_metrics_sink(capture.clone(), || panic!("boom"));
        }));
        assert!(result.is_err());

        record(MetricsEvent::BootstrapFailed);
        assert!(capture.events.borrow().is_empty());
        assert_eq!(
            metrics_report()
                .counters
                .expect("counters")
                .ops
                .bootstrap_failures,
            1
        );
    }

    #[test]
    fn attribute_events_count_plural_elements_by_kind() {
        metrics_reset_all();

        record(MetricsEvent::AttributeBuilt {
            kind: ElementKind::Entity,
            plural: true,
        });
        record(MetricsEvent::AttributeBuilt {
            kind: ElementKind::Basic,
            plural: false,
        });

        let state = metrics_report().counters.expect("counters");
        assert_eq!(state.ops.attributes_built, 2);
        assert_eq!(state.ops.plural_attributes_built, 1);
        assert_eq!(state.plural_elements.get(&ElementKind::Entity), Some(&1));
        assert_eq!(state.plural_elements.get(&ElementKind::Basic), None);
    }
}
