//! Prometheus metrics and tracing spans.
//!
//! Counters and histograms are registered once, lazily, on a private
//! `prometheus::Registry`; [`RowbindMetrics::render`] produces the text
//! exposition for whatever endpoint the application serves.

#[cfg(feature = "metrics")]
pub use self::prometheus_metrics::{RowbindMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram, Meter, MeterProvider as _},
    };
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<RowbindMetrics> = Lazy::new(RowbindMetrics::init);

    pub struct RowbindMetrics {
        registry: Registry,
        // Keeps the reader alive; instruments stop exporting once it drops.
        _provider: Option<SdkMeterProvider>,
        pub statements_total: Counter<u64>,
        pub statement_errors: Counter<u64>,
        pub statement_duration: Histogram<f64>,
        pub bindings_built: Counter<u64>,
        pub connection_wait: Histogram<f64>,
    }

    impl RowbindMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let (provider, meter) = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => {
                    let provider = SdkMeterProvider::builder().with_reader(exporter).build();
                    let meter = provider.meter("rowbind");
                    (Some(provider), meter)
                }
                Err(err) => {
                    log::warn!("event=metrics_init status=error error={err}");
                    (None, global::meter("rowbind"))
                }
            };
            Self::with_meter(registry, provider, &meter)
        }

        fn with_meter(registry: Registry, provider: Option<SdkMeterProvider>, meter: &Meter) -> Self {
            let statements_total = meter
                .u64_counter("rowbind_statements_total")
                .with_description("Total SQL statements executed")
                .build();

            let statement_errors = meter
                .u64_counter("rowbind_statement_errors_total")
                .with_description("SQL statements that failed")
                .build();

            let statement_duration = meter
                .f64_histogram("rowbind_statement_duration_seconds")
                .with_description("Duration of SQL statements")
                .build();

            let bindings_built = meter
                .u64_counter("rowbind_bindings_built_total")
                .with_description("Table bindings built from schema metadata")
                .build();

            let connection_wait = meter
                .f64_histogram("rowbind_connection_wait_seconds")
                .with_description("Time spent opening database connections")
                .build();

            Self {
                registry,
                _provider: provider,
                statements_total,
                statement_errors,
                statement_duration,
                bindings_built,
                connection_wait,
            }
        }

        pub fn record_statement(&self, elapsed: Duration) {
            self.statements_total.add(1, &[]);
            self.statement_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_statement_error(&self) {
            self.statement_errors.add(1, &[]);
        }

        pub fn record_binding_built(&self) {
            self.bindings_built.add(1, &[]);
        }

        pub fn record_connection_wait(&self, elapsed: Duration) {
            self.connection_wait.record(elapsed.as_secs_f64(), &[]);
        }

        /// Prometheus text exposition of everything recorded so far.
        pub fn render(&self) -> String {
            TextEncoder::new()
                .encode_to_string(&self.registry.gather())
                .unwrap_or_default()
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    /// Span around one SQL statement.
    pub fn statement_span(sql: &str) -> Span {
        info_span!("rowbind.statement", db.system = "sql", db.statement = %sql)
    }

    /// Span around building the binding of one record type.
    pub fn mapping_span(record: &str) -> Span {
        info_span!("rowbind.mapping", record = %record)
    }

    pub fn acquire_connection_span() -> Span {
        info_span!("rowbind.connect")
    }
}
