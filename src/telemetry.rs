use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

use crate::quiz::ALL_CATEGORIES;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out to quiz players",
        &["category"]
    )
    .unwrap();
    pub static ref QUIZZES_EXHAUSTED: IntCounter = register_int_counter!(
        "quizzes_exhausted_total",
        "Number of quiz requests with no unseen question left"
    )
    .unwrap();
}

/// Registers the quiz counters so a scrape lists them before any quiz is
/// played. The all-categories series starts at zero.
pub fn init_metrics() {
    lazy_static::initialize(&QUIZZES_EXHAUSTED);
    QUIZ_QUESTIONS_SERVED.with_label_values(&[ALL_CATEGORIES.to_string().as_str()]);
}

fn span_events(setting: Option<&str>) -> FmtSpan {
    match setting {
        Some(value) if value.eq_ignore_ascii_case("true") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::NONE,
    }
}

/// `LOG_LEVEL` takes an `EnvFilter` directive, default `info` with request
/// traces from `tower_http` at debug.
pub fn init_tracing() {
    let include_spans = std::env::var("INCLUDE_SPAN_EVENTS").ok();
    let fmt_layer = fmt::layer().with_span_events(span_events(include_spans.as_deref()));
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    #[test]
    fn span_events_only_when_enabled() {
        assert_eq!(span_events(Some("TRUE")), FmtSpan::ENTER | FmtSpan::EXIT);
        assert_eq!(span_events(Some("false")), FmtSpan::NONE);
        assert_eq!(span_events(None), FmtSpan::NONE);
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn counters_are_listed_after_init() {
        init_metrics();
        let mut buf = vec![];
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("quiz_questions_served_total{category=\"0\"}"));
        assert!(text.contains("quizzes_exhausted_total"));
    }
}
