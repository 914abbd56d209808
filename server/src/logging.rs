use tracing_config::config::{
    model::{Filter, FmtLayer, FmtLayerFormatter, Layer, Level, SpanEvents, TracingConfig, Writer},
    ArcMutexGuard,
};

const STDOUT: &str = "stdout";

const fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    }
}

/// Human readable lines on stdout, colored when stdout is a terminal
fn console_layer() -> Layer {
    Layer::Fmt(FmtLayer {
        filter: None,
        writer: STDOUT.to_owned(),
        formatter: FmtLayerFormatter::Full,
        span_events: SpanEvents::None,
        ansi: atty::is(atty::Stream::Stdout),
        time: None,
        level: None,
        target: None,
        file: None,
        line_number: None,
        thread_ids: None,
        thread_names: None,
        span_list: None,
        current_span: None,
        flatten_event: None,
    })
}

pub(crate) fn default_tracing_config() -> TracingConfig {
    TracingConfig {
        title: String::from("Versions server logging"),
        filters: FromIterator::from_iter([(
            "root".to_owned(),
            Filter {
                level: default_level(),
                directives: None,
            },
        )]),
        layers: FromIterator::from_iter([("console".to_owned(), console_layer())]),
        writers: FromIterator::from_iter([(STDOUT.to_owned(), Writer::StandardOutput)]),
    }
}

/// Install the global subscriber described by `logging_config`
pub(crate) fn init(
    logging_config: &TracingConfig,
) -> Result<ArcMutexGuard, tracing_config::TracingConfigError> {
    tracing_config::config::init_config(false, logging_config)
}
