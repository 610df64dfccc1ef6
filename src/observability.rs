use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("parlance.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("parlance.client.request_errors");

pub(crate) static CHAT_TURNS: Counter = Counter::new("parlance.chat.turns");
pub(crate) static CHAT_TURN_ERRORS: Counter = Counter::new("parlance.chat.turn_errors");
pub(crate) static CHAT_TURN_DURATION: Moments =
    Moments::new("parlance.chat.turn_duration_seconds");

pub(crate) static BATCH_SUBMISSIONS: Counter = Counter::new("parlance.batch.submissions");
pub(crate) static POLL_TICKS: Counter = Counter::new("parlance.batch.poll_ticks");
pub(crate) static POLL_ERRORS: Counter = Counter::new("parlance.batch.poll_errors");
pub(crate) static POLL_TERMINALS: Counter = Counter::new("parlance.batch.poll_terminals");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_ERRORS);
    collector.register_moments(&CHAT_TURN_DURATION);

    collector.register_counter(&BATCH_SUBMISSIONS);
    collector.register_counter(&POLL_TICKS);
    collector.register_counter(&POLL_ERRORS);
    collector.register_counter(&POLL_TERMINALS);
}
