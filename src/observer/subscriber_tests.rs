//! Tests for the tracing-backed observer.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::Level;

use super::{CallLevel, CallObserver, CallRecord, TracingObserver};

/// Writer that appends formatted events to a shared buffer.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(max_level: Level, emit: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, emit);
    captured.text()
}

fn sample_record(status: u16) -> CallRecord {
    CallRecord::new("DoWork", "http://svc/test", "<xml/>")
        .with_response(status, b"<ok/>")
        .with_engine_times(Duration::from_millis(30), Duration::from_millis(4))
        .with_wall_time(Duration::from_millis(35))
}

#[test]
fn debug_record_is_a_debug_event_with_fields() {
    let output = capture(Level::DEBUG, || {
        TracingObserver.log(CallLevel::Debug, "SoapCall: DoWork", &sample_record(200));
    });

    assert!(output.contains("DEBUG"));
    assert!(output.contains("SoapCall: DoWork"));
    assert!(output.contains("ntlm_soap::call"));
    assert!(output.contains("http_status=200"));
    assert!(output.contains("total_ms=30"));
    assert!(output.contains("connect_ms=4"));
    assert!(output.contains("wall_ms=35"));
    assert!(output.contains("request=<xml/>"));
    assert!(output.contains("response=<ok/>"));
}

#[test]
fn error_record_is_an_error_event() {
    let output = capture(Level::DEBUG, || {
        TracingObserver.log(CallLevel::Error, "SoapCall: DoWork", &sample_record(500));
    });

    assert!(output.contains("ERROR"));
    assert!(output.contains("http_status=500"));
}

#[test]
fn debug_record_is_hidden_at_info() {
    let output = capture(Level::INFO, || {
        TracingObserver.log(CallLevel::Debug, "SoapCall: DoWork", &sample_record(200));
    });

    assert!(output.is_empty());
}
