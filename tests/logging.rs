//! Diagnostics emitted through `tracing` on std builds.

#![cfg(all(feature = "std", not(feature = "defmt")))]

mod common;

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use common::{feeder, raw};
use feedscrew::FeedConfig;

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn logged(run: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, run);
    capture.text()
}

#[test]
fn test_blocked_sensor_is_reported() {
    let log = logged(|| {
        let (_rig, mut feeder) = feeder(FeedConfig::default(), |_| raw(20));
        assert!(feeder.run_feed().is_err());
    });

    assert!(log.contains("sensor low before motion: raw=40 sensitivity=50"), "{log}");
    assert!(log.contains("feed aborted after 0 forward steps"), "{log}");
    assert!(log.contains("sensor value is low before motion"), "{log}");
}

#[test]
fn test_recovery_announces_remaining_steps() {
    let log = logged(|| {
        let (_rig, mut feeder) = feeder(FeedConfig::default(), |s| {
            if s.reverse_pulses > 0 {
                raw(30)
            } else {
                raw(80)
            }
        });
        assert!(feeder.run_feed().is_ok());
    });

    assert!(log.contains("stall at step 2000"), "{log}");
    assert!(log.contains("unjam attempt 2 after stall at step 2000"), "{log}");
    assert!(log.contains("running remaining 13500 steps"), "{log}");
    assert!(log.contains("feed complete: 15501 forward steps, 2 attempts"), "{log}");
}

#[test]
fn test_exhausted_budget_names_the_condition() {
    let config = FeedConfig {
        max_retries: 1,
        ..FeedConfig::default()
    };
    let log = logged(|| {
        let (_rig, mut feeder) = feeder(config, |_| raw(80));
        assert!(feeder.run_feed().is_err());
    });

    assert!(log.contains("retry budget exhausted: attempts=1 stalled_at=2000"), "{log}");
    assert!(
        log.contains("jam at step 2000 not cleared after 1 attempts"),
        "{log}"
    );
}
