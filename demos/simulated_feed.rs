//! Example: Simulated jam and recovery.
//!
//! This example demonstrates how to:
//! - Load a feeder configuration from TOML
//! - Build a feeder over simulated pins and a simulated blockage sensor
//! - Run a feed that jams, reverse-clears, and completes
//! - Follow the stall and recovery diagnostics on the log
//!
//! Run with: `cargo run --example simulated_feed`

use std::cell::Cell;
use std::rc::Rc;

use feedscrew::{parse_config, FeederBuilder};

const CONFIG: &str = r#"
[feeders.hopper]
name = "Hopper"
feed_length = 3000
max_empty_steps = 500
reverse_clear_steps = 400
settle_ms = 0
"#;

/// DIR line that remembers whether the screw has ever been reversed.
struct DirPin {
    reversed: Rc<Cell<bool>>,
}

impl embedded_hal::digital::ErrorType for DirPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for DirPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.reversed.set(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock output pin for STEP and ENA.
struct MockPin;

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock delay for demonstration.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {
        // Real hardware would wait here
    }
}

fn main() {
    // Stall and recovery diagnostics are logged as they happen
    tracing_subscriber::fmt().init();

    println!("=== Simulated Feed Example ===\n");

    let config = match parse_config(CONFIG) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    for name in config.feeder_names() {
        println!("Configured feeder: {name}");
    }

    // Material is stuck until the screw backs off, then flows freely
    let reversed = Rc::new(Cell::new(false));
    let sensor_view = reversed.clone();
    let sensor = move || if sensor_view.get() { 60u16 } else { 160u16 };

    let builder = match FeederBuilder::new().from_config(&config, "hopper") {
        Ok(builder) => builder,
        Err(e) => {
            eprintln!("config error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let mut feeder = match builder
        .dir_pin(DirPin { reversed })
        .pulse_pin(MockPin)
        .enable_pin(MockPin)
        .delay(MockDelay)
        .sensor(sensor)
        .build()
    {
        Ok(feeder) => feeder,
        Err(e) => {
            eprintln!("build error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    println!(
        "\nRunning '{}': {} steps, stall after {} silent steps",
        feeder.name(),
        feeder.config().feed_length,
        feeder.config().max_empty_steps
    );

    let result = feeder.run_feed();

    println!("\nRecoveries:");
    for record in feeder.run_state().recoveries() {
        println!(
            "  attempt {}: stalled at step {}, resumed {} steps",
            record.attempt, record.stalled_at, record.resume_steps
        );
    }

    match result {
        Ok(report) => {
            println!("\nFeed complete");
            println!("  Forward steps: {}", report.forward_steps);
            println!("  Reverse steps: {}", report.reverse_steps);
            println!("  Attempts: {}", report.attempts);
            println!("  Detections: {}", report.detections);
            println!("  Final phase: {:?}", feeder.phase());
        }
        Err(e) => {
            eprintln!("\nFeed failed: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
