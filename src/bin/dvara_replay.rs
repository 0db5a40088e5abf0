//! CLI tool for replaying recorded sensor telemetry.
//!
//! Feeds a JSONL event log through the detection engine and reports
//! per-sensor results, optionally finishing with a calibration attempt.
//!
//! # Usage
//!
//! ```bash
//! dvara_replay telemetry.jsonl
//! dvara_replay --verbose --calibrate door-1 telemetry.jsonl
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use serde::Deserialize;

use dvara_sense::{DetectionEngine, EngineConfig, MotionEvent, MotionEventKind, PositionSample};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct Config {
    events_path: String,
    config_path: Option<String>,
    calibrate: Option<String>,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut events_path = None;
    let mut config_path = None;
    let mut calibrate = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --config")?;
                config_path = Some(value.clone());
            }
            "--calibrate" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --calibrate")?;
                calibrate = Some(value.clone());
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                return Err("Help requested".to_string());
            }
            arg if !arg.starts_with('-') => {
                if events_path.is_some() {
                    return Err("Multiple event files specified".to_string());
                }
                events_path = Some(arg.to_string());
            }
            _ => {
                return Err(format!("Unknown argument: {}", args[i]));
            }
        }
        i += 1;
    }

    let events_path = events_path.ok_or("Missing event file argument")?;

    Ok(Config {
        events_path,
        config_path,
        calibrate,
        verbose,
    })
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Usage: {} [OPTIONS] <EVENTS_FILE>

Replay recorded sensor telemetry through the detection engine.

The events file holds one JSON object per line, either a telemetry
sample or a motion event:

    {{"sensor_id": "door-1", "x": 0.05, "y": 0.03, "z": 0.98, "timestamp_us": 1000}}
    {{"sensor_id": "door-1", "event": "motion-stopped", "timestamp_us": 2000}}

OPTIONS:
    -c, --config <FILE>     Load engine configuration from a TOML file
    --calibrate <SENSOR>    Calibrate SENSOR from the replayed telemetry
    -v, --verbose           Print every detection result
    -h, --help              Show this help message

EXAMPLES:
    {} telemetry.jsonl
    {} --verbose --calibrate door-1 telemetry.jsonl
"#,
        program, program, program
    );
}

/// One line of the event log.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayEvent {
    Motion {
        sensor_id: String,
        event: MotionEventKind,
        timestamp_us: u64,
    },
    Sample {
        sensor_id: String,
        x: f32,
        y: f32,
        z: f32,
        timestamp_us: u64,
    },
}

/// Per-sensor sample accounting for the replay summary.
#[derive(Debug, Default)]
struct SensorTally {
    processed: u64,
    dropped: u64,
}

/// Counters accumulated over one replay pass.
#[derive(Debug, Default)]
struct ReplayTotals {
    lines: u64,
    unparseable: u64,
    samples_processed: u64,
    samples_dropped: u64,
    motion_events: u64,
    tallies: BTreeMap<String, SensorTally>,
}

fn replay_events<R: BufRead>(
    engine: &mut DetectionEngine,
    reader: R,
    verbose: bool,
) -> io::Result<ReplayTotals> {
    let mut totals = ReplayTotals::default();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        totals.lines += 1;

        let event: ReplayEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(_) => {
                totals.unparseable += 1;
                continue;
            }
        };

        match event {
            ReplayEvent::Motion {
                sensor_id,
                event,
                timestamp_us,
            } => {
                engine.record_motion_event(&sensor_id, MotionEvent::new(event, timestamp_us));
                totals.motion_events += 1;
                totals.tallies.entry(sensor_id).or_default();
            }
            ReplayEvent::Sample {
                sensor_id,
                x,
                y,
                z,
                timestamp_us,
            } => {
                let sample = PositionSample::new(x, y, z, timestamp_us);
                let tally = totals.tallies.entry(sensor_id.clone()).or_default();
                match engine.ingest(&sensor_id, sample) {
                    Some(result) => {
                        totals.samples_processed += 1;
                        tally.processed += 1;
                        if verbose {
                            println!(
                                "  [{:>12} us] {}: {} {:>5.1}% (angle {:.2} deg, {})",
                                timestamp_us,
                                sensor_id,
                                result.door_state,
                                result.confidence,
                                result.angle_degrees,
                                result.opening_type
                            );
                        }
                    }
                    None => {
                        totals.samples_dropped += 1;
                        tally.dropped += 1;
                    }
                }
            }
        }
    }

    Ok(totals)
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine_config = match &config.config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = DetectionEngine::new(engine_config);

    let reader = BufReader::new(File::open(&config.events_path)?);
    let totals = replay_events(&mut engine, reader, config.verbose)?;

    println!();
    println!("Replay Summary");
    println!("==============");
    println!("File: {}", config.events_path);
    println!("Lines: {} ({} unparseable)", totals.lines, totals.unparseable);
    println!(
        "Samples: {} processed, {} dropped",
        totals.samples_processed, totals.samples_dropped
    );
    println!("Motion events: {}", totals.motion_events);

    for (sensor, tally) in &totals.tallies {
        println!();
        println!("Sensor {}:", sensor);
        println!(
            "  Samples: {} processed, {} dropped",
            tally.processed, tally.dropped
        );

        match engine.runtime_stats(sensor) {
            Some(stats) => {
                match stats.previous_state {
                    Some(state) => println!(
                        "  Final state: {} ({} samples buffered)",
                        state, stats.samples_buffered
                    ),
                    None => println!("  Final state: unknown (no samples)"),
                }
                if stats.signature_samples > 0 {
                    println!("  Motion signature samples: {}", stats.signature_samples);
                }
            }
            None => println!("  Final state: unknown (no samples)"),
        }

        let metrics = engine.accuracy_metrics(sensor);
        println!("  Accuracy estimate: {:.3}", metrics.accuracy);
        println!("  Average confidence: {:.1}%", metrics.confidence);
        println!(
            "  State changes: {} over {} observations",
            metrics.state_changes, metrics.samples
        );

        let stability = engine.check_stability(sensor, false);
        match stability.reason {
            Some(reason) => println!("  Stability: unavailable ({})", reason),
            None => println!(
                "  Stability: {:.3} ({})",
                stability.overall_stability,
                if stability.stable { "stable" } else { "unstable" }
            ),
        }
    }

    if let Some(sensor) = &config.calibrate {
        println!();
        println!("Calibrating sensor {}...", sensor);
        match engine.calibrate(sensor, None, "dvara-replay") {
            Ok(outcome) => {
                let reference = outcome.record.closed_reference;
                println!(
                    "  Stored closed reference: ({:.3}, {:.3}, {:.3})",
                    reference.x, reference.y, reference.z
                );
                println!("  Confidence: {:.2}", outcome.record.confidence);
                if outcome.replaced_previous {
                    println!("  Previous calibration moved to history");
                }
            }
            Err(e) => {
                println!("  Calibration refused: {}", e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_replay_tallies_samples_per_sensor() {
        let mut engine = DetectionEngine::default();
        let log = concat!(
            r#"{"sensor_id": "door-1", "x": 0.05, "y": 0.03, "z": 0.98, "timestamp_us": 0}"#,
            "\n",
            r#"{"sensor_id": "door-1", "x": 250.0, "y": 0.0, "z": 1.0, "timestamp_us": 1000}"#,
            "\n",
            r#"{"sensor_id": "window-2", "x": 0.8, "y": 0.1, "z": 0.3, "timestamp_us": 2000}"#,
            "\n",
            r#"{"sensor_id": "hall-3", "event": "motion-stopped", "timestamp_us": 3000}"#,
            "\n",
            "not json\n",
        );

        let totals = replay_events(&mut engine, Cursor::new(log), false).unwrap();

        assert_eq!(totals.lines, 5);
        assert_eq!(totals.unparseable, 1);
        assert_eq!(totals.samples_processed, 2);
        assert_eq!(totals.samples_dropped, 1);
        assert_eq!(totals.motion_events, 1);

        let door = &totals.tallies["door-1"];
        assert_eq!((door.processed, door.dropped), (1, 1));
        let window = &totals.tallies["window-2"];
        assert_eq!((window.processed, window.dropped), (1, 0));

        // Motion-only sensors still get a summary row
        let hall = &totals.tallies["hall-3"];
        assert_eq!((hall.processed, hall.dropped), (0, 0));
        assert_eq!(totals.tallies.len(), 3);
    }

    #[test]
    fn test_dropped_only_sensor_is_tallied() {
        let mut engine = DetectionEngine::default();
        let log = concat!(
            r#"{"sensor_id": "door-1", "x": 0.05, "y": 0.03, "z": 0.98, "timestamp_us": 0}"#,
            "\n",
            r#"{"sensor_id": "broken-9", "x": 200.0, "y": 0.0, "z": 0.0, "timestamp_us": 1000}"#,
            "\n",
            r#"{"sensor_id": "broken-9", "x": -300.0, "y": 0.0, "z": 0.0, "timestamp_us": 2000}"#,
            "\n",
        );

        let totals = replay_events(&mut engine, Cursor::new(log), false).unwrap();

        // Every sample rejected at the boundary: no engine state, but the
        // summary still accounts for the sensor
        let broken = &totals.tallies["broken-9"];
        assert_eq!((broken.processed, broken.dropped), (0, 2));
        assert!(engine.runtime_stats("broken-9").is_none());
        assert!(totals.tallies.contains_key("door-1"));
    }

    #[test]
    fn test_parse_args_accepts_flags() {
        let args: Vec<String> = ["dvara_replay", "-v", "--calibrate", "door-1", "log.jsonl"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = parse_args(&args).unwrap();
        assert_eq!(config.events_path, "log.jsonl");
        assert_eq!(config.calibrate.as_deref(), Some("door-1"));
        assert!(config.verbose);
        assert!(config.config_path.is_none());

        let bad: Vec<String> = ["dvara_replay", "--nope"].iter().map(|s| s.to_string()).collect();
        assert!(parse_args(&bad).is_err());
    }
}
