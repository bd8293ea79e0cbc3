//! Gridray Replay Harness
//!
//! Replays recorded redraw notifications through the full client pipeline
//! without a window. Each input line is one JSON notification, either the
//! bare parameter list or a `[2, "redraw", params]` message. Lines are fed
//! from a producer thread through the batch queue while the main thread
//! ticks at the configured rate, and the frames handed to the draw sink are
//! reported as text or JSON.

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use gridray::app::Config;
use gridray::editor::{Editor, MouseInput, UiClient};
use gridray::redraw::{batch_queue, BatchSender};
use gridray::render::{DrawSink, GlyphAtlas, GlyphBitmap, Vertex};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut config_file: Option<PathBuf> = None;
    let mut input_file: Option<PathBuf> = None;
    let mut output_format = OutputFormat::Text;
    let mut realtime = true;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(PathBuf::from(&args[i]));
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(PathBuf::from(&args[i]));
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "--fast" => {
                realtime = false;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(PathBuf::from(&args[i]));
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match &config_file {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };

    let input: Box<dyn BufRead + Send> = match &input_file {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let (tx, rx) = batch_queue();
    let producer = thread::spawn(move || feed(input, tx));

    let (glyph_w, glyph_h) = (config.cell_width as u32, config.cell_height as u32);
    let atlas = GlyphAtlas::new(1024, 1024, move |_: char, _: bool, _: bool| {
        Some(GlyphBitmap::solid(glyph_w, glyph_h))
    });
    let mut editor = Editor::new(&config, atlas, LogClient, rx);
    let mut sink = StatsSink::default();

    let interval = config.tick_interval();
    let mut report = Report::default();
    let mut last = Instant::now();
    while !editor.is_closed() {
        let dt = if realtime {
            thread::sleep(interval);
            let now = Instant::now();
            let dt = now - last;
            last = now;
            dt
        } else {
            interval
        };
        let tick = editor.tick(dt, &mut sink);
        report.ticks += 1;
        report.batches += tick.batches;
        report.applied += tick.applied;
        report.skipped += tick.skipped;
        if tick.vertices > 0 {
            report.frames.push(FrameStats {
                tick: report.ticks,
                vertices: tick.vertices,
                quads: tick.vertices / 6,
                reallocated: tick.reallocated,
            });
        }
    }

    match producer.join() {
        Ok(Ok(lines)) => debug!(lines, "input exhausted"),
        Ok(Err(e)) => {
            eprintln!("Error reading input: {}", e);
            return ExitCode::FAILURE;
        },
        Err(_) => {
            eprintln!("Input thread panicked");
            return ExitCode::FAILURE;
        },
    }

    let state = editor.state();
    report.title = state.title.clone();
    report.uploaded = sink.uploads;
    report.screen = (0..state.grid.rows())
        .filter_map(|row| state.grid.row(row).map(|r| r.text()))
        .collect();

    match output_format {
        OutputFormat::Text => print_text(&report, state.grid.cols()),
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

/// Read notifications line by line and queue them. Returns the line count.
fn feed(input: Box<dyn BufRead + Send>, tx: BatchSender) -> io::Result<usize> {
    let mut count = 0;
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let params = match serde_json::from_str::<Value>(&line) {
            Ok(value) => notification_params(value),
            Err(e) => {
                warn!(line = lineno + 1, "skipping malformed line: {}", e);
                continue;
            },
        };
        let Some(params) = params else {
            warn!(line = lineno + 1, "skipping line that is not a redraw notification");
            continue;
        };
        if tx.send_notification(&params).is_err() {
            break;
        }
        count += 1;
    }
    Ok(count)
}

/// Extract the parameter list of a redraw notification
fn notification_params(value: Value) -> Option<Vec<Value>> {
    let Value::Array(items) = value else {
        return None;
    };
    let is_message = items.len() == 3
        && items[0].as_u64() == Some(2)
        && items[1].as_str() == Some("redraw");
    if is_message {
        let mut items = items;
        match items.pop() {
            Some(Value::Array(params)) => Some(params),
            _ => None,
        }
    } else {
        Some(items)
    }
}

/// Nobody is listening for requests in a replay; log them
struct LogClient;

impl UiClient for LogClient {
    fn resize(&mut self, rows: usize, cols: usize) {
        debug!(rows, cols, "resize requested");
    }

    fn send_keys(&mut self, keys: &str) {
        debug!(keys, "keys");
    }

    fn send_mouse(&mut self, input: &MouseInput) {
        debug!(
            button = input.button.as_str(),
            action = input.action.as_str(),
            row = input.row,
            col = input.col,
            "mouse"
        );
    }
}

#[derive(Default)]
struct StatsSink {
    uploads: usize,
}

impl DrawSink for StatsSink {
    fn upload(&mut self, vertices: &[Vertex], _reallocate: bool) {
        self.uploads += bytemuck::cast_slice::<Vertex, u8>(vertices).len();
    }

    fn draw(&mut self, _vertex_count: usize) {}
}

#[derive(Debug, Default, Serialize)]
struct Report {
    ticks: usize,
    batches: usize,
    applied: usize,
    skipped: usize,
    /// Bytes handed to the sink
    uploaded: usize,
    frames: Vec<FrameStats>,
    title: String,
    screen: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FrameStats {
    tick: usize,
    vertices: usize,
    quads: usize,
    reallocated: bool,
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_text(report: &Report, cols: usize) {
    println!(
        "Replayed {} batches in {} ticks ({} events applied, {} skipped)",
        report.batches, report.ticks, report.applied, report.skipped
    );
    for frame in &report.frames {
        println!(
            "tick {:>5}: {:>7} vertices {:>6} quads{}",
            frame.tick,
            frame.vertices,
            frame.quads,
            if frame.reallocated { " (realloc)" } else { "" }
        );
    }
    println!("Uploaded {} bytes", report.uploaded);
    if !report.title.is_empty() {
        println!("Title: {}", report.title);
    }
    println!("{}", "-".repeat(cols));
    for line in &report.screen {
        println!("{}", line);
    }
    println!("{}", "-".repeat(cols));
}

fn print_help() {
    println!("Gridray Replay Harness");
    println!();
    println!("Usage: gridray-replay [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Load configuration from PATH");
    println!("  -f, --file <PATH>    Read notifications from file");
    println!("  -j, --json           Print the report as JSON");
    println!("  -t, --text           Print the report as text (default)");
    println!("      --fast           Tick without sleeping, with a fixed step");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Each line holds one redraw notification as JSON.");
    println!();
    println!("Examples:");
    println!("  gridray-replay --fast session.ndjson");
    println!("  RUST_LOG=debug gridray-replay --json < session.ndjson");
}
