use std::io::{self, BufRead as _};

use tracing_subscriber::EnvFilter;
use usage_history::{Config, FetchOutcome, Surface, UsageHistory, android};

struct Terminal;

impl Surface for Terminal {
    fn render(&mut self, items: Vec<String>) {
        for item in items {
            println!("{item}");
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn set_request_visible(&mut self, visible: bool) {
        if visible {
            eprintln!("[grant usage access, then press enter]");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::detect().unwrap();
    let platform = android::platform(&config).unwrap();
    let mut history = UsageHistory::new(config, platform, Terminal);

    let mut outcome = history.fetch();
    while matches!(outcome, FetchOutcome::PermissionDenied | FetchOutcome::DeviceLocked) {
        let token = history.initiate_grant_request().unwrap();

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).unwrap() == 0 {
            return;
        }

        outcome = history.on_grant_flow_completed(token).unwrap();
    }
}
