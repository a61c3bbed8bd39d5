use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use chaos_calculator::http::{rpc_path, OperationRequest, X_REQUEST_TIMEOUT_MS};
use chaos_calculator::Operation;

#[derive(Parser)]
#[command(name = "calc-cli")]
#[command(about = "Client and load driver for the chaos calculator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:11211")]
    url: String,

    /// Per-call deadline sent to the server
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform a single operation
    Invoke {
        #[arg(value_enum)]
        op: OpArg,
        #[arg(allow_hyphen_values = true)]
        a: i64,
        #[arg(allow_hyphen_values = true)]
        b: i64,
    },
    /// Call every operation in a loop from many workers
    Load {
        #[arg(long, default_value_t = 100)]
        workers: usize,
        /// Run time in seconds
        #[arg(long, default_value_t = 30)]
        duration: u64,
        #[arg(long, default_value_t = 18, allow_hyphen_values = true)]
        a: i64,
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        b: i64,
        /// Pause after each round of four calls, in milliseconds
        #[arg(long, default_value_t = 1000)]
        pause_ms: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OpArg {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl From<OpArg> for Operation {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Add => Operation::Add,
            OpArg::Subtract => Operation::Subtract,
            OpArg::Multiply => Operation::Multiply,
            OpArg::Divide => Operation::Divide,
        }
    }
}

/// Status counts per operation, keyed by HTTP status or `transport_error`.
type Tally = BTreeMap<&'static str, BTreeMap<String, u64>>;

#[derive(Serialize)]
struct LoadSummary {
    workers: usize,
    duration_secs: f64,
    rounds: u64,
    operations: Tally,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Invoke { op, a, b } => {
            let res = call(&client, &cli.url, cli.timeout_ms, op.into(), a, b).await?;
            print_response(res).await?;
        }
        Commands::Load {
            workers,
            duration,
            a,
            b,
            pause_ms,
        } => {
            let started = Instant::now();
            let deadline = started + Duration::from_secs(duration);
            let pause = Duration::from_millis(pause_ms);

            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let client = client.clone();
                let url = cli.url.clone();
                let timeout_ms = cli.timeout_ms;
                handles.push(tokio::spawn(async move {
                    run_worker(client, url, timeout_ms, deadline, pause, a, b).await
                }));
            }

            let mut summary = LoadSummary {
                workers,
                duration_secs: 0.0,
                rounds: 0,
                operations: Tally::new(),
            };
            for handle in handles {
                let (rounds, tally) = handle.await?;
                summary.rounds += rounds;
                for (op, statuses) in tally {
                    let merged = summary.operations.entry(op).or_default();
                    for (status, count) in statuses {
                        *merged.entry(status).or_default() += count;
                    }
                }
            }
            summary.duration_secs = started.elapsed().as_secs_f64();

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

async fn run_worker(
    client: reqwest::Client,
    url: String,
    timeout_ms: Option<u64>,
    deadline: Instant,
    pause: Duration,
    a: i64,
    b: i64,
) -> (u64, Tally) {
    let mut tally = Tally::new();
    let mut rounds = 0;

    while Instant::now() < deadline {
        for op in Operation::ALL {
            let outcome = match call(&client, &url, timeout_ms, op, a, b).await {
                Ok(res) => res.status().as_u16().to_string(),
                Err(_) => "transport_error".to_string(),
            };
            *tally
                .entry(op.as_str())
                .or_default()
                .entry(outcome)
                .or_default() += 1;
        }
        rounds += 1;
        tokio::time::sleep(pause).await;
    }

    (rounds, tally)
}

async fn call(
    client: &reqwest::Client,
    url: &str,
    timeout_ms: Option<u64>,
    op: Operation,
    a: i64,
    b: i64,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut req = client
        .post(format!("{}{}", url.trim_end_matches('/'), rpc_path(op)))
        .json(&OperationRequest { a, b });
    if let Some(ms) = timeout_ms {
        req = req.header(X_REQUEST_TIMEOUT_MS, ms.to_string());
    }
    req.send().await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: calculator returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
