//! JumpQueue CLI - Command-line interface for the JumpQueue daemon

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "jumpqueue")]
#[command(about = "JumpQueue access code CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "JUMPQUEUE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a normal-lane code for a visitor token
    Issue {
        /// Token handed to the visitor at registration
        token: String,
    },

    /// Issue a VIP-lane code for a visitor token
    Vip {
        token: String,
    },

    /// Return the visitor's pending code, issuing one if needed
    Lookup {
        #[arg(short, long)]
        queue: String,

        /// Identity document number
        #[arg(short, long)]
        identificator: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Show an access code with a fresh estimate
    Show {
        access_code_id: String,
    },

    /// Show the code currently at the desk
    Attending {
        queue: String,
    },

    /// List access codes
    Search {
        #[arg(short, long)]
        queue: Option<String>,

        #[arg(short, long, value_enum)]
        lane: Option<LaneArg>,

        #[arg(short, long)]
        identificator: Option<String>,

        #[arg(short, long, value_enum, default_value = "any")]
        status: StatusArg,
    },

    /// Store a code as given, e.g. to seed the VIP lane
    Seed {
        #[arg(short, long)]
        queue: String,

        /// Ticket number, 1..=999
        #[arg(short, long)]
        code: i64,

        #[arg(short, long, value_enum, default_value = "priority")]
        lane: LaneArg,
    },

    /// Delete an access code
    Delete {
        access_code_id: String,
    },

    /// Queue administration
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
}

#[derive(Subcommand)]
enum QueueCommands {
    /// Show a queue
    Show { queue: String },

    /// Create a queue
    Create {
        queue: String,

        #[arg(short, long)]
        name: String,

        /// Lower bound for every wait estimate
        #[arg(short, long, default_value = "0")]
        min_wait_minutes: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LaneArg {
    Normal,
    Priority,
}

impl LaneArg {
    fn as_wire(self) -> &'static str {
        match self {
            LaneArg::Normal => "NORMAL",
            LaneArg::Priority => "PRIORITY",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Any,
    Unconsumed,
    InService,
    Completed,
}

impl StatusArg {
    fn as_wire(self) -> &'static str {
        match self {
            StatusArg::Any => "ANY",
            StatusArg::Unconsumed => "UNCONSUMED",
            StatusArg::InService => "IN_SERVICE",
            StatusArg::Completed => "COMPLETED",
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct AccessCode {
    access_code_id: String,
    queue_id: String,
    ticket: String,
    lane: String,
    state: String,
    name: String,
    estimated_at: i64,
}

#[derive(Deserialize)]
struct Queue {
    queue_id: String,
    name: String,
    min_wait_minutes: i64,
}

#[derive(Deserialize)]
struct IssuedCode {
    access_code: AccessCode,
    queue: Queue,
}

#[derive(Deserialize)]
struct SearchResult {
    count: usize,
    access_codes: Vec<AccessCode>,
}

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "Ticket")]
    ticket: String,
    #[tabled(rename = "Lane")]
    lane: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Holder")]
    name: String,
    #[tabled(rename = "Estimated")]
    estimated: String,
    #[tabled(rename = "Queue")]
    queue: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<AccessCode> for CodeRow {
    fn from(code: AccessCode) -> Self {
        Self {
            estimated: format_time(code.estimated_at),
            ticket: code.ticket,
            lane: code.lane,
            state: code.state,
            name: code.name,
            queue: code.queue_id,
            id: code.access_code_id,
        }
    }
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "Queue")]
    queue_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Min wait (min)")]
    min_wait_minutes: i64,
}

impl From<Queue> for QueueRow {
    fn from(queue: Queue) -> Self {
        Self {
            queue_id: queue.queue_id,
            name: queue.name,
            min_wait_minutes: queue.min_wait_minutes,
        }
    }
}

fn format_time(epoch_ms: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_issued(headline: &str, issued: IssuedCode) {
    println!("{}", headline.green().bold());
    println!();
    println!(
        "  {} {}",
        "Ticket:".bold(),
        issued.access_code.ticket.as_str().cyan().bold()
    );
    println!(
        "  {} {} ({})",
        "Queue:".bold(),
        issued.queue.name,
        issued.queue.queue_id
    );
    println!("  {} {}", "Lane:".bold(), issued.access_code.lane);
    println!(
        "  {} {}",
        "Estimated:".bold(),
        format_time(issued.access_code.estimated_at)
    );
    println!("  {} {}", "ID:".bold(), issued.access_code.access_code_id);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Issue { token } => {
            let result =
                call_rpc(&cli.rpc_url, "accesscode.issue.v1", json!({ "token": token })).await?;
            print_issued("✓ Access code issued", serde_json::from_value(result)?);
        }

        Commands::Vip { token } => {
            let result = call_rpc(
                &cli.rpc_url,
                "accesscode.issue_vip.v1",
                json!({ "token": token }),
            )
            .await?;
            print_issued("✓ VIP access code issued", serde_json::from_value(result)?);
        }

        Commands::Lookup {
            queue,
            identificator,
            email,
            phone,
        } => {
            let params = json!({
                "queue_id": queue,
                "identificator": identificator,
                "email": email,
                "phone": phone,
            });

            let result = call_rpc(&cli.rpc_url, "accesscode.lookup.v1", params).await?;
            print_issued("✓ Access code", serde_json::from_value(result)?);
        }

        Commands::Show { access_code_id } => {
            let params = json!({ "access_code_id": access_code_id });
            let result = call_rpc(&cli.rpc_url, "accesscode.get.v1", params).await?;
            print_issued("Access code", serde_json::from_value(result)?);
        }

        Commands::Attending { queue } => {
            let params = json!({ "queue_id": queue });
            let result = call_rpc(&cli.rpc_url, "accesscode.attending.v1", params).await?;
            print_issued("Now attending", serde_json::from_value(result)?);
        }

        Commands::Search {
            queue,
            lane,
            identificator,
            status,
        } => {
            let params = json!({
                "queue_id": queue,
                "lane": lane.map(LaneArg::as_wire),
                "identificator": identificator,
                "status": status.as_wire(),
            });

            let result = call_rpc(&cli.rpc_url, "accesscode.search.v1", params).await?;
            let found: SearchResult = serde_json::from_value(result)?;

            if found.count == 0 {
                println!("{}", "No access codes found".yellow());
            } else {
                let rows: Vec<CodeRow> = found.access_codes.into_iter().map(Into::into).collect();
                println!("{}", Table::new(rows));
                println!("{} code(s)", found.count);
            }
        }

        Commands::Seed { queue, code, lane } => {
            let params = json!({
                "queue_id": queue,
                "code": code,
                "lane": lane.as_wire(),
            });

            let result = call_rpc(&cli.rpc_url, "accesscode.save.v1", params).await?;
            let saved: AccessCode = serde_json::from_value(result)?;

            println!(
                "{}",
                format!("✓ {} lane seeded at {}", saved.lane, saved.ticket)
                    .green()
                    .bold()
            );
        }

        Commands::Delete { access_code_id } => {
            let params = json!({ "access_code_id": access_code_id });
            call_rpc(&cli.rpc_url, "accesscode.delete.v1", params).await?;

            println!(
                "{}",
                format!("✓ Access code {} deleted", access_code_id)
                    .green()
                    .bold()
            );
        }

        Commands::Queue { command } => match command {
            QueueCommands::Show { queue } => {
                let result =
                    call_rpc(&cli.rpc_url, "queue.get.v1", json!({ "queue_id": queue })).await?;
                let queue: Queue = serde_json::from_value(result)?;
                println!("{}", Table::new(vec![QueueRow::from(queue)]));
            }

            QueueCommands::Create {
                queue,
                name,
                min_wait_minutes,
            } => {
                let params = json!({
                    "queue_id": queue,
                    "name": name,
                    "min_wait_minutes": min_wait_minutes,
                });

                let result = call_rpc(&cli.rpc_url, "queue.create.v1", params).await?;
                let queue: Queue = serde_json::from_value(result)?;

                println!("{}", "✓ Queue created".green().bold());
                println!();
                println!("{}", Table::new(vec![QueueRow::from(queue)]));
            }
        },
    }

    Ok(())
}
