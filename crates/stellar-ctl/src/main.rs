// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Control CLI
//!
//! CLI tool for interacting with stellar-gateway.
//!
//! Usage:
//!   stellar-ctl <command> [options]
//!
//! Commands:
//!   schedule --p-id <n> --patient <name> --date <YYYY-MM-DD> --time <HH:MM>
//!   cancel <appointment_id>
//!   today
//!   all
//!   demo                          Schedule, list, cancel, list again

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::{Value, json};

fn print_usage() {
    eprintln!(
        r#"Usage: stellar-ctl <command> [options]

Interact with stellar-gateway.

COMMANDS:
    schedule                        Schedule an appointment
    cancel <appointment_id>         Cancel an appointment
    today                           List today's appointments
    all                             List all appointments
    demo                            Run the scripted walkthrough

SCHEDULE OPTIONS:
    --p-id <n>                      Patient ID (required)
    --patient <name>                Patient name (required)
    --date <YYYY-MM-DD>             Appointment date (required)
    --time <HH:MM>                  Appointment time (required)

ENVIRONMENT:
    STELLAR_GATEWAY_URL             Gateway base URL (default: http://127.0.0.1:5678)

EXAMPLES:
    stellar-ctl schedule --p-id 7 --patient "John Doe" --date 2025-02-25 --time 10:00
    stellar-ctl cancel 1
    stellar-ctl all
"#
    );
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Schedule {
        p_id: i64,
        patient: String,
        date: String,
        time: String,
    },
    Cancel {
        appointment_id: i64,
    },
    Today,
    All,
    Demo,
}

fn parse_args_from_vec(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => Ok(Command::Help),
        "schedule" => {
            let mut p_id: Option<i64> = None;
            let mut patient: Option<String> = None;
            let mut date: Option<String> = None;
            let mut time: Option<String> = None;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--p-id" => {
                        i += 1;
                        let value = args.get(i).ok_or("--p-id requires a value")?;
                        p_id = Some(
                            value
                                .parse()
                                .map_err(|_| format!("Invalid patient ID: {}", value))?,
                        );
                    }
                    "--patient" => {
                        i += 1;
                        patient = Some(args.get(i).ok_or("--patient requires a name")?.clone());
                    }
                    "--date" => {
                        i += 1;
                        date = Some(args.get(i).ok_or("--date requires a value")?.clone());
                    }
                    "--time" => {
                        i += 1;
                        time = Some(args.get(i).ok_or("--time requires a value")?.clone());
                    }
                    arg => return Err(format!("Unknown argument: {}", arg)),
                }
                i += 1;
            }

            Ok(Command::Schedule {
                p_id: p_id.ok_or("--p-id is required")?,
                patient: patient.ok_or("--patient is required")?,
                date: date.ok_or("--date is required")?,
                time: time.ok_or("--time is required")?,
            })
        }
        "cancel" => {
            let value = args.get(2).ok_or("cancel requires an appointment ID")?;
            let appointment_id = value
                .parse()
                .map_err(|_| format!("Invalid appointment ID: {}", value))?;
            Ok(Command::Cancel { appointment_id })
        }
        "today" => Ok(Command::Today),
        "all" => Ok(Command::All),
        "demo" => Ok(Command::Demo),
        cmd => Err(format!("Unknown command: {}", cmd)),
    }
}

/// Thin HTTP wrapper around the gateway endpoints.
struct GatewayClient {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayClient {
    fn from_env() -> Self {
        let base_url = std::env::var("STELLAR_GATEWAY_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5678".to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        read_reply(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;
        read_reply(response).await
    }

    async fn schedule(&self, p_id: i64, patient: &str, date: &str, time: &str) -> Result<Value> {
        self.post(
            "/schedule",
            &json!({ "p_id": p_id, "patient": patient, "date": date, "time": time }),
        )
        .await
    }

    async fn cancel(&self, appointment_id: i64) -> Result<Value> {
        self.post("/cancel", &json!({ "appointment_id": appointment_id }))
            .await
    }
}

/// JSON bodies are returned for 2xx and 400; anything else is an error.
async fn read_reply(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    match serde_json::from_str(&text) {
        Ok(value) if status.is_success() || status == reqwest::StatusCode::BAD_REQUEST => {
            Ok(value)
        }
        _ => anyhow::bail!("gateway returned {}: {}", status, text),
    }
}

fn pretty_print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute_command(client: &GatewayClient, cmd: Command) -> Result<()> {
    match cmd {
        Command::Help => print_usage(),
        Command::Schedule {
            p_id,
            patient,
            date,
            time,
        } => pretty_print(&client.schedule(p_id, &patient, &date, &time).await?)?,
        Command::Cancel { appointment_id } => pretty_print(&client.cancel(appointment_id).await?)?,
        Command::Today => pretty_print(&client.get("/view_today").await?)?,
        Command::All => pretty_print(&client.get("/view_all").await?)?,
        Command::Demo => run_demo(client).await?,
    }
    Ok(())
}

async fn run_demo(client: &GatewayClient) -> Result<()> {
    println!("Scheduling an appointment for John Doe on 2025-02-25 at 10:00");
    let scheduled = client.schedule(7, "John Doe", "2025-02-25", "10:00").await?;
    pretty_print(&scheduled)?;

    println!("\nViewing today's appointments:");
    pretty_print(&client.get("/view_today").await?)?;

    println!("\nViewing all scheduled appointments:");
    pretty_print(&client.get("/view_all").await?)?;

    if let Some(appointment_id) = scheduled.get("appointment_id").and_then(Value::as_i64) {
        println!("\nCanceling appointment with ID {}", appointment_id);
        pretty_print(&client.cancel(appointment_id).await?)?;
    }

    println!("\nViewing all appointments after cancellation:");
    pretty_print(&client.get("/view_all").await?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let cmd = match parse_args_from_vec(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let client = GatewayClient::from_env();

    match execute_command(&client, cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_command() {
        let result = parse_args_from_vec(&args(&["stellar-ctl"]));
        assert_eq!(result.unwrap_err(), "No command specified");
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "today"])),
            Ok(Command::Today)
        );
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "all"])),
            Ok(Command::All)
        );
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "demo"])),
            Ok(Command::Demo)
        );
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "--help"])),
            Ok(Command::Help)
        );
    }

    #[test]
    fn test_parse_schedule() {
        let cmd = parse_args_from_vec(&args(&[
            "stellar-ctl",
            "schedule",
            "--p-id",
            "7",
            "--patient",
            "John Doe",
            "--date",
            "2025-02-25",
            "--time",
            "10:00",
        ]))
        .unwrap();

        assert_eq!(
            cmd,
            Command::Schedule {
                p_id: 7,
                patient: "John Doe".to_string(),
                date: "2025-02-25".to_string(),
                time: "10:00".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_schedule_missing_option() {
        let result = parse_args_from_vec(&args(&[
            "stellar-ctl",
            "schedule",
            "--p-id",
            "7",
            "--patient",
            "John Doe",
            "--date",
            "2025-02-25",
        ]));
        assert_eq!(result.unwrap_err(), "--time is required");
    }

    #[test]
    fn test_parse_schedule_bad_patient_id() {
        let result = parse_args_from_vec(&args(&["stellar-ctl", "schedule", "--p-id", "seven"]));
        assert_eq!(result.unwrap_err(), "Invalid patient ID: seven");
    }

    #[test]
    fn test_parse_cancel() {
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "cancel", "42"])),
            Ok(Command::Cancel { appointment_id: 42 })
        );
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "cancel"])).unwrap_err(),
            "cancel requires an appointment ID"
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "reschedule"])).unwrap_err(),
            "Unknown command: reschedule"
        );
        assert_eq!(
            parse_args_from_vec(&args(&["stellar-ctl", "schedule", "--room", "3"])).unwrap_err(),
            "Unknown argument: --room"
        );
    }
}
