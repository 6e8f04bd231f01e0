//! `wrench` — operator CLI for the wrench server.
//!
//! Lists machines and active notifications, and triggers a sweep by hand —
//! handy for local testing without waiting on the external scheduler.

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::{ApiClient, ApiConfig};

#[derive(Parser)]
#[command(author, version, about = "Wrench maintenance-tracker CLI")]
struct Cli {
  /// Base URL of the wrench server.
  #[arg(long, default_value = "http://127.0.0.1:5480")]
  base_url: String,

  /// Basic-auth username; leave empty to skip auth.
  #[arg(long, default_value = "")]
  username: String,

  /// Basic-auth password.
  #[arg(long, default_value = "")]
  password: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List all machines.
  Machines,
  /// List active notifications, most urgent first.
  Notifications,
  /// Trigger a sweep and print the summary.
  Sweep {
    /// Shared secret, if the server has one configured.
    #[arg(long)]
    secret: Option<String>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let client = ApiClient::new(ApiConfig {
    base_url: cli.base_url,
    username: cli.username,
    password: cli.password,
  })?;

  match cli.command {
    Command::Machines => {
      let machines = client.list_machines().await?;
      if machines.is_empty() {
        println!("no machines");
        return Ok(());
      }
      for m in machines {
        println!(
          "{}  {}  serial={}  notice={}h  operating={}h",
          m.machine_id, m.name, m.serial_number, m.notice_hours,
          m.operating_hours,
        );
      }
    }

    Command::Notifications => {
      let notifications = client.list_notifications().await?;
      if notifications.is_empty() {
        println!("no active notifications");
        return Ok(());
      }
      for n in notifications {
        println!(
          "{}  {:?}  {:?}  item={}  since={}",
          n.notification_id,
          n.urgency,
          n.category,
          n.item_id,
          n.triggered_at.format("%Y-%m-%d %H:%M"),
        );
      }
    }

    Command::Sweep { secret } => {
      let summary = client.run_sweep(secret.as_deref()).await?;
      println!(
        "checked {} machine(s), created {} notification(s)",
        summary["machines_checked"], summary["notifications_created"],
      );
      if let Some(details) = summary["details"].as_array() {
        for d in details {
          println!(
            "  {}: {} created",
            d["machine_name"].as_str().unwrap_or("?"),
            d["notifications_created"],
          );
        }
      }
    }
  }

  Ok(())
}
