use anyhow::Context;
use clap::{Parser, Subcommand};
use dapr_outcome::{
    EventPublisher, Outcome, SidecarConfig, SidecarServices, StateStore, logging,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(
    name = "dapr-outcome",
    about = "Publish events and manage state through a Dapr sidecar"
)]
struct Args {
    #[arg(short, long, env = "DAPR_OUTCOME_CONFIG", default_value = "dapr.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish a JSON payload to a topic
    Publish {
        pubsub: String,
        topic: String,
        payload: String,
    },
    /// Read a state value
    Get { store: String, key: String },
    /// Save a JSON state value
    Set {
        store: String,
        key: String,
        value: String,
    },
    /// Delete a state value
    Delete { store: String, key: String },
    /// Check that the sidecar is reachable
    Health,
}

fn parse_json(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("Not valid JSON: {}", raw))
}

/// Prints the outcome and reports whether it succeeded.
fn report<T: Serialize>(outcome: &Outcome<T>) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(outcome.is_ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let args = Args::parse();

    let config = SidecarConfig::from_file_or_default(&args.config)?.resolve();
    let services = SidecarServices::new(config);

    let succeeded = match args.command {
        Command::Publish {
            pubsub,
            topic,
            payload,
        } => {
            let payload = parse_json(&payload)?;
            report(&services.publisher()?.publish(&pubsub, &topic, &payload).await)?
        }
        Command::Get { store, key } => {
            let outcome: Outcome<Value> = services.state_store()?.get(&store, &key).await;
            report(&outcome)?
        }
        Command::Set { store, key, value } => {
            let value = parse_json(&value)?;
            report(&services.state_store()?.set(&store, &key, &value).await)?
        }
        Command::Delete { store, key } => {
            report(&services.state_store()?.delete(&store, &key).await)?
        }
        Command::Health => {
            services.client()?.health().await?;
            println!("sidecar at {} is healthy", services.config().endpoint());
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
