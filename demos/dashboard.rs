//! Dashboard wiring example
//!
//! Run with: cargo run --example dashboard
//!
//! Set `RUST_LOG=mediator_bus=debug` to see every delivery.
//!
//! Wires three components through one mediator:
//!
//! - `Clock` declares `system:start` and publishes it once
//! - `Logger` subscribes to `system:start` and prints what it receives
//! - `Dashboard` (a system component) watches components come and go
//!
//! Then prints the pub/sub status and the most recent activity.

use std::rc::Rc;

use mediator_bus::{
    ActivityKind, ComponentDescriptor, Mediator, MediatorConfig, Publication, COMPONENT_REGISTERED,
    COMPONENT_UNREGISTERED, SYSTEM_CHANNEL,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mediator_bus=info")),
        )
        .init();

    let mediator = Mediator::with_config(MediatorConfig::default().log_capacity(100));

    let dashboard = Rc::new(
        ComponentDescriptor::builder("Dashboard", "sys_dashboard")
            .description("Shows which components are live")
            .subscribe(SYSTEM_CHANNEL, COMPONENT_REGISTERED)
            .subscribe(SYSTEM_CHANNEL, COMPONENT_UNREGISTERED)
            .on_event(|envelope| {
                println!(
                    "[dashboard] {} -> {}",
                    envelope.event,
                    envelope.data["code"].as_str().unwrap_or("?")
                );
                Ok(())
            })
            .build(),
    );
    mediator.register(dashboard.clone());

    let logger = Rc::new(
        ComponentDescriptor::builder("Logger", "log1")
            .description("Prints system start events")
            .subscribe("system", "start")
            .on_event(|envelope| {
                println!(
                    "[logger] {} from {} at {}",
                    envelope.key(),
                    envelope.component_name,
                    envelope.data["timestamp"]
                );
                Ok(())
            })
            .build(),
    );
    mediator.register(logger.clone());

    let clock = Rc::new(
        ComponentDescriptor::builder("Clock", "clk1")
            .description("Announces when the application started")
            .publish(
                Publication::new("system", "start")
                    .description("The application clock started")
                    .condition("Once, after the first render")
                    .data_format("{timestamp: ISO-8601 string}")
                    .example(json!({ "timestamp": "2024-01-01T00:00:00Z" })),
            )
            .build(),
    );
    mediator.register(clock.clone());

    mediator.publish(
        "Clock",
        "clk1",
        "system",
        "start",
        json!({ "timestamp": chrono::Utc::now().to_rfc3339() }),
        chrono::Utc::now().timestamp_millis(),
    );

    // Refused: system components stay for the process lifetime
    mediator.unregister(dashboard.as_ref());
    mediator.unregister(logger.as_ref());

    println!(
        "\npub/sub status:\n{}",
        serde_json::to_string_pretty(&mediator.get_pub_sub_status())?
    );

    let recent = mediator.get_logs_by_types(
        &[ActivityKind::Register, ActivityKind::Unregister, ActivityKind::Publish],
        1,
        5,
    );
    println!("\nlatest {} of {} entries:", recent.logs.len(), recent.total);
    for entry in &recent.logs {
        println!("  {:>12} @ {}", entry.kind, entry.timestamp);
    }

    Ok(())
}
