//! Real-time temperature monitoring example
//!
//! Run with: cargo run --example temperature_monitor

use std::time::Duration;

use volcano_ble::{Result, Temperature, VolcanoSession};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (minimal)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("Volcano Temperature Monitor");
    println!("===========================\n");
    println!("Looking for a Volcano...\n");

    let session = VolcanoSession::with_default_adapter().await?;
    session.discover_and_connect().await?;

    println!("Connected ({})", session.connection_state());
    println!("Firmware: {}", session.read_firmware_version().await?);
    println!("Serial:   {}", session.read_serial_number().await?);
    println!("Press Ctrl+C to exit.\n");

    // Monitor loop
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nExiting...");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(4)) => {
                display_status(&session).await;
            }
        }
    }

    session.disconnect_if_needed().await;

    Ok(())
}

async fn display_status(session: &VolcanoSession) {
    let current = session.read_current_temperature().await;
    let target = session.read_target_temperature().await;
    let state = session.read_heat_air_state().await;

    match (current, target, state) {
        (Ok(current), Ok(target), Ok(state)) => {
            println!(
                "chamber {:6} ({:3}°F) | target {:6} | {}",
                current.to_string(),
                current.as_fahrenheit(),
                target.to_string(),
                state
            );
            if current >= target - Temperature::from_tenths(5) {
                println!("  -> at temperature");
            }
        }
        (current, target, state) => {
            eprintln!(
                "read failed (chamber: {:?}, target: {:?}, state: {:?})",
                current, target, state
            );
        }
    }
}
