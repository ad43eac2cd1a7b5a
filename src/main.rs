mod config;
mod dispatch;
mod error;
mod ingress;
mod pairing;

use crate::config::ServiceConfig;
use dispatch::{DeadLetter, Dispatcher};
use ingress::BusListener;
use pairing::handlers::DeviceDeletedHandler;
use pairing::{InMemoryPairingRecordStore, StoreDeleteOperation};
use pairing_shared::{Address, PairingRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServiceConfig::from_env()?;
    info!("Pairing device service starting");
    info!("  Bus listen address: {}", config.listen_addr);

    let store = Arc::new(InMemoryPairingRecordStore::new());
    if config.seed_demo_records {
        seed_demo_records(&store).await;
        info!("  Seeded {} demo pairing records", store.len().await);
    }

    // One delete capability shared by every cleanup handler
    let deleter = Arc::new(StoreDeleteOperation::new(store.clone()));

    let (dead_tx, dead_rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher::new().with_dead_letters(dead_tx);
    dispatcher.register(
        DeviceDeletedHandler::source_pattern(),
        DeviceDeletedHandler::MESSAGE_TYPE,
        Arc::new(DeviceDeletedHandler::new(store.clone(), deleter.clone())),
    );
    info!("Registered {} message routes", dispatcher.route_count());

    tokio::spawn(drain_dead_letters(dead_rx));

    let listener = BusListener::bind(config.listen_addr, Arc::new(dispatcher)).await?;

    tokio::select! {
        result = listener.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// Log every message a handler gave up on
async fn drain_dead_letters(mut rx: mpsc::UnboundedReceiver<DeadLetter>) {
    while let Some(letter) = rx.recv().await {
        warn!(
            handler = letter.handler,
            source = %letter.message.source(),
            message_type = letter.message.message_type(),
            reason = %letter.reason,
            "Dead letter"
        );
    }
}

/// A single place with two devices, one of them paired twice
async fn seed_demo_records(store: &InMemoryPairingRecordStore) {
    let place = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
    let bound = Address::driver_device("abcd").representation();
    let other = Address::driver_device("zzzz").representation();

    store
        .insert(PairingRecord::new(place, 1, "PROT:ZIGB:0001").with_device_address(&bound))
        .await;
    store
        .insert(PairingRecord::new(place, 2, "PROT:ZIGB:0002").with_device_address(&other))
        .await;
    store
        .insert(PairingRecord::new(place, 3, "PROT:ZIGB:0001").with_device_address(&bound))
        .await;
    store
        .insert(PairingRecord::new(place, 4, "PROT:ZWAV:0004"))
        .await;
}
