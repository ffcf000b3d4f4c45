use overlay_bridge::{Bridge, DelayConfig, MockConfig};
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Deserialize)]
struct PlayerData {
    id: u32,
    name: String,
}

#[tokio::main]
async fn main() -> overlay_bridge::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // No host native invoker is installed, so the bridge runs standalone
    let bridge = Bridge::builder().build()?;
    log::info!("Standalone: {}", bridge.is_standalone());

    let _visibility = bridge.subscribe(
        "setVisible",
        |visible: bool| log::info!("setVisible -> {}", visible),
        MockConfig::new().with_data(true).with_delay(Duration::from_millis(1000)),
    );

    let player = bridge.stateful_request::<PlayerData, ()>(
        "getPlayerData",
        |player| log::info!("Loaded player: {:?}", player),
        MockConfig::new().with_data(PlayerData {
            id: 7,
            name: "Ada".to_string(),
        }),
    );
    if let Err(e) = player.invoke(None).await {
        log::error!("getPlayerData failed: {}", e);
    }
    log::info!("getPlayerData state: {:?}", player.state());

    let close = bridge.fire_and_forget::<()>(
        "closeUI",
        DelayConfig::new().with_delay(Duration::from_millis(200)),
    );
    if let Err(e) = close.invoke(None).await {
        log::error!("closeUI failed: {}", e);
    }

    tokio::time::sleep(Duration::from_millis(1200)).await;
    log::info!("Demo finished");
    Ok(())
}
