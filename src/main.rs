use embassy_executor::Spawner;
use embassy_sync::channel::Channel;
use log::{error, info};
use lumen_panel::console;
use lumen_panel::controller::WidgetController;
use lumen_panel::provider::PanelProvider;
use lumen_panel::state::WidgetStore;
use lumen_panel::system::{CommandRouter, PanelConfig, ViewChannel, WidgetCommandChannel};
use std::path::PathBuf;
use std::sync::Arc;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    info!("Starting control panel");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = WidgetStore::new();
    let views: Arc<ViewChannel> = Arc::new(Channel::new());
    let mut router = CommandRouter::new();

    for id in &config.widget_ids {
        let commands = router.register(id.clone());
        let controller = WidgetController::new(
            id.clone(),
            store.clone(),
            config.fetch_timeout(),
            config.guard_timeout(),
        );

        if spawner
            .spawn(widget_task(
                controller,
                config.build_provider(),
                commands,
                Arc::clone(&views),
            ))
            .is_err()
        {
            error!("Failed to spawn task for {}", id);
        }
    }

    info!(
        "{} widgets running, reading JSON commands from stdin",
        config.widget_ids.len()
    );

    // Blocking stdin reads stay off the executor thread
    std::thread::spawn(move || {
        let routed = console::read_commands(std::io::stdin().lock(), &router);
        info!("Console closed after {} commands", routed);
    });

    loop {
        let view = views.receive().await;
        if let Err(e) = console::write_view(&mut std::io::stdout().lock(), &view) {
            error!("Failed to render {}: {:#}", view.id, e);
        }
    }
}

fn load_config() -> anyhow::Result<PanelConfig> {
    match std::env::args_os().nth(1) {
        Some(path) => PanelConfig::load(&PathBuf::from(path)),
        None => {
            info!("No config given, using defaults");
            Ok(PanelConfig::default())
        }
    }
}

// One task per widget; pool size matches MAX_WIDGETS
#[embassy_executor::task(pool_size = 8)]
async fn widget_task(
    mut controller: WidgetController,
    provider: PanelProvider,
    commands: Arc<WidgetCommandChannel>,
    views: Arc<ViewChannel>,
) {
    info!("Widget task started for {}", controller.id());
    controller.run(&provider, &commands, &views).await
}
