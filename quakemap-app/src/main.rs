use anyhow::Context as _;
use crossbeam_channel::{unbounded, Receiver};
use quakemap::{
    feed::client::{FeedClient, FeedEvent},
    runtime::{self, spawners::TokioSpawner, AsyncHandle},
    ui::UiMapExt,
    MapConfig, QuakeMap,
};

/// Environment variable holding the Mapbox access token
const TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    runtime::init_runtime(Box::new(TokioSpawner::with_handle(
        tokio::runtime::Handle::current(),
    )));

    let mut config = MapConfig::default();
    match std::env::var(TOKEN_VAR) {
        Ok(token) => config = config.with_access_token(token),
        Err(_) => log::warn!("{} is not set, base map tiles will fail to load", TOKEN_VAR),
    }

    let map = QuakeMap::new(config.clone()).context("failed to build the map")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Earthquakes of the past week"),
        ..Default::default()
    };

    eframe::run_native(
        "quakemap-app",
        options,
        Box::new(move |cc| Box::new(QuakeApp::new(cc, map, &config))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with an error: {}", e))
}

struct QuakeApp {
    map: QuakeMap,
    events: Receiver<FeedEvent>,
    /// Kept so the fetches are not detached from the app's lifetime
    _fetches: Vec<Box<dyn AsyncHandle>>,
}

impl QuakeApp {
    fn new(cc: &eframe::CreationContext<'_>, map: QuakeMap, config: &MapConfig) -> Self {
        let (tx, events) = unbounded();
        let ctx = cc.egui_ctx.clone();

        let fetches = FeedClient::new().spawn_all(config, move |event: FeedEvent| {
            if tx.send(event).is_err() {
                log::debug!("viewer closed before a feed arrived");
            }
            ctx.request_repaint();
        });

        Self {
            map,
            events,
            _fetches: fetches,
        }
    }
}

impl eframe::App for QuakeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in self.events.try_iter() {
            let kind = event.kind;
            if let Err(e) = self.map.apply_feed_event(event) {
                log::error!("could not apply {} feed: {}", kind, e);
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.quake_map(&mut self.map);
            });
    }
}
