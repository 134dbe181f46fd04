use std::sync::Arc;

use tonbox::{
    audio::output::{AudioOutput, RodioOutput},
    config::Config,
    event::events::Event,
    hw::console::{self, ConsolePanel, ConsoleRotary},
    input::InputDispatcher,
    ui::app::App,
    util::{hook::set_panic_hook, log::init_logging},
    volume::VolumeMonitor,
};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    set_panic_hook();
    let _log_guard = init_logging()?;

    let config = Config::from_env();
    let (event_tx, event_rx) = flume::unbounded();

    // The cpal stream is not Send; it lives here for the whole run.
    let stream = RodioOutput::open_stream()?;
    let output: Arc<dyn AudioOutput> = Arc::new(RodioOutput::new(&stream));

    let dispatcher = Arc::new(InputDispatcher::new(
        config.timing.button_debounce,
        config.timing.event_cooldown,
        event_tx.clone(),
    ));
    let rotary = ConsoleRotary::new();
    console::spawn_key_reader(dispatcher, rotary.clone(), event_tx.clone());

    let monitor = VolumeMonitor::new(
        Box::new(rotary),
        output.clone(),
        &config.volume,
        config.timing.volume_poll,
    );
    let volume_task = tokio::spawn(monitor.run());

    spawn_signal_listener(event_tx.clone());

    let display = ConsolePanel::new()?;
    let mut app = App::new(config, Box::new(display), output, event_tx, event_rx);
    let result = app.run().await;

    volume_task.abort();
    result
}

/// Termination requests funnel into the event loop so shutdown always
/// takes the same orderly path.
fn spawn_signal_listener(events: flume::Sender<Event>) {
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};
        let (Ok(mut term), Ok(mut int)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            return;
        };
        tokio::select! {
            _ = term.recv() => {}
            _ = int.recv() => {}
        }
        let _ = events.send(Event::Shutdown);
    });
}
