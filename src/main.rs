use anyhow::Result;
use solace::assistant::{AssistantClient, AssistantPipeline, ClientConfig};
use solace::messages::Role;
use solace::session::{SessionConfig, SessionController, SessionEvent};
use solace::speech::{CaptureConfig, Narrator, NullSynthesizer, UnsupportedRecognizer};
use std::io::BufRead;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solace=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Solace companion chat");

    let client_config = ClientConfig::default();

    // Informational startup probe; the session works (and fails per turn)
    // either way
    {
        let client = AssistantClient::new(client_config.clone())?;
        let runtime = tokio::runtime::Runtime::new()?;
        match runtime.block_on(client.check_health()) {
            Ok(()) => info!("Assistant service is reachable"),
            Err(e) => warn!("Assistant service health check failed: {}", e),
        }
    }

    let pipeline = AssistantPipeline::new(client_config);
    let assistant_tx = pipeline.command_sender();
    let assistant_rx = pipeline.event_receiver();
    let worker = pipeline.start_worker()?;

    // The terminal frontend ships without platform speech engines; voice
    // input surfaces a notice and replies stay text-only
    let (_capture_tx, capture_rx) = CaptureConfig::default().event_channel();
    let recognizer = Box::new(UnsupportedRecognizer::new());
    let narrator = Narrator::new(Box::new(NullSynthesizer::new()));

    let mut controller = SessionController::new(
        SessionConfig::default(),
        assistant_tx,
        assistant_rx,
        recognizer,
        capture_rx,
        narrator,
    );
    let events = controller.event_receiver();
    controller.initialize();

    // Read stdin on its own thread so the poll loop never blocks
    let (input_tx, input_rx) = crossbeam_channel::bounded::<String>(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    println!("Type a message and press enter. Commands: /voice, /quit");

    let mut rendered = 0;
    let mut thinking_shown = false;

    'session: loop {
        while let Ok(line) = input_rx.try_recv() {
            match line.trim() {
                "/quit" => break 'session,
                "/voice" => {
                    if let Err(e) = controller.toggle_voice_input() {
                        println!("! {}", e.user_message());
                    }
                }
                text => {
                    if let Err(e) = controller.submit_user_text(text) {
                        println!("! {}", e.user_message());
                    }
                }
            }
        }

        controller.poll();

        for event in events.try_iter() {
            if event == SessionEvent::HistoryChanged {
                let messages = controller.message_log().get_all();
                for message in &messages[rendered..] {
                    let speaker = match message.role {
                        Role::User => "you",
                        Role::Assistant => "solace",
                    };
                    println!("[{}] {}: {}", message.timestamp.format("%H:%M"), speaker, message.content);
                }
                rendered = messages.len();
            }
        }

        let typing = controller.typing_visible();
        if typing && !thinking_shown {
            println!("(solace is thinking...)");
        }
        thinking_shown = typing;

        std::thread::sleep(Duration::from_millis(50));
    }

    controller.shutdown();
    if worker.join().is_err() {
        warn!("Assistant worker did not shut down cleanly");
    }

    info!("Session ended");
    Ok(())
}
