use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use trashcam_server::application::detection::{
    ClassificationCoordinator, ScoreSideEffect, SecondarySource, SessionController,
};
use trashcam_server::application::ports::{Detector, FrameSource};
use trashcam_server::config::AppConfig;
use trashcam_server::domain::{ActorId, CameraFacing};
use trashcam_server::infrastructure::driven::{
    HttpClassificationClient, HttpRecognitionDetector, HttpScoreStore, ImageDirectoryFrameSource,
    ServerEndpoint,
};
use trashcam_server::infrastructure::driving::console;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    let kiosk = &config.kiosk;
    let pipeline = &config.pipeline;

    let endpoint = ServerEndpoint::new(&kiosk.server_url, pipeline.classification_timeout())?;
    let frames: Arc<dyn FrameSource> = Arc::new(ImageDirectoryFrameSource::new(
        &kiosk.frames_dir,
        CameraFacing::default(),
    ));
    let recognizer: Arc<dyn Detector> = Arc::new(HttpRecognitionDetector::new(endpoint.clone()));

    let mut coordinator = ClassificationCoordinator::new(
        frames.clone(),
        Arc::new(HttpClassificationClient::new(endpoint.clone())),
        pipeline.merge_policy(),
        pipeline.classification_timeout(),
    );
    if kiosk.secondary_recognition {
        coordinator = coordinator.with_secondary(SecondarySource {
            detector: recognizer.clone(),
            confidence_threshold: pipeline.secondary_threshold,
        });
    }

    let (score, actor) = match (&kiosk.token, &kiosk.actor_id) {
        (Some(token), Some(actor)) => {
            let actor = ActorId::parse(actor).map_err(anyhow::Error::msg)?;
            let store = HttpScoreStore::new(endpoint.clone(), token.clone());
            (ScoreSideEffect::new(Arc::new(store)), Some(actor))
        }
        _ => (ScoreSideEffect::disabled(), None),
    };

    let controller = SessionController::new(
        frames,
        recognizer,
        coordinator,
        score,
        pipeline.controller_settings(),
    );
    controller.set_actor(actor).await;

    let printer = console::spawn_printer(controller.subscribe());
    println!("enter: hold/release, f: flip camera, q: quit");

    console::run(&controller, BufReader::new(tokio::io::stdin()))
        .await
        .context("console loop failed")?;

    controller.shutdown().await;
    drop(controller);
    let _ = tokio::time::timeout(Duration::from_millis(200), printer).await;
    Ok(())
}
