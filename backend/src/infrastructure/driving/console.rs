use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::application::detection::{SessionController, SessionView};
use crate::domain::{CameraFacing, SessionOutcome, SessionPhase};

/// One line of kiosk input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Hold,
    Release,
    /// Empty line: hold when idle, release when holding.
    Toggle,
    Flip,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => Self::Toggle,
            "h" | "hold" => Self::Hold,
            "r" | "release" => Self::Release,
            "f" | "flip" => Self::Flip,
            "q" | "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub fn render(view: &SessionView) -> String {
    let mut line = match view.phase {
        SessionPhase::Idle => "ready, hold to scan".to_string(),
        SessionPhase::Active if view.labels.is_empty() => "scanning...".to_string(),
        SessionPhase::Active => format!("scanning: {}", view.labels.join(", ")),
        SessionPhase::Finalizing => "classifying...".to_string(),
        SessionPhase::Settled => match &view.outcome {
            Some(SessionOutcome::Classified { text }) => text.clone(),
            Some(SessionOutcome::Failed { message }) => format!("error: {}", message),
            None => String::new(),
        },
    };
    if let Some(notice) = &view.notice {
        line.push_str(&format!(" [{}]", notice));
    }
    line
}

/// Print every view change until the controller goes away.
pub fn spawn_printer(mut views: watch::Receiver<SessionView>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let line = render(&views.borrow_and_update());
            println!("{}", line);
        }
    })
}

/// Drive the controller from line-based input until `quit` or end of input.
pub async fn run<R>(controller: &SessionController, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut facing = CameraFacing::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Hold => {
                controller.start().await;
            }
            ConsoleCommand::Release => {
                controller.stop().await;
            }
            ConsoleCommand::Toggle => {
                if controller.snapshot().phase == SessionPhase::Active {
                    controller.stop().await;
                } else {
                    controller.start().await;
                }
            }
            ConsoleCommand::Flip => {
                let next = facing.toggled();
                match controller.switch_facing(next).await {
                    Ok(()) => facing = next,
                    Err(e) => warn!("could not switch camera: {}", e),
                }
            }
            ConsoleCommand::Quit => break,
            ConsoleCommand::Unknown(command) => warn!("unknown command {:?}", command),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::application::detection::testing::{det, ScriptedDetector, StaticFrames};
    use crate::application::detection::{
        ClassificationCoordinator, ControllerSettings, LabelMergePolicy, ScoreSideEffect,
    };
    use crate::application::ports::{FrameSource, MockClassificationPort};

    fn controller(frames: Arc<StaticFrames>) -> SessionController {
        let mut classifier = MockClassificationPort::new();
        classifier
            .expect_classify()
            .returning(|_| Ok("Bottle: Recyclables".into()));
        let coordinator = ClassificationCoordinator::new(
            frames.clone(),
            Arc::new(classifier),
            LabelMergePolicy::default(),
            Duration::from_secs(1),
        );
        SessionController::new(
            frames,
            Arc::new(ScriptedDetector::new(vec![Ok(vec![det("bottle", 0.9)])])),
            coordinator,
            ScoreSideEffect::disabled(),
            ControllerSettings::default(),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Toggle);
        assert_eq!(ConsoleCommand::parse(" Hold "), ConsoleCommand::Hold);
        assert_eq!(ConsoleCommand::parse("f"), ConsoleCommand::Flip);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Quit);
        assert_eq!(
            ConsoleCommand::parse("dance"),
            ConsoleCommand::Unknown("dance".into())
        );
    }

    #[test]
    fn test_render_settled_and_notice() {
        let mut view = SessionView::idle();
        view.phase = SessionPhase::Settled;
        view.outcome = Some(SessionOutcome::Classified {
            text: "Can: Recyclables".into(),
        });
        assert_eq!(render(&view), "Can: Recyclables");

        view.phase = SessionPhase::Active;
        view.labels = vec!["can".into(), "cup".into()];
        view.notice = Some("camera unavailable: unplugged".into());
        assert_eq!(render(&view), "scanning: can, cup [camera unavailable: unplugged]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_release_settles_session() {
        let controller = controller(Arc::new(StaticFrames::default()));
        let mut views = controller.subscribe();

        run(&controller, &b"hold\nrelease\nquit\nhold\n"[..]).await.unwrap();

        let settled = tokio::time::timeout(
            Duration::from_secs(5),
            views.wait_for(|v| v.phase == SessionPhase::Settled),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(
            settled.outcome,
            Some(SessionOutcome::Classified {
                text: "Bottle: Recyclables".into()
            })
        );
        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_flip_switches_camera() {
        let frames = Arc::new(StaticFrames::default());
        let controller = controller(frames.clone());

        run(&controller, &b"flip\n"[..]).await.unwrap();
        assert_eq!(frames.capture().await.unwrap().facing(), CameraFacing::Front);
    }
}
