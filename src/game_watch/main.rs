use crate::config::Config;
use crate::frame_source::interface::FrameSource;
use crate::game_watch::core::Event;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::report_sink::interface::ReportSink;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Wires the ports to the sampling, windowing and reporting loop.
pub struct GameWatch {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub frame_source: Arc<dyn FrameSource + Send + Sync>,
    pub image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    pub report_sink: Arc<dyn ReportSink + Send + Sync>,
    pub event_sender: Sender<Event>,
    pub event_receiver: Receiver<Event>,
}

/// Asks a running [`GameWatch`] to stop from another thread.
#[derive(Clone)]
pub struct StopHandle {
    event_sender: Sender<Event>,
}

impl StopHandle {
    /// Returns false if the run has already ended.
    pub fn request_stop(&self) -> bool {
        self.event_sender.send(Event::StopRequested).is_ok()
    }
}

impl GameWatch {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        frame_source: Arc<dyn FrameSource + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        report_sink: Arc<dyn ReportSink + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        Self {
            config,
            logger: logger.with_namespace("game_watch"),
            frame_source,
            image_classifier,
            report_sink,
            event_sender,
            event_receiver,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            event_sender: self.event_sender.clone(),
        }
    }
}
