use super::main::GameWatch;
use crate::clock::Moment;
use crate::dispatcher::worker::Dispatcher;
use crate::error::RunError;
use crate::game_watch::core::{init, transition, Effect, Event, LogLevel, StopReason};
use crate::sampler::{SampleError, Sampler};
use std::collections::VecDeque;

impl GameWatch {
    /// Runs until a stop is requested or the frame source gives out.
    /// A user stop is `Ok`; running out of frames is `Err`.
    pub fn run(self) -> Result<StopReason, RunError> {
        let started = Moment::now();

        self.frame_source.start()?;

        let mut sampler = Sampler::new(
            self.frame_source.clone(),
            self.image_classifier.clone(),
            self.config.sample_interval,
            started.instant,
        );

        let outcome_sender = self.event_sender.clone();
        let dispatcher = Dispatcher::spawn(
            self.report_sink.clone(),
            self.config.category_names.clone(),
            self.config.logger_timezone,
            self.logger.clone(),
            move |verdict, result| {
                let _ = outcome_sender.send(Event::DispatchDone { verdict, result });
            },
        );

        let _ = self.logger.info(&format!(
            "Sampling every {:?}, reporting every {:?}",
            self.config.sample_interval, self.config.window_horizon
        ));

        let (mut model, effects) = init(&self.config, started.instant);
        let mut stop = None;
        for effect in effects {
            self.run_effect(effect, &dispatcher, &mut stop);
        }

        let result = loop {
            if let Some(reason) = stop.take() {
                break Ok(reason);
            }

            let event = match self.event_receiver.recv() {
                Ok(event) => event,
                Err(_) => break Err(RunError::ChannelClosed),
            };

            let mut queue = sample_then(&mut sampler, event);

            while let Some(event) = queue.pop_front() {
                let (next, effects) = transition(&self.config, model, event);
                model = next;
                for effect in effects {
                    if let Some(followup) = self.run_effect(effect, &dispatcher, &mut stop) {
                        queue.push_back(followup);
                    }
                }
            }
        };

        if let Err(e) = self.frame_source.stop() {
            let _ = self.logger.warn(&format!("Frame source did not stop cleanly: {}", e));
        }
        dispatcher.shutdown(self.config.dispatch_grace_period);

        // Outcomes that landed during the grace period.
        while let Ok(event) = self.event_receiver.try_recv() {
            if let Event::DispatchDone { .. } = event {
                let (next, effects) = transition(&self.config, model, event);
                model = next;
                for effect in effects {
                    if let Effect::Log(level, message) = effect {
                        let _ = match level {
                            LogLevel::Info => self.logger.info(&message),
                            LogLevel::Warn => self.logger.warn(&message),
                            LogLevel::Error => self.logger.error(&message),
                        };
                    }
                }
            }
        }

        let _ = self.logger.info(&format!(
            "Closed {} windows, last reported category {:?}",
            model.windows_closed,
            model.detector.state().last_dispatched_category
        ));

        match result? {
            StopReason::Requested => Ok(StopReason::Requested),
            StopReason::SourceExhausted(e) => Err(RunError::SourceExhausted(e)),
        }
    }
}

/// Sample before checking the window so a sample taken on the boundary tick
/// lands in the window being closed.
pub(super) fn sample_then(sampler: &mut Sampler, event: Event) -> VecDeque<Event> {
    let mut queue = VecDeque::new();
    if let Event::Tick(now) = &event {
        match sampler.tick(*now) {
            Ok(Some(observation)) => queue.push_back(Event::Sampled(observation)),
            Ok(None) => {}
            Err(SampleError::Classification(e)) => queue.push_back(Event::SampleFailed(e)),
            Err(SampleError::SourceExhausted(e)) => queue.push_back(Event::SourceExhausted(e)),
        }
    }
    queue.push_back(event);
    queue
}
