use super::main::GameWatch;
use crate::clock::Moment;
use crate::dispatcher::worker::Dispatcher;
use crate::game_watch::core::{Effect, Event, LogLevel, StopReason};
use std::io::BufRead;

impl GameWatch {
    /// Carries out one effect. Returns an event that has to be fed straight
    /// back into the loop, if the effect produced one.
    pub(super) fn run_effect(
        &self,
        effect: Effect,
        dispatcher: &Dispatcher,
        stop: &mut Option<StopReason>,
    ) -> Option<Event> {
        match effect {
            Effect::SubscribeTick => {
                let tick_rate = self.config.tick_rate;
                let event_sender = self.event_sender.clone();
                std::thread::spawn(move || loop {
                    std::thread::sleep(tick_rate);
                    if event_sender.send(Event::Tick(Moment::now())).is_err() {
                        break;
                    }
                });
                None
            }
            Effect::SubscribeStopKey => {
                let stop_key = self.config.stop_key.clone()?;
                let event_sender = self.event_sender.clone();
                let _ = self
                    .logger
                    .info(&format!("Type '{}' and press enter to stop", stop_key));
                std::thread::spawn(move || {
                    for line in std::io::stdin().lock().lines() {
                        match line {
                            Ok(line) if line.trim() == stop_key => {
                                let _ = event_sender.send(Event::StopRequested);
                                break;
                            }
                            Ok(_) => continue,
                            Err(_) => break,
                        }
                    }
                });
                None
            }
            Effect::Dispatch(verdict) => dispatcher.submit(verdict).map(Event::DispatchSuperseded),
            Effect::Log(level, message) => {
                let _ = match level {
                    LogLevel::Info => self.logger.info(&message),
                    LogLevel::Warn => self.logger.warn(&message),
                    LogLevel::Error => self.logger.error(&message),
                };
                None
            }
            Effect::Stop(reason) => {
                *stop = Some(reason);
                None
            }
        }
    }
}
