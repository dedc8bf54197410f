use crate::change_detector::{ChangeDetector, DispatchDecision};
use crate::clock::Moment;
use crate::config::Config;
use crate::dispatcher::worker::DispatchResult;
use crate::error::{ClassificationError, FrameSourceError};
use crate::sampler::Observation;
use crate::window_aggregator::{FilterPolicy, Verdict, WindowAggregator};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    Requested,
    SourceExhausted(FrameSourceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Stopped(StopReason),
}

#[derive(Debug, Clone)]
pub struct Model {
    pub status: Status,
    pub aggregator: WindowAggregator,
    pub detector: ChangeDetector,
    pub windows_closed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Tick(Moment),
    Sampled(Observation),
    SampleFailed(ClassificationError),
    SourceExhausted(FrameSourceError),
    DispatchDone {
        verdict: Verdict,
        result: DispatchResult,
    },
    DispatchSuperseded(Verdict),
    StopRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubscribeTick,
    SubscribeStopKey,
    Dispatch(Verdict),
    Log(LogLevel, String),
    Stop(StopReason),
}

pub fn init(config: &Config, started_at: Instant) -> (Model, Vec<Effect>) {
    let policy = FilterPolicy {
        confidence_threshold: config.confidence_threshold,
        ignored_categories: config.ignored_categories.clone(),
    };

    let mut effects = vec![Effect::SubscribeTick];
    if config.stop_key.is_some() {
        effects.push(Effect::SubscribeStopKey);
    }

    (
        Model {
            status: Status::Running,
            aggregator: WindowAggregator::new(policy, config.window_horizon, started_at),
            detector: ChangeDetector::new(),
            windows_closed: 0,
        },
        effects,
    )
}

fn log(level: LogLevel, message: String) -> Effect {
    Effect::Log(level, message)
}

pub fn transition(config: &Config, mut model: Model, event: Event) -> (Model, Vec<Effect>) {
    let running = model.status == Status::Running;

    match event {
        // Outcomes of deliveries already under way still count after a stop.
        Event::DispatchDone { verdict, result } => {
            model
                .detector
                .record_outcome(verdict.category_id, result.is_ok());
            let name = config.category_name(verdict.category_id);
            let effect = match result {
                Ok(_) => log(
                    LogLevel::Info,
                    format!("Now reporting {} ({})", name, verdict.category_id),
                ),
                Err(e) => log(
                    LogLevel::Warn,
                    format!(
                        "Could not report {} ({}): {}; waiting for the next window to confirm it",
                        name, verdict.category_id, e
                    ),
                ),
            };
            (model, vec![effect])
        }
        Event::DispatchSuperseded(verdict) => {
            model.detector.record_superseded(verdict.category_id);
            (model, vec![])
        }

        _ if !running => (model, vec![]),

        Event::Sampled(observation) => {
            let effect = if model.aggregator.absorb(observation) {
                log(
                    LogLevel::Info,
                    format!(
                        "Observed {} ({}) confidence={:.3}",
                        config.category_name(observation.category_id),
                        observation.category_id,
                        observation.confidence
                    ),
                )
            } else {
                log(
                    LogLevel::Info,
                    format!(
                        "Ignored {} ({}) confidence={:.3}",
                        config.category_name(observation.category_id),
                        observation.category_id,
                        observation.confidence
                    ),
                )
            };
            (model, vec![effect])
        }
        Event::SampleFailed(e) => {
            (model, vec![log(LogLevel::Warn, format!("No sample this tick: {}", e))])
        }
        Event::SourceExhausted(e) => {
            let reason = StopReason::SourceExhausted(e.clone());
            model.status = Status::Stopped(reason.clone());
            (
                model,
                vec![
                    log(LogLevel::Error, format!("Stopping: {}", e)),
                    Effect::Stop(reason),
                ],
            )
        }
        Event::StopRequested => {
            model.status = Status::Stopped(StopReason::Requested);
            (
                model,
                vec![
                    log(LogLevel::Info, "Stop requested".to_string()),
                    Effect::Stop(StopReason::Requested),
                ],
            )
        }
        Event::Tick(now) => {
            if !model.aggregator.boundary_reached(now.instant) {
                return (model, vec![]);
            }

            let sampled = model.aggregator.window().buffer.len();
            let verdict = model.aggregator.close_window(now);
            model.windows_closed += 1;

            let effects = match model.detector.evaluate(verdict) {
                DispatchDecision::Skip => vec![log(
                    LogLevel::Info,
                    "Window closed with no eligible observations".to_string(),
                )],
                DispatchDecision::SkipSameState(v) => vec![log(
                    LogLevel::Info,
                    format!(
                        "Still {} ({}), nothing to report",
                        config.category_name(v.category_id),
                        v.category_id
                    ),
                )],
                DispatchDecision::SkipPending(v) => vec![log(
                    LogLevel::Info,
                    format!(
                        "{} ({}) is already on its way",
                        config.category_name(v.category_id),
                        v.category_id
                    ),
                )],
                DispatchDecision::Dispatch(v) => vec![
                    log(
                        LogLevel::Info,
                        format!(
                            "Window verdict {} ({}) confidence={:.3} from {} observations",
                            config.category_name(v.category_id),
                            v.category_id,
                            v.confidence,
                            sampled
                        ),
                    ),
                    Effect::Dispatch(v),
                ],
            };
            (model, effects)
        }
    }
}
