pub mod change_detector;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod frame_source;
pub mod game_watch;
pub mod image_classifier;
pub mod library;
pub mod report_sink;
pub mod sampler;
pub mod window_aggregator;
