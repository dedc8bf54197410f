use game_reporter::config::Config;
use game_reporter::frame_source::impl_fake::FrameSourceFake;
use game_reporter::frame_source::impl_image_dir::FrameSourceImageDir;
use game_reporter::frame_source::interface::FrameSource;
use game_reporter::game_watch::main::GameWatch;
use game_reporter::image_classifier::impl_fake::ImageClassifierFake;
use game_reporter::library::logger::impl_console::LoggerConsole;
use game_reporter::library::logger::interface::Logger;
use game_reporter::report_sink::impl_fake::ReportSinkFake;
use game_reporter::report_sink::impl_http::ReportSinkHttp;
use game_reporter::report_sink::interface::ReportSink;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let frame_source: Arc<dyn FrameSource + Send + Sync> = match &config.frame_dir {
        Some(dir) => match FrameSourceImageDir::new(dir, logger.clone()) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                let _ = logger.error(&format!("Cannot open frames: {}", e));
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(FrameSourceFake::new(logger.clone())),
    };

    let image_classifier = Arc::new(ImageClassifierFake::new(
        config.category_names.keys().copied().collect(),
        logger.clone(),
    ));

    let report_sink: Arc<dyn ReportSink + Send + Sync> = match &config.report_endpoint {
        Some(endpoint) if !config.dry_run => Arc::new(ReportSinkHttp::new(
            endpoint,
            config.report_timeout,
            logger.clone(),
        )),
        _ => Arc::new(ReportSinkFake::new(logger.clone())),
    };

    let game_watch = GameWatch::new(
        config,
        logger.clone(),
        frame_source,
        image_classifier,
        report_sink,
    );

    match game_watch.run() {
        Ok(_) => {
            let _ = logger.info("Stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let _ = logger.error(&format!("Terminated: {}", e));
            ExitCode::FAILURE
        }
    }
}
