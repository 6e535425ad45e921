use std::{path::Path, time::SystemTime};
use listmq_models::errors::SendableError;

pub fn format_line(level: log::Level, target: &str, message: &std::fmt::Arguments<'_>) -> String {
    format!(
        "[{} {} {}] {}",
        humantime::format_rfc3339_seconds(SystemTime::now()),
        level,
        target,
        message
    )
}

/// Log to stdout and, when `log_file` is given, append to that file too.
pub fn setup_logger(level: log::LevelFilter, log_file: Option<&Path>) -> Result<(), SendableError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(record.level(), record.target(), message)
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
