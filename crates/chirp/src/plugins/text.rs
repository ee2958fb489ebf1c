use anyhow::Context;

use super::{LOWERCASE, STOPWATCH, UPPERCASE, required_args};
use crate::types::{PluginInput, PluginOutput};

pub(super) fn uppercase(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    let args = required_args(UPPERCASE, input.args)?;
    Ok(PluginOutput::Text(args.to_uppercase()))
}

pub(super) fn lowercase(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    let args = required_args(LOWERCASE, input.args)?;
    Ok(PluginOutput::Text(args.to_lowercase()))
}

/// Format a number of seconds as e.g. `1h 2min 3s`.
pub(super) fn stopwatch(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    let args = required_args(STOPWATCH, input.args)?.trim();
    let seconds: f64 = args
        .parse()
        .with_context(|| format!("'{args}' is not a number of seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        anyhow::bail!("'{args}' is not a number of seconds");
    }
    Ok(PluginOutput::Text(format_duration(seconds.floor() as u64)))
}

fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds.div_euclid(3600);
    let minutes = (total_seconds % 3600).div_euclid(60);
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}min"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1min");
        assert_eq!(format_duration(3723), "1h 2min 3s");
        assert_eq!(format_duration(7200), "2h");
    }
}
