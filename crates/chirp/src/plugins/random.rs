use std::sync::Mutex;

use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Plugin, PluginInput, PluginOutput};

/// Range used when `RANDOM_NUMBER` has no args.
const DEFAULT_RANGE: (i64, i64) = (0, 100);

/// Plugin returning a random integer from an inclusive `min-max` range.
///
/// Each evaluation of the plugin draws a new number, so two tokens in one
/// template draw from the generator in document order.
#[derive(Debug)]
pub struct RandomNumber {
    rng: Mutex<StdRng>,
}

impl RandomNumber {
    /// Create a plugin seeded from system entropy.
    pub fn new() -> Self {
        RandomNumber {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a plugin with a fixed seed, producing a repeatable sequence.
    pub fn seeded(seed: u64) -> Self {
        RandomNumber {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomNumber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for RandomNumber {
    async fn call(&self, input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
        let (min, max) = match input.args {
            Some(args) => parse_range(args)?,
            None => DEFAULT_RANGE,
        };
        let value = self
            .rng
            .lock()
            .map_err(|_| anyhow!("random number generator lock poisoned"))?
            .gen_range(min..=max);
        Ok(PluginOutput::Text(value.to_string()))
    }
}

/// Parse `min-max`. A leading `-` belongs to `min`.
fn parse_range(args: &str) -> anyhow::Result<(i64, i64)> {
    let args = args.trim();
    let split = args
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-')
        .map(|(index, _)| index)
        .with_context(|| format!("expected 'min-max', got '{args}'"))?;
    let (min, max) = (&args[..split], &args[split + 1..]);
    let min: i64 = min
        .trim()
        .parse()
        .with_context(|| format!("'{min}' is not an integer"))?;
    let max: i64 = max
        .trim()
        .parse()
        .with_context(|| format!("'{max}' is not an integer"))?;
    if min > max {
        bail!("empty range {min}-{max}");
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::parse_range;

    #[test]
    fn parses_ranges() {
        assert_eq!(parse_range("1-6").unwrap(), (1, 6));
        assert_eq!(parse_range(" -5-5 ").unwrap(), (-5, 5));
        assert_eq!(parse_range("-10--2").unwrap(), (-10, -2));
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(parse_range("6-1").is_err());
        assert!(parse_range("six").is_err());
        assert!(parse_range("1-x").is_err());
    }
}
