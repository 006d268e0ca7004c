use clap::Parser;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Investor name shown on the dashboard and payout documents
    pub name: String,

    #[arg(short, long)]
    pub amount: f64,

    /// Total run length, e.g. 90s or 2m
    #[arg(short, long, value_parser = parse_duration, default_value = "90s")]
    pub time: Duration,

    /// Interval between candles
    #[arg(long, value_parser = parse_duration, default_value = "1s")]
    pub tick: Duration,

    /// Interval between progress updates; must divide the tick interval
    #[arg(long, value_parser = parse_duration, default_value = "100ms")]
    pub progress_interval: Duration,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pick the target once per run instead of on every tick
    #[arg(long)]
    pub fixed_target: bool,

    #[arg(long, default_value_t = crate::generator::DEFAULT_VOLATILITY)]
    pub volatility: f64,

    /// Log candles instead of drawing the dashboard
    #[arg(long)]
    pub headless: bool,

    /// With --headless, print every candle as a JSON line
    #[arg(long, requires = "headless")]
    pub json: bool,
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    if let Some(stripped) = s.strip_suffix("ms") {
        let num = u64::from_str(stripped).map_err(|e| e.to_string())?;
        Ok(Duration::from_millis(num))
    } else if let Some(stripped) = s.strip_suffix('s') {
        let num = u64::from_str(stripped).map_err(|e| e.to_string())?;
        Ok(Duration::from_secs(num))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let num = u64::from_str(stripped).map_err(|e| e.to_string())?;
        Ok(Duration::from_secs(num * 60))
    } else if let Some(stripped) = s.strip_suffix('h') {
        let num = u64::from_str(stripped).map_err(|e| e.to_string())?;
        Ok(Duration::from_secs(num * 3600))
    } else {
        Err("Invalid duration format. Use formats like 500ms, 1s, 3m, or 1h.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("3m"), Ok(Duration::from_secs(180)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("90").is_err());
        assert!(parse_duration("xs").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["candlesim", "Asha", "-a", "1000"]).unwrap();
        assert_eq!(args.name, "Asha");
        assert_eq!(args.amount, 1000.0);
        assert_eq!(args.time, Duration::from_secs(90));
        assert_eq!(args.tick, Duration::from_secs(1));
        assert_eq!(args.progress_interval, Duration::from_millis(100));
        assert_eq!(args.seed, None);
        assert!(!args.fixed_target);
        assert!(!args.headless);
    }

    #[test]
    fn test_json_requires_headless() {
        assert!(Args::try_parse_from(["candlesim", "Asha", "-a", "1", "--json"]).is_err());
        let args =
            Args::try_parse_from(["candlesim", "Asha", "-a", "1", "--headless", "--json"]).unwrap();
        assert!(args.json);
    }
}
