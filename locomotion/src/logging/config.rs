use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Subsystems that can be filtered independently, e.g. `LOCOMOTION_LOG="warn,teleport=debug"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogScope {
    Input,
    Comfort,
    Locomotion,
    Teleport,
}

impl LogScope {
    pub fn as_str(self) -> &'static str {
        match self {
            LogScope::Input => "input",
            LogScope::Comfort => "comfort",
            LogScope::Locomotion => "locomotion",
            LogScope::Teleport => "teleport",
        }
    }
}

impl fmt::Display for LogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" => Ok(LogScope::Input),
            "comfort" => Ok(LogScope::Comfort),
            "locomotion" | "smooth" => Ok(LogScope::Locomotion),
            "teleport" | "arc" => Ok(LogScope::Teleport),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<LogScope, Level>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    pub fn from_env(env_var_name: &str) -> Self {
        match std::env::var(env_var_name) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::new(),
        }
    }

    /// Parse a comma separated list of `level` and `scope=level` entries.
    /// Unknown scopes and levels are skipped.
    pub fn parse(config_str: &str) -> Self {
        let mut config = Self::new();

        for part in config_str.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((scope, level)) => {
                    if let (Ok(scope), Some(level)) = (scope.trim().parse(), parse_level(level)) {
                        config.scope_levels.insert(scope, level);
                    }
                }
                None => {
                    if let Some(level) = parse_level(part) {
                        config.global_level = level;
                    }
                }
            }
        }

        config
    }

    pub fn should_log(&self, scope: LogScope, level: Level) -> bool {
        let target_level = self.scope_levels.get(&scope).unwrap_or(&self.global_level);
        level <= *target_level
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: LogScope, level: Level) {
        self.scope_levels.insert(scope, level);
    }

    /// Most verbose level any scope can emit at
    pub fn max_level(&self) -> Level {
        self.scope_levels
            .values()
            .copied()
            .fold(self.global_level, Level::max)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Install the fmt subscriber and read per-scope levels from `env_var_name`.
/// Safe to call more than once; only the first call takes effect.
pub fn init_logging(env_var_name: &str) -> LogConfig {
    init_logging_with(LogConfig::from_env(env_var_name))
}

/// Install the fmt subscriber for an explicit config. `RUST_LOG`, when set,
/// still decides what the subscriber lets through.
pub fn init_logging_with(config: LogConfig) -> LogConfig {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(config.max_level()).into())
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    super::set_log_config(config.clone());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_level() {
        let config = LogConfig::parse("debug");
        assert_eq!(config.global_level, Level::DEBUG);
        assert!(config.scope_levels.is_empty());
    }

    #[test]
    fn test_parse_scope_levels() {
        let config = LogConfig::parse("warn, teleport=debug,input=trace,bogus=info");

        assert_eq!(config.global_level, Level::WARN);
        assert_eq!(config.scope_levels.get(&LogScope::Teleport), Some(&Level::DEBUG));
        assert_eq!(config.scope_levels.get(&LogScope::Input), Some(&Level::TRACE));
        assert_eq!(config.scope_levels.len(), 2);
    }

    #[test]
    fn test_should_log() {
        let mut config = LogConfig::new();
        config.set_scope_level(LogScope::Comfort, Level::DEBUG);

        assert!(config.should_log(LogScope::Locomotion, Level::WARN));
        assert!(!config.should_log(LogScope::Locomotion, Level::INFO));

        assert!(config.should_log(LogScope::Comfort, Level::DEBUG));
        assert!(!config.should_log(LogScope::Comfort, Level::TRACE));
    }

    #[test]
    fn test_max_level_covers_scopes() {
        let mut config = LogConfig::new();
        assert_eq!(config.max_level(), Level::WARN);

        config.set_scope_level(LogScope::Teleport, Level::DEBUG);
        config.set_scope_level(LogScope::Input, Level::ERROR);
        assert_eq!(config.max_level(), Level::DEBUG);
    }
}
