//! Runtime knobs for the nest dispatcher and its reference interpreter.
use crate::engine::{DEFAULT_DEPTH_LIMIT, DEFAULT_STEP_LIMIT};
use crate::nest::{AXIS_BATTERY, AXIS_WHOLE};
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestConfig {
    /// Consult and fill the memo cache. Off means every call recomputes.
    pub cache: bool,
    /// Axis of the nest arm inside the `van` core.
    pub nest_arm: u64,
    /// Axis of `van` that goes into the cache key; 1 keys on all of it.
    ///
    /// Any narrower axis lets two `van`s that agree on that slot share cache
    /// entries, so only narrow it when the rest of `van` cannot change the
    /// answer. A `van` without this axis is keyed whole.
    pub key_axis: u64,
    pub step_limit: usize,
    pub depth_limit: usize,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            cache: true,
            nest_arm: AXIS_BATTERY,
            key_axis: AXIS_WHOLE,
            step_limit: DEFAULT_STEP_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl NestConfig {
    /// Defaults overridden by `NEST_CACHE`, `NEST_ARM`, `NEST_KEY_AXIS`,
    /// `NEST_STEP_LIMIT` and `NEST_DEPTH_LIMIT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = lookup("NEST_CACHE") {
            match parse_flag(&v) {
                Some(flag) => config.cache = flag,
                None => warn!(value = %v, "ignoring unrecognised NEST_CACHE"),
            }
        }
        config.nest_arm = read_axis(&lookup, "NEST_ARM", config.nest_arm);
        config.key_axis = read_axis(&lookup, "NEST_KEY_AXIS", config.key_axis);
        config.step_limit = read_num(&lookup, "NEST_STEP_LIMIT", config.step_limit);
        config.depth_limit = read_num(&lookup, "NEST_DEPTH_LIMIT", config.depth_limit);
        config
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_nest_arm(mut self, axis: u64) -> Self {
        self.nest_arm = axis;
        self
    }

    pub fn with_key_axis(mut self, axis: u64) -> Self {
        self.key_axis = axis;
        self
    }

    pub fn with_limits(mut self, step_limit: usize, depth_limit: usize) -> Self {
        self.step_limit = step_limit;
        self.depth_limit = depth_limit;
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn read_num<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(v) => v.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(key, value = %v, "ignoring unparseable setting");
            default
        }),
    }
}

fn read_axis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    let axis = read_num(lookup, key, default);
    if axis == 0 {
        warn!(key, "axis 0 does not exist, keeping default");
        return default;
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = NestConfig::from_lookup(|_| None);
        assert_eq!(config, NestConfig::default());
        assert!(config.cache);
        assert_eq!(config.key_axis, 1);
    }

    #[test]
    fn test_overrides() {
        let config = NestConfig::from_lookup(lookup_from(&[
            ("NEST_CACHE", "off"),
            ("NEST_ARM", "4"),
            ("NEST_KEY_AXIS", "7"),
            ("NEST_STEP_LIMIT", "500"),
            ("NEST_DEPTH_LIMIT", "64"),
        ]));
        assert!(!config.cache);
        assert_eq!(config.nest_arm, 4);
        assert_eq!(config.key_axis, 7);
        assert_eq!(config.step_limit, 500);
        assert_eq!(config.depth_limit, 64);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = NestConfig::from_lookup(lookup_from(&[
            ("NEST_CACHE", "maybe"),
            ("NEST_ARM", "0"),
            ("NEST_STEP_LIMIT", "lots"),
        ]));
        assert_eq!(config, NestConfig::default());
    }
}
