// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use ordermap::OrderMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::errors::TraceCtlError;
use crate::targets::TARGET_DECLS;
use crate::{LevelFilter, trace_target};

trace_target!("tracectl", LevelFilter::INFO, &[]);

/// Keys of a config string that are not tags
const KEY_DEFAULT: &str = "default";
const KEY_ALL: &str = "all";

/// The runtime state of a registered target
#[derive(Debug, Clone)]
pub struct TargetState {
    pub(crate) module: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
}
impl TargetState {
    fn new(
        module: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        let mut all_tags = vec![name];
        all_tags.extend(tags.iter().filter(|t| **t != name));
        Self {
            module,
            name,
            level,
            tags: all_tags,
        }
    }
    #[must_use]
    pub fn module(&self) -> &'static str {
        self.module
    }
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
    #[must_use]
    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }
}

#[derive(Debug)]
pub(crate) struct TargetDb {
    pub(crate) default: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetState>, /* keyed by module path */
    pub(crate) tags: OrderMap<&'static str, Vec<&'static str>>, /* tag -> module paths */
}
impl TargetDb {
    fn new(default: LevelFilter) -> Self {
        let mut db = Self {
            default,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for decl in TARGET_DECLS {
            db.register(TargetState::new(decl.module, decl.name, decl.level, decl.tags));
        }
        db
    }
    fn register(&mut self, state: TargetState) {
        for tag in state.tags.iter().copied() {
            let modules = self.tags.entry(tag).or_default();
            if !modules.contains(&state.module) {
                modules.push(state.module);
            }
        }
        if let Some(prior) = self.targets.insert(state.module, state) {
            warn!("Tracing target for {} declared more than once", prior.module);
        }
    }
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.default.to_string());
        for state in self.targets.values() {
            match Directive::from_str(&format!("{}={}", state.module, state.level)) {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => warn!("Skipping tracing directive for {}: {e}", state.module),
            }
        }
        filter
    }
    fn set_tag_level(&mut self, tag: &str, level: LevelFilter) -> Result<usize, TraceCtlError> {
        let modules = self
            .tags
            .get(tag)
            .ok_or_else(|| TraceCtlError::UnknownTag(tag.to_owned()))?;
        let mut changed = 0;
        for module in modules {
            if let Some(state) = self.targets.get_mut(module)
                && state.level != level
            {
                state.level = level;
                changed += 1;
            }
        }
        Ok(changed)
    }
    pub(crate) fn as_config_string(&self) -> String {
        let mut out = format!("{KEY_DEFAULT}={}", self.default);
        for state in self.targets.values() {
            out += &format!(",{}={}", state.name, state.level);
        }
        out
    }
}

/// Parse a string of comma-separated `tag=level` items, where level is one of
/// off, error, warn, info, debug or trace.
pub(crate) fn parse_tracing_config(
    input: &str,
) -> Result<OrderMap<String, LevelFilter>, TraceCtlError> {
    let mut config = OrderMap::new();
    for item in input.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let Some((tag, level)) = item.split_once('=') else {
            return Err(TraceCtlError::BadSyntax(item.to_owned()));
        };
        let (tag, level) = (tag.trim(), level.trim());
        if tag.is_empty() {
            return Err(TraceCtlError::BadSyntax(item.to_owned()));
        }
        let level = LevelFilter::from_str(level).map_err(|_| TraceCtlError::BadLevel {
            tag: tag.to_owned(),
            level: level.to_owned(),
        })?;
        config.insert(tag.to_owned(), level);
    }
    Ok(config)
}

/// Handle to change tracing levels at runtime
#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetDb>,
    reload_filter: reload::Handle<EnvFilter, Registry>,
}

static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();

/// Get a reference to the process-wide [`TracingControl`], initializing it if needed
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

impl TracingControl {
    fn new() -> Self {
        let db = TargetDb::new(LevelFilter::INFO);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        // another subscriber (e.g. a test harness) may already own the global slot
        if let Err(e) = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
        {
            debug!("Tracing subscriber not installed: {e}");
        }
        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }
    pub fn init() {
        get_trace_ctl();
    }
    fn lock(&self) -> MutexGuard<'_, TargetDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn reload(&self, db: &TargetDb) {
        if let Err(e) = self.reload_filter.reload(db.env_filter()) {
            warn!("Failed to reload tracing filter: {e}");
        }
    }

    /// Set the level of all targets carrying `tag`. Returns how many targets changed.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) -> Result<usize, TraceCtlError> {
        let mut db = self.lock();
        let changed = db.set_tag_level(tag, level)?;
        if changed > 0 {
            self.reload(&db);
        }
        debug!("Tag '{tag}' set to {level}: {changed} targets changed");
        Ok(changed)
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        db.targets.values_mut().for_each(|t| t.level = level);
        self.reload(&db);
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.default != level {
            db.default = level;
            self.reload(&db);
        }
    }
    #[must_use]
    pub fn default_level(&self) -> LevelFilter {
        self.lock().default
    }

    /// Apply a configuration string such as `default=error,all=info,lower=debug`.
    /// `default` sets the level of events outside registered targets and `all`
    /// sets every registered target; remaining keys are tags and override `all`.
    /// The whole string is validated before anything is applied.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = parse_tracing_config(input)?;
        {
            let db = self.lock();
            if let Some(tag) = config
                .keys()
                .find(|k| *k != KEY_DEFAULT && *k != KEY_ALL && !db.tags.contains_key(k.as_str()))
            {
                return Err(TraceCtlError::UnknownTag(tag.clone()));
            }
        }
        if let Some(level) = config.get(KEY_DEFAULT) {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get(KEY_ALL) {
            self.set_level_all(*level);
        }
        for (tag, level) in config
            .iter()
            .filter(|(k, _)| *k != KEY_DEFAULT && *k != KEY_ALL)
        {
            self.set_tag_level(tag, *level)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn target(&self, name: &str) -> Option<TargetState> {
        self.lock()
            .targets
            .values()
            .find(|t| t.name == name)
            .cloned()
    }
    #[must_use]
    pub fn targets(&self) -> Vec<TargetState> {
        self.lock().targets.values().cloned().collect()
    }
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.lock().tags.keys().copied().collect()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
    /// Log the current configuration
    pub fn dump(&self) {
        let db = self.lock();
        info!("{db}");
    }
}
