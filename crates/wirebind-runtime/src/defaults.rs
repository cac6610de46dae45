//! Process-wide format defaults.
//!
//! [`DefaultsContext`] holds the [`LocaleTable`] that widget settings fall
//! back to when they do not name their own separators, patterns or calendar
//! text. The table is loaded at startup (from `LC_ALL`/`LANG`) and replaced
//! wholesale on a locale switch; nothing mutates it field by field. Scoped
//! overrides let a subtree of widgets attach under another locale.
//!
//! # Invariants
//!
//! 1. **Wholesale replacement**: `load`/`apply` swap the entire table.
//! 2. **Versioned**: the version increments exactly once per effective
//!    switch; reloading the current table is a no-op.
//! 3. **LIFO overrides**: the innermost live override wins.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown locale | Tag not registered | Language prefix, then `en`, then base table |
//! | Malformed env locale | `C`, `POSIX`, empty | Treated as `en` |
//! | Invalid table | Empty separator, bad precision | `apply` rejects it, current table kept |

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use tracing::debug;
use wirebind_i18n::{ConfigError, Locale, LocaleRegistry, LocaleTable};

use crate::reactive::{Observable, Subscription};

thread_local! {
    static GLOBAL_CONTEXT: DefaultsContext = DefaultsContext::system();
}

/// Current locale table with scoped overrides.
#[derive(Clone, Debug)]
pub struct DefaultsContext {
    registry: Rc<RefCell<LocaleRegistry>>,
    current: Observable<LocaleTable>,
    overrides: Rc<RefCell<Vec<LocaleTable>>>,
}

impl DefaultsContext {
    /// Context over `registry`, starting at `locale`.
    #[must_use]
    pub fn new(registry: LocaleRegistry, locale: &str) -> Self {
        let table = registry.resolve(&normalize_locale(locale));
        Self {
            registry: Rc::new(RefCell::new(registry)),
            current: Observable::new(table),
            overrides: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Context over the bundled tables.
    #[must_use]
    pub fn with_builtin(locale: &str) -> Self {
        Self::new(LocaleRegistry::with_builtin(), locale)
    }

    /// Context initialized from system locale detection.
    #[must_use]
    pub fn system() -> Self {
        Self::with_builtin(&detect_system_locale())
    }

    /// The thread's shared context.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_CONTEXT.with(Clone::clone)
    }

    /// Active table, honoring any scoped override.
    #[must_use]
    pub fn current(&self) -> LocaleTable {
        if let Some(table) = self.overrides.borrow().last() {
            table.clone()
        } else {
            self.current.get()
        }
    }

    /// Base table without overrides.
    #[must_use]
    pub fn base(&self) -> LocaleTable {
        self.current.get()
    }

    /// Tag of the active table.
    #[must_use]
    pub fn locale(&self) -> Locale {
        if let Some(table) = self.overrides.borrow().last() {
            table.tag.clone()
        } else {
            self.current.with(|t| t.tag.clone())
        }
    }

    /// Switch the base table to the one registered for `locale`.
    ///
    /// Returns whether the table changed.
    pub fn load(&self, locale: &str) -> bool {
        let requested = normalize_locale(locale);
        let table = self.registry.borrow().resolve(&requested);
        let resolved = table.tag.clone();
        let changed = self.current.set(table);
        if changed {
            debug!(requested = %requested, resolved = %resolved, "format defaults switched");
        }
        changed
    }

    /// Register `table` and make it the base table.
    pub fn apply(&self, table: LocaleTable) -> Result<bool, ConfigError> {
        table.validate()?;
        self.registry.borrow_mut().add(table.clone());
        Ok(self.current.set(table))
    }

    /// Register `table` without switching. If it replaces the table that is
    /// currently loaded, the new table takes effect immediately.
    pub fn register(&self, table: LocaleTable) -> Result<(), ConfigError> {
        table.validate()?;
        let replaces_current = self.current.with(|t| t.tag == table.tag);
        self.registry.borrow_mut().add(table.clone());
        if replaces_current {
            self.current.set(table);
        }
        Ok(())
    }

    /// Register a table read from a TOML document.
    #[cfg(feature = "toml-config")]
    pub fn register_toml(&self, doc: &str) -> Result<(), ConfigError> {
        self.register(LocaleTable::from_toml_str(doc)?)
    }

    /// Registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<Locale> {
        let mut tags: Vec<Locale> = self
            .registry
            .borrow()
            .locales()
            .into_iter()
            .map(str::to_owned)
            .collect();
        tags.sort();
        tags
    }

    /// Subscribe to base table switches.
    pub fn subscribe(&self, callback: impl Fn(&LocaleTable) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    /// Push a scoped override. Dropping the guard restores the prior table.
    #[must_use = "dropping this guard clears the override"]
    pub fn push_override(&self, locale: &str) -> DefaultsOverride {
        let table = self.registry.borrow().resolve(&normalize_locale(locale));
        let tag = table.tag.clone();
        self.overrides.borrow_mut().push(table);
        DefaultsOverride {
            stack: Rc::clone(&self.overrides),
            tag,
        }
    }

    /// Number of effective base switches.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }
}

/// RAII guard for a scoped override.
#[must_use = "dropping this guard clears the override"]
pub struct DefaultsOverride {
    stack: Rc<RefCell<Vec<LocaleTable>>>,
    tag: Locale,
}

impl Drop for DefaultsOverride {
    fn drop(&mut self) {
        let popped = self.stack.borrow_mut().pop();
        if let Some(popped) = popped {
            debug_assert_eq!(popped.tag, self.tag);
        }
    }
}

/// Detect the system locale from `LC_ALL`, then `LANG`; `"en"` otherwise.
#[must_use]
pub fn detect_system_locale() -> Locale {
    let lc_all = env::var("LC_ALL").ok();
    let lang = env::var("LANG").ok();
    detect_system_locale_from(lc_all.as_deref(), lang.as_deref())
}

/// Active table of the thread's context.
#[must_use]
pub fn current_defaults() -> LocaleTable {
    DefaultsContext::global().current()
}

/// Switch the thread's context to `locale`.
pub fn load_locale(locale: &str) -> bool {
    DefaultsContext::global().load(locale)
}

fn normalize_locale(locale: &str) -> Locale {
    normalize_locale_raw(locale).unwrap_or_else(|| "en".to_owned())
}

fn detect_system_locale_from(lc_all: Option<&str>, lang: Option<&str>) -> Locale {
    lc_all
        .and_then(normalize_locale_raw)
        .or_else(|| lang.and_then(normalize_locale_raw))
        .unwrap_or_else(|| "en".to_owned())
}

fn normalize_locale_raw(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw).trim();
    if raw.is_empty() {
        return None;
    }
    if raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return Some("en".to_owned());
    }
    Some(raw.replace('_', "-"))
}
