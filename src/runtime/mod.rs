//! Symbol registry of the runtime: classes, selectors and protocols.
//!
//! Each namespace is a [`SymbolTable`] mapping names to opaque handles and back. The
//! three tables share one [`Diagnostics`] front and are grouped in a [`Registry`], which
//! also offers the familiar string conversion helpers (`NSClassFromString` and friends).
//!
//! # Process-wide Registry
//!
//! A runtime has one symbol space per process. [`init`] installs it explicitly with a
//! [`RegistryConfig`]; [`global`] returns it, falling back to the default configuration if
//! nothing was installed. Independent [`Registry`] values can still be created for tests or
//! for tools inspecting several images.
//!
//! # Examples
//!
//! ```rust
//! use objscope::runtime::{ClassHandle, Registry, RegistryConfig};
//!
//! let registry = Registry::new(RegistryConfig::default());
//! registry.classes().register("NSObject", ClassHandle(0x100))?;
//!
//! assert_eq!(registry.class_from_string("NSObject"), Some(ClassHandle(0x100)));
//! assert_eq!(registry.string_from_class(ClassHandle(0x100)).as_deref(), Some("NSObject"));
//! assert_eq!(registry.class_from_string("NSProxy"), None);
//!
//! let init = registry.selector_from_string("init")?;
//! assert_eq!(registry.selector_from_string("init")?, init);
//! # Ok::<(), objscope::Error>(())
//! ```

mod diagnostics;
mod handle;
mod table;

pub use diagnostics::{DiagnosticSink, Diagnostics, LogSink, StderrSink, LOG_TARGET};
pub use handle::{ClassHandle, ProtocolHandle, RuntimeHandle, SelectorHandle, SymbolKind};
pub use table::SymbolTable;

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{Error, Result};

/// What a table does when a name is registered again with a different handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Keep the first binding and fail the registration
    #[default]
    Reject,
    /// Rebind the name to the new handle and report the replacement
    Replace,
}

/// Configuration of a [`Registry`]
#[derive(Clone)]
pub struct RegistryConfig {
    /// Conflict handling shared by all three tables
    pub conflict_policy: ConflictPolicy,
    /// Destination of diagnostic lines
    pub sink: Arc<dyn DiagnosticSink>,
}

impl RegistryConfig {
    /// Set the conflict policy
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Set the diagnostic sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            conflict_policy: ConflictPolicy::Reject,
            sink: Arc::new(LogSink),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("conflict_policy", &self.conflict_policy)
            .finish_non_exhaustive()
    }
}

/// The class, selector and protocol tables of one runtime
#[derive(Debug)]
pub struct Registry {
    classes: SymbolTable<ClassHandle>,
    selectors: SymbolTable<SelectorHandle>,
    protocols: SymbolTable<ProtocolHandle>,
    diagnostics: Arc<Diagnostics>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        let diagnostics = Arc::new(Diagnostics::new(config.sink));
        let policy = config.conflict_policy;

        Registry {
            classes: SymbolTable::new(policy, diagnostics.clone()),
            selectors: SymbolTable::new(policy, diagnostics.clone()),
            protocols: SymbolTable::new(policy, diagnostics.clone()),
            diagnostics,
        }
    }

    /// The class table
    #[must_use]
    pub fn classes(&self) -> &SymbolTable<ClassHandle> {
        &self.classes
    }

    /// The selector table
    #[must_use]
    pub fn selectors(&self) -> &SymbolTable<SelectorHandle> {
        &self.selectors
    }

    /// The protocol table
    #[must_use]
    pub fn protocols(&self) -> &SymbolTable<ProtocolHandle> {
        &self.protocols
    }

    /// The diagnostics front shared by all tables
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The class registered under `name`, if any
    #[must_use]
    pub fn class_from_string(&self, name: &str) -> Option<ClassHandle> {
        self.classes.resolve(name)
    }

    /// The name of `class`, if registered
    #[must_use]
    pub fn string_from_class(&self, class: ClassHandle) -> Option<String> {
        self.classes.name_of(class)
    }

    /// The selector named `name`, registering it first if needed
    ///
    /// # Errors
    /// Returns [`Error::EmptyName`] for an empty name and [`Error::HandleExhausted`]
    /// if no fresh selector handle is left.
    pub fn selector_from_string(&self, name: &str) -> Result<SelectorHandle> {
        self.selectors.intern(name)
    }

    /// The name of `selector`, if registered
    #[must_use]
    pub fn string_from_selector(&self, selector: SelectorHandle) -> Option<String> {
        self.selectors.name_of(selector)
    }

    /// The protocol registered under `name`, if any
    #[must_use]
    pub fn protocol_from_string(&self, name: &str) -> Option<ProtocolHandle> {
        self.protocols.resolve(name)
    }

    /// The name of `protocol`, if registered
    #[must_use]
    pub fn string_from_protocol(&self, protocol: ProtocolHandle) -> Option<String> {
        self.protocols.name_of(protocol)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new(RegistryConfig::default())
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry
///
/// # Errors
/// Returns [`Error::AlreadyInitialized`] if the registry was installed before, either by an
/// earlier call or implicitly through [`global`].
pub fn init(config: RegistryConfig) -> Result<&'static Registry> {
    let mut installed = false;
    let registry = GLOBAL.get_or_init(|| {
        installed = true;
        Registry::new(config)
    });

    if installed {
        Ok(registry)
    } else {
        Err(Error::AlreadyInitialized)
    }
}

/// The process-wide registry, installed with the default configuration on first use
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::default)
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, Weak};

    use super::*;

    #[test]
    fn test_registry_tables_are_independent() {
        let registry = Registry::default();
        registry.classes().register("Foo", ClassHandle(1)).unwrap();
        registry
            .protocols()
            .register("Foo", ProtocolHandle(1))
            .unwrap();
        registry
            .selectors()
            .register("Foo", SelectorHandle(1))
            .unwrap();

        assert_eq!(registry.class_from_string("Foo"), Some(ClassHandle(1)));
        assert_eq!(registry.protocol_from_string("Foo"), Some(ProtocolHandle(1)));
        assert_eq!(registry.selector_from_string("Foo").unwrap(), SelectorHandle(1));
    }

    #[test]
    fn test_string_helpers() {
        let registry = Registry::default();
        registry
            .protocols()
            .register("NSCopying", ProtocolHandle(9))
            .unwrap();

        assert_eq!(
            registry.string_from_protocol(ProtocolHandle(9)).as_deref(),
            Some("NSCopying")
        );
        assert_eq!(registry.string_from_protocol(ProtocolHandle(8)), None);
        assert_eq!(registry.string_from_class(ClassHandle(9)), None);

        let selector = registry.selector_from_string("description").unwrap();
        assert_eq!(
            registry.string_from_selector(selector).as_deref(),
            Some("description")
        );
    }

    #[test]
    fn test_config_builders() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let config = RegistryConfig::default()
            .with_conflict_policy(ConflictPolicy::Replace)
            .with_sink(Arc::new(move |line: &str| {
                captured.lock().unwrap().push(line.to_string());
            }));
        assert_eq!(config.conflict_policy, ConflictPolicy::Replace);

        let registry = Registry::new(config);
        assert_eq!(registry.classes().policy(), ConflictPolicy::Replace);
        registry.classes().register("Foo", ClassHandle(1)).unwrap();
        registry.classes().register("Foo", ClassHandle(2)).unwrap();
        registry.diagnostics().emit("done");

        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_sink_may_register_while_reporting() {
        let slot: Arc<OnceLock<Weak<Registry>>> = Arc::new(OnceLock::new());
        let lines = Arc::new(Mutex::new(Vec::new()));

        let registry_slot = slot.clone();
        let captured = lines.clone();
        let config = RegistryConfig::default()
            .with_conflict_policy(ConflictPolicy::Replace)
            .with_sink(Arc::new(move |line: &str| {
                captured.lock().unwrap().push(line.to_string());
                if !line.contains("'Foo'") {
                    return;
                }
                if let Some(registry) = registry_slot.get().and_then(Weak::upgrade) {
                    registry.protocols().register("P", ProtocolHandle(1)).unwrap();
                    registry.protocols().register("P", ProtocolHandle(2)).unwrap();
                }
            }));

        let registry = Arc::new(Registry::new(config));
        slot.set(Arc::downgrade(&registry)).unwrap();

        registry.classes().register("Foo", ClassHandle(1)).unwrap();
        registry.classes().register("Foo", ClassHandle(2)).unwrap();

        assert_eq!(registry.protocol_from_string("P"), Some(ProtocolHandle(2)));
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("'Foo'"));
        assert!(lines[1].contains("'P'"));
    }

    #[test]
    fn test_default_policy_rejects() {
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Reject);
        let registry = Registry::default();
        registry.classes().register("Foo", ClassHandle(1)).unwrap();
        assert!(registry.classes().register("Foo", ClassHandle(2)).is_err());
    }
}
