/// Hooks bracketing initialization work, e.g. to forward it to a platform profiler
///
/// Sections nest: every `begin_section` is followed by exactly one `end_section`,
/// closing the most recently opened section. This holds on error paths as well.
pub trait TraceHook: Send + Sync {
    /// Returns whether sections should be reported at all
    fn is_enabled(&self) -> bool {
        true
    }

    fn begin_section(&self, name: &str);

    fn end_section(&self);
}

/// Name of the section bracketing a discovery pass
pub const DISCOVERY_SECTION: &str = "Startup";

/// An open trace section, closed on drop
pub(crate) struct TraceSection<'a> {
    hook: Option<&'a dyn TraceHook>,
}
impl<'a> TraceSection<'a> {
    pub fn begin(hook: Option<&'a dyn TraceHook>, name: &str) -> Self {
        let hook = hook.filter(|hook| hook.is_enabled());
        if let Some(hook) = hook {
            hook.begin_section(name);
        }
        TraceSection { hook }
    }
}
impl Drop for TraceSection<'_> {
    fn drop(&mut self) {
        if let Some(hook) = self.hook {
            hook.end_section();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records begin/end calls as `+name` and `-`
    #[derive(Clone, Default)]
    pub struct RecordingHook {
        pub events: Arc<Mutex<Vec<String>>>,
        pub disabled: bool,
    }
    impl RecordingHook {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }
    impl TraceHook for RecordingHook {
        fn is_enabled(&self) -> bool {
            !self.disabled
        }

        fn begin_section(&self, name: &str) {
            self.events.lock().unwrap().push(format!("+{name}"));
        }

        fn end_section(&self) {
            self.events.lock().unwrap().push("-".to_string());
        }
    }

    #[test]
    fn section_ends_on_drop() {
        let hook = RecordingHook::default();
        {
            let _outer = TraceSection::begin(Some(&hook), "outer");
            let _inner = TraceSection::begin(Some(&hook), "inner");
        }
        assert_eq!(hook.events(), vec!["+outer", "+inner", "-", "-"]);
    }

    #[test]
    fn section_ends_when_unwinding() {
        let hook = RecordingHook::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _section = TraceSection::begin(Some(&hook), "panicking");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(hook.events(), vec!["+panicking", "-"]);
    }

    #[test]
    fn disabled_hook_is_not_called() {
        let hook = RecordingHook {
            disabled: true,
            ..Default::default()
        };
        drop(TraceSection::begin(Some(&hook), "skipped"));
        drop(TraceSection::begin(None, "nothing"));
        assert!(hook.events().is_empty());
    }
}
