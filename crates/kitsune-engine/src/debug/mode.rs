/// Whether the debug panel is wanted, decided once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DebugMode {
    enabled: bool,
}

impl DebugMode {
    pub const FRAGMENT: &'static str = "#debug";

    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Enabled iff the fragment of `location` is exactly `#debug`.
    ///
    /// Accepts a full url (`http://host/page#debug`) or a bare fragment.
    pub fn from_location(location: &str) -> Self {
        let fragment = location.find('#').map(|i| &location[i..]);
        Self {
            enabled: fragment == Some(Self::FRAGMENT),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
