/// Log tags identifying which subsystem emitted a message

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    /// Pool adapters mapping upstream payloads
    Pool,
    /// Raw HTTP traffic
    Api,
    Config,
    Setup,
    System,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::Pool => "pool".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Setup => "setup".to_string(),
            LogTag::System => "system".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Upper-case label printed in the log prefix
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
