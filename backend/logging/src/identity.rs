/// Hostname and pid stamped on every record, captured once per registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub hostname: String,
    pub pid: u32,
}

impl ProcessIdentity {
    pub fn new(hostname: impl Into<String>, pid: u32) -> Self {
        Self {
            hostname: hostname.into(),
            pid,
        }
    }

    /// Identity of the running process.
    pub fn current() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            hostname,
            pid: std::process::id(),
        }
    }
}
