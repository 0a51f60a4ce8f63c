//! Shell configuration

/// Shell configuration
#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    /// Print each command as `$ <command>` before running it
    pub trace_commands: bool,
}

impl ShellConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable command tracing
    pub fn with_trace_commands(mut self, trace_commands: bool) -> Self {
        self.trace_commands = trace_commands;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_config_builder() {
        assert!(!ShellConfig::new().trace_commands);
        assert!(ShellConfig::new().with_trace_commands(true).trace_commands);
    }
}
