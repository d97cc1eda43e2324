use tracing::info;

/// One tool invocation, recorded fire-and-forget.
#[derive(Clone, Debug)]
pub struct UsageEvent {
    pub tool: String,
    pub args: String,
    pub user: String,
    pub machine: String,
}

impl UsageEvent {
    pub fn new(tool: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: args.into(),
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            machine: std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}

/// Where usage events go. Recording must never fail the tool that emits it.
pub trait UsageSink {
    fn record(&self, event: &UsageEvent);
}

/// Default sink: usage lands in the log stream.
pub struct LogSink;

impl UsageSink for LogSink {
    fn record(&self, event: &UsageEvent) {
        info!(
            tool = %event.tool,
            args = %event.args,
            user = %event.user,
            machine = %event.machine,
            "usage",
        );
    }
}

/// Discards usage events.
pub struct NullSink;

impl UsageSink for NullSink {
    fn record(&self, _event: &UsageEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_the_invocation() {
        let event = UsageEvent::new("switch", "--side Lf");
        assert_eq!(event.tool, "switch");
        assert_eq!(event.args, "--side Lf");
        assert!(!event.user.is_empty());
    }

    #[test]
    fn sinks_accept_events() {
        let event = UsageEvent::new("switch", "");
        LogSink.record(&event);
        NullSink.record(&event);
    }
}
