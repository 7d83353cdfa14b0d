//! Mediator configuration

/// Mediator configuration options
#[derive(Debug, Clone)]
pub struct MediatorConfig {
    /// Maximum number of activity log entries kept (oldest evicted first)
    pub log_capacity: usize,

    /// Code prefix marking system components, which cannot be unregistered
    pub system_prefix: String,

    /// Maximum nesting of publishes triggered from inside subscribers
    pub max_publish_depth: usize,

    /// Page used when a query passes an invalid page
    pub default_page: usize,

    /// Page size used when a query passes an invalid page size
    pub default_page_size: usize,

    /// Buffer of the live activity feed per receiver
    pub feed_capacity: usize,

    /// Publish `componentRegistered` / `componentUnregistered` on the system channel
    pub announce_lifecycle: bool,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            log_capacity: 1000,
            system_prefix: "sys_".to_string(),
            max_publish_depth: 16,
            default_page: 1,
            default_page_size: 10,
            feed_capacity: 256,
            announce_lifecycle: true,
        }
    }
}

impl MediatorConfig {
    /// Set the activity log capacity
    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }

    /// Set the system component prefix
    pub fn system_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.system_prefix = prefix.into();
        self
    }

    /// Set the maximum publish nesting depth
    pub fn max_publish_depth(mut self, depth: usize) -> Self {
        self.max_publish_depth = depth.max(1);
        self
    }

    /// Set the default page size for log queries
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Set the live feed buffer size
    pub fn feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity.max(1);
        self
    }

    /// Disable the automatic lifecycle notifications
    pub fn disable_lifecycle_announcements(mut self) -> Self {
        self.announce_lifecycle = false;
        self
    }

    /// Check whether a code marks a system component
    ///
    /// An empty prefix protects nothing.
    pub fn is_system_code(&self, code: &str) -> bool {
        !self.system_prefix.is_empty() && code.starts_with(&self.system_prefix)
    }

    /// Code under which the mediator contributes its own catalog rows
    pub fn mediator_code(&self) -> String {
        format!("{}mediator", self.system_prefix)
    }
}
