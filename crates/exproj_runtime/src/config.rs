//! Configuration for the project store and service.

/// Configuration for a [`ProjectStore`](crate::ProjectStore) and the service
/// that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Extension of project files, without the leading dot.
    pub extension: String,

    /// Name given to a freshly created project.
    pub default_project_name: String,

    /// Pretty-print project files with two-space indentation.
    pub pretty: bool,

    /// Bound of the service request queue.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            extension: "exProj".to_string(),
            default_project_name: "myProject".to_string(),
            pretty: true,
            channel_capacity: 64,
        }
    }
}

impl StoreConfig {
    /// Builder method to set the project file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Builder method to set the default project name.
    #[must_use]
    pub fn with_default_project_name(mut self, name: impl Into<String>) -> Self {
        self.default_project_name = name.into();
        self
    }

    /// Builder method to toggle pretty-printed output.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builder method to set the request queue bound. Zero is raised to one.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Returns the default file name for a new project, e.g. `MyProject.exProj`.
    #[must_use]
    pub fn default_file_name(&self) -> String {
        let name = exproj_model::capitalize_first(&self.default_project_name);
        format!("{name}.{}", self.extension)
    }
}
