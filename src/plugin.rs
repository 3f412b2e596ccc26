use crate::actions::Action;

pub trait Plugin: Send + Sync {
    /// Return actions based on the query string
    fn search(&self, query: &str) -> Vec<Action>;
    /// Name of the plugin
    fn name(&self) -> &str;
    /// Short description shown in help listings
    fn description(&self) -> &str;
    fn capabilities(&self) -> &[&str];
    /// Actions listing the commands the plugin understands
    fn commands(&self) -> Vec<Action> {
        Vec::new()
    }
}

/// A manager that holds plugins
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self { plugins: Vec::new() }
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!(plugin = plugin.name(), "registered plugin");
        self.plugins.push(plugin);
    }

    pub fn search(&self, query: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        for p in &self.plugins {
            actions.extend(p.search(query));
        }
        actions
    }

    pub fn commands(&self) -> Vec<Action> {
        self.plugins.iter().flat_map(|p| p.commands()).collect()
    }
}
