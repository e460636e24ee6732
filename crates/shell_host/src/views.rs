//! Views the native host opens in its tabs.

use std::rc::Rc;

use shell_runtime::ViewFactory;
use tracing::info;
use view_contract::ViewLifecycle;

/// View that reports every lifecycle callback through `tracing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingView {
    title: String,
}

impl TracingView {
    /// View titled after the opened file, or `untitled`.
    pub fn new(path: Option<&str>) -> Self {
        Self {
            title: path.unwrap_or("untitled").to_string(),
        }
    }

    /// Tab title.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl ViewLifecycle for TracingView {
    fn on_xaml_load(&self) {
        info!(title = %self.title, "surface mounted");
    }

    fn on_load(&self) {
        info!(title = %self.title, "view loaded");
    }

    fn on_suspend(&self) {
        info!(title = %self.title, "view suspended");
    }

    fn on_resume(&self) {
        info!(title = %self.title, "view resumed");
    }

    fn dispose(&self) {
        info!(title = %self.title, "view disposed");
    }
}

/// Factory producing [`TracingView`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingViewFactory;

impl ViewFactory for TracingViewFactory {
    fn create_view(&self, path: Option<&str>) -> Rc<dyn ViewLifecycle> {
        Rc::new(TracingView::new(path))
    }
}
