//! Commands flowing from the console into widget tasks, and views flowing
//! back out to the renderer.

use crate::types::{Mode, WidgetId};
use crate::view::WidgetView;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub const COMMAND_QUEUE_DEPTH: usize = 8;
pub const VIEW_QUEUE_DEPTH: usize = 32;

/// User actions on a single widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCommand {
    Increase,
    Decrease,
    ToggleMode(Mode),
}

pub type WidgetCommandChannel = Channel<CriticalSectionRawMutex, WidgetCommand, COMMAND_QUEUE_DEPTH>;
pub type ViewChannel = Channel<CriticalSectionRawMutex, WidgetView, VIEW_QUEUE_DEPTH>;

/// Console command, one JSON object per line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum PanelCommand {
    #[serde(rename = "increase")]
    Increase { widget: WidgetId },
    #[serde(rename = "decrease")]
    Decrease { widget: WidgetId },
    #[serde(rename = "toggle_mode")]
    ToggleMode { widget: WidgetId, mode: Mode },
}

impl PanelCommand {
    pub fn parse(line: &str) -> Result<Self, RouteError> {
        serde_json::from_str(line.trim()).map_err(RouteError::Malformed)
    }

    pub fn widget(&self) -> &WidgetId {
        match self {
            PanelCommand::Increase { widget }
            | PanelCommand::Decrease { widget }
            | PanelCommand::ToggleMode { widget, .. } => widget,
        }
    }

    pub fn command(&self) -> WidgetCommand {
        match self {
            PanelCommand::Increase { .. } => WidgetCommand::Increase,
            PanelCommand::Decrease { .. } => WidgetCommand::Decrease,
            PanelCommand::ToggleMode { mode, .. } => WidgetCommand::ToggleMode(*mode),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("malformed command: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown widget '{0}'")]
    UnknownWidget(WidgetId),
    #[error("command queue for '{0}' is full")]
    QueueFull(WidgetId),
}

/// Widget id -> command channel of the task owning that widget
#[derive(Default)]
pub struct CommandRouter {
    routes: HashMap<WidgetId, Arc<WidgetCommandChannel>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: WidgetId) -> Arc<WidgetCommandChannel> {
        Arc::clone(
            self.routes
                .entry(id)
                .or_insert_with(|| Arc::new(Channel::new())),
        )
    }

    pub fn channel(&self, id: &WidgetId) -> Option<Arc<WidgetCommandChannel>> {
        self.routes.get(id).map(Arc::clone)
    }

    pub fn dispatch(&self, command: &PanelCommand) -> Result<(), RouteError> {
        let widget = command.widget();
        let channel = self
            .routes
            .get(widget)
            .ok_or_else(|| RouteError::UnknownWidget(widget.clone()))?;

        channel
            .try_send(command.command())
            .map_err(|_| RouteError::QueueFull(widget.clone()))?;
        debug!("Routed {:?} to {}", command.command(), widget);
        Ok(())
    }

    pub fn dispatch_line(&self, line: &str) -> Result<(), RouteError> {
        self.dispatch(&PanelCommand::parse(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let command = PanelCommand::parse(r#"{"type":"increase","widget":"porch"}"#).unwrap();
        assert_eq!(command.widget(), &WidgetId::from("porch"));
        assert_eq!(command.command(), WidgetCommand::Increase);

        let command =
            PanelCommand::parse(r#" {"type":"toggle_mode","widget":"porch","mode":"duskTillDawn"} "#)
                .unwrap();
        assert_eq!(command.command(), WidgetCommand::ToggleMode(Mode::DuskTillDawn));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(PanelCommand::parse("+"), Err(RouteError::Malformed(_))));
        assert!(matches!(
            PanelCommand::parse(r#"{"type":"toggle_mode","widget":"porch","mode":"strobe"}"#),
            Err(RouteError::Malformed(_))
        ));
    }

    #[test]
    fn test_dispatch_routes_to_widget_channel() {
        let mut router = CommandRouter::new();
        let porch = router.register(WidgetId::from("porch"));
        let garage = router.register(WidgetId::from("garage"));

        router
            .dispatch_line(r#"{"type":"decrease","widget":"garage"}"#)
            .unwrap();

        assert!(porch.try_receive().is_err());
        assert_eq!(garage.try_receive().ok(), Some(WidgetCommand::Decrease));
    }

    #[test]
    fn test_dispatch_unknown_widget() {
        let router = CommandRouter::new();
        let result = router.dispatch_line(r#"{"type":"increase","widget":"attic"}"#);
        assert!(matches!(result, Err(RouteError::UnknownWidget(id)) if id.as_str() == "attic"));
    }

    #[test]
    fn test_dispatch_full_queue() {
        let mut router = CommandRouter::new();
        router.register(WidgetId::from("porch"));
        let command = PanelCommand::Increase {
            widget: WidgetId::from("porch"),
        };

        for _ in 0..COMMAND_QUEUE_DEPTH {
            router.dispatch(&command).unwrap();
        }
        assert!(matches!(router.dispatch(&command), Err(RouteError::QueueFull(_))));
    }
}
