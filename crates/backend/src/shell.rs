//! Native application shell: window menu, tray menu and window close policy.

use shared::protocol::{BackendEvent, MenuAction, MAIN_WINDOW_LABEL};

pub const QUIT_APP_ID: &str = "quit_app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub accelerator: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub label: &'static str,
    pub items: Vec<MenuEntry>,
}

const fn item(
    id: &'static str,
    label: &'static str,
    accelerator: Option<&'static str>,
) -> MenuEntry {
    MenuEntry {
        id,
        label,
        accelerator,
    }
}

pub fn app_menu() -> Vec<Submenu> {
    vec![
        Submenu {
            label: "File",
            items: vec![
                item("new", "New", Some("CmdOrCtrl+N")),
                item("open", "Open", Some("CmdOrCtrl+O")),
                item("save", "Save", Some("CmdOrCtrl+S")),
                item("save_as", "Save As", None),
                item(QUIT_APP_ID, "Quit", Some("CmdOrCtrl+Q")),
            ],
        },
        Submenu {
            label: "Edit",
            items: vec![
                item("undo", "Undo", Some("CmdOrCtrl+Z")),
                item("redo", "Redo", Some("CmdOrCtrl+Shift+Z")),
                item("cut", "Cut", Some("CmdOrCtrl+X")),
                item("copy", "Copy", Some("CmdOrCtrl+C")),
                item("paste", "Paste", Some("CmdOrCtrl+V")),
            ],
        },
        Submenu {
            label: "View",
            items: vec![
                item("zoom_in", "Zoom In", Some("CmdOrCtrl+Plus")),
                item("zoom_out", "Zoom Out", Some("CmdOrCtrl+-")),
                item("zoom_reset", "Reset Zoom", Some("CmdOrCtrl+0")),
            ],
        },
        Submenu {
            label: "Help",
            items: vec![item("about", "About", None)],
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuRoute {
    /// Forward to the front-end as a `menu-action` event.
    Emit(BackendEvent),
    Quit,
    Ignored,
}

pub fn route_menu_event(id: &str) -> MenuRoute {
    if id == QUIT_APP_ID {
        tracing::info!("menu: quit application");
        return MenuRoute::Quit;
    }

    match MenuAction::from_id(id) {
        MenuAction::Unrecognized(id) => {
            tracing::warn!(menu_id = %id, "unknown menu item");
            MenuRoute::Ignored
        }
        action => {
            tracing::debug!(menu_id = %action.id(), "menu selection forwarded");
            MenuRoute::Emit(BackendEvent::menu_action(action))
        }
    }
}

pub fn tray_menu() -> Vec<MenuEntry> {
    vec![
        item("show", "Show Window", None),
        item("hide", "Hide Window", None),
        item("quit", "Quit", None),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    ShowMainWindow,
    HideMainWindow,
    Quit,
}

pub fn route_tray_event(id: &str) -> Option<TrayCommand> {
    match id {
        "show" => Some(TrayCommand::ShowMainWindow),
        "hide" => Some(TrayCommand::HideMainWindow),
        "quit" => Some(TrayCommand::Quit),
        other => {
            tracing::warn!(menu_id = %other, "unknown tray menu item");
            None
        }
    }
}

/// Left click on the tray icon toggles the main window.
pub fn tray_left_click(main_window_visible: bool) -> TrayCommand {
    if main_window_visible {
        TrayCommand::HideMainWindow
    } else {
        TrayCommand::ShowMainWindow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    HideInstead,
    Close,
}

/// The main window survives close requests so the tray can bring it back.
pub fn close_request_policy(window_label: &str) -> CloseDecision {
    if window_label == MAIN_WINDOW_LABEL {
        CloseDecision::HideInstead
    } else {
        CloseDecision::Close
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::MENU_ACTION_EVENT;

    use super::*;

    #[test]
    fn every_menu_item_except_quit_is_forwarded() {
        for submenu in app_menu() {
            for item in submenu.items {
                match route_menu_event(item.id) {
                    MenuRoute::Emit(event) => {
                        assert_eq!(event.name, MENU_ACTION_EVENT);
                        assert_eq!(event.payload, serde_json::json!(item.id));
                    }
                    MenuRoute::Quit => assert_eq!(item.id, QUIT_APP_ID),
                    MenuRoute::Ignored => panic!("menu item {} was ignored", item.id),
                }
            }
        }
    }

    #[test]
    fn unknown_menu_ids_are_ignored() {
        assert_eq!(route_menu_event("print"), MenuRoute::Ignored);
    }

    #[test]
    fn tray_routes_and_toggles() {
        assert_eq!(route_tray_event("show"), Some(TrayCommand::ShowMainWindow));
        assert_eq!(route_tray_event("quit"), Some(TrayCommand::Quit));
        assert_eq!(route_tray_event("other"), None);
        assert_eq!(tray_left_click(true), TrayCommand::HideMainWindow);
        assert_eq!(tray_left_click(false), TrayCommand::ShowMainWindow);
    }

    #[test]
    fn only_the_main_window_is_kept_alive_on_close() {
        assert_eq!(close_request_policy("main"), CloseDecision::HideInstead);
        assert_eq!(close_request_policy("secondary"), CloseDecision::Close);
    }
}
