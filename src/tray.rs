use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuItem, PredefinedMenuItem},
};
use tracing::warn;

use crate::icon::{self, IconSet};
use crate::state::BatteryState;

/// Holds references to menu items that are updated or matched on click.
pub struct MenuItems {
    pub status_item: MenuItem,
    pub settings_item: MenuItem,
    pub login_item: MenuItem,
    pub about_item: MenuItem,
    pub quit_item: MenuItem,
}

/// Build the dropdown menu and return both the menu and item handles.
pub fn build_menu(name: &str, status_text: &str, login_enabled: bool) -> (Menu, MenuItems) {
    let menu = Menu::new();

    let status_item = MenuItem::new(status_text, false, None);
    let settings_item = MenuItem::new("Open Battery Settings", true, None);
    let login_item = MenuItem::new("Enable Launch at Login", !login_enabled, None);
    let about_item = MenuItem::new(format!("About {name}"), true, None);
    let quit_item = MenuItem::new("Quit", true, None);

    let _ = menu.append_items(&[
        &status_item,
        &PredefinedMenuItem::separator(),
        &settings_item,
        &login_item,
        &PredefinedMenuItem::separator(),
        &about_item,
        &PredefinedMenuItem::separator(),
        &quit_item,
    ]);

    let items = MenuItems {
        status_item,
        settings_item,
        login_item,
        about_item,
        quit_item,
    };

    (menu, items)
}

/// Build the tray icon with the given menu.
pub fn build_tray(menu: Menu, tooltip: &str) -> Result<TrayIcon, tray_icon::Error> {
    TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(tooltip)
        .with_menu_on_left_click(true)
        .build()
}

/// Keeps the tray in sync with published battery state.
pub struct Presenter {
    tray: TrayIcon,
    status_item: MenuItem,
    icons: IconSet,
    name: String,
}

impl Presenter {
    pub fn new(tray: TrayIcon, status_item: MenuItem, icons: IconSet, name: String) -> Self {
        Self {
            tray,
            status_item,
            icons,
            name,
        }
    }

    pub fn render(&self, state: &BatteryState) {
        let choice = icon::select(state);
        let (_, image) = self.icons.resolve(choice.key);
        let (width, height) = image.dimensions();
        match Icon::from_rgba(image.as_raw().clone(), width, height) {
            Ok(tray_icon) => {
                let _ = self
                    .tray
                    .set_icon_with_as_template(Some(tray_icon), choice.template);
            }
            Err(e) => warn!(error = %e, key = %choice.key, "failed to build tray icon"),
        }

        let status = state.status_text();
        self.status_item.set_text(&status);
        let _ = self
            .tray
            .set_tooltip(Some(format!("{} \u{2014} {}", self.name, status)));
    }
}
