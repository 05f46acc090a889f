use std::sync::Arc;

use crossbeam_channel::unbounded;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tray_icon::menu::MenuEvent;
use tracing::{error, info, warn};

use crate::actions;
use crate::app::{App, Transition};
use crate::command::{ShellCommand, StatusCommand};
use crate::config::AppConfig;
use crate::icon::IconSet;
use crate::launch::LaunchAgent;
use crate::poller::{self, PollEvent, PollerHandle};
use crate::power::{LowPowerQuery, SystemLowPower};
use crate::probe;
use crate::state::BatteryState;
use crate::tray::{self, MenuItems, Presenter};

enum UserEvent {
    Menu(MenuEvent),
    Poll(PollEvent),
}

/// Run the menu bar app. Never returns.
pub fn run(cfg: AppConfig) -> ! {
    let name = cfg.identity.name.clone();
    let command: Arc<dyn StatusCommand> = Arc::new(ShellCommand::from_settings(&cfg.status));
    let low_power: Arc<dyn LowPowerQuery> = Arc::new(SystemLowPower);

    let launch_agent = match LaunchAgent::for_current_exe(&cfg.launch.label) {
        Ok(agent) => Some(agent),
        Err(e) => {
            warn!(error = %e, "launch at login unavailable");
            None
        }
    };

    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    // No dock icon; must be set before run()
    {
        use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
        event_loop.set_activation_policy(ActivationPolicy::Accessory);
    }

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::Menu(event));
    }));

    // Worker threads report over a channel; forward into the event loop.
    let (poll_tx, poll_rx) = unbounded::<PollEvent>();
    let proxy = event_loop.create_proxy();
    std::thread::spawn(move || {
        for event in poll_rx.iter() {
            if proxy.send_event(UserEvent::Poll(event)).is_err() {
                break;
            }
        }
    });

    probe::spawn(command.clone(), poll_tx.clone());

    let mut app = App::new();
    let mut menu_items: Option<MenuItems> = None;
    let mut poll_handle: Option<PollerHandle> = None;

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(UserEvent::Poll(poll_event)) => match app.handle(poll_event) {
                Transition::StartPolling => {
                    let login_enabled = launch_agent.as_ref().is_some_and(LaunchAgent::is_enabled);
                    let (menu, items) =
                        tray::build_menu(&name, &app.state().status_text(), login_enabled);
                    let tray_icon = match tray::build_tray(menu, &name) {
                        Ok(tray_icon) => tray_icon,
                        Err(e) => {
                            error!(error = %e, "failed to build tray icon");
                            *control_flow = ControlFlow::Exit;
                            return;
                        }
                    };
                    let presenter = Presenter::new(
                        tray_icon,
                        items.status_item.clone(),
                        IconSet::builtin(),
                        name.clone(),
                    );
                    app.subscribe(Box::new(move |state: &BatteryState| presenter.render(state)));
                    menu_items = Some(items);
                    info!("tray icon created");

                    // Wake up the run loop so the icon appears
                    {
                        use objc2_core_foundation::CFRunLoop;
                        if let Some(rl) = CFRunLoop::main() {
                            rl.wake_up();
                        }
                    }

                    poll_handle = Some(poller::start(
                        command.clone(),
                        low_power.clone(),
                        poll_tx.clone(),
                    ));
                }
                Transition::NoBattery => {
                    if let Err(e) = actions::show_no_battery_alert() {
                        warn!(error = %e, "failed to show no-battery alert");
                    }
                    *control_flow = ControlFlow::Exit;
                }
                Transition::Updated | Transition::Unchanged => {}
            },

            Event::UserEvent(UserEvent::Menu(event)) => {
                let Some(items) = menu_items.as_ref() else {
                    return;
                };
                if event.id == items.quit_item.id() {
                    info!("quit requested");
                    poll_handle.take();
                    *control_flow = ControlFlow::Exit;
                } else if event.id == items.settings_item.id() {
                    if let Err(e) = actions::open_battery_settings() {
                        warn!(error = %e, "failed to open battery settings");
                    }
                } else if event.id == items.login_item.id() {
                    match launch_agent.as_ref().map(LaunchAgent::enable) {
                        Some(Ok(())) => items.login_item.set_enabled(false),
                        Some(Err(e)) => warn!(error = %e, "failed to enable launch at login"),
                        None => warn!("launch at login unavailable"),
                    }
                } else if event.id == items.about_item.id() {
                    if let Err(e) = actions::show_about(&name, env!("CARGO_PKG_VERSION")) {
                        warn!(error = %e, "failed to show about dialog");
                    }
                }
            }

            _ => {}
        }
    })
}
