use crate::config::{self, Config, ItemConfig, Overrides};
use crate::events::AppEvent;
use crate::gui::fab::FabCanvas;
use crate::gui::theme;
use gtk::prelude::*;
use gtk4 as gtk;
use jellyfab::{Command, FabSpec, FabState, JellyFab, MenuItem, Point};
use relm4::prelude::*;
use std::path::PathBuf;
use std::process::Stdio;

pub struct AppModel {
    pub canvas: FabCanvas,
    pub config_path: Option<PathBuf>,
    pub overrides: Overrides,
}

#[derive(Debug)]
pub enum AppMsg {
    Click(Point),
    Dismiss,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

fn run_item(item: &ItemConfig) -> MenuItem {
    let name = item.name().to_string();
    let exec = item.exec.clone();
    MenuItem::new(item.icon.clone(), move || {
        log::info!("Activated '{}'", name);
        let Some(exec) = &exec else {
            return;
        };
        if let Err(e) = std::process::Command::new("sh")
            .arg("-c")
            .arg(exec.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            log::error!("Failed to run '{}': {}", exec, e);
        }
    })
}

/// Primary items only dismiss the menu, so any `exec` on them is ignored.
fn primary_item(item: &ItemConfig) -> MenuItem {
    if item.exec.is_some() {
        log::warn!("Ignoring exec of primary item '{}'", item.name());
    }
    MenuItem::new(item.icon.clone(), || {})
}

/// Builds the menu described by `config`, starting from `state`.
pub fn build_menu(config: &Config, state: FabState) -> JellyFab {
    let style = &config.style;
    JellyFab::new(FabSpec {
        main_diameter: style.main_diameter,
        item_diameter: style.item_diameter,
        main_color: style.main_color,
        item_color: style.item_color,
        primary: config.primary.iter().map(primary_item).collect(),
        secondary: config.secondary.iter().map(run_item).collect(),
        show_overlay: config.show_overlay,
        options: config.options.clone(),
        state,
    })
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Config,
        Option<PathBuf>,
        Overrides,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Jelly FAB"),
            set_default_width: 480,
            set_default_height: 640,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Dismiss);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "jellyfab-drawing-area",

                add_controller = gtk::GestureClick {
                    set_button: gtk::gdk::BUTTON_PRIMARY,
                    connect_pressed[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, overrides, rx) = init;

        theme::load_css();

        let widgets = view_output!();

        let fab = build_menu(&config, config.initial_state);
        let canvas = FabCanvas::new(fab, widgets.drawing_area.clone(), config.style.margin);

        let model = AppModel {
            canvas,
            config_path,
            overrides,
        };

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Click(point) => {
                self.canvas.click(point);
            }
            AppMsg::Dismiss => {
                if self.canvas.handle().get().is_open() {
                    self.canvas.apply(Command::CompoundClose { invoke: None });
                }
            }
            AppMsg::ConfigReload => match config::load_config(self.config_path.as_deref()) {
                Ok(new_config) => {
                    let new_config = self.overrides.apply(new_config);
                    let state = self.canvas.handle().get();
                    let fab = build_menu(&new_config, state);
                    self.canvas.replace(fab, new_config.style.margin);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShellCommand, StyleConfig};
    use jellyfab::FabOptions;
    use std::time::Duration;

    fn item(icon: &str, exec: Option<&str>) -> ItemConfig {
        ItemConfig {
            icon: icon.to_string(),
            label: None,
            exec: exec.map(ShellCommand::new),
        }
    }

    #[test]
    fn test_primary_items_never_run_commands() {
        let marker =
            std::env::temp_dir().join(format!("jellyfab-primary-{}", std::process::id()));
        let _ = fs_err::remove_file(&marker);
        let touch = format!("touch '{}'", marker.display());

        let config = Config {
            show_overlay: true,
            style: StyleConfig::default(),
            options: FabOptions::default(),
            initial_state: FabState::default(),
            primary: vec![item("document-new", Some(&touch))],
            secondary: vec![item("mail-send", None)],
        };
        let mut fab = build_menu(&config, FabState::new(true, false));
        assert_eq!(fab.primary_items().len(), 1);
        assert_eq!(fab.secondary_items().len(), 1);

        // tapping the only primary item dismisses the menu without running anything
        assert_eq!(fab.tap(jellyfab::TapTarget::Primary(0)), Command::Collapse);
        for _ in 0..100 {
            fab.tick(Duration::from_millis(16));
        }
        std::thread::sleep(Duration::from_millis(200));
        assert!(!marker.exists());
        assert!(!fab.state().is_open());
    }
}
