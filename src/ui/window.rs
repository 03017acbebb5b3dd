// Main window for the mediawall display
// GTK4 ApplicationWindow holding the wall widget and the rotation timer

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{glib, Application, ApplicationWindow, CssProvider, STYLE_PROVIDER_PRIORITY_APPLICATION};
use tracing::{error, info, trace, warn};

use super::slot_loader::SlotImageLoader;
use super::wall_widget::WallWidget;
use crate::config::WallConfig;
use crate::feeder::Playlist;
use crate::scanner::FileScanner;

const FALLBACK_DISPLAY_SIZE: (i32, i32) = (1920, 1080);

/// CSS for the wall - embedded, there is no chrome to theme
const WALL_CSS: &str = r#"
window {
    background-color: #000000;
}

picture.wall-tile {
    background-color: #0a0a0a;
}
"#;

pub struct MainWindow {
    window: ApplicationWindow,
}

impl MainWindow {
    pub fn new(app: &Application, media_dir: Option<&Path>) -> Self {
        load_css();

        let window = ApplicationWindow::builder()
            .application(app)
            .title("mediawall")
            .default_width(1280)
            .default_height(720)
            .build();

        let wall = WallWidget::new();
        window.set_child(Some(&wall));

        let config = WallConfig::from_env();
        let (display_width, display_height) = primary_display_size();

        match wall.setup(&config, display_width, display_height) {
            Ok(()) => Self::start_rotation(&wall, &config, media_dir),
            // Bad tile geometry from the environment is fatal for the
            // wall; the window stays up empty so the error is visible.
            Err(err) => error!(error = %err, "wall configuration rejected"),
        }

        Self { window }
    }

    pub fn present(&self) {
        self.window.present();
    }

    fn start_rotation(wall: &WallWidget, config: &WallConfig, media_dir: Option<&Path>) {
        let dir = media_dir.unwrap_or_else(|| Path::new("."));
        let items = match FileScanner::new().scan(dir) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = ?err, "media scan failed, wall stays empty");
                Vec::new()
            }
        };
        if items.is_empty() {
            warn!(dir = ?dir, "no media found, wall stays empty");
            return;
        }
        info!(items = items.len(), dir = ?dir, "feeding wall");

        let playlist = Rc::new(RefCell::new(Playlist::new(items, config.shuffle)));
        let loader = SlotImageLoader::new(config.tile_width, config.tile_height);

        let wall_weak = wall.downgrade();
        loader.connect_ready(move |slot, item, token, texture| {
            if let Some(wall) = wall_weak.upgrade() {
                wall.apply_texture(slot, item, token, texture);
            }
        });

        let wall_weak = wall.downgrade();
        glib::timeout_add_local(
            Duration::from_millis(u64::from(config.rotation_interval_ms)),
            move || {
                let Some(wall) = wall_weak.upgrade() else {
                    return glib::ControlFlow::Break;
                };
                let Some(item) = playlist.borrow_mut().next() else {
                    return glib::ControlFlow::Break;
                };
                // Videos only go into slots that are entirely on screen.
                let Some(target) = wall.next_load_target(item.is_video()) else {
                    trace!("no eligible slot this tick");
                    return glib::ControlFlow::Continue;
                };
                let token = wall.begin_load(target);
                loader.request(target, item, token);
                glib::ControlFlow::Continue
            },
        );
    }
}

fn primary_display_size() -> (i32, i32) {
    let size = Display::default().and_then(|display| {
        let monitor = display.monitors().item(0)?;
        let monitor = monitor.downcast::<gdk4::Monitor>().ok()?;
        let geometry = monitor.geometry();
        Some((geometry.width(), geometry.height()))
    });
    match size {
        Some(size) => size,
        None => {
            warn!("no monitor geometry available, assuming 1920x1080");
            FALLBACK_DISPLAY_SIZE
        }
    }
}

fn load_css() {
    let Some(display) = Display::default() else {
        warn!("no display for CSS provider");
        return;
    };
    let provider = CssProvider::new();
    provider.load_from_string(WALL_CSS);
    gtk4::style_context_add_provider_for_display(
        &display,
        &provider,
        STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
