// main.rs — window, event loop, startup pipeline and egui chrome

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // no console window in release builds

mod renderer;

use renderer::{Renderer, SceneLayout};
use turntable_viewer::assets::{AssetLoadError, LoadPipeline, LoadStage};
use turntable_viewer::compositor::ViewCompositor;
use turntable_viewer::config::{self, CliArgs, ViewerConfig};
use turntable_viewer::i18n::{self, tr, tr_with};
use turntable_viewer::input::{InteractionRegion, PointerEvent};
use turntable_viewer::mapper::OffsetPolicy;
use turntable_viewer::viewer::ViewerState;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{CursorIcon, Fullscreen, WindowBuilder},
};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Where the app is in its lifecycle. Only `Running` accepts rotation input.
enum Phase {
    /// No capture directory chosen yet.
    Empty,
    Loading(LoadPipeline),
    Running {
        state: ViewerState,
        compositor: ViewCompositor<Renderer>,
    },
    Failed(AssetLoadError),
}

impl Phase {
    fn start_loading(config: &ViewerConfig, dir: PathBuf) -> Self {
        log::info!(
            "{}",
            tr_with("log.loading_dir", &[("dir", dir.display().to_string())])
        );
        Phase::Loading(LoadPipeline::for_directory(
            dir,
            config.canvas(),
            config.label_text.clone(),
            config.font_path.clone(),
            config.load_timeout(),
        ))
    }
}

/// Things the user asked for through the menus during one frame.
#[derive(Default)]
struct UiActions {
    open_folder: Option<PathBuf>,
    reset_view: bool,
    offset_policy: Option<OffsetPolicy>,
    toggle_fullscreen: bool,
    language_changed: bool,
}

/// Read-only snapshot of the app for the status bar.
struct StatusInfo<'a> {
    phase: &'a Phase,
    readout: &'a str,
    fps: f32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = CliArgs::from_env();
    let mut current_lang = config::resolve_lang(&cli);
    i18n::init(current_lang.clone());
    let config = config::load(&cli);

    log::info!("turntable_viewer v{}", env!("CARGO_PKG_VERSION"));

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
    {
        Ok(w) => Arc::new(w),
        Err(e) => {
            log::error!("{}", tr_with("error.window", &[("err", e.to_string())]));
            std::process::exit(1);
        }
    };

    let rig = config.camera_rig();
    let layout = SceneLayout {
        plane_width: config.plane_width as f32,
        plane_height: config.plane_height() as f32,
        elevation: rig.elevation as f32,
    };
    let mut renderer = match pollster::block_on(Renderer::new(window.clone(), layout, rig.viewpoint(0.0))) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{}", tr_with("error.renderer", &[("err", e.to_string())]));
            std::process::exit(1);
        }
    };

    let mut phase = match config.images_dir.clone() {
        Some(dir) => Phase::start_loading(&config, dir),
        None => Phase::Empty,
    };

    // interaction state
    let mut cursor: Option<(f64, f64)> = None;
    let mut region = InteractionRegion::from_size(
        renderer.size.width as f64,
        renderer.size.height as f64,
    );
    let mut sensitivity_scale = 1.0f32;
    let mut is_fullscreen = false;

    // FPS
    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;
    let mut fps = 0.0;
    let mut show_fps = false;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Phase::Loading(pipeline) = &mut phase {
            match pipeline.poll(Instant::now()) {
                None => {}
                Some(Ok(assets)) => {
                    renderer.set_label(assets.label.as_ref());
                    let count = assets.images.len();
                    let sensitivity = config.sensitivity * sensitivity_scale as f64;
                    let state = ViewerState::new(count, sensitivity, config.offset_policy);
                    let mut compositor = ViewCompositor::new(assets.images, rig);
                    compositor.apply(&mut renderer, state.resolved());
                    log::info!(
                        "{}",
                        tr_with("log.ready", &[("count", count.get().to_string())])
                    );
                    phase = Phase::Running { state, compositor };
                }
                Some(Err(e)) => {
                    log::error!("{}", tr_with("error.load", &[("err", e.to_string())]));
                    phase = Phase::Failed(e);
                }
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // egui sees every event first
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                let pointer = match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                        None
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        None
                    }

                    WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                        match input.virtual_keycode {
                            Some(VirtualKeyCode::O) => {
                                if let Some(dir) = pick_folder() {
                                    open_image_set(&mut phase, &mut renderer, &config, dir);
                                }
                            }
                            Some(VirtualKeyCode::F11) => {
                                is_fullscreen = !is_fullscreen;
                                set_fullscreen(&window, is_fullscreen);
                            }
                            Some(VirtualKeyCode::Right) => step(&mut phase, &mut renderer, 1),
                            Some(VirtualKeyCode::Left) => step(&mut phase, &mut renderer, -1),
                            _ => {}
                        }
                        None
                    }

                    // pointer
                    WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                        match state {
                            ElementState::Pressed => cursor.map(|(x, y)| PointerEvent::Press { x, y }),
                            ElementState::Released => Some(PointerEvent::Release),
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = Some((position.x, position.y));
                        Some(PointerEvent::Move { x: position.x, y: position.y })
                    }

                    WindowEvent::CursorLeft { .. } => {
                        cursor = None;
                        Some(PointerEvent::Leave)
                    }
                    WindowEvent::Focused(false) => Some(PointerEvent::Leave),

                    WindowEvent::DroppedFile(path) => {
                        let dir = if path.is_dir() {
                            Some(path)
                        } else {
                            path.parent().map(|p| p.to_path_buf())
                        };
                        if let Some(dir) = dir {
                            open_image_set(&mut phase, &mut renderer, &config, dir);
                        }
                        None
                    }

                    _ => None,
                };

                if let (Some(pointer), Phase::Running { state, compositor }) = (pointer, &mut phase) {
                    let (next, view) = state.on_pointer(pointer, &region);
                    if next.drag.is_dragging() != state.drag.is_dragging() {
                        window.set_cursor_icon(if next.drag.is_dragging() {
                            CursorIcon::Grabbing
                        } else {
                            CursorIcon::Default
                        });
                    }
                    *state = next;
                    if let Some(view) = view {
                        compositor.apply(&mut renderer, view);
                    }
                }
            }

            Event::RedrawRequested(_) => {
                // FPS counter
                frame_count += 1;
                let now = Instant::now();
                if now.duration_since(last_frame_time).as_secs_f32() >= 1.0 {
                    fps = frame_count as f32 / now.duration_since(last_frame_time).as_secs_f32();
                    frame_count = 0;
                    last_frame_time = now;
                }

                let mut actions = UiActions::default();
                let mut scene_rect = None;
                let readout = renderer.readout().to_string();
                let status = StatusInfo {
                    phase: &phase,
                    readout: &readout,
                    fps,
                };
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(
                        ctx,
                        &status,
                        &mut actions,
                        &mut sensitivity_scale,
                        &mut show_fps,
                        is_fullscreen,
                        &mut current_lang,
                    );
                    scene_rect = Some(ctx.available_rect());
                });

                if let Some(rect) = scene_rect {
                    let ppp = window.scale_factor();
                    region = InteractionRegion::new(
                        rect.min.x as f64 * ppp,
                        rect.min.y as f64 * ppp,
                        rect.max.x as f64 * ppp,
                        rect.max.y as f64 * ppp,
                    );
                }

                if let Phase::Running { state, .. } = &mut phase {
                    state
                        .rotation
                        .set_sensitivity(config.sensitivity * sensitivity_scale as f64);
                }
                apply_actions(
                    actions,
                    &mut phase,
                    &mut renderer,
                    &config,
                    &window,
                    &mut is_fullscreen,
                );

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn pick_folder() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(&tr("menu.open_folder"))
        .pick_folder()
}

fn set_fullscreen(window: &winit::window::Window, on: bool) {
    if on {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

/// Drop the current image set, if any, and start loading `dir`.
fn open_image_set(phase: &mut Phase, renderer: &mut Renderer, config: &ViewerConfig, dir: PathBuf) {
    if let Phase::Running { compositor, .. } = phase {
        compositor.clear(renderer);
    }
    renderer.set_label(None);
    *phase = Phase::start_loading(config, dir);
}

fn step(phase: &mut Phase, renderer: &mut Renderer, slots: i32) {
    if let Phase::Running { state, compositor } = phase {
        let (next, view) = state.step_slots(slots);
        *state = next;
        if let Some(view) = view {
            compositor.apply(renderer, view);
        }
    }
}

fn apply_actions(
    actions: UiActions,
    phase: &mut Phase,
    renderer: &mut Renderer,
    config: &ViewerConfig,
    window: &winit::window::Window,
    is_fullscreen: &mut bool,
) {
    if let Some(dir) = actions.open_folder {
        open_image_set(phase, renderer, config, dir);
    }

    if let Phase::Running { state, compositor } = phase {
        if actions.reset_view {
            let (next, view) = state.reset();
            *state = next;
            compositor.apply(renderer, view);
        }
        if let Some(policy) = actions.offset_policy {
            let (next, view) = state.with_policy(policy);
            *state = next;
            compositor.apply(renderer, view);
        }
    }

    if actions.toggle_fullscreen {
        *is_fullscreen = !*is_fullscreen;
        set_fullscreen(window, *is_fullscreen);
    }
    if actions.language_changed {
        window.set_title(&tr("app.title"));
    }
}

fn status_text(phase: &Phase, readout: &str) -> (String, Option<egui::Color32>) {
    match phase {
        Phase::Empty => (tr("status.no_images"), None),
        Phase::Loading(pipeline) => {
            let key = match pipeline.stage() {
                Some(LoadStage::Label) => "status.loading_label",
                _ => "status.loading_images",
            };
            (tr(key), Some(egui::Color32::YELLOW))
        }
        Phase::Running { state, .. } => (
            tr_with(
                "status.image",
                &[
                    ("index", readout.to_string()),
                    ("count", state.image_count.get().to_string()),
                ],
            ),
            None,
        ),
        Phase::Failed(e) => (
            tr_with("status.load_failed", &[("err", e.to_string())]),
            Some(egui::Color32::RED),
        ),
    }
}

fn draw_ui(
    ctx: &egui::Context,
    status: &StatusInfo,
    actions: &mut UiActions,
    sensitivity_scale: &mut f32,
    show_fps: &mut bool,
    is_fullscreen: bool,
    current_lang: &mut String,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_folder")).clicked() {
                    ui.close_menu();
                    actions.open_folder = pick_folder();
                }
                if ui.button(tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            // View
            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("view.reset")).clicked() {
                    actions.reset_view = true;
                    ui.close_menu();
                }

                if ui
                    .button(if is_fullscreen {
                        tr("view.fullscreen.exit")
                    } else {
                        tr("view.fullscreen.enter")
                    })
                    .clicked()
                {
                    actions.toggle_fullscreen = true;
                    ui.close_menu();
                }

                ui.separator();
                ui.menu_button(tr("view.input_sensitivity"), |ui| {
                    ui.add(
                        egui::Slider::new(sensitivity_scale, 0.1..=5.0)
                            .text(tr("view.multiplier")),
                    );
                    if ui.button(tr("view.reset_1_0")).clicked() {
                        *sensitivity_scale = 1.0;
                    }
                });

                if let Phase::Running { state, .. } = status.phase {
                    ui.menu_button(tr("view.offset_policy"), |ui| {
                        let mut policy = state.offset_policy;
                        for (value, key) in [
                            (OffsetPolicy::Centered, "offset.centered"),
                            (OffsetPolicy::Raw, "offset.raw"),
                        ] {
                            if ui.radio_value(&mut policy, value, tr(key)).clicked() {
                                actions.offset_policy = Some(policy);
                                ui.close_menu();
                            }
                        }
                    });
                }

                ui.separator();
                if ui.checkbox(show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
            });

            // Language
            ui.menu_button(tr("menu.language"), |ui| {
                let langs: [(&str, &str); 3] = [
                    ("en", "English"),
                    ("zh-Hans", "简体中文"),
                    ("fr", "Français"),
                ];

                for (code, name) in langs {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        i18n::init(current_lang.clone());
                        actions.language_changed = true;
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let (text, color) = status_text(status.phase, status.readout);
            match color {
                Some(color) => ui.label(egui::RichText::new(text).color(color)),
                None => ui.label(text),
            };

            if let Phase::Running { state, compositor } = status.phase {
                if let Some(view) = compositor.shown() {
                    ui.label("|");
                    ui.label(format!(
                        "{} {:.1}°",
                        tr("status.angle_prefix"),
                        state.rotation.angle().to_degrees()
                    ));
                    ui.label("|");
                    ui.label(format!(
                        "{} {:+.2}°",
                        tr("status.offset_prefix"),
                        view.offset_angle.to_degrees()
                    ));
                }
            }

            if *show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", status.fps)).color(egui::Color32::GREEN),
                );
            }
        });
    });
}
