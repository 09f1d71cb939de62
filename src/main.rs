// main.rs — 命令行入口：本地 3D 预览窗口 与 独立 HTML 导出

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bundle;
mod document;
mod error;
mod export;
mod i18n;
mod layout;
mod renderer;
mod viewer;

use bundle::{MultiViewBundle, ViewImage};
use document::{MAX_ROTATION_SPEED, MIN_ROTATION_SPEED};
use error::{MultiViewError, Result};
use export::ExportAdapter;
use layout::{compute_placements, LayoutMode, Placement};
use renderer::Renderer;
use viewer::ViewerState;

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Preview,
    Save,
}

#[derive(Debug, Clone)]
struct CliOptions {
    command: Command,
    mode: LayoutMode,
    speed: f32,
    auto_rotate: bool,
    inline: bool,
    out_dir: PathBuf,
    filename: String,
    inputs: Vec<PathBuf>,
}

fn parse_args() -> Result<CliOptions> {
    let mut command = None;
    let mut mode = LayoutMode::Ring;
    let mut speed = 1.0f32;
    let mut auto_rotate = true;
    let mut inline = false;
    let mut out_dir = PathBuf::from("output");
    let mut filename = document::DEFAULT_DOCUMENT_NAME.to_string();
    let mut inputs = Vec::new();

    let bad = MultiViewError::InvalidParameter;

    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "preview" if command.is_none() => command = Some(Command::Preview),
            "save" if command.is_none() => command = Some(Command::Save),
            "--mode" => {
                let v = it.next().ok_or_else(|| bad("--mode needs a value".into()))?;
                mode = v.parse().map_err(bad)?;
            }
            "--speed" => {
                let v = it.next().ok_or_else(|| bad("--speed needs a value".into()))?;
                speed = v
                    .parse()
                    .map_err(|_| bad(format!("invalid speed: {}", v)))?;
            }
            "--no-auto-rotate" => auto_rotate = false,
            "--inline" => inline = true,
            "--out" => {
                let v = it.next().ok_or_else(|| bad("--out needs a value".into()))?;
                out_dir = PathBuf::from(v);
            }
            "--name" => {
                filename = it.next().ok_or_else(|| bad("--name needs a value".into()))?;
            }
            "--lang" => {
                // 已由 i18n::resolve_lang_from_args 处理，这里只消耗值
                it.next();
            }
            other if other.starts_with("--") => {
                return Err(bad(format!("unknown flag: {}", other)));
            }
            _ => inputs.push(PathBuf::from(a)),
        }
    }

    if !(MIN_ROTATION_SPEED..=MAX_ROTATION_SPEED).contains(&speed) {
        return Err(bad(format!(
            "rotation speed {} outside [{}, {}]",
            speed, MIN_ROTATION_SPEED, MAX_ROTATION_SPEED
        )));
    }

    Ok(CliOptions {
        command: command.unwrap_or(Command::Preview),
        mode,
        speed,
        auto_rotate,
        inline,
        out_dir,
        filename,
        inputs,
    })
}

fn main() {
    i18n::init(i18n::resolve_lang_from_args());
    env_logger::init();

    let opts = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", i18n::tr("cli.usage"));
            std::process::exit(1);
        }
    };

    match opts.command {
        Command::Save => {
            if let Err(e) = run_save(&opts) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        Command::Preview => run_preview(opts),
    }
}

fn run_save(opts: &CliOptions) -> Result<()> {
    if opts.inputs.is_empty() {
        return Err(MultiViewError::Validation(i18n::tr("error.no_images")));
    }

    let mut images = Vec::with_capacity(opts.inputs.len());
    for path in &opts.inputs {
        let img = decode_image(path)?;
        images.push(ViewImage::from_rgb8(&img.to_rgb8())?);
    }
    let bundle = MultiViewBundle::from_batch(images)?;

    let refs = if opts.inline {
        export::data_uris(&bundle)?
    } else {
        ExportAdapter::new(&opts.out_dir).export_surfaces(&bundle)?
    };

    let html = document::generate(refs, opts.mode, opts.speed, opts.auto_rotate)?;
    let path = document::save_document(&opts.out_dir, &opts.filename, &html)?;

    log::info!(
        "{}",
        i18n::tr_with("log.saved_document", &[("path", path.display().to_string())])
    );
    println!("{}", path.display());
    Ok(())
}

fn decode_image(path: &Path) -> Result<image::DynamicImage> {
    let file = File::open(path).map_err(|e| MultiViewError::Decode {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map_err(|source| MultiViewError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

fn run_preview(opts: CliOptions) {
    let mut paths = opts.inputs.clone();
    if paths.is_empty() {
        if let Some(picked) = rfd::FileDialog::new()
            .add_filter(
                &i18n::tr("file.filter.images"),
                &["jpg", "jpeg", "png", "bmp"],
            )
            .pick_files()
        {
            paths = picked;
        }
    }
    if paths.is_empty() {
        eprintln!("{}", i18n::tr("error.no_images"));
        std::process::exit(1);
    }

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .unwrap(),
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()));
    let mut state = ViewerState::new(opts.auto_rotate);
    let mode = opts.mode;
    let speed = opts.speed;

    // 解码线程把 (代次, 序号, 像素) 发回主线程；代次不匹配的迟到结果被丢弃
    let (tx, rx) = channel::<(u64, usize, RgbaImage)>();
    let mut generation: u64 = 0;
    let mut placements: Vec<Placement> = Vec::new();
    start_session(&paths, mode, generation, &tx, &mut placements);

    let mut last_cursor = PhysicalPosition::new(0.0f64, 0.0f64);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok((gen, idx, rgba)) = rx.try_recv() {
            if gen == generation {
                renderer.add_surface(&placements[idx], mode.surface_size(), &rgba);
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::MouseInput {
                        state: btn_state,
                        button,
                        ..
                    } => {
                        if button == MouseButton::Left {
                            if btn_state == ElementState::Pressed {
                                state.pointer_down(last_cursor.x, last_cursor.y);
                            } else {
                                state.pointer_up();
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        last_cursor = position;
                        state.pointer_move(position.x, position.y);
                    }

                    WindowEvent::DroppedFile(path) => {
                        // 拖入新图片：整组重新布局、重新加载
                        paths.push(path);
                        generation += 1;
                        renderer.clear_surfaces();
                        start_session(&paths, mode, generation, &tx, &mut placements);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                state.tick(speed);
                renderer.update_camera(&state);

                let loaded = renderer.surface_count();
                let total = placements.len();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &mut state, mode, speed, loaded, total);
                });

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

/// 计算当前图片集的布局并为每张（未被截断的）图启动解码线程。
fn start_session(
    paths: &[PathBuf],
    mode: LayoutMode,
    generation: u64,
    tx: &Sender<(u64, usize, RgbaImage)>,
    placements: &mut Vec<Placement>,
) {
    *placements = compute_placements(paths.len(), mode);
    for (idx, path) in paths.iter().take(placements.len()).enumerate() {
        start_load_image(idx, generation, path.clone(), tx.clone());
    }
}

fn start_load_image(
    index: usize,
    generation: u64,
    path: PathBuf,
    tx: Sender<(u64, usize, RgbaImage)>,
) {
    thread::spawn(move || {
        log::info!(
            "{}",
            i18n::tr_with("log.decoding", &[("path", format!("{:?}", path))])
        );

        match decode_image(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                if tx.send((generation, index, rgba)).is_err() {
                    log::warn!("{}", i18n::tr("error.send_to_main_failed"));
                }
            }
            // 单张解码失败只影响该平面，场景继续
            Err(e) => log::warn!(
                "{}",
                i18n::tr_with("error.decode_image", &[("err", format!("{}", e))])
            ),
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    state: &mut ViewerState,
    mode: LayoutMode,
    speed: f32,
    loaded: usize,
    total: usize,
) {
    egui::TopBottomPanel::top("controls").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let toggle_label = if state.is_rotating {
                i18n::tr("ui.btn.pause")
            } else {
                i18n::tr("ui.btn.resume")
            };
            if ui.button(toggle_label).clicked() {
                state.toggle_rotation();
            }
            if ui.button(i18n::tr("ui.btn.reset")).clicked() {
                state.reset();
            }
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("{} {}", i18n::tr("ui.status.mode"), mode.as_str()));
            ui.label("|");
            ui.label(format!("{} {:.1}", i18n::tr("ui.status.speed"), speed));
            ui.label("|");
            let surfaces = i18n::tr_with(
                "ui.status.surfaces",
                &[("loaded", loaded.to_string()), ("total", total.to_string())],
            );
            if loaded < total {
                ui.label(egui::RichText::new(surfaces).color(egui::Color32::YELLOW));
            } else {
                ui.label(surfaces);
            }
        });
    });
}
