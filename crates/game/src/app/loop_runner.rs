use std::time::{Duration, Instant};

use gridview::{
    CompositeHost, EntityId, GridPosition, OverlayMode, RootViewModel, TileFieldError,
};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::bootstrap::AppWiring;
use super::sim::SimWorld;

const FRAME_CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub(crate) window_title: String,
    pub(crate) sim_tick: Duration,
    pub(crate) max_frame_delta: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Outpost".to_string(),
            sim_tick: Duration::from_millis(500),
            max_frame_delta: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to build tile field: {0}")]
    BuildTileField(#[from] TileFieldError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] pixels::Error),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub(crate) fn run_app(wiring: AppWiring) -> Result<(), AppError> {
    let AppWiring { config, mut styles } = wiring;

    let mut sim = SimWorld::new();
    let mut root = RootViewModel::default();
    root.set_tile_field(sim.tile_field()?);
    for event in sim.initial_events() {
        root.apply_world_event(event);
    }
    let mut host = CompositeHost::new(&mut root);
    host.sync(&mut root, &mut styles);

    let (canvas_width, canvas_height) = host.canvas_size_px();
    let buffer_width = canvas_width.max(1);
    let buffer_height = canvas_height.max(1);
    info!(
        canvas_width,
        canvas_height,
        entity_count = root.live_entity_count(),
        "presentation_bound"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(buffer_width as f64, buffer_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let surface = SurfaceTexture::new(buffer_width, buffer_height, window);
    let mut pixels =
        Pixels::new(buffer_width, buffer_height, surface).map_err(AppError::CreateSurface)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let unit_ids = sim.unit_ids();
    let field_size = sim.field_size();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => window_target.exit(),
                WindowEvent::Resized(size) => {
                    if size.width > 0 && size.height > 0 {
                        if let Err(err) = pixels.resize_surface(size.width, size.height) {
                            warn!(error = %err, "surface_resize_failed");
                        }
                    }
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => handle_key(code, &mut root, &unit_ids, field_size, window_target),
                WindowEvent::RedrawRequested => {
                    let frame = pixels.frame_mut();
                    for chunk in frame.chunks_exact_mut(4) {
                        chunk.copy_from_slice(&FRAME_CLEAR_COLOR);
                    }
                    host.composite_into(frame, buffer_width, buffer_height);
                    if let Err(err) = pixels.render() {
                        error!(error = %err, "present_failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                let delta = now
                    .duration_since(last_frame_instant)
                    .min(config.max_frame_delta);
                last_frame_instant = now;

                accumulator += delta;
                while accumulator >= config.sim_tick {
                    accumulator -= config.sim_tick;
                    for world_event in sim.tick() {
                        root.apply_world_event(world_event);
                    }
                }

                host.sync(&mut root, &mut styles);
                if host.take_dirty() {
                    window.request_redraw();
                }
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn handle_key(
    code: KeyCode,
    root: &mut RootViewModel,
    unit_ids: &[EntityId],
    field_size: (u32, u32),
    window_target: &EventLoopWindowTarget<()>,
) {
    match code {
        KeyCode::Escape => window_target.exit(),
        KeyCode::Tab => {
            let mode = next_overlay_mode(root.overlay_state().mode);
            debug!(mode = mode.display_name(), "overlay_mode_cycled");
            root.set_overlay_mode(mode);
        }
        KeyCode::Space => {
            let selected = next_selection(root.overlay_state().selected, unit_ids);
            root.select_entity(selected);
        }
        KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown => {
            let highlighted = step_highlight(root.overlay_state().highlighted, code, field_size);
            root.highlight_tile(highlighted);
        }
        _ => {}
    }
}

fn next_overlay_mode(mode: OverlayMode) -> OverlayMode {
    match mode {
        OverlayMode::None => OverlayMode::Thermal,
        OverlayMode::Thermal => OverlayMode::Power,
        OverlayMode::Power => OverlayMode::None,
    }
}

/// Cycles selection through the orderable units, then back to no selection.
fn next_selection(selected: Option<EntityId>, unit_ids: &[EntityId]) -> Option<EntityId> {
    match selected {
        None => unit_ids.first().copied(),
        Some(current) => unit_ids
            .iter()
            .position(|id| *id == current)
            .and_then(|index| unit_ids.get(index + 1))
            .copied(),
    }
}

fn step_highlight(
    highlighted: Option<GridPosition>,
    code: KeyCode,
    field_size: (u32, u32),
) -> Option<GridPosition> {
    let (field_width, field_height) = field_size;
    if field_width == 0 || field_height == 0 {
        return None;
    }
    let current = match highlighted {
        Some(position) => position,
        None => return Some(GridPosition { x: 0, y: 0 }),
    };
    let next = match code {
        KeyCode::ArrowLeft => GridPosition {
            x: current.x.saturating_sub(1),
            y: current.y,
        },
        KeyCode::ArrowRight => GridPosition {
            x: (current.x + 1).min(field_width - 1),
            y: current.y,
        },
        KeyCode::ArrowUp => GridPosition {
            x: current.x,
            y: current.y.saturating_sub(1),
        },
        KeyCode::ArrowDown => GridPosition {
            x: current.x,
            y: (current.y + 1).min(field_height - 1),
        },
        _ => current,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_mode_cycles_through_all_modes_and_wraps() {
        let mut mode = OverlayMode::None;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = next_overlay_mode(mode);
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![OverlayMode::Thermal, OverlayMode::Power, OverlayMode::None]
        );
    }

    #[test]
    fn selection_cycles_through_units_then_clears() {
        let units = [EntityId(1), EntityId(2)];
        assert_eq!(next_selection(None, &units), Some(EntityId(1)));
        assert_eq!(next_selection(Some(EntityId(1)), &units), Some(EntityId(2)));
        assert_eq!(next_selection(Some(EntityId(2)), &units), None);
        assert_eq!(next_selection(None, &[]), None);
    }

    #[test]
    fn highlight_starts_at_origin_and_clamps_to_the_field() {
        assert_eq!(
            step_highlight(None, KeyCode::ArrowRight, (4, 4)),
            Some(GridPosition { x: 0, y: 0 })
        );
        assert_eq!(
            step_highlight(Some(GridPosition { x: 3, y: 0 }), KeyCode::ArrowRight, (4, 4)),
            Some(GridPosition { x: 3, y: 0 })
        );
        assert_eq!(
            step_highlight(Some(GridPosition { x: 0, y: 0 }), KeyCode::ArrowLeft, (4, 4)),
            Some(GridPosition { x: 0, y: 0 })
        );
        assert_eq!(step_highlight(None, KeyCode::ArrowDown, (0, 0)), None);
    }
}
