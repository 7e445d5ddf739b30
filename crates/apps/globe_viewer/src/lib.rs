use console_error_panic_hook::set_once;
use foundation::math::Vec2;
use gloo_net::http::Request;
use std::cell::RefCell;
use tracing::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::{ViewerConfig, marker_specs, parse_countries};

pub mod assets;
pub mod controller;
pub mod hover;
pub mod logging;
pub mod viewer;
mod wgpu;

use assets::{AssetError, TextureImage, decode_texture};
use controller::Viewport;
use hover::HoverState;
use viewer::Viewer;
use crate::wgpu::{
    WgpuContext, init_wgpu_from_canvas_id, max_texture_dimension, render_frame, resize_wgpu,
    set_globe_texture, set_star_points,
};

#[derive(Debug, Default)]
struct AppState {
    viewer: Option<Viewer>,
    wgpu: Option<WgpuContext>,
    /// Texture decoded before the GPU context was ready.
    pending_texture: Option<TextureImage>,
    /// Tooltip state last written to the DOM.
    applied_hover: Option<HoverState>,
    pixel_ratio: f64,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState {
        pixel_ratio: 1.0,
        ..AppState::default()
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Builds the scene from a JSON config (`"{}"` for defaults) and starts
/// loading the GPU context, the country dataset and the globe texture.
#[wasm_bindgen]
pub fn init_viewer(config_json: &str) -> Result<(), JsValue> {
    let config =
        ViewerConfig::from_json_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    logging::init_logging(&config.log_filter);

    let seed = config.stars.seed.unwrap_or_else(random_seed);
    let viewer = Viewer::new(config.clone(), seed);
    info!(stars = config.stars.count, "globe viewer initialized");

    STATE.with(|state| {
        let mut s = state.borrow_mut();
        s.viewer = Some(viewer);
        s.applied_hover = None;
    });

    let canvas_id = config.dom.canvas_id.clone();
    let segments = config.globe.segments;
    spawn_local(async move {
        if let Err(err) = init_wgpu_inner(&canvas_id, segments).await {
            error!(error = ?err, "wgpu init failed");
        }
    });

    let countries_url = config.assets.countries_url.clone();
    spawn_local(async move {
        if let Err(err) = load_countries(&countries_url).await {
            error!(%err, "country dataset unavailable");
            with_viewer(|viewer| viewer.place_dataset(&[]));
        }
    });

    let texture_url = config.assets.globe_texture_url.clone();
    spawn_local(async move {
        if let Err(err) = load_texture(&texture_url).await {
            error!(%err, "globe texture unavailable");
        }
    });

    Ok(())
}

/// Page geometry in CSS pixels plus the device pixel ratio.
#[wasm_bindgen]
pub fn set_viewport(
    window_width: f64,
    window_height: f64,
    canvas_top: f64,
    canvas_width: f64,
    canvas_height: f64,
    pixel_ratio: f64,
) {
    STATE.with(|state| {
        let mut s = state.borrow_mut();
        s.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        if let Some(viewer) = &mut s.viewer {
            viewer.resize(Viewport {
                window_width,
                window_height,
                canvas_top,
                canvas_width,
                canvas_height,
            });
        }
        let ratio = s.pixel_ratio;
        if let Some(ctx) = &mut s.wgpu {
            resize_wgpu(
                ctx,
                (canvas_width * ratio).round() as u32,
                (canvas_height * ratio).round() as u32,
            );
        }
    });
}

#[wasm_bindgen]
pub fn on_mouse_down(client_x: f64, client_y: f64) {
    with_viewer(|viewer| viewer.mouse_down(Vec2::new(client_x, client_y)));
}

/// Returns `true` while dragging; the host should then call `preventDefault`.
#[wasm_bindgen]
pub fn on_mouse_move(client_x: f64, client_y: f64) -> bool {
    with_viewer(|viewer| viewer.mouse_move(Vec2::new(client_x, client_y))).unwrap_or(false)
}

#[wasm_bindgen]
pub fn on_mouse_up() {
    with_viewer(|viewer| viewer.mouse_up());
}

/// First touch point of a `touchmove`. Returns `true` when the gesture
/// rotates the globe.
#[wasm_bindgen]
pub fn on_touch_move(client_x: f64, client_y: f64) -> bool {
    with_viewer(|viewer| viewer.touch_move(Vec2::new(client_x, client_y))).unwrap_or(false)
}

#[wasm_bindgen]
pub fn on_touch_end() {
    with_viewer(|viewer| viewer.touch_end());
}

/// Advances and draws one frame. Call from `requestAnimationFrame`.
#[wasm_bindgen]
pub fn frame(timestamp_ms: f64) -> Result<(), JsValue> {
    let hover = STATE.with(|state| -> Result<Option<(HoverState, ViewerConfig)>, JsValue> {
        let mut s = state.borrow_mut();
        let AppState {
            viewer,
            wgpu,
            applied_hover,
            ..
        } = &mut *s;
        let Some(viewer) = viewer.as_mut() else {
            return Ok(None);
        };

        let render = viewer.frame(timestamp_ms);
        for event in viewer.events_mut().drain() {
            debug!(frame = event.frame_index, kind = %event.kind, "{}", event.message);
        }
        if let Some(ctx) = wgpu.as_mut() {
            render_frame(ctx, &render)?;
        }

        let hover = viewer.hover().clone();
        if applied_hover.as_ref() == Some(&hover) {
            return Ok(None);
        }
        *applied_hover = Some(hover.clone());
        Ok(Some((hover, viewer.config().clone())))
    })?;

    if let Some((hover, config)) = hover {
        apply_hover(&hover, &config)?;
    }
    Ok(())
}

fn with_viewer<R>(f: impl FnOnce(&mut Viewer) -> R) -> Option<R> {
    STATE.with(|state| state.borrow_mut().viewer.as_mut().map(f))
}

fn random_seed() -> u64 {
    let hi = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    let lo = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (hi << 32) | lo
}

/// Writes the tooltip state into the page. Text goes through
/// `textContent`, so dataset strings are never parsed as HTML.
fn apply_hover(hover: &HoverState, config: &ViewerConfig) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let Some(tooltip) = document.get_element_by_id(&config.dom.tooltip_id) else {
        return Ok(());
    };
    let tooltip = tooltip.dyn_into::<web_sys::HtmlElement>()?;
    let style = tooltip.style();

    if let Some(position) = hover.position {
        style.set_property(
            "transform",
            &format!("translate({}px, {}px)", position.x, position.y),
        )?;
    }
    if !hover.visible {
        return style.set_property("display", "none");
    }
    style.set_property("display", "block")?;

    if let Some(el) = document.get_element_by_id(&config.dom.country_id) {
        el.set_text_content(Some(&hover.country));
    }
    if let Some(el) = document.get_element_by_id(&config.dom.population_id) {
        el.set_text_content(Some(&hover.population));
    }
    Ok(())
}

async fn init_wgpu_inner(canvas_id: &str, segments: u32) -> Result<(), JsValue> {
    let mut ctx = init_wgpu_from_canvas_id(canvas_id, segments).await?;

    STATE.with(|state| {
        let mut s = state.borrow_mut();
        if let Some(viewer) = &s.viewer {
            let world = viewer.world();
            let stars = world
                .drawable_3d(viewer.scene().stars)
                .and_then(|d| match d.shape {
                    scene::components::Shape3D::Points { cloud } => Some(cloud),
                    _ => None,
                })
                .map(|cloud| gpu::point_vertices(world, cloud))
                .unwrap_or_default();
            set_star_points(&mut ctx, &stars);
        }
        if let Some(image) = s.pending_texture.take() {
            set_globe_texture(&mut ctx, &image);
        }
        s.wgpu = Some(ctx);
    });
    info!("wgpu ready");
    Ok(())
}

async fn load_countries(url: &str) -> Result<(), AssetError> {
    let text = fetch_text(url).await?;
    let records = parse_countries(&text)?;
    let specs = marker_specs(&records);
    let skipped = records.len() - specs.len();
    if skipped > 0 {
        warn!(skipped, "some countries have no coordinates");
    }
    with_viewer(|viewer| viewer.place_dataset(&specs));
    Ok(())
}

async fn load_texture(url: &str) -> Result<(), AssetError> {
    let bytes = fetch_bytes(url).await?;
    let max_dimension = STATE.with(|state| {
        state
            .borrow()
            .wgpu
            .as_ref()
            .map_or(2048, max_texture_dimension)
    });
    let image = decode_texture(&bytes, max_dimension)?;
    info!(width = image.width, height = image.height, "globe texture decoded");

    STATE.with(|state| {
        let s = &mut *state.borrow_mut();
        match &mut s.wgpu {
            Some(ctx) => set_globe_texture(ctx, &image),
            None => s.pending_texture = Some(image),
        }
    });
    Ok(())
}

async fn fetch_response(url: &str) -> Result<gloo_net::http::Response, AssetError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| AssetError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    if !resp.ok() {
        return Err(AssetError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    Ok(resp)
}

async fn fetch_text(url: &str) -> Result<String, AssetError> {
    fetch_response(url)
        .await?
        .text()
        .await
        .map_err(|e| AssetError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    fetch_response(url)
        .await?
        .binary()
        .await
        .map_err(|e| AssetError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
}
