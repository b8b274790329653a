//! Browser binding
//!
//! The page owns the animation loop (`requestAnimationFrame`) and the
//! reactive formula variables. Each frame it calls `tick` with its variable
//! getter and draws the returned JSON snapshot. Control calls queue commands
//! that take effect at the start of the next tick.

use wasm_bindgen::prelude::*;

use crate::probability::ProbabilitySource;
use crate::settings::Settings;
use crate::sim::{Simulation, TickInput, tick};

/// Upstream getter: `(name: string) => number`
struct JsProbabilitySource<'a> {
    get_variable: &'a js_sys::Function,
}

impl ProbabilitySource for JsProbabilitySource<'_> {
    fn get_variable(&self, name: &str) -> f64 {
        self.get_variable
            .call1(&JsValue::NULL, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN)
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
pub struct VennDrop {
    sim: Simulation,
    input: TickInput,
}

#[wasm_bindgen]
impl VennDrop {
    /// Create an engine; `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> VennDrop {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).unwrap_or_else(|err| {
                log::warn!("Using default settings: {}", err);
                Settings::default()
            })
        };
        log::info!("Venn Drop engine created (seed {})", settings.seed);
        VennDrop {
            sim: Simulation::new(settings),
            input: TickInput::default(),
        }
    }

    #[wasm_bindgen(js_name = toggleRunning)]
    pub fn toggle_running(&mut self) {
        self.input.toggle_running = !self.input.toggle_running;
    }

    pub fn reset(&mut self) {
        // A reset supersedes anything queued before it
        self.input.clear();
        self.input.reset = true;
    }

    #[wasm_bindgen(js_name = setSpawnRate)]
    pub fn set_spawn_rate(&mut self, rate: f32) {
        self.input.spawn_rate = Some(rate);
    }

    #[wasm_bindgen(js_name = setSpeedMultiplier)]
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.input.speed_multiplier = Some(multiplier);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    /// Advance one frame and return the snapshot as JSON
    pub fn tick(&mut self, get_variable: &js_sys::Function) -> String {
        let source = JsProbabilitySource { get_variable };
        tick(&mut self.sim, &self.input, &source);
        self.input.clear();

        self.sim.snapshot().to_json().unwrap_or_else(|err| {
            log::error!("Snapshot serialization failed: {}", err);
            String::from("{}")
        })
    }
}
