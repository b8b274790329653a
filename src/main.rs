//! Venn Drop entry point
//!
//! Native builds run the simulation headless and print the expected vs.
//! observed table. The browser build drives the engine through `venn_drop::wasm`.
//!
//! Usage: `venn-drop [P(A) P(B) P(A∩B)] [--frames N] [--settings path.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Venn Drop (native) starting...");

    if let Err(err) = run(std::env::args().skip(1).collect()) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is venn_drop::wasm, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FRAMES: u64 = 5_000;

#[cfg(not(target_arch = "wasm32"))]
fn run(args: Vec<String>) -> venn_drop::Result<()> {
    use venn_drop::{ProbabilityInputs, Settings, Simulation, TickInput, VennDropError, tick};

    let mut frames = DEFAULT_FRAMES;
    let mut settings = Settings::default();
    let mut probabilities = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().unwrap_or_default();
                frames = value.parse().map_err(|_| VennDropError::InvalidArgument {
                    name: "--frames",
                    value,
                })?;
            }
            "--settings" => {
                let path = iter.next().unwrap_or_default();
                settings = Settings::load(&path)?;
            }
            _ => {
                let value: f64 = arg.parse().map_err(|_| VennDropError::InvalidArgument {
                    name: "probability",
                    value: arg.clone(),
                })?;
                probabilities.push(value);
            }
        }
    }

    let inputs = match probabilities.as_slice() {
        [] => ProbabilityInputs::from_base(0.2, 0.2, 0.1),
        [a, b, ab] => ProbabilityInputs::from_base(*a, *b, *ab),
        other => {
            return Err(VennDropError::InvalidArgument {
                name: "probabilities",
                value: format!("expected 3 values, got {}", other.len()),
            });
        }
    };
    log::info!(
        "P(A)={:.3} P(B)={:.3} P(A∩B)={:.3}, {} frames, seed {}",
        inputs.p_a,
        inputs.p_b,
        inputs.p_ab,
        frames,
        settings.seed
    );

    let mut sim = Simulation::new(settings);
    let mut input = TickInput {
        start: true,
        ..Default::default()
    };
    for _ in 0..frames {
        tick(&mut sim, &input, &inputs);
        input.clear();
    }

    let snapshot = sim.snapshot();
    print!("{}", snapshot.summary_table());
    log::info!(
        "Finished: {} retired, {} still falling",
        snapshot.stats.total,
        snapshot.particles.len()
    );
    Ok(())
}
