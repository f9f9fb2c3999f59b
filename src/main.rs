use clap::Parser;
use std::path::PathBuf;

use hearth::backend::Backend;
use hearth::chunk::Chunk;
use hearth::comms::MemoryComm;
use hearth::decomposition::decompose;
use hearth::drivers::diffuse;
use hearth::error::{HearthError, HearthResult};
use hearth::render::render_u;
use hearth::settings::{Coefficient, Settings, SolverKind, State, StateGeometry};

#[cfg(feature = "profile-with-puffin")]
use std::sync::Mutex;

#[cfg(feature = "profile-with-puffin")]
static PUFFIN_SERVER: Mutex<Option<puffin_http::Server>> = Mutex::new(None);

/// hearth 2D heat conduction solver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Global grid cells in x.
    #[arg(short = 'x', long, default_value = "128")]
    x_cells: usize,

    /// Global grid cells in y.
    #[arg(short = 'y', long, default_value = "128")]
    y_cells: usize,

    /// Iterative solver to use.
    #[arg(short, long, value_enum, default_value = "cg")]
    solver: SolverKind,

    /// Conductivity coefficient kind.
    #[arg(long, value_enum, default_value = "conductivity")]
    coefficient: Coefficient,

    /// How many chunks to decompose the grid into.
    #[arg(short, long, default_value = "1")]
    num_chunks: usize,

    /// Ghost-cell border width.
    #[arg(long, default_value = "2")]
    halo_depth: usize,

    /// Number of outer timesteps.
    #[arg(long, default_value = "10")]
    steps: usize,

    /// Timestep size.
    #[arg(long, default_value = "0.1")]
    dt: f64,

    /// Convergence tolerance.
    #[arg(long, default_value = "1e-15")]
    eps: f64,

    /// Iteration cap per solve.
    #[arg(long, default_value = "10000")]
    max_iters: usize,

    /// CG warm-up iterations before cheby/ppcg take over.
    #[arg(long, default_value = "30")]
    presteps: usize,

    /// Inner smoothing steps per PPCG outer iteration.
    #[arg(long, default_value = "10")]
    inner_steps: usize,

    /// The number of threads to use.
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Chunk size to use for parallelism.
    #[arg(short, long, default_value = "1000")]
    chunk_size: usize,

    /// Run every kernel sequentially.
    #[arg(long)]
    serial: bool,

    /// Write the final temperature field as a PNG.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            grid_x_cells: self.x_cells,
            grid_y_cells: self.y_cells,
            halo_depth: self.halo_depth,
            num_chunks: self.num_chunks,
            dt_init: self.dt,
            end_step: self.steps,
            solver: self.solver,
            coefficient: self.coefficient,
            eps: self.eps,
            max_iters: self.max_iters,
            presteps: self.presteps,
            ppcg_inner_steps: self.inner_steps,
            backend: if self.serial {
                Backend::Serial
            } else {
                Backend::rayon(self.chunk_size)
            },
            ..Settings::default()
        }
    }
}

/// The built-in problem: a cold dense background with two hot strips along
/// the bottom-left of the domain.
fn demo_states() -> Vec<State> {
    vec![
        State {
            density: 100.0,
            energy: 0.0001,
            geometry: StateGeometry::Default,
        },
        State {
            density: 0.1,
            energy: 25.0,
            geometry: StateGeometry::Rectangle {
                x_min: 0.0,
                y_min: 1.0,
                x_max: 1.0,
                y_max: 2.0,
            },
        },
        State {
            density: 0.1,
            energy: 0.1,
            geometry: StateGeometry::Rectangle {
                x_min: 1.0,
                y_min: 0.0,
                x_max: 6.0,
                y_max: 1.0,
            },
        },
    ]
}

fn run(args: Args) -> HearthResult<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .thread_name(|i| format!("rayon_thread_{}", i))
        .build_global()
        .map_err(|e| HearthError::Config(format!("could not build thread pool: {}", e)))?;

    #[cfg(feature = "profile-with-puffin")]
    {
        let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        println!("Run this to view profiling data:  puffin_viewer {server_addr}");
        *PUFFIN_SERVER.lock().unwrap() = Some(puffin_http::Server::new(&server_addr).unwrap());
        profiling::puffin::set_scopes_on(true);
    }

    let settings = args.settings();
    let decomposition = decompose(
        settings.grid_x_cells,
        settings.grid_y_cells,
        settings.num_chunks,
    )?;
    log::info!(
        "decomposed {}x{} cells into {}x{} chunks",
        settings.grid_x_cells,
        settings.grid_y_cells,
        decomposition.x_chunks,
        decomposition.y_chunks
    );

    let mut chunks: Vec<Chunk> = decomposition
        .chunks
        .iter()
        .map(|layout| {
            Chunk::new(
                layout.id,
                &settings,
                layout.x_cells,
                layout.y_cells,
                layout.left,
                layout.bottom,
                layout.neighbours,
            )
        })
        .collect();
    let comm = MemoryComm::new(&decomposition);

    let reports = diffuse(&mut chunks, &settings, &demo_states(), &comm)?;

    if let Some(report) = reports.last() {
        println!(
            "final step {}: {} iterations, residual {:e}",
            report.step, report.outcome.iterations, report.outcome.residual
        );
        println!(
            "field summary: vol {:.6e}, mass {:.6e}, ie {:.6e}, temp {:.6e}",
            report.summary.vol, report.summary.mass, report.summary.ie, report.summary.temp
        );
    }

    if let Some(output) = &args.output {
        render_u(&chunks, &settings, output)?;
        println!("wrote {}", output.display());
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("hearth: {e}");
        std::process::exit(1);
    }
}
