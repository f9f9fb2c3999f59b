use float_cmp::assert_approx_eq;
use rand::prelude::*;
use rand::rngs::StdRng;

use hearth::backend::Backend;
use hearth::chunk::{Chunk, FieldId};
use hearth::comms::MemoryComm;
use hearth::decomposition::decompose;
use hearth::drivers::{cg_solve, diffuse, init_application};
use hearth::halo::halo_update;
use hearth::kernels::{jacobi, smvp};
use hearth::settings::{Settings, SolverKind, State, StateGeometry};

fn test_settings(cells: usize, halo_depth: usize) -> Settings {
    Settings {
        grid_x_cells: cells,
        grid_y_cells: cells,
        grid_x_max: cells as f64,
        grid_y_max: cells as f64,
        halo_depth,
        num_chunks: 1,
        backend: Backend::Serial,
        ..Settings::default()
    }
}

fn build_chunks(settings: &Settings) -> (Vec<Chunk>, MemoryComm) {
    let decomposition = decompose(
        settings.grid_x_cells,
        settings.grid_y_cells,
        settings.num_chunks,
    )
    .unwrap();
    let chunks = decomposition
        .chunks
        .iter()
        .map(|l| {
            Chunk::new(
                l.id,
                settings,
                l.x_cells,
                l.y_cells,
                l.left,
                l.bottom,
                l.neighbours,
            )
        })
        .collect();
    (chunks, MemoryComm::new(&decomposition))
}

#[test]
fn smvp_is_symmetric() {
    // sum u . A v == sum v . A u over the interior, for any positive
    // conductivities, with zero boundary data.
    let (x, y, halo) = (10_usize, 10_usize, 1_usize);
    let n = x * y;
    let mut rng = StdRng::seed_from_u64(42);

    let mut kx = vec![0.0; n];
    let mut ky = vec![0.0; n];
    let mut u = vec![0.0; n];
    let mut v = vec![0.0; n];
    for i in 0..n {
        kx[i] = rng.gen_range(0.1..1.0);
        ky[i] = rng.gen_range(0.1..1.0);
        let kk = i % x;
        let jj = i / x;
        if kk >= halo && kk < x - halo && jj >= halo && jj < y - halo {
            u[i] = rng.gen_range(-1.0..1.0);
            v[i] = rng.gen_range(-1.0..1.0);
        }
    }

    let mut u_av = 0.0;
    let mut v_au = 0.0;
    for jj in halo..y - halo {
        for kk in halo..x - halo {
            let i = kk + jj * x;
            u_av += u[i] * smvp(&v, &kx, &ky, i, x);
            v_au += v[i] * smvp(&u, &kx, &ky, i, x);
        }
    }
    assert_approx_eq!(f64, u_av, v_au, epsilon = 1e-10);
}

#[test]
fn jacobi_error_decreases_monotonically() {
    // Smooth initial data, no sources: the Jacobi convergence metric is
    // non-increasing over the early iterations.
    let settings = test_settings(16, 1);
    let (mut chunks, comm) = build_chunks(&settings);
    let (x, y) = (chunks[0].x, chunks[0].y);

    {
        let chunk = &mut chunks[0];
        let centre = x as f64 / 2.0;
        let sigma_sq = (x as f64 / 4.0) * (x as f64 / 4.0);
        for i in 0..x * y {
            let kk = (i % x) as f64;
            let jj = (i / x) as f64;
            let r2 = (kk - centre) * (kk - centre) + (jj - centre) * (jj - centre);
            chunk.density[i] = 1.0;
            chunk.energy[i] = 1.0 + (-r2 / (2.0 * sigma_sq)).exp();
        }
    }

    let rx = settings.dt_init / (settings.dx() * settings.dx());
    let ry = settings.dt_init / (settings.dy() * settings.dy());
    {
        let chunk = &mut chunks[0];
        let Chunk {
            density,
            energy,
            u0,
            u,
            kx,
            ky,
            ..
        } = chunk;
        jacobi::init(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            settings.coefficient,
            rx,
            ry,
            density,
            energy,
            u0,
            u,
            kx,
            ky,
        );
    }
    halo_update(&mut chunks, &settings, &comm, &[FieldId::U], 1).unwrap();

    let mut errors = Vec::new();
    for _ in 0..25 {
        let chunk = &mut chunks[0];
        let Chunk {
            u0, u, r, kx, ky, ..
        } = chunk;
        errors.push(jacobi::iterate(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            u0,
            u,
            r,
            kx,
            ky,
        ));
        halo_update(&mut chunks, &settings, &comm, &[FieldId::U], 1).unwrap();
    }

    for pair in errors.windows(2) {
        assert!(
            pair[1] <= pair[0] * (1.0 + 1e-12),
            "error increased: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn cg_terminates_within_interior_dof() {
    // 10x10 buffers at halo depth 2 leave a 6x6 interior; CG on an SPD
    // system of 36 unknowns reaches 1e-10 within 36 iterations.
    let settings = Settings {
        eps: 1e-10,
        max_iters: 100,
        ..test_settings(6, 2)
    };
    let states = [State {
        density: 1.0,
        energy: 1.0,
        geometry: StateGeometry::Default,
    }];
    let (mut chunks, comm) = build_chunks(&settings);
    assert_eq!(chunks[0].x, 10);
    assert_eq!(chunks[0].y, 10);

    init_application(&mut chunks, &settings, &states).unwrap();
    let outcome = cg_solve(&mut chunks, &settings, &comm).unwrap();
    assert!(outcome.converged);
    assert!(outcome.iterations <= 36, "took {}", outcome.iterations);
}

#[test]
fn cg_terminates_on_a_nonuniform_problem() {
    let settings = Settings {
        eps: 1e-10,
        max_iters: 100,
        ..test_settings(6, 2)
    };
    let states = [
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
                y_min: 0.0,
                x_max: 3.0,
                y_max: 3.0,
            },
        },
    ];
    let (mut chunks, comm) = build_chunks(&settings);
    init_application(&mut chunks, &settings, &states).unwrap();
    let outcome = cg_solve(&mut chunks, &settings, &comm).unwrap();
    assert!(outcome.converged);
    assert!(outcome.iterations <= 36, "took {}", outcome.iterations);
}

#[test]
fn all_solvers_agree_on_the_final_state() {
    let states = [
        State {
            density: 100.0,
            energy: 0.0001,
            geometry: StateGeometry::Default,
        },
        State {
            density: 0.1,
            energy: 25.0,
            geometry: StateGeometry::Rectangle {
                x_min: 1.0,
                y_min: 1.0,
                x_max: 4.0,
                y_max: 4.0,
            },
        },
    ];

    let mut temps = Vec::new();
    for solver in [
        SolverKind::Jacobi,
        SolverKind::Cg,
        SolverKind::Cheby,
        SolverKind::Ppcg,
    ] {
        let settings = Settings {
            solver,
            eps: 1e-12,
            end_step: 1,
            // short warm-up so cheby/ppcg actually leave the CG window
            presteps: 15,
            ..test_settings(6, 2)
        };
        let (mut chunks, comm) = build_chunks(&settings);
        let reports = diffuse(&mut chunks, &settings, &states, &comm).unwrap();
        let report = reports.last().unwrap();
        assert!(report.outcome.converged, "{:?} did not converge", solver);
        temps.push(report.summary.temp);
    }

    for temp in &temps[1..] {
        assert_approx_eq!(f64, temps[0], *temp, epsilon = temps[0].abs() * 1e-6);
    }
}

#[test]
fn two_chunk_cg_matches_single_chunk() {
    // The decomposition must not change the converged answer.
    let states = [
        State {
            density: 10.0,
            energy: 0.01,
            geometry: StateGeometry::Default,
        },
        State {
            density: 0.5,
            energy: 4.0,
            geometry: StateGeometry::Circle {
                x: 3.0,
                y: 3.0,
                radius: 1.5,
            },
        },
    ];

    let mut temps = Vec::new();
    for num_chunks in [1, 2] {
        let settings = Settings {
            eps: 1e-12,
            end_step: 1,
            num_chunks,
            ..test_settings(6, 2)
        };
        let (mut chunks, comm) = build_chunks(&settings);
        let reports = diffuse(&mut chunks, &settings, &states, &comm).unwrap();
        temps.push(reports.last().unwrap().summary.temp);
    }
    assert_approx_eq!(f64, temps[0], temps[1], epsilon = temps[0].abs() * 1e-8);
}
