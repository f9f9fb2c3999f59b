//! Chunked slice operations, sequential or parallel per [`Backend`].
//!
//! Kernels pass a per-cell body taking the absolute flat index plus a
//! mutable reference into each output buffer; the helpers here decide how
//! the index space is partitioned. Reductions combine per-task partial
//! sums, so the reduction tree shape (and therefore the exact floating
//! point total) varies with the backend and `chunk_size`. That is accepted
//! non-determinism; the per-cell writes are exactly-once regardless.

use crate::backend::Backend;
use num_traits::Num;
use rayon::prelude::*;

/// Sets each element to the same value.
pub fn set_value<NumType: Num + Copy + Send + Sync>(
    backend: Backend,
    a_slice: &mut [NumType],
    value: NumType,
) {
    match backend {
        Backend::Serial => {
            for a in a_slice {
                *a = value;
            }
        }
        Backend::Rayon { chunk_size } => {
            a_slice
                .par_chunks_mut(chunk_size)
                .for_each(|a_chunk: &mut [NumType]| {
                    for a in a_chunk {
                        *a = value;
                    }
                });
        }
    }
}

/// Copies `src` into `dst`, whole buffer.
pub fn copy(backend: Backend, dst: &mut [f64], src: &[f64]) {
    debug_assert_eq!(dst.len(), src.len());
    match backend {
        Backend::Serial => dst.copy_from_slice(src),
        Backend::Rayon { chunk_size } => {
            dst.par_chunks_mut(chunk_size)
                .zip(src.par_chunks(chunk_size))
                .for_each(|(d_chunk, s_chunk)| {
                    d_chunk.copy_from_slice(s_chunk);
                });
        }
    }
}

/// Runs `body(i, &mut a[i])` for every index of `a_slice`.
pub fn apply<F>(backend: Backend, a_slice: &mut [f64], body: F)
where
    F: Fn(usize, &mut f64) + Send + Sync,
{
    match backend {
        Backend::Serial => {
            for (i, a) in a_slice.iter_mut().enumerate() {
                body(i, a);
            }
        }
        Backend::Rayon { chunk_size } => {
            a_slice
                .par_chunks_mut(chunk_size)
                .enumerate()
                .for_each(|(c, a_chunk)| {
                    let base = c * chunk_size;
                    for (i, a) in a_chunk.iter_mut().enumerate() {
                        body(base + i, a);
                    }
                });
        }
    }
}

/// Runs `body(i, &mut a[i], &mut b[i])` for every index.
pub fn apply2<F>(backend: Backend, a_slice: &mut [f64], b_slice: &mut [f64], body: F)
where
    F: Fn(usize, &mut f64, &mut f64) + Send + Sync,
{
    debug_assert_eq!(a_slice.len(), b_slice.len());
    match backend {
        Backend::Serial => {
            for (i, (a, b)) in a_slice.iter_mut().zip(b_slice.iter_mut()).enumerate() {
                body(i, a, b);
            }
        }
        Backend::Rayon { chunk_size } => {
            a_slice
                .par_chunks_mut(chunk_size)
                .zip(b_slice.par_chunks_mut(chunk_size))
                .enumerate()
                .for_each(|(c, (a_chunk, b_chunk))| {
                    let base = c * chunk_size;
                    for (i, (a, b)) in
                        a_chunk.iter_mut().zip(b_chunk.iter_mut()).enumerate()
                    {
                        body(base + i, a, b);
                    }
                });
        }
    }
}

/// Runs `body(i, &mut a[i], &mut b[i], &mut c[i])` for every index.
pub fn apply3<F>(
    backend: Backend,
    a_slice: &mut [f64],
    b_slice: &mut [f64],
    c_slice: &mut [f64],
    body: F,
) where
    F: Fn(usize, &mut f64, &mut f64, &mut f64) + Send + Sync,
{
    debug_assert_eq!(a_slice.len(), b_slice.len());
    debug_assert_eq!(a_slice.len(), c_slice.len());
    match backend {
        Backend::Serial => {
            for i in 0..a_slice.len() {
                body(i, &mut a_slice[i], &mut b_slice[i], &mut c_slice[i]);
            }
        }
        Backend::Rayon { chunk_size } => {
            a_slice
                .par_chunks_mut(chunk_size)
                .zip(b_slice.par_chunks_mut(chunk_size))
                .zip(c_slice.par_chunks_mut(chunk_size))
                .enumerate()
                .for_each(|(c, ((a_chunk, b_chunk), c_chunk))| {
                    let base = c * chunk_size;
                    for i in 0..a_chunk.len() {
                        body(base + i, &mut a_chunk[i], &mut b_chunk[i], &mut c_chunk[i]);
                    }
                });
        }
    }
}

/// Like [`apply`] but each cell body also yields a partial sum.
pub fn reduce_apply<F>(backend: Backend, a_slice: &mut [f64], body: F) -> f64
where
    F: Fn(usize, &mut f64) -> f64 + Send + Sync,
{
    match backend {
        Backend::Serial => {
            let mut acc = 0.0;
            for (i, a) in a_slice.iter_mut().enumerate() {
                acc += body(i, a);
            }
            acc
        }
        Backend::Rayon { chunk_size } => a_slice
            .par_chunks_mut(chunk_size)
            .enumerate()
            .map(|(c, a_chunk)| {
                let base = c * chunk_size;
                let mut acc = 0.0;
                for (i, a) in a_chunk.iter_mut().enumerate() {
                    acc += body(base + i, a);
                }
                acc
            })
            .sum(),
    }
}

/// Like [`apply2`] but each cell body also yields a partial sum.
pub fn reduce_apply2<F>(
    backend: Backend,
    a_slice: &mut [f64],
    b_slice: &mut [f64],
    body: F,
) -> f64
where
    F: Fn(usize, &mut f64, &mut f64) -> f64 + Send + Sync,
{
    debug_assert_eq!(a_slice.len(), b_slice.len());
    match backend {
        Backend::Serial => {
            let mut acc = 0.0;
            for (i, (a, b)) in a_slice.iter_mut().zip(b_slice.iter_mut()).enumerate() {
                acc += body(i, a, b);
            }
            acc
        }
        Backend::Rayon { chunk_size } => a_slice
            .par_chunks_mut(chunk_size)
            .zip(b_slice.par_chunks_mut(chunk_size))
            .enumerate()
            .map(|(c, (a_chunk, b_chunk))| {
                let base = c * chunk_size;
                let mut acc = 0.0;
                for (i, (a, b)) in a_chunk.iter_mut().zip(b_chunk.iter_mut()).enumerate() {
                    acc += body(base + i, a, b);
                }
                acc
            })
            .sum(),
    }
}

/// Like [`apply3`] but each cell body also yields a partial sum.
pub fn reduce_apply3<F>(
    backend: Backend,
    a_slice: &mut [f64],
    b_slice: &mut [f64],
    c_slice: &mut [f64],
    body: F,
) -> f64
where
    F: Fn(usize, &mut f64, &mut f64, &mut f64) -> f64 + Send + Sync,
{
    debug_assert_eq!(a_slice.len(), b_slice.len());
    debug_assert_eq!(a_slice.len(), c_slice.len());
    match backend {
        Backend::Serial => {
            let mut acc = 0.0;
            for i in 0..a_slice.len() {
                acc += body(i, &mut a_slice[i], &mut b_slice[i], &mut c_slice[i]);
            }
            acc
        }
        Backend::Rayon { chunk_size } => a_slice
            .par_chunks_mut(chunk_size)
            .zip(b_slice.par_chunks_mut(chunk_size))
            .zip(c_slice.par_chunks_mut(chunk_size))
            .enumerate()
            .map(|(c, ((a_chunk, b_chunk), c_chunk))| {
                let base = c * chunk_size;
                let mut acc = 0.0;
                for i in 0..a_chunk.len() {
                    acc += body(base + i, &mut a_chunk[i], &mut b_chunk[i], &mut c_chunk[i]);
                }
                acc
            })
            .sum(),
    }
}

/// Pure associative reduction over the index range `0..len`.
pub fn reduce<T, F, C>(backend: Backend, len: usize, identity: T, body: F, combine: C) -> T
where
    T: Copy + Send + Sync,
    F: Fn(usize) -> T + Send + Sync,
    C: Fn(T, T) -> T + Send + Sync,
{
    match backend {
        Backend::Serial => {
            let mut acc = identity;
            for i in 0..len {
                acc = combine(acc, body(i));
            }
            acc
        }
        Backend::Rayon { chunk_size } => (0..len)
            .into_par_iter()
            .with_min_len(chunk_size)
            .fold(|| identity, |acc, i| combine(acc, body(i)))
            .reduce(|| identity, &combine),
    }
}

/// Runs `body(line, &mut slice[line*line_len..][..line_len])` for every
/// whole line. Used by the halo pack/unpack and local-update kernels where
/// each boundary line is a disjoint contiguous run.
pub fn for_each_line<F>(backend: Backend, slice: &mut [f64], line_len: usize, body: F)
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    debug_assert!(line_len > 0);
    match backend {
        Backend::Serial => {
            for (line, row) in slice.chunks_exact_mut(line_len).enumerate() {
                body(line, row);
            }
        }
        Backend::Rayon { .. } => {
            slice
                .par_chunks_exact_mut(line_len)
                .enumerate()
                .for_each(|(line, row)| body(line, row));
        }
    }
}
