//! Splits the global cell grid into a 2D arrangement of chunks and wires
//! up their neighbour identities.

use crate::chunk::{ChunkId, NUM_FACES};
use crate::error::{HearthError, HearthResult};

#[derive(Debug, Clone)]
pub struct ChunkLayout {
    pub id: ChunkId,
    /// Interior cell counts, without halo.
    pub x_cells: usize,
    pub y_cells: usize,
    /// Global cell offset of the bottom-left interior cell.
    pub left: usize,
    pub bottom: usize,
    /// left, right, bottom, top; `None` marks a physical domain edge.
    pub neighbours: [Option<ChunkId>; NUM_FACES],
}

#[derive(Debug, Clone)]
pub struct Decomposition {
    pub x_chunks: usize,
    pub y_chunks: usize,
    pub chunks: Vec<ChunkLayout>,
}

/// Picks the factorisation of `num_chunks` that minimises the per-chunk
/// half perimeter (i.e. the halo traffic), then splits cells as evenly as
/// possible, remainder cells going to the leading chunks of each axis.
pub fn decompose(
    grid_x_cells: usize,
    grid_y_cells: usize,
    num_chunks: usize,
) -> HearthResult<Decomposition> {
    if num_chunks == 0 {
        return Err(HearthError::Config("num_chunks must be at least 1".into()));
    }
    if grid_x_cells == 0 || grid_y_cells == 0 {
        return Err(HearthError::Config(format!(
            "grid of {}x{} cells cannot be decomposed",
            grid_x_cells, grid_y_cells
        )));
    }

    let mut best: Option<(usize, usize, usize)> = None;
    for x_chunks in 1..=num_chunks {
        if num_chunks % x_chunks != 0 {
            continue;
        }
        let y_chunks = num_chunks / x_chunks;
        if x_chunks > grid_x_cells || y_chunks > grid_y_cells {
            continue;
        }
        let metric = grid_x_cells.div_ceil(x_chunks) + grid_y_cells.div_ceil(y_chunks);
        // ties fall to the wider arrangement, so a square pair splits
        // left/right
        if best.map_or(true, |(_, _, m)| metric <= m) {
            best = Some((x_chunks, y_chunks, metric));
        }
    }

    let (x_chunks, y_chunks, _) = best.ok_or_else(|| {
        HearthError::Config(format!(
            "cannot split {}x{} cells into {} chunks",
            grid_x_cells, grid_y_cells, num_chunks
        ))
    })?;

    let base_x = grid_x_cells / x_chunks;
    let mod_x = grid_x_cells % x_chunks;
    let base_y = grid_y_cells / y_chunks;
    let mod_y = grid_y_cells % y_chunks;

    let mut chunks = Vec::with_capacity(num_chunks);
    for cj in 0..y_chunks {
        for ci in 0..x_chunks {
            let id = ci + cj * x_chunks;
            let neighbours = [
                (ci > 0).then(|| id - 1),
                (ci + 1 < x_chunks).then(|| id + 1),
                (cj > 0).then(|| id - x_chunks),
                (cj + 1 < y_chunks).then(|| id + x_chunks),
            ];
            chunks.push(ChunkLayout {
                id,
                x_cells: base_x + usize::from(ci < mod_x),
                y_cells: base_y + usize::from(cj < mod_y),
                left: ci * base_x + ci.min(mod_x),
                bottom: cj * base_y + cj.min(mod_y),
                neighbours,
            });
        }
    }

    Ok(Decomposition {
        x_chunks,
        y_chunks,
        chunks,
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn single_chunk_has_no_neighbours() {
        let d = decompose(6, 6, 1).unwrap();
        assert_eq!(d.chunks.len(), 1);
        assert_eq!(d.chunks[0].x_cells, 6);
        assert_eq!(d.chunks[0].y_cells, 6);
        assert_eq!(d.chunks[0].neighbours, [None; NUM_FACES]);
    }

    #[test]
    fn two_chunks_split_left_right() {
        let d = decompose(6, 6, 2).unwrap();
        assert_eq!(d.x_chunks, 2);
        assert_eq!(d.y_chunks, 1);
        let left = &d.chunks[0];
        let right = &d.chunks[1];
        assert_eq!((left.x_cells, left.y_cells), (3, 6));
        assert_eq!((right.x_cells, right.y_cells), (3, 6));
        assert_eq!(right.left, 3);
        // left, right, bottom, top
        assert_eq!(left.neighbours, [None, Some(1), None, None]);
        assert_eq!(right.neighbours, [Some(0), None, None, None]);
    }

    #[test]
    fn remainder_cells_go_to_leading_chunks() {
        let d = decompose(7, 5, 2).unwrap();
        assert_eq!(d.chunks[0].x_cells, 4);
        assert_eq!(d.chunks[1].x_cells, 3);
        assert_eq!(d.chunks[1].left, 4);
    }

    #[test]
    fn four_chunks_grid_wiring() {
        let d = decompose(8, 8, 4).unwrap();
        assert_eq!((d.x_chunks, d.y_chunks), (2, 2));
        // chunk 0 is bottom-left
        assert_eq!(d.chunks[0].neighbours, [None, Some(1), None, Some(2)]);
        // chunk 3 is top-right
        assert_eq!(d.chunks[3].neighbours, [Some(2), None, Some(1), None]);
    }

    #[test]
    fn rejects_impossible_splits() {
        assert!(decompose(6, 6, 0).is_err());
        assert!(decompose(2, 2, 9).is_err());
    }
}
