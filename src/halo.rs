//! The halo-exchange driver.
//!
//! Makes every chunk's ghost region equal to its neighbour's
//! boundary-adjacent interior values for the requested fields and depth.
//! The left/right sweep completes before the bottom/top sweep, so the
//! vertical exchange runs over the full, already-refreshed width and the
//! corner ghost cells come out consistent. Faces with no neighbour get a
//! reflective local update instead; no message is exchanged for them.

use crate::chunk::{Chunk, Face, FieldId};
use crate::comms::Communicator;
use crate::error::HearthResult;
use crate::kernels::{local_halos, pack_halos};
use crate::settings::Settings;

/// Refreshes the ghost regions of all chunks for `fields` at `depth`.
pub fn halo_update(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
    fields: &[FieldId],
    depth: usize,
) -> HearthResult<()> {
    profiling::scope!("halo_update");
    debug_assert!(depth >= 1 && depth <= settings.halo_depth);

    exchange(chunks, settings, comm, fields, depth, [Face::Left, Face::Right])?;
    exchange(chunks, settings, comm, fields, depth, [Face::Bottom, Face::Top])
}

/// One axis sweep: every chunk packs and posts both faces, then every
/// chunk receives and unpacks. Posting all sends first keeps the exchange
/// deadlock-free when neighbouring chunks share a process.
fn exchange(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
    fields: &[FieldId],
    depth: usize,
    faces: [Face; 2],
) -> HearthResult<()> {
    let halo_depth = settings.halo_depth;
    let backend = settings.backend;

    for chunk in chunks.iter_mut() {
        for face in faces {
            let Some(neighbour) = chunk.neighbour(face) else {
                continue;
            };
            let (x, y, id) = (chunk.x, chunk.y, chunk.id);
            let stride = chunk.face_len(face) * depth;
            for (fi, field_id) in fields.iter().enumerate() {
                let (field, send) = chunk.pack_view(*field_id, face);
                pack_halos::pack(
                    backend,
                    face,
                    x,
                    y,
                    depth,
                    halo_depth,
                    field,
                    &mut send[fi * stride..][..stride],
                );
            }
            comm.send(id, neighbour, &chunk.send_buffer(face)[..fields.len() * stride])?;
        }
    }

    for chunk in chunks.iter_mut() {
        for face in faces {
            let (x, y, id) = (chunk.x, chunk.y, chunk.id);
            let stride = chunk.face_len(face) * depth;
            match chunk.neighbour(face) {
                Some(neighbour) => {
                    comm.recv(
                        neighbour,
                        id,
                        &mut chunk.recv_buffer_mut(face)[..fields.len() * stride],
                    )?;
                    for (fi, field_id) in fields.iter().enumerate() {
                        let (recv, field) = chunk.unpack_view(*field_id, face);
                        pack_halos::unpack(
                            backend,
                            face,
                            x,
                            y,
                            depth,
                            halo_depth,
                            &recv[fi * stride..][..stride],
                            field,
                        );
                    }
                }
                None => {
                    for field_id in fields {
                        local_halos::update_face(
                            backend,
                            face,
                            x,
                            y,
                            depth,
                            halo_depth,
                            chunk.field_mut(*field_id),
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
