//! What a tracer does when it reaches a boundary face.

use crate::error::TrackingError;
use crate::geom::IsClose;
use crate::mesh::patch::PatchKind;
use crate::mesh::topology::TopologyView;
use crate::track::context::TrackingContext;
use crate::track::tracer::{TrackState, Tracer};
use anyhow::Result;
use log::{debug, warn};

/// Dispatches a tracer sitting on boundary `face` by the category of the
/// patch holding it. Returns `true` if the tracer continues.
pub(crate) fn hit_boundary<M: TopologyView, T: Clone>(
    tracer: &mut Tracer<T>,
    mesh: &M,
    ctx: &mut TrackingContext<T>,
    face: usize,
) -> Result<bool> {
    let Some(patch_id) = mesh.patch_id(face) else {
        return unexpected(tracer, "<none>", face);
    };
    let patch = &mesh.patches()[patch_id];
    let local = face - patch.start;

    match &patch.kind {
        PatchKind::Wedge | PatchKind::SymmetryPlane | PatchKind::Symmetry => {
            let n = or_lose(tracer, mesh.face_normal(face).normalize())?;
            let centre = mesh.face_centre(face);
            tracer.end = centre + (tracer.end - centre).reflect(&n);
            debug!("Tracer {} mirrored at face {} of '{}'", tracer.id, face, patch.name);
            Ok(true)
        }
        PatchKind::Cyclic {
            neighbour_patch,
            transform,
        } => {
            let target = &mesh.patches()[*neighbour_patch];
            let matched = target.start + local;
            let moved = transform
                .apply(tracer.position)
                .and_then(|position| Ok((position, transform.apply(tracer.end)?)));
            let (position, end) = or_lose(tracer, moved)?;
            tracer.position = position;
            tracer.end = end;
            let cell = mesh.owner(matched);
            tracer.attach(mesh, cell, matched);
            debug!(
                "Tracer {} moved from face {} of '{}' to face {} of '{}'",
                tracer.id, face, patch.name, matched, target.name
            );
            Ok(true)
        }
        PatchKind::Processor { neighbour_domain } => {
            tracer.state = TrackState::Transferred {
                to_domain: *neighbour_domain,
                patch_face: local,
            };
            Ok(false)
        }
        PatchKind::Wall => {
            // The hit point is the last point known to be in the cell
            ctx.record(tracer.cell, tracer.payload.clone(), tracer.position);
            // Characteristic length of the face: sqrt(2 * area)
            let scale = mesh.face_normal(face).length().sqrt();
            let gap = tracer.position.distance(&tracer.end) / scale;
            tracer.state = if gap.is_close(0.) {
                TrackState::Arrived
            } else {
                TrackState::Discarded
            };
            Ok(false)
        }
        PatchKind::Generic => unexpected(tracer, &patch.name, face),
    }
}

/// Marks the tracer lost when `res` is an error.
fn or_lose<T: Clone, R>(tracer: &mut Tracer<T>, res: Result<R>) -> Result<R> {
    if res.is_err() {
        tracer.state = TrackState::Lost;
    }
    res
}

fn unexpected<T: Clone>(tracer: &mut Tracer<T>, patch: &str, face: usize) -> Result<bool> {
    warn!(
        "Tracer {} reached face {} of patch '{}' which has no tracking behaviour",
        tracer.id, face, patch
    );
    tracer.lose(TrackingError::UnexpectedBoundary {
        patch: patch.to_string(),
        face,
    })
}

/// Re-attaches a tracer received from domain `from` to the matching face of
/// the processor patch pointing back there.
pub(crate) fn receive_from_processor<M: TopologyView, T: Clone>(
    tracer: &mut Tracer<T>,
    mesh: &M,
    domain: usize,
    from: usize,
    patch_face: usize,
) -> Result<()> {
    let patch = mesh
        .patches()
        .iter()
        .find(|p| {
            matches!(p.kind, PatchKind::Processor { neighbour_domain } if neighbour_domain == from)
        })
        .filter(|p| patch_face < p.size)
        .ok_or(TrackingError::NoProcessorPatch { domain, from })?;
    let face = patch.start + patch_face;
    tracer.attach(mesh, mesh.owner(face), face);
    Ok(())
}
