//! Snapshot persistence: a `SnapshotWriter<S>` collaborator seam
//! plus one concrete implementor, `CborSnapshotWriter`, serializing a
//! `Block<S>` with `serde_cbor`.
//!
//! Generalizes an `io::write_checkpoint` precedent (an HDF5 file holding
//! `State<C>`, `Tasks` and the model form) to this crate's `Block<S>`,
//! keeping a "one free function per concern, CBOR for the binary payload"
//! shape but swapping the container format: HDF5 pulls in an optional
//! system library dependency, while `serde_cbor` is already a default
//! dependency here and needs no system library at all.

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::geometry::GridGeometry;
use crate::mesh::Block;
use crate::physics::PhysicsSystem;
use crate::real::Real;

/// The on-disk snapshot layout: everything needed to reconstruct a
/// `Block<S>` plus the gravitational potential, if gravity is enabled, and
/// the step/time this snapshot was taken at.
#[derive(Serialize, Deserialize)]
struct Checkpoint<C> {
    step: u64,
    time: Real,
    geometry: GridGeometry,
    conserved: Array3<C>,
    scalars: ndarray::Array4<Real>,
    potential: Option<Array3<Real>>,
}

/// The snapshot-writing collaborator interface: the core only
/// ever calls `write_snapshot` at the cadence `control.checkpoint_interval`
/// dictates; what happens to the bytes (a local file, object storage, a
/// network stream) is entirely up to the implementor.
pub trait SnapshotWriter<S: PhysicsSystem> {
    fn write_snapshot(
        &mut self,
        step: u64,
        time: Real,
        block: &Block<S>,
        phi: Option<&Array3<Real>>,
    ) -> Result<(), CollaboratorError>;
}

/// Writes one `chkpt.{step:06}.cbor` file per call into a fixed output
/// directory, in the layout a `.cbor` checkpoint branch reads
/// back with `io::read_cbor`.
pub struct CborSnapshotWriter {
    output_directory: PathBuf,
}

impl CborSnapshotWriter {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self { output_directory: output_directory.into() }
    }

    fn path_for(&self, step: u64) -> PathBuf {
        self.output_directory.join(format!("chkpt.{step:06}.cbor"))
    }
}

impl<S> SnapshotWriter<S> for CborSnapshotWriter
where
    S: PhysicsSystem,
    S::Conserved: Serialize,
{
    fn write_snapshot(
        &mut self,
        step: u64,
        time: Real,
        block: &Block<S>,
        phi: Option<&Array3<Real>>,
    ) -> Result<(), CollaboratorError> {
        std::fs::create_dir_all(&self.output_directory).map_err(|e| CollaboratorError::SnapshotIo(e.to_string()))?;

        let checkpoint = Checkpoint {
            step,
            time,
            geometry: block.geometry.clone(),
            conserved: block.conserved.clone(),
            scalars: block.scalars.clone(),
            potential: phi.cloned(),
        };

        let path = self.path_for(step);
        let file = File::create(&path).map_err(|e| CollaboratorError::SnapshotIo(format!("{}: {e}", path.display())))?;
        serde_cbor::to_writer(file, &checkpoint).map_err(|e| CollaboratorError::SnapshotIo(e.to_string()))?;
        tracing::info!(path = %path.display(), step, time, "wrote checkpoint");
        Ok(())
    }
}

/// Discards every snapshot. Used by tests and by runs that disable
/// checkpointing (`control.checkpoint_interval <= 0`).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSnapshotWriter;

impl<S: PhysicsSystem> SnapshotWriter<S> for NullSnapshotWriter {
    fn write_snapshot(&mut self, _step: u64, _time: Real, _block: &Block<S>, _phi: Option<&Array3<Real>>) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Read a checkpoint previously written by [`CborSnapshotWriter`], returning
/// the step, time, reconstructed block, and potential (if one was saved).
pub fn read_checkpoint<S>(path: &Path) -> Result<(u64, Real, Block<S>, Option<Array3<Real>>), CollaboratorError>
where
    S: PhysicsSystem,
    S::Conserved: DeserializeOwned,
{
    let file = File::open(path).map_err(|e| CollaboratorError::SnapshotIo(format!("{}: {e}", path.display())))?;
    let checkpoint: Checkpoint<S::Conserved> = serde_cbor::from_reader(file).map_err(|e| CollaboratorError::SnapshotIo(e.to_string()))?;
    let block = Block { conserved: checkpoint.conserved, scalars: checkpoint.scalars, geometry: checkpoint.geometry };
    Ok((checkpoint.step, checkpoint.time, block, checkpoint.potential))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::physics::hydro::HydroPrimitive;
    use crate::physics::{Conserved, Hydro, Physics};

    fn physics() -> Physics {
        Physics { gamma: 1.4, density_floor: 1e-6, pressure_floor: 1e-8, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    #[test]
    fn null_writer_never_touches_the_filesystem() {
        let geometry = GridGeometry::new([4, 1, 1], [0.25, 1.0, 1.0], [0.0, 0.0, 0.0], 3);
        let mut block = Block::<Hydro>::new(geometry);
        block.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]));
        let mut writer = NullSnapshotWriter;
        writer.write_snapshot(0, 0.0, &block, None).unwrap();
    }

    #[test]
    fn cbor_round_trip_preserves_conserved_state() {
        let dir = std::env::temp_dir().join("cholla-core-io-test");
        let geometry = GridGeometry::new([4, 1, 1], [0.25, 1.0, 1.0], [0.0, 0.0, 0.0], 3);
        let mut block = Block::<Hydro>::new(geometry);
        block.fill_interior(&physics(), |x| HydroPrimitive([1.0 + x[0], 0.1, 0.0, 0.0, 1.0]));

        let mut writer = CborSnapshotWriter::new(&dir);
        writer.write_snapshot(7, 1.25, &block, None).unwrap();

        let (step, time, read_back, phi): (u64, Real, Block<Hydro>, Option<Array3<Real>>) = read_checkpoint(&writer.path_for(7)).unwrap();
        assert_eq!(step, 7);
        assert!((time - 1.25).abs() < 1e-12);
        assert!(phi.is_none());
        assert!((read_back.conserved[[3, 0, 0]].density() - block.conserved[[3, 0, 0]].density()).abs() < 1e-10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
