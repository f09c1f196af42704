//! Raw binary mesh ingestion.
//!
//! A mesh is a pair of packed host-byte-order files sharing a base name:
//! `<base>.VTX` holds `f32` coordinate triples and `<base>.IDX` holds
//! `u16` vertex-index triples.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bsp_core::Face;
use log::{debug, warn};
use nalgebra::Point3;

const VERT_STRIDE: usize = 12;
const FACE_STRIDE: usize = 6;

/// Reads `<base>.VTX` and `<base>.IDX`.
///
/// Record counts are derived from the file sizes; trailing bytes that do
/// not fill a whole record are ignored with a warning. Vertex indices are
/// not range-checked here; `Pools::check` deletes offending faces later.
pub fn read_mesh(base: &Path) -> Result<(Vec<Point3<f32>>, Vec<Face>)> {
    let vtx_path = base.with_extension("VTX");
    let idx_path = base.with_extension("IDX");

    let vtx = fs::read(&vtx_path)
        .with_context(|| format!("cannot open vertex file {}", vtx_path.display()))?;
    let idx = fs::read(&idx_path)
        .with_context(|| format!("cannot open index file {}", idx_path.display()))?;
    debug!(
        "{}: {} bytes, {}: {} bytes",
        vtx_path.display(),
        vtx.len(),
        idx_path.display(),
        idx.len()
    );

    if vtx.len() % VERT_STRIDE != 0 {
        warn!(
            "{}: {} trailing bytes ignored",
            vtx_path.display(),
            vtx.len() % VERT_STRIDE
        );
    }
    if idx.len() % FACE_STRIDE != 0 {
        warn!(
            "{}: {} trailing bytes ignored",
            idx_path.display(),
            idx.len() % FACE_STRIDE
        );
    }

    let verts = vtx
        .chunks_exact(VERT_STRIDE)
        .map(|c| Point3::new(f32_at(c, 0), f32_at(c, 4), f32_at(c, 8)))
        .collect();
    let faces = idx
        .chunks_exact(FACE_STRIDE)
        .map(|c| Face::new(u16_at(c, 0), u16_at(c, 2), u16_at(c, 4)))
        .collect();

    Ok((verts, faces))
}

fn f32_at(c: &[u8], off: usize) -> f32 {
    f32::from_ne_bytes([c[off], c[off + 1], c[off + 2], c[off + 3]])
}

fn u16_at(c: &[u8], off: usize) -> u16 {
    u16::from_ne_bytes([c[off], c[off + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_mesh(dir: &Path, name: &str, verts: &[[f32; 3]], faces: &[[u16; 3]]) -> PathBuf {
        let base = dir.join(name);
        let mut vtx = Vec::new();
        for v in verts {
            for c in v {
                vtx.extend_from_slice(&c.to_ne_bytes());
            }
        }
        let mut idx = Vec::new();
        for f in faces {
            for i in f {
                idx.extend_from_slice(&i.to_ne_bytes());
            }
        }
        fs::write(base.with_extension("VTX"), vtx).unwrap();
        fs::write(base.with_extension("IDX"), idx).unwrap();
        base
    }

    #[test]
    fn round_trips_a_mesh() {
        let dir = std::env::temp_dir().join("bsp-cli-ingest-test");
        fs::create_dir_all(&dir).unwrap();
        let base = write_mesh(
            &dir,
            "tri",
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );

        let (verts, faces) = read_mesh(&base).unwrap();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(faces, vec![Face::new(0, 1, 2)]);
    }

    #[test]
    fn ignores_trailing_partial_records() {
        let dir = std::env::temp_dir().join("bsp-cli-ingest-test");
        fs::create_dir_all(&dir).unwrap();
        let base = write_mesh(
            &dir,
            "ragged",
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );
        // Corrupt both files with partial records.
        let mut vtx = fs::read(base.with_extension("VTX")).unwrap();
        vtx.extend_from_slice(&[0xAA; 5]);
        fs::write(base.with_extension("VTX"), vtx).unwrap();
        let mut idx = fs::read(base.with_extension("IDX")).unwrap();
        idx.push(0xAA);
        fs::write(base.with_extension("IDX"), idx).unwrap();

        let (verts, faces) = read_mesh(&base).unwrap();
        assert_eq!(verts.len(), 3);
        assert_eq!(faces.len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = std::env::temp_dir();
        assert!(read_mesh(&dir.join("no-such-mesh")).is_err());
    }
}
