//! Command-line driver: reads a raw binary mesh, builds the BSP tree in
//! place, prints the build statistics, and dumps the tree to `tree.txt`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bsp_core::{BspTree, Pools};
use clap::{Arg, Command};
use log::{error, info, warn};

mod ingest;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("bsp-cli")
        .about("Builds a BSP tree from a raw binary triangle mesh")
        .arg(
            Arg::new("mesh")
                .help("Mesh base name; <MESH>.VTX and <MESH>.IDX are read")
                .value_name("MESH")
                .required(true)
                .index(1),
        )
        .get_matches();

    let base = matches
        .get_one::<String>("mesh")
        .expect("MESH is a required argument");

    match run(Path::new(base)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(base: &Path) -> Result<()> {
    let (verts, faces) = ingest::read_mesh(base)?;
    info!("{} vertices, {} faces", verts.len(), faces.len());

    let mut pools =
        Pools::from_mesh(verts, faces).context("mesh does not fit the 16-bit pools")?;
    let dropped = pools.check();
    if dropped > 0 {
        warn!("{dropped} faces referenced missing vertices and were dropped");
    }
    let degenerate = pools.make_planes().context("plane derivation failed")?;
    if degenerate > 0 {
        warn!("{degenerate} degenerate faces were dropped");
    }

    let tree = BspTree::build(&mut pools);
    let stats = tree.stats();
    println!("Total BSP swaps: {}.", stats.swaps);
    println!("Total recursion levels: {}.", stats.max_depth);
    println!("Total new polys: {}.", stats.clips);

    let file = File::create("tree.txt").context("cannot create tree.txt")?;
    let mut out = BufWriter::new(file);
    tree.write_dump(&mut out).context("cannot write tree.txt")?;
    out.flush().context("cannot write tree.txt")?;

    info!("tree written to tree.txt ({} nodes)", tree.len());
    Ok(())
}
