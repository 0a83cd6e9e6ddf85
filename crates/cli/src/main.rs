use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Recover structured control flow from graphs of basic blocks.
#[derive(Parser)]
#[command(name = "ravel", version, about)]
struct Args {
    /// Graph files to restructure.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let dump = dump_dir()?;
    for path in &args.paths {
        process(path, dump.as_deref())
            .with_context(|| format!("unable to restructure {}", path.display()))?;
    }
    Ok(())
}

/// Resolve the debug-dump directory from RAVEL_DUMP, wiping and recreating
/// it so each run starts from a clean slate.
fn dump_dir() -> Result<Option<PathBuf>> {
    let Some(dir) = std::env::var_os("RAVEL_DUMP") else {
        return Ok(None);
    };
    let dir = PathBuf::from(dir);
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .with_context(|| format!("unable to clear dump directory {}", dir.display()))?;
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("unable to create dump directory {}", dir.display()))?;
    Ok(Some(dir))
}

fn process(path: &Path, dump: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(path).context("unable to read file")?;
    let mut g = ravel_cfg::parse(&text).context("unable to parse file")?;
    ravel_cfg::init_dfs_order(&mut g);

    {
        let intervals = ravel_structure::intervals(&g)?;
        for iv in &intervals {
            log::debug!(
                "interval I({}) with {} nodes",
                g.name(iv.head()),
                iv.len()
            );
        }
    }

    let seq = ravel_structure::structure_loops(&mut g)?;
    if let Some(dir) = dump {
        for level in &seq.levels {
            let file = dir.join(format!("{}.dot", level.id()));
            fs::write(&file, level.render())
                .with_context(|| format!("unable to write {}", file.display()))?;
        }
    }

    ravel_structure::structure_two_way(&mut g)?;
    let mut g = ravel_structure::fold_compound_conds(g)?;
    ravel_structure::structure_loops(&mut g)?;
    ravel_structure::structure_two_way(&mut g)?;

    let func = ravel_emit::generate(&g)?;
    println!("{}", func);
    Ok(())
}
