use vrscene::{Scene, SceneConfig};
use vrscene::{bench_galaxy_step, bench_rotation};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Run the timing benchmarks instead of a scene
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scene_from_yaml(file_name: &str) -> Result<SceneConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    SceneConfig::from_yaml(&text).with_context(|| format!("invalid scene file {}", config_path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_galaxy_step();
        bench_rotation();
        return Ok(());
    }

    let scene_cfg = load_scene_from_yaml(&args.file_name)?;
    let mut scene = Scene::build_scene(scene_cfg)?;
    println!(
        "run: {} stars, {} frames at dt = {:.4} s",
        scene.space.simulator().num_stars(),
        scene.frames,
        scene.dt
    );

    let summary = scene.run();

    println!("frames simulated    : {}", summary.frames);
    println!("stars recycled      : {}", summary.recycled);
    println!("keys consumed       : {}", summary.consumed_keys);
    println!("farthest star (eye) : {:.4}", summary.max_star_distance);
    println!("grid brightness     : {}", summary.grid_brightness);
    println!("line thickness      : {:.1}", summary.line_thickness);
    let t = summary.grid.translation;
    println!("grid center         : ({:.4}, {:.4}, {:.4})", t.x, t.y, t.z);
    println!("grid model matrix   : {}", summary.grid.model_matrix());

    Ok(())
}
