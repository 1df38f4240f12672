//! ptscene CLI - build and inspect path tracer scene buffers.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use ptscene::gpu::{decode_triangle, FlatBuffer};
use ptscene::prelude::*;

const BUILD_DATE: &str = env!("PTSCENE_BUILD_DATE");
const BUILD_TIME: &str = env!("PTSCENE_BUILD_TIME");

/// Verbosity requested on the command line
#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Info => "info",
            Verbosity::Debug => "ptscene=debug",
            Verbosity::Trace => "ptscene=trace",
        }
    }
}

/// Install the fmt subscriber, plus a chrome trace layer when `PTSCENE_TRACE=1`.
fn init_tracing(verbosity: Option<Verbosity>) -> Option<tracing_chrome::FlushGuard> {
    let filter = match verbosity {
        Some(v) => EnvFilter::new(v.directive()),
        None => EnvFilter::try_from_env("PTSCENE_LOG")
            .unwrap_or_else(|_| EnvFilter::new(Verbosity::Info.directive())),
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if env::var("PTSCENE_TRACE").ok().as_deref() == Some("1") {
        let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .file("trace.json")
            .build();
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .with(chrome_layer)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        None
    }
}

/// Global flags plus the remaining positional arguments.
#[derive(Default)]
struct Cli {
    verbosity: Option<Verbosity>,
    config_path: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    positional: Vec<String>,
}

/// Split global flags from positional arguments. On a flag missing its value,
/// returns the usage of that flag.
fn parse_args(args: &[String]) -> std::result::Result<Cli, &'static str> {
    let mut cli = Cli::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => cli.verbosity = Some(Verbosity::Debug),
            "-vv" | "--trace" => cli.verbosity = Some(Verbosity::Trace),
            "-q" | "--quiet" => cli.verbosity = Some(Verbosity::Quiet),
            "-c" | "--config" => {
                let path = iter.next().ok_or("--config <file>")?;
                cli.config_path = Some(PathBuf::from(path));
            }
            "-o" | "--out" => {
                let path = iter.next().ok_or("--out <dir>")?;
                cli.out_dir = Some(PathBuf::from(path));
            }
            _ => cli.positional.push(arg.clone()),
        }
    }
    Ok(cli)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let Cli {
        verbosity,
        config_path,
        out_dir,
        positional,
    } = match parse_args(&args) {
        Ok(cli) => cli,
        Err(usage) => missing(usage),
    };
    let filtered_args: Vec<&str> = positional.iter().map(String::as_str).collect();

    let _guard = init_tracing(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "build" | "b" => match filtered_args.get(1) {
            Some(scene) => load_config(config_path.as_deref()).and_then(|config| {
                cmd_build(scene, out_dir.as_deref().unwrap_or(Path::new(".")), &config)
            }),
            None => missing("build <scene.json> [-o <dir>]"),
        },
        "stats" | "s" => match filtered_args.get(1) {
            Some(scene) => {
                load_config(config_path.as_deref()).and_then(|config| cmd_stats(scene, &config))
            }
            None => missing("stats <scene.json>"),
        },
        "inspect" | "i" => match (filtered_args.get(1), filtered_args.get(2)) {
            (Some(scene), Some(id)) => load_config(config_path.as_deref())
                .and_then(|config| cmd_inspect(scene, id, &config)),
            _ => missing("inspect <scene.json> <triangle-id>"),
        },
        "version" | "--version" | "-V" => {
            println!("ptscene {} (built {} {})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_TIME);
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn missing(usage: &str) -> ! {
    eprintln!("Error: missing argument");
    eprintln!("Usage: ptscene {}", usage);
    std::process::exit(1);
}

fn print_help() {
    println!("ptscene {} - path tracer scene preparation", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: ptscene [options] <command> <scene.json>");
    println!();
    println!("Commands:");
    println!("  b, build <scene.json>          Write triangles.bin, materials.bin, bvh.bin, uniforms.json");
    println!("  s, stats <scene.json>          Show BVH statistics and buffer usage");
    println!("  i, inspect <scene.json> <id>   Show the encoded record of one triangle");
    println!("  version                        Show version and build date");
    println!("  h, help                        Show this help");
    println!();
    println!("Options:");
    println!("  -o, --out <dir>      Output directory for build (default: .)");
    println!("  -c, --config <file>  Build config (default: user config dir)");
    println!("  -v, --verbose        Debug output");
    println!("  -vv, --trace         Trace output (very verbose)");
    println!("  -q, --quiet          Errors only");
    println!();
    println!("Environment:");
    println!("  PTSCENE_LOG          Log filter when no verbosity flag is given");
    println!("  PTSCENE_TRACE=1      Write a chrome trace to trace.json");
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BuildConfig> {
    match path {
        Some(p) => BuildConfig::load_from(p)
            .with_context(|| format!("failed to read config {}", p.display())),
        None => Ok(BuildConfig::load()),
    }
}

fn load_scene(path: &str, config: &BuildConfig) -> anyhow::Result<Scene> {
    let desc = SceneDescription::load(path).with_context(|| format!("failed to load {}", path))?;
    let scene = desc
        .into_scene(config)
        .with_context(|| format!("failed to assemble {}", path))?;
    Ok(scene)
}

fn write_buffer(dir: &Path, name: &str, buffer: &FlatBuffer) -> anyhow::Result<()> {
    let bytes: Vec<u8> = buffer
        .as_slice()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let path = dir.join(name);
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("{}: {} scalars", path.display(), buffer.len());
    Ok(())
}

fn cmd_build(scene_path: &str, out_dir: &Path, config: &BuildConfig) -> anyhow::Result<()> {
    let scene = load_scene(scene_path, config)?;
    let buffers = build_scene_buffers(&scene, config)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    write_buffer(out_dir, "triangles.bin", &buffers.triangles)?;
    write_buffer(out_dir, "materials.bin", &buffers.materials)?;
    write_buffer(out_dir, "bvh.bin", &buffers.bvh.buffer)?;

    let uniforms = serde_json::json!({
        "layout": config.layout,
        "uniforms": buffers.uniforms,
    });
    let path = out_dir.join("uniforms.json");
    std::fs::write(&path, serde_json::to_string_pretty(&uniforms)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(
        triangles = buffers.uniforms.triangle_count,
        materials = buffers.uniforms.material_count,
        "scene written to {}",
        out_dir.display()
    );
    Ok(())
}

fn percent(used: usize, capacity: usize) -> f64 {
    if capacity == 0 {
        0.0
    } else {
        used as f64 * 100.0 / capacity as f64
    }
}

fn cmd_stats(scene_path: &str, config: &BuildConfig) -> anyhow::Result<()> {
    let scene = load_scene(scene_path, config)?;
    let buffers = build_scene_buffers(&scene, config)?;
    let stats = buffers.stats;
    let bounds = scene.bounds();

    println!("Scene: {}", scene_path);
    println!("  Triangles:      {}", scene.triangles.len());
    println!("  Materials:      {}", scene.materials.len());
    println!("  Bounds:         {:?}", bounds);
    println!();
    println!("BVH:");
    println!("  Nodes:          {}", stats.node_count);
    println!("  Leaves:         {}", stats.leaf_count);
    println!("  Depth:          {}", stats.depth);
    println!("  Max leaf size:  {}", stats.max_leaf_size);
    match stats.max_tree_index {
        Some(i) => println!("  Max heap index: {}", i),
        None => println!("  Max heap index: overflow"),
    }
    println!();
    println!("Buffers ({}x{} texels):", config.layout.width, config.layout.height);
    for buffer in [&buffers.triangles, &buffers.materials, &buffers.bvh.buffer] {
        println!(
            "  {:<16} {:>10} / {} scalars ({:.2}%)",
            buffer.label(),
            buffer.len(),
            buffer.capacity(),
            percent(buffer.len(), buffer.capacity())
        );
    }
    println!(
        "  BVH table:       {} texels, body {} texels",
        buffers.bvh.table_texels, buffers.bvh.body_texels
    );
    Ok(())
}

fn cmd_inspect(scene_path: &str, id: &str, config: &BuildConfig) -> anyhow::Result<()> {
    let id: u32 = id.parse().with_context(|| format!("invalid triangle id {:?}", id))?;
    let scene = load_scene(scene_path, config)?;
    if id as usize >= scene.triangles.len() {
        bail!("triangle {} out of range ({} triangles)", id, scene.triangles.len());
    }

    let buffers = build_scene_buffers(&scene, config)?;
    let tri = decode_triangle(buffers.triangles.as_slice(), id)?;
    let material = scene
        .materials
        .get(tri.material_id)
        .map(|m| m.name.as_str())
        .unwrap_or("?");

    println!("Triangle {}", tri.id);
    println!("  material: {} ({})", tri.material_id, material);
    let [p0, p1, p2] = tri.corners();
    println!("  corners:  {:?} {:?} {:?}", p0, p1, p2);
    println!("  edge1:    {:?}", tri.edge1);
    println!("  edge2:    {:?}", tri.edge2);
    println!("  smooth:   {}", tri.smooth);
    if tri.smooth {
        for (i, n) in tri.normals.iter().enumerate() {
            if let Some(n) = n {
                println!("  normal{}:  {:?}", i, n);
            }
        }
    }
    Ok(())
}
