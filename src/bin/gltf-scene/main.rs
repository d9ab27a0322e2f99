//! gltf-scene CLI - inspect glTF files through the scene-bundle parser.

use gltf_scene::prelude::*;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level (thread-safe)
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LOG_INFO);

#[inline]
fn log_level() -> u8 {
    LOG_LEVEL.load(Ordering::Relaxed)
}

#[inline]
fn set_log_level(level: u8) {
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

macro_rules! info {
    ($($arg:tt)*) => {
        if log_level() >= LOG_INFO {
            println!("[INFO] {}", format!($($arg)*));
        }
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        if log_level() >= LOG_DEBUG {
            println!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        if log_level() >= LOG_TRACE {
            println!("[TRACE] {}", format!($($arg)*));
        }
    };
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut scale = 1.0f32;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => set_log_level(LOG_DEBUG),
            "-vv" | "--trace" => set_log_level(LOG_TRACE),
            "-q" | "--quiet" => set_log_level(LOG_QUIET),
            "--scale" => {
                i += 1;
                scale = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("Error: --scale needs a number");
                        std::process::exit(1);
                    });
            }
            other => filtered_args.push(other),
        }
        i += 1;
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - bundle summary
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gltf-scene info <file.gltf>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1], scale);
        }

        // Tree command - scene/node hierarchy
        "tree" | "t" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gltf-scene tree <file.gltf>");
                std::process::exit(1);
            }
            cmd_tree(filtered_args[1], scale);
        }

        // Dump command - node transforms
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gltf-scene dump <file.gltf> [--json]");
                std::process::exit(1);
            }
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            if json_mode {
                set_log_level(LOG_QUIET);
            }
            cmd_dump(filtered_args[1], scale, json_mode);
        }

        // Errors command - render the error tag table
        "errors" | "e" => {
            for (i, tag) in Error::TAGS.iter().enumerate() {
                println!("{i:2}  {tag}");
            }
        }

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0], scale);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("gltf-scene - glTF scene bundle toolkit");
    println!();
    println!("USAGE:");
    println!("    gltf-scene [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info  <file>           Show bundle summary and entity counts");
    println!("    t, tree  <file>           Show scene/node hierarchy");
    println!("    d, dump  <file> [--json]  Dump node transforms");
    println!("    e, errors                 List error tags");
    println!("    h, help                   Show this help");
    println!();
    println!("OPTIONS:");
    println!("    --scale <f>      Document scale factor (default 1.0)");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress all output");
    println!();
    println!("EXAMPLES:");
    println!("    gltf-scene info model.gltf            # Quick overview");
    println!("    gltf-scene tree scene.gltf            # See hierarchy");
    println!("    gltf-scene dump scene.gltf --json     # Node transforms as JSON");
    println!("    gltf-scene --scale 0.01 info big.gltf # Parse at 1/100 scale");
    println!();
    println!("NOTES:");
    println!("    - Passing a .gltf file directly is equivalent to 'info'");
}

fn load(path: &str, scale: f32) -> SceneBundle {
    info!("Parsing: {} (scale {})", path, scale);
    match parse_gltf(path, scale) {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("Failed to parse {}: [{}] {}", path, e.as_str(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str, scale: f32) {
    let bundle = load(path, scale);

    debug!("Parse complete");

    let payload: usize = bundle.buffers.iter().map(|b| b.data.len()).sum();

    println!("Document: {}", path);
    println!("Default scene: {}", bundle.default_scene);
    println!();
    println!("Entities:");
    println!("  Scenes:     {}", bundle.scenes.len());
    println!("  Nodes:      {}", bundle.nodes.len());
    println!("  Meshes:     {}", bundle.meshes.len());
    println!("  Materials:  {}", bundle.materials.len());
    println!("  Textures:   {}", bundle.textures.len());
    println!("  Images:     {}", bundle.images.len());
    println!("  Samplers:   {}", bundle.samplers.len());
    println!("  Cameras:    {}", bundle.cameras.len());
    println!("  Skins:      {}", bundle.skins.len());
    println!("  Animations: {}", bundle.animations.len());
    println!("  Buffers:    {} ({} payload bytes)", bundle.buffers.len(), payload);
    println!();
    println!("Totals: {} vertices, {} indices", bundle.total_vertices, bundle.total_indices);

    for anim in &bundle.animations {
        println!(
            "Animation '{}': {} channels, {} samplers, {:.3}s",
            bundle.name(anim.name),
            anim.channels.len(),
            anim.samplers.len(),
            anim.duration
        );
    }
}

fn cmd_tree(path: &str, scale: f32) {
    let bundle = load(path, scale);

    println!("Document: {}", path);
    println!();

    for (i, scene) in bundle.scenes.iter().enumerate() {
        let marker = if i as i32 == bundle.default_scene { "*" } else { " " };
        println!("{}Scene {} '{}'", marker, i, bundle.name(scene.name));
        for &root in bundle.ints(scene.nodes) {
            print_node(&bundle, root, 1);
        }
    }
}

fn print_node(bundle: &SceneBundle, index: i32, depth: usize) {
    if depth > 64 {
        return; // cyclic child lists
    }
    let indent = "  ".repeat(depth);
    let Some(node) = usize::try_from(index).ok().and_then(|i| bundle.nodes.get(i)) else {
        println!("{}<node {} out of range>", indent, index);
        return;
    };

    trace!("visit node {}", index);

    let what = match (node.kind, node.entity) {
        (_, -1) => String::new(),
        (NodeKind::Mesh, e) => format!(" [mesh {e}]"),
        (NodeKind::Camera, e) => format!(" [camera {e}]"),
    };
    let skin = if node.skin >= 0 { format!(" [skin {}]", node.skin) } else { String::new() };
    println!("{}{}{}{}", indent, bundle.name(node.name), what, skin);

    for &child in bundle.ints(node.children) {
        print_node(bundle, child, depth + 1);
    }
}

fn cmd_dump(path: &str, scale: f32, json_mode: bool) {
    let bundle = load(path, scale);

    if json_mode {
        let nodes: Vec<serde_json::Value> = bundle
            .nodes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "name": bundle.name(n.name),
                    "translation": [n.translation.x, n.translation.y, n.translation.z],
                    "rotation": [n.rotation.x, n.rotation.y, n.rotation.z, n.rotation.w],
                    "scale": [n.scale.x, n.scale.y, n.scale.z],
                    "children": bundle.ints(n.children),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "document": path,
                "nodes": nodes
            }))
            .unwrap_or_default()
        );
    } else {
        println!("Document: {}", path);
        println!();
        for (i, n) in bundle.nodes.iter().enumerate() {
            println!("[{}] '{}'", i, bundle.name(n.name));
            println!("    T: ({:.4}, {:.4}, {:.4})", n.translation.x, n.translation.y, n.translation.z);
            println!(
                "    R: ({:.4}, {:.4}, {:.4}, {:.4})",
                n.rotation.x, n.rotation.y, n.rotation.z, n.rotation.w
            );
            println!("    S: ({:.4}, {:.4}, {:.4})", n.scale.x, n.scale.y, n.scale.z);
        }
    }
}
