//! Entry point for objinfo: load an OBJ model and report its contents.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::{DEFAULT_SCALE, ObjModel, TextureKind, TextureManager};

struct Options {
    path: PathBuf,
    scale: f32,
    textures: bool,
}

fn parse_scale_arg(args: &[String]) -> Result<f32> {
    // --scale=<f32>, default = DEFAULT_SCALE
    for arg in args {
        if let Some(val) = arg.strip_prefix("--scale=") {
            return val
                .parse::<f32>()
                .with_context(|| format!("Invalid --scale value '{val}'"));
        }
    }
    Ok(DEFAULT_SCALE)
}

fn parse_textures_arg(args: &[String]) -> bool {
    // --textures[=on|off], default off
    for arg in args {
        if arg == "--textures" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--textures=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut paths = args.iter().filter(|a| !a.starts_with("--"));
    let Some(path) = paths.next() else {
        bail!("usage: objinfo <model.obj> [--scale=<f32>] [--textures]");
    };
    if let Some(extra) = paths.next() {
        log::warn!("Ignoring extra argument '{}'", extra);
    }
    Ok(Options {
        path: PathBuf::from(path),
        scale: parse_scale_arg(args)?,
        textures: parse_textures_arg(args),
    })
}

fn report(model: &ObjModel) {
    log::info!(
        "{} meshes, {} materials (scale {})",
        model.mesh_count(),
        model.material_count(),
        model.scale()
    );
    for (i, mesh) in model.meshes().iter().enumerate() {
        let material = model.material_of(mesh).map_or("<none>", |m| m.name.as_str());
        log::info!(
            "  mesh {} '{}': {} vertices, {} triangles, material {}",
            i,
            mesh.name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            material
        );
    }
    for material in model.materials() {
        log::info!(
            "  material '{}': Kd={:?} d={} Ns={} Ni={}",
            material.name,
            &material.diffuse[..3],
            material.dissolve(),
            material.specular_exponent(),
            material.refraction_index()
        );
    }
    if let Some((min, max)) = model.world_bounds() {
        log::info!("World bounds: {:?} .. {:?}", min, max);
    }
}

fn report_textures(model: &ObjModel) {
    let mut textures = TextureManager::new();
    for material in model.materials() {
        let handles = textures.load_material(material);
        for kind in TextureKind::ALL {
            if let Some(tex) = handles[kind as usize].and_then(|h| textures.texture(h)) {
                log::info!(
                    "  '{}' {:?}: {}x{}",
                    material.name,
                    kind,
                    tex.width,
                    tex.height
                );
            }
        }
        for handle in handles.into_iter().flatten() {
            textures.release(handle);
        }
    }
    log::info!("Texture cache empty after release: {}", textures.is_empty());
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;
    log::info!(
        "Loading {} (scale={}, textures={})",
        options.path.display(),
        options.scale,
        options.textures
    );

    let mut model = ObjModel::with_scale(options.scale);
    model
        .load(&options.path)
        .with_context(|| format!("Failed to load model {}", options.path.display()))?;

    report(&model);
    if options.textures {
        report_textures(&model);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_when_only_path_given() {
        let opts = parse_args(&args(&["teapot.obj"])).unwrap();
        assert_eq!(opts.path, PathBuf::from("teapot.obj"));
        assert_eq!(opts.scale, DEFAULT_SCALE);
        assert!(!opts.textures);
    }

    #[test]
    fn flags_in_any_position() {
        let opts = parse_args(&args(&["--scale=2", "--textures", "m/teapot.obj"])).unwrap();
        assert_eq!(opts.path, PathBuf::from("m/teapot.obj"));
        assert_eq!(opts.scale, 2.0);
        assert!(opts.textures);
    }

    #[test]
    fn textures_flag_values() {
        assert!(parse_textures_arg(&args(&["--textures=on"])));
        assert!(!parse_textures_arg(&args(&["--textures=off"])));
    }

    #[test]
    fn missing_path_or_bad_scale_fail() {
        assert!(parse_args(&args(&["--textures"])).is_err());
        assert!(parse_args(&args(&["a.obj", "--scale=big"])).is_err());
    }
}
