//! FERM CLI - Compile, sample and inspect SDF scenes from the command line

mod scene;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ferm_sdf::{
    Caster, DEFAULT_MAX_DISTANCE, DEFAULT_TEMPLATE, ElementaryKind, MarchSettings, MixerKind,
    ModifierKind, ParamStyle, ParamTemplate, RenderMode, ShaderOptions, ShaderSource,
    SuperSampling,
};
use glam::Vec3;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ferm")]
#[command(about = "Symbolic SDF composition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a scene to a distance expression or a shader include
    Compile {
        /// Scene description (.json)
        scene: PathBuf,

        /// Inline parameter values instead of identifiers
        #[arg(long)]
        literal: bool,

        /// Emit the assembled scene shader include
        #[arg(long)]
        shader: bool,

        /// Shader render mode
        #[arg(long, value_enum, default_value = "normal")]
        mode: Mode,

        /// Samples per pixel (1, 2, 4, 9 or 16)
        #[arg(long, default_value = "1")]
        supersampling: u32,

        /// Shader template to fill instead of the bundled one
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Evaluate the distance at one or more points
    Eval {
        /// Scene description (.json)
        scene: PathBuf,

        /// Sample point as x,y,z (repeatable)
        #[arg(long = "at", value_parser = parse_vec3, required = true)]
        at: Vec<Vec3>,
    },

    /// Cast a ray against the scene
    Cast {
        /// Scene description (.json)
        scene: PathBuf,

        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        origin: Vec3,

        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        direction: Vec3,

        /// Cut-off length
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
        max_distance: f32,

        /// Quality dial; each step is a power of ten in precision
        #[arg(long, default_value_t = 0.0)]
        quality: f32,
    },

    /// List the scene's bound parameters
    Params {
        /// Scene description (.json)
        scene: PathBuf,
    },

    /// List every shape, mixer and modifier kind
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Normal,
    Depthless,
    Skybox,
    Equirect,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => Self::Normal,
            Mode::Depthless => Self::Depthless,
            Mode::Skybox => Self::Skybox,
            Mode::Equirect => Self::Equirect360,
        }
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn supersampling(samples: u32) -> Result<SuperSampling> {
    Ok(match samples {
        1 => SuperSampling::None,
        2 => SuperSampling::X2,
        4 => SuperSampling::X4,
        9 => SuperSampling::X9,
        16 => SuperSampling::X16,
        _ => bail!("unsupported supersampling {samples} (expected 1, 2, 4, 9 or 16)"),
    })
}

fn main() -> Result<()> {
    // Logs go to stderr so compiled output can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            scene,
            literal,
            shader,
            mode,
            supersampling: samples,
            template,
        } => {
            let options = ShaderOptions {
                mode: mode.into(),
                sampling: supersampling(samples)?,
                parameters: if literal {
                    ParamStyle::Literal
                } else {
                    ParamStyle::Identifier
                },
            };
            run_compile(&scene, shader, &options, template.as_deref())?;
        }
        Commands::Eval { scene, at } => {
            run_eval(&scene, &at)?;
        }
        Commands::Cast {
            scene,
            origin,
            direction,
            max_distance,
            quality,
        } => {
            run_cast(&scene, origin, direction, max_distance, quality)?;
        }
        Commands::Params { scene } => {
            run_params(&scene)?;
        }
        Commands::List => {
            run_list();
        }
    }

    Ok(())
}

fn run_compile(
    path: &Path,
    shader: bool,
    options: &ShaderOptions,
    template: Option<&Path>,
) -> Result<()> {
    let scene = scene::load(path)?;
    let compiled = scene.compile().context("failed to compile scene")?;

    if shader {
        let base = match template {
            Some(t) => std::fs::read_to_string(t)
                .with_context(|| format!("failed to read template {}", t.display()))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        let source = ShaderSource::assemble(&base, &compiled, options)?;
        print!("{}", source.text());
        return Ok(());
    }

    let style = options.parameters;
    if style == ParamStyle::Identifier && !compiled.parameters.is_empty() {
        println!("{}", compiled.declarations());
    }
    let helpers = compiled.helper_source(style)?;
    if !helpers.is_empty() {
        println!("{helpers}");
    }
    println!("{}", compiled.render(style)?);
    eprintln!("geometry: {}", compiled.geometry);
    Ok(())
}

fn run_eval(path: &Path, points: &[Vec3]) -> Result<()> {
    let scene = scene::load(path)?;
    for (p, d) in points.iter().zip(scene.evaluate_many(points)) {
        println!("({}, {}, {}): {}", p.x, p.y, p.z, d);
    }
    Ok(())
}

fn run_cast(path: &Path, origin: Vec3, direction: Vec3, max_distance: f32, quality: f32) -> Result<()> {
    if direction.length_squared() == 0.0 {
        bail!("direction must be non-zero");
    }
    let scene = scene::load(path)?;
    let caster = Caster::new(MarchSettings::from_quality(quality, 0.0, 0.0));
    let r = caster.march(&scene, origin, direction, max_distance, true);

    if r.hit {
        println!("hit at distance {}", r.distance);
        println!("  point:  ({}, {}, {})", r.point.x, r.point.y, r.point.z);
        println!("  normal: ({}, {}, {})", r.normal.x, r.normal.y, r.normal.z);
    } else if r.cutoff {
        println!("no hit: ran out of steps after {}", r.total_length);
    } else {
        println!("miss");
    }
    println!("  steps: {}", r.total_steps);
    println!("  shortest distance: {}", r.shortest_distance);
    Ok(())
}

fn run_params(path: &Path) -> Result<()> {
    let scene = scene::load(path)?;
    let mut count = 0;
    scene.bind_parameters(&mut |id: &str, ty: ferm_sdf::ParamType, value: ferm_sdf::ParamValue| {
        println!("{id:<8} {:<6} {value:?}", ty.shader_type());
        count += 1;
    });
    eprintln!("{count} parameter(s)");
    Ok(())
}

fn param_names(params: &[ParamTemplate]) -> String {
    params.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}

fn run_list() {
    let mut category = "";
    for kind in ElementaryKind::all() {
        if kind.category() != category {
            category = kind.category();
            println!("{category}:");
        }
        println!("  {:<24} {}", kind.name(), param_names(kind.record().params));
    }

    println!("Mixers:");
    for kind in MixerKind::ALL {
        println!("  {:<24} {}", kind.name(), param_names(kind.record().params));
    }

    println!("Modifiers:");
    for kind in ModifierKind::ALL {
        println!("  {:<24} {}", kind.name(), param_names(kind.record().params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1, -2.5,3"), Ok(Vec3::new(1.0, -2.5, 3.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn test_supersampling() {
        assert_eq!(supersampling(9).unwrap(), SuperSampling::X9);
        assert!(supersampling(3).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["ferm", "eval", "s.json", "--at", "0,0,0", "--at", "1,2,3"]).unwrap();
        match cli.command {
            Commands::Eval { at, .. } => assert_eq!(at, vec![Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)]),
            _ => panic!("expected eval"),
        }
    }
}
