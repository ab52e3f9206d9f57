//! offedge CLI - offset selected edge loops of a JSON mesh
//!
//! Reads meshes in the `MeshData` JSON layout, applies an offset in one shot
//! or replays a pointer drag, and writes the result back as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use offedge_kernel::loops::{collect_edges, collect_loops};
use offedge_kernel::{
    offset_edges, DepthMode, EditObject, GeometryMode, Interaction, InteractionStatus,
    OffsetOptions, PointerEvent,
};
use offedge_topo::{EditMesh, MeshData};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "offedge")]
#[command(about = "Offset selected edge loops of a mesh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Offset the selected edge loops once
    Apply {
        /// Input mesh (.json)
        input: PathBuf,
        /// Output mesh (.json)
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Replay a horizontal pointer drag and keep the final offset
    Drag {
        /// Input mesh (.json)
        input: PathBuf,
        /// Pointer x positions relative to the drag start
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        deltas: Vec<f64>,
        /// Output mesh (.json); omitted means report only
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Restore the mesh at the end instead of confirming
        #[arg(long)]
        cancel: bool,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Display information about a mesh and its edge selection
    Info {
        /// Path to the mesh (.json)
        file: PathBuf,
    },
}

/// Command-line overrides on top of the config file.
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// TOML config with `[options]` and `[object]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Geometry mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Offset width
    #[arg(long, allow_hyphen_values = true)]
    width: Option<f64>,
    /// Offset depth (switches to depth mode)
    #[arg(long, allow_hyphen_values = true)]
    depth: Option<f64>,
    /// Tilt angle in degrees (switches to angle mode)
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<f64>,
    /// Orient loops by adjacent faces
    #[arg(long)]
    follow_face: bool,
    /// Honor mirror modifiers from the config
    #[arg(long)]
    mirror: bool,
    /// Slide vertices along inner edges
    #[arg(long)]
    edge_rail: bool,
    /// Restrict edge rails to loop ends
    #[arg(long)]
    edge_rail_only_end: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Offset,
    Extrude,
    Move,
}

impl From<ModeArg> for GeometryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Offset => GeometryMode::Offset,
            ModeArg::Extrude => GeometryMode::Extrude,
            ModeArg::Move => GeometryMode::Move,
        }
    }
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    options: OffsetOptions,
    object: EditObject,
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

impl Overrides {
    fn apply_to(&self, options: &mut OffsetOptions) {
        if let Some(mode) = self.mode {
            options.geometry_mode = mode.into();
        }
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(depth) = self.depth {
            options.depth_mode = DepthMode::Depth;
            options.depth = depth;
        }
        if let Some(angle) = self.angle {
            options.depth_mode = DepthMode::Angle;
            options.angle = angle.to_radians();
        }
        options.follow_face |= self.follow_face;
        options.mirror_modifier |= self.mirror;
        options.edge_rail |= self.edge_rail;
        options.edge_rail_only_end |= self.edge_rail_only_end;
    }

    fn resolve(&self) -> Result<(OffsetOptions, EditObject)> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_to(&mut config.options);
        Ok((config.options, config.object))
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            input,
            output,
            overrides,
        } => {
            apply_file(&input, &output, &overrides)?;
        }
        Commands::Drag {
            input,
            deltas,
            output,
            cancel,
            overrides,
        } => {
            drag_file(&input, &deltas, output.as_deref(), cancel, &overrides)?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

fn read_mesh(path: &Path) -> Result<MeshData> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading mesh {}", path.display()))?;
    MeshData::from_json(&json).with_context(|| format!("parsing mesh {}", path.display()))
}

fn write_mesh(path: &Path, mesh: &MeshData) -> Result<()> {
    fs::write(path, mesh.to_json()?)
        .with_context(|| format!("writing mesh {}", path.display()))
}

fn apply_file(input: &Path, output: &Path, overrides: &Overrides) -> Result<()> {
    let (options, object) = overrides.resolve()?;
    let mut mesh = read_mesh(input)?;

    let report = offset_edges(&mut mesh, &object, &options)?;
    write_mesh(output, &mesh)?;

    println!(
        "Offset {} loop(s): {} vertices moved, {} edges and {} faces created",
        report.loops, report.moved_verts, report.new_edges, report.new_faces
    );
    println!("Wrote {}", output.display());
    Ok(())
}

fn drag_file(
    input: &Path,
    deltas: &[f64],
    output: Option<&Path>,
    cancel: bool,
    overrides: &Overrides,
) -> Result<()> {
    let (options, object) = overrides.resolve()?;
    let mut mesh = read_mesh(input)?;

    let mut drag = Interaction::begin(&mesh, object, options, (0.0, 0.0))?;
    for &x in deltas {
        drag.handle(&mut mesh, PointerEvent::Move { x, y: 0.0 })?;
        if let Some(options) = drag.options() {
            println!("{}", drag_step_line(x, options.width));
        }
    }

    let event = if cancel {
        PointerEvent::Cancel
    } else {
        PointerEvent::Confirm
    };
    let status = drag.handle(&mut mesh, event)?;
    info!("Drag ended: {:?}", status);
    match status {
        InteractionStatus::Finished => println!("Drag confirmed"),
        InteractionStatus::Cancelled => println!("Drag cancelled; mesh restored"),
        InteractionStatus::Running => {}
    }

    if let Some(output) = output {
        write_mesh(output, &mesh)?;
        println!("Wrote {}", output.display());
    }
    Ok(())
}

fn drag_step_line(x: f64, width: f64) -> String {
    format!("  x {:>8.2}  width {:+.4}", x, width)
}

fn show_info(file: &Path) -> Result<()> {
    let data = read_mesh(file)?;
    let mesh = EditMesh::from_data(&data)?;

    println!("mesh: {}", file.display());
    println!("  Vertices: {}", data.vertices.len());
    println!("  Edges: {}", data.edges.len());
    println!("  Faces: {}", data.faces.len());

    let selected_edges = data.edges.iter().filter(|e| e.select).count();
    let selected_faces = data.faces.iter().filter(|f| f.select).count();
    println!("\nSelection:");
    println!("  Edges: {}", selected_edges);
    println!("  Faces: {}", selected_faces);

    let Some(edges) = collect_edges(&mesh) else {
        println!("  No boundary edges to offset");
        return Ok(());
    };
    println!("  Boundary edges: {}", edges.len());

    match collect_loops(&mesh, &edges) {
        Ok(loops) => {
            println!("\nLoops:");
            for (i, lp) in loops.iter().enumerate() {
                let kind = if lp.is_closed() { "closed" } else { "open" };
                println!("  {}: {} edges ({})", i + 1, lp.edges.len(), kind);
            }
        }
        Err(e) => {
            println!("\nCannot offset: {}", e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_and_overrides() {
        let config: Config = toml::from_str(
            r#"
            [options]
            geometry_mode = "extrude"
            width = 0.5
            edge_rail = true

            [[object.modifiers]]
            use_y = true
            "#,
        )
        .unwrap();
        assert_eq!(config.options.geometry_mode, GeometryMode::Extrude);
        assert!(config.options.edge_rail);
        assert_eq!(config.object.modifiers.len(), 1);
        assert!(config.object.modifiers[0].use_x);

        let mut options = config.options;
        let overrides = Overrides {
            mode: Some(ModeArg::Move),
            depth: Some(-0.1),
            follow_face: true,
            ..Default::default()
        };
        overrides.apply_to(&mut options);
        assert_eq!(options.geometry_mode, GeometryMode::Move);
        assert_eq!(options.depth_mode, DepthMode::Depth);
        assert_eq!(options.depth, -0.1);
        assert_eq!(options.width, 0.5);
        assert!(options.follow_face);
        assert!(options.edge_rail);
    }

    #[test]
    fn test_cli_parses_drag() {
        let cli = Cli::try_parse_from([
            "offedge", "drag", "mesh.json", "--deltas", "10,-25.5,40", "--width", "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Drag {
                deltas, overrides, ..
            } => {
                assert_eq!(deltas, vec![10.0, -25.5, 40.0]);
                assert_eq!(overrides.width, Some(-1.0));
            }
            _ => panic!("expected drag"),
        }
    }

    #[test]
    fn test_drag_step_line() {
        assert_eq!(drag_step_line(25.0, 0.25), "  x    25.00  width +0.2500");
        assert_eq!(drag_step_line(-7.5, -0.075), "  x    -7.50  width -0.0750");
    }
}
