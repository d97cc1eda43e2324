use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

mod pipeline;
mod rig;
mod usage;

use pipeline::{OutputFields, OutputQuery, PathResolver, TemplateResolver, find_latest};
use rig::{
    DEFAULT_POLE_DEPTH, KeyMode, SwitchMode, SwitchRequest, build_sample_rig, exec_switch_and_key,
    selected_system,
};
use usage::{LogSink, UsageEvent, UsageSink};

#[derive(clap::Parser)]
#[command(name = "rigkit", about = "Rig FK/IK switching and pipeline utilities.")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run an FK/IK switch on the built-in sample rig.
    Switch {
        /// Side of the limb (Lf/Rt).
        #[arg(long, default_value = "Lf")]
        side: String,

        /// Which limb (arm/leg).
        #[arg(long, default_value = "arm")]
        limb: String,

        /// Switch direction (fk_to_ik/ik_to_fk).
        #[arg(long, default_value = "fk_to_ik")]
        mode: String,

        /// Key behavior (none/switch_frame/previous_frame/range).
        #[arg(long, default_value = "none")]
        key_mode: String,

        /// Frame range for key_mode=range, as start:end.
        #[arg(long)]
        range: Option<String>,

        /// Bracket a range switch with keys just outside the range.
        #[arg(long)]
        switch_key: bool,

        /// Ignore --mode and switch away from the active representation.
        #[arg(long)]
        toggle: bool,

        /// Distance of the pole control from the mid joint.
        #[arg(long, default_value_t = DEFAULT_POLE_DEPTH)]
        pole_depth: f32,
    },

    /// Resolve an output path from logical fields.
    Resolve {
        #[arg(long)]
        root: PathBuf,
        project: String,
        shot: String,
        step: String,
        output_type: String,
        output_name: String,
        version: u32,
    },

    /// Parse an output path back into logical fields.
    Parse {
        #[arg(long)]
        root: PathBuf,
        path: PathBuf,
    },

    /// Find the latest version of an output under a root.
    Latest {
        #[arg(long)]
        root: PathBuf,
        project: String,
        shot: String,
        step: String,
        output_type: String,
        output_name: String,
    },
}

fn main() {
    tracing_subscriber::fmt().init();

    let opts = Opts::parse();
    if let Err(err) = run(opts) {
        error!("{err}");
        // User-fixable errors exit politely; everything else is a fault.
        let user_facing = err
            .downcast_ref::<rig::SwitchError>()
            .is_some_and(rig::SwitchError::is_user_facing);
        std::process::exit(if user_facing { 1 } else { 2 });
    }
}

fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    let sink = LogSink;

    match opts.command {
        Command::Switch {
            side,
            limb,
            mode,
            key_mode,
            range,
            switch_key,
            toggle,
            pole_depth,
        } => {
            sink.record(&UsageEvent::new(
                "switch",
                format!("{side} {limb} {mode} {key_mode}"),
            ));

            let side: rig::Side = side.parse()?;
            let limb: rig::Limb = limb.parse()?;
            let mode: SwitchMode = mode.parse()?;
            let key_mode: KeyMode = key_mode.parse()?;

            let mut scene = scene::Scene::new();
            let rig = build_sample_rig(&mut scene, "demo")?;

            // Act like a user with the limb's IK control selected.
            let ctrl = rig.node(&scene, &format!("{side}_{limb}Ik_Ctrl"))?;
            scene.select(&[ctrl]);
            let system = selected_system(&scene)?;

            if toggle {
                system.toggle(&mut scene, pole_depth)?;
            } else {
                let mut request = SwitchRequest::new(mode, key_mode).with_switch_key(switch_key);
                request.pole_depth = pole_depth;
                if let Some(range) = range {
                    let (start, end) = parse_range(&range)?;
                    request = request.with_range(start, end);
                }

                exec_switch_and_key(&mut scene, &system, &request)?;
            }

            for id in system.ctrls() {
                let node = scene.node(id);
                let t = node.transform();
                info!(
                    "{}: t=({:.3}, {:.3}, {:.3}) r=({:.1}, {:.1}, {:.1})",
                    node.name(),
                    t.translation.x,
                    t.translation.y,
                    t.translation.z,
                    node.rotate.x,
                    node.rotate.y,
                    node.rotate.z,
                );
            }
            Ok(())
        }

        Command::Resolve {
            root,
            project,
            shot,
            step,
            output_type,
            output_name,
            version,
        } => {
            sink.record(&UsageEvent::new("resolve", format!("{project} {shot}")));

            let resolver = TemplateResolver::new(root);
            let fields = OutputFields::new(project, shot, step, output_type, output_name, version);
            println!("{}", resolver.resolve(&fields)?.display());
            Ok(())
        }

        Command::Parse { root, path } => {
            sink.record(&UsageEvent::new("parse", path.display().to_string()));

            let resolver = TemplateResolver::new(root);
            let fields = resolver.parse(&path)?;
            println!(
                "project={} shot={} step={} output_type={} output_name={} version={}",
                fields.project,
                fields.shot,
                fields.step,
                fields.output_type,
                fields.output_name,
                fields.version,
            );
            Ok(())
        }

        Command::Latest {
            root,
            project,
            shot,
            step,
            output_type,
            output_name,
        } => {
            sink.record(&UsageEvent::new("latest", format!("{project} {shot}")));

            let resolver = TemplateResolver::new(&root);
            let query = OutputQuery::new(project, shot, step, output_type, output_name);
            match find_latest(&resolver, &root, &query) {
                Some(fields) => {
                    println!("{}", resolver.resolve(&fields)?.display());
                    Ok(())
                }
                None => Err("no versions found".into()),
            }
        }
    }
}

fn parse_range(range: &str) -> Result<(i32, i32), Box<dyn std::error::Error>> {
    let Some((start, end)) = range.split_once(':') else {
        return Err(format!("bad range ({range}), expected start:end").into());
    };
    Ok((start.trim().parse()?, end.trim().parse()?))
}
