use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use scframe::block::SpaceKind;
use scframe::frame::FrameFile;
use scframe::names::NameTable;

#[derive(Parser)]
#[command(name = "scf", about = "The .scf scene-frame format CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header counts and a combined-space summary
    Info { input: PathBuf },
    /// List every block and object with its position and identity
    List { input: PathBuf },
    /// Export a JSON scene summary
    Dump { input: PathBuf },
    /// Decode, rebuild and re-encode a frame
    Resave {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    match Cli::parse().command {
        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let frame = read_frame(&input)?;
            let header = frame.header();
            println!("Frame:               {}", input.display());
            println!("Scene folders:       {}", header.scene_folders.len());
            println!("Geometries:          {}", header.num_geometries);
            println!("Materials:           {}", header.num_material_resources);
            println!("Blend infos:         {}", header.num_blend_infos);
            println!("Skeletons:           {}", header.num_skeletons);
            println!("Skeleton hierarchies: {}", header.num_skel_hierarchies);
            println!("Objects:             {}", header.num_objects);
            println!("Combined space:      {} entries", frame.combined_space().len());
            let names = NameTable::build(&frame);
            println!("Distinct names:      {}", names.len());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input } => {
            let frame = read_frame(&input)?;
            for (position, entry) in frame.combined_space().iter().enumerate() {
                match entry.kind {
                    SpaceKind::SceneFolder => {
                        let name = frame
                            .scene_folders
                            .get(&entry.ref_id)
                            .map(|f| f.name.as_str())
                            .unwrap_or("?");
                        println!("{position:6}  {:<20} {:>10}  {name}", entry.kind.name(), entry.ref_id);
                    }
                    SpaceKind::Object => {
                        let obj = &frame.objects[&entry.ref_id];
                        let parent = obj
                            .data()
                            .parent1
                            .name
                            .as_deref()
                            .unwrap_or("-");
                        println!(
                            "{position:6}  {:<20} {:>10}  {}  (parent: {parent})",
                            obj.kind().name(),
                            entry.ref_id,
                            obj.name()
                        );
                    }
                    _ => {
                        println!("{position:6}  {:<20} {:>10}", entry.kind.name(), entry.ref_id);
                    }
                }
            }
        }

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { input } => {
            let frame = read_frame(&input)?;
            let dump = SceneDump::from_frame(&frame);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }

        // ── Resave ───────────────────────────────────────────────────────────
        Commands::Resave { input, output } => {
            let mut frame = read_frame(&input)?;
            let mut writer = BufWriter::new(File::create(&output)?);
            frame.write(&mut writer)?;
            println!(
                "Resaved {} entries to {}",
                frame.combined_space().len(),
                output.display()
            );
        }
    }
    Ok(())
}

fn read_frame(path: &Path) -> Result<FrameFile, Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(File::open(path)?);
    Ok(FrameFile::read(&mut reader)?)
}

// ── JSON summary ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SceneDump {
    folders: Vec<FolderDump>,
    blocks: Vec<BlockDump>,
    objects: Vec<ObjectDump>,
}

#[derive(Serialize)]
struct FolderDump {
    ref_id: i32,
    name: String,
}

#[derive(Serialize)]
struct BlockDump {
    kind: &'static str,
    ref_id: i32,
    position: usize,
}

#[derive(Serialize)]
struct ObjectDump {
    kind: &'static str,
    ref_id: i32,
    name: String,
    position: usize,
    parent1_index: i32,
    parent1_name: Option<String>,
    parent2_index: i32,
    parent2_name: Option<String>,
}

impl SceneDump {
    fn from_frame(frame: &FrameFile) -> Self {
        let mut folders = Vec::new();
        let mut blocks = Vec::new();
        let mut objects = Vec::new();

        for (position, entry) in frame.combined_space().iter().enumerate() {
            match entry.kind {
                SpaceKind::SceneFolder => {
                    if let Some(folder) = frame.scene_folders.get(&entry.ref_id) {
                        folders.push(FolderDump {
                            ref_id: folder.ref_id,
                            name: folder.name.clone(),
                        });
                    }
                }
                SpaceKind::Object => {
                    if let Some(obj) = frame.objects.get(&entry.ref_id) {
                        let data = obj.data();
                        objects.push(ObjectDump {
                            kind: obj.kind().name(),
                            ref_id: data.ref_id,
                            name: data.name.clone(),
                            position,
                            parent1_index: data.parent1.index,
                            parent1_name: data.parent1.name.clone(),
                            parent2_index: data.parent2.index,
                            parent2_name: data.parent2.name.clone(),
                        });
                    }
                }
                _ => {
                    blocks.push(BlockDump {
                        kind: entry.kind.name(),
                        ref_id: entry.ref_id,
                        position,
                    });
                }
            }
        }

        Self {
            folders,
            blocks,
            objects,
        }
    }
}
