// Topoplan: Planning Backhaul Topologies for 6 GHz Wireless Mesh Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use topoplan::plan;

use chrono::Local;
use clap::{Parser, Subcommand};
use log::*;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

mod random_mesh;
use random_mesh::random_payloads;

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the env logger
    pretty_env_logger::init();

    // run clap
    let args = CommandLineArguments::parse();

    // match on the action
    match args.cmd {
        MainCommand::Plan { nodes, edges, config, results_dir } => {
            let nodes_json = fs::read_to_string(&nodes)?;
            let edges_json = fs::read_to_string(&edges)?;
            let config_json = match &config {
                Some(path) => Some(fs::read_to_string(path)?),
                None => None,
            };

            let document = plan(&nodes_json, &edges_json, config_json.as_deref());
            if let Some(dir) = results_dir {
                archive_result(&dir, &document)?;
            }
            println!("{}", document);
        }
        MainCommand::Results { results_dir } => {
            list_results(&results_dir)?;
        }
        MainCommand::Random { num_nodes, seed, results_dir } => {
            info!("generating a random mesh with {} nodes (seed {})", num_nodes, seed);
            let (nodes_json, edges_json) = random_payloads(num_nodes, seed);

            let document = plan(&nodes_json, &edges_json, None);
            if let Some(dir) = results_dir {
                archive_result(&dir, &document)?;
            }
            println!("{}", document);
        }
    }

    Ok(())
}

/// Write a successful result document into the archive directory, named
/// `topology_<n>nodes_<YYYYMMDD_HHMMSS>.json` (the naming the dashboard
/// expects). Error documents are not archived.
fn archive_result(dir: &Path, document: &str) -> Result<(), Box<dyn Error>> {
    let parsed: Value = serde_json::from_str(document)?;
    if parsed["status"] != "success" {
        warn!("the planning run failed, nothing is archived");
        return Ok(());
    }
    let num_nodes = parsed["data"].as_object().map(|data| data.len()).unwrap_or(0);

    fs::create_dir_all(dir)?;
    let filename =
        format!("topology_{}nodes_{}.json", num_nodes, Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    fs::write(&path, document)?;
    info!("result archived as {}", path.display());
    Ok(())
}

/// Print the archived result documents, newest first.
fn list_results(dir: &Path) -> Result<(), Box<dyn Error>> {
    if !dir.exists() {
        println!("no results in {}", dir.display());
        return Ok(());
    }

    let mut filenames: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json"))
        .collect();
    // the timestamp suffix makes the lexicographic order chronological
    filenames.sort();
    filenames.reverse();

    for filename in filenames {
        let path = dir.join(&filename);
        match fs::read_to_string(&path).ok().and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        {
            Some(parsed) => {
                let status = parsed["status"].as_str().unwrap_or("unknown");
                let num_nodes = parsed["data"].as_object().map(|d| d.len()).unwrap_or(0);
                println!("{}: {} ({} nodes)", filename, status, num_nodes);
            }
            None => println!("{}: unreadable", filename),
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[clap(name = "Topoplan (Binary)", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Action to perform
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Plan a backhaul topology from JSON payload files
    #[clap(name = "plan")]
    Plan {
        /// File containing the nodes payload
        nodes: PathBuf,
        /// File containing the edges payload
        edges: PathBuf,
        /// Optional file containing the config payload
        #[clap(short = 'c', long)]
        config: Option<PathBuf>,
        /// Archive a successful result into this directory
        #[clap(short = 'r', long)]
        results_dir: Option<PathBuf>,
    },
    /// List the archived planning results
    #[clap(name = "results")]
    Results {
        /// The archive directory
        #[clap(default_value = "results")]
        results_dir: PathBuf,
    },
    /// Generate a random mesh scenario and plan it
    #[clap(name = "random")]
    Random {
        /// Number of mesh nodes to generate
        #[clap(short = 'n', long, default_value = "12")]
        num_nodes: usize,
        /// Seed for the scenario generator
        #[clap(short = 's', long, default_value = "42")]
        seed: u64,
        /// Archive a successful result into this directory
        #[clap(short = 'r', long)]
        results_dir: Option<PathBuf>,
    },
}
