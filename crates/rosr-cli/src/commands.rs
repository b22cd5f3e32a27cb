use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use colored::Colorize;
use rosr_content::FsContentStore;
use rosr_core::{AggregatedResource, Builder, EvoInfo, ResearchObject};
use rosr_graph::{DirGraphStore, GraphStore};
use rosr_types::{EvoType, Uri};
use serde_json::json;
use tracing::{debug, info};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let builder = open_builder(config)?;
    let format = cli.format;
    match cli.command {
        Command::Create(args) => cmd_create(&builder, args),
        Command::Show(args) => cmd_show(&builder, args, format),
        Command::List(args) => cmd_list(&builder, args, format),
        Command::Aggregate(args) => cmd_aggregate(&builder, args),
        Command::Annotate(args) => cmd_annotate(&builder, args),
        Command::Folder(args) => cmd_folder(&builder, args),
        Command::Entries(args) => cmd_entries(&builder, args, format),
        Command::Snapshot(args) => cmd_copy(&builder, args, EvoType::Snapshot),
        Command::Archive(args) => cmd_copy(&builder, args, EvoType::Archived),
        Command::Evo(args) => cmd_evo(&builder, args, format),
        Command::Delete(args) => cmd_delete(&builder, args),
    }
}

/// A builder over the directory-backed stores named in `config`.
fn open_builder(config: &CliConfig) -> anyhow::Result<Builder> {
    let graphs = DirGraphStore::open(config.graph_dir.clone())
        .with_context(|| format!("opening graph store {}", config.graph_dir.display()))?;
    let content = FsContentStore::open(config.content_dir.clone())
        .with_context(|| format!("opening content store {}", config.content_dir.display()))?;
    let user = config.user()?;
    debug!(
        graphs = %config.graph_dir.display(),
        content = %config.content_dir.display(),
        user = %user.uri,
        transactions = config.use_transactions && graphs.supports_transactions(),
        "opened stores"
    );
    Ok(Builder::new(user, Arc::new(graphs), Arc::new(content)).with_transactions(config.use_transactions))
}

fn open_ro<'a>(builder: &'a Builder, uri: &Uri) -> anyhow::Result<ResearchObject<'a>> {
    ResearchObject::get(builder, uri)?.ok_or_else(|| anyhow!("research object {uri} not found"))
}

/// MIME type from the file extension.
fn guess_mime(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("nt") => "application/n-triples",
        Some("ttl") => "text/turtle",
        Some("rdf") => "application/rdf+xml",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn kind_label(resource: &AggregatedResource) -> &'static str {
    if resource.is_folder() {
        "folder"
    } else if resource.is_annotation() {
        "annotation"
    } else if resource.is_evo_info() {
        "evo-info"
    } else {
        "resource"
    }
}

fn cmd_create(builder: &Builder, args: CreateArgs) -> anyhow::Result<()> {
    let ro = ResearchObject::create(builder, &args.ro)?;
    info!(ro = %ro.uri(), "cli: create");
    println!("{} Created research object {}", "✓".green().bold(), ro.uri().to_string().bold());
    println!("  Manifest: {}", ro.manifest_uri().to_string().cyan());
    Ok(())
}

fn cmd_show(builder: &Builder, args: RoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ro = open_ro(builder, &args.ro)?;
    let members = ro.aggregated()?;
    if let OutputFormat::Json = format {
        let mut aggregated = Vec::new();
        for resource in members.values() {
            let stats = ro.resource_stats(resource.uri())?;
            aggregated.push(json!({
                "uri": resource.uri().as_str(),
                "kind": kind_label(resource),
                "size": stats.as_ref().map(|s| s.size),
                "mime_type": stats.as_ref().map(|s| s.mime_type.clone()),
            }));
        }
        let out = json!({
            "uri": ro.uri().as_str(),
            "evo_type": ro.evo_type()?.to_string(),
            "creator": ro.creator()?.map(Uri::as_str),
            "created": ro.created()?.map(|t| t.to_rfc3339()),
            "aggregated": aggregated,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Research object {} ({})", ro.uri().to_string().bold(), ro.evo_type()?.to_string().yellow());
    if let Some(creator) = ro.creator()? {
        println!("  Creator: {}", creator.to_string().cyan());
    }
    if let Some(created) = ro.created()? {
        println!("  Created: {}", created.to_rfc3339());
    }
    if members.is_empty() {
        println!("\nNothing aggregated.");
        return Ok(());
    }
    println!();
    for resource in members.values() {
        let label = kind_label(resource);
        match ro.resource_stats(resource.uri())? {
            Some(stats) => println!(
                "  {:<10} {} {}",
                label.green(),
                resource.uri(),
                format!("({} bytes, {})", stats.size, stats.mime_type).dimmed()
            ),
            None => println!("  {:<10} {}", label.green(), resource.uri()),
        }
        if let Some(info) = resource.as_annotation() {
            println!("             body: {}", info.body.to_string().blue());
            for target in &info.targets {
                println!("             target: {target}");
            }
        }
    }
    Ok(())
}

fn cmd_list(builder: &Builder, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let uris = ResearchObject::list(builder, args.creator.as_ref())?;
    match format {
        OutputFormat::Json => {
            let list: Vec<&str> = uris.iter().map(Uri::as_str).collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text if uris.is_empty() => println!("No research objects."),
        OutputFormat::Text => {
            for uri in &uris {
                println!("{uri}");
            }
        }
    }
    Ok(())
}

fn cmd_aggregate(builder: &Builder, args: AggregateArgs) -> anyhow::Result<()> {
    let mut ro = open_ro(builder, &args.ro)?;
    let resource = if args.external {
        let uri = Uri::parse(&args.target).with_context(|| format!("invalid URI {}", args.target))?;
        ro.aggregate_external(&uri)?
    } else {
        let file = args.file.unwrap_or_else(|| args.target.clone().into());
        let content = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
        let mime = args.mime.as_deref().unwrap_or_else(|| guess_mime(&args.target));
        ro.aggregate(&args.target, &content, mime)?
    };
    info!(ro = %ro.uri(), resource = %resource.uri(), external = args.external, "cli: aggregate");
    println!("{} Aggregated {}", "✓".green().bold(), resource.uri().to_string().bold());
    if let Some(proxy) = &resource.proxy {
        println!("  Proxy: {}", proxy.to_string().dimmed());
    }
    Ok(())
}

fn cmd_annotate(builder: &Builder, args: AnnotateArgs) -> anyhow::Result<()> {
    let mut ro = open_ro(builder, &args.ro)?;
    let targets: Vec<&str> = args.targets.iter().map(String::as_str).collect();
    let annotation = match &args.file {
        Some(file) => {
            let content = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let mime = args.mime.as_deref().unwrap_or_else(|| guess_mime(&args.body));
            ro.annotate_with_body(&args.body, &content, mime, &targets, args.id.as_deref())?
        }
        None => ro.annotate(&args.body, &targets, args.id.as_deref())?,
    };
    info!(ro = %ro.uri(), annotation = %annotation.uri(), "cli: annotate");
    println!("{} Annotation {}", "✓".green().bold(), annotation.uri().to_string().bold());
    if let Some(info) = annotation.as_annotation() {
        println!("  Body: {}", info.body.to_string().blue());
        for target in &info.targets {
            println!("  Target: {target}");
        }
    }
    Ok(())
}

fn cmd_folder(builder: &Builder, args: FolderArgs) -> anyhow::Result<()> {
    let mut ro = open_ro(builder, &args.ro)?;
    let description = std::fs::read_to_string(&args.description)
        .with_context(|| format!("reading {}", args.description.display()))?;
    let folder = ro.aggregate_folder(&args.path, &description)?;
    if args.root {
        ro.set_root_folder(folder.uri())?;
    }
    let count = ro.folder_entries(folder.uri())?.len();
    info!(ro = %ro.uri(), folder = %folder.uri(), entries = count, root = args.root, "cli: folder");
    println!(
        "{} Folder {} with {} entries",
        "✓".green().bold(),
        folder.uri().to_string().bold(),
        count
    );
    Ok(())
}

fn cmd_entries(builder: &Builder, args: EntriesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ro = ResearchObject::locate_folder(builder, &args.folder)?
        .ok_or_else(|| anyhow!("folder {} not found", args.folder))?;
    let entries = ro.folder_entries(&args.folder)?;
    match format {
        OutputFormat::Json => {
            let list: Vec<_> = entries
                .iter()
                .map(|e| json!({ "uri": e.uri.as_str(), "name": e.name, "target": e.proxy_for.as_str() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            println!("Folder {} in {}", args.folder.to_string().bold(), ro.uri().to_string().cyan());
            for entry in entries {
                println!("  {:<20} {}", entry.name.yellow(), entry.proxy_for);
            }
        }
    }
    Ok(())
}

fn cmd_copy(builder: &Builder, args: CopyArgs, evo_type: EvoType) -> anyhow::Result<()> {
    let mut ro = open_ro(builder, &args.ro)?;
    let copy = ro.copy(&args.target, evo_type)?;
    info!(ro = %ro.uri(), copy = %copy.uri(), %evo_type, "cli: copy");
    println!(
        "{} {} {} of {}",
        "✓".green().bold(),
        evo_type.to_string().yellow(),
        copy.uri().to_string().bold(),
        ro.uri()
    );
    println!("  Aggregated: {}", copy.aggregated()?.len());
    Ok(())
}

fn cmd_evo(builder: &Builder, args: RoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ro = open_ro(builder, &args.ro)?;
    let info = ro.evo_info()?;
    if let OutputFormat::Json = format {
        let out = match info {
            EvoInfo::Live(live) => json!({
                "evo_type": info.evo_type().to_string(),
                "copies": live.copies.iter().map(|c| json!({
                    "uri": c.uri.as_str(),
                    "evo_type": c.evo_type.to_string(),
                    "copied_at": c.copied_at.map(|t| t.to_rfc3339()),
                })).collect::<Vec<_>>(),
            }),
            EvoInfo::Immutable(copy) => json!({
                "evo_type": info.evo_type().to_string(),
                "live": copy.live.as_str(),
                "copied_at": copy.copied_at.map(|t| t.to_rfc3339()),
                "copied_by": copy.copied_by.as_ref().map(Uri::as_str),
                "copied_by_name": copy.copied_by_name,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} is {}", ro.uri().to_string().bold(), info.evo_type().to_string().yellow());
    match info {
        EvoInfo::Live(live) if live.copies.is_empty() => println!("  No snapshots or archives."),
        EvoInfo::Live(live) => {
            for copy in &live.copies {
                let at = copy.copied_at.map(|t| t.to_rfc3339()).unwrap_or_default();
                println!("  {:<9} {} {}", copy.evo_type.to_string().green(), copy.uri, at.dimmed());
            }
        }
        EvoInfo::Immutable(copy) => {
            println!("  Copy of: {}", copy.live.to_string().cyan());
            if let Some(at) = copy.copied_at {
                println!("  Copied at: {}", at.to_rfc3339());
            }
            if let Some(by) = &copy.copied_by {
                let name = copy.copied_by_name.as_deref().unwrap_or("");
                println!("  Copied by: {name} <{by}>");
            }
        }
    }
    Ok(())
}

fn cmd_delete(builder: &Builder, args: RoArgs) -> anyhow::Result<()> {
    let ro = open_ro(builder, &args.ro)?;
    ro.delete()?;
    info!(ro = %args.ro, "cli: delete");
    println!("{} Deleted {}", "✓".green().bold(), args.ro.to_string().bold());
    Ok(())
}
