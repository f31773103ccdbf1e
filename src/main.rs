mod cli;

use mediatidy::{
    config, prompt,
    sorter::{self, SortSettings, Sorter},
    transcode::{CodecAudit, FfmpegToolchain, TranscodeSettings},
};
use mediatidy_common::FileCandidate;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediatidy=trace,mediatidy_av=debug,mediatidy_common=debug".to_string()
        } else {
            "mediatidy=info,mediatidy_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Transcode { path, dry_run } => {
            transcode(path, cli.config.as_deref(), dry_run)
        }
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::Sort { source, dry_run } => sort(source, cli.config.as_deref(), dry_run),
        Commands::Guess { path, json } => guess(&path, cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediatidy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn transcode(path: Option<PathBuf>, config_path: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let path = match path {
        Some(path) => path,
        None => prompt::ask_path(None)?,
    };
    if !path.exists() {
        anyhow::bail!("Path does not exist: {:?}", path);
    }

    let settings = TranscodeSettings::from_config(&config.transcode, dry_run)?;
    let toolchain = FfmpegToolchain::from_config(&config.tools)?;
    let audit = CodecAudit::new(toolchain.clone(), toolchain, settings);

    let report = audit.run(&path)?;
    println!("{}", report);
    Ok(())
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let settings = TranscodeSettings::from_config(&config.transcode, true)?;
    let ffprobe = mediatidy_av::get_tool_path("ffprobe", config.tools.ffprobe_path.as_deref())?;

    let probe = mediatidy_av::probe_codecs(&ffprobe, file)?;
    let decision = probe.decision(settings.target);

    if json {
        let value = serde_json::json!({
            "probe": probe,
            "target": settings.target.probe_name(),
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("File: {}", probe.file_path.display());
        if let Some(duration) = probe.duration {
            let secs = duration.as_secs();
            let mins = secs / 60;
            let hours = mins / 60;
            println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
        }

        println!("\nStreams: {}", probe.streams.len());
        for stream in &probe.streams {
            print!("  [{}] {}", stream.index, stream.codec);
            if let Some(ref codec_type) = stream.codec_type {
                print!(" ({})", codec_type);
            }
            println!();
        }

        println!("\nTarget: {}", settings.target);
        println!("Decision: {:?}", decision);
    }

    Ok(())
}

fn sort(source: Option<PathBuf>, config_path: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let source = match source {
        Some(source) => source,
        None => prompt::ask_path(Some(&config.sort.source))?,
    };
    if !source.exists() {
        anyhow::bail!("Source folder does not exist: {:?}", source);
    }

    let guesser = sorter::build_guesser(&config)?;
    let settings = SortSettings::from_config(&config.sort, dry_run);
    let sorter = Sorter::new(guesser, settings);

    let report = sorter
        .run(&source)
        .with_context(|| format!("Failed to sort {:?}", source))?;
    println!("{}", report);
    Ok(())
}

fn guess(path: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let guesser = sorter::build_guesser(&config)?;
    let sorter = Sorter::new(guesser, SortSettings::from_config(&config.sort, true));

    let candidate = FileCandidate::new(path);
    let (guess, action) = sorter.decide(&candidate);

    if json {
        let value = serde_json::json!({
            "path": path,
            "guess": guess,
            "action": action.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Path: {}", path.display());
        match guess.kind {
            Some(ref kind) => println!("Type: {}", kind),
            None => println!("Type: (none)"),
        }
        if let Some(ref title) = guess.title {
            println!("Title: {}", title);
        }
        if let Some(year) = guess.year {
            println!("Year: {}", year);
        }
        if let Some(season) = guess.season {
            println!("Season: {}", season);
        }
        if let Some(episode) = guess.episode {
            println!("Episode: {}", episode);
        }
        if let Some(ref language) = guess.subtitle_language {
            println!("Subtitle language: {}", language);
        }
        println!("\nAction: {}", action);
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = mediatidy_av::check_tools();
    let mut all_ok = true;

    for info in &tools {
        let status = if info.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {} [{}]", status, info.tool, info.tool.purpose());

        if let Some(ref version) = info.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All tools are available!");
    } else {
        println!("Some tools are missing. ffmpeg and ffprobe are needed for transcode;");
        println!("without guessit, set sort.guesser = \"builtin\".");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            config::validate_config(&config)?;
            config
        }
    };

    println!("  Sort source: {}", config.sort.source.display());
    println!("  Movies: {}", config.sort.movies_path().display());
    println!("  Shows: {}", config.sort.shows_path().display());
    println!("  Guesser: {:?}", config.sort.guesser);
    println!("  Max depth: {}", config.sort.max_depth);
    println!(
        "  Allowed extensions: {}",
        config.sort.allowed_extensions.join(", ")
    );
    println!("  Target codec: {}", config.transcode.target_codec);
    println!(
        "  Video extensions: {}",
        config.transcode.video_extensions.join(", ")
    );

    Ok(())
}
