use crate::cli::Cli;
use anyhow::{Context, Result};
use hbqueue::config::{Config, validate_fps};
use hbqueue::engine::{
    self, Ffprobe, QueueOptions, ResolutionPolicy, Template, build_queue, normalize_extensions,
    process::require_tool, transcode::run_queue,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

pub fn run(cli: Cli) {
    let result = if cli.template_dec {
        handle_template_dec()
    } else if let Some(input) = &cli.template_enc {
        handle_template_enc(input.as_deref())
    } else if cli.init_config {
        handle_init_config(cli.config.as_deref())
    } else {
        handle_generate(&cli)
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn handle_template_dec() -> Result<()> {
    let template = Template::builtin()?;
    println!("{}", template.as_str().trim_end());
    Ok(())
}

fn handle_template_enc(input: Option<&Path>) -> Result<()> {
    let text = engine::read_encode_input(input, std::io::stdin().lock())?;
    println!("{}", engine::encode(&text));
    Ok(())
}

fn handle_init_config(path: Option<&Path>) -> Result<()> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        return Ok(());
    }

    Config::default().save_to(&config_path)?;
    println!("Created default config: {}", config_path.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Merge command-line flags over config values
fn queue_options(cli: &Cli, config: &Config) -> Result<QueueOptions> {
    let extensions = if cli.extensions.is_empty() {
        normalize_extensions(&config.defaults.extensions)
    } else {
        normalize_extensions(&cli.extensions)
    };
    if extensions.is_empty() {
        anyhow::bail!("No source extensions given");
    }

    let resolution = match &cli.res {
        Some(res) => res.parse::<ResolutionPolicy>()?,
        None => config.resolution_policy()?,
    };

    Ok(QueueOptions {
        input_root: cli.dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        output_root: cli.dir_out.clone(),
        queue_file: cli.queue_file.clone(),
        extensions,
        resolution,
        fps: validate_fps(cli.fps.unwrap_or(config.defaults.fps))?,
        output_extension: config.defaults.output_extension.trim_start_matches('.').to_string(),
        queue_file_name: config.defaults.queue_file_name.clone(),
        probe_jobs: config.probe.jobs.max(1),
    })
}

fn handle_generate(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let options = queue_options(cli, &config)?;

    // Fail before touching any file when the probe is missing
    if options.resolution.is_auto() {
        require_tool(&config.probe.program).with_context(|| {
            format!(
                "To use auto resolutions {} (ffmpeg) needs to be installed",
                config.probe.program
            )
        })?;
    }
    if cli.encode {
        require_tool(&config.transcoder.program)?;
    }

    let template = Template::builtin()?;
    let timeout = match config.probe.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let prober = Ffprobe::new(config.probe.program.clone(), timeout);

    tracing::debug!(?options, "generating queue");
    let report = build_queue(&options, &template, &prober)?;

    println!("#{} found to be encoded", report.selected);
    if report.copied > 0 {
        println!(
            "#{} files are not to be encoded, copied to {}",
            report.copied,
            report.output_root.display()
        );
    }
    println!("Queue written to {}", report.queue_file.display());

    if cli.encode {
        run_queue(
            &config.transcoder.program,
            &report.queue_file,
            &config.transcoder.extra_args,
            |line| println!("{}", line),
        )?;
    }

    println!("Done.");
    Ok(())
}
