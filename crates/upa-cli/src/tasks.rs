use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use upa_core::engine::progress_message;
use upa_core::error::EXIT_ABNORMAL;
use upa_core::filter::{compile_pattern, parse_datetime_bound};
use upa_core::paths::{file_name, insert_dated_directory, with_dated_file_stem, DateFormat};
use upa_core::{
    build_candidate_list, AppConfig, BatchEngine, Error, FilterSpec, IoPolicy, MediaFileService,
    OperationKind,
};

use crate::commands::{
    Commands, GroupArgs, IoArgs, ListingArgs, RenameArgs, TransferArgs, TransformArgs,
};
use crate::progress::ConsoleReporter;

/// Everything a task needs, built once in `main`.
pub struct TaskContext<'a, S: ?Sized> {
    pub config: &'a AppConfig,
    pub service: &'a S,
    pub reporter: &'a ConsoleReporter,
}

/// Run one subcommand and return the process exit code.
pub fn run<S>(command: &Commands, ctx: &TaskContext<'_, S>) -> Result<i32, Error>
where
    S: MediaFileService + ?Sized,
{
    debug!("Starting task \"{}\"", command.name());
    match command {
        Commands::List(args) => list(ctx, args),
        Commands::Copy(args) => transfer(ctx, args, OperationKind::Copy),
        Commands::Move(args) => transfer(ctx, args, OperationKind::Move),
        Commands::Rename(args) => rename(ctx, args),
        Commands::Group(args) => group(ctx, args),
        Commands::Transform(args) => transform(args),
    }
}

pub fn filter_spec(config: &AppConfig, args: &ListingArgs) -> Result<FilterSpec, Error> {
    let mut spec = FilterSpec::new(args.sources.clone());
    spec.recursive = args.recursive;

    if let Some(pattern) = &args.pattern {
        spec.pattern = compile_pattern(pattern)?;
        debug!("Filtering directories using regex=\"{}\"", pattern);
    }

    let format = args
        .datetime_format
        .as_deref()
        .unwrap_or(&config.datetime_format);
    spec.after = args
        .after
        .as_deref()
        .and_then(|value| datetime_bound("after", value, format));
    spec.before = args
        .before
        .as_deref()
        .and_then(|value| datetime_bound("before", value, format));

    Ok(spec)
}

fn datetime_bound(
    name: &str,
    value: &str,
    format: &str,
) -> Option<chrono::DateTime<chrono::Local>> {
    let bound = parse_datetime_bound(value, format);
    match bound {
        Some(_) => debug!("Filtering directories using date {}=\"{}\"", name, value),
        None => warn!(
            "Invalid filter {} datetime \"{}\" using format \"{}\"",
            name, value, format
        ),
    }
    bound
}

pub fn io_policy(args: &IoArgs) -> IoPolicy {
    IoPolicy {
        dry_run: args.run.dry_run,
        force: args.force,
        skip_existing: args.skip_existing,
        interactive: !args.skip_existing,
        create_directories: args.create_directories,
    }
}

/// The flag value, or the configured default, checked before any file is touched.
fn date_format(flag: Option<&str>, configured: &str) -> Result<DateFormat, Error> {
    DateFormat::parse(flag.unwrap_or(configured))
}

fn list<S>(ctx: &TaskContext<'_, S>, args: &ListingArgs) -> Result<i32, Error>
where
    S: MediaFileService + ?Sized,
{
    let spec = filter_spec(ctx.config, args)?;
    let files = build_candidate_list(ctx.service, &spec)?;
    let total = files.len();
    for (i, file) in files.iter().enumerate() {
        info!("{}", progress_message(i + 1, total, &file.display().to_string()));
    }
    Ok(0)
}

fn transfer<S>(ctx: &TaskContext<'_, S>, args: &TransferArgs, kind: OperationKind) -> Result<i32, Error>
where
    S: MediaFileService + ?Sized,
{
    let spec = filter_spec(ctx.config, &args.listing)?;
    let engine = BatchEngine::new(ctx.service, io_policy(&args.io));
    let target = args.io.target.as_path();
    engine.prepare_target(target)?;

    let files = build_candidate_list(ctx.service, &spec)?;
    engine.run(
        &files,
        kind,
        |source: &Path| Ok(target.join(file_name(source))),
        ctx.reporter,
        ctx.reporter,
    );
    // per-file failures are reported in the summary, not through the exit code
    Ok(0)
}

fn rename<S>(ctx: &TaskContext<'_, S>, args: &RenameArgs) -> Result<i32, Error>
where
    S: MediaFileService + ?Sized,
{
    let spec = filter_spec(ctx.config, &args.listing)?;
    let scheme = date_format(args.scheme.as_deref(), &ctx.config.rename_scheme)?;
    debug!("Renaming with scheme \"{}\"", scheme);

    let policy = IoPolicy {
        dry_run: args.run.dry_run,
        ..Default::default()
    };
    let engine = BatchEngine::new(ctx.service, policy);

    let files = build_candidate_list(ctx.service, &spec)?;
    engine.run(
        &files,
        OperationKind::Rename,
        |source: &Path| {
            let created = ctx.service.creation_time(source)?;
            Ok(with_dated_file_stem(source, &created, &scheme))
        },
        ctx.reporter,
        ctx.reporter,
    );
    Ok(0)
}

fn group_label(args: &GroupArgs) -> Option<String> {
    let parts: Vec<&str> = [args.event.as_deref(), args.location.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn group<S>(ctx: &TaskContext<'_, S>, args: &GroupArgs) -> Result<i32, Error>
where
    S: MediaFileService + ?Sized,
{
    let spec = filter_spec(ctx.config, &args.listing)?;
    let folder_format = date_format(args.date_format.as_deref(), &ctx.config.group_date_format)?;
    let policy = io_policy(&args.io);
    let target = args.io.target.as_path();
    BatchEngine::new(ctx.service, policy).prepare_target(target)?;

    let label = group_label(args);
    debug!("Grouping by \"{}\"", folder_format);

    // dated folders are always created on demand
    let engine = BatchEngine::new(
        ctx.service,
        IoPolicy {
            create_directories: true,
            ..policy
        },
    );

    let files = build_candidate_list(ctx.service, &spec)?;
    engine.run(
        &files,
        OperationKind::Move,
        |source: &Path| {
            let created = ctx.service.creation_time(source)?;
            let flat: PathBuf = target.join(file_name(source));
            Ok(insert_dated_directory(
                &flat,
                &created,
                &folder_format,
                label.as_deref(),
            ))
        },
        ctx.reporter,
        ctx.reporter,
    );
    Ok(0)
}

fn transform(args: &TransformArgs) -> Result<i32, Error> {
    debug!(
        "Requested transform: width={:?} height={:?} format={:?} quality={} suffix=\"{}\"",
        args.width, args.height, args.format, args.quality, args.suffix
    );
    error!("Image transformation is not supported");
    Ok(EXIT_ABNORMAL)
}
