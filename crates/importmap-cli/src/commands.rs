use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use importmap_cli::config::{Config, load_config};
use importmap_cli::session::ImportSession;
use importmap_map::ExportError;
use importmap_model::ExportBlocked;
use tracing::{info, info_span, warn};

use crate::cli::MapArgs;
use crate::summary::{print_captions, print_mapping, print_reply, print_upload, print_validation};

/// How a `map` run ended when no error occurred.
#[derive(Debug)]
pub enum MapOutcome {
    Exported,
    Blocked(ExportBlocked),
}

pub fn run_captions(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print_captions(&config.synonym_dictionary(), &config.captions.slots);
    Ok(())
}

pub fn run_map(args: &MapArgs, config_path: Option<&Path>) -> Result<MapOutcome> {
    let span = info_span!("map", file = %args.file.display());
    let _guard = span.enter();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args);
    let mut session = ImportSession::new(&config)?;
    if args.no_provider {
        session = session.with_provider(None);
    }

    edit_captions(&mut session, args)?;

    let upload = session.load_file(&args.file)?;
    print_upload(&session, &upload);

    for (column, caption) in &args.confirms {
        session
            .confirm(column, caption)
            .with_context(|| format!("confirm {column} -> {caption}"))?;
    }
    for caption in &args.accepts {
        session
            .accept(caption)
            .with_context(|| format!("accept suggestion for {caption}"))?;
    }
    if args.accept_all {
        let accepted = session.accept_all();
        info!(count = accepted.len(), "Accepted all suggestions");
    }
    if !args.messages.is_empty() && !session.has_provider() {
        warn!("Messages skipped: no suggestion provider configured");
    } else {
        for message in &args.messages {
            let reply = session.send_message(message)?;
            print_reply(&reply);
        }
    }

    print_mapping(&session, args.explain);

    if session.state().is_complete() {
        let report = session.validate()?;
        print_validation(report);
        for fix in &args.fixes {
            let correction = session.fix(fix.row, &fix.caption, &fix.value)?;
            eprintln!("{}", correction.message());
        }
        if !args.fixes.is_empty()
            && let Some(report) = session.report()
        {
            print_validation(report);
        }
    } else if !args.fixes.is_empty() {
        warn!("Corrections skipped: confirm every caption before fixing values");
    }

    let text = match session.export() {
        Ok(text) => text,
        Err(ExportError::Blocked(blocked)) => return Ok(MapOutcome::Blocked(blocked)),
        Err(error) => return Err(error).context("write mapped file"),
    };
    match output_path(args, &session) {
        Some(path) => {
            fs::write(&path, &text).with_context(|| format!("write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
            info!(path = %path.display(), "Exported mapped file");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("write mapped file to stdout")?;
        }
    }
    Ok(MapOutcome::Exported)
}

fn apply_overrides(config: &mut Config, args: &MapArgs) {
    if let Some(delimiter) = args.delimiter {
        config.import.delimiter = delimiter.into();
    }
    if args.no_header {
        config.import.has_header = false;
    }
    if let Some(format) = args.date_format {
        config.import.date_format = format.into();
    }
    if let Some(url) = &args.provider_url {
        config.provider.endpoint = Some(url.clone());
    }
}

/// Caption edits run before the file is loaded so matching sees them.
fn edit_captions(session: &mut ImportSession, args: &MapArgs) -> Result<()> {
    let state = session.state_mut();
    for (caption, new_caption) in &args.rename_captions {
        state
            .rename_caption(caption, new_caption)
            .with_context(|| format!("rename caption {caption}"))?;
    }
    for caption in &args.remove_captions {
        state
            .remove_slot(caption)
            .with_context(|| format!("remove caption {caption}"))?;
    }
    for caption in &args.add_captions {
        state
            .add_slot(caption)
            .with_context(|| format!("add caption {caption}"))?;
    }
    for caption in &args.key_fields {
        state.set_key_field(caption, true)?;
    }
    for caption in &args.match_by_id {
        state.set_match_by_id(caption, true)?;
    }
    state.remove_blank_slots();
    Ok(())
}

fn output_path(args: &MapArgs, session: &ImportSession) -> Option<PathBuf> {
    if let Some(path) = &args.output {
        return Some(path.clone());
    }
    args.output_dir
        .as_ref()
        .map(|dir| dir.join(session.export_file_name()))
}
