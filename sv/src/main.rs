use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use tracing::info;

use snippetvault::cli::{Cli, Command, OutputFormat};
use snippetvault::config::Config;
use snippetvault::{
    Criteria, FileProvider, Snippet, SnippetId, SnippetInput, SnippetPatch, SnippetStore, SystemClock, parse_tags,
};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store_path) = cli.store {
        config.store_path = store_path;
    }

    info!(store_path = %config.store_path.display(), "snippetvault starting");

    let mut store = SnippetStore::new(FileProvider::new(&config.store_path), SystemClock)
        .with_slot(config.slot.clone())
        .with_languages(config.languages.clone());
    store.load();

    match cli.command {
        Command::Add {
            title,
            language,
            tags,
            code,
            file,
        } => cmd_add(&mut store, &config, title, language, tags, code, file)?,
        Command::Edit {
            id,
            title,
            language,
            tags,
            code,
            file,
        } => {
            let code = match file {
                Some(path) => Some(read_file(&path)?),
                None => code,
            };
            let patch = SnippetPatch {
                title,
                language,
                code,
                tags: tags.as_deref().map(parse_tags),
            };
            cmd_edit(&mut store, id, &patch)?
        }
        Command::Rm { id, yes } => cmd_rm(&mut store, id, yes)?,
        Command::List {
            search,
            language,
            tag,
            format,
        } => {
            let criteria = Criteria {
                search_text: search,
                language,
                tag_substring: tag,
            };
            cmd_list(&store, &criteria, format)?
        }
        Command::Show { id } => print_snippet(find(&store, id)?),
        Command::Code { id } => print!("{}", find(&store, id)?.code),
        Command::Export { output } => cmd_export(&store, output)?,
        Command::Import { file, yes } => cmd_import(&mut store, &file, yes)?,
        Command::Languages => cmd_languages(&store),
    }

    if let Some(e) = store.take_save_error() {
        eprintln!("{} Changes were not saved: {}", "!".yellow(), e);
    }

    Ok(())
}

fn cmd_add(
    store: &mut SnippetStore,
    config: &Config,
    title: String,
    language: Option<String>,
    tags: Option<String>,
    code: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let code = match (code, file) {
        (Some(code), _) => code,
        (None, Some(path)) => read_file(&path)?,
        (None, None) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read code from stdin")?;
            buf
        }
    };

    let input = SnippetInput::new(title, language.unwrap_or_else(|| config.default_language.clone()), code)
        .with_tags(parse_tags(tags.as_deref().unwrap_or_default()));
    let snippet = store.create(input).context("Failed to add snippet")?;

    println!("{} Added snippet {}", "✓".green(), snippet.id.to_string().cyan());
    Ok(())
}

fn cmd_edit(store: &mut SnippetStore, id: SnippetId, patch: &SnippetPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change; pass at least one of --title, --language, --tags, --code, --file");
    }
    let snippet = store.edit(id, patch).context("Failed to update snippet")?;
    println!("{} Updated snippet {}", "✓".green(), snippet.id.to_string().cyan());
    Ok(())
}

fn cmd_rm(store: &mut SnippetStore, id: SnippetId, yes: bool) -> Result<()> {
    let Some(snippet) = store.get(id) else {
        println!("No snippet with id {}", id);
        return Ok(());
    };

    if !yes && !confirm(&format!("Delete snippet {} \"{}\"?", id, snippet.title))? {
        println!("Cancelled");
        return Ok(());
    }

    store.delete(id);
    println!("{} Deleted snippet {}", "✓".green(), id);
    Ok(())
}

fn cmd_list(store: &SnippetStore, criteria: &Criteria, format: OutputFormat) -> Result<()> {
    let view = store.query(criteria);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => {
            if store.is_empty() {
                println!("No snippets yet. Add your first with `sv add`.");
            } else if view.is_empty() {
                println!("No snippets match your search criteria.");
            } else {
                for snippet in view {
                    print_summary(snippet);
                }
            }
        }
    }
    Ok(())
}

fn cmd_export(store: &SnippetStore, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(store.export_file_name()));
    let content = store.export_json()?;
    fs::write(&path, content).context(format!("Failed to write {}", path.display()))?;

    println!(
        "{} Exported {} snippets to {}",
        "✓".green(),
        store.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn cmd_import(store: &mut SnippetStore, file: &Path, yes: bool) -> Result<()> {
    let content = read_file(file)?;
    let records = store
        .prepare_import(&content)
        .context("Failed to import: invalid file format")?;

    let prompt = format!("Import {} snippets? This will replace existing data.", records.len());
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    let count = store.import_all(records).context("Failed to import")?;
    println!("{} Imported {} snippets", "✓".green(), count);
    Ok(())
}

fn cmd_languages(store: &SnippetStore) {
    for language in store.languages_in_use() {
        let count = store.query(&Criteria::new().language(language)).len();
        println!("{} {}", language, format!("({})", count).dimmed());
    }
}

fn find(store: &SnippetStore, id: SnippetId) -> Result<&Snippet> {
    store.get(id).ok_or_else(|| eyre::eyre!("Snippet not found: {}", id))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).context(format!("Failed to read file: {}", path.display()))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_summary(snippet: &Snippet) {
    let first_line = snippet.code.lines().next().unwrap_or_default();
    println!(
        "{} {} {}",
        snippet.id.to_string().yellow(),
        snippet.title.bold(),
        format!("[{}]", snippet.language).cyan()
    );
    if !snippet.tags.is_empty() {
        println!("    {}", snippet.tags_display().dimmed());
    }
    println!("    {}", first_line.dimmed());
}

fn print_snippet(snippet: &Snippet) {
    println!("{} {}", snippet.title.bold(), format!("[{}]", snippet.language).cyan());
    println!("  ID: {}", snippet.id);
    println!("  Created: {}", snippetvault::clock::iso8601(snippet.created_at));
    if let Some(updated_at) = snippet.updated_at {
        println!("  Updated: {}", snippetvault::clock::iso8601(updated_at));
    }
    if !snippet.tags.is_empty() {
        println!("  Tags: {}", snippet.tags_display());
    }
    println!();
    println!("{}", snippet.code);
}
