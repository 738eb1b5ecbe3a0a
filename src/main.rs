use clap::Parser;
use strongbox::cache::cleanup::spawn_cleanup;
use strongbox::cli::commands::add::ValueSource;
use strongbox::cli::commands::*;
use strongbox::cli::{AppContext, Cli, Commands};
use strongbox::errors::{Result, StrongboxError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    strongbox::logging::init(cli.verbose);

    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => fail(&e),
    };

    // Wipe the passphrase cache if we are interrupted mid-command.
    let cleanup = spawn_cleanup(ctx.cache.clone());

    let result = tokio::task::spawn_blocking(move || run(cli.command, &ctx))
        .await
        .unwrap_or_else(|e| Err(StrongboxError::CommandFailed(format!("command panicked: {e}"))));

    cleanup.abort();

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(e: &StrongboxError) -> ! {
    strongbox::cli::output::error(&e.to_string());
    std::process::exit(1);
}

fn run(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Init => init::execute(ctx),
        Commands::Add {
            name,
            value,
            category,
            generate,
            length,
            no_symbols,
            no_digits,
        } => {
            let source = match value {
                Some(value) => ValueSource::Given(value),
                None if generate => ValueSource::Generated {
                    length,
                    symbols: !no_symbols,
                    digits: !no_digits,
                },
                None => ValueSource::Prompt,
            };
            add::execute(ctx, &name, &category, source)
        }
        Commands::Get { name } => get::execute(ctx, &name),
        Commands::List { category } => list::execute(ctx, category.as_deref()),
        Commands::Update {
            name,
            value,
            category,
            generate,
            length,
        } => update::execute(ctx, &name, value, category, generate, length),
        Commands::Delete { name, force } => delete::execute(ctx, &name, force),
        Commands::Generate {
            length,
            symbols,
            digits,
        } => generate::execute(length, symbols, digits),
        Commands::ChangeMaster => change_master::execute(ctx),
        Commands::Import {
            file,
            merge,
            use_store_passphrase,
        } => import_cmd::execute(ctx, &file, merge, use_store_passphrase),
        Commands::Export { dir } => export::execute(ctx, &dir),
        Commands::Backup { dir } => backup::execute(ctx, dir.as_deref()),
        Commands::Restore {
            archive,
            target,
            interactive,
            force,
        } => restore::execute(
            ctx,
            archive.as_deref(),
            target.as_deref(),
            interactive,
            force,
        ),
        Commands::ListBackups { dir } => list_backups::execute(ctx, dir.as_deref()),
        Commands::Lock => lock::execute(ctx),
        Commands::Completions { shell } => completions::execute(&shell),
    }
}
