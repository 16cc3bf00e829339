use altconv::config::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_TOOL_TIMEOUT_SECS};
use altconv::{
    ArchiveFetcher, ArchiveInspector, CatalogConverter, ConsoleReporter, ConvertError,
    ConvertOptions, FetchSettings, Reporter, Result, SchemaConverter, SystemSigningTools,
    ToolSettings,
};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "altconv")]
#[command(about = "Convert legacy app repositories to AltStore sources, optionally reading IPA permissions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a source file, or every .json file in a directory
    Convert {
        /// Input .json file or directory
        input: Option<PathBuf>,

        /// Output .json file or directory
        output: Option<PathBuf>,

        /// Download each app's IPA and extract its permissions
        #[arg(long)]
        analyze_ipas: bool,

        #[command(flatten)]
        tools: ToolArgs,

        /// Download timeout in seconds
        #[arg(long, env = "ALTCONV_FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
        fetch_timeout: u64,
    },

    /// Print the permissions declared by a local IPA
    Inspect {
        /// The .ipa to inspect
        ipa: PathBuf,

        #[command(flatten)]
        tools: ToolArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ToolArgs {
    /// Timeout in seconds for each codesign/security invocation
    #[arg(long, env = "ALTCONV_TOOL_TIMEOUT", default_value_t = DEFAULT_TOOL_TIMEOUT_SECS)]
    tool_timeout: u64,

    /// codesign executable
    #[arg(long, env = "ALTCONV_CODESIGN", default_value = "codesign")]
    codesign: PathBuf,

    /// security executable
    #[arg(long, env = "ALTCONV_SECURITY", default_value = "security")]
    security: PathBuf,
}

impl ToolArgs {
    fn settings(&self) -> ToolSettings {
        ToolSettings {
            codesign: self.codesign.clone(),
            security: self.security.clone(),
            timeout: Duration::from_secs(self.tool_timeout),
        }
    }
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("[!] {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            analyze_ipas,
            tools,
            fetch_timeout,
        } => {
            let (Some(input), Some(output)) = (input, output) else {
                print_convert_usage();
                return Ok(());
            };
            let options = ConvertOptions {
                analyze_ipas,
                fetch: FetchSettings {
                    timeout: Duration::from_secs(fetch_timeout),
                    ..FetchSettings::default()
                },
                tools: tools.settings(),
            };
            run_convert(input, output, options)
        }
        Commands::Inspect { ipa, tools } => run_inspect(ipa, tools.settings()),
    }
}

fn print_convert_usage() {
    let mut cmd = Cli::command();
    if let Some(convert) = cmd.find_subcommand_mut("convert") {
        let _ = convert.print_help();
    }
    println!();
    println!("Usage:");
    println!("  Single file: altconv convert input.json output.json [--analyze-ipas]");
    println!("  Batch mode:  altconv convert input_dir/ output_dir/ [--analyze-ipas]");
}

fn run_convert(input: PathBuf, output: PathBuf, options: ConvertOptions) -> Result<()> {
    let reporter = ConsoleReporter::stdout();
    let tools = SystemSigningTools::new(options.tools.clone());
    let inspector = ArchiveInspector::new(&tools, &reporter);

    let fetcher = if options.analyze_ipas {
        reporter.notice("IPA analysis enabled - this will take significantly longer!");
        reporter.notice("downloads will be made to analyze app permissions.");
        Some(ArchiveFetcher::new(&options.fetch, &inspector, &reporter)?)
    } else {
        None
    };

    let mut converter = SchemaConverter::new(&reporter);
    if let Some(ref fetcher) = fetcher {
        converter = converter.with_analyzer(fetcher);
    }
    let catalog = CatalogConverter::new(converter, &reporter);

    if input.is_dir() {
        catalog.convert_directory(&input, &output)?;
    } else {
        catalog.convert_file(&input, &output)?;
    }

    Ok(())
}

fn run_inspect(ipa: PathBuf, tools: ToolSettings) -> Result<()> {
    if !ipa.is_file() {
        return Err(ConvertError::FileNotFound(ipa));
    }

    let reporter = ConsoleReporter::stderr();
    let tools = SystemSigningTools::new(tools);
    let inspector = ArchiveInspector::new(&tools, &reporter);

    let result = inspector.inspect(&ipa);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
