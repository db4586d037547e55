// scanlib -- command-line tool for Uniden handheld scanners.
//
// Usage:
//   scanlib test
//   scanlib --port /dev/ttyACM0 read settings.txt
//   scanlib --port /dev/ttyACM0 write settings.txt
//   scanlib shell
//   scanlib --simulate -v read settings.txt
//   scanlib list
//
// Without --port the first USB device with Uniden's vendor id is used.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use scanlib_test_harness::SimulatedScanner;
use scanlib_transport::find_scanner_ports;
use scanlib_uniden::builder::DEFAULT_BAUD_RATE;
use scanlib_uniden::{
    ScannerBuilder, ScannerCommand, ScannerSettings, Sdo, SdoKind, UnidenScanner, decode_reply,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// scanlib -- read, save and restore Uniden scanner settings.
#[derive(Parser)]
#[command(name = "scanlib", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM3). Autodetected when omitted.
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Reply timeout per command, in milliseconds.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    /// Talk to a simulated BC125AT instead of real hardware.
    #[arg(long)]
    simulate: bool,

    /// Log protocol traffic to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the connection and print model and firmware.
    Test,

    /// Read every setting from the scanner into a save file.
    Read {
        /// Save file to create or overwrite.
        file: PathBuf,
    },

    /// Write every setting from a save file to the scanner.
    Write {
        /// Save file to load.
        file: PathBuf,
    },

    /// Send raw commands typed on stdin and print decoded replies.
    Shell,

    /// List the commands this tool understands.
    List,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_port(cli: &Cli) -> Result<String> {
    if let Some(port) = &cli.port {
        return Ok(port.clone());
    }

    let ports = find_scanner_ports().context("failed to enumerate serial ports")?;
    match ports.as_slice() {
        [] => bail!("no Uniden scanner found; connect one or pass --port"),
        [port] => Ok(port.clone()),
        [port, ..] => {
            warn!(chosen = %port, found = ports.len(), "several scanners found");
            Ok(port.clone())
        }
    }
}

async fn create_scanner(cli: &Cli) -> Result<UnidenScanner> {
    let builder = ScannerBuilder::new()
        .baud_rate(cli.baud)
        .command_timeout(Duration::from_millis(cli.timeout_ms));

    if cli.simulate {
        debug!("using simulated BC125AT");
        return Ok(builder
            .build_with_transport(Box::new(SimulatedScanner::bc125at()))
            .await?);
    }

    let port = resolve_port(cli)?;
    builder
        .serial_port(&port)
        .build()
        .await
        .with_context(|| format!("cannot open scanner on {port}"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_test(scanner: &UnidenScanner) -> Result<()> {
    let info = scanner
        .test_connection()
        .await
        .context("scanner did not answer")?;

    println!("Scanner Information");
    println!("  Model:     {}", info.model);
    println!("  Firmware:  {}", info.firmware);
    Ok(())
}

fn print_settings(settings: &ScannerSettings) -> Result<()> {
    for sdo in settings.sdos() {
        let key = sdo.persisted_key().unwrap_or(sdo.code());
        println!("  {key:<15}{}", sdo.export_text()?);
    }
    Ok(())
}

async fn cmd_read(scanner: &UnidenScanner, file: &Path) -> Result<()> {
    let info = scanner
        .test_connection()
        .await
        .context("scanner did not answer")?;
    let settings = scanner
        .read_settings()
        .await
        .context("failed to read settings")?;

    let text = settings.to_save_text(&[
        ("model", info.model.as_str()),
        ("firmware", info.firmware.as_str()),
    ])?;
    std::fs::write(file, text).with_context(|| format!("cannot write {}", file.display()))?;

    println!("Read from {} ({}):", info.model, info.firmware);
    print_settings(&settings)?;
    println!("Saved to {}", file.display());
    Ok(())
}

async fn cmd_write(scanner: &UnidenScanner, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let settings = ScannerSettings::from_save_text(&text)
        .with_context(|| format!("invalid save file {}", file.display()))?;

    scanner
        .write_settings(&settings)
        .await
        .context("failed to write settings")?;

    println!("Wrote to scanner:");
    print_settings(&settings)?;
    Ok(())
}

/// Describe a reply the way the shell prints it.
fn describe_reply(reply: &ScannerCommand) -> String {
    match decode_reply(reply) {
        Ok(sdo) => match sdo.export_text() {
            Ok(text) => format!("{reply}  ({text})"),
            Err(_) => format!("{reply}  ({sdo:?})"),
        },
        Err(e) => format!("{reply}  [{e}]"),
    }
}

async fn cmd_shell(scanner: &UnidenScanner) -> Result<()> {
    println!("Type commands such as MDL, PRG, BLT or BLT,SQ. Ctrl-D or `quit` exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let cmd = match ScannerCommand::parse(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        match scanner.execute(&cmd).await {
            Ok(reply) => println!("{}", describe_reply(&reply)),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

fn cmd_list() {
    println!("{:<6}{:<14}Save-file key", "Code", "Category");
    for &kind in SdoKind::ALL {
        let key = kind.instantiate().persisted_key().unwrap_or("-");
        println!("{:<6}{:<14}{key}", kind.code(), kind.category().to_string());
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// Run one command against an open scanner.
async fn run_session(scanner: &UnidenScanner, command: &Command) -> Result<()> {
    match command {
        Command::Test => cmd_test(scanner).await,
        Command::Read { file } => cmd_read(scanner, file).await,
        Command::Write { file } => cmd_write(scanner, file).await,
        Command::Shell => cmd_shell(scanner).await,
        Command::List => {
            cmd_list();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        // Needs no scanner.
        Command::List => {
            cmd_list();
            Ok(())
        }
        command => {
            let scanner = create_scanner(&cli).await?;
            let result = run_session(&scanner, command).await;
            scanner.close().await.ok();
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_with_port() {
        let cli = Cli::try_parse_from(["scanlib", "--port", "/dev/ttyACM0", "read", "out.txt"])
            .unwrap();
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(cli.baud, 115_200);
        assert!(matches!(cli.command, Command::Read { ref file } if file == Path::new("out.txt")));
    }

    #[test]
    fn write_requires_file() {
        assert!(Cli::try_parse_from(["scanlib", "write"]).is_err());
    }

    #[test]
    fn describe_known_and_unknown_replies() {
        let bsv = ScannerCommand::parse("BSV,12").unwrap();
        assert_eq!(describe_reply(&bsv), "BSV,12  (12)");

        let unknown = ScannerCommand::parse("SQL,3").unwrap();
        assert!(describe_reply(&unknown).contains("unrecognized command"));
    }

    #[tokio::test]
    async fn simulated_session_runs_test_command() {
        let cli = Cli::try_parse_from(["scanlib", "--simulate", "test"]).unwrap();
        let scanner = create_scanner(&cli).await.unwrap();
        run_session(&scanner, &cli.command).await.unwrap();
        run_session(&scanner, &Command::List).await.unwrap();
    }

    #[tokio::test]
    async fn simulated_read_writes_save_file() {
        let cli = Cli::try_parse_from(["scanlib", "--simulate", "test"]).unwrap();
        let scanner = create_scanner(&cli).await.unwrap();

        let path = std::env::temp_dir().join(format!("scanlib-cli-{}.txt", std::process::id()));
        cmd_read(&scanner, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.starts_with("# model: BC125AT\n"));
        assert_eq!(
            ScannerSettings::from_save_text(&text).unwrap(),
            ScannerSettings::default()
        );
    }
}
