//! CLI argument parsing and command dispatch

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use loadgen_core::model::{KeyValue, SeverityNumber};
use loadgen_core::{
    aggregate_worker_stats, AggregatedStats, ExportSink, GeneratorBuilder, GeneratorConfig,
};
use loadgen_encoding::{
    create_logs_marshaler, logs_registry, metrics_registry, traces_registry, DiscardTransport,
    ExporterConfig, MarshalerRegistry, MarshalingSink, StdoutTransport, DEFAULT_TOPIC,
};

#[derive(Parser)]
#[command(name = "loadgen")]
#[command(author, version, about = "Synthetic telemetry load generator", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate log records
    Logs(LogsArgs),
    /// List the encodings available for each signal
    Encodings,
}

/// Where marshaled messages go
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Stdout,
    Discard,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Number of concurrent workers
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Records per worker (ignored when --duration is set)
    #[arg(long = "logs", default_value_t = 1)]
    pub num_logs: u64,

    /// Run for this long instead of a fixed count, e.g. "30s" or "2m"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Records per second per worker (0 = unlimited)
    #[arg(long, default_value_t = 1.0)]
    pub rate: f64,

    /// Record body
    #[arg(long, default_value = loadgen_core::worker::DEFAULT_BODY)]
    pub body: String,

    #[arg(long, default_value = loadgen_core::worker::DEFAULT_SEVERITY_TEXT)]
    pub severity_text: String,

    /// Severity ordinal, 1 to 24
    #[arg(long, default_value_t = SeverityNumber::INFO, value_parser = parse_severity)]
    pub severity_number: SeverityNumber,

    /// Value of the service.name resource attribute
    #[arg(long = "service", default_value = loadgen_core::config::DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Extra resource attribute, repeatable
    #[arg(long = "resource-attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub resource_attributes: Vec<KeyValue>,

    /// Attribute added to every record, repeatable
    #[arg(long = "telemetry-attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub telemetry_attributes: Vec<KeyValue>,

    /// Logs encoding name (see `loadgen encodings`)
    #[arg(long, default_value = "otlp_json")]
    pub encoding: String,

    /// Key messages by resource attributes
    #[arg(long)]
    pub partition_by_resource: bool,

    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    #[arg(long, value_enum, default_value_t = Output::Stdout)]
    pub output: Output,
}

impl LogsArgs {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            workers: self.workers,
            num_logs: self.num_logs,
            duration: self.duration.unwrap_or(Duration::ZERO),
            rate: self.rate,
            body: self.body.clone(),
            severity_text: self.severity_text.clone(),
            severity_number: self.severity_number,
            service_name: self.service_name.clone(),
            resource_attributes: self.resource_attributes.clone(),
            telemetry_attributes: self.telemetry_attributes.clone(),
        }
    }

    pub fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig::new(self.encoding.as_str())
            .with_topic(self.topic.as_str())
            .with_partition_logs_by_resource_attributes(self.partition_by_resource)
    }
}

/// Parse a `key=value` pair; the value may itself contain `=`
pub fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(KeyValue::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

pub fn parse_severity(raw: &str) -> Result<SeverityNumber, String> {
    let value: i32 = raw
        .parse()
        .map_err(|_| format!("severity must be an integer, got {raw:?}"))?;
    SeverityNumber::new(value).ok_or_else(|| {
        format!(
            "severity must be between {} and {}, got {value}",
            SeverityNumber::MIN,
            SeverityNumber::MAX
        )
    })
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Logs(args) => run_logs(args).await,
        Commands::Encodings => {
            print!("{}", render_encodings());
            Ok(())
        }
    }
}

async fn run_logs(args: LogsArgs) -> Result<()> {
    let exporter = args.exporter_config();
    let marshaler = create_logs_marshaler(&exporter)?;
    if exporter.partition_logs_by_resource_attributes
        && !logs_registry().supports_partitioning(&exporter.encoding)
    {
        tracing::warn!(
            encoding = %exporter.encoding,
            "encoding has no partitioning option, --partition-by-resource ignored"
        );
    }

    let sink: Arc<dyn ExportSink> = match args.output {
        Output::Stdout => Arc::new(MarshalingSink::new(
            marshaler,
            &exporter.topic,
            StdoutTransport::new(),
        )),
        Output::Discard => Arc::new(MarshalingSink::new(
            marshaler,
            &exporter.topic,
            DiscardTransport::new(),
        )),
    };

    let generator = GeneratorBuilder::new()
        .config(args.generator_config())
        .sink(sink)
        .build()
        .context("invalid generator configuration")?;

    let stats = generator.run_with_signal_handling().await?;
    let aggregated = aggregate_worker_stats(&stats);
    if aggregated.total_workers == 0 {
        bail!("no worker completed");
    }
    eprintln!("{}", render_summary(&aggregated));
    Ok(())
}

fn render_summary(stats: &AggregatedStats) -> String {
    format!(
        "generated {} logs with {} worker(s) in {:.2?} ({:.1} logs/s)",
        stats.total_generated, stats.total_workers, stats.total_duration, stats.records_per_second
    )
}

fn render_catalog<M: ?Sized>(registry: &MarshalerRegistry<M>) -> String {
    let names: Vec<String> = registry
        .encodings()
        .map(|name| {
            if registry.supports_partitioning(name) {
                format!("{name}*")
            } else {
                name.to_string()
            }
        })
        .collect();
    format!("{:<8} {}\n", registry.kind().as_str(), names.join(", "))
}

fn render_encodings() -> String {
    let mut out = String::new();
    out.push_str(&render_catalog(traces_registry()));
    out.push_str(&render_catalog(metrics_registry()));
    out.push_str(&render_catalog(logs_registry()));
    out.push_str("(* accepts a partitioning option)\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("env=prod").unwrap(), KeyValue::new("env", "prod"));
        assert_eq!(parse_key_value("q=a=b").unwrap(), KeyValue::new("q", "a=b"));
        assert_eq!(parse_key_value("empty=").unwrap(), KeyValue::new("empty", ""));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("9").unwrap(), SeverityNumber::INFO);
        assert_eq!(parse_severity("24").unwrap().get(), 24);
        assert!(parse_severity("0").is_err());
        assert!(parse_severity("25").is_err());
        assert!(parse_severity("warn").is_err());
    }

    #[test]
    fn test_logs_args_to_configs() {
        let cli = Cli::try_parse_from([
            "loadgen",
            "logs",
            "--workers",
            "3",
            "--duration",
            "2s",
            "--rate",
            "50",
            "--resource-attr",
            "env=prod",
            "--telemetry-attr",
            "k=v",
            "--encoding",
            "raw",
            "--partition-by-resource",
            "--output",
            "discard",
        ])
        .unwrap();

        let Commands::Logs(args) = cli.command else {
            panic!("expected logs subcommand");
        };
        let config = args.generator_config();
        assert_eq!(config.workers, 3);
        assert_eq!(config.duration, Duration::from_secs(2));
        assert_eq!(config.effective_num_logs(), 0);
        assert_eq!(config.rate_limit(), Some(50.0));
        assert_eq!(config.resource_attributes, vec![KeyValue::new("env", "prod")]);
        assert_eq!(config.telemetry_attributes, vec![KeyValue::new("k", "v")]);
        assert_eq!(args.output, Output::Discard);

        let exporter = args.exporter_config();
        assert_eq!(exporter.encoding, "raw");
        assert!(exporter.partition_logs_by_resource_attributes);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["loadgen", "logs"]).unwrap();
        let Commands::Logs(args) = cli.command else {
            panic!("expected logs subcommand");
        };
        let config = args.generator_config();
        assert_eq!(config.workers, 1);
        assert_eq!(config.num_logs, 1);
        assert!(config.duration.is_zero());
        assert_eq!(config.severity_number, SeverityNumber::INFO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_render_encodings() {
        let text = render_encodings();
        assert!(text.contains("jaeger_proto,"));
        assert!(text.contains("zipkin_json*"));
        assert!(text.contains("raw\n"));
        assert!(text.starts_with("traces"));
    }

    #[tokio::test]
    async fn test_run_logs_discard() {
        let cli = Cli::try_parse_from([
            "loadgen", "logs", "--workers", "2", "--logs", "3", "--rate", "0", "--output",
            "discard",
        ])
        .unwrap();
        assert!(run(cli).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_logs_rejects_tiny_rate() {
        let cli = Cli::try_parse_from([
            "loadgen", "logs", "--rate", "1e-20", "--output", "discard",
        ])
        .unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(format!("{err:#}").contains("too small"));
    }

    #[tokio::test]
    async fn test_run_logs_unknown_encoding() {
        let cli = Cli::try_parse_from(["loadgen", "logs", "--encoding", "zipkin_json"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("zipkin_json"));
    }
}
