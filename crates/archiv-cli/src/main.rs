//! archiv - time-stamp and verify web archives

use anyhow::Context;
use archiv::tsp::{parse_timestamp_response_der, TimestampClient, TimestampConfig};
use archiv::types::DigestAlgorithm;
use archiv::{
    file_entry, timestamp_archive, verify_manifest_file, ArchivConfig, ValidationTime,
    VerificationResult, VerifyOptions,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "archiv")]
#[command(about = "Trusted RFC 3161 timestamps for web archives")]
struct Cli {
    /// Log level or tracing filter directive
    #[arg(long, global = true, env = "ARCHIV_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time-stamp archive content and write its manifest
    Timestamp(TimestampArgs),
    /// Verify a manifest against archive content
    Verify(VerifyArgs),
    /// Decode a DER TimeStampResp and print it as JSON
    Inspect {
        /// Raw time-stamp response (.tsr)
        response: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TimestampArgs {
    /// Packed archive content (content.zip)
    content: PathBuf,

    /// URL of the archived page
    #[arg(long)]
    url: String,

    /// Archived resource: its URL and the file holding it, repeatable
    #[arg(long = "resource", num_args = 2, value_names = ["URL", "PATH"])]
    resources: Vec<String>,

    /// Where to write the manifest
    #[arg(short, long, default_value = "manifest")]
    output: PathBuf,

    /// Time-stamp authority URL
    #[arg(long, env = "ARCHIV_TSA_URL", default_value = archiv::tsp::DFN_TSA_URL)]
    tsa_url: String,

    /// Digest algorithm (sha1, sha256, sha384, sha512)
    #[arg(long, env = "ARCHIV_DIGEST", default_value = "sha256")]
    digest: DigestAlgorithm,

    /// TSA request timeout in seconds
    #[arg(long, env = "ARCHIV_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Manifest JSON
    #[arg(long)]
    manifest: PathBuf,

    /// Packed archive content (content.zip)
    #[arg(long)]
    content: PathBuf,

    /// Trusted root certificates, PEM or DER (comma-separated in the env var)
    #[arg(long = "trust-root", env = "ARCHIV_TRUST_ROOTS", value_delimiter = ',')]
    trust_roots: Vec<PathBuf>,

    /// Intermediate CA certificates, PEM or DER (comma-separated in the env var)
    #[arg(long = "intermediate", env = "ARCHIV_INTERMEDIATES", value_delimiter = ',')]
    intermediates: Vec<PathBuf>,

    /// Certificate revocation lists, PEM or DER (comma-separated in the env var)
    #[arg(long = "crl", env = "ARCHIV_CRLS", value_delimiter = ',')]
    crls: Vec<PathBuf>,

    /// Validate the certificate chain at the token's genTime instead of now
    #[arg(long)]
    at_token_time: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl TimestampArgs {
    /// `--resource` values as (URL, path) pairs
    fn resources(&self) -> Vec<(&str, &Path)> {
        self.resources
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), Path::new(&pair[1])))
            .collect()
    }

    fn timestamp_config(&self) -> TimestampConfig {
        TimestampConfig::new(self.tsa_url.clone())
            .with_digest_algorithm(self.digest)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl VerifyArgs {
    fn archiv_config(&self) -> ArchivConfig {
        let validation_time = if self.at_token_time {
            ValidationTime::TokenTime
        } else {
            ValidationTime::Now
        };
        ArchivConfig {
            verify: VerifyOptions::default().with_validation_time(validation_time),
            trust_roots: self.trust_roots.clone(),
            intermediates: self.intermediates.clone(),
            crls: self.crls.clone(),
            ..ArchivConfig::default()
        }
    }
}

async fn run_timestamp(args: TimestampArgs) -> anyhow::Result<ExitCode> {
    let config = args.timestamp_config();
    let algorithm = config.digest_algorithm;
    let client = TimestampClient::new(config)?;

    let files = args
        .resources()
        .into_iter()
        .map(|(url, path)| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            file_entry(name, url, path, algorithm)
                .with_context(|| format!("failed to hash {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let manifest = timestamp_archive(&client, &args.url, &args.content, files).await?;
    std::fs::write(&args.output, manifest.to_json_pretty()?)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Time-stamped {} at {} by {}",
        args.content.display(),
        manifest.signature.tst_info.gen_time,
        manifest
            .signature
            .signer_certificate()
            .map(|cert| cert.subject.to_string())
            .unwrap_or_default()
    );
    Ok(ExitCode::SUCCESS)
}

async fn run_verify(args: VerifyArgs) -> anyhow::Result<ExitCode> {
    let config = args.archiv_config();
    let result = verify_manifest_file(&config, &args.manifest, &args.content).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report(&result));
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_inspect(response: &Path) -> anyhow::Result<ExitCode> {
    let der = std::fs::read(response)
        .with_context(|| format!("failed to read {}", response.display()))?;
    let parsed = parse_timestamp_response_der(&der)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    tracing::debug!(
        "{} certificate(s), {} signer(s), status {}",
        parsed.certificates.len(),
        parsed.signer_infos.len(),
        parsed.status.code_name()
    );
    Ok(ExitCode::SUCCESS)
}

fn report(result: &VerificationResult) -> String {
    format!(
        "Timestamp: {}\nHashes match: {}\nCertificate trusted: {}\nSignature valid: {}\n",
        result.time, result.hashes_match, result.certificate_trusted, result.signature_valid
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Timestamp(args) => run_timestamp(args).await,
        Command::Verify(args) => run_verify(args).await,
        Command::Inspect { response } => run_inspect(&response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiv::TrustStatus;

    #[test]
    fn test_timestamp_args() {
        let cli = Cli::try_parse_from([
            "archiv",
            "timestamp",
            "content.zip",
            "--url",
            "https://example.org/",
            "--resource",
            "https://example.org/?q=1",
            "./index.html",
            "--resource",
            "https://example.org/img?w=200&h=100",
            "./media/img=w200.png",
            "--digest",
            "SHA-512",
            "--tsa-url",
            "https://freetsa.org/tsr",
        ])
        .unwrap();

        let Command::Timestamp(args) = cli.command else {
            panic!("expected timestamp command");
        };
        assert_eq!(args.output, PathBuf::from("manifest"));
        assert_eq!(
            args.resources(),
            vec![
                ("https://example.org/?q=1", Path::new("./index.html")),
                (
                    "https://example.org/img?w=200&h=100",
                    Path::new("./media/img=w200.png")
                ),
            ]
        );

        let config = args.timestamp_config();
        assert_eq!(config.url, "https://freetsa.org/tsr");
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha512);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_verify_args() {
        let cli = Cli::try_parse_from([
            "archiv",
            "verify",
            "--manifest",
            "manifest",
            "--content",
            "content.zip",
            "--trust-root",
            "a.pem,b.der",
            "--intermediate",
            "ca.pem",
            "--at-token-time",
        ])
        .unwrap();

        let Command::Verify(args) = cli.command else {
            panic!("expected verify command");
        };
        let config = args.archiv_config();
        assert_eq!(
            config.trust_roots,
            vec![PathBuf::from("a.pem"), PathBuf::from("b.der")]
        );
        assert_eq!(config.intermediates, vec![PathBuf::from("ca.pem")]);
        assert_eq!(config.verify.validation_time, ValidationTime::TokenTime);
        assert!(config.crls.is_empty());
    }

    #[test]
    fn test_bad_arguments() {
        assert!(Cli::try_parse_from(["archiv", "timestamp", "content.zip"]).is_err());
        assert!(Cli::try_parse_from([
            "archiv",
            "timestamp",
            "content.zip",
            "--url",
            "x",
            "--digest",
            "md5"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "archiv",
            "timestamp",
            "content.zip",
            "--url",
            "x",
            "--resource",
            "https://example.org/=./index.html"
        ])
        .is_err());
    }

    #[test]
    fn test_report() {
        let result = VerificationResult {
            hashes_match: true,
            certificate_trusted: TrustStatus::Expired,
            signature_valid: true,
            time: "20240102030405Z".into(),
        };
        assert_eq!(
            report(&result),
            "Timestamp: 20240102030405Z\nHashes match: true\nCertificate trusted: expired\nSignature valid: true\n"
        );
    }
}
