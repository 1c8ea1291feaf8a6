use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use kira_ckdrisk::input::recorded::RecordedModelServer;
use kira_ckdrisk::input::{Identity, LoadError, load_request};
use kira_ckdrisk::model::ids::ModelId;
use kira_ckdrisk::model::thresholds::EngineProfile;
use kira_ckdrisk::pipeline::stage6_disclose::{classify_identity, disclose};
use kira_ckdrisk::pipeline::stage7_report::{
    ReportError, build_record, write_record, write_reports,
};
use kira_ckdrisk::pipeline::{AssessmentError, assess, request_explanation};

#[derive(Debug, Parser)]
#[command(name = "kira-ckdrisk", version, about = "CKD risk consensus, staging and disclosure")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one assessment from recorded model outputs and write reports.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Assessment request JSON: {"patient": {...}, "clinical": {...}}
    #[arg(long)]
    input: PathBuf,
    /// Recorded per-model predictions JSON.
    #[arg(long)]
    predictions: PathBuf,
    /// Recorded per-model attributions JSON.
    #[arg(long)]
    attributions: Option<PathBuf>,
    /// Caller-facing outputs, filtered by role.
    #[arg(long)]
    out: PathBuf,
    /// Patient-store directory for the unfiltered assessment record; must differ from --out.
    #[arg(long, env = "KIRA_CKDRISK_RECORD_DIR")]
    record_dir: Option<PathBuf>,
    #[arg(long, env = "KIRA_CKDRISK_ROLE")]
    role: String,
    #[arg(long, env = "KIRA_CKDRISK_DISPLAY_NAME", default_value = "")]
    display_name: String,
    #[arg(long, env = "KIRA_CKDRISK_USER", default_value = "unknown")]
    username: String,
    /// Compute the explanation dashboard (subject to role).
    #[arg(long)]
    explain: bool,
    /// Model to explain; implies --explain.
    #[arg(long, value_parser = parse_model_id)]
    explain_model: Option<ModelId>,
    /// Pass absent lab values through as unknown instead of rejecting them.
    #[arg(long)]
    lenient: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("assessment failed: {0}")]
    Assessment(#[from] AssessmentError),
    #[error("report failed: {0}")]
    Report(#[from] ReportError),
    #[error("access denied: role {role:?} has no access to clinical content")]
    Unauthorized { role: String },
    #[error("--record-dir must differ from --out")]
    RecordDirIsOutput,
}

fn parse_model_id(s: &str) -> Result<ModelId, String> {
    ModelId::parse(s).ok_or_else(|| format!("unknown model identifier: {s}"))
}

fn main() {
    kira_ckdrisk::tracing::init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(&args),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<(), CliError> {
    let profile = select_profile(args.lenient);
    let request = load_request(&args.input)?;
    let server = RecordedModelServer::load(&args.predictions, args.attributions.as_deref())?;

    let identity = Identity {
        username: args.username.clone(),
        role: args.role.clone(),
        display_name: args.display_name.clone(),
    };
    let caregiver = classify_identity(&identity, &profile);
    tracing::info!(
        "caregiver {} resolved as {:?}",
        identity.username,
        caregiver
    );
    if caregiver.is_none() {
        return Err(CliError::Unauthorized {
            role: identity.role,
        });
    }
    if args.record_dir.as_deref() == Some(args.out.as_path()) {
        return Err(CliError::RecordDirIsOutput);
    }

    let ctx = assess(request.patient, request.clinical, &server, &profile)?;

    let mut disclosed = disclose(&ctx, caregiver, &profile);
    if args.explain || args.explain_model.is_some() {
        let explanation =
            request_explanation(&ctx, caregiver, &server, args.explain_model, &profile);
        disclosed = disclosed.with_explanation(explanation);
    }
    write_reports(&disclosed, &args.out)?;

    if let Some(store_dir) = &args.record_dir {
        write_record(&build_record(&ctx, &identity.username), store_dir)?;
    }
    Ok(())
}

fn select_profile(lenient: bool) -> EngineProfile {
    if lenient {
        tracing::warn!("lenient normalization: absent lab values are passed through as unknown");
        EngineProfile::lenient_v1()
    } else {
        EngineProfile::strict_v1()
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
