use std::process::ExitCode;

use anyhow::Result;
use tracing::error;

use bundle_mirror::telemetry::init_tracing;
use bundle_mirror::{Mirror, MirrorConfig, RunOutcome};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let mirror = Mirror::from_config(MirrorConfig::default())?;
    let outcome = mirror.run().await?;
    if let RunOutcome::UpToDate { bundle_id } = &outcome {
        error!(
            "bundle {} is identical to the one in {}, exiting",
            bundle_id,
            mirror.config().state_file.display()
        );
    }
    Ok(ExitCode::from(outcome.exit_code()))
}
